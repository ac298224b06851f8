//! A single KZG commitment over a length-[`N`](crate::domain::N) vector of
//! values in the Lagrange basis: commit, incrementally update, and open.
//!
//! Verification subtracts `[y]_1` from the commitment before pairing, rather
//! than pairing both sides separately and comparing `GT` elements, so the
//! verifier only ever computes two pairings.

use std::ops::Mul;

use ark_bls12_381::{Bls12_381, Fr, G1Affine, G1Projective};
use ark_ec::{pairing::Pairing, CurveGroup, VariableBaseMSM};
use ark_ff::Zero;

use crate::domain::{Domain, N};
use crate::error::{Error, Result};
use crate::setup::{CommitKey, VerifyKey};

/// A KZG vector commitment to `N` Lagrange-basis values, plus the values
/// themselves (a "Branch" in the tree's terminology).
#[derive(Clone, Debug)]
pub struct VectorCommit {
    values: Vec<Fr>,
    commit: G1Projective,
}

impl VectorCommit {
    /// All values zero, commitment is the identity.
    pub fn new_zero() -> Self {
        Self {
            values: vec![Fr::zero(); N],
            commit: G1Projective::zero(),
        }
    }

    /// Commits to `values` directly via an `N`-term MSM against the
    /// Lagrange-basis commitment key.
    pub fn commit_from(values: Vec<Fr>, ck: &CommitKey) -> Result<Self> {
        if values.len() != N {
            return Err(Error::IndexOutOfRange {
                index: values.len(),
                size: N,
            });
        }
        let commit = msm(&ck.lagrange, &values);
        Ok(Self { values, commit })
    }

    pub fn values(&self) -> &[Fr] {
        &self.values
    }

    pub fn commitment(&self) -> G1Affine {
        self.commit.into_affine()
    }

    /// Sets `values[i] = v_new`, updating the commitment incrementally:
    /// `commit += (v_new - v_old) * L_i`. A single scalar multiplication
    /// instead of a full `N`-term MSM.
    pub fn update(&mut self, i: usize, v_new: Fr, ck: &CommitKey) -> Result<()> {
        if i >= N {
            return Err(Error::IndexOutOfRange { index: i, size: N });
        }
        let delta = v_new - self.values[i];
        self.commit += ck.lagrange[i].mul(delta);
        self.values[i] = v_new;
        Ok(())
    }

    /// Semantically equivalent to calling [`VectorCommit::update`] for each
    /// `(index, value)` pair in order. Repeated indices are not
    /// deduplicated: last write wins, and `CommitConsistency` still holds
    /// because each `update` reads the current `values[i]`.
    pub fn batch_update(&mut self, updates: &[(usize, Fr)], ck: &CommitKey) -> Result<()> {
        for &(i, v) in updates {
            self.update(i, v, ck)?;
        }
        Ok(())
    }

    /// Opens at `z`, computing the claimed value `y` from the stored
    /// values.
    pub fn open(&self, domain: &Domain, ck: &CommitKey, z: Fr) -> Result<G1Affine> {
        let y = domain.lagrange_eval(&self.values, z);
        self.open_claim(domain, ck, z, y)
    }

    /// Opens at `z` for a caller-supplied claimed value `y`. Fails with
    /// [`Error::DomainEvalMismatch`] if `z` is in the domain and `y`
    /// disagrees with the stored value there.
    pub fn open_claim(&self, domain: &Domain, ck: &CommitKey, z: Fr, y: Fr) -> Result<G1Affine> {
        let q = domain.quotient_poly(&self.values, z, y)?;
        Ok(msm(&ck.lagrange, &q).into_affine())
    }

    /// Single pairing check: `e(C - [y]_1, [1]_2) == e(pi, [tau]_2 - [z]_2)`.
    pub fn verify(&self, vk: &VerifyKey, z: Fr, y: Fr, proof: G1Affine) -> Result<()> {
        verify_opening(vk, self.commitment(), z, y, proof)
    }
}

/// Free-standing verifier for a KZG opening, usable without holding the full
/// value vector (e.g. by a remote verifier that only has the commitment).
pub fn verify_opening(
    vk: &VerifyKey,
    commitment: G1Affine,
    z: Fr,
    y: Fr,
    proof: G1Affine,
) -> Result<()> {
    let lhs_point = (commitment.into_group() - vk.g1.mul(y)).into_affine();
    let rhs_point = (vk.tau_g2.into_group() - vk.g2.mul(z)).into_affine();
    let lhs = Bls12_381::pairing(lhs_point, vk.g2);
    let rhs = Bls12_381::pairing(proof, rhs_point);
    if lhs == rhs {
        Ok(())
    } else {
        Err(Error::VerifyReject)
    }
}

fn msm(bases: &[G1Affine], scalars: &[Fr]) -> G1Projective {
    <G1Projective as VariableBaseMSM>::msm(bases, scalars)
        .expect("bases and scalars have matching length")
}
