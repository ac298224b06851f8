//! The three-level stacked commitment tree: `level0` holds user values,
//! `level1`/`level2` hold hash-to-field digests of the commitments one
//! level below.

use ark_bls12_381::{Fr, G1Affine};
use ark_serialize::CanonicalSerialize;

use vector_commit::transcript::{field_to_be_bytes, hash_to_field};
use vector_commit::{CommitKey, Domain, VectorCommit, N};

use crate::error::{Error, Result};

/// `z/y/c` triple for one of the three stacked levels, plus the per-level
/// Fiat-Shamir randomizer `r = H(z‖y‖c)` that [`crate::aggregate`] combines.
#[derive(Clone, Debug)]
pub struct OpeningTriple {
    pub z: Fr,
    pub y: Fr,
    pub c: G1Affine,
    pub r: Fr,
}

impl OpeningTriple {
    pub(crate) fn new(z: Fr, y: Fr, c: G1Affine) -> Self {
        let c_bytes = compressed_bytes(&c);
        let r = hash_to_field(&[&field_to_be_bytes(&z), &field_to_be_bytes(&y), &c_bytes]);
        Self { z, y, c, r }
    }
}

/// Three stacked layers of [`VectorCommit`]s, fanout `N` at every level.
/// `level0` is grown lazily as `update` touches new blocks; `level1`/`level2`
/// grow the same way as their respective child counts cross a multiple of
/// `N`.
#[derive(Clone, Debug)]
pub struct Tree {
    level0: Vec<VectorCommit>,
    level1: Vec<VectorCommit>,
    level2: Vec<VectorCommit>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            level0: Vec::new(),
            level1: Vec::new(),
            level2: Vec::new(),
        }
    }

    pub fn level0(&self) -> &[VectorCommit] {
        &self.level0
    }

    pub fn level1(&self) -> &[VectorCommit] {
        &self.level1
    }

    pub fn level2(&self) -> &[VectorCommit] {
        &self.level2
    }

    /// Writes `v` at global leaf index `k`, re-hashing the touched block's
    /// commitment up through `level1` and `level2`. `0 <= k < N^3`.
    pub fn update(&mut self, k: u64, v: Fr, ck: &CommitKey) -> Result<()> {
        let (b0, i0, b1, i1, b2, i2) = decompose(k)?;

        grow(&mut self.level0, b0 + 1);
        grow(&mut self.level1, b1 + 1);
        grow(&mut self.level2, b2 + 1);

        self.level0[b0].update(i0, v, ck)?;
        let h0 = hash_commitment(&self.level0[b0].commitment());
        self.level1[b1].update(i1, h0, ck)?;
        let h1 = hash_commitment(&self.level1[b1].commitment());
        self.level2[b2].update(i2, h1, ck)?;

        Ok(())
    }

    /// Assembles the three `(z,y,c,r)` triples for leaf `k`, checking that
    /// the stored `level0` value matches the caller's expectation `v`.
    pub fn open_triples(&self, k: u64, v: Fr, domain: &Domain) -> Result<[OpeningTriple; 3]> {
        let (b0, i0, b1, i1, b2, i2) = decompose(k)?;

        let stored = self.level0[b0].values()[i0];
        if stored != v {
            return Err(Error::LeafMismatch { index: k });
        }

        let t0 = OpeningTriple::new(domain.root(i0), stored, self.level0[b0].commitment());
        let t1 = OpeningTriple::new(
            domain.root(i1),
            self.level1[b1].values()[i1],
            self.level1[b1].commitment(),
        );
        let t2 = OpeningTriple::new(
            domain.root(i2),
            self.level2[b2].values()[i2],
            self.level2[b2].commitment(),
        );
        Ok([t0, t1, t2])
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

fn grow(level: &mut Vec<VectorCommit>, len: usize) {
    while level.len() < len {
        level.push(VectorCommit::new_zero());
    }
}

fn hash_commitment(c: &G1Affine) -> Fr {
    hash_to_field(&[&compressed_bytes(c)])
}

fn compressed_bytes(c: &G1Affine) -> Vec<u8> {
    let mut buf = Vec::with_capacity(48);
    c.serialize_compressed(&mut buf)
        .expect("G1Affine compressed serialization does not fail");
    buf
}

/// Splits a global leaf index into per-level `(block, offset)` pairs.
/// Precondition checked here: `b2 < N`, i.e. `k < N^3`.
#[allow(clippy::type_complexity)]
fn decompose(k: u64) -> Result<(usize, usize, usize, usize, usize, usize)> {
    let n = N as u64;
    let b0 = k / n;
    let i0 = (k % n) as usize;
    let b1 = b0 / n;
    let i1 = (b0 % n) as usize;
    let b2 = b1 / n;
    let i2 = (b1 % n) as usize;
    if b2 >= n {
        return Err(Error::IndexOutOfRange { index: k, fanout: N });
    }
    Ok((b0 as usize, i0, b1 as usize, i1, b2 as usize, i2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{G1Projective, G2Projective};
    use ark_ec::{CurveGroup, Group};
    use ark_ff::UniformRand;
    use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
    use vector_commit::VerifyKey;

    fn toy_keys() -> (CommitKey, VerifyKey, Domain) {
        let mut rng = ark_std::test_rng();
        let tau = Fr::rand(&mut rng);
        let domain = Domain::standard();

        let g1 = G1Projective::generator();
        let g2 = G2Projective::generator();
        let radix = Radix2EvaluationDomain::<Fr>::new(N).unwrap();
        let lagrange = radix
            .evaluate_all_lagrange_coefficients(tau)
            .iter()
            .map(|l| (g1 * l).into_affine())
            .collect();

        let ck = CommitKey { lagrange };
        let vk = VerifyKey {
            g1: g1.into_affine(),
            g2: g2.into_affine(),
            tau_g2: (g2 * tau).into_affine(),
        };
        (ck, vk, domain)
    }

    #[test]
    fn update_grows_levels_lazily() {
        let (ck, _vk, _domain) = toy_keys();
        let mut tree = Tree::new();
        assert_eq!(tree.level0().len(), 0);

        tree.update(0, Fr::from(7u64), &ck).unwrap();
        assert_eq!(tree.level0().len(), 1);
        assert_eq!(tree.level1().len(), 1);
        assert_eq!(tree.level2().len(), 1);
    }

    #[test]
    fn update_across_a_block_boundary_grows_level0_only_as_needed() {
        let (ck, _vk, _domain) = toy_keys();
        let mut tree = Tree::new();

        tree.update(N as u64, Fr::from(1u64), &ck).unwrap();
        assert_eq!(tree.level0().len(), 2);
        // still a single level1 block: N leaves in level0 map to one level1 slot.
        assert_eq!(tree.level1().len(), 1);
    }

    #[test]
    fn level_consistency_holds_after_update() {
        let (ck, _vk, _domain) = toy_keys();
        let mut tree = Tree::new();
        tree.update(5, Fr::from(42u64), &ck).unwrap();

        let h0 = hash_commitment(&tree.level0()[0].commitment());
        assert_eq!(tree.level1()[0].values()[0], h0);

        let h1 = hash_commitment(&tree.level1()[0].commitment());
        assert_eq!(tree.level2()[0].values()[0], h1);
    }

    #[test]
    fn open_triples_rejects_mismatched_value() {
        let (ck, _vk, domain) = toy_keys();
        let mut tree = Tree::new();
        tree.update(5, Fr::from(42u64), &ck).unwrap();

        assert!(matches!(
            tree.open_triples(5, Fr::from(99u64), &domain),
            Err(Error::LeafMismatch { index: 5 })
        ));
    }

    #[test]
    fn update_out_of_range_is_rejected() {
        let (ck, _vk, _domain) = toy_keys();
        let mut tree = Tree::new();
        let k = (N as u64) * (N as u64) * (N as u64);
        assert!(matches!(
            tree.update(k, Fr::from(1u64), &ck),
            Err(Error::IndexOutOfRange { .. })
        ));
    }
}
