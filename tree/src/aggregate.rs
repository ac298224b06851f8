//! The aggregated multi-level opener: combines the three per-level KZG
//! openings for one leaf into a single `(D, π)` pair that verifies with one
//! pairing check instead of three. Each level's quotient commitment is
//! folded in under its own Fiat-Shamir randomizer `r_l`, the fold point `t`
//! is itself a hash-derived challenge, and the prover emits one aggregated
//! quotient polynomial evaluated at every point in the domain.

use ark_bls12_381::{Bls12_381, Fr, G1Affine, G1Projective};
use ark_ec::{pairing::Pairing, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use vector_commit::transcript::field_to_be_bytes;
use vector_commit::{CommitKey, Domain, VerifyKey, N};

use crate::error::{Error, Result};
use crate::tree::{OpeningTriple, Tree};

const MAX_CHALLENGE_RETRIES: u32 = 4;

/// A single aggregated opening proof for one leaf: three per-level triples
/// plus the compressed commit `D`, the challenge `t`, the aggregated
/// evaluation `y`, and the aggregated quotient commitment `π`.
#[derive(Clone, Debug)]
pub struct AggregatedOpening {
    pub k: u64,
    pub triples: [OpeningTriple; 3],
    pub r0: Fr,
    pub d: G1Affine,
    pub t: Fr,
    pub y: Fr,
    pub pi: G1Affine,
}

/// `SHA256(z_0‖y_0‖c_0‖z_1‖y_1‖c_1‖z_2‖y_2‖c_2)`, leaf level first. The raw
/// digest feeds the `t` challenge; its field reduction is `r0`.
fn triples_digest(triples: &[OpeningTriple; 3]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for t in triples {
        hasher.update(field_to_be_bytes(&t.z));
        hasher.update(field_to_be_bytes(&t.y));
        let mut c_bytes = Vec::with_capacity(48);
        t.c.serialize_compressed(&mut c_bytes)
            .expect("G1Affine compressed serialization does not fail");
        hasher.update(&c_bytes);
    }
    hasher.finalize().into()
}

fn challenge_point(d: &G1Affine, digest: &[u8; 32], retry: u32) -> Fr {
    let mut d_bytes = Vec::with_capacity(48);
    d.serialize_compressed(&mut d_bytes)
        .expect("G1Affine compressed serialization does not fail");
    let mut hasher = Sha256::new();
    hasher.update(&d_bytes);
    hasher.update(digest);
    if retry > 0 {
        hasher.update(retry.to_be_bytes());
    }
    let out: [u8; 32] = hasher.finalize().into();
    Fr::from_be_bytes_mod_order(&out)
}

/// Produces the `AggregatedOpening` for leaf `k` with claimed value `v`.
pub fn open(
    tree: &Tree,
    domain: &Domain,
    ck: &CommitKey,
    k: u64,
    v: Fr,
) -> Result<AggregatedOpening> {
    let triples = tree.open_triples(k, v, domain)?;
    let digest = triples_digest(&triples);
    let r0 = Fr::from_be_bytes_mod_order(&digest);

    let d = compressed_commit(tree, domain, ck, k, &triples)?;

    let mut retry = 0;
    let t = loop {
        let candidate = challenge_point(&d, &digest, retry);
        if triples.iter().any(|tr| tr.z == candidate) {
            retry += 1;
            if retry > MAX_CHALLENGE_RETRIES {
                return Err(Error::ChallengeCollision { retries: retry });
            }
            continue;
        }
        break candidate;
    };

    let y = aggregated_evaluation(&triples, t);
    let pi = aggregated_quotient(tree, domain, ck, k, &triples, t, y)?;

    debug!(k, "aggregated opening produced");
    Ok(AggregatedOpening {
        k,
        triples,
        r0,
        d,
        t,
        y,
        pi,
    })
}

/// `D = Σ_ℓ r_ℓ · [q_ℓ(τ)]_1`, the per-level quotient commitments combined
/// under their Fiat-Shamir randomizers.
fn compressed_commit(
    tree: &Tree,
    domain: &Domain,
    ck: &CommitKey,
    k: u64,
    triples: &[OpeningTriple; 3],
) -> Result<G1Affine> {
    let (b0, b1, b2) = block_indices(k);
    let levels = [
        &tree.level0()[b0],
        &tree.level1()[b1],
        &tree.level2()[b2],
    ];

    let mut acc = G1Projective::zero();
    for (level, triple) in levels.iter().zip(triples.iter()) {
        let q = level.open_claim(domain, ck, triple.z, triple.y)?;
        acc += q.into_group() * triple.r;
    }
    Ok(acc.into_affine())
}

/// `y = Σ_ℓ r_ℓ · y_ℓ / (t − z_ℓ)`.
fn aggregated_evaluation(triples: &[OpeningTriple; 3], t: Fr) -> Fr {
    let mut sum = Fr::zero();
    for triple in triples {
        let inv = (t - triple.z).inverse().expect("t was checked against every z_l");
        sum += triple.r * triple.y * inv;
    }
    sum
}

/// `E = Σ_ℓ (r_ℓ/(t−z_ℓ)) · c_ℓ`.
fn target_commit(triples: &[OpeningTriple; 3], t: Fr) -> G1Affine {
    let mut acc = G1Projective::zero();
    for triple in triples {
        let inv = (t - triple.z).inverse().expect("t was checked against every z_l");
        acc += triple.c.into_group() * (triple.r * inv);
    }
    acc.into_affine()
}

/// The aggregated quotient polynomial, in Lagrange basis over every root
/// `x_i` of [`Domain`]:
/// `Q(x_i) = (1/(x_i−t)) · Σ_ℓ r_ℓ·[f_ℓ(x_i)/(t−z_ℓ) − q_ℓ(x_i)] − y/(x_i−t)`.
fn aggregated_quotient(
    tree: &Tree,
    domain: &Domain,
    ck: &CommitKey,
    k: u64,
    triples: &[OpeningTriple; 3],
    t: Fr,
    y: Fr,
) -> Result<G1Affine> {
    let (b0, b1, b2) = block_indices(k);
    let levels = [
        &tree.level0()[b0],
        &tree.level1()[b1],
        &tree.level2()[b2],
    ];

    let mut level_quotients = Vec::with_capacity(3);
    for (level, triple) in levels.iter().zip(triples.iter()) {
        level_quotients.push(domain.quotient_poly(level.values(), triple.z, triple.y)?);
    }

    let roots = domain.roots();
    let mut q = vec![Fr::zero(); N];
    for i in 0..N {
        let xi = roots[i];
        let mut sum = Fr::zero();
        for (idx, triple) in triples.iter().enumerate() {
            let inv_t_minus_z = (t - triple.z).inverse().expect("t was checked against every z_l");
            let f_i = levels[idx].values()[i];
            sum += triple.r * (f_i * inv_t_minus_z - level_quotients[idx][i]);
        }
        let inv_xi_minus_t = (xi - t).inverse().expect("t is drawn outside the domain");
        q[i] = (sum - y) * inv_xi_minus_t;
    }

    let pi = <G1Projective as VariableBaseMSM>::msm(&ck.lagrange, &q)
        .expect("q and the commit key have matching length");
    Ok(pi.into_affine())
}

fn block_indices(k: u64) -> (usize, usize, usize) {
    let n = N as u64;
    let b0 = k / n;
    let b1 = b0 / n;
    let b2 = b1 / n;
    (b0 as usize, b1 as usize, b2 as usize)
}

/// Verifies an [`AggregatedOpening`] against a `VerifyKey`. Recomputes the
/// Fiat-Shamir challenges from the triples and `D`, then performs the single
/// pairing check `e(E−D−[y]_1, [1]_2) == e(π, [τ]_2−[t]_2)`.
pub fn verify(vk: &VerifyKey, opening: &AggregatedOpening) -> Result<()> {
    let digest = triples_digest(&opening.triples);

    let mut retry = 0;
    let t = loop {
        let candidate = challenge_point(&opening.d, &digest, retry);
        if opening.triples.iter().any(|tr| tr.z == candidate) {
            retry += 1;
            if retry > MAX_CHALLENGE_RETRIES {
                return Err(Error::ChallengeCollision { retries: retry });
            }
            continue;
        }
        break candidate;
    };

    let y = aggregated_evaluation(&opening.triples, t);
    let e = target_commit(&opening.triples, t);

    use std::ops::Mul;
    let lhs_point = (e.into_group() - opening.d.into_group() - vk.g1.mul(y)).into_affine();
    let rhs_point = (vk.tau_g2.into_group() - vk.g2.mul(t)).into_affine();
    let lhs = Bls12_381::pairing(lhs_point, vk.g2);
    let rhs = Bls12_381::pairing(opening.pi, rhs_point);

    debug!(k = opening.k, accepted = (lhs == rhs), "aggregated opening verified");
    if lhs == rhs && y == opening.y {
        Ok(())
    } else {
        Err(Error::VectorCommit(vector_commit::Error::VerifyReject))
    }
}

/// Wire size: `k:4B ‖ 3×(z:32B‖y:32B‖c:48B) ‖ D:48B ‖ π:48B` = 436 bytes.
pub const WIRE_LEN: usize = 4 + 3 * (32 + 32 + 48) + 48 + 48;

impl AggregatedOpening {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(WIRE_LEN);
        buf.extend_from_slice(&(self.k as u32).to_be_bytes());
        for triple in &self.triples {
            buf.extend_from_slice(&field_to_be_bytes(&triple.z));
            buf.extend_from_slice(&field_to_be_bytes(&triple.y));
            triple
                .c
                .serialize_compressed(&mut buf)
                .expect("G1Affine compressed serialization does not fail");
        }
        self.d
            .serialize_compressed(&mut buf)
            .expect("G1Affine compressed serialization does not fail");
        self.pi
            .serialize_compressed(&mut buf)
            .expect("G1Affine compressed serialization does not fail");
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != WIRE_LEN {
            return Err(Error::VectorCommit(vector_commit::Error::TrustedSetupInvalid(
                format!("aggregated opening must be {WIRE_LEN} bytes, got {}", bytes.len()),
            )));
        }
        let mut cursor = bytes;
        let k = u32::from_be_bytes(cursor[..4].try_into().unwrap()) as u64;
        cursor = &cursor[4..];

        let mut triples = Vec::with_capacity(3);
        for _ in 0..3 {
            let z = Fr::from_be_bytes_mod_order(&cursor[..32]);
            cursor = &cursor[32..];
            let y = Fr::from_be_bytes_mod_order(&cursor[..32]);
            cursor = &cursor[32..];
            let c = G1Affine::deserialize_compressed_unchecked(&cursor[..48]).map_err(|e| {
                Error::VectorCommit(vector_commit::Error::TrustedSetupInvalid(format!(
                    "invalid G1 point in wire format: {e}"
                )))
            })?;
            cursor = &cursor[48..];
            triples.push(OpeningTriple::new(z, y, c));
        }
        let d = G1Affine::deserialize_compressed_unchecked(&cursor[..48]).map_err(|e| {
            Error::VectorCommit(vector_commit::Error::TrustedSetupInvalid(format!(
                "invalid D point in wire format: {e}"
            )))
        })?;
        cursor = &cursor[48..];
        let pi = G1Affine::deserialize_compressed_unchecked(&cursor[..48]).map_err(|e| {
            Error::VectorCommit(vector_commit::Error::TrustedSetupInvalid(format!(
                "invalid pi point in wire format: {e}"
            )))
        })?;

        let triples: [OpeningTriple; 3] = triples.try_into().expect("exactly 3 pushed above");
        let digest = triples_digest(&triples);
        let r0 = Fr::from_be_bytes_mod_order(&digest);
        let t = challenge_point(&d, &digest, 0);
        let y = aggregated_evaluation(&triples, t);

        Ok(Self {
            k,
            triples,
            r0,
            d,
            t,
            y,
            pi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{G1Projective, G2Projective};
    use ark_ec::Group;
    use ark_ff::UniformRand;
    use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

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
    fn aggregated_open_and_verify_round_trip() {
        let (ck, vk, domain) = toy_keys();
        let mut tree = Tree::new();
        let v = Fr::from(12345u64);
        tree.update(5, v, &ck).unwrap();

        let opening = open(&tree, &domain, &ck, 5, v).unwrap();
        verify(&vk, &opening).unwrap();
    }

    #[test]
    fn aggregated_open_rejects_wrong_leaf_value() {
        let (ck, _vk, domain) = toy_keys();
        let mut tree = Tree::new();
        tree.update(5, Fr::from(1u64), &ck).unwrap();

        assert!(matches!(
            open(&tree, &domain, &ck, 5, Fr::from(2u64)),
            Err(Error::LeafMismatch { index: 5 })
        ));
    }

    #[test]
    fn aggregated_verify_rejects_tampered_proof() {
        let (ck, vk, domain) = toy_keys();
        let mut tree = Tree::new();
        let v = Fr::from(777u64);
        tree.update(5, v, &ck).unwrap();

        let mut opening = open(&tree, &domain, &ck, 5, v).unwrap();
        opening.pi = (opening.pi.into_group() + G1Projective::generator()).into_affine();

        assert!(verify(&vk, &opening).is_err());
    }

    #[test]
    fn aggregated_open_across_three_distinct_blocks() {
        let (ck, vk, domain) = toy_keys();
        let mut tree = Tree::new();
        // Leaf N*N maps to level0 block N, level1 block 1, level2 block 0 —
        // exercises a non-trivial level1 block index.
        let k = (N as u64) * (N as u64);
        let v = Fr::from(99u64);
        tree.update(k, v, &ck).unwrap();

        let opening = open(&tree, &domain, &ck, k, v).unwrap();
        verify(&vk, &opening).unwrap();
    }

    #[test]
    fn wire_round_trip_reproduces_every_field() {
        let (ck, _vk, domain) = toy_keys();
        let mut tree = Tree::new();
        let v = Fr::from(42u64);
        tree.update(5, v, &ck).unwrap();

        let opening = open(&tree, &domain, &ck, 5, v).unwrap();
        let bytes = opening.to_bytes();
        assert_eq!(bytes.len(), WIRE_LEN);
        let decoded = AggregatedOpening::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.k, opening.k);
        assert_eq!(decoded.d, opening.d);
        assert_eq!(decoded.pi, opening.pi);
        assert_eq!(decoded.t, opening.t);
        assert_eq!(decoded.y, opening.y);
        for (a, b) in decoded.triples.iter().zip(opening.triples.iter()) {
            assert_eq!(a.z, b.z);
            assert_eq!(a.y, b.y);
            assert_eq!(a.c, b.c);
        }
    }
}
