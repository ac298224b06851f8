//! Domain-separated SHA-256 -> field-element reduction used to derive
//! Fiat-Shamir challenges.

use ark_bls12_381::Fr;
use ark_ff::{BigInteger, PrimeField};
use sha2::{Digest, Sha256};

/// EIP-4844 Fiat-Shamir domain separator for [`challenge_poly`].
pub const FSBLOBVERIFY_V1_DST: &[u8] = b"FSBLOBVERIFY_V1_";

/// Hashes the concatenation of `parts` with SHA-256 and reduces the 32-byte
/// big-endian digest modulo `|Fr|`. No domain separator is added at this
/// layer; callers that need one (e.g. [`challenge_poly`]) fold it into
/// `parts` themselves.
pub fn hash_to_field(parts: &[&[u8]]) -> Fr {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    Fr::from_be_bytes_mod_order(&digest)
}

/// The EIP-4844-style challenge for a single-polynomial opening:
/// `SHA256(DST ‖ u128_be(n) ‖ value_0 ‖ … ‖ value_{n-1} ‖ commitment)`,
/// reduced modulo `|Fr|`.
///
/// `n` is encoded as a 16-byte big-endian integer with the first 8 bytes
/// zero, matching the EIP-4844 `compute_challenge` convention.
pub fn challenge_poly(values: &[Fr], commitment_bytes: &[u8]) -> Fr {
    let mut hasher = Sha256::new();
    hasher.update(FSBLOBVERIFY_V1_DST);
    let mut size_be = [0u8; 16];
    size_be[8..].copy_from_slice(&(values.len() as u64).to_be_bytes());
    hasher.update(size_be);
    for value in values {
        hasher.update(field_to_be_bytes(value));
    }
    hasher.update(commitment_bytes);
    let digest = hasher.finalize();
    Fr::from_be_bytes_mod_order(&digest)
}

/// Canonical 32-byte big-endian encoding of a scalar field element.
pub fn field_to_be_bytes(f: &Fr) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    let raw = f.into_bigint().to_bytes_be();
    // `to_bytes_be` omits leading zero bytes; right-align into the fixed buffer.
    bytes[32 - raw.len()..].copy_from_slice(&raw);
    bytes
}
