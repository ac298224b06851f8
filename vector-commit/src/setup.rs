//! Trusted-setup ingestion: turns a ceremony document of hex-encoded SRS
//! points into the [`CommitKey`]/[`VerifyKey`] pair the rest of the crate
//! operates on.
//!
//! Points are parsed with a data-parallel map over the input arrays (`rayon`)
//! since an `N`-sized setup has thousands of independent point decodes to do
//! and no cross-point dependency; the output preserves input order.

use ark_bls12_381::{G1Affine, G2Affine};
use ark_serialize::CanonicalDeserialize;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::info;

use crate::domain::N;
use crate::error::{Error, Result};

/// Wire shape of a trusted-setup document: three arrays of `0x`-prefixed hex
/// strings, matching the go-kzg-4844 `JSONTrustedSetup` convention.
#[derive(Debug, Deserialize)]
pub struct TrustedSetupJson {
    #[serde(rename = "setup_G1")]
    pub setup_g1: Vec<String>,
    #[serde(rename = "setup_G1_lagrange")]
    pub setup_g1_lagrange: Vec<String>,
    #[serde(rename = "setup_G2")]
    pub setup_g2: Vec<String>,
}

/// The ordered sequence of `N` Lagrange-basis G1 points `L_i = [l_i(tau)]_1`
/// used to commit to and open length-`N` value vectors.
#[derive(Clone, Debug)]
pub struct CommitKey {
    pub lagrange: Vec<G1Affine>,
}

/// `(g1 generator, g2 generator, [tau]_2)`, used to verify KZG openings.
#[derive(Clone, Copy, Debug)]
pub struct VerifyKey {
    pub g1: G1Affine,
    pub g2: G2Affine,
    pub tau_g2: G2Affine,
}

/// Parses a trusted-setup document into a [`CommitKey`]/[`VerifyKey`] pair.
///
/// The input is trusted: no subgroup check is performed on the parsed
/// points, since the ceremony output is assumed well-formed and a subgroup
/// check would dominate the cost of loading an `N`-sized setup.
pub fn load_trusted_setup(json: &str) -> Result<(CommitKey, VerifyKey)> {
    let span = tracing::info_span!("load_trusted_setup");
    let _enter = span.enter();

    let doc: TrustedSetupJson = serde_json::from_str(json)
        .map_err(|e| Error::TrustedSetupInvalid(format!("malformed JSON: {e}")))?;

    if doc.setup_g1.is_empty() {
        return Err(Error::TrustedSetupInvalid(
            "setup_G1 must contain at least the generator".into(),
        ));
    }
    if doc.setup_g1_lagrange.len() != N {
        return Err(Error::TrustedSetupInvalid(format!(
            "setup_G1_lagrange must have exactly {N} points, got {}",
            doc.setup_g1_lagrange.len()
        )));
    }
    if doc.setup_g2.len() < 2 {
        return Err(Error::TrustedSetupInvalid(
            "setup_G2 must contain at least 2 points".into(),
        ));
    }

    let g1_gen = parse_g1_no_subgroup_check(&doc.setup_g1[0])?;
    let lagrange = parse_g1_points(&doc.setup_g1_lagrange)?;
    let g2_points = parse_g2_points(&doc.setup_g2)?;

    info!(
        lagrange_points = lagrange.len(),
        g2_points = g2_points.len(),
        "trusted setup loaded"
    );

    Ok((
        CommitKey { lagrange },
        VerifyKey {
            g1: g1_gen,
            g2: g2_points[0],
            tau_g2: g2_points[1],
        },
    ))
}

fn trim_0x_prefix(s: &str) -> Result<&str> {
    s.strip_prefix("0x")
        .ok_or_else(|| Error::TrustedSetupInvalid(format!("hex string not 0x-prefixed: {s}")))
}

fn parse_g1_no_subgroup_check(hex_str: &str) -> Result<G1Affine> {
    let bytes = hex::decode(trim_0x_prefix(hex_str)?)
        .map_err(|e| Error::TrustedSetupInvalid(format!("invalid hex: {e}")))?;
    G1Affine::deserialize_compressed_unchecked(&bytes[..])
        .map_err(|e| Error::TrustedSetupInvalid(format!("invalid G1 point: {e}")))
}

fn parse_g2_no_subgroup_check(hex_str: &str) -> Result<G2Affine> {
    let bytes = hex::decode(trim_0x_prefix(hex_str)?)
        .map_err(|e| Error::TrustedSetupInvalid(format!("invalid hex: {e}")))?;
    G2Affine::deserialize_compressed_unchecked(&bytes[..])
        .map_err(|e| Error::TrustedSetupInvalid(format!("invalid G2 point: {e}")))
}

/// Parallel map over `hex_strings`, preserving input order in the output.
fn parse_g1_points(hex_strings: &[String]) -> Result<Vec<G1Affine>> {
    hex_strings
        .par_iter()
        .map(|s| parse_g1_no_subgroup_check(s))
        .collect()
}

/// Parallel map over `hex_strings`, preserving input order in the output.
fn parse_g2_points(hex_strings: &[String]) -> Result<Vec<G2Affine>> {
    hex_strings
        .par_iter()
        .map(|s| parse_g2_no_subgroup_check(s))
        .collect()
}
