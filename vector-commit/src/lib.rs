//! `vector-commit` is a KZG vector commitment over a fixed-size evaluation
//! domain of BLS12-381 scalars.
//!
//! A length-N vector of field elements (N = [`domain::N`]) is committed to
//! with a single G1 group element. The commitment can be updated
//! incrementally in place of points, and opened at any field element —
//! in-domain evaluations are O(1), out-of-domain evaluations use the
//! standard barycentric formula. This crate is the per-polynomial building
//! block that the `tree` crate stacks into a multi-level commitment tree.

pub mod commitment;
pub mod domain;
pub mod error;
pub mod setup;
pub mod transcript;

pub use commitment::{verify_opening, VectorCommit};
pub use domain::{Domain, N};
pub use error::{Error, Result};
pub use setup::{load_trusted_setup, CommitKey, TrustedSetupJson, VerifyKey};
