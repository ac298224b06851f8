//! `tree` stacks three levels of `vector-commit`'s KZG vector commitments
//! into a single constant-size root over a flat `(index, value)` map of up
//! to `N^3` leaves, and exposes an aggregated opening protocol that proves a
//! single leaf against all three levels with one pairing check instead of
//! three independent ones.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod tree;

pub use aggregate::{open, verify, AggregatedOpening};
pub use config::TreeConfig;
pub use error::{Error, Result};
pub use ingest::{Ingestor, StateSource, VecStateSource};
pub use tree::{OpeningTriple, Tree};
