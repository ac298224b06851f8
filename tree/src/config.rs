//! The small configuration surface a deployment must choose: where the
//! trusted setup document lives, and how chatty ingestion progress logging
//! should be. The core never reads this file itself — an embedding
//! application deserializes it and passes the resulting paths/values in.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct TreeConfig {
    pub trusted_setup_path: PathBuf,
    #[serde(default = "default_ingest_log_every")]
    pub ingest_log_every: usize,
}

fn default_ingest_log_every() -> usize {
    100_000
}
