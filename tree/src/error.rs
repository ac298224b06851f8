use thiserror::Error;

/// Errors produced by the tree, its aggregated opener, and its ingestion
/// pipeline. Wraps [`vector_commit::Error`] for failures that originate one
/// level down.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    VectorCommit(#[from] vector_commit::Error),

    #[error("global index {index} is out of range for a tree of depth 3, fanout {fanout}")]
    IndexOutOfRange { index: u64, fanout: usize },

    #[error("leaf value at index {index} does not match the value supplied to open_triples")]
    LeafMismatch { index: u64 },

    #[error("aggregation challenge collided with a leaf point after {retries} retries")]
    ChallengeCollision { retries: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
