use thiserror::Error;

/// Errors produced by the KZG vector commitment and the trusted-setup loader.
#[derive(Error, Debug)]
pub enum Error {
    #[error("trusted setup document is invalid: {0}")]
    TrustedSetupInvalid(String),

    #[error("index {index} out of range for vector of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("quotient construction given a claimed value inconsistent with the in-domain evaluation")]
    DomainEvalMismatch,

    #[error("pairing check failed, proof rejected")]
    VerifyReject,
}

pub type Result<T> = std::result::Result<T, Error>;
