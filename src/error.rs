//! Discriminated error kind shared by every fallible operation in the crate.
//!
//! Mirrors the taxonomy used throughout `original_source`'s
//! `aftermath::not_an_error` quiet-error discipline: every fallible
//! operation reports one of a small, fixed set of kinds rather than an
//! open-ended string.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The error kinds surfaced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A constructed value violated one of its own invariants
    /// (e.g. a non-finite or non-positive model parameter).
    #[error("logic error: {0}")]
    Logic(String),

    /// A caller supplied an argument outside its documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value fell outside the mathematical domain of an operation.
    #[error("domain error: {0}")]
    Domain(String),

    /// Two collections that were required to have matching lengths did not.
    #[error("length mismatch: {0}")]
    Length(String),

    /// An index or value fell outside a required range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A failure detected only at run time (e.g. state desynchronization
    /// between a statistic and the stopping time it feeds).
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A numeric value failed a range check after computation.
    #[error("range error: {0}")]
    Range(String),

    /// A numeric computation overflowed its representable range.
    #[error("overflow: {0}")]
    Overflow(String),

    /// A numeric computation underflowed its representable range.
    #[error("underflow: {0}")]
    Underflow(String),

    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed as valid JSON, or did
    /// not conform to the expected schema.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn logic<S: Into<String>>(message: S) -> Self {
        Error::Logic(message.into())
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn runtime<S: Into<String>>(message: S) -> Self {
        Error::Runtime(message.into())
    }
}
