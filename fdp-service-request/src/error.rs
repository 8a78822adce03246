use std::time::Duration;

use thiserror::Error;

/// Failure reported by a chain collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The transaction or call was rejected by the chain.
    #[error("{0}")]
    Reverted(String),

    /// The node could not be reached or answered with garbage.
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The confirmation wait ran out. The pending transaction is kept, a
    /// retry waits on it again instead of resubmitting.
    #[error("Transaction timeout")]
    Timeout {
        /// The bound that was exceeded
        timeout: Duration,
    },

    /// The pending transaction failed. It was dropped from the request, a
    /// retry submits a new one.
    #[error("{0}")]
    CallFailed(ChainError),

    /// Submitting the call failed before a transaction existed.
    #[error("{0}")]
    Submit(ChainError),

    /// A read-only query needed by the step failed.
    #[error("{0}")]
    Query(ChainError),

    /// A pre-flight check showed the step cannot succeed. Nothing was
    /// submitted.
    #[error("{0}")]
    PreconditionFailed(String),

    /// The request could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = core::result::Result<T, RequestError>;
