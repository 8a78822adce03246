use fdp_service_request::{ChainError, RequestError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnsError {
    #[error("Username is not valid.")]
    InvalidUsername,

    #[error("{0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The resolver holds no public key for the name.
    #[error("Public key is not set or is invalid")]
    PublicKeyNotSet,

    #[error("Address is not available in reverse registrar.")]
    AddressNotInReverseRegistrar,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

pub type Result<T> = core::result::Result<T, EnsError>;
