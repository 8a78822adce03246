//! Username registration on the FDS ENS contracts.
//!
//! Registering a username takes four transactions: the registrar assigns
//! the name, the registry points it at the public resolver, the resolver
//! stores the owner's address, public key and name, and the reverse
//! registrar maps the address back to the name. [`Ens::register_username`]
//! drives them as one resumable [`fdp_service_request::ServiceRequest`].
//!
//! # Core types
//!
//! - [`Ens`] — registration workflow and read calls.
//! - [`EnsContracts`] — the contract calls the workflow issues.
//! - [`EnsEnvironment`] — RPC endpoint, contract addresses and checks.
//! - [`PublicKey`] / [`Address`] — hex-encoded values exchanged with the
//!   contracts.

mod config;
mod contracts;
mod domains;
mod ens;
mod error;
mod keys;
mod namehash;
mod types;

pub use config::{ContractAddresses, EnsEnvironment, Environment, LOCALHOST_GAS_ESTIMATION};
pub use contracts::{EnsContracts, ResolverRecord};
pub use domains::{ENS_DOMAIN, assert_username, is_username_valid};
pub use ens::{
    DEFAULT_REGISTRATION_EXPIRES, Ens, RegisterUsernameRequest, RegisterUsernameRequestData,
    RegisterUsernameStage,
};
pub use error::{EnsError, Result};
pub use keys::{PUBLIC_KEY_LENGTH, PublicKey};
pub use namehash::{hash_address, keccak256, labelhash, namehash};
pub use types::{Address, Node};
