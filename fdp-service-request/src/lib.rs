//! Resumable workflows made of several on-chain transactions.
//!
//! A [`ServiceRequest`] records how far a workflow got. A [`StepRunner`]
//! executes one step of it: the step's call is submitted at most once, kept
//! as pending until it is confirmed and then appended to the completed
//! transactions. Timeouts keep the pending transaction so a retry waits on
//! it again, failures drop it so a retry submits a fresh one.
//!
//! # Core types
//!
//! - [`ServiceRequest`] — serializable progress record.
//! - [`StepRunner`] — step execution with a bounded confirmation wait.
//! - [`ChainProvider`] — the chain node the runner waits on.

mod error;
mod provider;
mod request;
mod runner;

pub use error::{ChainError, RequestError, Result};
pub use provider::{ChainProvider, assert_min_balance};
pub use request::ServiceRequest;
pub use runner::{DEFAULT_TRANSACTION_TIMEOUT, StepRunner};
