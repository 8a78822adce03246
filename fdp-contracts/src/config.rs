use std::time::Duration;

use fdp_service_request::DEFAULT_TRANSACTION_TIMEOUT;
use serde::{Deserialize, Serialize};

use crate::{
    error::{EnsError, Result},
    types::Address,
};

/// Registration gas reported for the local dev chain.
pub const LOCALHOST_GAS_ESTIMATION: u64 = 400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    pub ens_registry: Address,
    pub fds_registrar: Address,
    pub public_resolver: Address,
    pub reverse_resolver: Address,
    pub name_resolver: Address,
}

/// Where the ENS contracts live and how to talk to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsEnvironment {
    pub rpc_url: String,
    pub contract_addresses: ContractAddresses,
    /// Query the registry before registering a name.
    #[serde(default = "default_perform_checks")]
    pub perform_checks: bool,
    /// Gas reported by `register_username_approximate_gas`.
    pub gas_estimation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_timeout_ms: Option<u64>,
}

fn default_perform_checks() -> bool {
    true
}

impl EnsEnvironment {
    /// Load an environment from its camelCase JSON form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let environment: Self =
            serde_json::from_str(json).map_err(|e| EnsError::Config(e.to_string()))?;
        environment.validate()?;
        Ok(environment)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(EnsError::Config("rpcUrl must not be empty".into()));
        }
        Ok(())
    }

    /// Bound on each transaction confirmation wait.
    pub fn transaction_timeout(&self) -> Duration {
        self.transaction_timeout_ms
            .map_or(DEFAULT_TRANSACTION_TIMEOUT, Duration::from_millis)
    }
}

/// Built-in deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Local development chain.
    Localhost,
}

impl Environment {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Environment::Localhost => "http://127.0.0.1:9545/",
        }
    }

    /// Preset for this target using the addresses the contracts were
    /// deployed at.
    pub fn ens_environment(&self, contract_addresses: ContractAddresses) -> EnsEnvironment {
        match self {
            Environment::Localhost => EnsEnvironment {
                rpc_url: self.rpc_url().into(),
                contract_addresses,
                perform_checks: true,
                gas_estimation: LOCALHOST_GAS_ESTIMATION,
                transaction_timeout_ms: None,
            },
        }
    }
}
