use bincode::{Decode, Encode};
use fdp_service_request::{ChainProvider, RequestError, ServiceRequest, StepRunner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::EnsEnvironment,
    contracts::{EnsContracts, ResolverRecord},
    domains::{ENS_DOMAIN, assert_username},
    error::{EnsError, Result},
    keys::PublicKey,
    namehash::{hash_address, labelhash, namehash},
    types::{Address, Node},
};

/// Registration lifetime used when none is given, in seconds.
pub const DEFAULT_REGISTRATION_EXPIRES: u64 = 86_400;

/// Steps of a username registration, in execution order. The value of a
/// stage is the request stage reached once it has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegisterUsernameStage {
    FdsRegisterCompleted = 1,
    SetResolverCompleted = 2,
    SetPublicKeyCompleted = 3,
    SetNameCompleted = 4,
}

impl RegisterUsernameStage {
    pub const fn value(self) -> u32 {
        self as u32
    }
}

/// Input of a username registration.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUsernameRequestData {
    pub username: String,
    pub address: Address,
    pub public_key: PublicKey,
    pub expires: u64,
}

pub type RegisterUsernameRequest<T> = ServiceRequest<RegisterUsernameRequestData, T>;

/// Client of the FDS ENS contracts.
///
/// Read calls go straight to the contracts. Registration runs as a
/// resumable [`ServiceRequest`]: every step is submitted through the step
/// runner, so a request that failed part way can be passed in again and
/// continues with the first incomplete step.
pub struct Ens<C, P> {
    config: EnsEnvironment,
    contracts: C,
    runner: StepRunner<P>,
    domain: String,
}

impl<C, P> Ens<C, P>
where
    C: EnsContracts,
    P: ChainProvider<Tx = C::Tx>,
{
    /// Confirmation waits are bounded by the environment's transaction
    /// timeout.
    pub fn new(config: EnsEnvironment, contracts: C, provider: P) -> Result<Self> {
        config.validate()?;
        let runner = StepRunner::new(provider).with_timeout(config.transaction_timeout());
        Ok(Self {
            config,
            contracts,
            runner,
            domain: ENS_DOMAIN.into(),
        })
    }

    /// Register names under `domain` instead of the default one.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn config(&self) -> &EnsEnvironment {
        &self.config
    }

    pub fn contracts(&self) -> &C {
        &self.contracts
    }

    pub fn provider(&self) -> &P {
        self.runner.provider()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Namehash of `username` under the configured domain.
    pub fn hash_username(&self, username: &str) -> Node {
        namehash(&format!("{}.{}", username, self.domain))
    }

    /// Registry owner of `username`, zero when the name is free.
    pub async fn get_username_owner(&self, username: &str) -> Result<Address> {
        assert_username(username)?;
        Ok(self.contracts.owner(self.hash_username(username)).await?)
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool> {
        Ok(self.get_username_owner(username).await?.is_zero())
    }

    /// Request for [`register_username`](Self::register_username) with the
    /// default expiry.
    pub fn create_register_username_request(
        &self,
        username: impl Into<String>,
        address: Address,
        public_key: PublicKey,
    ) -> RegisterUsernameRequest<C::Tx> {
        self.create_register_username_request_with_expiry(
            username,
            address,
            public_key,
            DEFAULT_REGISTRATION_EXPIRES,
        )
    }

    pub fn create_register_username_request_with_expiry(
        &self,
        username: impl Into<String>,
        address: Address,
        public_key: PublicKey,
        expires: u64,
    ) -> RegisterUsernameRequest<C::Tx> {
        ServiceRequest::new(RegisterUsernameRequestData {
            username: username.into(),
            address,
            public_key,
            expires,
        })
    }

    /// Register the request's username, then set its resolver, its public
    /// key and the reverse record of the sender.
    ///
    /// Stages already recorded in `request` are skipped. On error the
    /// request holds the progress made so far and can be retried as is.
    pub async fn register_username(
        &self,
        request: &mut RegisterUsernameRequest<C::Tx>,
    ) -> Result<()> {
        let RegisterUsernameRequestData {
            username,
            address,
            public_key,
            expires,
        } = request.data.clone();
        let node = self.hash_username(&username);

        if !self.skip_stage(request, RegisterUsernameStage::FdsRegisterCompleted, &username) {
            assert_username(&username)?;
            // A pending registration may already have landed, the owner check
            // would then reject our own transaction.
            if self.config.perform_checks && !request.has_pending_tx() {
                let owner = self.get_username_owner(&username).await?;
                if !owner.is_zero() {
                    return Err(RequestError::PreconditionFailed(format!(
                        "ENS: Username {} is not available",
                        username
                    ))
                    .into());
                }
            }
            let label = labelhash(&username);
            self.runner
                .execute_step(request, || self.contracts.register(label, address, expires))
                .await?;
            self.complete_stage(request, RegisterUsernameStage::FdsRegisterCompleted, &username);
        }

        if !self.skip_stage(request, RegisterUsernameStage::SetResolverCompleted, &username) {
            let resolver = self.config.contract_addresses.public_resolver;
            self.runner
                .execute_step(request, || self.contracts.set_resolver(node, resolver))
                .await?;
            self.complete_stage(request, RegisterUsernameStage::SetResolverCompleted, &username);
        }

        if !self.skip_stage(request, RegisterUsernameStage::SetPublicKeyCompleted, &username) {
            self.set_name_and_public_key(request, &username, address, public_key)
                .await?;
            self.complete_stage(request, RegisterUsernameStage::SetPublicKeyCompleted, &username);
        }

        if !self.skip_stage(request, RegisterUsernameStage::SetNameCompleted, &username) {
            self.runner
                .execute_step(request, || self.contracts.set_name(&username))
                .await?;
            self.complete_stage(request, RegisterUsernameStage::SetNameCompleted, &username);
        }

        Ok(())
    }

    /// Write the address, public key and name records of `username` as one
    /// step of `request`.
    pub async fn set_name_and_public_key(
        &self,
        request: &mut RegisterUsernameRequest<C::Tx>,
        username: &str,
        address: Address,
        public_key: PublicKey,
    ) -> Result<()> {
        assert_username(username)?;
        if !public_key.is_set() {
            return Err(EnsError::InvalidPublicKey("Public key is not valid.".into()));
        }
        let node = self.hash_username(username);
        let record = ResolverRecord {
            address,
            content: [0u8; 32],
            multihash: [0u8; 32],
            public_key,
            name: username.into(),
        };
        self.runner
            .execute_step(request, || self.contracts.set_all(node, record))
            .await?;
        Ok(())
    }

    pub async fn get_public_key(&self, username: &str) -> Result<PublicKey> {
        assert_username(username)?;
        self.get_public_key_by_username_hash(self.hash_username(username))
            .await
    }

    pub async fn get_public_key_by_username_hash(&self, node: Node) -> Result<PublicKey> {
        let (x, y) = self.contracts.pubkey(node).await?;
        let public_key = PublicKey::from_parts(x, y);
        if !public_key.is_set() {
            return Err(EnsError::PublicKeyNotSet);
        }
        Ok(public_key)
    }

    /// Username recorded in the reverse registrar for `address`.
    pub async fn get_username_by_address(&self, address: &Address) -> Result<String> {
        let node = self
            .contracts
            .reverse_node_name(hash_address(address))
            .await?;
        if node == [0u8; 32] {
            return Err(EnsError::AddressNotInReverseRegistrar);
        }
        Ok(self.contracts.name(node).await?)
    }

    /// Gas needed by all transactions of a username registration.
    pub fn register_username_approximate_gas(&self) -> u64 {
        self.config.gas_estimation
    }

    fn skip_stage(
        &self,
        request: &RegisterUsernameRequest<C::Tx>,
        stage: RegisterUsernameStage,
        username: &str,
    ) -> bool {
        let done = request.is_stage_completed(stage.value());
        if done {
            debug!(username, stage = stage.value(), "registration stage already completed");
        }
        done
    }

    fn complete_stage(
        &self,
        request: &mut RegisterUsernameRequest<C::Tx>,
        stage: RegisterUsernameStage,
        username: &str,
    ) {
        request.complete_stage(stage.value());
        info!(
            username,
            stage = stage.value(),
            completed = request.completed_txs.len(),
            "registration stage completed"
        );
    }
}
