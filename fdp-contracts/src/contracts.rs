use async_trait::async_trait;
use fdp_service_request::ChainError;

use crate::{
    keys::PublicKey,
    types::{Address, Node},
};

/// Everything the public resolver's `setAll` writes for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverRecord {
    pub address: Address,
    pub content: [u8; 32],
    pub multihash: [u8; 32],
    pub public_key: PublicKey,
    pub name: String,
}

/// Calls into the deployed ENS contracts.
///
/// Mutating calls return once the transaction is submitted; confirmation is
/// awaited separately through a chain provider.
#[async_trait]
pub trait EnsContracts: Send + Sync {
    /// Handle of a submitted transaction.
    type Tx: Clone + Send + Sync;

    /// Registry: owner of `node`, zero when unowned.
    async fn owner(&self, node: Node) -> Result<Address, ChainError>;

    /// Registrar: register `label` under the FDS domain for `expires`
    /// seconds.
    async fn register(&self, label: Node, owner: Address, expires: u64)
    -> Result<Self::Tx, ChainError>;

    /// Registry: point `node` at `resolver`.
    async fn set_resolver(&self, node: Node, resolver: Address) -> Result<Self::Tx, ChainError>;

    /// Public resolver: write every record of `node` at once.
    async fn set_all(&self, node: Node, record: ResolverRecord) -> Result<Self::Tx, ChainError>;

    /// Reverse registrar: name the sender's address.
    async fn set_name(&self, name: &str) -> Result<Self::Tx, ChainError>;

    /// Public resolver: X and Y of the public key stored for `node`.
    async fn pubkey(&self, node: Node) -> Result<([u8; 32], [u8; 32]), ChainError>;

    /// Name resolver: the forward node recorded for a reverse node.
    async fn reverse_node_name(&self, reverse_node: Node) -> Result<Node, ChainError>;

    /// Public resolver: the name stored for `node`.
    async fn name(&self, node: Node) -> Result<String, ChainError>;
}
