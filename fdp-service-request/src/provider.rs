use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ChainError, RequestError, Result};

/// Read side of a chain node: confirmation of submitted transactions and
/// account balances.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Handle of a submitted transaction.
    type Tx: Clone + Send + Sync;

    /// Account address.
    type Address: Send + Sync;

    /// Resolve once `tx` is mined. Fails if the transaction reverted.
    ///
    /// Implementations may wait indefinitely, the caller bounds the wait.
    async fn wait_for_transaction(&self, tx: &Self::Tx) -> core::result::Result<(), ChainError>;

    /// Balance of `address` in wei.
    async fn get_balance(&self, address: &Self::Address) -> core::result::Result<u128, ChainError>;
}

#[async_trait]
impl<P: ChainProvider + ?Sized> ChainProvider for Arc<P> {
    type Tx = P::Tx;
    type Address = P::Address;

    async fn wait_for_transaction(&self, tx: &P::Tx) -> core::result::Result<(), ChainError> {
        (**self).wait_for_transaction(tx).await
    }

    async fn get_balance(&self, address: &P::Address) -> core::result::Result<u128, ChainError> {
        (**self).get_balance(address).await
    }
}

/// Fail with a precondition error unless `address` holds at least
/// `min_balance` wei.
pub async fn assert_min_balance<P: ChainProvider + ?Sized>(
    provider: &P,
    address: &P::Address,
    min_balance: u128,
) -> Result<()> {
    let balance = provider
        .get_balance(address)
        .await
        .map_err(RequestError::Query)?;
    if balance < min_balance {
        return Err(RequestError::PreconditionFailed("Not enough funds".into()));
    }
    Ok(())
}
