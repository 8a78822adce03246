use std::{future::Future, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    error::{ChainError, RequestError, Result},
    provider::ChainProvider,
    request::ServiceRequest,
};

/// Confirmation wait used when none is configured.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Executes workflow steps against a chain provider.
///
/// A step is a single side-effecting call. The runner submits it at most
/// once per attempt, remembers it in the request as pending and waits for
/// its confirmation within the configured timeout.
#[derive(Debug, Clone)]
pub struct StepRunner<P> {
    provider: P,
    timeout: Duration,
}

impl<P: ChainProvider> StepRunner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Replace the confirmation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one step of `request`.
    ///
    /// `send_call` is invoked only when the request has no pending
    /// transaction; otherwise the pending one is awaited again. Outcomes:
    ///
    /// - confirmed: the transaction moves from `pending_tx` to the end of
    ///   `completed_txs`. Advancing `stage` is left to the caller.
    /// - failed: `pending_tx` is cleared and [`RequestError::CallFailed`]
    ///   returned, so the next attempt submits again.
    /// - timed out: `pending_tx` is kept and [`RequestError::Timeout`]
    ///   returned, so the next attempt only waits.
    ///
    /// An error from `send_call` itself leaves the request untouched.
    pub async fn execute_step<D, F, Fut>(
        &self,
        request: &mut ServiceRequest<D, P::Tx>,
        send_call: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = core::result::Result<P::Tx, ChainError>>,
    {
        let tx = match request.pending_tx.clone() {
            Some(tx) => {
                debug!(stage = request.stage, "waiting on pending transaction");
                tx
            }
            None => {
                debug!(stage = request.stage, "submitting transaction");
                let tx = send_call().await.map_err(|e| {
                    warn!(stage = request.stage, error = %e, "transaction submission failed");
                    RequestError::Submit(e)
                })?;
                request.pending_tx = Some(tx.clone());
                tx
            }
        };

        match tokio::time::timeout(self.timeout, self.provider.wait_for_transaction(&tx)).await {
            Ok(Ok(())) => {
                request.pending_tx = None;
                request.completed_txs.push(tx);
                info!(
                    stage = request.stage,
                    completed = request.completed_txs.len(),
                    "transaction confirmed"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                request.pending_tx = None;
                warn!(stage = request.stage, error = %e, "transaction failed");
                Err(RequestError::CallFailed(e))
            }
            Err(_) => {
                warn!(
                    stage = request.stage,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "transaction confirmation timed out"
                );
                Err(RequestError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}
