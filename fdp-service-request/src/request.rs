use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, Result};

/// Progress record of a workflow made of several transactions.
///
/// `stage` counts the completed steps of a caller-defined sequence, 0 meaning
/// nothing has run yet. `completed_txs` holds one transaction per confirmed
/// step in submission order and `pending_tx` the transaction that was
/// submitted but not yet seen confirmed.
///
/// The record is meant to be kept by the caller between attempts: running a
/// workflow again with the same request resumes after the last completed
/// step and waits on `pending_tx` instead of submitting it twice.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest<D, T> {
    pub stage: u32,
    pub data: D,
    pub completed_txs: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_tx: Option<T>,
}

impl<D, T> ServiceRequest<D, T> {
    /// A request that has not started.
    pub fn new(data: D) -> Self {
        Self {
            stage: 0,
            data,
            completed_txs: Vec::new(),
            pending_tx: None,
        }
    }

    pub fn is_stage_completed(&self, stage: u32) -> bool {
        self.stage >= stage
    }

    /// Record `stage` as reached. The stage never moves backwards.
    pub fn complete_stage(&mut self, stage: u32) {
        self.stage = self.stage.max(stage);
    }

    pub fn has_pending_tx(&self) -> bool {
        self.pending_tx.is_some()
    }
}

impl<D: Encode, T: Encode> ServiceRequest<D, T> {
    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| RequestError::Serialization(format!("encode error: {}", e)))
    }
}

impl<D: Decode<()>, T: Decode<()>> ServiceRequest<D, T> {
    /// Decode from bytes using bincode.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 1024 * 1024 }>();
        let (request, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| RequestError::Serialization(format!("decode error: {}", e)))?;
        Ok(request)
    }
}
