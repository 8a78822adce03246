//! Inclusion proof records for chunked files.
//!
//! A `FileInclusionProof` holds one `ChunkInclusionProof` per chunk on the
//! path from the leaf chunk holding the proved segment up to the root chunk.
//! Levels skipped by a carrier chunk have no record, so the number of levels
//! depends on the position of the segment.

use bincode::{Decode, Encode};

use crate::{
    BmtError,
    error::Result,
    hash::{CHUNK_BMT_LEVELS, Segment, span_value},
};

mod tests;

/// Sister segments of one chunk on the proof path, with that chunk's span.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkInclusionProof {
    /// Encoded span of the chunk.
    pub span: Vec<u8>,
    /// Sister segments, bottom-up.
    pub sister_segments: Vec<Segment>,
}

impl ChunkInclusionProof {
    /// Decoded span of the chunk.
    pub fn span_value(&self) -> Result<u64> {
        span_value(&self.span)
    }
}

/// Bottom-up inclusion proof of a segment in a chunked file.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileInclusionProof {
    pub levels: Vec<ChunkInclusionProof>,
}

impl FileInclusionProof {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// File length claimed by the proof, read from the root chunk's span.
    ///
    /// Callers must compare this against the expected file length before
    /// trusting the proof.
    pub fn file_size(&self) -> Result<u64> {
        self.levels
            .last()
            .ok_or_else(|| BmtError::InvalidProof("proof has no levels".into()))?
            .span_value()
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| BmtError::InvalidData(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects levels whose sister count or span width is malformed.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 1024 * 1024 }>();
        let (proof, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| BmtError::InvalidData(format!("decode error: {}", e)))?;
        if proof.levels.is_empty() {
            return Err(BmtError::InvalidProof("proof has no levels".into()));
        }
        for (i, level) in proof.levels.iter().enumerate() {
            if level.sister_segments.len() != CHUNK_BMT_LEVELS {
                return Err(BmtError::InvalidProof(format!(
                    "level {} has {} sister segments, expected {}",
                    i,
                    level.sister_segments.len(),
                    CHUNK_BMT_LEVELS
                )));
            }
            level.span_value()?;
        }
        Ok(proof)
    }
}
