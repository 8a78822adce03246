use sha3::{Digest, Keccak256};

use crate::{BmtError, error::Result};

/// Size of one BMT leaf segment and of every digest in the tree.
pub const SEGMENT_SIZE: usize = 32;
/// Maximum payload carried by a single chunk.
pub const MAX_CHUNK_PAYLOAD_SIZE: usize = 4096;
/// Number of segments in a chunk, which is also the branching factor of the
/// file-level tree (one child address per segment).
pub const BRANCHES: usize = MAX_CHUNK_PAYLOAD_SIZE / SEGMENT_SIZE;
/// Number of pairwise reductions from the 128 leaf segments to the root.
pub const CHUNK_BMT_LEVELS: usize = BRANCHES.trailing_zeros() as usize;
/// Width of the span prefix when none is configured.
pub const DEFAULT_SPAN_SIZE: usize = 8;

/// A 32-byte segment or digest.
pub type Segment = [u8; SEGMENT_SIZE];

/// The hash primitive used for every node of the tree and for chunk
/// addresses.
pub trait SegmentHasher {
    /// Hash the concatenation of `parts`.
    fn hash(&self, parts: &[&[u8]]) -> Segment;
}

/// Keccak-256, the digest used by Swarm-compatible addressing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl SegmentHasher for Keccak256Hasher {
    fn hash(&self, parts: &[&[u8]]) -> Segment {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}

/// Validate that the span width is in the allowed range [1, 8].
pub(crate) fn validate_span_size(span_size: usize) -> Result<()> {
    if !(1..=DEFAULT_SPAN_SIZE).contains(&span_size) {
        return Err(BmtError::InvalidSpanSize(span_size));
    }
    Ok(())
}

/// Encode `value` as a little-endian span of `span_size` bytes.
///
/// Fails if the width is out of range or the value does not fit.
pub fn make_span(value: u64, span_size: usize) -> Result<Vec<u8>> {
    validate_span_size(span_size)?;
    let bytes = value.to_le_bytes();
    if bytes[span_size..].iter().any(|b| *b != 0) {
        return Err(BmtError::InvalidData(format!(
            "span value {} does not fit into {} bytes",
            value, span_size
        )));
    }
    Ok(bytes[..span_size].to_vec())
}

/// Decode a little-endian span of 1 to 8 bytes.
pub fn span_value(span: &[u8]) -> Result<u64> {
    validate_span_size(span.len())?;
    let mut bytes = [0u8; 8];
    bytes[..span.len()].copy_from_slice(span);
    Ok(u64::from_le_bytes(bytes))
}

/// Copy a 32-byte slice into a [`Segment`].
///
/// Callers only pass slices produced by `chunks_exact(SEGMENT_SIZE)`.
pub(crate) fn to_segment(bytes: &[u8]) -> Segment {
    let mut segment = [0u8; SEGMENT_SIZE];
    segment.copy_from_slice(bytes);
    segment
}
