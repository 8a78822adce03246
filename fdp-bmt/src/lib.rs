//! Binary Merkle Tree (BMT) content addressing for chunks and chunked files.
//!
//! A chunk carries up to 4096 bytes. Its data, zero-padded to 4096 bytes, is
//! split into 128 segments of 32 bytes and reduced pairwise to a root:
//!
//! `address = H(span || bmt_root(data))`
//!
//! Files are split into leaf chunks whose addresses become the segments of
//! parent chunks, 128 per parent, until a single root chunk remains. Counts
//! that leave a chunk without siblings produce carrier chunks, see
//! [`TreeShape`].
//!
//! # Core types
//!
//! - [`Bmt`] — hash primitive and span width; chunk and file addressing,
//!   proof generation and verification.
//! - [`Chunk`] / [`ChunkedFile`] — inputs.
//! - [`ChunkInclusionProof`] / [`FileInclusionProof`] — serializable proofs.
//! - [`TreeShape`] / [`locate_segment`] — level layout with carrier chunks.

mod chunk;
mod error;
mod file;
pub(crate) mod hash;
pub(crate) mod proof;
mod shape;
mod tree;
mod verify;


pub use chunk::Chunk;
pub use error::{BmtError, Result};
pub use file::{ChunkedFile, FileTree, TreeNode};
pub use hash::{
    BRANCHES, CHUNK_BMT_LEVELS, DEFAULT_SPAN_SIZE, Keccak256Hasher, MAX_CHUNK_PAYLOAD_SIZE,
    SEGMENT_SIZE, Segment, SegmentHasher, make_span, span_value,
};
pub use proof::{ChunkInclusionProof, FileInclusionProof};
pub use shape::{CarrierPlacement, ChunkPosition, PathStep, TreeShape, locate_segment};
pub use tree::Bmt;
