//! Proof verification.
//!
//! Pure functions: recompute a chunk root, a chunk address or a file address
//! from sister segments and the proved segment. No chunk data is needed.

use crate::{
    BmtError,
    error::Result,
    hash::{BRANCHES, CHUNK_BMT_LEVELS, SEGMENT_SIZE, Segment, SegmentHasher, validate_span_size},
    proof::FileInclusionProof,
    shape::TreeShape,
    tree::Bmt,
};

impl<H: SegmentHasher> Bmt<H> {
    /// Recompute a chunk's BMT root from the sister segments of the segment
    /// at `segment_index`.
    ///
    /// At each level the running hash is the left operand when the
    /// corresponding bit of `segment_index` is 0, the right one otherwise.
    pub fn root_hash_from_inclusion_proof(
        &self,
        sister_segments: &[Segment],
        proved_segment: Segment,
        segment_index: usize,
    ) -> Result<Segment> {
        if segment_index >= BRANCHES {
            return Err(BmtError::InvalidSegmentIndex {
                index: segment_index as u64,
                max: (BRANCHES - 1) as u64,
            });
        }
        if sister_segments.len() != CHUNK_BMT_LEVELS {
            return Err(BmtError::InvalidProof(format!(
                "expected {} sister segments, got {}",
                CHUNK_BMT_LEVELS,
                sister_segments.len()
            )));
        }

        let mut index = segment_index;
        let mut hash = proved_segment;
        for sister in sister_segments {
            hash = if index % 2 == 0 {
                self.hasher().hash(&[&hash[..], &sister[..]])
            } else {
                self.hasher().hash(&[&sister[..], &hash[..]])
            };
            index >>= 1;
        }
        Ok(hash)
    }

    /// Recompute a chunk address from an inclusion proof and the chunk's
    /// encoded span.
    pub fn chunk_address_from_inclusion_proof(
        &self,
        sister_segments: &[Segment],
        proved_segment: Segment,
        segment_index: usize,
        span: &[u8],
    ) -> Result<Segment> {
        validate_span_size(span.len())?;
        let root = self.root_hash_from_inclusion_proof(sister_segments, proved_segment, segment_index)?;
        Ok(self.hasher().hash(&[span, &root[..]]))
    }

    /// Recompute the file address from a bottom-up proof.
    ///
    /// `proved_segment` is the raw file segment zero-padded to 32 bytes and
    /// `last_chunk_index` is `(file_length - 1) / 4096`. Every level's
    /// resulting chunk address is the proved segment of the next level.
    pub fn file_address_from_inclusion_proof(
        &self,
        proof: &FileInclusionProof,
        proved_segment: Segment,
        segment_index: u64,
        last_chunk_index: u64,
    ) -> Result<Segment> {
        let file_size = proof.file_size()?;
        let segment_count = file_size.div_ceil(SEGMENT_SIZE as u64);
        if segment_index >= segment_count {
            return Err(BmtError::InvalidSegmentIndex {
                index: segment_index,
                max: segment_count.saturating_sub(1),
            });
        }

        let branches = BRANCHES as u64;
        let chunk_index = segment_index / branches;
        if chunk_index > last_chunk_index {
            return Err(BmtError::InvalidSegmentIndex {
                index: segment_index,
                max: last_chunk_index
                    .saturating_add(1)
                    .saturating_mul(branches)
                    .saturating_sub(1),
            });
        }

        let leaf_count = last_chunk_index
            .checked_add(1)
            .ok_or_else(|| BmtError::InvalidData("last chunk index overflows".into()))?;
        let steps = TreeShape::from_leaf_count(leaf_count)?.path(chunk_index)?;
        if steps.len() != proof.len() {
            return Err(BmtError::InvalidProof(format!(
                "expected {} proof levels for segment {}, got {}",
                steps.len(),
                segment_index,
                proof.len()
            )));
        }

        let mut local_index = (segment_index % branches) as usize;
        let mut hash = proved_segment;
        for (step, level) in steps.iter().zip(&proof.levels) {
            hash = self.chunk_address_from_inclusion_proof(
                &level.sister_segments,
                hash,
                local_index,
                &level.span,
            )?;
            local_index = (step.placed.index % branches) as usize;
        }
        Ok(hash)
    }
}
