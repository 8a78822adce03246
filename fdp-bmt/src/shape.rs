//! Level layout of a chunked file's tree.
//!
//! Chunks are grouped 128 at a time into parent chunks, level by level, until
//! one chunk remains. When a level holds `128k + 1` chunks (k ≥ 1) the trailing
//! chunk would end up as the only child of its parent; instead it is popped
//! and carried upward unchanged, then appended to the first higher level
//! whose own node count is not a multiple of 128. Such a chunk is a carrier
//! chunk. At most one carrier is in flight at a time.

use crate::{BmtError, error::Result, hash::BRANCHES};

const BRANCHES_U64: u64 = BRANCHES as u64;

/// Position of a chunk inside the file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPosition {
    /// Tree level, 0 for leaf chunks.
    pub level: usize,
    /// Index of the chunk among the nodes of that level.
    pub index: u64,
}

impl ChunkPosition {
    pub fn new(level: usize, index: u64) -> Self {
        Self { level, index }
    }
}

/// A carrier chunk: popped from `origin` and appended at `placed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierPlacement {
    pub origin: ChunkPosition,
    pub placed: ChunkPosition,
}

/// One chunk on the path from a leaf to the root.
///
/// `built` is where the chunk's payload comes from (its children live on
/// `built.level - 1`); `placed` is where its address is hashed into the
/// parent. They differ only for carrier chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub built: ChunkPosition,
    pub placed: ChunkPosition,
}

/// Node counts per level and carrier placements for a given leaf count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeShape {
    leaf_count: u64,
    /// Number of nodes on each level after carriers are popped and placed.
    level_sizes: Vec<u64>,
    carriers: Vec<CarrierPlacement>,
}

impl TreeShape {
    /// Compute the shape of a tree over `leaf_count` leaf chunks.
    pub fn from_leaf_count(leaf_count: u64) -> Result<Self> {
        if leaf_count == 0 {
            return Err(BmtError::InvalidData(
                "a file tree needs at least one chunk".into(),
            ));
        }

        let mut carriers = Vec::new();
        let mut pending: Option<ChunkPosition> = None;

        let mut size = leaf_count;
        if is_carrier_level(size) {
            pending = Some(ChunkPosition::new(0, size - 1));
            size -= 1;
        }
        let mut level_sizes = vec![size];

        while size != 1 || pending.is_some() {
            let level = level_sizes.len();
            let full_groups = size / BRANCHES_U64;
            let remainder = size % BRANCHES_U64;
            size = full_groups + u64::from(remainder != 0);

            match pending {
                Some(origin) => {
                    if size % BRANCHES_U64 != 0 {
                        carriers.push(CarrierPlacement {
                            origin,
                            placed: ChunkPosition::new(level, size),
                        });
                        size += 1;
                        pending = None;
                    }
                }
                None => {
                    if is_carrier_level(size) {
                        pending = Some(ChunkPosition::new(level, size - 1));
                        size -= 1;
                    }
                }
            }
            level_sizes.push(size);
        }

        Ok(Self {
            leaf_count,
            level_sizes,
            carriers,
        })
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    pub fn level_sizes(&self) -> &[u64] {
        &self.level_sizes
    }

    pub fn carriers(&self) -> &[CarrierPlacement] {
        &self.carriers
    }

    /// Level of the root chunk.
    pub fn root_level(&self) -> usize {
        self.level_sizes.len() - 1
    }

    /// The carrier popped from `level`, if any.
    pub fn carrier_popped_at(&self, level: usize) -> Option<&CarrierPlacement> {
        self.carriers.iter().find(|c| c.origin.level == level)
    }

    /// The carrier appended to `level`, if any.
    pub fn carrier_placed_at(&self, level: usize) -> Option<&CarrierPlacement> {
        self.carriers.iter().find(|c| c.placed.level == level)
    }

    /// Where the chunk built at `position` finally sits in the tree.
    pub fn resolve(&self, position: ChunkPosition) -> ChunkPosition {
        self.carriers
            .iter()
            .find(|c| c.origin == position)
            .map_or(position, |c| c.placed)
    }

    /// Chain of chunks from leaf chunk `chunk_index` up to the root.
    pub fn path(&self, chunk_index: u64) -> Result<Vec<PathStep>> {
        if chunk_index >= self.leaf_count {
            return Err(BmtError::InvalidData(format!(
                "chunk index {} is out of range (chunk count {})",
                chunk_index, self.leaf_count
            )));
        }

        let root_level = self.root_level();
        let mut steps = Vec::with_capacity(root_level + 1);
        let mut built = ChunkPosition::new(0, chunk_index);
        loop {
            let placed = self.resolve(built);
            steps.push(PathStep { built, placed });
            if placed.level == root_level {
                break;
            }
            built = ChunkPosition::new(placed.level + 1, placed.index / BRANCHES_U64);
        }
        Ok(steps)
    }
}

/// A level pops its trailing chunk when it would otherwise form a parent
/// with a single child.
fn is_carrier_level(size: u64) -> bool {
    size > 1 && size % BRANCHES_U64 == 1
}

/// Find where the leaf chunk holding `segment_index` sits in the tree of a
/// file whose last leaf chunk has index `last_chunk_index`.
///
/// Returns level 0 and the chunk index for ordinary chunks; a carrier leaf
/// chunk is reported at the level it was promoted to.
pub fn locate_segment(segment_index: u64, last_chunk_index: u64) -> Result<ChunkPosition> {
    let chunk_index = segment_index / BRANCHES_U64;
    if chunk_index > last_chunk_index {
        return Err(BmtError::InvalidSegmentIndex {
            index: segment_index,
            max: last_chunk_index
                .saturating_add(1)
                .saturating_mul(BRANCHES_U64)
                .saturating_sub(1),
        });
    }
    let leaf_count = last_chunk_index
        .checked_add(1)
        .ok_or_else(|| BmtError::InvalidData("last chunk index overflows".into()))?;
    let shape = TreeShape::from_leaf_count(leaf_count)?;
    Ok(shape.resolve(ChunkPosition::new(0, chunk_index)))
}
