use crate::{
    BmtError, Chunk,
    error::Result,
    hash::{BRANCHES, MAX_CHUNK_PAYLOAD_SIZE, SEGMENT_SIZE, Segment, SegmentHasher},
    proof::{ChunkInclusionProof, FileInclusionProof},
    shape::{ChunkPosition, TreeShape},
    tree::Bmt,
};

/// A file split into consecutive 4096-byte leaf chunks.
///
/// Borrows the file bytes; chunks and tree nodes are derived on demand.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedFile<'a> {
    payload: &'a [u8],
}

impl<'a> ChunkedFile<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Total length of the file, which is the span of the root chunk.
    pub fn span(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Number of leaf chunks. An empty file still has one empty chunk.
    pub fn leaf_count(&self) -> u64 {
        (self.payload.len().div_ceil(MAX_CHUNK_PAYLOAD_SIZE)).max(1) as u64
    }

    pub fn last_chunk_index(&self) -> u64 {
        self.leaf_count() - 1
    }

    /// Payload bytes of leaf chunk `index`.
    pub fn leaf_payload(&self, index: u64) -> Result<&'a [u8]> {
        if index >= self.leaf_count() {
            return Err(BmtError::InvalidData(format!(
                "leaf chunk {} is out of range (chunk count {})",
                index,
                self.leaf_count()
            )));
        }
        let start = index as usize * MAX_CHUNK_PAYLOAD_SIZE;
        let end = (start + MAX_CHUNK_PAYLOAD_SIZE).min(self.payload.len());
        Ok(&self.payload[start..end])
    }

    pub fn leaf_chunks(&self) -> Result<Vec<Chunk<'a>>> {
        (0..self.leaf_count())
            .map(|index| Chunk::new(self.leaf_payload(index)?))
            .collect()
    }
}

/// Address and span of one chunk in a file tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub address: Segment,
    pub span: u64,
}

/// Every level of a chunked file's tree, carriers already placed.
#[derive(Debug, Clone)]
pub struct FileTree {
    shape: TreeShape,
    levels: Vec<Vec<TreeNode>>,
}

impl FileTree {
    pub fn shape(&self) -> &TreeShape {
        &self.shape
    }

    pub fn levels(&self) -> &[Vec<TreeNode>] {
        &self.levels
    }

    /// The root chunk; its address is the file address.
    pub fn root(&self) -> &TreeNode {
        // The last level always holds exactly one node.
        &self.levels[self.levels.len() - 1][0]
    }

    pub fn node(&self, position: ChunkPosition) -> Option<&TreeNode> {
        self.levels
            .get(position.level)?
            .get(usize::try_from(position.index).ok()?)
    }

    /// Children addresses of the chunk built at `position`, which form its
    /// payload.
    fn intermediate_payload(&self, position: ChunkPosition) -> Result<Vec<u8>> {
        let children = self.levels.get(position.level - 1).ok_or_else(|| {
            BmtError::InvalidData(format!("no level below {}", position.level))
        })?;
        let start = position.index as usize * BRANCHES;
        let end = (start + BRANCHES).min(children.len());
        if start >= end {
            return Err(BmtError::InvalidData(format!(
                "chunk {} on level {} has no children",
                position.index, position.level
            )));
        }
        Ok(children[start..end]
            .iter()
            .flat_map(|child| child.address)
            .collect())
    }

    /// The node built at `position`: either on its own level or, for a
    /// carrier, where it was placed.
    fn built_node(&self, position: ChunkPosition) -> Result<&TreeNode> {
        let placed = self.shape.resolve(position);
        self.node(placed).ok_or_else(|| {
            BmtError::InvalidData(format!(
                "no chunk at level {} index {}",
                placed.level, placed.index
            ))
        })
    }
}

impl<H: SegmentHasher> Bmt<H> {
    /// Build the file tree bottom-up.
    pub fn file_tree(&self, file: &ChunkedFile<'_>) -> Result<FileTree> {
        let shape = TreeShape::from_leaf_count(file.leaf_count())?;

        let mut current = (0..file.leaf_count())
            .map(|index| {
                let payload = file.leaf_payload(index)?;
                Ok(TreeNode {
                    address: self.chunk_address(payload)?,
                    span: payload.len() as u64,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut carrier: Option<TreeNode> = None;
        if shape.carrier_popped_at(0).is_some() {
            carrier = current.pop();
        }

        let mut levels = Vec::with_capacity(shape.level_sizes().len());
        for level in 1..shape.level_sizes().len() {
            let next = current
                .chunks(BRANCHES)
                .map(|children| self.parent_node(children))
                .collect::<Result<Vec<_>>>()?;
            levels.push(std::mem::replace(&mut current, next));

            if shape.carrier_placed_at(level).is_some() {
                let node = carrier.take().ok_or_else(|| {
                    BmtError::InvalidData(format!("no carrier chunk to place on level {}", level))
                })?;
                current.push(node);
            } else if shape.carrier_popped_at(level).is_some() {
                carrier = current.pop();
            }
        }
        levels.push(current);

        Ok(FileTree { shape, levels })
    }

    /// Address of a chunked file.
    pub fn file_address(&self, file: &ChunkedFile<'_>) -> Result<Segment> {
        Ok(self.file_tree(file)?.root().address)
    }

    /// Collect the per-chunk proofs needed to recompute the file address from
    /// the segment at `segment_index`, leaf chunk first.
    pub fn file_inclusion_proof_bottom_up(
        &self,
        file: &ChunkedFile<'_>,
        segment_index: u64,
    ) -> Result<FileInclusionProof> {
        let tree = self.file_tree(file)?;
        self.file_inclusion_proof_from_tree(file, &tree, segment_index)
    }

    /// Same as [`file_inclusion_proof_bottom_up`](Self::file_inclusion_proof_bottom_up)
    /// but reuses an already built tree of `file`.
    pub fn file_inclusion_proof_from_tree(
        &self,
        file: &ChunkedFile<'_>,
        tree: &FileTree,
        segment_index: u64,
    ) -> Result<FileInclusionProof> {
        let segment_count = file.span().div_ceil(SEGMENT_SIZE as u64);
        if segment_index >= segment_count {
            return Err(BmtError::InvalidSegmentIndex {
                index: segment_index,
                max: segment_count.saturating_sub(1),
            });
        }
        if tree.shape().leaf_count() != file.leaf_count() {
            return Err(BmtError::InvalidData(
                "file tree was built for a different file".into(),
            ));
        }

        let branches = BRANCHES as u64;
        let steps = tree.shape().path(segment_index / branches)?;
        let mut local_index = (segment_index % branches) as usize;
        let mut levels = Vec::with_capacity(steps.len());

        for step in steps {
            let node = tree.built_node(step.built)?;
            let sister_segments = if step.built.level == 0 {
                self.inclusion_proof(file.leaf_payload(step.built.index)?, local_index)?
            } else {
                self.inclusion_proof(&tree.intermediate_payload(step.built)?, local_index)?
            };
            levels.push(ChunkInclusionProof {
                span: self.make_span(node.span)?,
                sister_segments,
            });
            local_index = (step.placed.index % branches) as usize;
        }

        Ok(FileInclusionProof { levels })
    }

    /// Parent chunk over up to 128 children: payload is the concatenated
    /// child addresses, span the sum of child spans.
    fn parent_node(&self, children: &[TreeNode]) -> Result<TreeNode> {
        let payload: Vec<u8> = children.iter().flat_map(|child| child.address).collect();
        let span = children.iter().map(|child| child.span).sum();
        Ok(TreeNode {
            address: self.chunk_address_with_span(&payload, span)?,
            span,
        })
    }
}
