use crate::{
    BmtError, Chunk,
    chunk::padded_data,
    error::Result,
    hash::{
        BRANCHES, CHUNK_BMT_LEVELS, DEFAULT_SPAN_SIZE, Keccak256Hasher, MAX_CHUNK_PAYLOAD_SIZE,
        SEGMENT_SIZE, Segment, SegmentHasher, make_span, to_segment, validate_span_size,
    },
};

/// Binary Merkle Tree addressing over 4096-byte chunks.
///
/// Holds the injected hash primitive and the span width; every operation is
/// a pure function of its inputs, so a `Bmt` can be shared freely between
/// threads when `H` allows it.
///
/// A chunk's data is split into 128 segments of 32 bytes which are reduced
/// pairwise over 7 levels. The chunk address is `H(span || root)`.
#[derive(Debug, Clone, Copy)]
pub struct Bmt<H = Keccak256Hasher> {
    hasher: H,
    span_size: usize,
}

impl Default for Bmt<Keccak256Hasher> {
    fn default() -> Self {
        Self {
            hasher: Keccak256Hasher,
            span_size: DEFAULT_SPAN_SIZE,
        }
    }
}

impl Bmt<Keccak256Hasher> {
    /// Keccak-256 with 8-byte spans.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: SegmentHasher> Bmt<H> {
    /// Create a BMT with a custom hash primitive and span width.
    ///
    /// Span width must be between 1 and 8 inclusive.
    pub fn with_hasher(hasher: H, span_size: usize) -> Result<Self> {
        validate_span_size(span_size)?;
        Ok(Self { hasher, span_size })
    }

    pub fn span_size(&self) -> usize {
        self.span_size
    }

    pub(crate) fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Encode a span value with the configured width.
    pub fn make_span(&self, value: u64) -> Result<Vec<u8>> {
        make_span(value, self.span_size)
    }

    /// Build every level of the chunk's BMT.
    ///
    /// Level 0 holds the 128 data segments, level 7 the single root.
    pub fn bmt_tree(&self, payload: &[u8]) -> Result<Vec<Vec<Segment>>> {
        validate_payload(payload)?;
        let data = padded_data(payload);
        let mut level: Vec<Segment> = data.chunks_exact(SEGMENT_SIZE).map(to_segment).collect();
        let mut tree = Vec::with_capacity(CHUNK_BMT_LEVELS + 1);
        while level.len() > 1 {
            let next = self.reduce(&level);
            tree.push(std::mem::replace(&mut level, next));
        }
        tree.push(level);
        Ok(tree)
    }

    /// Compute the BMT root of a chunk payload.
    pub fn root_hash(&self, payload: &[u8]) -> Result<Segment> {
        validate_payload(payload)?;
        let data = padded_data(payload);
        let mut level: Vec<Segment> = data.chunks_exact(SEGMENT_SIZE).map(to_segment).collect();
        while level.len() > 1 {
            level = self.reduce(&level);
        }
        Ok(level[0])
    }

    /// Address of a leaf chunk: the span is the payload length.
    pub fn chunk_address(&self, payload: &[u8]) -> Result<Segment> {
        self.chunk_address_with_span(payload, payload.len() as u64)
    }

    /// Address of a chunk representing `span` bytes of data.
    pub fn chunk_address_with_span(&self, payload: &[u8], span: u64) -> Result<Segment> {
        let root = self.root_hash(payload)?;
        let span = self.make_span(span)?;
        Ok(self.hasher.hash(&[&span[..], &root[..]]))
    }

    /// Address of a [`Chunk`].
    pub fn address(&self, chunk: &Chunk<'_>) -> Result<Segment> {
        self.chunk_address_with_span(chunk.payload(), chunk.span())
    }

    /// Collect the sister segments on the path from `segment_index` to the
    /// root, bottom-up. One sister per reduction, 7 in total.
    pub fn inclusion_proof(&self, payload: &[u8], segment_index: usize) -> Result<Vec<Segment>> {
        if segment_index >= BRANCHES {
            return Err(BmtError::InvalidSegmentIndex {
                index: segment_index as u64,
                max: (BRANCHES - 1) as u64,
            });
        }
        let tree = self.bmt_tree(payload)?;
        let mut index = segment_index;
        let sisters = tree[..CHUNK_BMT_LEVELS]
            .iter()
            .map(|level| {
                let sister = level[index ^ 1];
                index >>= 1;
                sister
            })
            .collect();
        Ok(sisters)
    }

    /// Merge one level: node `i` of the result is `H(level[2i] || level[2i+1])`.
    fn reduce(&self, level: &[Segment]) -> Vec<Segment> {
        level
            .chunks_exact(2)
            .map(|pair| self.hasher.hash(&[&pair[0][..], &pair[1][..]]))
            .collect()
    }
}

fn validate_payload(payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_CHUNK_PAYLOAD_SIZE {
        return Err(BmtError::PayloadTooLarge {
            length: payload.len(),
            max: MAX_CHUNK_PAYLOAD_SIZE,
        });
    }
    Ok(())
}
