use std::borrow::Cow;

use crate::{
    BmtError,
    error::Result,
    hash::{MAX_CHUNK_PAYLOAD_SIZE, make_span},
};

/// A unit of up to 4096 payload bytes together with the length of data it
/// represents.
///
/// For a leaf chunk the span equals the payload length. Intermediate chunks
/// of a file carry the addresses of their children as payload and the sum of
/// the children's spans as span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    payload: Cow<'a, [u8]>,
    span: u64,
}

impl<'a> Chunk<'a> {
    /// Create a leaf chunk whose span is the payload length.
    pub fn new(payload: impl Into<Cow<'a, [u8]>>) -> Result<Self> {
        let payload = payload.into();
        let span = payload.len() as u64;
        Self::with_span(payload, span)
    }

    /// Create a chunk with an explicit span value.
    pub fn with_span(payload: impl Into<Cow<'a, [u8]>>, span: u64) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_CHUNK_PAYLOAD_SIZE {
            return Err(BmtError::PayloadTooLarge {
                length: payload.len(),
                max: MAX_CHUNK_PAYLOAD_SIZE,
            });
        }
        Ok(Self { payload, span })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of data represented by this chunk.
    pub fn span(&self) -> u64 {
        self.span
    }

    /// Encoded span with the given width.
    pub fn span_bytes(&self, span_size: usize) -> Result<Vec<u8>> {
        make_span(self.span, span_size)
    }

    /// The payload zero-padded to [`MAX_CHUNK_PAYLOAD_SIZE`] bytes, which is
    /// the input of the chunk's BMT.
    pub fn data(&self) -> Vec<u8> {
        padded_data(&self.payload)
    }

    /// Detach the chunk from the buffer it borrows from.
    pub fn into_owned(self) -> Chunk<'static> {
        Chunk {
            payload: Cow::Owned(self.payload.into_owned()),
            span: self.span,
        }
    }
}

/// Zero-pad `payload` to a full chunk. Payload length must already be
/// validated.
pub(crate) fn padded_data(payload: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; MAX_CHUNK_PAYLOAD_SIZE];
    data[..payload.len()].copy_from_slice(payload);
    data
}
