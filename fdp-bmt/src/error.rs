use thiserror::Error;

/// Errors from BMT addressing and proof operations.
///
/// All variants are validation failures on caller input; none of them
/// carry retry semantics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BmtError {
    #[error("The given segment index {index} is greater than {max}")]
    InvalidSegmentIndex { index: u64, max: u64 },
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    #[error("payload of {length} bytes exceeds the maximum chunk payload of {max} bytes")]
    PayloadTooLarge { length: usize, max: usize },
    #[error("span size must be between 1 and 8 bytes, got {0}")]
    InvalidSpanSize(usize),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Alias for `core::result::Result<T, BmtError>`.
pub type Result<T> = core::result::Result<T, BmtError>;
