//! Error types for paged reader operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    /// Requested byte span falls outside `[0, length)`
    #[error("Out of bounds: {size} bytes at offset {offset} (length {length})")]
    OutOfBounds { offset: u64, size: u64, length: u64 },

    /// Caller-supplied buffer cannot hold the requested range
    #[error("Destination too small: {size} bytes at index {start} (capacity {capacity})")]
    DestinationTooSmall {
        start: usize,
        size: usize,
        capacity: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source returned fewer bytes than the page needs before true end-of-data
    #[error("Short read on page {page}: expected {expected} bytes, got {actual}")]
    ShortRead {
        page: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid page index: {0}")]
    InvalidPageIndex(u64),

    #[error("Stream reset without a prior mark")]
    NotMarked,

    #[error("Reader is closed")]
    Closed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ReaderError {
    /// True for failures of the underlying source, which a caller may retry.
    pub fn is_io(&self) -> bool {
        matches!(self, ReaderError::Io(_) | ReaderError::ShortRead { .. })
    }
}

impl From<ReaderError> for std::io::Error {
    fn from(err: ReaderError) -> Self {
        use std::io::ErrorKind;

        let kind = match err {
            ReaderError::Io(inner) => return inner,
            ReaderError::ShortRead { .. } => ErrorKind::UnexpectedEof,
            ReaderError::Closed => ErrorKind::BrokenPipe,
            ReaderError::OutOfBounds { .. }
            | ReaderError::DestinationTooSmall { .. }
            | ReaderError::InvalidPageIndex(_)
            | ReaderError::NotMarked
            | ReaderError::InvalidConfig(_)
            | ReaderError::ConfigParse(_) => ErrorKind::InvalidInput,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
