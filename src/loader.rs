//! Page loading from a byte source
//!
//! The loader owns the source for the reader's whole lifetime. Closing the
//! loader drops the source (releasing the file handle) and makes every later
//! load fail with [`ReaderError::Closed`].

use crate::error::{ReaderError, Result};
use crate::io::ByteSource;
use crate::page::Page;
use parking_lot::RwLock;
use tracing::debug;

pub struct PageLoader {
    source: RwLock<Option<Box<dyn ByteSource>>>,
    page_size: usize,
    length: u64,
}

impl PageLoader {
    pub fn new(source: Box<dyn ByteSource>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ReaderError::InvalidConfig(
                "page_size must be greater than zero".to_string(),
            ));
        }
        let length = source.len();

        Ok(PageLoader {
            source: RwLock::new(Some(source)),
            page_size,
            length,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Source length captured at construction
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Number of pages needed to cover the source
    pub fn page_total(&self) -> u64 {
        self.length.div_ceil(self.page_size as u64)
    }

    /// Read page `index` from the source.
    ///
    /// Every page except the last must come back complete; the last page must
    /// hold exactly the bytes remaining before end-of-data. Anything shorter is
    /// a [`ReaderError::ShortRead`], never silently zero-filled.
    pub fn load(&self, index: u64) -> Result<Page> {
        let byte_offset = index
            .checked_mul(self.page_size as u64)
            .filter(|&offset| offset < self.length)
            .ok_or(ReaderError::InvalidPageIndex(index))?;
        let expected = (self.length - byte_offset).min(self.page_size as u64) as usize;

        let guard = self.source.read();
        let source = guard.as_ref().ok_or(ReaderError::Closed)?;

        let mut bytes = vec![0u8; expected];
        let actual = source.read_full_at(byte_offset, &mut bytes)?;
        if actual < expected {
            return Err(ReaderError::ShortRead {
                page: index,
                expected,
                actual,
            });
        }

        debug!(
            "Loaded page {} ({} bytes at offset {})",
            index, actual, byte_offset
        );
        Ok(Page::with_data(index, self.page_size, bytes))
    }

    /// Release the source. Returns false if it was already released.
    pub fn close(&self) -> bool {
        self.source.write().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.source.read().is_none()
    }
}
