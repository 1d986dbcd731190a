use std::ops::Range;

/// A single cached page of file content
///
/// Pages are the unit of caching and eviction. The buffer is always exactly
/// `page_size` bytes; for the final page of a file the tail past end-of-data
/// is zero-filled and `valid_len` records where real content stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    index: u64,
    data: Box<[u8]>,
    valid_len: usize,
}

impl Page {
    /// Build a page from the bytes read for it, zero-padding up to `page_size`.
    ///
    /// Panics if `bytes` is longer than `page_size`.
    pub(crate) fn with_data(index: u64, page_size: usize, mut bytes: Vec<u8>) -> Self {
        assert!(bytes.len() <= page_size, "page data exceeds page size");
        let valid_len = bytes.len();
        bytes.resize(page_size, 0);

        Page {
            index,
            data: bytes.into_boxed_slice(),
            valid_len,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Full page buffer, including any zero-padded tail
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes backed by real file content
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    pub fn is_partial(&self) -> bool {
        self.valid_len < self.data.len()
    }

    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        &self.data[range]
    }
}
