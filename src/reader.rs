//! Page-cached random-access reader
//!
//! [`PagedReader`] exposes byte-addressed access to a file of any size while
//! keeping only `page_count` pages of `page_size` bytes in memory. Multi-byte
//! values are decoded big-endian. A value that fits inside one page is decoded
//! straight from that page; a value that straddles a page boundary is
//! assembled one byte at a time, each byte resolving its own page. Both paths
//! produce identical results.
//!
//! ```rust,no_run
//! use paged_reader::{PagedReader, Result};
//!
//! # fn main() -> Result<()> {
//! let reader = PagedReader::open("data.bin", 4096, 64)?;
//!
//! let magic = reader.get_u32(0)?;
//! let timestamp = reader.get_i64(8)?;
//!
//! let mut record = [0u8; 128];
//! reader.read_exact_at(1024, &mut record)?;
//!
//! reader.close()?;
//! # Ok(())
//! # }
//! ```

use crate::buffer_pool::{CacheStats, PageCache};
use crate::config::ReaderConfig;
use crate::error::{ReaderError, Result};
use crate::io::{ByteSource, FileSource};
use crate::loader::PageLoader;
use crate::stream::StreamView;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Read-only, page-cached view over a byte source
///
/// All read methods take `&self`; one reader can be shared between threads
/// (for example behind an `Arc`).
pub struct PagedReader {
    cache: PageCache,
    config: ReaderConfig,
    page_size: u64,
    length: u64,
    closed: AtomicBool,
}

impl PagedReader {
    /// Open `path` read-only with the given page size and page count
    pub fn open<P: AsRef<Path>>(path: P, page_size: u32, page_count: u32) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::new(page_size, page_count))
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        info!("Opening paged reader at {:?}", path.as_ref());
        let source = FileSource::open(path)?;
        Self::from_source(source, config)
    }

    /// Build a reader over any byte source
    pub fn from_source<S: ByteSource + 'static>(source: S, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        let capacity = usize::try_from(config.page_count)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| ReaderError::InvalidConfig("page_count out of range".to_string()))?;

        let loader = PageLoader::new(Box::new(source), config.page_size as usize)?;
        let length = loader.length();

        info!(
            "Paged reader ready: {} bytes, {} byte pages, {} resident pages",
            length, config.page_size, config.page_count
        );

        Ok(PagedReader {
            cache: PageCache::new(loader, capacity),
            config,
            page_size: config.page_size as u64,
            length,
            closed: AtomicBool::new(false),
        })
    }

    /// Total length in bytes, fixed at open time
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    pub fn page_count(&self) -> u32 {
        self.config.page_count
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resident page indices, most recently used first
    pub fn resident_pages(&self) -> Vec<u64> {
        self.cache.resident_pages()
    }

    /// Split an absolute offset into (page index, offset within page)
    fn locate(&self, offset: u64) -> (u64, usize) {
        (offset / self.page_size, (offset % self.page_size) as usize)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(ReaderError::Closed)
        } else {
            Ok(())
        }
    }

    /// Fail unless the reader is open and `[offset, offset + size)` lies inside the file
    fn check_range(&self, offset: u64, size: u64) -> Result<()> {
        self.ensure_open()?;
        match offset.checked_add(size) {
            Some(end) if end <= self.length => Ok(()),
            _ => Err(ReaderError::OutOfBounds {
                offset,
                size,
                length: self.length,
            }),
        }
    }

    /// Read the byte at `offset`
    pub fn get_u8(&self, offset: u64) -> Result<u8> {
        self.check_range(offset, 1)?;
        let (index, page_offset) = self.locate(offset);
        let page = self.cache.get_page(index)?;
        Ok(page.data()[page_offset])
    }

    /// Fetch `W` consecutive bytes, stitching across page boundaries if needed
    fn read_array<const W: usize>(&self, offset: u64) -> Result<[u8; W]> {
        self.check_range(offset, W as u64)?;
        let (index, page_offset) = self.locate(offset);
        let mut bytes = [0u8; W];

        if page_offset + W <= self.page_size as usize {
            let page = self.cache.get_page(index)?;
            bytes.copy_from_slice(page.slice(page_offset..page_offset + W));
        } else {
            for (i, byte) in bytes.iter_mut().enumerate() {
                *byte = self.get_u8(offset + i as u64)?;
            }
        }
        Ok(bytes)
    }

    pub fn get_i8(&self, offset: u64) -> Result<i8> {
        Ok(self.get_u8(offset)? as i8)
    }

    pub fn get_u16(&self, offset: u64) -> Result<u16> {
        self.read_array(offset).map(u16::from_be_bytes)
    }

    pub fn get_i16(&self, offset: u64) -> Result<i16> {
        self.read_array(offset).map(i16::from_be_bytes)
    }

    pub fn get_u32(&self, offset: u64) -> Result<u32> {
        self.read_array(offset).map(u32::from_be_bytes)
    }

    pub fn get_i32(&self, offset: u64) -> Result<i32> {
        self.read_array(offset).map(i32::from_be_bytes)
    }

    pub fn get_u64(&self, offset: u64) -> Result<u64> {
        self.read_array(offset).map(u64::from_be_bytes)
    }

    pub fn get_i64(&self, offset: u64) -> Result<i64> {
        self.read_array(offset).map(i64::from_be_bytes)
    }

    /// IEEE-754 reinterpretation of [`get_u32`](Self::get_u32)
    pub fn get_f32(&self, offset: u64) -> Result<f32> {
        self.get_u32(offset).map(f32::from_bits)
    }

    /// IEEE-754 reinterpretation of [`get_u64`](Self::get_u64)
    pub fn get_f64(&self, offset: u64) -> Result<f64> {
        self.get_u64(offset).map(f64::from_bits)
    }

    /// Copy `size` bytes starting at `offset` into `dest[dest_start..dest_start + size]`
    ///
    /// The range may span any number of pages. Each page segment is copied
    /// with a single slice copy.
    pub fn read_range(
        &self,
        offset: u64,
        dest: &mut [u8],
        dest_start: usize,
        size: usize,
    ) -> Result<()> {
        self.check_range(offset, size as u64)?;
        let dest = match dest_start.checked_add(size) {
            Some(end) if end <= dest.len() => &mut dest[dest_start..end],
            _ => {
                return Err(ReaderError::DestinationTooSmall {
                    start: dest_start,
                    size,
                    capacity: dest.len(),
                })
            }
        };
        if size == 0 {
            return Ok(());
        }

        let page_size = self.page_size as usize;
        let (start_page, start_offset) = self.locate(offset);
        let (end_page, end_offset) = self.locate(offset + size as u64 - 1);

        if start_page == end_page {
            let page = self.cache.get_page(start_page)?;
            dest.copy_from_slice(page.slice(start_offset..end_offset + 1));
            return Ok(());
        }

        let head = page_size - start_offset;
        let page = self.cache.get_page(start_page)?;
        dest[..head].copy_from_slice(page.slice(start_offset..page_size));

        let mut written = head;
        for index in start_page + 1..end_page {
            let page = self.cache.get_page(index)?;
            dest[written..written + page_size].copy_from_slice(page.data());
            written += page_size;
        }

        let page = self.cache.get_page(end_page)?;
        dest[written..].copy_from_slice(page.slice(0..end_offset + 1));
        debug_assert_eq!(written + end_offset + 1, size);

        Ok(())
    }

    /// Fill `buf` entirely from `offset`
    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let size = buf.len();
        self.read_range(offset, buf, 0, size)
    }

    /// Open a sequential stream positioned at offset 0
    pub fn stream(&self) -> StreamView<'_> {
        StreamView::new(self)
    }

    /// Release the underlying source and drop all resident pages.
    ///
    /// Safe to call more than once; every read after the first close fails
    /// with [`ReaderError::Closed`].
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.cache.loader().close() {
            debug!("Released byte source");
        }
        self.cache.clear();
        info!("Closed paged reader ({} bytes)", self.length);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for PagedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedReader")
            .field("length", &self.length)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
