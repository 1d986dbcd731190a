//! # Paged Reader - Page-Cached Random Access for Large Files
//!
//! `paged-reader` gives byte-addressed, read-only access to files of any size
//! while keeping a bounded number of fixed-size pages in memory.
//!
//! - **Bounded memory**: at most `page_count` pages of `page_size` bytes are resident
//! - **LRU eviction** with exactly-once loading under concurrent misses
//! - **Seamless page boundaries**: big-endian scalars and bulk ranges may straddle any number of pages
//! - **Positioned reads**: no shared file cursor, so readers can be shared across threads
//! - **Stream view** with mark/reset/skip, usable as `std::io::Read + Seek`
//!
//! ## Modules
//!
//! - [`error`] - Error types for reader operations
//! - [`config`] - Page size / page count configuration, TOML loading
//! - [`io`] - Byte sources (file, shared handle, memory)
//! - [`page`] - Fixed-size page buffers
//! - [`loader`] - Page index to page buffer, short-read policy
//! - [`buffer_pool`] - LRU page cache
//! - [`reader`] - Random-access reader
//! - [`stream`] - Sequential stream view
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paged_reader::{PagedReader, Result};
//! use std::io::Read;
//!
//! # fn main() -> Result<()> {
//! // 4KB pages, at most 64 of them in memory
//! let reader = PagedReader::open("large.bin", 4096, 64)?;
//!
//! let header = reader.get_u32(0)?;
//! let value = reader.get_f64(4094)?; // crosses a page boundary
//!
//! let mut stream = reader.stream();
//! stream.skip(16);
//! stream.mark(0);
//! let mut chunk = [0u8; 32];
//! stream.read_exact(&mut chunk)?;
//! stream.reset()?;
//!
//! println!("hit rate: {:.1}%", reader.stats().hit_rate());
//! reader.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  PagedReader / StreamView                   │
//! │   - bounds checks, offset -> (page, offset) │
//! │   - direct or byte-stitched decoding        │
//! ├─────────────────────────────────────────────┤
//! │  PageCache (LRU, page_count entries)        │
//! │   - in-flight dedup of concurrent misses    │
//! ├─────────────────────────────────────────────┤
//! │  PageLoader                                 │
//! │   - page * page_size, zero-padded last page │
//! ├─────────────────────────────────────────────┤
//! │  ByteSource (positioned read)               │
//! └─────────────────────────────────────────────┘
//! ```

pub mod buffer_pool;
pub mod config;
pub mod error;
pub mod io;
pub mod loader;
pub mod page;
pub mod reader;
pub mod stream;

// Re-export commonly used types
pub use buffer_pool::{CacheStats, PageCache};
pub use config::{ReaderConfig, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_SIZE};
pub use error::{ReaderError, Result};
pub use io::{ByteSource, FileSource, MemorySource, SharedHandleSource};
pub use loader::PageLoader;
pub use page::Page;
pub use reader::PagedReader;
pub use stream::StreamView;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
