//! Reader configuration
//!
//! A reader is shaped by two numbers: how large each cached page is, and how
//! many pages may be resident at once. Both must be non-zero. Configurations
//! can be built in code or loaded from TOML:
//!
//! ```toml
//! page_size = 8192
//! page_count = 512
//! ```

use crate::error::{ReaderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default page size (4KB, matches typical filesystem blocks)
pub const DEFAULT_PAGE_SIZE: u32 = 4096;

/// Default number of resident pages (1MB of cache at the default page size)
pub const DEFAULT_PAGE_COUNT: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Size of each cached page in bytes
    pub page_size: u32,

    /// Maximum number of pages kept in memory
    pub page_count: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            page_size: DEFAULT_PAGE_SIZE,
            page_count: DEFAULT_PAGE_COUNT,
        }
    }
}

impl ReaderConfig {
    pub fn new(page_size: u32, page_count: u32) -> Self {
        ReaderConfig {
            page_size,
            page_count,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    /// Validate all fields
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ReaderError::InvalidConfig(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.page_count == 0 {
            return Err(ReaderError::InvalidConfig(
                "page_count must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on memory held by resident pages
    pub fn cache_bytes(&self) -> u64 {
        self.page_size as u64 * self.page_count as u64
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ReaderConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
