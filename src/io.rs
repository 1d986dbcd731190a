//! Byte sources backing a paged reader
//!
//! Every source exposes a positioned read: the caller names the offset on each
//! call and no shared file cursor is involved. This makes concurrent page
//! loads safe without extra locking. Handles that only offer a stateful
//! seek+read pair are wrapped in [`SharedHandleSource`], which serializes the
//! pair behind a mutex.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Read-only, fixed-length byte store with positioned reads
pub trait ByteSource: Send + Sync {
    /// Total length in bytes. Fixed for the lifetime of the source.
    fn len(&self) -> u64;

    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// May return fewer bytes than requested; `Ok(0)` means end-of-data.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill as much of `buf` as the source holds, retrying partial and
    /// interrupted reads. Returns fewer than `buf.len()` bytes only when
    /// end-of-data was reached.
    fn read_full_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_at(offset + filled as u64, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// Disk-backed source using the platform's positioned read (`pread` / `ReadFile` with offset)
#[derive(Debug)]
pub struct FileSource {
    file: File,
    path: PathBuf,
    length: u64,
}

impl FileSource {
    /// Open an existing file read-only and fix its length
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(&path)?;
        let length = file.metadata()?.len();

        Ok(FileSource {
            file,
            path: path.as_ref().to_path_buf(),
            length,
        })
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.length
    }

    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(buf, offset)
    }
}

/// Adapts any stateful `Read + Seek` handle by serializing each seek+read pair
pub struct SharedHandleSource<R> {
    handle: Mutex<R>,
    length: u64,
}

impl<R: Read + Seek + Send> SharedHandleSource<R> {
    /// Wrap a handle. Its length is measured once by seeking to the end.
    pub fn new(mut handle: R) -> io::Result<Self> {
        let length = handle.seek(SeekFrom::End(0))?;
        Ok(SharedHandleSource {
            handle: Mutex::new(handle),
            length,
        })
    }

    pub fn into_inner(self) -> R {
        self.handle.into_inner()
    }
}

impl<R: Read + Seek + Send> ByteSource for SharedHandleSource<R> {
    fn len(&self) -> u64 {
        self.length
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut handle = self.handle.lock();
        handle.seek(SeekFrom::Start(offset))?;
        handle.read(buf)
    }
}

/// In-memory source, mostly useful for tests and small embedded blobs
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        MemorySource { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.data.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }
}
