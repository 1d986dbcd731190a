//! Sequential stream view over a paged reader
//!
//! A [`StreamView`] is a cursor plus a single mark slot layered on the
//! reader's random-access surface. It owns no data and no file handle; any
//! number of views can be open over one reader, each used by one thread.

use crate::error::{ReaderError, Result};
use crate::reader::PagedReader;
use std::io::{self, Read, Seek, SeekFrom};

#[derive(Debug)]
pub struct StreamView<'a> {
    reader: &'a PagedReader,
    offset: u64,
    mark: Option<u64>,
}

impl<'a> StreamView<'a> {
    pub(crate) fn new(reader: &'a PagedReader) -> Self {
        StreamView {
            reader,
            offset: 0,
            mark: None,
        }
    }

    /// Current cursor position
    pub fn position(&self) -> u64 {
        self.offset
    }

    fn remaining(&self) -> u64 {
        self.reader.len() - self.offset
    }

    /// Read one byte, or `None` at end of data
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.reader.is_closed() {
            return Err(ReaderError::Closed);
        }
        if self.offset == self.reader.len() {
            return Ok(None);
        }
        let byte = self.reader.get_u8(self.offset)?;
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Read up to `len` bytes into `buf[off..off + len]`.
    ///
    /// Returns the number of bytes copied; 0 once the cursor is at the end.
    pub fn read_into(&mut self, buf: &mut [u8], off: usize, len: usize) -> Result<usize> {
        if self.reader.is_closed() {
            return Err(ReaderError::Closed);
        }
        if off.checked_add(len).map_or(true, |end| end > buf.len()) {
            return Err(ReaderError::DestinationTooSmall {
                start: off,
                size: len,
                capacity: buf.len(),
            });
        }
        let count = usize::try_from(self.remaining()).map_or(len, |remaining| remaining.min(len));
        if count == 0 {
            return Ok(0);
        }
        self.reader.read_range(self.offset, buf, off, count)?;
        self.offset += count as u64;
        Ok(count)
    }

    /// Bytes left before end of data, saturated to `usize::MAX`
    pub fn available(&self) -> usize {
        usize::try_from(self.remaining()).unwrap_or(usize::MAX)
    }

    /// Remember the current position for [`reset`](Self::reset).
    ///
    /// The read-ahead limit is accepted for compatibility with buffered
    /// streams but ignored: the whole file stays addressable.
    pub fn mark(&mut self, _read_limit: usize) {
        self.mark = Some(self.offset);
    }

    pub fn mark_supported(&self) -> bool {
        true
    }

    /// Return to the last marked position
    pub fn reset(&mut self) -> Result<()> {
        let mark = self.mark.ok_or(ReaderError::NotMarked)?;
        self.offset = mark;
        Ok(())
    }

    /// Advance by up to `n` bytes, stopping at end of data. Returns the distance moved.
    pub fn skip(&mut self, n: u64) -> u64 {
        let skipped = n.min(self.remaining());
        self.offset += skipped;
        skipped
    }

    /// Views hold no resources; closing one leaves the reader untouched.
    pub fn close(self) {}
}

impl Read for StreamView<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        Ok(self.read_into(buf, 0, len)?)
    }
}

impl Seek for StreamView<'_> {
    /// Positions past the end clamp to the end; positions before the start are rejected.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.reader.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.offset.checked_add_signed(delta),
        };

        match target {
            Some(target) => {
                self.offset = target.min(self.reader.len());
                Ok(self.offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderConfig;
    use crate::io::MemorySource;

    fn reader(len: usize, page_size: u32) -> PagedReader {
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        PagedReader::from_source(MemorySource::new(data), ReaderConfig::new(page_size, 2)).unwrap()
    }

    #[test]
    fn test_read_byte_to_end() {
        let r = reader(5, 2);
        let mut stream = r.stream();

        for expected in 0..5u8 {
            assert_eq!(stream.read_byte().unwrap(), Some(expected));
        }
        assert_eq!(stream.read_byte().unwrap(), None);
        assert_eq!(stream.position(), 5);
    }

    #[test]
    fn test_read_into_clamps_at_end() {
        let r = reader(10, 3);
        let mut stream = r.stream();
        let mut buf = [0u8; 16];

        assert_eq!(stream.read_into(&mut buf, 2, 4).unwrap(), 4);
        assert_eq!(&buf[2..6], &[0, 1, 2, 3]);

        assert_eq!(stream.read_into(&mut buf, 0, 16).unwrap(), 6);
        assert_eq!(&buf[..6], &[4, 5, 6, 7, 8, 9]);

        assert_eq!(stream.read_into(&mut buf, 0, 16).unwrap(), 0);
    }

    #[test]
    fn test_read_into_rejects_bad_destination_at_any_position() {
        let r = reader(10, 4);
        let mut stream = r.stream();
        let mut buf = [0u8; 2];

        stream.skip(3);
        assert!(matches!(
            stream.read_into(&mut buf, 10, 5),
            Err(ReaderError::DestinationTooSmall { start: 10, size: 5, capacity: 2 })
        ));
        assert_eq!(stream.position(), 3);

        stream.skip(100);
        assert_eq!(stream.available(), 0);
        assert!(matches!(
            stream.read_into(&mut buf, 10, 5),
            Err(ReaderError::DestinationTooSmall { .. })
        ));
        assert!(matches!(
            stream.read_into(&mut buf, usize::MAX, 1),
            Err(ReaderError::DestinationTooSmall { .. })
        ));
        assert_eq!(stream.read_into(&mut buf, 0, 2).unwrap(), 0);
    }

    #[test]
    fn test_available_and_skip() {
        let r = reader(10, 4);
        let mut stream = r.stream();

        assert_eq!(stream.available(), 10);
        assert_eq!(stream.skip(3), 3);
        assert_eq!(stream.available(), 7);
        assert_eq!(stream.skip(100), 7);
        assert_eq!(stream.available(), 0);
        assert_eq!(stream.skip(1), 0);
    }

    #[test]
    fn test_mark_and_reset() {
        let r = reader(10, 4);
        let mut stream = r.stream();

        assert!(matches!(stream.reset(), Err(ReaderError::NotMarked)));

        stream.skip(2);
        stream.mark(0);
        let first = stream.read_byte().unwrap();
        stream.skip(4);
        stream.reset().unwrap();

        assert_eq!(stream.position(), 2);
        assert_eq!(stream.read_byte().unwrap(), first);

        // A new mark overwrites the old one
        stream.skip(3);
        stream.mark(1);
        stream.skip(1);
        stream.reset().unwrap();
        assert_eq!(stream.position(), 6);
    }

    #[test]
    fn test_std_read_impl() {
        let r = reader(9, 2);
        let mut stream = r.stream();
        let mut out = Vec::new();

        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, (0..9u8).collect::<Vec<_>>());
    }

    #[test]
    fn test_seek() {
        let r = reader(10, 4);
        let mut stream = r.stream();

        assert_eq!(stream.seek(SeekFrom::Start(4)).unwrap(), 4);
        assert_eq!(stream.seek(SeekFrom::Current(-1)).unwrap(), 3);
        assert_eq!(stream.seek(SeekFrom::End(-2)).unwrap(), 8);
        assert_eq!(stream.seek(SeekFrom::Start(50)).unwrap(), 10);
        assert!(stream.seek(SeekFrom::Current(-11)).is_err());
        assert_eq!(stream.position(), 10);
    }

    #[test]
    fn test_reads_fail_after_reader_close() {
        let r = reader(10, 4);
        let mut stream = r.stream();
        stream.read_byte().unwrap();

        r.close().unwrap();

        assert!(matches!(stream.read_byte(), Err(ReaderError::Closed)));
        let mut buf = [0u8; 4];
        assert!(matches!(
            stream.read_into(&mut buf, 0, 4),
            Err(ReaderError::Closed)
        ));
        let err = stream.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_independent_views() {
        let r = reader(10, 4);
        let mut a = r.stream();
        let mut b = r.stream();

        a.skip(5);
        assert_eq!(b.read_byte().unwrap(), Some(0));
        assert_eq!(a.read_byte().unwrap(), Some(5));
        a.close();
        assert_eq!(b.read_byte().unwrap(), Some(1));
    }
}
