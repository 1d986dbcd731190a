#![no_main]
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};
use paged_reader::{MemorySource, PagedReader, ReaderConfig};

#[derive(Debug, Arbitrary)]
enum ReadOp {
    Byte(u16),
    Long(u16),
    Range { offset: u16, size: u16 },
    StreamSkip(u16),
    StreamRead(u8),
    StreamMark,
    StreamReset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    page_size: u8,
    page_count: u8,
    data: Vec<u8>,
    ops: Vec<ReadOp>,
}

// Every answer from the reader must agree with the plain slice
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);
    let input: Input = match u.arbitrary() {
        Ok(input) => input,
        Err(_) => return,
    };

    let config = ReaderConfig::new(input.page_size.max(1) as u32, input.page_count.max(1) as u32);
    let data = input.data;
    let reader = match PagedReader::from_source(MemorySource::new(data.clone()), config) {
        Ok(r) => r,
        Err(_) => return,
    };
    let mut stream = reader.stream();
    let mut mark: Option<u64> = None;

    for op in input.ops.iter().take(64) {
        match *op {
            ReadOp::Byte(offset) => {
                let expected = data.get(offset as usize).copied();
                assert_eq!(reader.get_u8(offset as u64).ok(), expected);
            }
            ReadOp::Long(offset) => {
                let at = offset as usize;
                let expected = data
                    .get(at..at + 8)
                    .map(|b| i64::from_be_bytes(b.try_into().unwrap()));
                assert_eq!(reader.get_i64(offset as u64).ok(), expected);
            }
            ReadOp::Range { offset, size } => {
                let (at, size) = (offset as usize, size as usize);
                let mut buf = vec![0u8; size];
                let result = reader.read_range(offset as u64, &mut buf, 0, size);
                match data.get(at..at + size) {
                    Some(expected) => {
                        assert!(result.is_ok());
                        assert_eq!(&buf[..], expected);
                    }
                    None => assert!(result.is_err()),
                }
            }
            ReadOp::StreamSkip(n) => {
                let before = stream.position();
                let skipped = stream.skip(n as u64);
                assert!(before + skipped <= data.len() as u64);
            }
            ReadOp::StreamRead(len) => {
                let at = stream.position() as usize;
                let mut buf = vec![0u8; len as usize];
                let n = stream.read_into(&mut buf, 0, len as usize).unwrap();
                assert_eq!(&buf[..n], &data[at..at + n]);
            }
            ReadOp::StreamMark => {
                stream.mark(0);
                mark = Some(stream.position());
            }
            ReadOp::StreamReset => match mark {
                Some(position) => {
                    stream.reset().unwrap();
                    assert_eq!(stream.position(), position);
                }
                None => assert!(stream.reset().is_err()),
            },
        }
    }
});
