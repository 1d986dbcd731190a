//! Property-based tests for paging correctness
//!
//! Uses proptest to check that page geometry never leaks into the values a
//! caller observes.

use paged_reader::{MemorySource, PagedReader, ReaderConfig, ReaderError};
use proptest::prelude::*;
use std::collections::HashSet;

fn reader(data: &[u8], page_size: u32, page_count: u32) -> PagedReader {
    PagedReader::from_source(
        MemorySource::new(data.to_vec()),
        ReaderConfig::new(page_size, page_count),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_scalars_independent_of_page_size(
        data in prop::collection::vec(any::<u8>(), 8..300),
        page_size in 1u32..20,
        page_count in 1u32..6,
        offset_seed in any::<usize>()
    ) {
        let narrow = reader(&data, page_size, page_count);
        let offset = (offset_seed % (data.len() - 7)) as u64;
        let at = offset as usize;

        prop_assert_eq!(narrow.get_u8(offset).unwrap(), data[at]);
        prop_assert_eq!(
            narrow.get_i16(offset).unwrap(),
            i16::from_be_bytes(data[at..at + 2].try_into().unwrap())
        );
        prop_assert_eq!(
            narrow.get_i32(offset).unwrap(),
            i32::from_be_bytes(data[at..at + 4].try_into().unwrap())
        );
        prop_assert_eq!(
            narrow.get_i64(offset).unwrap(),
            i64::from_be_bytes(data[at..at + 8].try_into().unwrap())
        );
        prop_assert_eq!(
            narrow.get_f64(offset).unwrap().to_bits(),
            u64::from_be_bytes(data[at..at + 8].try_into().unwrap())
        );
    }

    #[test]
    fn prop_read_range_matches_single_bytes(
        data in prop::collection::vec(any::<u8>(), 1..400),
        page_size in 1u32..32,
        page_count in 1u32..4,
        start_seed in any::<usize>(),
        size_seed in any::<usize>()
    ) {
        let r = reader(&data, page_size, page_count);
        let offset = start_seed % data.len();
        let size = size_seed % (data.len() - offset + 1);

        let mut bulk = vec![0u8; size];
        r.read_range(offset as u64, &mut bulk, 0, size).unwrap();

        let singles: Vec<u8> = (0..size)
            .map(|i| r.get_u8((offset + i) as u64).unwrap())
            .collect();

        prop_assert_eq!(&bulk, &singles);
        prop_assert_eq!(&bulk[..], &data[offset..offset + size]);
    }

    #[test]
    fn prop_bounds_enforced_for_every_width(
        len in 0usize..64,
        page_size in 1u32..16,
        overshoot in 0u64..8
    ) {
        let data = vec![0xA5u8; len];
        let r = reader(&data, page_size, 2);
        let len = len as u64;

        prop_assert!(
            matches!(r.get_u8(len + overshoot), Err(ReaderError::OutOfBounds { .. })),
            "byte read past end must be out of bounds"
        );
        for width in [2u64, 4, 8] {
            let offset = (len + overshoot + 1).saturating_sub(width);
            let result = match width {
                2 => r.get_u16(offset).map(|_| ()),
                4 => r.get_u32(offset).map(|_| ()),
                _ => r.get_u64(offset).map(|_| ()),
            };
            prop_assert!(
                matches!(result, Err(ReaderError::OutOfBounds { .. })),
                "{}-byte read past end must be out of bounds",
                width
            );
        }

        let mut buf = vec![0u8; 80];
        let size = (len + overshoot + 1) as usize;
        prop_assert!(
            matches!(
                r.read_range(0, &mut buf, 0, size),
                Err(ReaderError::OutOfBounds { .. })
            ),
            "range read past end must be out of bounds"
        );
    }

    #[test]
    fn prop_cache_holds_most_recent_pages(
        accesses in prop::collection::vec(0u64..50, 1..200),
        page_count in 1u32..8
    ) {
        let data = vec![7u8; 50 * 4];
        let r = reader(&data, 4, page_count);

        for &page in &accesses {
            r.get_u8(page * 4).unwrap();
            prop_assert!(r.stats().resident <= page_count as usize);
        }

        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        for &page in accesses.iter().rev() {
            if seen.insert(page) {
                expected.push(page);
            }
            if expected.len() == page_count as usize {
                break;
            }
        }
        prop_assert_eq!(r.resident_pages(), expected);
    }

    #[test]
    fn prop_stream_matches_data(
        data in prop::collection::vec(any::<u8>(), 0..300),
        page_size in 1u32..24,
        chunk in 1usize..40
    ) {
        let r = reader(&data, page_size, 3);
        let mut stream = r.stream();
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];

        loop {
            let n = stream.read_into(&mut buf, 0, chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        prop_assert_eq!(out, data);
        prop_assert_eq!(stream.available(), 0);
    }

    #[test]
    fn prop_mark_reset_round_trip(
        data in prop::collection::vec(any::<u8>(), 1..200),
        page_size in 1u32..16,
        mark_seed in any::<usize>(),
        steps in prop::collection::vec(0u64..30, 0..10)
    ) {
        let r = reader(&data, page_size, 2);
        let mut stream = r.stream();
        let mark_at = (mark_seed % data.len()) as u64;

        stream.skip(mark_at);
        stream.mark(0);
        let first = stream.read_byte().unwrap();

        for step in steps {
            stream.skip(step);
            let _ = stream.read_byte().unwrap();
        }

        stream.reset().unwrap();
        prop_assert_eq!(stream.position(), mark_at);
        prop_assert_eq!(stream.read_byte().unwrap(), first);
    }
}
