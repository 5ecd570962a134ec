//! Fuzz target for chunk re-slicing boundary conditions
//!
//! The prefix and trailer extractors must hold their exactness invariants
//! for every possible chunking of every input, including pathological ones
//! (empty streams, zero-length chunks, requested sizes far beyond the data).
//!
//! # Strategy
//!
//! - Data: arbitrary bytes, cut into chunks at arbitrary positions
//! - Requested size: zero, tiny, exactly the data length, off-by-one around
//!   it, far beyond it
//! - Chunk sizes: zero-length chunks interleaved at arbitrary points
//!
//! # Invariants
//!
//! - `prefix ++ drain(remainder) == original` whenever `len >= n`, else
//!   `InsufficientData` (never a short prefix)
//! - `drain(body) ++ trailer == original` whenever `len >= n`, else
//!   `InsufficientData` (never a short or long trailer)
//! - NEVER panic, regardless of chunking

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealstream_chunk::{read_prefix, split_trailer};

#[derive(Debug, Clone, Arbitrary)]
struct ResliceCase {
    data: Vec<u8>,
    cut_sizes: Vec<u8>,
    requested: RequestedSize,
}

#[derive(Debug, Clone, Arbitrary)]
enum RequestedSize {
    Zero,
    Small(u8),
    ExactLength,
    OneShort,
    OneOver,
    FarBeyond(u16),
}

impl RequestedSize {
    fn resolve(&self, data_len: usize) -> usize {
        match self {
            Self::Zero => 0,
            Self::Small(n) => usize::from(*n),
            Self::ExactLength => data_len,
            Self::OneShort => data_len.saturating_sub(1),
            Self::OneOver => data_len + 1,
            Self::FarBeyond(n) => data_len + usize::from(*n),
        }
    }
}

fn cut_into_chunks(data: &[u8], sizes: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::with_capacity(sizes.len() + 1);
    let mut rest = data;

    for &size in sizes {
        let take = usize::from(size).min(rest.len());
        let (head, tail) = rest.split_at(take);
        chunks.push(head.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest.to_vec());
    }

    chunks
}

fuzz_target!(|case: ResliceCase| {
    let needed = case.requested.resolve(case.data.len());
    let chunks = cut_into_chunks(&case.data, &case.cut_sizes);

    // Prefix invariants
    match read_prefix(needed, chunks.clone().into_iter()) {
        Ok((prefix, remainder)) => {
            assert!(case.data.len() >= needed);
            assert_eq!(prefix, &case.data[..needed]);
            let drained: Vec<u8> = remainder.flatten().collect();
            assert_eq!(drained, &case.data[needed..]);
        }
        Err(_) => assert!(case.data.len() < needed),
    }

    // Trailer invariants
    let mut split = split_trailer(needed, chunks.into_iter());
    let mut body = Vec::new();
    let mut failed = false;
    for item in split.by_ref() {
        match item {
            Ok(chunk) => body.extend_from_slice(&chunk),
            Err(_) => failed = true,
        }
    }

    if failed {
        assert!(case.data.len() < needed);
        assert!(split.take_trailer().is_none());
    } else {
        assert!(case.data.len() >= needed);
        let trailer = split.take_trailer().unwrap();
        assert_eq!(trailer.len(), needed);
        assert_eq!(body, &case.data[..case.data.len() - needed]);
        assert_eq!(trailer, &case.data[case.data.len() - needed..]);
    }
});
