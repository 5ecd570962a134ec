//! Fuzz target for the decrypt pipeline
//!
//! Decryption consumes attacker-controlled bytes sliced at
//! attacker-controlled boundaries; it must fail structurally, never panic,
//! and never accept a modified frame.
//!
//! # Strategy
//!
//! - Garbage: completely arbitrary bytes as a frame
//! - Valid-then-corrupted: seal real plaintext, then flip, insert, or
//!   truncate at an arbitrary position
//! - Boundary torture: every input re-chunked at arbitrary cut points
//!
//! # Invariants
//!
//! - Arbitrary input NEVER panics; errors are structured `CodecError`s
//! - A corrupted frame NEVER decrypts to anything (wrong plaintext output
//!   is the one unacceptable outcome)
//! - An untouched frame always round-trips, whatever the chunking

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealstream_codec::{Codec, CodecError, SealKey};

#[derive(Debug, Clone, Arbitrary)]
struct DecryptCase {
    key: [u8; 32],
    plaintext: Vec<u8>,
    cut_sizes: Vec<u8>,
    attack: Attack,
}

#[derive(Debug, Clone, Arbitrary)]
enum Attack {
    None,
    Garbage(Vec<u8>),
    FlipByte { position: u16, mask: u8 },
    InsertByte { position: u16, value: u8 },
    Truncate { keep: u16 },
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

fn decrypt_all(codec: &Codec, chunks: Vec<Vec<u8>>) -> Result<Vec<u8>, CodecError> {
    let mut plaintext = Vec::new();
    for item in codec.decrypt(chunks)? {
        plaintext.extend_from_slice(&item?);
    }
    Ok(plaintext)
}

fuzz_target!(|case: DecryptCase| {
    let Ok(key) = SealKey::from_bytes(&case.key) else {
        unreachable!("32-byte keys always validate");
    };
    let codec = Codec::new(key);

    let mut frame = codec.seal(&case.plaintext);
    let original = frame.clone();

    match case.attack {
        Attack::None => {}
        Attack::Garbage(bytes) => frame = bytes,
        Attack::FlipByte { position, mask } => {
            if !frame.is_empty() {
                let position = usize::from(position) % frame.len();
                frame[position] ^= mask;
            }
        }
        Attack::InsertByte { position, value } => {
            let position = usize::from(position) % (frame.len() + 1);
            frame.insert(position, value);
        }
        Attack::Truncate { keep } => {
            frame.truncate(usize::from(keep) % (frame.len() + 1));
        }
    }

    let modified = frame != original;

    let result = decrypt_all(&codec, cut_into_chunks(&frame, &case.cut_sizes));

    if modified {
        assert!(result.is_err(), "modified frame must not decrypt");
    } else {
        assert_eq!(result.as_deref(), Ok(case.plaintext.as_slice()));
    }
});
