//! Streaming authenticated-encryption codec
//!
//! Wraps an arbitrary-length plaintext stream into a self-describing,
//! tamper-evident ciphertext stream, and parses that framing back out of a
//! byte stream whose chunk boundaries bear no relation to the protocol's
//! field boundaries.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────┬────────────┬──────────────────────┬───────────┐
//! │ "V2:"    │ nonce      │ ciphertext           │ tag       │
//! │ 3 bytes  │ 16 bytes   │ same length as the   │ 16 bytes  │
//! │          │ random     │ plaintext            │ GCM       │
//! └──────────┴────────────┴──────────────────────┴───────────┘
//! ```
//!
//! Encryption is AES-256-GCM driven incrementally, so neither direction ever
//! needs the whole payload in memory. On decrypt, the trailing tag is
//! isolated from the ciphertext body by a bounded suffix window
//! ([`sealstream_chunk`]) and verified in constant time at the end of the
//! stream.
//!
//! # Security
//!
//! - Keys are exactly 32 bytes, validated before any cipher state exists,
//!   and zeroized on drop
//! - Nonces are 16 random bytes, fresh per message; a (key, nonce) pair must
//!   never be reused
//! - Any byte-level corruption of the framed message is detected at
//!   finalize; tag mismatch is a hard error, never a warning
//!
//! # Streaming Caveat
//!
//! Decryption emits plaintext chunks before the tag has been verified.
//! Emitted chunks are NOT trustworthy in isolation; authenticity is only
//! established once the decrypt stream completes without error. Callers that
//! need decrypt-then-trust semantics must buffer the output until the stream
//! ends, which is what [`Codec::open_sealed`] does.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod error;
pub mod gcm;
mod key;

pub use codec::{Codec, DecryptStream, EncryptStream, MARKER, NONCE_SIZE, TAG_SIZE};
pub use error::CodecError;
pub use key::{KEY_SIZE, SealKey};
