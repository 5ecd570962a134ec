//! Error types for the framing codec

use sealstream_chunk::ChunkError;
use thiserror::Error;

/// Errors from framing, parsing, and authenticating a sealed stream
///
/// Variants are deliberately distinct so callers can tell "wrong version"
/// from "tampered or corrupted" from "truncated". All of them terminate the
/// pipeline for the affected message; retry only makes sense at the
/// whole-message level because nonces must not be reused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Key is not the required length for AES-256. Raised at construction,
    /// never recoverable by retry.
    #[error("invalid key size: must be exactly 32 bytes, got {actual}")]
    InvalidKeySize {
        /// Actual key length in bytes
        actual: usize,
    },

    /// Hex-encoded key string could not be decoded
    #[error("invalid key encoding: {reason}")]
    InvalidKeyEncoding {
        /// Why decoding failed
        reason: String,
    },

    /// Stream does not start with the expected version marker. Raised
    /// before any decryption work; the codec either predates this framing
    /// version or the stream start is corrupted.
    #[error("unsupported version marker {found:?}")]
    UnsupportedVersion {
        /// The 3 bytes found where the marker was expected
        found: [u8; 3],
    },

    /// Stream ended while a fixed-size field was still required.
    /// Indicates a truncated or empty message.
    #[error("not enough data to read {needed} bytes")]
    InsufficientData {
        /// Number of bytes that were required
        needed: usize,
    },

    /// Authentication tag did not match the accumulated ciphertext.
    /// Indicates tampering, corruption, or a wrong key or nonce. Plaintext
    /// emitted before this point must be discarded.
    #[error("authentication failed: message is tampered, corrupted, or keyed differently")]
    AuthenticationFailure,
}

impl From<ChunkError> for CodecError {
    fn from(err: ChunkError) -> Self {
        match err {
            ChunkError::InsufficientData { needed } => Self::InsufficientData { needed },
        }
    }
}
