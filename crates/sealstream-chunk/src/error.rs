//! Error types for chunk re-slicing

use thiserror::Error;

/// Errors from re-slicing a chunked byte stream
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// Stream ended before the requested prefix or trailer was complete.
    /// Indicates a truncated or empty message.
    #[error("not enough data to read {needed} bytes")]
    InsufficientData {
        /// Number of bytes that were required
        needed: usize,
    },
}
