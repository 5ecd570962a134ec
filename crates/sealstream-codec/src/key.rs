//! Encryption key type
//!
//! A [`SealKey`] is the only way to hand key material to the codec. Length
//! is validated before any cipher state exists, and the bytes are zeroized
//! when the key is dropped.

use zeroize::Zeroize;

use crate::error::CodecError;

/// Key length for AES-256 (32 bytes)
pub const KEY_SIZE: usize = 32;

/// A validated 32-byte AES-256 key.
///
/// The surrounding system distributes keys as raw bytes or hex strings in
/// the environment; both entry points validate the length up front so that
/// every constructed [`Codec`](crate::Codec) holds usable key material.
#[derive(Clone)]
pub struct SealKey {
    key: [u8; KEY_SIZE],
}

impl SealKey {
    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidKeySize`] if `bytes` is not exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CodecError::InvalidKeySize { actual: bytes.len() })?;
        Ok(Self { key })
    }

    /// Create a key from a hex string (64 hex characters).
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidKeyEncoding`] if the string is not valid hex
    /// - [`CodecError::InvalidKeySize`] if the decoded key is not 32 bytes
    pub fn from_hex(encoded: &str) -> Result<Self, CodecError> {
        let mut bytes = hex::decode(encoded)
            .map_err(|err| CodecError::InvalidKeyEncoding { reason: err.to_string() })?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Raw key bytes, for engine construction only.
    pub(crate) fn bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for SealKey {
    /// Key material never appears in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SealKey(..)")
    }
}

// Zeroize key material when the key goes out of scope
impl Drop for SealKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecError, KEY_SIZE, SealKey};

    #[test]
    fn accepts_exactly_32_bytes() {
        assert!(SealKey::from_bytes(&[0xaa; KEY_SIZE]).is_ok());
    }

    #[test]
    fn rejects_wrong_lengths() {
        for len in [0usize, 15, 16, 24, 31, 33] {
            let err = SealKey::from_bytes(&vec![0xaa; len]).unwrap_err();
            assert_eq!(err, CodecError::InvalidKeySize { actual: len });
        }
    }

    #[test]
    fn from_hex_round_trips() {
        let key = SealKey::from_hex(&"aa".repeat(32)).unwrap();
        assert_eq!(key.bytes(), &[0xaa; KEY_SIZE]);
    }

    #[test]
    fn from_hex_rejects_bad_encoding() {
        let err = SealKey::from_hex("zz").unwrap_err();
        assert!(matches!(err, CodecError::InvalidKeyEncoding { .. }));
    }

    #[test]
    fn from_hex_rejects_short_keys() {
        let err = SealKey::from_hex(&"aa".repeat(16)).unwrap_err();
        assert_eq!(err, CodecError::InvalidKeySize { actual: 16 });
    }

    #[test]
    fn debug_hides_key_material() {
        let key = SealKey::from_bytes(&[0xaa; KEY_SIZE]).unwrap();
        assert_eq!(format!("{key:?}"), "SealKey(..)");
    }
}
