//! Framed codec: marker, nonce, ciphertext body, trailing tag
//!
//! The encrypt direction is a lazy stream that walks
//! `marker → nonce → body → tag`, emitting each field as soon as it exists.
//! The decrypt direction parses the same framing back out of an
//! arbitrarily-chunked stream: fixed-size header fields via the bounded
//! prefix extractor, the trailing tag via the bounded suffix window, and the
//! body through the incremental engine in between.
//!
//! Both directions are pull-based and single-owner: nothing is produced
//! until the consumer asks, and dropping a stream mid-message is always
//! safe. A message abandoned before the decrypt stream ends has no
//! authenticity guarantee at all.

use core::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use sealstream_chunk::{Remainder, TrailerSplit, read_prefix, split_trailer};

use crate::error::CodecError;
use crate::gcm::{GcmDecryptor, GcmEncryptor};
use crate::key::SealKey;

pub use crate::gcm::{NONCE_SIZE, TAG_SIZE};

/// Literal version marker opening every framed message
pub const MARKER: [u8; 3] = *b"V2:";

/// Streaming AES-256-GCM framing codec bound to one key.
///
/// The codec itself is reusable across messages; every
/// [`encrypt`](Self::encrypt) call draws a fresh nonce and every stream gets
/// its own single-use engine, so concurrent messages never share mutable
/// state.
pub struct Codec {
    key: SealKey,
}

impl Codec {
    /// Create a codec from a validated key.
    #[must_use]
    pub fn new(key: SealKey) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext chunk stream into a framed ciphertext stream.
    ///
    /// A fresh random 16-byte nonce is drawn from the operating system RNG.
    /// The returned stream yields the marker, the nonce, one ciphertext
    /// chunk per plaintext chunk, and finally the 16-byte tag.
    pub fn encrypt<I>(&self, plaintext: I) -> EncryptStream<I::IntoIter>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        self.encrypt_with_nonce(nonce, plaintext)
    }

    /// Encrypt with a caller-provided nonce.
    ///
    /// Exists so tests can pin the nonce and assert byte-exact output.
    ///
    /// # Security
    ///
    /// A `(key, nonce)` pair must never be reused across messages. Outside
    /// of deterministic tests, prefer [`encrypt`](Self::encrypt).
    pub fn encrypt_with_nonce<I>(
        &self,
        nonce: [u8; NONCE_SIZE],
        plaintext: I,
    ) -> EncryptStream<I::IntoIter>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        EncryptStream {
            stage: EncryptStage::Marker,
            nonce,
            engine: Some(GcmEncryptor::new(self.key.bytes(), &nonce)),
            source: plaintext.into_iter(),
        }
    }

    /// Parse and decrypt a framed ciphertext stream.
    ///
    /// The marker and nonce are read eagerly, so a wrong version or a
    /// header-truncated stream fails here rather than mid-iteration. The
    /// returned stream decrypts the body incrementally and verifies the
    /// trailing tag once the body is exhausted.
    ///
    /// Plaintext chunks are emitted before the tag is checked; they are
    /// untrusted until the stream finishes without error. Callers that need
    /// decrypt-then-trust semantics should buffer, or use
    /// [`open_sealed`](Self::open_sealed).
    ///
    /// # Errors
    ///
    /// - [`CodecError::InsufficientData`] if the stream ends inside the
    ///   marker or nonce
    /// - [`CodecError::UnsupportedVersion`] if the first 3 bytes are not
    ///   the expected marker; no decryption is attempted
    pub fn decrypt<I>(&self, ciphertext: I) -> Result<DecryptStream<I::IntoIter>, CodecError>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let (marker, rest) = read_prefix(MARKER.len(), ciphertext.into_iter())?;
        if marker != MARKER {
            let mut found = [0u8; 3];
            found.copy_from_slice(&marker);
            return Err(CodecError::UnsupportedVersion { found });
        }

        let (nonce_bytes, rest) = read_prefix(NONCE_SIZE, rest)?;
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&nonce_bytes);

        Ok(DecryptStream {
            body: split_trailer(TAG_SIZE, rest),
            engine: Some(GcmDecryptor::new(self.key.bytes(), &nonce)),
            failed: false,
        })
    }

    /// Seal a single in-memory buffer into one framed message.
    ///
    /// Convenience wrapper over [`encrypt`](Self::encrypt) for callers that
    /// do not stream.
    #[must_use]
    pub fn seal(&self, plaintext: &[u8]) -> Vec<u8> {
        self.encrypt([plaintext.to_vec()]).flatten().collect()
    }

    /// Open a single framed message, buffering all plaintext until the tag
    /// has been verified.
    ///
    /// Unlike [`decrypt`](Self::decrypt), nothing is returned unless the
    /// whole message authenticated: this is the decrypt-then-trust surface.
    ///
    /// # Errors
    ///
    /// Any [`CodecError`] from parsing, truncation, or tag verification.
    pub fn open_sealed(&self, message: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut plaintext = Vec::new();
        for chunk in self.decrypt([message.to_vec()])? {
            plaintext.extend_from_slice(&chunk?);
        }
        Ok(plaintext)
    }
}

/// Encrypt-direction stages, in emission order
enum EncryptStage {
    Marker,
    Nonce,
    Body,
    Done,
}

/// Lazy framed ciphertext stream.
///
/// Yields `marker`, `nonce`, one ciphertext chunk per plaintext chunk
/// (mirroring the caller's chunking), then the tag. Infallible: every error
/// the codec can raise on this path is ruled out at construction time.
pub struct EncryptStream<I> {
    stage: EncryptStage,
    nonce: [u8; NONCE_SIZE],
    engine: Option<GcmEncryptor>,
    source: I,
}

impl<I> Iterator for EncryptStream<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        match self.stage {
            EncryptStage::Marker => {
                self.stage = EncryptStage::Nonce;
                Some(MARKER.to_vec())
            }
            EncryptStage::Nonce => {
                self.stage = EncryptStage::Body;
                Some(self.nonce.to_vec())
            }
            EncryptStage::Body => match self.source.next() {
                Some(chunk) => {
                    let engine = self.engine.as_mut()?;
                    Some(engine.update(&chunk))
                }
                None => {
                    self.stage = EncryptStage::Done;
                    // CTR flushes nothing at finalize; the tag is the only
                    // trailing field.
                    let tag = self.engine.take()?.finalize();
                    Some(tag.to_vec())
                }
            },
            EncryptStage::Done => None,
        }
    }
}

impl<I> fmt::Debug for EncryptStream<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptStream").finish_non_exhaustive()
    }
}

/// Lazy plaintext stream with deferred authentication.
///
/// Yields one plaintext chunk per releasable ciphertext body chunk. After
/// the body is exhausted, the trailing tag is verified: on success the
/// stream simply ends, on mismatch the final item is
/// `Err(CodecError::AuthenticationFailure)` and everything previously
/// yielded must be discarded.
pub struct DecryptStream<I> {
    /// Ciphertext body with the 16-byte tag split off the end
    body: TrailerSplit<Remainder<Remainder<I>>>,
    /// Decrypt engine; consumed by tag verification
    engine: Option<GcmDecryptor>,
    /// Set once an error has been yielded; the stream is fused after that
    failed: bool,
}

impl<I> Iterator for DecryptStream<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Result<Vec<u8>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.body.next() {
            Some(Ok(chunk)) => {
                let engine = self.engine.as_mut()?;
                Some(Ok(engine.update(&chunk)))
            }
            Some(Err(err)) => {
                self.failed = true;
                Some(Err(err.into()))
            }
            None => {
                let engine = self.engine.take()?;
                let trailer = self.body.take_trailer()?;

                let mut tag = [0u8; TAG_SIZE];
                tag.copy_from_slice(&trailer);

                match engine.finalize_with_tag(&tag) {
                    Ok(()) => None,
                    Err(err) => {
                        self.failed = true;
                        Some(Err(err))
                    }
                }
            }
        }
    }
}

impl<I> fmt::Debug for DecryptStream<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptStream").field("failed", &self.failed).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Codec, CodecError, MARKER, NONCE_SIZE, TAG_SIZE};
    use crate::key::SealKey;

    fn codec() -> Codec {
        Codec::new(SealKey::from_bytes(&[0xaa; 32]).unwrap())
    }

    fn collect_frame(codec: &Codec, nonce: [u8; NONCE_SIZE], chunks: &[&[u8]]) -> Vec<u8> {
        codec
            .encrypt_with_nonce(nonce, chunks.iter().map(|c| c.to_vec()).collect::<Vec<_>>())
            .flatten()
            .collect()
    }

    #[test]
    fn frame_layout() {
        let codec = codec();
        let nonce = [0xbb; NONCE_SIZE];
        let frame = collect_frame(&codec, nonce, &[b"hello world"]);

        assert_eq!(&frame[..3], &MARKER);
        assert_eq!(&frame[3..19], &nonce);
        // Ciphertext has no expansion; tag trails it
        assert_eq!(frame.len(), 3 + NONCE_SIZE + 11 + TAG_SIZE);
        assert_ne!(&frame[19..30], b"hello world");
    }

    #[test]
    fn emission_order_is_marker_nonce_body_tag() {
        let codec = codec();
        let chunks: Vec<Vec<u8>> =
            codec.encrypt_with_nonce([0xbb; NONCE_SIZE], vec![b"abc".to_vec(), b"de".to_vec()])
                .collect();

        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], MARKER);
        assert_eq!(chunks[1], [0xbb; NONCE_SIZE]);
        // Ciphertext chunking mirrors plaintext chunking
        assert_eq!(chunks[2].len(), 3);
        assert_eq!(chunks[3].len(), 2);
        assert_eq!(chunks[4].len(), TAG_SIZE);
    }

    #[test]
    fn round_trip_through_one_buffer() {
        let codec = codec();
        let frame = codec.seal(b"Hello, World! This is a test message.");

        let plaintext = codec.open_sealed(&frame).unwrap();
        assert_eq!(plaintext, b"Hello, World! This is a test message.");
    }

    #[test]
    fn round_trip_empty_message() {
        let codec = codec();
        let frame = codec.seal(b"");
        assert_eq!(frame.len(), 3 + NONCE_SIZE + TAG_SIZE);

        assert_eq!(codec.open_sealed(&frame).unwrap(), b"");
    }

    #[test]
    fn decrypts_across_arbitrary_chunk_boundaries() {
        let codec = codec();
        let frame = codec.seal(b"Test partial decryption with multiple chunks");

        let rechunked: Vec<Vec<u8>> = frame.chunks(8).map(<[u8]>::to_vec).collect();
        let mut plaintext = Vec::new();
        for chunk in codec.decrypt(rechunked).unwrap() {
            plaintext.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(plaintext, b"Test partial decryption with multiple chunks");
    }

    #[test]
    fn wrong_marker_is_rejected_before_decryption() {
        let codec = codec();
        let mut frame = codec.seal(b"payload");
        frame[..3].copy_from_slice(b"V1:");

        let err = codec.decrypt([frame]).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion { found: *b"V1:" });
    }

    #[test]
    fn wrong_marker_does_not_pull_past_the_header() {
        let codec = codec();
        let upstream = std::iter::once(b"V1:rest-of-header".to_vec())
            .chain(std::iter::once_with(|| panic!("pulled a chunk after the marker was rejected")));

        let err = codec.decrypt(upstream).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion { found: *b"V1:" });
    }

    #[test]
    fn truncated_header_is_insufficient_data() {
        let codec = codec();

        let err = codec.decrypt([b"V2".to_vec()]).unwrap_err();
        assert_eq!(err, CodecError::InsufficientData { needed: 3 });

        let err = codec.decrypt([b"V2:short".to_vec()]).unwrap_err();
        assert_eq!(err, CodecError::InsufficientData { needed: NONCE_SIZE });
    }

    #[test]
    fn truncated_body_is_insufficient_data() {
        let codec = codec();
        let mut frame = codec.seal(b"payload");
        frame.truncate(3 + NONCE_SIZE + 7); // inside ciphertext + tag region

        let outputs: Vec<_> = codec.decrypt([frame]).unwrap().collect();
        assert_eq!(outputs.last(), Some(&Err(CodecError::InsufficientData { needed: TAG_SIZE })));
    }

    #[test]
    fn inserted_byte_fails_authentication() {
        let codec = codec();
        let mut frame = codec.seal(b"Hello, World! This is a test message.");
        frame.insert(frame.len() / 2, 0x00);

        let outputs: Vec<_> = codec.decrypt([frame]).unwrap().collect();
        assert_eq!(outputs.last(), Some(&Err(CodecError::AuthenticationFailure)));
    }

    #[test]
    fn stream_is_fused_after_failure() {
        let codec = codec();
        let mut frame = codec.seal(b"payload");
        let last = frame.len() - 1;
        frame[last] ^= 0x01;

        let mut stream = codec.decrypt([frame]).unwrap();
        let mut saw_error = false;
        for item in stream.by_ref() {
            if item.is_err() {
                saw_error = true;
            }
        }
        assert!(saw_error);
        assert!(stream.next().is_none());
    }

    #[test]
    fn random_nonces_differ_between_messages() {
        let codec = codec();
        let first = codec.seal(b"same plaintext");
        let second = codec.seal(b"same plaintext");

        assert_ne!(first[3..19], second[3..19]);
        assert_ne!(first[19..], second[19..]);
    }
}
