//! Incremental AES-256-GCM engine
//!
//! The one-shot AEAD crates seal a whole message at once, which defeats the
//! point of a streaming codec. This module assembles GCM from its own
//! primitives (AES-256 block cipher, 32-bit big-endian CTR keystream, GHASH)
//! so that a single message can be encrypted or decrypted in arbitrary-size
//! increments with the tag detached at the end.
//!
//! # Construction
//!
//! Per NIST SP 800-38D with a 16-byte IV (not the 12-byte fast path):
//!
//! ```text
//! H  = AES_K(0^128)                                   GHASH key
//! J0 = GHASH_H(IV ‖ 0^64 ‖ [len(IV) in bits]_64)      pre-counter block
//! C  = CTR_K(inc32(J0), P)                            keystream starts after J0
//! T  = E_K(J0) ⊕ GHASH_H(C ‖ 0^64 ‖ [len(C) in bits]_64)
//! ```
//!
//! There is no associated data in this framing, so the AAD half of the GHASH
//! length block is always zero.
//!
//! # State
//!
//! Each engine is single-use: one key, one nonce, one direction, one
//! message. Finalize consumes the engine, so feeding data after finalize is
//! unrepresentable.

use core::fmt;

use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use ctr::Ctr32BE;
use ghash::GHash;
use ghash::universal_hash::UniversalHash;
use subtle::ConstantTimeEq;

use crate::error::CodecError;

/// GCM nonce length used by this codec (16 bytes)
pub const NONCE_SIZE: usize = 16;

/// GCM authentication tag length (16 bytes)
pub const TAG_SIZE: usize = 16;

/// GHASH/AES block length
const BLOCK_SIZE: usize = 16;

/// Shared incremental GCM state for both directions.
///
/// Tracks the CTR keystream position, the running GHASH over the
/// ciphertext, and a partial GHASH block so that chunk boundaries need not
/// align with cipher blocks.
struct GcmState {
    /// CTR keystream, positioned after the tag-mask block
    keystream: Ctr32BE<Aes256>,
    /// Running GHASH over the ciphertext
    ghash: GHash,
    /// `E_K(J0)`, XORed into the GHASH digest to form the tag
    tag_mask: [u8; BLOCK_SIZE],
    /// Ciphertext bytes waiting for a full GHASH block
    pending: [u8; BLOCK_SIZE],
    /// Number of valid bytes in `pending`
    pending_len: usize,
    /// Total ciphertext length absorbed so far, in bytes
    ciphertext_len: u64,
}

impl GcmState {
    fn new(key: &[u8; 32], nonce: &[u8; NONCE_SIZE]) -> Self {
        let block_cipher = Aes256::new(key.into());

        // H = AES_K(0^128)
        let mut hash_key = ghash::Key::default();
        block_cipher.encrypt_block(&mut hash_key);

        // J0 for a non-96-bit IV: GHASH over the IV followed by its bit length
        let mut iv_hasher = GHash::new(&hash_key);
        iv_hasher.update(&[ghash::Block::clone_from_slice(nonce)]);
        let mut iv_len_block = [0u8; BLOCK_SIZE];
        iv_len_block[8..].copy_from_slice(&((NONCE_SIZE as u64) * 8).to_be_bytes());
        iv_hasher.update(&[ghash::Block::from(iv_len_block)]);
        let j0 = iv_hasher.finalize();

        // The keystream starts at J0; its first block is E_K(J0), reserved
        // for the tag mask. Payload encryption continues from inc32(J0).
        let mut keystream = Ctr32BE::<Aes256>::new(key.into(), &j0);
        let mut tag_mask = [0u8; BLOCK_SIZE];
        keystream.apply_keystream(&mut tag_mask);

        Self {
            keystream,
            ghash: GHash::new(&hash_key),
            tag_mask,
            pending: [0u8; BLOCK_SIZE],
            pending_len: 0,
            ciphertext_len: 0,
        }
    }

    /// Absorb ciphertext bytes into the running GHASH.
    ///
    /// GHASH operates on 16-byte blocks; bytes that do not fill a block are
    /// carried in `pending` until the next call or finalize. Padding a
    /// partial block early would corrupt the digest, so only finalize pads.
    fn absorb(&mut self, mut ciphertext: &[u8]) {
        self.ciphertext_len += ciphertext.len() as u64;

        if self.pending_len > 0 {
            let take = (BLOCK_SIZE - self.pending_len).min(ciphertext.len());
            self.pending[self.pending_len..self.pending_len + take]
                .copy_from_slice(&ciphertext[..take]);
            self.pending_len += take;
            ciphertext = &ciphertext[take..];

            if self.pending_len == BLOCK_SIZE {
                self.ghash.update(&[ghash::Block::from(self.pending)]);
                self.pending_len = 0;
            }
        }

        let mut blocks = ciphertext.chunks_exact(BLOCK_SIZE);
        for block in blocks.by_ref() {
            self.ghash.update(&[ghash::Block::clone_from_slice(block)]);
        }

        let tail = blocks.remainder();
        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
    }

    /// Close the GHASH (zero-pad the final partial block, absorb the length
    /// block) and produce the tag.
    fn into_tag(mut self) -> [u8; TAG_SIZE] {
        if self.pending_len > 0 {
            let mut last = [0u8; BLOCK_SIZE];
            last[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
            self.ghash.update(&[ghash::Block::from(last)]);
        }

        // len(AAD) ‖ len(C), both in bits; this framing carries no AAD
        let mut len_block = [0u8; BLOCK_SIZE];
        len_block[8..].copy_from_slice(&(self.ciphertext_len * 8).to_be_bytes());
        self.ghash.update(&[ghash::Block::from(len_block)]);

        let digest = self.ghash.finalize();

        let mut tag = [0u8; TAG_SIZE];
        for (out, (digest_byte, mask_byte)) in
            tag.iter_mut().zip(digest.iter().zip(self.tag_mask.iter()))
        {
            *out = digest_byte ^ mask_byte;
        }
        tag
    }
}

/// Encrypt-direction engine: one key, one nonce, one message.
pub struct GcmEncryptor {
    state: GcmState,
}

impl GcmEncryptor {
    /// Bind an engine to `(key, nonce)` for a single message.
    ///
    /// # Security
    ///
    /// The same `(key, nonce)` pair must never encrypt two messages.
    #[must_use]
    pub fn new(key: &[u8; 32], nonce: &[u8; NONCE_SIZE]) -> Self {
        Self { state: GcmState::new(key, nonce) }
    }

    /// Encrypt the next plaintext chunk.
    ///
    /// Output length equals input length; chunk boundaries do not affect
    /// the ciphertext content, only how it is sliced.
    pub fn update(&mut self, plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = plaintext.to_vec();
        self.state.keystream.apply_keystream(&mut ciphertext);
        self.state.absorb(&ciphertext);
        ciphertext
    }

    /// Finish the message and produce the 16-byte authentication tag.
    ///
    /// CTR emits ciphertext as it goes, so there is no buffered output to
    /// flush here.
    #[must_use]
    pub fn finalize(self) -> [u8; TAG_SIZE] {
        self.state.into_tag()
    }
}

impl fmt::Debug for GcmEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GcmEncryptor(..)")
    }
}

/// Decrypt-direction engine: one key, one nonce, one message.
pub struct GcmDecryptor {
    state: GcmState,
}

impl GcmDecryptor {
    /// Bind an engine to `(key, nonce)` for a single message.
    #[must_use]
    pub fn new(key: &[u8; 32], nonce: &[u8; NONCE_SIZE]) -> Self {
        Self { state: GcmState::new(key, nonce) }
    }

    /// Decrypt the next ciphertext chunk.
    ///
    /// The returned plaintext is NOT authenticated until
    /// [`finalize_with_tag`](Self::finalize_with_tag) succeeds.
    pub fn update(&mut self, ciphertext: &[u8]) -> Vec<u8> {
        self.state.absorb(ciphertext);
        let mut plaintext = ciphertext.to_vec();
        self.state.keystream.apply_keystream(&mut plaintext);
        plaintext
    }

    /// Verify the authentication tag over everything absorbed so far.
    ///
    /// Comparison is constant-time.
    ///
    /// # Errors
    ///
    /// - [`CodecError::AuthenticationFailure`] if the tag does not match;
    ///   all plaintext produced by this engine must then be discarded
    pub fn finalize_with_tag(self, tag: &[u8; TAG_SIZE]) -> Result<(), CodecError> {
        let expected = self.state.into_tag();
        if bool::from(expected[..].ct_eq(&tag[..])) {
            Ok(())
        } else {
            Err(CodecError::AuthenticationFailure)
        }
    }
}

impl fmt::Debug for GcmDecryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GcmDecryptor(..)")
    }
}
