//! Bounded trailer extraction
//!
//! Split the final `n` bytes off a chunked stream of unknown total length.
//! The body (everything before the trailer) is forwarded incrementally as
//! the stream arrives; the trailer itself resolves once the stream ends.
//!
//! The implementation keeps a window of the most recently received chunks.
//! While the window holds strictly more than `n` bytes beyond its front
//! chunk, that front chunk cannot overlap the trailer and is released as
//! body output. Chunks are never split during this early release; only the
//! final excess at end of stream is re-sliced.

use std::collections::VecDeque;

use crate::error::ChunkError;

/// Split the final `trailer_len` bytes off a chunked stream.
///
/// The returned [`TrailerSplit`] yields body chunks as they become
/// releasable. After it is drained, [`TrailerSplit::take_trailer`] returns
/// the trailing bytes.
pub fn split_trailer<I>(trailer_len: usize, source: I) -> TrailerSplit<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    TrailerSplit {
        source: Some(source),
        trailer_len,
        window: VecDeque::new(),
        window_bytes: 0,
        trailer: None,
    }
}

/// Lazy body stream with a deferred fixed-size trailer.
///
/// Yields `Ok(chunk)` for every body chunk, in order. The concatenation of
/// all body output followed by the trailer equals the full input stream,
/// for any chunking of that input.
///
/// # Memory
///
/// The window holds at most `trailer_len` bytes plus the largest single
/// chunk seen, independent of total stream length. Invariant: while the
/// upstream is live and the window is non-empty, the window holds strictly
/// more than `trailer_len` bytes only until whole chunks have been released
/// off its front; a release never drops it to `trailer_len` or below.
///
/// # Errors
///
/// If the upstream ends with fewer than `trailer_len` bytes total, the
/// final item is `Err(`[`ChunkError::InsufficientData`]`)` and no trailer
/// is produced.
#[derive(Debug)]
pub struct TrailerSplit<I> {
    /// Upstream chunks; `None` once exhausted
    source: Option<I>,
    /// Requested trailer size
    trailer_len: usize,
    /// Most recently received chunks, oldest first
    window: VecDeque<Vec<u8>>,
    /// Cumulative size of the window
    window_bytes: usize,
    /// Resolved trailer, set at successful exhaustion
    trailer: Option<Vec<u8>>,
}

impl<I> TrailerSplit<I> {
    /// The resolved trailer: exactly `trailer_len` bytes.
    ///
    /// Returns `Some` only after the body stream has been fully drained
    /// without error, and only once.
    pub fn take_trailer(&mut self) -> Option<Vec<u8>> {
        self.trailer.take()
    }
}

impl<I> Iterator for TrailerSplit<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Result<Vec<u8>, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Release the front chunk if the rest of the window still covers
            // the trailer with room to spare.
            let front_len = self.window.front().map(Vec::len);
            if let Some(front_len) = front_len
                && self.window_bytes - front_len > self.trailer_len
                && let Some(chunk) = self.window.pop_front()
            {
                self.window_bytes -= chunk.len();
                return Some(Ok(chunk));
            }

            let source = self.source.as_mut()?;

            match source.next() {
                Some(chunk) => {
                    // Zero-length chunks carry no bytes; keeping them out of
                    // the window keeps the size invariant strict.
                    if !chunk.is_empty() {
                        self.window_bytes += chunk.len();
                        self.window.push_back(chunk);
                    }
                }
                None => {
                    self.source = None;

                    let mut rest = Vec::with_capacity(self.window_bytes);
                    for chunk in self.window.drain(..) {
                        rest.extend_from_slice(&chunk);
                    }
                    self.window_bytes = 0;

                    if rest.len() < self.trailer_len {
                        return Some(Err(ChunkError::InsufficientData {
                            needed: self.trailer_len,
                        }));
                    }

                    let trailer = rest.split_off(rest.len() - self.trailer_len);
                    self.trailer = Some(trailer);

                    if rest.is_empty() {
                        return None;
                    }
                    return Some(Ok(rest));
                }
            }
        }
    }
}
