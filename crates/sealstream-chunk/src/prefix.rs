//! Bounded prefix extraction
//!
//! Pull exactly the first `n` bytes out of a chunked stream and hand the rest
//! back as a new stream. Only the chunk that crosses the boundary is copied;
//! every chunk after it is forwarded untouched with its original boundaries.

use crate::error::ChunkError;

/// Read exactly `len` bytes from the front of a chunked stream.
///
/// Returns the prefix and a [`Remainder`] stream that yields the bytes after
/// position `len`: first the leftover tail of the chunk that was split (if
/// any), then every untouched upstream chunk unchanged.
///
/// # Errors
///
/// - [`ChunkError::InsufficientData`] if the stream ends before `len` bytes
///   have been accumulated. A short prefix is never returned.
pub fn read_prefix<I>(len: usize, mut source: I) -> Result<(Vec<u8>, Remainder<I>), ChunkError>
where
    I: Iterator<Item = Vec<u8>>,
{
    let mut buffer: Vec<u8> = Vec::with_capacity(len);

    while buffer.len() < len {
        let Some(chunk) = source.next() else {
            return Err(ChunkError::InsufficientData { needed: len });
        };
        buffer.extend_from_slice(&chunk);
    }

    let leftover = buffer.split_off(len);
    let remainder = Remainder { leftover: (!leftover.is_empty()).then_some(leftover), source };

    Ok((buffer, remainder))
}

/// Stream of the bytes after an extracted prefix.
///
/// Yields the split-off tail once, then forwards the upstream iterator.
/// Chunk boundaries of the upstream are preserved.
#[derive(Debug)]
pub struct Remainder<I> {
    /// Tail of the chunk that straddled the prefix boundary, if non-empty
    leftover: Option<Vec<u8>>,
    /// Untouched upstream chunks
    source: I,
}

impl<I> Iterator for Remainder<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        match self.leftover.take() {
            Some(tail) => Some(tail),
            None => self.source.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChunkError, read_prefix};

    fn chunks(parts: &[&[u8]]) -> std::vec::IntoIter<Vec<u8>> {
        parts.iter().map(|p| p.to_vec()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn splits_mid_chunk() {
        let (prefix, rest) = read_prefix(8, chunks(&[b"123456", b"7890"])).unwrap();

        assert_eq!(prefix, b"12345678");
        assert_eq!(rest.collect::<Vec<_>>(), vec![b"90".to_vec()]);
    }

    #[test]
    fn exact_chunk_boundary_leaves_no_leftover() {
        let (prefix, rest) = read_prefix(6, chunks(&[b"123456", b"7890"])).unwrap();

        assert_eq!(prefix, b"123456");
        // Upstream chunking is preserved, nothing re-sliced
        assert_eq!(rest.collect::<Vec<_>>(), vec![b"7890".to_vec()]);
    }

    #[test]
    fn does_not_pull_beyond_the_boundary_chunk() {
        // The second chunk completes the prefix; the third must stay unpulled
        // until the remainder is drained.
        let upstream = chunks(&[b"12345", b"678", b"rest"]);

        let (prefix, mut rest) = read_prefix(8, upstream).unwrap();

        assert_eq!(prefix, b"12345678");
        assert_eq!(rest.next(), Some(b"rest".to_vec()));
        assert_eq!(rest.next(), None);
    }

    #[test]
    fn tolerates_empty_chunks() {
        let (prefix, rest) = read_prefix(4, chunks(&[b"", b"12", b"", b"34", b"5"])).unwrap();

        assert_eq!(prefix, b"1234");
        assert_eq!(rest.flatten().collect::<Vec<_>>(), b"5");
    }

    #[test]
    fn zero_length_prefix() {
        let (prefix, rest) = read_prefix(0, chunks(&[b"abc"])).unwrap();

        assert_eq!(prefix, b"");
        assert_eq!(rest.collect::<Vec<_>>(), vec![b"abc".to_vec()]);
    }

    #[test]
    fn short_stream_is_an_error() {
        let err = read_prefix(8, chunks(&[b"1234", b"56"])).unwrap_err();
        assert_eq!(err, ChunkError::InsufficientData { needed: 8 });
    }

    #[test]
    fn empty_stream_is_an_error() {
        let err = read_prefix(1, chunks(&[])).unwrap_err();
        assert_eq!(err, ChunkError::InsufficientData { needed: 1 });
    }
}
