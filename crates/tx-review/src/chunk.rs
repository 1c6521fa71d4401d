//! Chunked extraction of values into fixed-size display buffers.
//!
//! Every byte written into a display buffer goes through here, and through
//! the session's [`CopyDelegate`].

use tracing::trace;
use tx_json_tokens::TokenTree;

use crate::copy::CopyDelegate;
use crate::document::Document;
use crate::error::PageError;

/// Outcome of a chunk read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRead {
    /// Bytes written, not counting the terminator.
    pub written: usize,
    /// Chunks the value is split into for this buffer capacity.
    pub chunk_count: usize,
}

/// Number of chunks a value of `length` bytes takes in a buffer of
/// `capacity` bytes.
///
/// The divisor is the full capacity although each chunk only carries
/// `capacity - 1` payload bytes (one is kept for the terminator). Values
/// whose length falls between the two can come up a chunk short; see
/// [`covers`]. A zero capacity is treated as one.
pub fn chunk_count(length: usize, capacity: usize) -> usize {
    length / capacity.max(1) + 1
}

/// Whether [`chunk_count`] chunks of `capacity - 1` bytes hold all of
/// `length`.
pub fn covers(length: usize, capacity: usize) -> bool {
    chunk_count(length, capacity) * capacity.saturating_sub(1) >= length
}

/// Copy chunk `chunk_index` of the value at `token` into `dest`.
///
/// `dest.len()` is the buffer capacity. At most `capacity - 1` bytes are
/// copied, starting `(capacity - 1) * chunk_index` bytes into the value, and
/// a `0` terminator follows them. A chunk index past the end leaves `dest`
/// holding only the terminator.
pub fn read_chunk<T, C>(
    doc: Document<'_, T>,
    copier: &C,
    token: usize,
    dest: &mut [u8],
    chunk_index: usize,
) -> Result<ChunkRead, PageError>
where
    T: TokenTree + ?Sized,
    C: CopyDelegate + ?Sized,
{
    let capacity = dest.len();
    if capacity == 0 {
        return Err(PageError::EmptyBuffer);
    }
    if doc.token(token).is_none() {
        return Err(PageError::NotFound(token));
    }
    let value = doc.bytes(token);
    let chunk_count = chunk_count(value.len(), capacity);

    if chunk_index >= chunk_count {
        dest[0] = 0;
        trace!(token, chunk_index, chunk_count, "chunk past the end");
        return Ok(ChunkRead {
            written: 0,
            chunk_count,
        });
    }

    let payload = capacity - 1;
    let offset = payload * chunk_index;
    let rest = value.get(offset..).unwrap_or_default();
    let written = write_terminated(copier, dest, rest);
    trace!(token, chunk_index, chunk_count, written, "chunk read");
    Ok(ChunkRead {
        written,
        chunk_count,
    })
}

/// Copy as much of `src` as fits in `dest` ahead of a `0` terminator.
///
/// Returns the number of bytes copied. `dest` must not be empty.
pub fn write_terminated<C: CopyDelegate + ?Sized>(copier: &C, dest: &mut [u8], src: &[u8]) -> usize {
    let Some(room) = dest.len().checked_sub(1) else {
        return 0;
    };
    let len = src.len().min(room);
    copier.copy(&mut dest[..len], &src[..len]);
    dest[len] = 0;
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::{PlainCopy, SanitizingCopy};
    use tx_json_tokens::{tokenize, ParsedJson, TokenizerConfig};

    fn tok(input: &str) -> ParsedJson {
        tokenize(input.as_bytes(), &TokenizerConfig::default()).unwrap()
    }

    fn terminated(dest: &[u8]) -> &[u8] {
        let end = dest.iter().position(|&b| b == 0).unwrap();
        &dest[..end]
    }

    #[test]
    fn test_short_value_fits_one_chunk() {
        let input = r#""hello""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0xffu8; 16];
        let read = read_chunk(doc, &PlainCopy, 0, &mut dest, 0).unwrap();
        assert_eq!(
            read,
            ChunkRead {
                written: 5,
                chunk_count: 1
            }
        );
        assert_eq!(terminated(&dest), b"hello");
    }

    #[test]
    fn test_long_value_is_split() {
        let input = r#""abcdefghij""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0u8; 5];
        let mut out = Vec::new();
        let count = read_chunk(doc, &PlainCopy, 0, &mut dest, 0).unwrap().chunk_count;
        assert_eq!(count, 3);
        for chunk in 0..count {
            read_chunk(doc, &PlainCopy, 0, &mut dest, chunk).unwrap();
            out.extend_from_slice(terminated(&dest));
        }
        assert_eq!(out, b"abcdefghij");
    }

    #[test]
    fn test_chunk_past_the_end_is_empty() {
        let input = r#""abc""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0xffu8; 8];
        let read = read_chunk(doc, &PlainCopy, 0, &mut dest, 5).unwrap();
        assert_eq!(read.written, 0);
        assert_eq!(read.chunk_count, 1);
        assert_eq!(dest[0], 0);

        let read = read_chunk(doc, &PlainCopy, 0, &mut dest, 0).unwrap();
        assert_eq!(read.written, 3);
        assert_eq!(terminated(&dest), b"abc");
    }

    #[test]
    fn test_chunk_count_arithmetic() {
        assert_eq!(chunk_count(0, 10), 1);
        assert_eq!(chunk_count(9, 10), 1);
        assert_eq!(chunk_count(10, 10), 2);
        assert_eq!(chunk_count(19, 10), 2);
        assert_eq!(chunk_count(20, 10), 3);
    }

    #[test]
    fn test_boundary_length_comes_up_a_chunk_short() {
        // 19 bytes need three 9-byte chunks but the count divides by 10.
        assert!(!covers(19, 10));
        assert!(covers(18, 10));
        assert!(covers(20, 10));

        let input = r#""0123456789abcdefghi""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0u8; 10];
        let mut out = Vec::new();
        let count = read_chunk(doc, &PlainCopy, 0, &mut dest, 0).unwrap().chunk_count;
        assert_eq!(count, 2);
        for chunk in 0..count {
            read_chunk(doc, &PlainCopy, 0, &mut dest, chunk).unwrap();
            out.extend_from_slice(terminated(&dest));
        }
        assert_eq!(out, b"0123456789abcdefgh");
    }

    #[test]
    fn test_length_equal_to_capacity_spills_one_byte() {
        let input = r#""abcdefghi""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0xffu8; 9];
        let read = read_chunk(doc, &PlainCopy, 0, &mut dest, 1).unwrap();
        assert_eq!(read.chunk_count, 2);
        assert_eq!(read.written, 1);
        assert_eq!(terminated(&dest), b"i");
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let input = r#""abc""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0u8; 0];
        assert_eq!(
            read_chunk(doc, &PlainCopy, 0, &mut dest, 0),
            Err(PageError::EmptyBuffer)
        );
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let input = r#""abc""#;
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0u8; 8];
        assert_eq!(
            read_chunk(doc, &PlainCopy, 7, &mut dest, 0),
            Err(PageError::NotFound(7))
        );
    }

    #[test]
    fn test_copy_goes_through_the_delegate() {
        let input = "\"a\\tb\"";
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        let mut dest = [0u8; 8];
        read_chunk(doc, &SanitizingCopy, 0, &mut dest, 0).unwrap();
        assert_eq!(terminated(&dest), b"a\\tb");

        let input = "\"caf\u{e9}\"";
        let tree = tok(input);
        let doc = Document::new(input.as_bytes(), &tree);
        read_chunk(doc, &SanitizingCopy, 0, &mut dest, 0).unwrap();
        assert_eq!(terminated(&dest), b"caf??");
    }

    #[test]
    fn test_write_terminated_truncates() {
        let mut dest = [0xffu8; 4];
        assert_eq!(write_terminated(&PlainCopy, &mut dest, b"abcdef"), 3);
        assert_eq!(&dest, b"abc\0");
        let mut empty = [0u8; 0];
        assert_eq!(write_terminated(&PlainCopy, &mut empty, b"abc"), 0);
    }
}
