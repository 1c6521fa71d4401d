//! Canonical form checks.
//!
//! A transaction is only reviewed when its encoding is unambiguous: no
//! whitespace outside string contents, every object's keys in sorted order,
//! and every mandatory top-level field present.

use std::iter;

use tracing::warn;
use tx_json_tokens::{Token, TokenKind, TokenTree};

use crate::document::Document;
use crate::error::ValidationError;
use crate::MANDATORY_FIELDS;

/// Bytes treated as whitespace.
pub const WHITESPACE: [u8; 6] = [
    0x20, // space
    0x0c, // form feed
    0x0a, // line feed
    0x0d, // carriage return
    0x09, // horizontal tab
    0x0b, // vertical tab
];

/// Terminator every raw key is compared through, so that a key sorts after
/// any key it is a proper prefix of exactly as far as the closing quote says.
const KEY_TERMINATOR: u8 = b'"';

pub fn is_space(byte: u8) -> bool {
    WHITESPACE.contains(&byte)
}

/// Run every check in order and return the first failure.
///
/// # Example
///
/// ```
/// use tx_json_tokens::{tokenize, TokenizerConfig};
/// use tx_review::{validate, Document, ValidationError};
///
/// let buf = br#"{"b":"1","a":"2"}"#;
/// let tree = tokenize(buf, &TokenizerConfig::default()).unwrap();
/// assert_eq!(validate(Document::new(buf, &tree)), Err(ValidationError::UnsortedKeys));
/// ```
pub fn validate<T: TokenTree + ?Sized>(doc: Document<'_, T>) -> Result<(), ValidationError> {
    let result = check(doc);
    if let Err(reason) = &result {
        warn!(%reason, "transaction rejected");
    }
    result
}

fn check<T: TokenTree + ?Sized>(doc: Document<'_, T>) -> Result<(), ValidationError> {
    if contains_whitespace(doc) {
        return Err(ValidationError::ContainsWhitespace);
    }
    if !dictionaries_sorted(doc) {
        return Err(ValidationError::UnsortedKeys);
    }
    for field in MANDATORY_FIELDS {
        if doc.root_field(field).is_none() {
            return Err(ValidationError::MissingField(field));
        }
    }
    Ok(())
}

/// Whether any whitespace byte sits between tokens or after the last one.
///
/// Gaps are scanned in token order. After a container the scan resumes right
/// behind its opening bracket, after a string right behind its closing
/// quote, and after a primitive right behind its literal. An `Undefined`
/// token ends the scan with no finding.
pub fn contains_whitespace<T: TokenTree + ?Sized>(doc: Document<'_, T>) -> bool {
    let buffer = doc.buffer;
    let mut cursor = 0usize;

    for token in doc.tokens() {
        if token.kind == TokenKind::Undefined {
            return false;
        }
        if gap_has_space(buffer, cursor, token.start) {
            return true;
        }
        cursor = resume_after(token);
    }

    buffer
        .get(cursor..)
        .unwrap_or_default()
        .iter()
        .take_while(|&&b| b != 0)
        .any(|&b| is_space(b))
}

fn resume_after(token: &Token) -> usize {
    match token.kind {
        TokenKind::Object | TokenKind::Array => token.start.saturating_add(1),
        TokenKind::String => token.end.saturating_add(1),
        TokenKind::Primitive | TokenKind::Undefined => token.end,
    }
}

fn gap_has_space(buffer: &[u8], from: usize, to: usize) -> bool {
    let to = to.min(buffer.len());
    from < to && buffer[from..to].iter().any(|&b| is_space(b))
}

/// Whether every object's keys are in non-decreasing byte order.
pub fn dictionaries_sorted<T: TokenTree + ?Sized>(doc: Document<'_, T>) -> bool {
    let tree = doc.tree;
    (0..doc.tokens().len())
        .filter(|&i| doc.kind(i) == TokenKind::Object)
        .all(|object| {
            let keys = (0..tree.object_get_element_count(object))
                .filter_map(|n| tree.object_get_nth_key(object, n))
                .map(|key| doc.bytes(key))
                .collect::<Vec<_>>();
            keys.windows(2).all(|pair| is_sorted(pair[0], pair[1]))
        })
}

/// `first <= second`, both compared through their terminator.
fn is_sorted(first: &[u8], second: &[u8]) -> bool {
    let first = first.iter().chain(iter::once(&KEY_TERMINATOR));
    let second = second.iter().chain(iter::once(&KEY_TERMINATOR));
    first.le(second)
}
