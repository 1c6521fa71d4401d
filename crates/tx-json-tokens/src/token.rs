//! Token descriptors and the accessor surface over a flat token tree.

/// Kind of a token.
///
/// `Undefined` never comes out of [`crate::tokenize`]; it exists so trees
/// built elsewhere (and handed over through [`ParsedJson::from_tokens`]) can
/// mark slots the producer never filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Undefined,
    Object,
    Array,
    String,
    Primitive,
}

/// A `(kind, start, end)` descriptor over the source buffer.
///
/// Offsets follow the jsmn convention:
/// - strings span the bytes between the quotes, quotes excluded;
/// - primitives span their literal;
/// - objects and arrays span from the opening bracket to one past the
///   closing bracket.
///
/// `size` is the number of direct children: keys for an object, elements for
/// an array, and `1` for an object key (which owns its value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub size: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize, size: usize) -> Self {
        Self {
            kind,
            start,
            end,
            size,
        }
    }

    /// Byte length of the token's span. Inverted spans count as empty.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The token's bytes inside `buffer`, or `None` when the span does not
    /// fit the buffer.
    pub fn bytes<'b>(&self, buffer: &'b [u8]) -> Option<&'b [u8]> {
        buffer.get(self.start..self.end)
    }
}

/// Read-only navigation over a pre-order token array.
///
/// Every lookup is total: a kind mismatch or an index past the end yields
/// `None` (or a zero count), never a panic.
pub trait TokenTree {
    fn tokens(&self) -> &[Token];

    fn token(&self, index: usize) -> Option<&Token> {
        self.tokens().get(index)
    }

    /// Resolve `key` inside the object at `object` and return its value token.
    fn object_get_value(&self, object: usize, key: &str, buffer: &[u8]) -> Option<usize>;

    fn object_get_element_count(&self, object: usize) -> usize;

    fn object_get_nth_key(&self, object: usize, n: usize) -> Option<usize>;

    fn object_get_nth_value(&self, object: usize, n: usize) -> Option<usize>;

    fn array_get_element_count(&self, array: usize) -> usize;

    fn array_get_nth_element(&self, array: usize, n: usize) -> Option<usize>;
}

/// A tokenized document: tokens in pre-order, index `0` is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedJson {
    tokens: Vec<Token>,
}

impl ParsedJson {
    /// Wrap a token array produced by some other tokenizer.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Index of the first token after the subtree rooted at `index`.
    ///
    /// Walks forward counting outstanding children, so it terminates on any
    /// token array, however inconsistent its `size` fields are.
    fn skip(&self, index: usize) -> usize {
        let mut pending = 1usize;
        let mut i = index;
        while pending > 0 && i < self.tokens.len() {
            pending = (pending - 1).saturating_add(self.tokens[i].size);
            i += 1;
        }
        i
    }

    fn kind_of(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Index of the `n`-th direct child of a container, children being
    /// whole subtrees laid out back to back after it.
    fn nth_child(&self, parent: usize, n: usize) -> Option<usize> {
        let size = self.tokens.get(parent)?.size;
        if n >= size {
            return None;
        }
        let mut child = parent + 1;
        for _ in 0..n {
            if child >= self.tokens.len() {
                return None;
            }
            child = self.skip(child);
        }
        (child < self.tokens.len()).then_some(child)
    }
}

impl TokenTree for ParsedJson {
    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn object_get_value(&self, object: usize, key: &str, buffer: &[u8]) -> Option<usize> {
        let count = self.object_get_element_count(object);
        (0..count).find_map(|n| {
            let key_index = self.object_get_nth_key(object, n)?;
            let key_token = self.tokens.get(key_index)?;
            if key_token.bytes(buffer)? == key.as_bytes() {
                self.object_get_nth_value(object, n)
            } else {
                None
            }
        })
    }

    fn object_get_element_count(&self, object: usize) -> usize {
        match self.tokens.get(object) {
            Some(t) if t.kind == TokenKind::Object => t.size,
            _ => 0,
        }
    }

    fn object_get_nth_key(&self, object: usize, n: usize) -> Option<usize> {
        if self.kind_of(object)? != TokenKind::Object {
            return None;
        }
        self.nth_child(object, n)
    }

    fn object_get_nth_value(&self, object: usize, n: usize) -> Option<usize> {
        let key = self.object_get_nth_key(object, n)?;
        if self.tokens[key].size == 0 {
            return None;
        }
        let value = key + 1;
        (value < self.tokens.len()).then_some(value)
    }

    fn array_get_element_count(&self, array: usize) -> usize {
        match self.tokens.get(array) {
            Some(t) if t.kind == TokenKind::Array => t.size,
            _ => 0,
        }
    }

    fn array_get_nth_element(&self, array: usize, n: usize) -> Option<usize> {
        if self.kind_of(array)? != TokenKind::Array {
            return None;
        }
        self.nth_child(array, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // {"a":[1,2],"b":"x"}
    fn sample() -> ParsedJson {
        ParsedJson::from_tokens(vec![
            Token::new(TokenKind::Object, 0, 19, 2),
            Token::new(TokenKind::String, 2, 3, 1),
            Token::new(TokenKind::Array, 5, 10, 2),
            Token::new(TokenKind::Primitive, 6, 7, 0),
            Token::new(TokenKind::Primitive, 8, 9, 0),
            Token::new(TokenKind::String, 12, 13, 1),
            Token::new(TokenKind::String, 16, 17, 0),
        ])
    }

    #[test]
    fn test_nth_key_skips_nested_values() {
        let tree = sample();
        assert_eq!(tree.object_get_nth_key(0, 0), Some(1));
        assert_eq!(tree.object_get_nth_key(0, 1), Some(5));
        assert_eq!(tree.object_get_nth_value(0, 1), Some(6));
        assert_eq!(tree.object_get_nth_key(0, 2), None);
    }

    #[test]
    fn test_array_access() {
        let tree = sample();
        assert_eq!(tree.array_get_element_count(2), 2);
        assert_eq!(tree.array_get_nth_element(2, 1), Some(4));
        assert_eq!(tree.array_get_nth_element(0, 0), None);
        assert_eq!(tree.array_get_element_count(0), 0);
    }

    #[test]
    fn test_object_get_value_by_name() {
        let buf = br#"{"a":[1,2],"b":"x"}"#;
        let tree = sample();
        assert_eq!(tree.object_get_value(0, "b", buf), Some(6));
        assert_eq!(tree.object_get_value(0, "c", buf), None);
        assert_eq!(tree.object_get_value(2, "a", buf), None);
    }

    #[test]
    fn test_lookups_past_the_end_are_none() {
        let tree = sample();
        assert_eq!(tree.object_get_element_count(99), 0);
        assert_eq!(tree.object_get_nth_key(99, 0), None);
        assert_eq!(tree.array_get_nth_element(99, 0), None);
    }

    #[test]
    fn test_inconsistent_sizes_do_not_panic() {
        let tree = ParsedJson::from_tokens(vec![
            Token::new(TokenKind::Object, 0, 4, 5),
            Token::new(TokenKind::String, 1, 2, 1),
        ]);
        assert_eq!(tree.object_get_nth_key(0, 0), Some(1));
        assert_eq!(tree.object_get_nth_value(0, 0), None);
        assert_eq!(tree.object_get_nth_key(0, 3), None);
    }

    #[test]
    fn test_huge_sizes_saturate() {
        let tree = ParsedJson::from_tokens(vec![
            Token::new(TokenKind::Array, 0, 9, 2),
            Token::new(TokenKind::Array, 1, 4, usize::MAX),
            Token::new(TokenKind::Primitive, 2, 3, 2),
            Token::new(TokenKind::Primitive, 5, 6, 0),
        ]);
        assert_eq!(tree.array_get_nth_element(0, 0), Some(1));
        assert_eq!(tree.array_get_nth_element(0, 1), None);
        assert_eq!(tree.array_get_nth_element(1, usize::MAX - 1), None);
        assert_eq!(tree.object_get_value(0, "a", b"[[1],2]"), None);
    }
}
