//! A transaction buffer paired with its token tree.

use tx_json_tokens::{Token, TokenKind, TokenTree, ROOT_TOKEN_INDEX};

/// Borrowed view over an immutable buffer and the tree describing it.
///
/// Cheap to copy; nothing is ever materialized out of it beyond the bytes a
/// caller asks for.
#[derive(Debug)]
pub struct Document<'a, T: ?Sized> {
    pub buffer: &'a [u8],
    pub tree: &'a T,
}

impl<T: ?Sized> Clone for Document<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Document<'_, T> {}

impl<'a, T: TokenTree + ?Sized> Document<'a, T> {
    pub fn new(buffer: &'a [u8], tree: &'a T) -> Self {
        Self { buffer, tree }
    }

    pub fn tokens(&self) -> &'a [Token] {
        let tree: &'a T = self.tree;
        tree.tokens()
    }

    pub fn token(&self, index: usize) -> Option<&'a Token> {
        self.tokens().get(index)
    }

    pub fn kind(&self, index: usize) -> TokenKind {
        self.token(index).map_or(TokenKind::Undefined, |t| t.kind)
    }

    /// Raw bytes of a token, clamped to the buffer.
    pub fn bytes(&self, index: usize) -> &'a [u8] {
        match self.token(index) {
            Some(t) => {
                let end = t.end.min(self.buffer.len());
                let start = t.start.min(end);
                &self.buffer[start..end]
            }
            None => &[],
        }
    }

    /// Value token of a top-level field.
    pub fn root_field(&self, name: &str) -> Option<usize> {
        self.tree.object_get_value(ROOT_TOKEN_INDEX, name, self.buffer)
    }
}
