//! Strict JSON tokenizer producing a flat [`ParsedJson`].
//!
//! The tokenizer accepts insignificant whitespace; deciding whether a
//! document is in canonical form is left to the caller.

use thiserror::Error;
use tracing::trace;

use crate::token::{ParsedJson, Token, TokenKind};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Token count limit applied when none is configured.
pub const DEFAULT_MAX_TOKENS: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid JSON at offset {offset}")]
    Invalid { offset: usize },
    #[error("Invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("Unescaped control character at offset {offset}")]
    ControlCharacter { offset: usize },
    #[error("Unexpected data after the root value at offset {offset}")]
    TrailingData { offset: usize },
    #[error("Nesting deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("More than {limit} tokens")]
    TooManyTokens { limit: usize },
}

/// Resource limits for [`tokenize`].
///
/// Traversals over the resulting tree recurse once per nesting level, so
/// `max_depth` bounds their stack use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub max_depth: usize,
    pub max_tokens: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Tokenize `input` into a pre-order token array.
///
/// # Example
///
/// ```
/// use tx_json_tokens::{tokenize, TokenKind, TokenTree, TokenizerConfig};
///
/// let buf = br#"{"a":"v"}"#;
/// let tree = tokenize(buf, &TokenizerConfig::default()).unwrap();
/// assert_eq!(tree.tokens().len(), 3);
/// let value = tree.object_get_value(0, "a", buf).unwrap();
/// assert_eq!(tree.tokens()[value].kind, TokenKind::String);
/// ```
pub fn tokenize(input: &[u8], config: &TokenizerConfig) -> Result<ParsedJson, TokenizeError> {
    let mut tokenizer = Tokenizer {
        input,
        pos: 0,
        tokens: Vec::new(),
        config: *config,
    };
    tokenizer.skip_whitespace();
    tokenizer.read_value(0)?;
    tokenizer.skip_whitespace();
    if tokenizer.pos < input.len() {
        return Err(TokenizeError::TrailingData {
            offset: tokenizer.pos,
        });
    }
    trace!(tokens = tokenizer.tokens.len(), bytes = input.len(), "tokenized");
    Ok(ParsedJson::from_tokens(tokenizer.tokens))
}

struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    config: TokenizerConfig,
}

impl<'a> Tokenizer<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn push(&mut self, token: Token) -> Result<usize, TokenizeError> {
        if self.tokens.len() >= self.config.max_tokens {
            return Err(TokenizeError::TooManyTokens {
                limit: self.config.max_tokens,
            });
        }
        self.tokens.push(token);
        Ok(self.tokens.len() - 1)
    }

    fn expect(&mut self, byte: u8) -> Result<(), TokenizeError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(TokenizeError::Invalid { offset: self.pos }),
            None => Err(TokenizeError::UnexpectedEnd),
        }
    }

    fn read_value(&mut self, depth: usize) -> Result<usize, TokenizeError> {
        match self.peek() {
            None => Err(TokenizeError::UnexpectedEnd),
            Some(b'{') => self.read_object(depth + 1),
            Some(b'[') => self.read_array(depth + 1),
            Some(b'"') => self.read_string(0),
            Some(b't') => self.read_literal(b"true"),
            Some(b'f') => self.read_literal(b"false"),
            Some(b'n') => self.read_literal(b"null"),
            Some(b'-' | b'0'..=b'9') => self.read_number(),
            Some(_) => Err(TokenizeError::Invalid { offset: self.pos }),
        }
    }

    fn open_container(&mut self, kind: TokenKind, depth: usize) -> Result<usize, TokenizeError> {
        if depth > self.config.max_depth {
            return Err(TokenizeError::TooDeep {
                limit: self.config.max_depth,
            });
        }
        let index = self.push(Token::new(kind, self.pos, self.pos, 0))?;
        self.pos += 1;
        self.skip_whitespace();
        Ok(index)
    }

    fn close_container(&mut self, index: usize, size: usize) {
        self.pos += 1;
        let token = &mut self.tokens[index];
        token.end = self.pos;
        token.size = size;
    }

    fn read_object(&mut self, depth: usize) -> Result<usize, TokenizeError> {
        let index = self.open_container(TokenKind::Object, depth)?;
        if self.peek() == Some(b'}') {
            self.close_container(index, 0);
            return Ok(index);
        }
        let mut size = 0;
        loop {
            if self.peek() != Some(b'"') {
                return Err(self.invalid_or_end());
            }
            self.read_string(1)?;
            self.skip_whitespace();
            self.expect(b':')?;
            self.skip_whitespace();
            self.read_value(depth)?;
            size += 1;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(b'}') => break,
                _ => return Err(self.invalid_or_end()),
            }
        }
        self.close_container(index, size);
        Ok(index)
    }

    fn read_array(&mut self, depth: usize) -> Result<usize, TokenizeError> {
        let index = self.open_container(TokenKind::Array, depth)?;
        if self.peek() == Some(b']') {
            self.close_container(index, 0);
            return Ok(index);
        }
        let mut size = 0;
        loop {
            self.read_value(depth)?;
            size += 1;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(b']') => break,
                _ => return Err(self.invalid_or_end()),
            }
        }
        self.close_container(index, size);
        Ok(index)
    }

    /// Read a string starting at the opening quote. `size` is `1` for object
    /// keys and `0` for string values.
    fn read_string(&mut self, size: usize) -> Result<usize, TokenizeError> {
        self.pos += 1;
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(TokenizeError::UnexpectedEnd),
                Some(b'"') => break,
                Some(b'\\') => self.read_escape()?,
                Some(b) if b < 0x20 => {
                    return Err(TokenizeError::ControlCharacter { offset: self.pos })
                }
                Some(_) => self.pos += 1,
            }
        }
        let index = self.push(Token::new(TokenKind::String, start, self.pos, size))?;
        self.pos += 1;
        Ok(index)
    }

    fn read_escape(&mut self) -> Result<(), TokenizeError> {
        let offset = self.pos;
        self.pos += 1;
        match self.peek() {
            None => Err(TokenizeError::UnexpectedEnd),
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.pos += 1;
                Ok(())
            }
            Some(b'u') => {
                self.pos += 1;
                for _ in 0..4 {
                    match self.peek() {
                        None => return Err(TokenizeError::UnexpectedEnd),
                        Some(b) if b.is_ascii_hexdigit() => self.pos += 1,
                        Some(_) => return Err(TokenizeError::InvalidEscape { offset }),
                    }
                }
                Ok(())
            }
            Some(_) => Err(TokenizeError::InvalidEscape { offset }),
        }
    }

    fn read_literal(&mut self, literal: &[u8]) -> Result<usize, TokenizeError> {
        let start = self.pos;
        let end = start + literal.len();
        match self.input.get(start..end) {
            Some(bytes) if bytes == literal => {}
            Some(_) => return Err(TokenizeError::Invalid { offset: start }),
            None => return Err(TokenizeError::UnexpectedEnd),
        }
        self.pos = end;
        self.ensure_delimited()?;
        self.push(Token::new(TokenKind::Primitive, start, end, 0))
    }

    fn read_number(&mut self) -> Result<usize, TokenizeError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            Some(_) => return Err(TokenizeError::Invalid { offset: self.pos }),
            None => return Err(TokenizeError::UnexpectedEnd),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.require_digits()?;
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            self.require_digits()?;
        }
        self.ensure_delimited()?;
        self.push(Token::new(TokenKind::Primitive, start, self.pos, 0))
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn require_digits(&mut self) -> Result<(), TokenizeError> {
        match self.peek() {
            Some(b'0'..=b'9') => {
                self.skip_digits();
                Ok(())
            }
            Some(_) => Err(TokenizeError::Invalid { offset: self.pos }),
            None => Err(TokenizeError::UnexpectedEnd),
        }
    }

    /// A primitive must be followed by a structural byte, whitespace or the
    /// end of input (`truex` and `12a` are rejected here).
    fn ensure_delimited(&self) -> Result<(), TokenizeError> {
        match self.peek() {
            None | Some(b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r') => Ok(()),
            Some(_) => Err(TokenizeError::Invalid { offset: self.pos }),
        }
    }

    fn invalid_or_end(&self) -> TokenizeError {
        if self.pos >= self.input.len() {
            TokenizeError::UnexpectedEnd
        } else {
            TokenizeError::Invalid { offset: self.pos }
        }
    }
}
