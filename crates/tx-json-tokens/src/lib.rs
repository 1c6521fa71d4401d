//! Flat JSON token trees.
//!
//! A document is described by a pre-order array of [`Token`]s over an
//! immutable byte buffer. Objects and arrays do not store child lists; the
//! [`TokenTree`] accessors rediscover children on demand from the token
//! array alone.
//!
//! # Example
//!
//! ```
//! use tx_json_tokens::{tokenize, TokenTree, TokenizerConfig};
//!
//! let buf = br#"{"msgs":[{"k":"v"}]}"#;
//! let tree = tokenize(buf, &TokenizerConfig::default()).unwrap();
//! let msgs = tree.object_get_value(0, "msgs", buf).unwrap();
//! assert_eq!(tree.array_get_element_count(msgs), 1);
//! let msg = tree.array_get_nth_element(msgs, 0).unwrap();
//! assert_eq!(tree.object_get_element_count(msg), 1);
//! ```

pub mod token;
pub use token::{ParsedJson, Token, TokenKind, TokenTree};

pub mod tokenizer;
pub use tokenizer::{
    tokenize, TokenizeError, TokenizerConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS,
};

/// Index of the root token in every tree.
pub const ROOT_TOKEN_INDEX: usize = 0;
