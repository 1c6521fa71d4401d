//! Error types.

use thiserror::Error;
use tx_json_tokens::TokenizeError;

/// Reason a document is not in the canonical form accepted for review.
///
/// The set is closed; review must not continue past any of these.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Contains whitespace in the corpus")]
    ContainsWhitespace,
    #[error("Dictionaries are not sorted")]
    UnsortedKeys,
    #[error("Missing {0}")]
    MissingField(&'static str),
}

/// Failure to produce a page.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Page {index} is out of range ({total} pages)")]
    OutOfRange { index: usize, total: usize },
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Destination buffer has no capacity")]
    EmptyBuffer,
    #[error("Token {0} not found")]
    NotFound(usize),
}

/// Errors surfaced by a review session and the command-line driver.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}
