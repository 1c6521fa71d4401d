//! Review configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tx_json_tokens::{TokenizerConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS};

use crate::error::ReviewError;
use crate::MAX_WALK_NESTING;

/// Display buffer sizes, tokenizer limits and the copy policy.
///
/// Every field has a default, so a partial JSON file is enough:
///
/// ```
/// use tx_review::ReviewConfig;
///
/// let config = ReviewConfig::from_json_str(r#"{"value_capacity":32}"#).unwrap();
/// assert_eq!(config.value_capacity, 32);
/// assert_eq!(config.key_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub key_capacity: usize,
    pub value_capacity: usize,
    pub max_depth: usize,
    pub max_tokens: usize,
    pub sanitize: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            key_capacity: 64,
            value_capacity: 64,
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
            sanitize: false,
        }
    }
}

impl ReviewConfig {
    /// Smallest buffer that still carries a payload byte next to the
    /// terminator.
    pub const MIN_CAPACITY: usize = 2;

    pub fn from_json_str(json: &str) -> Result<Self, ReviewError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings the review engine cannot honor.
    pub fn check(&self) -> Result<(), ReviewError> {
        if self.key_capacity < Self::MIN_CAPACITY {
            return Err(ReviewError::Config(format!(
                "key_capacity must be at least {}",
                Self::MIN_CAPACITY
            )));
        }
        if self.value_capacity < Self::MIN_CAPACITY {
            return Err(ReviewError::Config(format!(
                "value_capacity must be at least {}",
                Self::MIN_CAPACITY
            )));
        }
        if self.max_depth == 0 || self.max_depth > MAX_WALK_NESTING {
            return Err(ReviewError::Config(format!(
                "max_depth must be between 1 and {MAX_WALK_NESTING}"
            )));
        }
        if self.max_tokens == 0 {
            return Err(ReviewError::Config("max_tokens must be positive".into()));
        }
        Ok(())
    }

    pub fn tokenizer(&self) -> TokenizerConfig {
        TokenizerConfig {
            max_depth: self.max_depth,
            max_tokens: self.max_tokens,
        }
    }
}
