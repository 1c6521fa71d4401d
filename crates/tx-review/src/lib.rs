//! Review engine for canonical JSON transactions on small signing displays.
//!
//! A transaction arrives as bytes plus a flat token tree. The engine
//! [validates](validate()) that the bytes are in canonical form and then
//! splits the document into pages: one per fixed top-level field and one per
//! displayable leaf of every message. Values longer than the display buffer
//! are read back chunk by chunk.
//!
//! # Example
//!
//! ```
//! use tx_json_tokens::{tokenize, TokenizerConfig};
//! use tx_review::{PlainCopy, ReviewContext};
//!
//! let buf = br#"{"account_number":"1","chain_id":"x","data":"","memo":"","msgs":[{"k":"v"}],"sequence":"0","source":"0"}"#;
//! let tree = tokenize(buf, &TokenizerConfig::default()).unwrap();
//! let ctx = ReviewContext::new(buf, &tree, PlainCopy);
//!
//! ctx.validate().unwrap();
//! assert_eq!(ctx.total_pages(), 7);
//!
//! let mut key = [0u8; 32];
//! let mut value = [0u8; 32];
//! let page = ctx.page(6, &mut key, &mut value, 0).unwrap();
//! assert_eq!(page.key(&key), b"msgs_0/k");
//! assert_eq!(page.value(&value), b"v");
//! ```

pub mod chunk;
pub mod cli;
pub mod config;
pub mod copy;
pub mod document;
pub mod error;
pub mod leaves;
pub mod pages;
pub mod session;
pub mod validate;

pub use chunk::{chunk_count, read_chunk, ChunkRead};
pub use config::ReviewConfig;
pub use copy::{CopyDelegate, PlainCopy, SanitizingCopy};
pub use document::Document;
pub use error::{PageError, ReviewError, ValidationError};
pub use leaves::{count_leaves, find_leaf, KeyPath, Leaf};
pub use pages::{PageView, ReviewContext};
pub use session::{render_all, render_page, RenderedPage, ReviewSession};
pub use validate::validate;

/// Pages shown ahead of the message pages, one per entry of
/// [`FIXED_PAGE_FIELDS`].
pub const NON_MSG_PAGES_COUNT: usize = 6;

/// Top-level fields shown on the fixed pages, in page order.
pub const FIXED_PAGE_FIELDS: [&str; NON_MSG_PAGES_COUNT] = [
    "chain_id",
    "account_number",
    "sequence",
    "memo",
    "source",
    "data",
];

/// Top-level fields a transaction must carry, in the order they are checked.
pub const MANDATORY_FIELDS: [&str; 7] = [
    "chain_id",
    "sequence",
    "msgs",
    "account_number",
    "memo",
    "data",
    "source",
];

/// Top-level array holding the messages.
pub const MSGS_FIELD: &str = "msgs";

/// Object depth below a message at which values are shown as raw JSON.
pub const RAW_DISPLAY_DEPTH: usize = 2;

/// Nesting (objects and arrays alike) past which a leaf walk stops
/// descending and shows the remaining subtree as raw JSON.
pub const MAX_WALK_NESTING: usize = 128;
