//! Page numbering over a transaction.
//!
//! Pages `0..NON_MSG_PAGES_COUNT` show the fixed top-level fields in
//! [`FIXED_PAGE_FIELDS`] order. The remaining pages walk the leaves of every
//! element of `msgs`, one page per leaf, element after element.

use std::borrow::Cow;
use std::cell::OnceCell;

use tracing::{debug, warn};
use tx_json_tokens::TokenTree;

use crate::chunk::{read_chunk, write_terminated, ChunkRead};
use crate::copy::CopyDelegate;
use crate::document::Document;
use crate::error::{PageError, ValidationError};
use crate::leaves::{count_leaves, find_leaf};
use crate::validate::validate;
use crate::{FIXED_PAGE_FIELDS, MSGS_FIELD, NON_MSG_PAGES_COUNT};

/// Where a page landed in the caller's buffers.
///
/// Key and value bytes sit at the front of the key and value buffers, each
/// followed by a `0` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    pub key_len: usize,
    pub value_len: usize,
    /// Chunks the page's value spans at the value buffer's capacity.
    pub chunk_count: usize,
}

impl PageView {
    pub fn key<'b>(&self, key_out: &'b [u8]) -> &'b [u8] {
        &key_out[..self.key_len]
    }

    pub fn value<'b>(&self, value_out: &'b [u8]) -> &'b [u8] {
        &value_out[..self.value_len]
    }

    /// Key text for display; invalid UTF-8 is replaced.
    pub fn key_str<'b>(&self, key_out: &'b [u8]) -> Cow<'b, str> {
        String::from_utf8_lossy(self.key(key_out))
    }

    pub fn value_str<'b>(&self, value_out: &'b [u8]) -> Cow<'b, str> {
        String::from_utf8_lossy(self.value(value_out))
    }
}

/// State of one transaction review.
///
/// Built fresh for every transaction and dropped with it; nothing here is
/// shared between reviews.
pub struct ReviewContext<'a, T: ?Sized, C> {
    doc: Document<'a, T>,
    copier: C,
    message_leaves: OnceCell<usize>,
}

impl<'a, T, C> ReviewContext<'a, T, C>
where
    T: TokenTree + ?Sized,
    C: CopyDelegate,
{
    pub fn new(buffer: &'a [u8], tree: &'a T, copier: C) -> Self {
        debug!(bytes = buffer.len(), tokens = tree.tokens().len(), "review context created");
        Self {
            doc: Document::new(buffer, tree),
            copier,
            message_leaves: OnceCell::new(),
        }
    }

    pub fn document(&self) -> Document<'a, T> {
        self.doc
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self.doc)
    }

    /// Fixed pages plus one page per leaf of every message.
    pub fn total_pages(&self) -> usize {
        let total = NON_MSG_PAGES_COUNT + self.message_leaf_total();
        debug!(total, "total pages");
        total
    }

    /// Leaves summed over every element of `msgs`, computed once per context.
    pub fn message_leaf_total(&self) -> usize {
        *self.message_leaves.get_or_init(|| {
            self.messages()
                .map(|(_, msg)| count_leaves(self.doc, msg))
                .sum()
        })
    }

    /// `(position, token)` of every element of `msgs`. Empty when `msgs` is
    /// missing or not an array.
    fn messages(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let tree = self.doc.tree;
        let msgs = self.doc.root_field(MSGS_FIELD);
        let count = msgs.map_or(0, |m| tree.array_get_element_count(m));
        (0..count).filter_map(move |n| {
            let msgs = msgs?;
            tree.array_get_nth_element(msgs, n).map(|el| (n, el))
        })
    }

    /// Render chunk `chunk_index` of page `index` into the caller's buffers.
    ///
    /// The key buffer receives the field name for fixed pages and
    /// `msgs_<n>/<key>/<key>...` for message pages, truncated to fit. A
    /// chunk index past the value's last chunk yields an empty value.
    pub fn page(
        &self,
        index: usize,
        key_out: &mut [u8],
        value_out: &mut [u8],
        chunk_index: usize,
    ) -> Result<PageView, PageError> {
        if key_out.is_empty() || value_out.is_empty() {
            return Err(PageError::EmptyBuffer);
        }
        if let Some(&field) = FIXED_PAGE_FIELDS.get(index) {
            let token = self
                .doc
                .root_field(field)
                .ok_or(PageError::MissingField(field))?;
            let key_len = write_terminated(&self.copier, key_out, field.as_bytes());
            let read = read_chunk(self.doc, &self.copier, token, value_out, chunk_index)?;
            return Ok(view(key_len, read));
        }

        let offset = index - NON_MSG_PAGES_COUNT;
        let total = self.message_leaf_total();
        if offset >= total {
            warn!(index, total = total + NON_MSG_PAGES_COUNT, "page out of range");
            return Err(PageError::OutOfRange {
                index,
                total: total + NON_MSG_PAGES_COUNT,
            });
        }

        let mut before = 0;
        for (position, msg) in self.messages() {
            let count = count_leaves(self.doc, msg);
            if offset < before + count {
                let leaf = find_leaf(self.doc, msg, offset - before, true)
                    .ok_or(PageError::NotFound(msg))?;
                let mut key = format!("{MSGS_FIELD}_{position}").into_bytes();
                leaf.path.render_into(self.doc, &mut key);
                let key_len = write_terminated(&self.copier, key_out, &key);
                let read = read_chunk(self.doc, &self.copier, leaf.token, value_out, chunk_index)?;
                debug!(index, message = position, leaf = offset - before, "message page");
                return Ok(view(key_len, read));
            }
            before += count;
        }

        Err(PageError::OutOfRange {
            index,
            total: total + NON_MSG_PAGES_COUNT,
        })
    }
}

fn view(key_len: usize, read: ChunkRead) -> PageView {
    PageView {
        key_len,
        value_len: read.written,
        chunk_count: read.chunk_count,
    }
}
