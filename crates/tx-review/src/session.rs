//! Owned transaction plus helpers that drive every page to completion.

use serde::Serialize;
use tx_json_tokens::{tokenize, ParsedJson, TokenTree, TokenizeError};

use crate::config::ReviewConfig;
use crate::copy::CopyDelegate;
use crate::error::PageError;
use crate::pages::ReviewContext;

/// A transaction's bytes together with their token tree.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    bytes: Vec<u8>,
    tree: ParsedJson,
}

impl ReviewSession {
    pub fn from_bytes(bytes: Vec<u8>, config: &ReviewConfig) -> Result<Self, TokenizeError> {
        let tree = tokenize(&bytes, &config.tokenizer())?;
        Ok(Self { bytes, tree })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn tree(&self) -> &ParsedJson {
        &self.tree
    }

    pub fn context<C: CopyDelegate>(&self, copier: C) -> ReviewContext<'_, ParsedJson, C> {
        ReviewContext::new(&self.bytes, &self.tree, copier)
    }
}

/// A page with its value reassembled from all of its chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub index: usize,
    pub key: String,
    pub value: String,
    pub chunks: usize,
}

/// Read page `index` chunk by chunk and join the chunks.
pub fn render_page<T, C>(
    ctx: &ReviewContext<'_, T, C>,
    index: usize,
    key_capacity: usize,
    value_capacity: usize,
) -> Result<RenderedPage, PageError>
where
    T: TokenTree + ?Sized,
    C: CopyDelegate,
{
    let mut key_out = vec![0u8; key_capacity];
    let mut value_out = vec![0u8; value_capacity];

    let first = ctx.page(index, &mut key_out, &mut value_out, 0)?;
    let key = first.key_str(&key_out).into_owned();
    let mut value = first.value(&value_out).to_vec();
    for chunk in 1..first.chunk_count {
        let view = ctx.page(index, &mut key_out, &mut value_out, chunk)?;
        value.extend_from_slice(view.value(&value_out));
    }

    Ok(RenderedPage {
        index,
        key,
        value: String::from_utf8_lossy(&value).into_owned(),
        chunks: first.chunk_count,
    })
}

/// Render every page of the transaction.
pub fn render_all<T, C>(
    ctx: &ReviewContext<'_, T, C>,
    key_capacity: usize,
    value_capacity: usize,
) -> Result<Vec<RenderedPage>, PageError>
where
    T: TokenTree + ?Sized,
    C: CopyDelegate,
{
    (0..ctx.total_pages())
        .map(|index| render_page(ctx, index, key_capacity, value_capacity))
        .collect()
}
