//! Depth-first enumeration of displayable leaves.
//!
//! A leaf is a string or primitive reachable from the walk root through
//! objects and arrays, numbered in pre-order from zero. Anything sitting at
//! [`RAW_DISPLAY_DEPTH`] object levels below the root is a leaf whatever its
//! kind and is shown as its raw JSON text. Arrays do not add a level.
//!
//! Counting and locating share one walk. Nothing is cached between walks,
//! so numbering inside one message never depends on another.

use tx_json_tokens::{TokenKind, TokenTree};

use crate::document::Document;
use crate::{MAX_WALK_NESTING, RAW_DISPLAY_DEPTH};

/// Path of object keys leading to a located leaf, stored as key token
/// indices and rendered on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    keys: Vec<usize>,
}

impl KeyPath {
    pub const SEPARATOR: u8 = b'/';

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: usize) {
        self.keys.push(key);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.keys.pop()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_tokens(&self) -> &[usize] {
        &self.keys
    }

    /// Raw key bytes joined by [`KeyPath::SEPARATOR`], appended to `out`.
    pub fn render_into<T: TokenTree + ?Sized>(&self, doc: Document<'_, T>, out: &mut Vec<u8>) {
        for (i, &key) in self.keys.iter().enumerate() {
            if i > 0 || !out.is_empty() {
                out.push(Self::SEPARATOR);
            }
            out.extend_from_slice(doc.bytes(key));
        }
    }

    pub fn render<T: TokenTree + ?Sized>(&self, doc: Document<'_, T>) -> String {
        let mut out = Vec::new();
        self.render_into(doc, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// A located leaf: its value token and the keys leading to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub token: usize,
    pub path: KeyPath,
}

enum Mode<'p> {
    Count,
    Locate {
        target: usize,
        path: Option<&'p mut KeyPath>,
    },
}

struct Walk<'d, 'p, T: ?Sized> {
    doc: Document<'d, T>,
    current: usize,
    mode: Mode<'p>,
}

impl<T: TokenTree + ?Sized> Walk<'_, '_, T> {
    /// Visit `token`; returns the leaf's token once the target is reached.
    fn visit(&mut self, token: usize, depth: usize, nesting: usize) -> Option<usize> {
        if depth == RAW_DISPLAY_DEPTH || nesting >= MAX_WALK_NESTING {
            return self.terminal(token);
        }
        match self.doc.kind(token) {
            TokenKind::String | TokenKind::Primitive => self.terminal(token),
            TokenKind::Object => self.visit_object(token, depth, nesting),
            TokenKind::Array => self.visit_array(token, depth, nesting),
            TokenKind::Undefined => None,
        }
    }

    fn terminal(&mut self, token: usize) -> Option<usize> {
        if let Mode::Locate { target, .. } = self.mode {
            if self.current == target {
                return Some(token);
            }
        }
        self.current += 1;
        None
    }

    fn visit_object(&mut self, object: usize, depth: usize, nesting: usize) -> Option<usize> {
        let tree = self.doc.tree;
        for n in 0..tree.object_get_element_count(object) {
            let (Some(key), Some(value)) = (
                tree.object_get_nth_key(object, n),
                tree.object_get_nth_value(object, n),
            ) else {
                continue;
            };
            // Children always follow their parent in a pre-order tree.
            if value <= object {
                continue;
            }
            self.push_key(key);
            if let Some(found) = self.visit(value, depth + 1, nesting + 1) {
                return Some(found);
            }
            self.pop_key();
        }
        None
    }

    fn visit_array(&mut self, array: usize, depth: usize, nesting: usize) -> Option<usize> {
        let tree = self.doc.tree;
        for n in 0..tree.array_get_element_count(array) {
            let Some(element) = tree.array_get_nth_element(array, n) else {
                continue;
            };
            if element <= array {
                continue;
            }
            if let Some(found) = self.visit(element, depth, nesting + 1) {
                return Some(found);
            }
        }
        None
    }

    fn push_key(&mut self, key: usize) {
        if let Mode::Locate {
            path: Some(path), ..
        } = &mut self.mode
        {
            path.push(key);
        }
    }

    fn pop_key(&mut self) {
        if let Mode::Locate {
            path: Some(path), ..
        } = &mut self.mode
        {
            path.pop();
        }
    }
}

/// Number of leaves under `token`.
pub fn count_leaves<T: TokenTree + ?Sized>(doc: Document<'_, T>, token: usize) -> usize {
    let mut walk = Walk {
        doc,
        current: 0,
        mode: Mode::Count,
    };
    walk.visit(token, 0, 0);
    walk.current
}

/// Locate leaf number `target` under `token`.
///
/// With `accumulate_key` the returned path holds the object keys walked
/// through to reach it; otherwise it is left empty. Returns `None` when
/// `target` is not below the leaf count.
pub fn find_leaf<T: TokenTree + ?Sized>(
    doc: Document<'_, T>,
    token: usize,
    target: usize,
    accumulate_key: bool,
) -> Option<Leaf> {
    let mut path = KeyPath::new();
    let found = {
        let mut walk = Walk {
            doc,
            current: 0,
            mode: Mode::Locate {
                target,
                path: accumulate_key.then_some(&mut path),
            },
        };
        walk.visit(token, 0, 0)
    };
    found.map(|token| Leaf { token, path })
}
