//! # Inline Tokenizing
//!
//! Runs once the whole tree exists, so every section, reference, figure and
//! table anchor is known. Prose blocks and list item text are rewritten from
//! raw text into text and cross-reference nodes.
//!
//! ## Modules
//!
//! - **`cursor`**: byte cursor over running text
//! - **`tokenizer`**: `split_pieces()` and `tokenize()`
//!
//! ## Raw Zone Precedence
//!
//! Quoted spans are opaque: `"[RFC2119]"` stays literal text even when
//! `RFC2119` is a known reference.

pub mod cursor;
pub mod tokenizer;

pub use tokenizer::{Piece, split_pieces, tokenize};

use crate::models::{Block, Document, InlineNode, ListNode};

use super::context::DocContext;

/// Rewrites every prose block and list item of `doc`.
pub fn resolve_document(doc: &mut Document, ctx: &DocContext) {
    doc.visit_sections_mut(&mut |section| {
        for block in &mut section.blocks {
            match block {
                Block::Text(nodes) => *nodes = resolve_nodes(nodes, ctx),
                Block::List(list) => resolve_list(list, ctx),
                Block::Table(_) | Block::Figure(_) => {}
            }
        }
    });
}

fn resolve_nodes(nodes: &[InlineNode], ctx: &DocContext) -> Vec<InlineNode> {
    nodes
        .iter()
        .flat_map(|n| match n {
            InlineNode::Text(raw) => tokenize(raw, ctx),
            other => vec![other.clone()],
        })
        .collect()
}

/// Each item chunk becomes several nodes; blank-line positions are moved to
/// the last node of their chunk.
fn resolve_list(list: &mut ListNode, ctx: &DocContext) {
    for item in &mut list.items {
        let mut last_of_chunk = Vec::with_capacity(item.text.len());
        let mut nodes = vec![];
        for chunk in &item.text {
            nodes.extend(resolve_nodes(std::slice::from_ref(chunk), ctx));
            last_of_chunk.push(nodes.len().saturating_sub(1));
        }
        item.blanks = item
            .blanks
            .iter()
            .filter_map(|b| last_of_chunk.get(*b).copied())
            .collect();
        item.text = nodes;
        if let Some(sub) = &mut item.sublist {
            resolve_list(sub, ctx);
        }
    }
}
