//! # Block Parsing
//!
//! Section bodies are read one paragraph at a time. Each paragraph is
//! classified from its layout alone, then handed to the builder for its kind,
//! which may consume further paragraphs (list continuations, multi-part
//! artwork, captions).
//!
//! ## Modules
//!
//! - **`classify`**: pure, memoised paragraph classification
//! - **`list`**: marker recognition, list collection and item building
//! - **`table`**: border-driven column slicing
//! - **`figure`**: artwork, source code and leading or trailing `Figure N:` captions
//!
//! ## Key Invariants
//!
//! - A section boundary or unclassifiable paragraph is never consumed here
//! - Text blocks hold raw text until the inline pass rewrites them

pub mod classify;
pub mod figure;
pub mod list;
pub mod table;

pub use classify::{Classification, classify};
pub use list::build_list;
pub use table::build_table;

use crate::error::ParseError;
use crate::models::{Block, InlineNode};

use super::DraftParser;
use super::heading::Part;
use super::lines::Paragraph;

/// Raw prose of a paragraph: trimmed lines joined with newlines.
pub fn raw_text(para: &Paragraph) -> String {
    para.lines()
        .iter()
        .map(|l| l.trimmed())
        .collect::<Vec<_>>()
        .join("\n")
}

impl DraftParser<'_> {
    /// Reads blocks until something that is not body content of `part`.
    pub(crate) fn parse_blocks(&mut self, part: Part) -> Result<Vec<Block>, ParseError> {
        let mut blocks = vec![];
        loop {
            self.stream.skip_blank();
            let Some((para, class)) = self.peek_classified(part) else {
                break;
            };
            let block = match class {
                Classification::SectionBoundary | Classification::Unknown => break,
                Classification::Text => match self.collect_captioned_figure(&para, part)? {
                    Some(fig) => Block::Figure(fig),
                    None => {
                        self.stream.collect_paragraph();
                        Block::Text(vec![InlineNode::Text(raw_text(&para))])
                    }
                },
                Classification::List => Block::List(self.collect_list(part)?),
                Classification::Table => Block::Table(self.collect_table()?),
                Classification::Figure => Block::Figure(self.collect_figure(part)?),
                Classification::Code => Block::Figure(self.collect_code(part)?),
            };
            blocks.push(block);
        }
        Ok(blocks)
    }
}
