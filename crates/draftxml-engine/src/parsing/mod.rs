//! # Parsing
//!
//! Single pass over the stripped lines of one document, followed by two
//! whole-tree passes.
//!
//! ## Pipeline
//!
//! 1. **`strip`**: page headers, footers and page-break padding removed
//! 2. **`front`**: first page, abstract, boilerplate, notes
//! 3. **`sections`**: numbered sections, appendices and back matter, with
//!    **`blocks`** for section bodies and **`references`** for bibliographies
//! 4. **`inline`**: prose rewritten into text and cross-references
//! 5. **`postprocess`**: document-wide flags
//!
//! ## Key Invariants
//!
//! - All mutable state lives in one [`DraftParser`]; nothing is process-wide,
//!   so documents can be parsed concurrently
//! - Cross-references are only resolved after every anchor is registered

pub mod blocks;
pub mod context;
pub mod front;
pub mod heading;
pub mod inline;
pub mod lines;
pub mod postprocess;
pub mod references;
pub mod sections;
pub mod strip;

use log::{debug, info};

use crate::error::{Diagnostic, ParseError};
use crate::models::{DocKind, Document, Front};
use crate::options::ParserOptions;

use context::DocContext;
use front::{BoilerplateCatalog, StandardCatalog};
use lines::{Line, LineStream};

/// Parser state for one document.
pub struct DraftParser<'a> {
    pub(crate) opts: &'a ParserOptions,
    pub(crate) catalog: &'a dyn BoilerplateCatalog,
    pub(crate) stream: LineStream,
    pub(crate) ctx: DocContext,
    pub(crate) kind: DocKind,
}

/// A parsed document with the lines it was read from and every warning.
#[derive(Debug)]
pub struct ParsedDraft {
    pub document: Document,
    /// Stripped input lines; each keeps its original line number.
    pub lines: Vec<Line>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> DraftParser<'a> {
    pub fn new(
        lines: Vec<Line>,
        kind: DocKind,
        opts: &'a ParserOptions,
        catalog: &'a dyn BoilerplateCatalog,
    ) -> Self {
        Self {
            opts,
            catalog,
            stream: LineStream::new(lines),
            ctx: DocContext::new(),
            kind,
        }
    }

    /// Reads the whole document.
    pub fn parse(mut self, short_title: Option<String>) -> Result<ParsedDraft, ParseError> {
        let mut front = Front::new(self.kind);
        self.parse_first_page(&mut front)?;
        if short_title.as_deref().is_some_and(|t| t != front.title) {
            front.abbrev = short_title;
        }
        self.parse_front_sections(&mut front)?;

        let mut document = Document {
            front,
            middle: vec![],
            back: Default::default(),
            entities: vec![],
            flags: Default::default(),
        };
        self.parse_body(&mut document)?;

        inline::resolve_document(&mut document, &self.ctx);
        document.flags = postprocess::compute_flags(&document);
        document.entities = self.ctx.take_entities();

        let diagnostics = self.ctx.take_diagnostics();
        info!(
            "parsed {} top-level sections, {} warnings",
            document.middle.len(),
            diagnostics.len()
        );
        Ok(ParsedDraft {
            document,
            lines: self.stream.into_lines(),
            diagnostics,
        })
    }
}

/// Parses `text` with default options and the standard boilerplate catalog.
///
/// `name` is the input file name; an `rfc` prefix marks a published RFC.
pub fn parse_draft(name: &str, text: &str) -> Result<ParsedDraft, ParseError> {
    parse_draft_with(name, text, &ParserOptions::default(), &StandardCatalog)
}

pub fn parse_draft_with(
    name: &str,
    text: &str,
    opts: &ParserOptions,
    catalog: &dyn BoilerplateCatalog,
) -> Result<ParsedDraft, ParseError> {
    let kind = DocKind::from_name(name);
    let stripped = strip::strip_text(text, opts);
    debug!(
        "{name}: {:?}, {} lines after stripping",
        kind,
        stripped.lines.len()
    );
    DraftParser::new(stripped.lines, kind, opts, catalog).parse(stripped.short_title)
}
