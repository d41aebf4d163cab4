//! Recovers a structured document tree from the plain-text rendering of an
//! Internet-Draft or RFC and writes it back out as xml2rfc XML.
//!
//! ```no_run
//! use draftxml_engine::{RenderOptions, parse_draft, render_xml};
//!
//! let text = std::fs::read_to_string("draft-ietf-foo-bar-03.txt").unwrap();
//! let parsed = parse_draft("draft-ietf-foo-bar-03.txt", &text).unwrap();
//! for d in &parsed.diagnostics {
//!     eprintln!("{d}");
//! }
//! println!("{}", render_xml(&parsed.document, &RenderOptions::default()));
//! ```

pub mod error;
pub mod models;
pub mod options;
pub mod parsing;
pub mod render;

pub use error::{Diagnostic, ParseError};
pub use options::ParserOptions;
pub use parsing::front::{BoilerplateCatalog, StandardCatalog};
pub use parsing::{ParsedDraft, parse_draft, parse_draft_with};
pub use render::{RenderOptions, render_xml};
