//! # Front Matter
//!
//! Everything before section 1: the first page, the abstract, boilerplate,
//! the table of contents and any front notes.
//!
//! ## Modules
//!
//! - **`top`**: the two-column first page and its field cascade
//! - **`boilerplate`**: fixed status and copyright text, checked and dropped
//! - **`address`**: the "Authors' Addresses" section, merged into the front-page authors

pub mod address;
pub mod boilerplate;
pub mod top;

pub use boilerplate::{BoilerplateCatalog, BoilerplateKey, BoilerplateSection, StandardCatalog};
pub use top::{Layout, parse_author_name, parse_date, split_columns};

use log::debug;

use crate::error::ParseError;
use crate::models::Front;

use super::DraftParser;
use super::heading::{HeadingKind, Part, parse_heading};

impl DraftParser<'_> {
    /// Reads the un-numbered front sections up to the first numbered heading.
    pub(crate) fn parse_front_sections(&mut self, front: &mut Front) -> Result<(), ParseError> {
        loop {
            self.stream.skip_blank();
            let Some(line) = self.stream.peek() else {
                return Ok(());
            };
            let Some(h) = parse_heading(&line.text, Part::Front) else {
                self.ctx.warn(
                    line.line_no(),
                    format!("front-matter text outside any section skipped: {:?}", line.trimmed()),
                );
                self.stream.collect_paragraph();
                continue;
            };
            if h.kind != HeadingKind::Named {
                return Ok(());
            }

            if h.title == "Abstract" {
                let section = self.parse_section(h, Part::Front)?;
                front.abstract_section = Some(section);
            } else if let Some(which) = BoilerplateSection::from_title(&h.title) {
                self.skip_boilerplate(&h, which, front)?;
            } else if h.title == "Table of Contents" {
                debug!("line {}: skipping table of contents", line.line_no());
                self.skip_section();
            } else {
                let note = self.parse_section(h, Part::Front)?;
                front.notes.push(note);
            }
        }
    }
}
