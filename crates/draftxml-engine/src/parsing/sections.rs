//! # Section tree
//!
//! Recursive descent over numbered headings. Each section reads its title
//! (plus continuation lines aligned with the title column), its blocks, then
//! its children `N.1`, `N.2`, ... in order.
//!
//! ## Key Invariants
//!
//! - A child heading must carry exactly the next expected number; anything
//!   else deeper than the current level is a fatal numbering error
//! - A heading at or above the current level closes it and is validated by
//!   the ancestor that owns that level

use crate::error::ParseError;
use crate::models::{Document, Section};

use super::DraftParser;
use super::heading::{
    Heading, HeadingKind, Part, is_address_title, is_legacy_boilerplate, is_references_title,
    parse_heading,
};

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `section-2.1`, `section-a.3`.
pub fn section_anchor(number_path: &[String]) -> String {
    format!("section-{}", number_path.join(".").to_ascii_lowercase())
}

impl DraftParser<'_> {
    /// Consumes the heading line and any aligned continuation lines.
    pub(crate) fn read_title(&mut self, h: &Heading) -> String {
        self.stream.next();
        let mut title = h.title.trim().to_string();
        while let Some(next) = self.stream.peek() {
            if next.is_blank() || h.title_col == 0 || next.indent() != h.title_col {
                break;
            }
            title.push(' ');
            title.push_str(next.trimmed());
            self.stream.next();
        }
        if let Some(next) = self.stream.peek()
            && !next.is_blank()
        {
            self.ctx
                .warn(next.line_no(), format!("no blank line after section title {title:?}"));
        }
        title
    }

    /// A slug anchor for an un-numbered section, unique within the document.
    pub(crate) fn unique_anchor(&self, title: &str) -> String {
        let base = match slugify(title) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };
        let mut anchor = base.clone();
        let mut n = 2;
        while self.ctx.section_anchors.contains(&anchor) {
            anchor = format!("{base}-{n}");
            n += 1;
        }
        anchor
    }

    /// Parses the section whose heading is under the cursor.
    pub(crate) fn parse_section(&mut self, h: Heading, part: Part) -> Result<Section, ParseError> {
        let title = self.read_title(&h);
        let numbered = h.kind != HeadingKind::Named;
        let anchor = if numbered {
            section_anchor(&h.number_path)
        } else {
            self.unique_anchor(&title)
        };
        self.ctx.section_anchors.insert(anchor.clone());

        let blocks = self.parse_blocks(part)?;
        let children = if numbered {
            self.parse_children(&h.number_path, part)?
        } else {
            vec![]
        };
        Ok(Section {
            number_path: h.number_path,
            title,
            anchor,
            numbered,
            blocks,
            children,
        })
    }

    /// The heading under the cursor if it is the next child of `parent`.
    ///
    /// `Ok(None)` means the level is closed: no heading, an un-numbered one, or
    /// one at or above the parent's depth.
    pub(crate) fn next_child_heading(
        &mut self,
        parent: &[String],
        n: usize,
        part: Part,
    ) -> Result<Option<Heading>, ParseError> {
        self.stream.skip_blank();
        let Some(line) = self.stream.peek() else {
            return Ok(None);
        };
        let Some(h) = parse_heading(&line.text, part) else {
            return Ok(None);
        };
        if h.kind == HeadingKind::Named || h.number_path.len() <= parent.len() {
            return Ok(None);
        }
        let mut expected = parent.to_vec();
        expected.push(n.to_string());
        if h.number_path != expected {
            return Err(ParseError::SectionNumbering {
                line: line.line_no(),
                expected: expected.join("."),
                found: line.trimmed().to_string(),
            });
        }
        Ok(Some(h))
    }

    fn parse_children(&mut self, parent: &[String], part: Part) -> Result<Vec<Section>, ParseError> {
        let mut children = vec![];
        while let Some(h) = self.next_child_heading(parent, children.len() + 1, part)? {
            children.push(self.parse_section(h, part)?);
        }
        Ok(children)
    }

    /// Consumes a heading and everything up to the next column-0 line.
    pub(crate) fn skip_section(&mut self) {
        self.stream.next();
        while let Some(l) = self.stream.peek() {
            if !l.is_blank() && l.indent() == 0 {
                break;
            }
            self.stream.next();
        }
    }

    /// Reads the numbered sections, references, appendices and back matter.
    pub(crate) fn parse_body(&mut self, doc: &mut Document) -> Result<(), ParseError> {
        let mut next_number = 1usize;
        let mut next_appendix = Some('A');
        let mut in_back = false;
        let mut legacy = false;

        loop {
            self.stream.skip_blank();
            let Some(line) = self.stream.peek() else {
                break;
            };
            let part = if in_back { Part::Back } else { Part::Middle };
            let Some(h) = parse_heading(&line.text, part) else {
                self.ctx.warn(
                    line.line_no(),
                    format!("text outside any section skipped: {:?}", line.trimmed()),
                );
                self.stream.collect_paragraph();
                continue;
            };

            match h.kind {
                HeadingKind::Numbered => {
                    if h.number_path != [next_number.to_string()] {
                        return Err(ParseError::SectionNumbering {
                            line: line.line_no(),
                            expected: next_number.to_string(),
                            found: line.trimmed().to_string(),
                        });
                    }
                    next_number += 1;
                    if is_references_title(&h.title) {
                        let group = self.parse_reference_group(h)?;
                        doc.back.references.push(group);
                        in_back = true;
                    } else if is_address_title(&h.title) {
                        self.parse_addresses(&mut doc.front.authors);
                        in_back = true;
                    } else {
                        let s = self.parse_section(h, part)?;
                        if in_back {
                            doc.back.sections.push(s);
                        } else {
                            doc.middle.push(s);
                        }
                    }
                }
                HeadingKind::Appendix => {
                    let Some(letter) = next_appendix.filter(|c| h.number_path == [c.to_string()])
                    else {
                        return Err(ParseError::SectionNumbering {
                            line: line.line_no(),
                            expected: next_appendix
                                .map_or("no appendix after Z".into(), |c| format!("Appendix {c}")),
                            found: line.trimmed().to_string(),
                        });
                    };
                    next_appendix = next_appendix_letter(letter);
                    in_back = true;
                    let s = self.parse_section(h, Part::Back)?;
                    doc.back.sections.push(s);
                }
                HeadingKind::Named => {
                    in_back = true;
                    if is_references_title(&h.title) {
                        let group = self.parse_reference_group(h)?;
                        doc.back.references.push(group);
                    } else if is_address_title(&h.title) {
                        self.parse_addresses(&mut doc.front.authors);
                    } else if is_legacy_boilerplate(&h.title)
                        || h.title == "Index"
                        || (legacy && h.title.starts_with("Acknowledg"))
                    {
                        legacy |= is_legacy_boilerplate(&h.title);
                        log::debug!("skipping {:?}", h.title);
                        self.skip_section();
                    } else {
                        let s = self.parse_section(h, Part::Back)?;
                        doc.back.sections.push(s);
                    }
                }
            }
        }
        Ok(())
    }
}

/// The appendix letter after `c`; appendices end at `Z`.
fn next_appendix_letter(c: char) -> Option<char> {
    (c.is_ascii_uppercase() && c != 'Z').then(|| char::from(c as u8 + 1))
}
