//! Reader for the "Authors' Addresses" section.
//!
//! Each author block starts with a full-name line, optionally followed by
//! the organization, postal lines and `Label: value` contact fields. Contact
//! fields may sit in a separate paragraph directly after the postal lines.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Address, Author, Role};
use crate::parsing::DraftParser;
use crate::parsing::lines::Line;

use super::top::strip_editor;

fn field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(phone|tel|fax|facsimile|e-?mail|uri):\s*(.*)$")
            .expect("Invalid address field regex")
    })
}

fn is_field_line(line: &Line) -> bool {
    field_re().is_match(line.trimmed())
}

/// Initials for a full name: `Jane Q. Doe` → `J. Q.`.
fn initials_of(words: &[&str]) -> String {
    words
        .iter()
        .filter_map(|w| w.chars().next())
        .map(|c| format!("{c}."))
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_author(authors: &[Author], name: &str) -> Option<usize> {
    authors.iter().position(|a| {
        a.address.is_none()
            && !a.surname.is_empty()
            && (name.ends_with(&a.surname) || name.split_whitespace().any(|w| w == a.surname))
    })
}

fn fill_address(author: &mut Author, lines: &[Line]) {
    let mut address = Address::default();
    let mut rest = lines;

    if let Some(second) = rest.first().filter(|l| !is_field_line(l)) {
        let text = second.trimmed();
        if let Some(org) = &author.organization {
            let first_word = org.split_whitespace().next().unwrap_or_default();
            if text == org.as_str() || (!first_word.is_empty() && text.starts_with(first_word)) {
                rest = &rest[1..];
            }
        } else if !text.starts_with(|c: char| c.is_ascii_digit()) {
            author.organization = Some(text.to_string());
            rest = &rest[1..];
        }
    }

    for line in rest {
        let text = line.trimmed();
        let Some(c) = field_re().captures(text) else {
            address.postal.push(text.to_string());
            continue;
        };
        let value = c[2].trim().to_string();
        match c[1].to_ascii_lowercase().as_str() {
            "phone" | "tel" => address.phone = Some(value),
            "fax" | "facsimile" => address.facsimile = Some(value),
            "uri" => address.uri = Some(value),
            _ => address.email = Some(value),
        }
    }
    author.address = Some(address);
}

impl DraftParser<'_> {
    /// Consumes the address section and merges it into `authors`.
    pub(crate) fn parse_addresses(&mut self, authors: &mut Vec<Author>) {
        self.stream.next();
        loop {
            self.stream.skip_blank();
            match self.stream.peek() {
                Some(l) if l.indent() > 0 => {}
                _ => break,
            }
            let Some(block) = self.stream.collect_paragraph() else {
                break;
            };
            let mut lines = block.into_lines();
            while let Some(next) = self.stream.peek_paragraph()
                && next.first().indent() > 0
                && next.lines().iter().all(is_field_line)
            {
                self.stream.collect_paragraph();
                lines.extend(next.into_lines());
            }

            let name_line = lines.remove(0);
            let (name, editor) = strip_editor(name_line.trimmed());
            let name = name.to_string();
            let index = match find_author(authors, &name) {
                Some(i) => i,
                None => {
                    self.ctx.warn(
                        name_line.line_no(),
                        format!("address for {name:?} matches no front-page author"),
                    );
                    let words: Vec<&str> = name.split_whitespace().collect();
                    let (surname, given) = words.split_last().map_or(("", &[][..]), |(s, g)| (*s, g));
                    authors.push(Author::new(&initials_of(given), surname));
                    authors.len() - 1
                }
            };
            let author = &mut authors[index];
            author.fullname = name;
            if editor {
                author.role = Some(Role::Editor);
            }
            fill_address(author, &lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Line::new(i, *t))
            .collect()
    }

    #[test]
    fn organization_line_is_skipped_and_fields_filled() {
        let mut a = Author::new("E.", "Rescorla");
        a.organization = Some("Mozilla".into());
        fill_address(
            &mut a,
            &lines(&[
                "   Mozilla",
                "   331 E. Evelyn Ave.",
                "   Mountain View, CA  94041",
                "   EMail: ekr@rtfm.com",
                "   Phone: +1 650 555 1212",
            ]),
        );
        let addr = a.address.unwrap();
        assert_eq!(addr.postal, ["331 E. Evelyn Ave.", "Mountain View, CA  94041"]);
        assert_eq!(addr.email.as_deref(), Some("ekr@rtfm.com"));
        assert_eq!(addr.phone.as_deref(), Some("+1 650 555 1212"));
    }

    #[test]
    fn missing_organization_is_taken_from_the_block() {
        let mut a = Author::new("J.", "Doe");
        fill_address(&mut a, &lines(&["   Example Corp", "   URI: https://example.com/"]));
        assert_eq!(a.organization.as_deref(), Some("Example Corp"));
        assert_eq!(a.address.unwrap().uri.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn street_numbers_are_not_organizations() {
        let mut a = Author::new("J.", "Doe");
        fill_address(&mut a, &lines(&["   12 Main Street"]));
        assert_eq!(a.organization, None);
        assert_eq!(a.address.unwrap().postal, ["12 Main Street"]);
    }

    #[test]
    fn initials_from_given_names() {
        assert_eq!(initials_of(&["Jane", "Q."]), "J. Q.");
    }
}
