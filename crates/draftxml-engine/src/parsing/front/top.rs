//! # First page
//!
//! The top of page one is laid out in two columns: publication metadata on
//! the left, authors and date on the right, followed by the centered title
//! and document name. Each line is split on its widest whitespace run.
//!
//! The left column is read by an ordered field cascade: among the fields not
//! yet seen, the first whose pattern matches the next line consumes it. The
//! cascade stops at the first line no field recognises.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::ParseError;
use crate::models::{Author, Category, Date, DocKind, Front, Role, Stream};
use crate::parsing::DraftParser;
use crate::parsing::heading::{HeadingKind, Part, parse_heading};
use crate::parsing::lines::{Line, indent_of};

/// How a first-page line is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Columns(String, String),
    Left(String),
    Right(String),
    Centered(String),
}

/// Splits a line on its widest whitespace run after padding it to `width`.
///
/// The left fragment keeps its indentation; continuation lines of
/// multi-line fields are recognised by it.
pub fn split_columns(text: &str, width: usize) -> Layout {
    let content = text.trim_end();
    let len = content.chars().count();
    let lead = indent_of(content);
    let trail = width.saturating_sub(len);

    let chars: Vec<char> = content.chars().collect();
    let (mut gap_start, mut gap_len) = (0, 0);
    let mut i = lead;
    while i < chars.len() {
        if chars[i] == ' ' {
            let start = i;
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
            if i - start > gap_len {
                (gap_start, gap_len) = (start, i - start);
            }
        } else {
            i += 1;
        }
    }

    if gap_len > lead.max(trail) {
        let left: String = chars[..gap_start].iter().collect();
        let right: String = chars[gap_start + gap_len..].iter().collect();
        return Layout::Columns(left, right.trim().to_string());
    }
    if lead.abs_diff(trail) < lead.min(trail) {
        Layout::Centered(content.trim().to_string())
    } else if lead > trail {
        Layout::Right(content.trim().to_string())
    } else {
        Layout::Left(content.to_string())
    }
}

fn front_stop_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:Abstract|Status of [Tt]his Memo|Copyright Notice|Table of Contents)\s*$")
            .expect("Invalid front section regex")
    })
}

#[derive(Debug, Default)]
pub struct FirstPage {
    pub left: Vec<Line>,
    pub right: Vec<Line>,
    pub centered: Vec<Line>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applies {
    Any,
    Draft,
    Rfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Optional,
    Warn,
    Fatal,
}

/// `Err` carries a warning; the field still counts as seen.
type Applied = Result<(), String>;

struct Field {
    name: &'static str,
    applies: Applies,
    requirement: Requirement,
    multi_line: bool,
    repeatable: bool,
    first_line_only: bool,
    pattern: &'static str,
    apply: fn(&mut Front, &str) -> Applied,
}

impl Field {
    fn applies_to(&self, kind: DocKind) -> bool {
        match self.applies {
            Applies::Any => true,
            Applies::Draft => kind == DocKind::Draft,
            Applies::Rfc => kind == DocKind::Rfc,
        }
    }
}

const FIELDS: &[Field] = &[
    Field {
        name: "Internet-Draft",
        applies: Applies::Draft,
        requirement: Requirement::Warn,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^(Internet-Draft)$",
        apply: |_, _| Ok(()),
    },
    Field {
        name: "Request for Comments",
        applies: Applies::Rfc,
        requirement: Requirement::Fatal,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Request for Comments:\s*(\d+)$",
        apply: |f, v| {
            f.rfc_number = Some(v.to_string());
            Ok(())
        },
    },
    Field {
        name: "series",
        applies: Applies::Any,
        requirement: Requirement::Optional,
        multi_line: false,
        repeatable: true,
        first_line_only: false,
        pattern: r"^((?:STD|BCP|FYI):\s*\d+)$",
        apply: |f, v| {
            if let Some((name, num)) = v.split_once(':') {
                f.series.push((name.trim().to_string(), num.trim().to_string()));
            }
            Ok(())
        },
    },
    Field {
        name: "Obsoletes",
        applies: Applies::Any,
        requirement: Requirement::Optional,
        multi_line: true,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Obsoletes:\s*(.+)$",
        apply: |f, v| {
            f.obsoletes = rfc_numbers(v);
            approval_note(f.kind, "Obsoletes", v)
        },
    },
    Field {
        name: "Updates",
        applies: Applies::Any,
        requirement: Requirement::Optional,
        multi_line: true,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Updates:\s*(.+)$",
        apply: |f, v| {
            f.updates = rfc_numbers(v);
            approval_note(f.kind, "Updates", v)
        },
    },
    Field {
        name: "Intended status",
        applies: Applies::Draft,
        requirement: Requirement::Warn,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Intended [Ss]tatus:\s*(.+)$",
        apply: set_category,
    },
    Field {
        name: "Category",
        applies: Applies::Rfc,
        requirement: Requirement::Fatal,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Category:\s*(.+)$",
        apply: set_category,
    },
    Field {
        name: "Expires",
        applies: Applies::Draft,
        requirement: Requirement::Warn,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^Expires:\s*(.+)$",
        apply: |f, v| {
            f.expires = Some(v.trim().to_string());
            Ok(())
        },
    },
    Field {
        name: "ISSN",
        applies: Applies::Rfc,
        requirement: Requirement::Warn,
        multi_line: false,
        repeatable: false,
        first_line_only: false,
        pattern: r"^ISSN:\s*(.+)$",
        apply: |f, v| {
            f.issn = Some(v.trim().to_string());
            Ok(())
        },
    },
    Field {
        name: "stream",
        applies: Applies::Any,
        requirement: Requirement::Optional,
        multi_line: false,
        repeatable: false,
        first_line_only: true,
        pattern: r"^(.+)$",
        apply: set_stream,
    },
];

fn field_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        FIELDS
            .iter()
            .map(|f| Regex::new(f.pattern).expect("Invalid front field regex"))
            .collect()
    })
}

fn set_category(f: &mut Front, v: &str) -> Applied {
    let label = v.trim();
    match Category::from_label(label) {
        Some(c) => {
            f.category = Some(c);
            Ok(())
        }
        None => Err(format!("unknown category {label:?}")),
    }
}

fn set_stream(f: &mut Front, v: &str) -> Applied {
    let v = v.trim();
    f.stream = match v {
        "Internet Engineering Task Force (IETF)" => Stream::Ietf,
        "Internet Architecture Board (IAB)" => Stream::Iab,
        "Internet Research Task Force (IRTF)" => Stream::Irtf,
        "Independent Submission" => Stream::Independent,
        other => {
            f.workgroup = Some(other.to_string());
            Stream::Ietf
        }
    };
    Ok(())
}

fn rfc_numbers(v: &str) -> Vec<String> {
    v.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

fn approval_note(kind: DocKind, field: &str, v: &str) -> Applied {
    if kind == DocKind::Draft && !v.contains("(if approved)") {
        Err(format!("{field} of a draft should say \"(if approved)\""))
    } else {
        Ok(())
    }
}

fn dmy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d{1,2})\s+)?([A-Za-z]+)\.?,?\s+(\d{4})$").expect("Invalid date regex")
    })
}

fn mdy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)\.?\s+(\d{1,2}),?\s+(\d{4})$").expect("Invalid date regex")
    })
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("Invalid date regex"))
}

/// Reads `March 1997`, `1 March 1997`, `March 1, 1997`, `1997`, or `1997-03-01`.
pub fn parse_date(text: &str) -> Option<Date> {
    let t = text.trim();
    if let Some(c) = iso_re().captures(t) {
        let month: u32 = c[2].parse().ok()?;
        let year: u32 = c[1].parse().ok()?;
        return (1..=12).contains(&month).then(|| Date {
            year,
            month: Some(month),
            day: c[3].parse().ok(),
        });
    }
    if let Some(c) = mdy_re().captures(t) {
        return Some(Date {
            year: c[3].parse().ok()?,
            month: Some(Date::month_from_name(&c[1])?),
            day: c[2].parse().ok(),
        });
    }
    if let Some(c) = dmy_re().captures(t) {
        return Some(Date {
            year: c[3].parse().ok()?,
            month: Some(Date::month_from_name(&c[2])?),
            day: c.get(1).and_then(|d| d.as_str().parse().ok()),
        });
    }
    if t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()) {
        return Some(Date {
            year: t.parse().ok()?,
            month: None,
            day: None,
        });
    }
    None
}

fn editor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*?)(?:,\s*Ed\.?|,\s*[Ee]ditor|\s*\((?:[Ee]ditor|Ed\.?)\))$")
            .expect("Invalid editor suffix regex")
    })
}

fn author_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^((?:\p{Lu}\p{Ll}?\.(?:-\p{Lu}\.)?\s*)+)((?:\p{Ll}+\s+)?\p{Lu}[\p{L}'’-]*(?:\s+\p{L}[\p{L}'’-]*){0,2})$",
        )
        .expect("Invalid author name regex")
    })
}

/// Splits a trailing editor marker off a name.
pub fn strip_editor(text: &str) -> (&str, bool) {
    match editor_re().captures(text) {
        Some(c) => (c.get(1).map_or(text, |m| m.as_str().trim()), true),
        None => (text, false),
    }
}

/// Reads `J. Smith`, `J.-P. Dupont, Ed.` and similar.
pub fn parse_author_name(text: &str) -> Option<Author> {
    let (name, editor) = strip_editor(text.trim());
    let c = author_re().captures(name)?;
    let mut author = Author::new(c[1].trim(), c[2].trim());
    if editor {
        author.role = Some(Role::Editor);
    }
    Some(author)
}

impl DraftParser<'_> {
    /// Reads first-page lines up to the first front-matter section heading.
    pub(crate) fn read_first_page(&mut self) -> FirstPage {
        let mut page = FirstPage::default();
        while let Some(line) = self.stream.peek() {
            if line.indent() == 0
                && !line.is_blank()
                && (front_stop_re().is_match(&line.text)
                    || parse_heading(&line.text, Part::Middle)
                        .is_some_and(|h| h.kind == HeadingKind::Numbered))
            {
                break;
            }
            self.stream.next();
            if line.is_blank() {
                continue;
            }
            let n = line.number;
            match split_columns(&line.text, self.opts.min_line_width) {
                Layout::Columns(l, r) => {
                    page.left.push(Line::new(n, l));
                    page.right.push(Line::new(n, r));
                }
                Layout::Left(l) => page.left.push(Line::new(n, l)),
                Layout::Right(r) => page.right.push(Line::new(n, r)),
                Layout::Centered(c) => page.centered.push(Line::new(n, c)),
            }
        }
        page
    }

    /// Parses the first page into `front`.
    pub(crate) fn parse_first_page(&mut self, front: &mut Front) -> Result<(), ParseError> {
        let page = self.read_first_page();
        let last_line = page
            .left
            .iter()
            .chain(&page.right)
            .chain(&page.centered)
            .map(Line::line_no)
            .max()
            .unwrap_or(1);

        for line in &page.centered {
            let t = line.trimmed();
            if t.contains("draft-") && !t.contains(' ') {
                front.docname = Some(t.trim_end_matches(".txt").to_string());
            } else {
                if !front.title.is_empty() {
                    front.title.push(' ');
                }
                front.title.push_str(t);
            }
        }
        if front.title.is_empty() {
            self.ctx.warn(last_line, "no document title found");
        }

        self.parse_top_left(front, &page.left, last_line)?;
        self.parse_top_right(front, &page.right, last_line);
        Ok(())
    }

    fn parse_top_left(
        &mut self,
        front: &mut Front,
        left: &[Line],
        last_line: usize,
    ) -> Result<(), ParseError> {
        let res = field_res();
        let mut seen = vec![false; FIELDS.len()];
        let mut i = 0;
        while i < left.len() {
            let text = left[i].trimmed();
            let hit = FIELDS.iter().enumerate().find(|(k, f)| {
                f.applies_to(front.kind)
                    && (!seen[*k] || f.repeatable)
                    && (!f.first_line_only || i == 0)
                    && res[*k].is_match(text)
            });
            let Some((k, field)) = hit else {
                break;
            };
            let line_no = left[i].line_no();
            let mut value = res[k]
                .captures(text)
                .and_then(|c| c.get(1))
                .map_or_else(String::new, |m| m.as_str().to_string());
            if field.multi_line {
                while i + 1 < left.len() && left[i + 1].indent() >= 3 {
                    i += 1;
                    value.push(' ');
                    value.push_str(left[i].trimmed());
                }
            }
            debug!("line {line_no}: front field {}", field.name);
            if let Err(msg) = (field.apply)(front, &value) {
                self.ctx.warn(line_no, msg);
            }
            seen[k] = true;
            i += 1;
        }
        if let Some(rest) = left.get(i) {
            self.ctx.warn(
                rest.line_no(),
                format!("unrecognised front-page text {:?}", rest.trimmed()),
            );
        }

        for (k, field) in FIELDS.iter().enumerate() {
            if seen[k] || !field.applies_to(front.kind) {
                continue;
            }
            match field.requirement {
                Requirement::Optional => {}
                Requirement::Warn => self
                    .ctx
                    .warn(last_line, format!("missing front-page field {:?}", field.name)),
                Requirement::Fatal => {
                    return Err(ParseError::MissingField {
                        line: last_line,
                        field: field.name,
                    });
                }
            }
        }
        Ok(())
    }

    fn parse_top_right(&mut self, front: &mut Front, right: &[Line], last_line: usize) {
        let mut dated = false;
        for line in right {
            let t = line.trimmed();
            if dated {
                self.ctx.warn(
                    line.line_no(),
                    format!("unexpected text after document date: {t:?}"),
                );
                continue;
            }
            if let Some(date) = parse_date(t) {
                front.date = Some(date);
                dated = true;
            } else if let Some(author) = parse_author_name(t) {
                front.authors.push(author);
            } else if let Some(a) = front
                .authors
                .iter_mut()
                .rev()
                .find(|a| a.organization.is_none())
            {
                a.organization = Some(t.to_string());
            } else if let Some(org) = front
                .authors
                .last_mut()
                .and_then(|a| a.organization.as_mut())
            {
                org.push(' ');
                org.push_str(t);
            } else {
                self.ctx
                    .warn(line.line_no(), format!("organization without author: {t:?}"));
            }
        }
        // authors listed above a shared organization line take it over
        for i in (0..front.authors.len().saturating_sub(1)).rev() {
            if front.authors[i].organization.is_none() {
                front.authors[i].organization = front.authors[i + 1].organization.clone();
            }
        }
        if !dated {
            self.ctx.warn(last_line, "no document date found");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn two_column_line() {
        let line = "Network Working Group                                         J. Doe";
        assert_eq!(
            split_columns(line, 72),
            Layout::Columns("Network Working Group".into(), "J. Doe".into())
        );
    }

    #[test]
    fn centered_title() {
        let line = "                        Example Protocol Title";
        assert_eq!(
            split_columns(line, 72),
            Layout::Centered("Example Protocol Title".into())
        );
    }

    #[test]
    fn single_sided_lines() {
        assert_eq!(
            split_columns("Expires: April 4, 2021", 72),
            Layout::Left("Expires: April 4, 2021".into())
        );
        assert_eq!(
            split_columns("           6961", 72),
            Layout::Left("           6961".into())
        );
        assert_eq!(
            split_columns("                                                       Example Corp", 72),
            Layout::Right("Example Corp".into())
        );
    }

    #[rstest]
    #[case("March 1997", Some((1997, Some(3), None)))]
    #[case("1 October 2020", Some((2020, Some(10), Some(1))))]
    #[case("October 1, 2020", Some((2020, Some(10), Some(1))))]
    #[case("2020-10-01", Some((2020, Some(10), Some(1))))]
    #[case("2020", Some((2020, None, None)))]
    #[case("Example Corp", None)]
    fn dates(#[case] text: &str, #[case] expected: Option<(u32, Option<u32>, Option<u32>)>) {
        assert_eq!(parse_date(text).map(|d| (d.year, d.month, d.day)), expected);
    }

    #[rstest]
    #[case("E. Rescorla", "E.", "Rescorla", false)]
    #[case("J. Doe, Ed.", "J.", "Doe", true)]
    #[case("J.-P. Dupont (editor)", "J.-P.", "Dupont", true)]
    #[case("A. B. van Rossum", "A. B.", "van Rossum", false)]
    fn author_names(
        #[case] text: &str,
        #[case] initials: &str,
        #[case] surname: &str,
        #[case] editor: bool,
    ) {
        let a = parse_author_name(text).unwrap();
        assert_eq!(a.initials, initials);
        assert_eq!(a.surname, surname);
        assert_eq!(a.role.is_some(), editor);
    }

    #[test]
    fn organizations_are_not_names() {
        assert!(parse_author_name("Example Corp").is_none());
        assert!(parse_author_name("Mozilla").is_none());
    }

    #[test]
    fn obsoletes_numbers() {
        assert_eq!(rfc_numbers("5077, 5246, 6961 (if approved)"), ["5077", "5246", "6961"]);
    }
}
