//! # Page stripping
//!
//! Paginated drafts carry a running header and footer on every page plus a
//! form-feed between pages. This pass removes them and collapses the blank
//! padding around each page break, keeping only the blank lines the author
//! wrote.
//!
//! ## Key Invariants
//!
//! - Line numbers of surviving lines are their positions in the original input
//! - Stripping is idempotent: [`strip_lines`] on its own output is a no-op

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::options::ParserOptions;

use super::lines::Line;

/// Output of the page stripper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub lines: Vec<Line>,
    /// Short title taken from the first running page header.
    pub short_title: Option<String>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:Internet-Draft|RFC \d+)\s{2,}(\S.*?)\s{2,}(\S.*\d{4})$")
            .expect("Invalid page header regex")
    })
}

fn footer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\S.*\s{2,}\[Page \d+\]$").expect("Invalid page footer regex"))
}

/// Expands tabs to 8-column tab stops.
pub fn expand_tabs(s: &str) -> String {
    if !s.contains('\t') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    let mut col = 0;
    for c in s.chars() {
        if c == '\t' {
            let n = 8 - col % 8;
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

/// Splits raw input into numbered lines and strips it.
pub fn strip_text(text: &str, opts: &ParserOptions) -> Stripped {
    let lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| Line::new(i, l))
        .collect();
    strip_lines(lines, opts)
}

enum Kind {
    Content,
    Blank,
    PageBreak,
}

/// Removes page furniture from `lines`.
pub fn strip_lines(lines: Vec<Line>, opts: &ParserOptions) -> Stripped {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len());
    let mut short_title = None;
    let mut in_break = false;

    for raw in lines {
        let text = expand_tabs(&raw.text).trim_end().to_string();
        let kind = if raw.text.contains('\x0c') || footer_re().is_match(&text) {
            Kind::PageBreak
        } else if raw.number >= opts.header_min_line
            && let Some(caps) = header_re().captures(&text)
        {
            let title = caps[1].trim();
            if short_title.is_none() && !title.is_empty() && !title.starts_with("Expires") {
                short_title = Some(title.to_string());
            }
            Kind::PageBreak
        } else if text.is_empty() {
            Kind::Blank
        } else {
            Kind::Content
        };

        match kind {
            Kind::PageBreak => {
                if !in_break {
                    debug!("page break at line {}", raw.line_no());
                }
                in_break = true;
                while out.last().is_some_and(Line::is_blank) {
                    out.pop();
                }
            }
            Kind::Blank if in_break => {}
            Kind::Blank => out.push(Line::new(raw.number, text)),
            Kind::Content => {
                let line = Line::new(raw.number, text);
                if in_break {
                    if let Some(prev) = out.last()
                        && !continues_across_break(prev, &line)
                    {
                        out.push(Line::new(prev.number + 1, ""));
                    }
                    in_break = false;
                }
                out.push(line);
            }
        }
    }
    while out.last().is_some_and(Line::is_blank) {
        out.pop();
    }

    Stripped {
        lines: out,
        short_title,
    }
}

/// Whether `next` continues the paragraph `prev` ended with, across a page break.
fn continues_across_break(prev: &Line, next: &Line) -> bool {
    if next.indent() == 0 {
        return false;
    }
    let ends_sentence = prev
        .text
        .trim_end()
        .ends_with(['.', ':', ';', '!', '?']);
    next.indent() >= prev.indent() && !ends_sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(s: &Stripped) -> Vec<&str> {
        s.lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn page_break(footer_page: usize) -> String {
        let mut s = String::new();
        s.push_str("\n\n");
        s.push_str(&format!(
            "Doe                      Expires April 1, 2021                [Page {footer_page}]\n"
        ));
        s.push_str("\x0c\n");
        s.push_str("Internet-Draft             Example Protocol                 October 2020\n");
        s.push_str("\n\n");
        s
    }

    fn padded(prefix_lines: usize) -> String {
        "\n".repeat(prefix_lines)
    }

    #[test]
    fn removes_headers_footers_and_joins_split_paragraph() {
        let text = format!(
            "{}   The first half of a sentence that\n{}   continues on the next page.\n",
            padded(30),
            page_break(1)
        );
        let s = strip_text(&text, &ParserOptions::default());
        assert_eq!(
            texts(&s)[30..],
            [
                "   The first half of a sentence that",
                "   continues on the next page."
            ]
        );
        assert_eq!(s.short_title.as_deref(), Some("Example Protocol"));
    }

    #[test]
    fn keeps_paragraph_break_at_page_boundary() {
        let text = format!(
            "{}   A finished paragraph.\n{}   A new paragraph.\n",
            padded(30),
            page_break(2)
        );
        let s = strip_text(&text, &ParserOptions::default());
        assert_eq!(
            texts(&s)[30..],
            ["   A finished paragraph.", "", "   A new paragraph."]
        );
    }

    #[test]
    fn heading_after_break_gets_blank_line() {
        let text = format!(
            "{}   some words without stop\n{}2.  Next Section\n",
            padded(30),
            page_break(3)
        );
        let s = strip_text(&text, &ParserOptions::default());
        assert_eq!(texts(&s)[31], "");
        assert_eq!(texts(&s)[32], "2.  Next Section");
    }

    #[test]
    fn original_line_numbers_survive() {
        let text = format!("{}   a.\n{}   b.\n", padded(30), page_break(1));
        let s = strip_text(&text, &ParserOptions::default());
        let b = s.lines.iter().find(|l| l.text == "   b.").unwrap();
        assert_eq!(b.number, 38);
    }

    #[test]
    fn header_like_line_near_top_is_kept() {
        let text = "Internet-Draft                Example                   October 2020\n";
        let s = strip_text(text, &ParserOptions::default());
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.short_title, None);
    }

    #[test]
    fn stripping_is_idempotent() {
        let text = format!(
            "{}   one\n\n   two\n{}   three.\n\n\n   four\t x\n",
            padded(28),
            page_break(1)
        );
        let opts = ParserOptions::default();
        let once = strip_text(&text, &opts);
        let twice = strip_lines(once.lines.clone(), &opts);
        assert_eq!(once.lines, twice.lines);
    }

    #[test]
    fn tabs_expand_to_eight_columns() {
        assert_eq!(expand_tabs("a\tb"), "a       b");
        assert_eq!(expand_tabs("\tx"), "        x");
    }
}
