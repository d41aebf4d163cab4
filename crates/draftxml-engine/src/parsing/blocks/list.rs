//! List building.
//!
//! Collection walks the stream and gathers every paragraph that belongs to
//! the list (deeper text, or sibling items of the same marker family) together
//! with the blank lines between them. [`build_list`] then turns those lines
//! into items without touching the stream.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;
use crate::models::{InlineNode, ListItem, ListNode, ListStyle};
use crate::options::ParserOptions;
use crate::parsing::DraftParser;
use crate::parsing::heading::Part;
use crate::parsing::lines::Line;

use super::classify::Classification;

/// A list item marker at the start of a trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    pub style: ListStyle,
    pub text: &'a str,
    /// Byte offset of the item text after the marker.
    pub body: usize,
}

fn numbers_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9][0-9]*\.$").expect("Invalid numbered marker regex"))
}

fn letters_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+\.$").expect("Invalid lettered marker regex"))
}

/// Recognises a bullet, number or letter marker.
pub fn parse_marker(trimmed: &str) -> Option<Marker<'_>> {
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let token = &trimmed[..end];
    let style = if matches!(token, "o" | "*" | "+" | "-") {
        ListStyle::Symbols
    } else if numbers_re().is_match(token) {
        ListStyle::Numbers
    } else if letters_re().is_match(token) {
        ListStyle::Letters
    } else {
        return None;
    };
    let rest = &trimmed[end..];
    Some(Marker {
        style,
        text: token,
        body: end + rest.len() - rest.trim_start().len(),
    })
}

/// Finds a run of two or more spaces not preceded by sentence punctuation.
///
/// Closing quotes and parentheses after the punctuation still end a sentence
/// (`"widget."  Next`). Returns the end of the term before the gap and the
/// start of the text after it.
pub fn tag_gap(trimmed: &str) -> Option<(usize, usize)> {
    let b = trimmed.as_bytes();
    for i in 1..b.len().saturating_sub(1) {
        if b[i] != b' ' || b[i + 1] != b' ' || b[i - 1] == b' ' {
            continue;
        }
        let before = trimmed[..i].trim_end_matches(['"', '\'', ')']);
        if before.ends_with(['.', '?', '!']) {
            continue;
        }
        let body = i + trimmed[i..].len() - trimmed[i..].trim_start().len();
        return (body < b.len()).then_some((i, body));
    }
    None
}

/// The marker family a line would start a list item of.
pub fn family(trimmed: &str) -> ListStyle {
    if let Some(m) = parse_marker(trimmed) {
        m.style
    } else if tag_gap(trimmed).is_some() {
        ListStyle::Hanging
    } else {
        ListStyle::Plain
    }
}

#[derive(Debug, Default)]
struct ItemBuilder {
    marker: Option<String>,
    chunks: Vec<String>,
    blanks: Vec<usize>,
    sub_lines: Vec<Line>,
}

impl ItemBuilder {
    fn start(text: &str, style: ListStyle) -> Self {
        let mut item = Self::default();
        match style {
            ListStyle::Numbers | ListStyle::Letters | ListStyle::Symbols => {
                match parse_marker(text) {
                    Some(m) => {
                        item.marker = Some(m.text.to_string());
                        item.add_text(&text[m.body..], 0);
                    }
                    None => item.add_text(text, 0),
                }
            }
            ListStyle::Hanging => match tag_gap(text) {
                Some((term, body)) => {
                    item.marker = Some(text[..term].to_string());
                    item.add_text(&text[body..], 0);
                }
                None => item.marker = Some(text.to_string()),
            },
            ListStyle::Plain => item.add_text(text, 0),
        }
        item
    }

    fn add_text(&mut self, text: &str, blanks: usize) {
        if text.is_empty() {
            return;
        }
        match self.chunks.last_mut() {
            Some(_) if blanks > 0 => {
                let at = self.chunks.len() - 1;
                self.blanks.extend(std::iter::repeat_n(at, blanks));
                self.chunks.push(text.to_string());
            }
            Some(last) => {
                last.push('\n');
                last.push_str(text);
            }
            None => self.chunks.push(text.to_string()),
        }
    }

    fn finish(self, opts: &ParserOptions) -> ListItem {
        ListItem {
            marker: self.marker,
            text: self.chunks.into_iter().map(InlineNode::Text).collect(),
            blanks: self.blanks,
            sublist: (!self.sub_lines.is_empty()).then(|| build_list(&self.sub_lines, opts)),
        }
    }
}

/// Whether a deeper line opens a nested list under the current item.
///
/// Without a preceding blank line a numbered or lettered marker only counts
/// when it differs from the parent's family and is followed by two spaces.
fn starts_sublist(trimmed: &str, blanks: usize, parent: ListStyle) -> bool {
    match parse_marker(trimmed) {
        Some(m) if m.style == ListStyle::Symbols => true,
        Some(_) if blanks > 0 => true,
        Some(m) => m.style != parent && m.body >= m.text.len() + 2,
        None => false,
    }
}

/// Builds a list from its lines, blank lines included.
///
/// Items start at the base indentation; deeper lines continue the current
/// item or, when they carry their own marker, form a nested list.
pub fn build_list(lines: &[Line], opts: &ParserOptions) -> ListNode {
    let content = || lines.iter().filter(|l| !l.is_blank());
    let base = content().map(Line::indent).min().unwrap_or(0);
    let style = content().next().map_or(ListStyle::Plain, |l| family(l.trimmed()));

    let mut items: Vec<ItemBuilder> = vec![];
    let mut blanks = 0;
    let mut last_indent = base;
    let mut in_sub = false;

    for line in lines {
        if line.is_blank() {
            blanks += 1;
            continue;
        }
        let text = line.trimmed();
        let indent = line.indent();
        if indent <= base {
            let starts = items.is_empty()
                || match style {
                    ListStyle::Numbers | ListStyle::Letters | ListStyle::Symbols => {
                        parse_marker(text).is_some_and(|m| m.style == style)
                    }
                    ListStyle::Hanging => blanks > 0 || tag_gap(text).is_some(),
                    ListStyle::Plain => blanks > 0 || last_indent > base,
                };
            if starts {
                items.push(ItemBuilder::start(text, style));
                in_sub = false;
            } else if let Some(item) = items.last_mut() {
                item.add_text(text, blanks);
            }
        } else if let Some(item) = items.last_mut() {
            if in_sub || starts_sublist(text, blanks, style) {
                if in_sub {
                    item.sub_lines
                        .extend((0..blanks).map(|_| Line::new(line.number, "")));
                }
                item.sub_lines.push(line.clone());
                in_sub = true;
            } else {
                item.add_text(text, blanks);
            }
        }
        blanks = 0;
        last_indent = indent;
    }

    ListNode {
        style,
        hang_indent: hang_indent(lines, base, style, opts),
        items: items.into_iter().map(|i| i.finish(opts)).collect(),
    }
}

/// Column offset of wrapped item text relative to the marker column.
fn hang_indent(lines: &[Line], base: usize, style: ListStyle, opts: &ParserOptions) -> Option<usize> {
    let mut content = lines.iter().filter(|l| !l.is_blank());
    let first = content.next()?;
    let continuation = content
        .take_while(|l| l.indent() > base)
        .map(Line::indent)
        .next();
    let computed = match (continuation, style) {
        (Some(indent), _) => indent - base,
        (None, ListStyle::Hanging) => tag_gap(first.trimmed())?.1,
        (None, ListStyle::Plain) => 0,
        (None, _) => parse_marker(first.trimmed())?.body,
    };
    Some(if computed == 0 {
        opts.zero_hang_indent
    } else {
        computed
    })
}

impl DraftParser<'_> {
    /// Consumes the list starting at the cursor.
    pub(crate) fn collect_list(&mut self, part: Part) -> Result<ListNode, ParseError> {
        let first = self
            .stream
            .collect_paragraph()
            .ok_or(ParseError::UnexpectedEof("list"))?;
        let base = first.base_indent();
        let first_family = family(first.first().trimmed());
        let mut lines = first.into_lines();

        loop {
            let pos = self.stream.position();
            let blanks = usize::from(self.stream.prev_is_blank()) + self.stream.skip_blank();
            let Some((para, class)) = self.peek_classified(part) else {
                self.stream.rewind(pos);
                break;
            };
            let indent = para.base_indent();
            let belongs = indent >= base
                && match class {
                    Classification::Text | Classification::List if indent > base => true,
                    Classification::List => family(para.first().trimmed()) == first_family,
                    _ => false,
                };
            if !belongs {
                self.stream.rewind(pos);
                break;
            }
            let at = para.first().number;
            lines.extend((0..blanks).map(|_| Line::new(at, "")));
            if let Some(p) = self.stream.collect_paragraph() {
                lines.extend(p.into_lines());
            }
        }
        Ok(build_list(&lines, self.opts))
    }
}
