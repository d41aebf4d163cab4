use std::sync::OnceLock;

use regex::Regex;

use crate::models::InlineNode;
use crate::parsing::context::DocContext;
use crate::parsing::sections::section_anchor;

use super::cursor::Cursor;

/// A lexical piece of running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Word(&'a str),
    /// A whitespace run; `newline` when it crossed a line break.
    Space { newline: bool },
    /// Inner text of a closed `[...]`.
    Bracket(&'a str),
    /// Inner text of a closed `<...>`.
    Angle(&'a str),
    /// A whole `"..."` or `'...'` span, quotes included.
    Quoted(&'a str),
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:https?|ftp)://\S+$").expect("Invalid URL regex"))
}

fn section_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\d+(?:\.\d+)*|[A-Z](?:\.\d+)*)$").expect("Invalid section number regex")
    })
}

fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\n' || b == b'\t'
}

/// End of the span opened by the delimiter under the cursor, if it closes.
fn span_end(cur: &Cursor<'_>, open: u8) -> Option<usize> {
    let close = match open {
        b'[' => b']',
        b'<' => b'>',
        b'"' | b'\'' => open,
        _ => return None,
    };
    let mut probe = cur.clone();
    probe.bump();
    let end = probe.find(close)?;
    (open != b'[' || !cur.s[cur.i + 1..end].contains('[')).then_some(end)
}

/// Splits text on whitespace, bracket and quote boundaries.
///
/// A delimiter that never closes is ordinary word text.
pub fn split_pieces(text: &str) -> Vec<Piece<'_>> {
    let mut cur = Cursor::new(text);
    let mut out = vec![];
    while let Some(b) = cur.peek() {
        let start = cur.i;
        if is_space(b) {
            let run = cur.bump_while(is_space);
            out.push(Piece::Space {
                newline: run.contains('\n'),
            });
            continue;
        }
        if let Some(end) = span_end(&cur, b) {
            let inner = &text[start + 1..end];
            cur.i = end + 1;
            out.push(match b {
                b'[' => Piece::Bracket(inner),
                b'<' => Piece::Angle(inner),
                _ => Piece::Quoted(&text[start..=end]),
            });
            continue;
        }
        cur.bump();
        loop {
            cur.bump_while(|c| !is_space(c) && c != b'[' && c != b'<');
            match cur.peek() {
                Some(d @ (b'[' | b'<')) if span_end(&cur, d).is_none() => {
                    cur.bump();
                }
                _ => break,
            }
        }
        out.push(Piece::Word(&text[start..cur.i]));
    }
    out
}

/// Splits trailing punctuation off a word.
fn split_punct(word: &str) -> (&str, &str) {
    let core = word.trim_end_matches(['.', ',', ';', ':', ')', '!', '?']);
    (core, &word[core.len()..])
}

/// Appends nodes, merging adjacent text.
#[derive(Default)]
struct Out {
    nodes: Vec<InlineNode>,
}

impl Out {
    fn text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(InlineNode::Text(t)) => t.push_str(s),
            _ => self.nodes.push(InlineNode::Text(s.to_string())),
        }
    }

    fn node(&mut self, n: InlineNode) {
        self.nodes.push(n);
    }

    fn ends_with_join(&self) -> bool {
        match self.nodes.last() {
            Some(InlineNode::Text(t)) => {
                let last_word = t.rsplit(' ').next().unwrap_or_default();
                last_word.len() > 1 && (last_word.ends_with('-') || last_word.ends_with('/'))
            }
            _ => false,
        }
    }
}

/// The word after piece `i`, when exactly one space separates them.
fn word_after<'a>(pieces: &[Piece<'a>], i: usize) -> Option<&'a str> {
    match (pieces.get(i + 1), pieces.get(i + 2)) {
        (Some(Piece::Space { .. }), Some(Piece::Word(w))) => Some(*w),
        _ => None,
    }
}

/// Converts running text into text and cross-reference nodes.
///
/// Every anchor lookup goes through `ctx`, so this must run after the whole
/// tree has been parsed.
pub fn tokenize(text: &str, ctx: &DocContext) -> Vec<InlineNode> {
    let pieces = split_pieces(text.trim());
    let mut out = Out::default();
    let mut i = 0;
    while i < pieces.len() {
        match &pieces[i] {
            Piece::Space { newline } => {
                if !(*newline && out.ends_with_join()) {
                    out.text(" ");
                }
            }
            Piece::Quoted(q) => out.text(q),
            Piece::Bracket(inner) => {
                let anchor = if inner.chars().all(|c| c.is_ascii_digit()) && !inner.is_empty() {
                    format!("ref-{inner}")
                } else {
                    inner.to_string()
                };
                if ctx.reference_anchors.contains(&anchor) {
                    out.node(InlineNode::XRef(anchor));
                } else {
                    out.text("[");
                    out.text(inner);
                    out.text("]");
                }
            }
            Piece::Angle(inner) => {
                let url: String = inner.split_whitespace().collect();
                if url_re().is_match(&url) {
                    out.node(InlineNode::ERef(url));
                } else {
                    out.text("<");
                    out.text(inner);
                    out.text(">");
                }
            }
            Piece::Word(w) => {
                if let Some(consumed) = cross_reference(&pieces, i, ctx, &mut out) {
                    i += consumed;
                    continue;
                }
                let (core, punct) = split_punct(w);
                if url_re().is_match(core) {
                    out.node(InlineNode::ERef(core.to_string()));
                    out.text(punct);
                } else {
                    out.text(w);
                }
            }
        }
        i += 1;
    }
    out.nodes
}

/// `Section 3.2`, `Figure 1` or `Table 2` at `i`, resolved to a known anchor.
///
/// Returns how many pieces were consumed.
fn cross_reference(
    pieces: &[Piece<'_>],
    i: usize,
    ctx: &DocContext,
    out: &mut Out,
) -> Option<usize> {
    let Piece::Word(keyword) = pieces[i] else {
        return None;
    };
    let (number, punct) = split_punct(word_after(pieces, i)?);
    let anchor = match keyword {
        "Section" | "section" => {
            if !section_number_re().is_match(number) {
                return None;
            }
            // "Section 3 of [RFC5246]" points into another document
            if punct.is_empty()
                && word_after(pieces, i + 2) == Some("of")
                && !matches!(pieces.get(i + 6), None | Some(Piece::Word("this")))
            {
                return None;
            }
            let path: Vec<String> = number.split('.').map(str::to_string).collect();
            let anchor = section_anchor(&path);
            ctx.section_anchors.contains(&anchor).then_some(anchor)?
        }
        "Figure" | "Table" => {
            if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let anchor = format!("{}-{number}", keyword.to_ascii_lowercase());
            ctx.figure_table_anchors.contains(&anchor).then_some(anchor)?
        }
        _ => return None,
    };
    out.node(InlineNode::XRef(anchor));
    out.text(punct);
    Some(3)
}
