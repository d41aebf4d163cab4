use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::debug;

use crate::options::ParserOptions;
use crate::parsing::DraftParser;
use crate::parsing::heading::{Part, parse_heading};
use crate::parsing::lines::{Line, Paragraph};

use super::list::{parse_marker, tag_gap};

/// What a paragraph is, judged from its layout alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The paragraph starts a new section; the current one ends here.
    SectionBoundary,
    Text,
    List,
    Table,
    Figure,
    /// Artwork between `<CODE BEGINS>` and `<CODE ENDS>`.
    Code,
    /// Not draft body content at all; handed back to the caller.
    Unknown,
}

pub const CODE_BEGINS: &str = "<CODE BEGINS>";
pub const CODE_ENDS: &str = "<CODE ENDS>";

/// Classifies `para`.
///
/// The result depends only on the paragraph text, `part` and the first line
/// of the following paragraph, so it can be cached on those.
pub fn classify(
    para: &Paragraph,
    part: Part,
    lookahead: Option<&Line>,
    opts: &ParserOptions,
) -> Classification {
    let first = para.first();
    if first.indent() == 0 && parse_heading(&first.text, part).is_some() {
        return Classification::SectionBoundary;
    }
    if first.indent() < opts.body_indent {
        return if first.indent() > 0 {
            Classification::Figure
        } else {
            Classification::Unknown
        };
    }
    let text = para.joined();
    if text.contains(CODE_BEGINS) {
        return Classification::Code;
    }

    let indents = para.indents();
    let ratio = symbol_ratio(&text);
    let prose = ratio < opts.low_symbol_ratio
        || (ratio < opts.moderate_symbol_ratio && (para.len() == 1 || is_filled(para, opts)));

    if prose {
        if looks_like_list(para, &indents, lookahead, opts) {
            Classification::List
        } else {
            Classification::Text
        }
    } else if indents.len() > 1 {
        Classification::Figure
    } else if is_table(para, opts) {
        Classification::Table
    } else {
        Classification::Figure
    }
}

/// Cache key over everything [`classify`] looks at.
pub fn classification_key(para: &Paragraph, part: Part, lookahead: Option<&Line>) -> u64 {
    let mut h = DefaultHasher::new();
    para.joined().hash(&mut h);
    part.hash(&mut h);
    lookahead.map(|l| l.text.as_str()).hash(&mut h);
    h.finish()
}

/// Punctuation and symbols per alphanumeric character.
pub fn symbol_ratio(text: &str) -> f64 {
    let (mut symbols, mut alnum) = (0usize, 0usize);
    for c in text.chars() {
        if c.is_alphanumeric() {
            alnum += 1;
        } else if !c.is_whitespace() {
            symbols += 1;
        }
    }
    match (symbols, alnum) {
        (0, _) => 0.0,
        (_, 0) => f64::INFINITY,
        (s, a) => s as f64 / a as f64,
    }
}

/// Whether every non-final line was wrapped because the next word did not fit.
fn is_filled(para: &Paragraph, opts: &ParserOptions) -> bool {
    para.lines().windows(2).all(|w| {
        let slack = opts.min_line_width.saturating_sub(w[0].text.trim_end().len());
        let next_word = w[1].trimmed().split_whitespace().next().map_or(0, str::len);
        slack < next_word + 1 + opts.fill_change
    })
}

fn looks_like_list(
    para: &Paragraph,
    indents: &BTreeSet<usize>,
    lookahead: Option<&Line>,
    opts: &ParserOptions,
) -> bool {
    if indents.len() > 1 {
        return true;
    }
    let first = para.first();
    if parse_marker(first.trimmed()).is_some() {
        let base = para.base_indent();
        let all_marked = para
            .lines()
            .iter()
            .filter(|l| l.indent() == base)
            .all(|l| parse_marker(l.trimmed()).is_some());
        if para.len() == 1 || all_marked {
            return true;
        }
    }
    // a lone term line followed by its indented definition
    if para.len() == 1
        && !first.trimmed().ends_with(':')
        && lookahead.is_some_and(|l| {
            l.indent() > first.indent() && symbol_ratio(l.trimmed()) < opts.low_symbol_ratio
        })
    {
        return true;
    }
    tag_gap(first.trimmed()).is_some()
}

/// A row made only of frame characters.
///
/// A `|` between the first and last character is a cell separator, so such
/// a row is data (cells holding only `-`), never a border.
pub fn is_border_row(text: &str) -> bool {
    let t = text.trim();
    !t.is_empty()
        && t.chars().all(|c| matches!(c, '-' | '=' | '+' | '|' | ' '))
        && t.contains(['-', '='])
        && !(t.contains('+') && t.contains(' '))
        && !t.get(1..t.len() - 1).is_some_and(|inner| inner.contains('|'))
}

fn is_table(para: &Paragraph, opts: &ParserOptions) -> bool {
    if !is_border_row(&para.first().text) {
        return false;
    }
    let borders: Vec<&str> = para
        .lines()
        .iter()
        .filter(|l| is_border_row(&l.text))
        .map(|l| l.trimmed())
        .collect();
    let shapes: BTreeSet<&str> = borders.iter().copied().collect();
    borders.len() >= opts.table_min_border_rows && shapes.len() <= opts.table_max_border_styles
}

impl DraftParser<'_> {
    /// Classifies `para`, memoised per document.
    pub(crate) fn classify(
        &mut self,
        para: &Paragraph,
        part: Part,
        lookahead: Option<&Line>,
    ) -> Classification {
        let key = classification_key(para, part, lookahead);
        if let Some(c) = self.ctx.cached_classification(key) {
            return c;
        }
        let c = classify(para, part, lookahead, self.opts);
        debug!("line {}: {:?}", para.first().line_no(), c);
        self.ctx.cache_classification(key, c);
        c
    }

    /// Peeks at the next paragraph and classifies it without consuming anything.
    pub(crate) fn peek_classified(&mut self, part: Part) -> Option<(Paragraph, Classification)> {
        let (para, lookahead) = self.stream.peek_paragraph_with_lookahead()?;
        let class = self.classify(&para, part, lookahead.as_ref());
        Some((para, class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn para(texts: &[&str]) -> Paragraph {
        Paragraph::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Line::new(i, *t))
                .collect(),
        )
        .unwrap()
    }

    fn run(texts: &[&str]) -> Classification {
        classify(&para(texts), Part::Middle, None, &ParserOptions::default())
    }

    #[test]
    fn filled_prose_is_text() {
        assert_eq!(
            run(&[
                "   This document describes a protocol for exchanging widgets between",
                "   cooperating hosts.  It is intended for use on the public Internet.",
            ]),
            Classification::Text
        );
    }

    #[rstest]
    #[case(&["   o  first item"])]
    #[case(&["   1.  First step"])]
    #[case(&["   o  first", "   o  second"])]
    #[case(&["   term", "      definition of the term"])]
    #[case(&["   Name      The name of the thing"])]
    fn list_shapes(#[case] texts: &[&str]) {
        assert_eq!(run(texts), Classification::List);
    }

    #[test]
    fn lone_term_with_deeper_follower_is_list() {
        let p = para(&["   Widget"]);
        let next = Line::new(5, "      A small device that does things.");
        assert_eq!(
            classify(&p, Part::Middle, Some(&next), &ParserOptions::default()),
            Classification::List
        );
    }

    #[test]
    fn bordered_grid_is_table() {
        assert_eq!(
            run(&[
                "   +-------+-------+",
                "   | Name  | Value |",
                "   +=======+=======+",
                "   | alpha | 1     |",
                "   +-------+-------+",
            ]),
            Classification::Table
        );
    }

    #[test]
    fn diagram_with_ragged_indent_is_figure() {
        assert_eq!(
            run(&[
                "   +--------+         +--------+",
                "   | Client |-------->| Server |",
                "   +--------+         +--------+",
                "        |",
                "        v",
            ]),
            Classification::Figure
        );
    }

    #[test]
    fn shallow_and_column_zero_lines() {
        assert_eq!(run(&[" x = y + z;"]), Classification::Figure);
        assert_eq!(run(&["Some stray text"]), Classification::Unknown);
        assert_eq!(run(&["2.  Next"]), Classification::SectionBoundary);
    }

    #[test]
    fn code_fence_wins() {
        assert_eq!(
            run(&["   <CODE BEGINS>", "   int main(void) { return 0; }"]),
            Classification::Code
        );
    }

    #[test]
    fn classification_is_stable_for_identical_content() {
        let a = para(&["   o  same"]);
        let b = Paragraph::new(vec![Line::new(99, "   o  same")]).unwrap();
        assert_eq!(
            classification_key(&a, Part::Middle, None),
            classification_key(&b, Part::Middle, None)
        );
        let opts = ParserOptions::default();
        assert_eq!(
            classify(&a, Part::Middle, None, &opts),
            classify(&b, Part::Middle, None, &opts)
        );
    }

    #[test]
    fn border_rows() {
        assert!(is_border_row("   +----+----+"));
        assert!(is_border_row("   -----  -----"));
        assert!(!is_border_row("   | a  | b  |"));
        assert!(!is_border_row("   + -- +"));
        assert!(!is_border_row("   | -    | -    |"));
        assert!(!is_border_row("   |----|----|"));
        assert!(is_border_row("   |---------|"));
    }
}
