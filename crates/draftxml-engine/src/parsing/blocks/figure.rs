use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;
use crate::models::FigureNode;
use crate::parsing::DraftParser;
use crate::parsing::heading::{Part, parse_heading};
use crate::parsing::lines::{Line, Paragraph};

use super::classify::{CODE_BEGINS, CODE_ENDS, Classification};

fn caption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(Figure|Table)\s+(\d+)(?::\s*|\.\s+|\s*$)(.*)$").expect("Invalid caption regex")
    })
}

/// Splits `Figure 3: Title` into the label, number and caption text.
pub fn parse_caption(trimmed: &str) -> Option<(&str, &str, &str)> {
    let c = caption_re().captures(trimmed)?;
    Some((
        c.get(1)?.as_str(),
        c.get(2)?.as_str(),
        c.get(3).map_or("", |m| m.as_str().trim()),
    ))
}

/// Joins lines, shifting them left by their smallest indentation.
pub fn left_align(lines: &[Line]) -> String {
    let min = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(Line::indent)
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.text.get(min..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

impl DraftParser<'_> {
    /// Consumes a one-line `Figure N:`/`Table N:` caption paragraph.
    ///
    /// Returns the registered anchor and the caption text, if any.
    pub(crate) fn take_caption(&mut self, label: &str) -> Option<(String, Option<String>)> {
        let pos = self.stream.position();
        self.stream.skip_blank();
        let found = self.stream.peek_paragraph().and_then(|p| {
            if p.len() != 1 {
                return None;
            }
            let (l, n, text) = parse_caption(p.first().trimmed())?;
            (l == label).then(|| (n.to_string(), text.to_string()))
        });
        let Some((number, text)) = found else {
            self.stream.rewind(pos);
            return None;
        };
        self.stream.collect_paragraph();
        let anchor = format!("{}-{number}", label.to_ascii_lowercase());
        self.ctx.figure_table_anchors.insert(anchor.clone());
        Some((anchor, (!text.is_empty()).then_some(text)))
    }

    /// Consumes artwork: this paragraph and any directly following ones that
    /// are also artwork, keeping the blank lines between them.
    pub(crate) fn collect_figure(&mut self, part: Part) -> Result<FigureNode, ParseError> {
        let lines = self.artwork_lines(part)?;
        Ok(self.finish_figure(&lines, false))
    }

    fn artwork_lines(&mut self, part: Part) -> Result<Vec<Line>, ParseError> {
        let first = self
            .stream
            .collect_paragraph()
            .ok_or(ParseError::UnexpectedEof("figure"))?;
        let mut lines = first.into_lines();
        loop {
            let pos = self.stream.position();
            let blanks = usize::from(self.stream.prev_is_blank()) + self.stream.skip_blank();
            let more = match self.peek_classified(part) {
                Some((para, Classification::Figure)) => {
                    parse_caption(para.first().trimmed()).is_none()
                }
                _ => false,
            };
            if !more {
                self.stream.rewind(pos);
                break;
            }
            let at = self.stream.line_no();
            lines.extend((0..blanks).map(|_| Line::new(at, "")));
            if let Some(p) = self.stream.collect_paragraph() {
                lines.extend(p.into_lines());
            }
        }
        Ok(lines)
    }

    /// Consumes everything between `<CODE BEGINS>` and `<CODE ENDS>`.
    ///
    /// Without a `<CODE ENDS>` anywhere ahead, the code stops before the next
    /// heading of `part`.
    pub(crate) fn collect_code(&mut self, part: Part) -> Result<FigureNode, ParseError> {
        let lines = self.code_lines(part)?;
        Ok(self.finish_figure(&lines, true))
    }

    fn code_lines(&mut self, part: Part) -> Result<Vec<Line>, ParseError> {
        self.stream.skip_blank();
        let start = self.stream.line_no();
        let mut body: Vec<Line> = vec![];
        let mut begun = false;
        let mut closed = false;
        let mut unterminated = false;
        loop {
            let pos = self.stream.position();
            let Some(line) = self.stream.next() else {
                break;
            };
            if !begun {
                begun = line.text.contains(CODE_BEGINS);
                unterminated = begun
                    && !self
                        .stream
                        .lines()
                        .iter()
                        .skip(pos.index + 1)
                        .any(|l| l.text.contains(CODE_ENDS));
                continue;
            }
            if line.text.contains(CODE_ENDS) {
                closed = true;
                break;
            }
            if unterminated && parse_heading(&line.text, part).is_some() {
                self.stream.rewind(pos);
                break;
            }
            body.push(line);
        }
        if !begun {
            return Err(ParseError::UnexpectedEof("code block"));
        }
        if !closed {
            self.ctx
                .warn(start, format!("{CODE_BEGINS} without matching {CODE_ENDS}"));
        }
        while body.last().is_some_and(Line::is_blank) {
            body.pop();
        }
        let lead = body.iter().take_while(|l| l.is_blank()).count();
        body.drain(..lead);
        Ok(body)
    }

    /// Reads the artwork or code below a one-line `Figure N:` paragraph,
    /// captioning it with that paragraph.
    ///
    /// Returns `None`, consuming nothing, when `para` is no such caption or
    /// no artwork follows it.
    pub(crate) fn collect_captioned_figure(
        &mut self,
        para: &Paragraph,
        part: Part,
    ) -> Result<Option<FigureNode>, ParseError> {
        if para.len() != 1 {
            return Ok(None);
        }
        let Some(("Figure", number, text)) = parse_caption(para.first().trimmed()) else {
            return Ok(None);
        };
        let pos = self.stream.position();
        self.stream.collect_paragraph();
        self.stream.skip_blank();
        let (lines, is_source_code) = match self.peek_classified(part) {
            Some((_, Classification::Figure)) => (self.artwork_lines(part)?, false),
            Some((_, Classification::Code)) => (self.code_lines(part)?, true),
            _ => {
                self.stream.rewind(pos);
                return Ok(None);
            }
        };
        let anchor = format!("figure-{number}");
        self.ctx.figure_table_anchors.insert(anchor.clone());
        Ok(Some(FigureNode {
            raw: left_align(&lines),
            caption: (!text.is_empty()).then(|| text.to_string()),
            anchor: Some(anchor),
            is_source_code,
        }))
    }

    fn finish_figure(&mut self, lines: &[Line], is_source_code: bool) -> FigureNode {
        let mut fig = FigureNode {
            raw: left_align(lines),
            caption: None,
            anchor: None,
            is_source_code,
        };
        if let Some((anchor, caption)) = self.take_caption("Figure") {
            fig.anchor = Some(anchor);
            fig.caption = caption;
        }
        fig
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, DocKind};
    use crate::options::ParserOptions;
    use crate::parsing::front::StandardCatalog;
    use rstest::rstest;

    fn parser<'a>(texts: &[&str], opts: &'a ParserOptions) -> DraftParser<'a> {
        let lines = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Line::new(i, *t))
            .collect();
        DraftParser::new(lines, DocKind::Draft, opts, &StandardCatalog)
    }

    #[test]
    fn unclosed_code_stops_at_next_heading() {
        let opts = ParserOptions::default();
        let mut p = parser(
            &["   <CODE BEGINS>", "   int x;", "", "2.  Next", "", "   Text."],
            &opts,
        );
        let code = p.collect_code(Part::Middle).unwrap();
        assert_eq!(code.raw, "int x;");
        assert_eq!(p.stream.peek().map(|l| l.text), Some("2.  Next".to_string()));
        assert_eq!(p.ctx.take_diagnostics().len(), 1);
    }

    #[test]
    fn leading_captions_belong_to_the_artwork_below() {
        let opts = ParserOptions::default();
        let mut p = parser(
            &[
                "   Figure 1: Request",
                "",
                "   +---+   +---+",
                "   | A |-->| B |",
                "   +---+   +---+",
                "",
                "   Figure 2: Reply",
                "",
                "   +---+   +---+",
                "   | A |<--| B |",
                "   +---+   +---+",
            ],
            &opts,
        );
        let blocks = p.parse_blocks(Part::Middle).unwrap();
        let figures: Vec<_> = blocks
            .iter()
            .map(|b| match b {
                Block::Figure(f) => (f.anchor.as_deref(), f.caption.as_deref()),
                other => panic!("expected a figure, got {other:?}"),
            })
            .collect();
        assert_eq!(
            figures,
            [
                (Some("figure-1"), Some("Request")),
                (Some("figure-2"), Some("Reply"))
            ]
        );
        let Block::Figure(first) = &blocks[0] else {
            unreachable!()
        };
        assert_eq!(first.raw, "+---+   +---+\n| A |-->| B |\n+---+   +---+");
    }

    #[test]
    fn caption_without_artwork_stays_prose() {
        let opts = ParserOptions::default();
        let mut p = parser(&["   Figure 3: Orphan", "", "   Plain prose follows here."], &opts);
        let blocks = p.parse_blocks(Part::Middle).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::Text(t) if t[0].plain_text() == "Figure 3: Orphan"));
        assert!(p.ctx.figure_table_anchors.is_empty());
    }

    #[test]
    fn closed_code_keeps_column_zero_lines() {
        let opts = ParserOptions::default();
        let mut p = parser(&["   <CODE BEGINS>", "1. one", "   <CODE ENDS>"], &opts);
        let code = p.collect_code(Part::Middle).unwrap();
        assert_eq!(code.raw, "1. one");
        assert!(code.is_source_code);
        assert!(p.ctx.take_diagnostics().is_empty());
    }

    #[rstest]
    #[case("Figure 1: Message flow", Some(("Figure", "1", "Message flow")))]
    #[case("Table 12.  Codes", Some(("Table", "12", "Codes")))]
    #[case("Figure 3", Some(("Figure", "3", "")))]
    #[case("Figures are nice", None)]
    fn captions(#[case] text: &str, #[case] expected: Option<(&str, &str, &str)>) {
        assert_eq!(parse_caption(text), expected);
    }

    #[test]
    fn artwork_is_left_aligned_and_keeps_blanks() {
        let lines = vec![
            Line::new(0, "      +---+"),
            Line::new(1, "      | A |"),
            Line::new(2, ""),
            Line::new(3, "        x"),
        ];
        assert_eq!(left_align(&lines), "+---+\n| A |\n\n  x");
    }
}
