use std::collections::BTreeSet;

/// One line of the input after page stripping.
///
/// `number` is the 0-based position in the *original* input and survives
/// stripping, so diagnostics and the linter can point back at the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// 1-based line number for messages.
    pub fn line_no(&self) -> usize {
        self.number + 1
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of leading spaces.
    pub fn indent(&self) -> usize {
        indent_of(&self.text)
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// Counts leading space characters of `s`.
pub fn indent_of(s: &str) -> usize {
    s.chars().take_while(|c| *c == ' ').count()
}

/// A maximal run of non-blank lines: the unit handed to the block classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Paragraph {
    lines: Vec<Line>,
}

impl Paragraph {
    /// Returns `None` for an empty run.
    pub fn new(lines: Vec<Line>) -> Option<Self> {
        if lines.is_empty() {
            None
        } else {
            Some(Self { lines })
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn first(&self) -> &Line {
        &self.lines[0]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line texts joined with `\n`, indentation included.
    pub fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Distinct left indentations of the non-blank lines.
    pub fn indents(&self) -> BTreeSet<usize> {
        self.lines
            .iter()
            .filter(|l| !l.is_blank())
            .map(Line::indent)
            .collect()
    }

    /// Smallest indentation of any non-blank line.
    pub fn base_indent(&self) -> usize {
        self.indents().into_iter().next().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn indent_counts_leading_spaces() {
        assert_eq!(Line::new(0, "   o  item").indent(), 3);
        assert_eq!(Line::new(0, "Abstract").indent(), 0);
        assert_eq!(Line::new(0, "").indent(), 0);
    }

    #[test]
    fn empty_paragraph_is_rejected() {
        assert!(Paragraph::new(vec![]).is_none());
    }

    #[test]
    fn paragraph_indents_and_join() {
        let p = para(&["   o  first", "      wrapped"]);
        assert_eq!(p.indents().into_iter().collect::<Vec<_>>(), vec![3, 6]);
        assert_eq!(p.base_indent(), 3);
        assert_eq!(p.joined(), "   o  first\n      wrapped");
    }

    #[test]
    fn line_numbers_are_one_based_for_messages() {
        assert_eq!(Line::new(9, "x").line_no(), 10);
    }
}
