use crate::error::ParseError;

use super::line::{Line, Paragraph};

/// A saved cursor position. Restoring one is the only form of backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub offset: usize,
}

/// Owns the stripped lines and a rewindable cursor over them.
///
/// The cursor is an index plus an optional byte offset into the current line,
/// so a caller that consumed the head of a line can hand back the tail.
#[derive(Debug, Clone)]
pub struct LineStream {
    lines: Vec<Line>,
    index: usize,
    offset: usize,
}

impl LineStream {
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            index: 0,
            offset: 0,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn position(&self) -> Position {
        Position {
            index: self.index,
            offset: self.offset,
        }
    }

    pub fn rewind(&mut self, pos: Position) {
        self.index = pos.index.min(self.lines.len());
        self.offset = pos.offset;
    }

    /// 1-based number of the line under the cursor, or of the last line at EOF.
    pub fn line_no(&self) -> usize {
        self.lines
            .get(self.index)
            .or_else(|| self.lines.last())
            .map_or(0, Line::line_no)
    }

    fn tail(&self, index: usize, offset: usize) -> Option<Line> {
        let line = self.lines.get(index)?;
        let text = line.text.get(offset..).unwrap_or("");
        Some(Line::new(line.number, text))
    }

    /// The (rest of the) current line without consuming it.
    pub fn peek(&self) -> Option<Line> {
        self.tail(self.index, self.offset)
    }

    /// Consumes and returns the (rest of the) current line.
    pub fn next(&mut self) -> Option<Line> {
        let line = self.tail(self.index, self.offset)?;
        self.index += 1;
        self.offset = 0;
        Some(line)
    }

    /// Un-reads the line returned by the previous [`LineStream::next`].
    ///
    /// `line.text` must equal the tail of that line starting at `offset`;
    /// anything else means the caller lost track of the cursor.
    pub fn push_back(&mut self, line: &Line, offset: usize) -> Result<(), ParseError> {
        let prev = self
            .index
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .ok_or_else(|| ParseError::PushBackMismatch {
                line: line.line_no(),
                pushed: line.text.clone(),
                actual: String::new(),
            })?;
        let actual = prev.text.get(offset..).unwrap_or("");
        if actual != line.text {
            return Err(ParseError::PushBackMismatch {
                line: prev.line_no(),
                pushed: line.text.clone(),
                actual: actual.to_string(),
            });
        }
        self.index -= 1;
        self.offset = offset;
        Ok(())
    }

    /// Next non-blank line, without consuming anything.
    pub fn peek_non_blank(&self) -> Option<Line> {
        if let Some(l) = self.peek()
            && !l.is_blank()
        {
            return Some(l);
        }
        self.lines
            .iter()
            .skip(self.index + 1)
            .find(|l| !l.is_blank())
            .cloned()
    }

    /// Whether the last consumed line was blank.
    pub fn prev_is_blank(&self) -> bool {
        self.index
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .is_some_and(Line::is_blank)
    }

    /// Consumes blank lines and returns how many there were.
    pub fn skip_blank(&mut self) -> usize {
        let mut n = 0;
        while let Some(l) = self.peek() {
            if !l.is_blank() {
                break;
            }
            self.next();
            n += 1;
        }
        n
    }

    /// Reads the paragraph starting at `index` (after any blank lines) and returns it
    /// with the index just past its single trailing blank line.
    fn scan_paragraph(&self, mut index: usize, offset: usize) -> Option<(Paragraph, usize)> {
        let mut offset = offset;
        while self.tail(index, offset).is_some_and(|l| l.is_blank()) {
            index += 1;
            offset = 0;
        }
        let mut lines = vec![];
        while let Some(l) = self.tail(index, offset) {
            if l.is_blank() {
                index += 1;
                break;
            }
            lines.push(l);
            index += 1;
            offset = 0;
        }
        Paragraph::new(lines).map(|p| (p, index))
    }

    /// Consumes a maximal run of non-blank lines plus one trailing blank line.
    /// Leading blank lines are skipped.
    pub fn collect_paragraph(&mut self) -> Option<Paragraph> {
        let (para, end) = self.scan_paragraph(self.index, self.offset)?;
        self.index = end;
        self.offset = 0;
        Some(para)
    }

    /// Same as [`LineStream::collect_paragraph`] without consuming.
    pub fn peek_paragraph(&self) -> Option<Paragraph> {
        self.scan_paragraph(self.index, self.offset).map(|(p, _)| p)
    }

    /// The next paragraph together with the first line of the one after it.
    pub fn peek_paragraph_with_lookahead(&self) -> Option<(Paragraph, Option<Line>)> {
        let (para, end) = self.scan_paragraph(self.index, self.offset)?;
        let next = self.scan_paragraph(end, 0).map(|(p, _)| p.first().clone());
        Some((para, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(texts: &[&str]) -> LineStream {
        LineStream::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Line::new(i, *t))
                .collect(),
        )
    }

    #[test]
    fn next_and_push_back_round_trip() {
        let mut s = stream(&["one", "two"]);
        let l = s.next().unwrap();
        assert_eq!(l.text, "one");
        s.push_back(&l, 0).unwrap();
        assert_eq!(s.next().unwrap().text, "one");
        assert_eq!(s.next().unwrap().text, "two");
        assert!(s.next().is_none());
    }

    #[test]
    fn push_back_with_offset_returns_tail() {
        let mut s = stream(&["1.  Introduction"]);
        s.next().unwrap();
        s.push_back(&Line::new(0, "Introduction"), 4).unwrap();
        assert_eq!(s.next().unwrap().text, "Introduction");
    }

    #[test]
    fn push_back_mismatch_is_an_error() {
        let mut s = stream(&["one", "two"]);
        s.next();
        let err = s.push_back(&Line::new(0, "uno"), 0).unwrap_err();
        assert!(matches!(err, ParseError::PushBackMismatch { line: 1, .. }));
    }

    #[test]
    fn push_back_before_any_read_is_an_error() {
        let mut s = stream(&["one"]);
        assert!(s.push_back(&Line::new(0, "one"), 0).is_err());
    }

    #[test]
    fn collect_paragraph_takes_one_trailing_blank() {
        let mut s = stream(&["", "a", "b", "", "", "c"]);
        let p = s.collect_paragraph().unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.first().number, 1);
        // one blank left before "c"
        assert_eq!(s.skip_blank(), 1);
        assert_eq!(s.collect_paragraph().unwrap().first().text, "c");
        assert!(s.collect_paragraph().is_none());
    }

    #[test]
    fn peek_paragraph_does_not_consume() {
        let s = stream(&["a", "", "b"]);
        let (p, next) = s.peek_paragraph_with_lookahead().unwrap();
        assert_eq!(p.first().text, "a");
        assert_eq!(next.unwrap().text, "b");
        assert_eq!(s.position(), Position { index: 0, offset: 0 });
    }

    #[test]
    fn peek_non_blank_skips_blanks() {
        let s = stream(&["", "  ", "x"]);
        assert_eq!(s.peek_non_blank().unwrap().text, "x");
    }

    #[test]
    fn rewind_restores_position() {
        let mut s = stream(&["a", "b", "c"]);
        let pos = s.position();
        s.next();
        s.next();
        s.rewind(pos);
        assert_eq!(s.next().unwrap().text, "a");
    }
}
