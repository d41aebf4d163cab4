/// A byte cursor over running text.
///
/// Only ever stops at ASCII delimiters, so slices taken between two stop
/// positions are valid UTF-8.
#[derive(Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances while `pred` holds and returns the consumed slice.
    pub fn bump_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while self.peek().is_some_and(&pred) {
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    /// Position of the next `b` at or after the cursor.
    pub fn find(&self, b: u8) -> Option<usize> {
        self.s.as_bytes()[self.i..]
            .iter()
            .position(|c| *c == b)
            .map(|p| self.i + p)
    }

    /// The unconsumed rest of the input.
    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello");
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.bump(), Some(b'h'));
        assert_eq!(cur.rest(), "ello");
    }

    #[test]
    fn empty_string_input() {
        let mut cur = Cursor::new("");
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.bump(), None);
    }

    #[test]
    fn bump_while_stops_at_delimiter() {
        let mut cur = Cursor::new("word  next");
        assert_eq!(cur.bump_while(|b| b != b' '), "word");
        assert_eq!(cur.bump_while(|b| b == b' '), "  ");
        assert_eq!(cur.rest(), "next");
    }

    #[test]
    fn find_is_relative_to_cursor() {
        let mut cur = Cursor::new("[a] [b]");
        cur.bump();
        assert_eq!(cur.find(b']'), Some(2));
        assert_eq!(cur.find(b'x'), None);
    }

    #[test]
    fn non_ascii_text_is_sliced_at_ascii_stops() {
        let mut cur = Cursor::new("héllo wörld");
        assert_eq!(cur.bump_while(|b| b != b' '), "héllo");
    }
}
