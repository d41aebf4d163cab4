//! Fatal parse errors and recoverable diagnostics.
//!
//! The engine knows exactly two severities. A [`ParseError`] aborts the parse
//! of the whole document; a [`Diagnostic`] is recorded, logged, and parsing
//! continues with a best-effort fallback.

use std::fmt;

/// A structural assumption about the input was violated.
///
/// Line numbers are 1-based positions in the original input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected section {expected}, found {found:?}")]
    SectionNumbering {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("line {line}: missing required front-matter field '{field}'")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: {section} text does not match the expected boilerplate: expected {expected:?}, found {found:?}")]
    BoilerplateMismatch {
        line: usize,
        section: String,
        expected: String,
        found: String,
    },
    #[error("line {line}: table has no border row")]
    MissingTableBorder { line: usize },
    #[error("line {line}: pushed-back text {pushed:?} does not match {actual:?}")]
    PushBackMismatch {
        line: usize,
        pushed: String,
        actual: String,
    },
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),
}

/// A recoverable problem found while parsing, tied to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number in the original input.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_error_mentions_line_and_numbers() {
        let err = ParseError::SectionNumbering {
            line: 42,
            expected: "3".into(),
            found: "4.  Oops".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("line 42:"));
        assert!(msg.contains("expected section 3"));
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(7, "unexpected text after document date");
        assert_eq!(d.to_string(), "line 7: unexpected text after document date");
    }
}
