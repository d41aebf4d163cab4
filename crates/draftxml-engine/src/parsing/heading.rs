//! Recognition of column-0 section headings.

use std::sync::OnceLock;

use regex::Regex;

/// Where in the document the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Front,
    Middle,
    References,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    /// `3.2.  Title`
    Numbered,
    /// `Appendix A.  Title` or `A.1.  Title`
    Appendix,
    /// A known un-numbered heading such as `Abstract`.
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: HeadingKind,
    pub number_path: Vec<String>,
    pub title: String,
    /// Column where the title text starts; continuation lines align here.
    pub title_col: usize,
}

impl Heading {
    pub fn number(&self) -> String {
        self.number_path.join(".")
    }
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+(\S.*)$").expect("Invalid numbered heading regex")
    })
}

fn appendix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Appendix\s+([A-Z])[.:]?\s+(\S.*)$").expect("Invalid appendix heading regex")
    })
}

fn appendix_sub_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z](?:\.\d+)*)\.\s*(\S.*)$|^([A-Z](?:\.\d+)+)\s+(\S.*)$")
            .expect("Invalid appendix subsection regex")
    })
}

fn named_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)^(?:
                Abstract
              | Status\ of\ [Tt]his\ Memo
              | Copyright\ Notice
              | Table\ of\ Contents
              | Acknowledge?ments?
              | Contributors
              | (?:Authors?|Editors?|Contributors)['’]?\ Address(?:es)?
              | Index
              | (?:Normative\ |Informative\ )?References
              | Full\ Copyright\ Statement
              | Intellectual\ Property(?:\ Statement|\ Rights)?
            )$",
        )
        .expect("Invalid named heading regex")
    })
}

/// Recognises `text` as a section heading valid in `part`.
///
/// Only column-0 lines can be headings. In the front matter any column-0 line
/// starts a section, which is how un-numbered notes are picked up.
pub fn parse_heading(text: &str, part: Part) -> Option<Heading> {
    if text.is_empty() || text.starts_with(' ') {
        return None;
    }
    let text = text.trim_end();
    if let Some(c) = numbered_re().captures(text) {
        let title = c.get(2)?;
        return Some(Heading {
            kind: HeadingKind::Numbered,
            number_path: c[1].split('.').map(str::to_string).collect(),
            title: title.as_str().to_string(),
            title_col: title.start(),
        });
    }
    if let Some(c) = appendix_re().captures(text) {
        let title = c.get(2)?;
        return Some(Heading {
            kind: HeadingKind::Appendix,
            number_path: vec![c[1].to_string()],
            title: title.as_str().to_string(),
            title_col: title.start(),
        });
    }
    if named_re().is_match(text) {
        return Some(named(text));
    }
    if part != Part::Front
        && let Some(c) = appendix_sub_re().captures(text)
    {
        let (num, title) = match (c.get(1), c.get(2)) {
            (Some(n), Some(t)) => (n, t),
            _ => (c.get(3)?, c.get(4)?),
        };
        return Some(Heading {
            kind: HeadingKind::Appendix,
            number_path: num.as_str().split('.').map(str::to_string).collect(),
            title: title.as_str().to_string(),
            title_col: title.start(),
        });
    }
    if part == Part::Front {
        return Some(named(text));
    }
    None
}

fn named(text: &str) -> Heading {
    Heading {
        kind: HeadingKind::Named,
        number_path: vec![],
        title: text.trim().to_string(),
        title_col: 0,
    }
}

pub fn is_references_title(title: &str) -> bool {
    let t = title.trim().to_ascii_lowercase();
    matches!(
        t.as_str(),
        "references" | "normative references" | "informative references"
    )
}

pub fn is_address_title(title: &str) -> bool {
    let t = title.trim().to_ascii_lowercase().replace('’', "'");
    let t = t.trim_end_matches("es").trim_end_matches("address");
    matches!(
        t.trim(),
        "author's" | "authors'" | "authors" | "editor's" | "editors'" | "contributors'"
    )
}

/// Pre-2009 back matter that carries no content of its own.
pub fn is_legacy_boilerplate(title: &str) -> bool {
    title.starts_with("Full Copyright Statement") || title.starts_with("Intellectual Property")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.  Introduction", &["1"], "Introduction", 4)]
    #[case("3.2.1. Deep", &["3", "2", "1"], "Deep", 7)]
    #[case("10  No Dot", &["10"], "No Dot", 4)]
    fn numbered_headings(
        #[case] text: &str,
        #[case] path: &[&str],
        #[case] title: &str,
        #[case] col: usize,
    ) {
        let h = parse_heading(text, Part::Middle).unwrap();
        assert_eq!(h.kind, HeadingKind::Numbered);
        assert_eq!(h.number_path, path);
        assert_eq!(h.title, title);
        assert_eq!(h.title_col, col);
    }

    #[test]
    fn appendix_headings() {
        let h = parse_heading("Appendix B.  Examples", Part::Back).unwrap();
        assert_eq!(h.kind, HeadingKind::Appendix);
        assert_eq!(h.number_path, ["B"]);
        let h = parse_heading("B.2.  More", Part::Back).unwrap();
        assert_eq!(h.number_path, ["B", "2"]);
        assert_eq!(h.title, "More");
    }

    #[test]
    fn indented_text_is_never_a_heading() {
        assert!(parse_heading("   1.  item", Part::Middle).is_none());
    }

    #[test]
    fn unknown_column_zero_text_is_a_note_only_in_front() {
        assert!(parse_heading("IESG Note", Part::Middle).is_none());
        let h = parse_heading("IESG Note", Part::Front).unwrap();
        assert_eq!(h.kind, HeadingKind::Named);
    }

    #[rstest]
    #[case("Authors' Addresses", true)]
    #[case("Author's Address", true)]
    #[case("Editors' Addresses", true)]
    #[case("Addresses", false)]
    fn address_titles(#[case] title: &str, #[case] expected: bool) {
        assert_eq!(is_address_title(title), expected);
    }

    #[test]
    fn references_titles() {
        assert!(is_references_title("Normative References"));
        assert!(is_references_title("References"));
        assert!(!is_references_title("Reference Models"));
    }
}
