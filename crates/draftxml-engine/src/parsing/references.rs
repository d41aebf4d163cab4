//! # References
//!
//! One bibliography entry per paragraph. Entries are read by an ordered list
//! of grammars, most specific first; the first grammar that matches the whole
//! entry decides which fields exist.
//!
//! ## Key Invariants
//!
//! - A grammar never matches part of an entry: every grammar is anchored at
//!   both ends
//! - RFC and Internet-Draft series entries always add an [`Entity`]; the
//!   reference is entity-backed only when its anchor equals the entity name
//! - An entry no grammar reads is kept with its raw text and reported, never
//!   fatal

use std::sync::OnceLock;

use log::debug;
use regex::{Captures, Regex};

use crate::error::ParseError;
use crate::models::{Author, AuthorOrOrg, Entity, Reference, ReferenceGroup, Role, SeriesInfo};
use crate::options::ParserOptions;

use super::DraftParser;
use super::front::top::{parse_author_name, parse_date};
use super::heading::{Heading, HeadingKind, Part};
use super::lines::Paragraph;
use super::sections::section_anchor;

#[derive(Debug, Clone, Copy)]
enum Piece {
    Authors,
    Title,
    Series,
    Date,
    Url,
    AngleUrl,
    BareUrl,
}

impl Piece {
    fn pattern(self) -> &'static str {
        match self {
            Piece::Authors => r#"(?P<authors>[^"]+?),\s*"#,
            Piece::Title => r#""(?P<title>[^"]+?),?""#,
            Piece::Series => r#"\s*,?\s*(?P<series>[^",\s<][^"]*?)"#,
            Piece::Date => {
                r"\s*,?\s*(?P<date>(?:\d{1,2}\s+)?[A-Z][a-z]+\.?\s+\d{4}|[A-Z][a-z]+\.?\s+\d{1,2},\s+\d{4}|\d{4})"
            }
            Piece::Url => r"\s*,?\s*<?(?P<url>(?:https?|ftp)://[^\s>]+?)>?",
            Piece::AngleUrl => r"<(?P<url>[^\s>]+)>",
            Piece::BareUrl => r"(?P<url>(?:https?|ftp)://\S+?)",
        }
    }
}

use Piece::*;

const GRAMMARS: &[(&str, &[Piece])] = &[
    ("authors-title-series-date-url", &[Authors, Title, Series, Date, Url]),
    ("authors-title-series-date", &[Authors, Title, Series, Date]),
    ("authors-title-date-url", &[Authors, Title, Date, Url]),
    ("authors-title-date", &[Authors, Title, Date]),
    ("authors-title-series-url", &[Authors, Title, Series, Url]),
    ("authors-title-series", &[Authors, Title, Series]),
    ("authors-title-url", &[Authors, Title, Url]),
    ("title-series-date-url", &[Title, Series, Date, Url]),
    ("title-series-date", &[Title, Series, Date]),
    ("title-date-url", &[Title, Date, Url]),
    ("title-date", &[Title, Date]),
    ("title-url", &[Title, Url]),
    ("authors-title", &[Authors, Title]),
    ("title", &[Title]),
    ("angle-url", &[AngleUrl]),
    ("bare-url", &[BareUrl]),
];

const LABEL: &str = r"^\[(?P<label>[^\]]+)\]\s+";
const END: &str = r"\s*\.?\s*$";

fn grammar_res() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        GRAMMARS
            .iter()
            .map(|(name, pieces)| {
                let body: String = pieces.iter().map(|p| p.pattern()).collect();
                let re = Regex::new(&format!("{LABEL}{body}{END}"))
                    .expect("Invalid reference grammar regex");
                (*name, re)
            })
            .collect()
    })
}

/// The first grammar that reads `text`, with its captures.
pub fn match_entry(text: &str) -> Option<(&'static str, Captures<'_>)> {
    grammar_res()
        .iter()
        .find_map(|(name, re)| re.captures(text).map(|c| (*name, c)))
}

/// Name of the first grammar that reads `text`.
pub fn match_grammar(text: &str) -> Option<&'static str> {
    match_entry(text).map(|(name, _)| name)
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]").expect("Invalid reference label regex"))
}

fn initials_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\p{Lu}\p{Ll}?\.(?:-\p{Lu}\.)?\s*)+$").expect("Invalid initials regex")
    })
}

fn surname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\p{Ll}+\s+)?\p{Lu}[\p{L}'’-]*(?:\s+\p{L}[\p{L}'’-]*){0,2}$")
            .expect("Invalid surname regex")
    })
}

fn rfc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^RFC\s*(\d+)$").expect("Invalid RFC series regex"))
}

fn series_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(BCP|STD|FYI|DOI)\s+(\S+)$").expect("Invalid series regex")
    })
}

fn draft_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:Internet-Draft\s+)?(draft-[A-Za-z0-9.-]+?)(?:\.txt)?$")
            .expect("Invalid draft series regex")
    })
}

fn revision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\d{2}$").expect("Invalid draft revision regex"))
}

/// Joins entry lines, without a space after a line ending in `-` or `/`.
pub fn join_entry(para: &Paragraph) -> String {
    let mut out = String::new();
    for line in para.lines() {
        let t = line.trimmed();
        if !out.is_empty() && !out.ends_with('-') && !out.ends_with('/') {
            out.push(' ');
        }
        out.push_str(t);
    }
    out
}

/// Reads the author position of an entry.
///
/// Accepts `Surname, I.` and `I. Surname` forms separated by commas and
/// `and`, each optionally followed by `Ed.`. Anything else is an organization.
pub fn parse_authors(text: &str) -> AuthorOrOrg {
    let normalized = text.replace(", and ", ", ").replace(" and ", ", ");
    let items: Vec<&str> = normalized
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut authors: Vec<Author> = vec![];
    let mut i = 0;
    while i < items.len() {
        let item = items[i];
        if matches!(item, "Ed." | "Ed" | "Eds." | "Editor") {
            match authors.last_mut() {
                Some(a) => a.role = Some(Role::Editor),
                None => return AuthorOrOrg::Organization(text.trim().to_string()),
            }
            i += 1;
        } else if let Some(a) = parse_author_name(item) {
            authors.push(a);
            i += 1;
        } else if surname_re().is_match(item)
            && let Some(initials) = items.get(i + 1).filter(|n| initials_re().is_match(n))
        {
            authors.push(Author::new(initials.trim(), item));
            i += 2;
        } else {
            return AuthorOrOrg::Organization(text.trim().to_string());
        }
    }
    if authors.is_empty() {
        AuthorOrOrg::Organization(text.trim().to_string())
    } else {
        AuthorOrOrg::Authors(authors)
    }
}

/// Splits a series string into series info, entities and free content.
pub fn apply_series(reference: &mut Reference, series: &str, opts: &ParserOptions) -> Vec<Entity> {
    let mut entities = vec![];
    for item in series.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(c) = rfc_re().captures(item) {
            let number = format!("{:04}", c[1].parse::<u32>().unwrap_or_default());
            reference.series_info.push(SeriesInfo::new("RFC", &c[1]));
            entities.push(Entity {
                name: format!("RFC{number}"),
                url: opts.rfc_url(&number),
            });
        } else if let Some(c) = series_re().captures(item) {
            reference.series_info.push(SeriesInfo::new(&c[1], &c[2]));
        } else if let Some(c) = draft_re().captures(item) {
            let name = c[1].to_string();
            let base = revision_re().replace(&name, "");
            let base = base.strip_prefix("draft-").unwrap_or(&base).to_string();
            reference
                .series_info
                .push(SeriesInfo::new("Internet-Draft", &name));
            reference.docname = Some(name);
            entities.push(Entity {
                name: format!("I-D.{base}"),
                url: opts.draft_url(&base),
            });
        } else if item.eq_ignore_ascii_case("work in progress") || item == "Internet-Draft" {
            continue;
        } else {
            reference.refcontent.push(item.to_string());
        }
    }
    if let Some(e) = entities.iter().find(|e| e.name == reference.anchor) {
        reference.entity = Some(e.name.clone());
    }
    entities
}

impl DraftParser<'_> {
    /// Parses a references section and its numbered subsections.
    pub(crate) fn parse_reference_group(&mut self, h: Heading) -> Result<ReferenceGroup, ParseError> {
        let title = self.read_title(&h);
        let anchor = if h.kind == HeadingKind::Named {
            self.unique_anchor(&title)
        } else {
            section_anchor(&h.number_path)
        };
        self.ctx.section_anchors.insert(anchor.clone());

        let mut references = vec![];
        loop {
            self.stream.skip_blank();
            match self.stream.peek() {
                Some(l) if l.indent() > 0 => {}
                _ => break,
            }
            if let Some(para) = self.stream.collect_paragraph() {
                references.push(self.parse_reference(&para));
            }
        }

        let mut children = vec![];
        if h.kind != HeadingKind::Named {
            while let Some(child) =
                self.next_child_heading(&h.number_path, children.len() + 1, Part::References)?
            {
                children.push(self.parse_reference_group(child)?);
            }
        }
        Ok(ReferenceGroup {
            number_path: h.number_path,
            title,
            anchor,
            references,
            children,
        })
    }

    fn parse_reference(&mut self, para: &Paragraph) -> Reference {
        let line = para.first().line_no();
        let text = join_entry(para);
        let anchor = match label_re().captures(&text) {
            Some(c) if c[1].chars().all(|ch| ch.is_ascii_digit()) => format!("ref-{}", &c[1]),
            Some(c) => c[1].to_string(),
            None => {
                self.ctx.warn(line, "reference entry has no [label]");
                self.ctx.next_unparsed_anchor()
            }
        };
        self.ctx.reference_anchors.insert(anchor.clone());
        let mut reference = Reference::new(anchor);

        let Some((grammar, c)) = match_entry(&text) else {
            self.ctx
                .warn(line, format!("unrecognised reference entry {text:?}"));
            reference.raw = Some(text);
            return reference;
        };
        debug!("line {line}: reference {} read as {grammar}", reference.anchor);

        reference.title = c.name("title").map(|m| m.as_str().trim().to_string());
        reference.target = c.name("url").map(|m| m.as_str().to_string());
        reference.author = c.name("authors").map(|m| parse_authors(m.as_str()));
        if let Some(d) = c.name("date") {
            reference.date = parse_date(d.as_str());
            if reference.date.is_none() {
                self.ctx
                    .warn(line, format!("unreadable reference date {:?}", d.as_str()));
            }
        }
        if let Some(s) = c.name("series") {
            for entity in apply_series(&mut reference, s.as_str(), self.opts) {
                self.ctx.add_entity(entity);
            }
        }
        reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(
        r#"[RFC2119]  S. Bradner, "Key words...", RFC 2119, March 1997."#,
        "authors-title-series-date"
    )]
    #[case(
        r#"[RFC2119]  Bradner, S., "Key words for use in RFCs to Indicate Requirement Levels", BCP 14, RFC 2119, DOI 10.17487/RFC2119, March 1997, <https://www.rfc-editor.org/info/rfc2119>."#,
        "authors-title-series-date-url"
    )]
    #[case(r#"[X]  Doe, J., "A Title", 2020."#, "authors-title-date")]
    #[case(r#"[IANA]  IANA, "Port Numbers", <https://www.iana.org/ports>."#, "authors-title-url")]
    #[case(r#"[W3C]  "Some Recommendation", W3C REC-foo, June 2001."#, "title-series-date")]
    #[case("[SITE]  <https://example.com/widgets>.", "angle-url")]
    #[case("[SITE]  https://example.com/widgets", "bare-url")]
    fn grammar_priority(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(match_grammar(text), Some(expected));
    }

    #[test]
    fn free_text_matches_no_grammar() {
        assert_eq!(match_grammar("[X]  Some notes without quotes."), None);
    }

    #[test]
    fn authors_in_both_orders() {
        let AuthorOrOrg::Authors(a) = parse_authors("Dierks, T. and E. Rescorla, Ed.") else {
            panic!("expected authors");
        };
        assert_eq!(a.len(), 2);
        assert_eq!((a[0].surname.as_str(), a[0].initials.as_str()), ("Dierks", "T."));
        assert_eq!(a[1].surname, "Rescorla");
        assert_eq!(a[1].role, Some(Role::Editor));
    }

    #[test]
    fn organization_author() {
        assert_eq!(
            parse_authors("Internet Assigned Numbers Authority"),
            AuthorOrOrg::Organization("Internet Assigned Numbers Authority".into())
        );
    }

    #[test]
    fn rfc_series_synthesises_entity() {
        let mut r = Reference::new("RFC2119");
        let entities = apply_series(&mut r, "BCP 14, RFC 2119", &ParserOptions::default());
        assert_eq!(
            r.series_info,
            [SeriesInfo::new("BCP", "14"), SeriesInfo::new("RFC", "2119")]
        );
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "RFC2119");
        assert!(entities[0].url.ends_with("reference.RFC.2119.xml"));
        assert_eq!(r.entity.as_deref(), Some("RFC2119"));
    }

    #[test]
    fn draft_series_sets_docname() {
        let mut r = Reference::new("I-D.ietf-tls-esni");
        let entities = apply_series(
            &mut r,
            "draft-ietf-tls-esni-07, Work in Progress",
            &ParserOptions::default(),
        );
        assert_eq!(r.docname.as_deref(), Some("draft-ietf-tls-esni-07"));
        assert_eq!(entities[0].name, "I-D.ietf-tls-esni");
        assert!(r.is_entity_backed());
        assert!(r.refcontent.is_empty());
    }

    #[test]
    fn unknown_series_is_kept_as_content() {
        let mut r = Reference::new("ref-1");
        let entities = apply_series(&mut r, "Proc. SIGCOMM, pp. 1-12", &ParserOptions::default());
        assert!(entities.is_empty());
        assert_eq!(r.refcontent, ["Proc. SIGCOMM", "pp. 1-12"]);
        assert!(!r.is_entity_backed());
    }
}
