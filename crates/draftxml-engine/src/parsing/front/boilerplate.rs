//! # Boilerplate
//!
//! "Status of This Memo" and "Copyright Notice" carry fixed text chosen by
//! document kind, stream, category and year. The parser checks each
//! paragraph against the expected template and drops it from the tree.
//!
//! Templates collapse whitespace and use two placeholders: `%s` matches any
//! text, `%(name)s` is replaced by a known value (`year`, `rfc_number`,
//! `expires`) or, when that value is unknown, matches any text.

use std::collections::HashMap;

use log::debug;
use regex::Regex;

use crate::error::ParseError;
use crate::models::{Category, DocKind, Front, Stream};
use crate::parsing::DraftParser;
use crate::parsing::heading::Heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoilerplateSection {
    Status,
    Copyright,
}

impl BoilerplateSection {
    pub fn title(self) -> &'static str {
        match self {
            BoilerplateSection::Status => "Status of This Memo",
            BoilerplateSection::Copyright => "Copyright Notice",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        if title.eq_ignore_ascii_case("Status of This Memo") {
            Some(BoilerplateSection::Status)
        } else if title == "Copyright Notice" {
            Some(BoilerplateSection::Copyright)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoilerplateKey {
    pub section: BoilerplateSection,
    pub kind: DocKind,
    pub category: Option<Category>,
    pub stream: Stream,
    pub year: Option<u32>,
}

impl BoilerplateKey {
    pub fn for_front(section: BoilerplateSection, front: &Front) -> Self {
        Self {
            section,
            kind: front.kind,
            category: front.category,
            stream: front.stream,
            year: front.date.as_ref().map(|d| d.year),
        }
    }
}

/// Source of the expected boilerplate paragraphs.
///
/// Returning `None` means the text for `key` is not known; the section is
/// then skipped unchecked.
pub trait BoilerplateCatalog {
    fn paragraphs(&self, key: &BoilerplateKey) -> Option<&[&'static str]>;
}

const DRAFT_STATUS: &[&str] = &[
    "This Internet-Draft is submitted in full conformance with the provisions of BCP 78 and BCP 79.",
    "Internet-Drafts are working documents of the Internet Engineering Task Force (IETF). Note that other groups may also distribute working documents as Internet-Drafts. The list of current Internet-Drafts is at %s.",
    "Internet-Drafts are draft documents valid for a maximum of six months and may be updated, replaced, or obsoleted by other documents at any time. It is inappropriate to use Internet-Drafts as reference material or to cite them other than as \"work in progress.\"",
    "This Internet-Draft will expire on %(expires)s.",
];

const RFC_INFO: &str = "Information about the current status of this document, any errata, and how to provide feedback on it may be obtained at %s.";

const IETF_STANDARD: &[&str] = &[
    "This is an Internet Standards Track document.",
    "This document is a product of the Internet Engineering Task Force (IETF). It represents the consensus of the IETF community. It has received public review and has been approved for publication by the Internet Engineering Steering Group (IESG). Further information on Internet Standards is available in Section 2 of RFC %s.",
    RFC_INFO,
];

const IETF_BCP: &[&str] = &[
    "This memo documents an Internet Best Current Practice.",
    "This document is a product of the Internet Engineering Task Force (IETF). It represents the consensus of the IETF community. It has received public review and has been approved for publication by the Internet Engineering Steering Group (IESG). Further information on BCPs is available in Section 2 of RFC %s.",
    RFC_INFO,
];

const NOT_STANDARDS_TRACK_INFO: &str = "This document is not an Internet Standards Track specification; it is published for informational purposes.";

const IETF_INFORMATIONAL: &[&str] = &[
    NOT_STANDARDS_TRACK_INFO,
    "This document is a product of the Internet Engineering Task Force (IETF). It represents the consensus of the IETF community. It has received public review and has been approved for publication by the Internet Engineering Steering Group (IESG). Not all documents approved by the IESG are candidates for any level of Internet Standard; see Section 2 of RFC %s.",
    RFC_INFO,
];

const IETF_EXPERIMENTAL: &[&str] = &[
    "This document is not an Internet Standards Track specification; it is published for examination, experimental implementation, and evaluation.",
    "This document defines an Experimental Protocol for the Internet community. This document is a product of the Internet Engineering Task Force (IETF). It represents the consensus of the IETF community. It has received public review and has been approved for publication by the Internet Engineering Steering Group (IESG). Not all documents approved by the IESG are candidates for any level of Internet Standard; see Section 2 of RFC %s.",
    RFC_INFO,
];

const IAB_INFORMATIONAL: &[&str] = &[
    NOT_STANDARDS_TRACK_INFO,
    "This document is a product of the Internet Architecture Board (IAB) and represents information that the IAB has deemed valuable to provide for permanent record. %s Documents approved for publication by the IAB are not candidates for any level of Internet Standard; see Section 2 of RFC %s.",
    RFC_INFO,
];

const IRTF_INFORMATIONAL: &[&str] = &[
    NOT_STANDARDS_TRACK_INFO,
    "This document is a product of the Internet Research Task Force (IRTF). The IRTF publishes the results of Internet-related research and development activities. These results might not be suitable for deployment. %s Documents approved for publication by the IRSG are not candidates for any level of Internet Standard; see Section 2 of RFC %s.",
    RFC_INFO,
];

const INDEPENDENT_INFORMATIONAL: &[&str] = &[
    NOT_STANDARDS_TRACK_INFO,
    "This is a contribution to the RFC Series, independently of any other RFC stream. The RFC Editor has chosen to publish this document at its discretion and makes no statement about its value for implementation or deployment. Documents approved for publication by the RFC Editor are not candidates for any level of Internet Standard; see Section 2 of RFC %s.",
    RFC_INFO,
];

const IETF_COPYRIGHT: &[&str] = &[
    "Copyright (c) %(year)s IETF Trust and the persons identified as the document authors. All rights reserved.",
    "This document is subject to BCP 78 and the IETF Trust's Legal Provisions Relating to IETF Documents (%s) in effect on the date of publication of this document. Please review these documents carefully, as they describe your rights and restrictions with respect to this document. Code Components extracted from this document must include %s License text as described in Section 4.e of the Trust Legal Provisions and are provided without warranty as described in the %s License.",
];

const STREAM_COPYRIGHT: &[&str] = &[
    "Copyright (c) %(year)s IETF Trust and the persons identified as the document authors. All rights reserved.",
    "This document is subject to BCP 78 and the IETF Trust's Legal Provisions Relating to IETF Documents (%s) in effect on the date of publication of this document. Please review these documents carefully, as they describe your rights and restrictions with respect to this document.",
];

/// The texts in use since the 2010 revision of the IETF Trust provisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCatalog;

impl BoilerplateCatalog for StandardCatalog {
    fn paragraphs(&self, key: &BoilerplateKey) -> Option<&[&'static str]> {
        if key.year.is_none_or(|y| y < 2010) {
            return None;
        }
        match key.section {
            BoilerplateSection::Copyright => match (key.kind, key.stream) {
                (DocKind::Draft, _) | (_, Stream::Ietf) => Some(IETF_COPYRIGHT),
                _ => Some(STREAM_COPYRIGHT),
            },
            BoilerplateSection::Status => match (key.kind, key.stream, key.category) {
                (DocKind::Draft, _, _) => Some(DRAFT_STATUS),
                (_, Stream::Ietf, Some(Category::Standard)) => Some(IETF_STANDARD),
                (_, Stream::Ietf, Some(Category::BestCurrentPractice)) => Some(IETF_BCP),
                (_, Stream::Ietf, Some(Category::Informational)) => Some(IETF_INFORMATIONAL),
                (_, Stream::Ietf, Some(Category::Experimental)) => Some(IETF_EXPERIMENTAL),
                (_, Stream::Iab, Some(Category::Informational)) => Some(IAB_INFORMATIONAL),
                (_, Stream::Irtf, Some(Category::Informational)) => Some(IRTF_INFORMATIONAL),
                (_, Stream::Independent, Some(Category::Informational)) => {
                    Some(INDEPENDENT_INFORMATIONAL)
                }
                _ => None,
            },
        }
    }
}

/// Collapses runs of whitespace to single spaces.
///
/// A word ending in `-` is joined to the next one, undoing line-end breaks
/// such as `Internet-` / `Drafts`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_len = 0;
    for word in text.split_whitespace() {
        if !out.is_empty() && !(last_len > 1 && out.ends_with('-')) {
            out.push(' ');
        }
        out.push_str(word);
        last_len = word.len();
    }
    out
}

/// Compiles a template into an anchored regex.
pub fn template_regex(template: &str, params: &HashMap<&str, String>) -> Result<Regex, regex::Error> {
    let template = normalize(template);
    let mut pattern = String::from("^");
    let mut rest = template.as_str();
    while let Some(at) = rest.find('%') {
        pattern.push_str(&regex::escape(&rest[..at]));
        let tail = &rest[at..];
        if let Some(after) = tail.strip_prefix("%s") {
            pattern.push_str("(.+?)");
            rest = after;
        } else if let Some(close) = tail.strip_prefix("%(").and_then(|t| t.find(")s")) {
            let name = &tail[2..2 + close];
            match params.get(name) {
                Some(value) => pattern.push_str(&regex::escape(&normalize(value))),
                None => pattern.push_str("(.+?)"),
            }
            rest = &tail[2 + close + 2..];
        } else {
            pattern.push('%');
            rest = &tail[1..];
        }
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    Regex::new(&pattern)
}

fn template_params(front: &Front) -> HashMap<&'static str, String> {
    let mut params = HashMap::new();
    if let Some(date) = &front.date {
        params.insert("year", date.year.to_string());
    }
    if let Some(n) = &front.rfc_number {
        params.insert("rfc_number", n.clone());
    }
    if let Some(e) = &front.expires {
        params.insert("expires", e.clone());
    }
    params
}

impl DraftParser<'_> {
    /// Consumes a boilerplate section, checking it against the catalog.
    pub(crate) fn skip_boilerplate(
        &mut self,
        h: &Heading,
        section: BoilerplateSection,
        front: &Front,
    ) -> Result<(), ParseError> {
        let start = self.stream.line_no();
        let key = BoilerplateKey::for_front(section, front);
        let Some(expected) = self.catalog.paragraphs(&key) else {
            self.ctx.warn(
                start,
                format!("no known {} text for this document, skipped unchecked", section.title()),
            );
            self.skip_section();
            return Ok(());
        };
        self.read_title(h);

        let params = template_params(front);
        for template in expected {
            self.stream.skip_blank();
            let line = self.stream.line_no();
            let para = match self.stream.peek_paragraph() {
                Some(p) if p.first().indent() > 0 => p,
                _ => {
                    return Err(ParseError::BoilerplateMismatch {
                        line,
                        section: section.title().to_string(),
                        expected: normalize(template),
                        found: String::new(),
                    });
                }
            };
            let found = normalize(&para.joined());
            let matched = template_regex(template, &params).is_ok_and(|re| re.is_match(&found));
            if !matched {
                return Err(ParseError::BoilerplateMismatch {
                    line,
                    section: section.title().to_string(),
                    expected: normalize(template),
                    found,
                });
            }
            self.stream.collect_paragraph();
        }

        loop {
            self.stream.skip_blank();
            match self.stream.peek() {
                Some(l) if l.indent() > 0 => {
                    self.ctx.warn(
                        l.line_no(),
                        format!("extra text in {} skipped", section.title()),
                    );
                    self.stream.collect_paragraph();
                }
                _ => break,
            }
        }
        debug!("line {start}: {} matched", section.title());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(section: BoilerplateSection, kind: DocKind, category: Option<Category>) -> BoilerplateKey {
        BoilerplateKey {
            section,
            kind,
            category,
            stream: Stream::Ietf,
            year: Some(2020),
        }
    }

    #[test]
    fn template_with_named_parameter() {
        let params = HashMap::from([("expires", "April 4, 2021".to_string())]);
        let re = template_regex(DRAFT_STATUS[3], &params).unwrap();
        assert!(re.is_match("This Internet-Draft will expire on April 4, 2021."));
        assert!(!re.is_match("This Internet-Draft will expire on May 4, 2021."));
    }

    #[test]
    fn normalize_joins_broken_hyphenation() {
        assert_eq!(normalize("current Internet-\n   Drafts  is"), "current Internet-Drafts is");
        assert_eq!(normalize("a - b"), "a - b");
    }

    #[test]
    fn keys_differ_by_document_kind() {
        let draft = key(BoilerplateSection::Status, DocKind::Draft, None);
        let rfc = key(BoilerplateSection::Status, DocKind::Rfc, None);
        let seen: std::collections::HashSet<BoilerplateKey> = [draft, rfc, draft].into();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn unknown_parameter_is_a_wildcard() {
        let re = template_regex(DRAFT_STATUS[3], &HashMap::new()).unwrap();
        assert!(re.is_match("This Internet-Draft will expire on May 4, 2021."));
    }

    #[test]
    fn wildcards_and_escaping() {
        let re = template_regex(IETF_COPYRIGHT[1], &HashMap::new()).unwrap();
        let text = normalize(
            "This document is subject to BCP 78 and the IETF Trust's Legal
             Provisions Relating to IETF Documents
             (https://trustee.ietf.org/license-info) in effect on the date of
             publication of this document.  Please review these documents
             carefully, as they describe your rights and restrictions with respect
             to this document.  Code Components extracted from this document must
             include Simplified BSD License text as described in Section 4.e of
             the Trust Legal Provisions and are provided without warranty as
             described in the Simplified BSD License.",
        );
        assert!(re.is_match(&text));
    }

    #[test]
    fn catalog_lookup() {
        let c = StandardCatalog;
        let draft = key(BoilerplateSection::Status, DocKind::Draft, None);
        assert_eq!(c.paragraphs(&draft).map(<[_]>::len), Some(4));
        let std = key(BoilerplateSection::Status, DocKind::Rfc, Some(Category::Standard));
        assert_eq!(c.paragraphs(&std).map(<[_]>::len), Some(3));
        let historic = key(BoilerplateSection::Status, DocKind::Rfc, Some(Category::Historic));
        assert!(c.paragraphs(&historic).is_none());
    }

    #[test]
    fn old_documents_are_not_checked() {
        let mut k = key(BoilerplateSection::Copyright, DocKind::Draft, None);
        k.year = Some(2005);
        assert!(StandardCatalog.paragraphs(&k).is_none());
    }
}
