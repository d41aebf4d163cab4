use std::collections::BTreeSet;

use serde::Serialize;

use super::reference::{Entity, ReferenceGroup};

/// Whether the source is an Internet-Draft or a published RFC.
///
/// Decided from the input file name (`rfc…` prefix means RFC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocKind {
    Draft,
    Rfc,
}

impl DocKind {
    pub fn from_name(name: &str) -> Self {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if base.to_ascii_lowercase().starts_with("rfc") {
            DocKind::Rfc
        } else {
            DocKind::Draft
        }
    }
}

/// Publication stream named on the first line of the top-left column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Stream {
    #[default]
    Ietf,
    Iab,
    Irtf,
    Independent,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Ietf => "IETF",
            Stream::Iab => "IAB",
            Stream::Irtf => "IRTF",
            Stream::Independent => "independent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Standard,
    Informational,
    Experimental,
    BestCurrentPractice,
    Historic,
}

impl Category {
    /// Maps the human label of a `Category:` / `Intended status:` line.
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim().to_ascii_lowercase();
        let l = l.trim_end_matches('.');
        match l {
            "standards track" | "proposed standard" | "draft standard" | "internet standard" => {
                Some(Category::Standard)
            }
            "informational" => Some(Category::Informational),
            "experimental" => Some(Category::Experimental),
            "best current practice" | "bcp" => Some(Category::BestCurrentPractice),
            "historic" => Some(Category::Historic),
            _ => None,
        }
    }

    /// The short form used by the `category` attribute.
    pub fn as_xml(self) -> &'static str {
        match self {
            Category::Standard => "std",
            Category::Informational => "info",
            Category::Experimental => "exp",
            Category::BestCurrentPractice => "bcp",
            Category::Historic => "historic",
        }
    }
}

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar date where only the year is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Date {
    pub year: u32,
    /// 1-based month number.
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl Date {
    pub fn month_name(&self) -> Option<&'static str> {
        self.month
            .and_then(|m| MONTHS.get(m.checked_sub(1)? as usize).copied())
    }

    /// Resolves a full or three-letter English month name.
    pub fn month_from_name(name: &str) -> Option<u32> {
        let lower = name.trim_end_matches('.').to_ascii_lowercase();
        if lower.len() < 3 {
            return None;
        }
        MONTHS
            .iter()
            .position(|m| {
                let m = m.to_ascii_lowercase();
                m == lower || (lower.len() == 3 && m.starts_with(&lower))
            })
            .map(|i| i as u32 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Editor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub postal: Vec<String>,
    pub phone: Option<String>,
    pub facsimile: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.postal.is_empty()
            && self.phone.is_none()
            && self.facsimile.is_none()
            && self.email.is_none()
            && self.uri.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub fullname: String,
    pub initials: String,
    pub surname: String,
    pub role: Option<Role>,
    pub organization: Option<String>,
    pub address: Option<Address>,
}

impl Author {
    /// An author known only by the `J. Smith` form of the front page.
    pub fn new(initials: &str, surname: &str) -> Self {
        let fullname = if initials.is_empty() {
            surname.to_string()
        } else {
            format!("{initials} {surname}")
        };
        Self {
            fullname,
            initials: initials.to_string(),
            surname: surname.to_string(),
            role: None,
            organization: None,
            address: None,
        }
    }
}

/// Everything before the first numbered section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Front {
    pub kind: DocKind,
    pub title: String,
    /// Short title taken from the running page headers.
    pub abbrev: Option<String>,
    pub docname: Option<String>,
    pub rfc_number: Option<String>,
    pub workgroup: Option<String>,
    pub stream: Stream,
    pub category: Option<Category>,
    /// `STD`/`BCP`/`FYI` memberships of the top-left column.
    pub series: Vec<(String, String)>,
    pub obsoletes: Vec<String>,
    pub updates: Vec<String>,
    pub expires: Option<String>,
    pub issn: Option<String>,
    pub authors: Vec<Author>,
    pub date: Option<Date>,
    pub abstract_section: Option<Section>,
    pub notes: Vec<Section>,
}

impl Front {
    pub fn new(kind: DocKind) -> Self {
        Self {
            kind,
            title: String::new(),
            abbrev: None,
            docname: None,
            rfc_number: None,
            workgroup: None,
            stream: Stream::default(),
            category: None,
            series: vec![],
            obsoletes: vec![],
            updates: vec![],
            expires: None,
            issn: None,
            authors: vec![],
            date: None,
            abstract_section: None,
            notes: vec![],
        }
    }
}

/// A titled section with its content blocks and nested subsections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// `["2", "1"]` for section 2.1, `["A", "3"]` for appendix A.3, empty when un-numbered.
    pub number_path: Vec<String>,
    pub title: String,
    pub anchor: String,
    pub numbered: bool,
    pub blocks: Vec<Block>,
    pub children: Vec<Section>,
}

impl Section {
    pub fn number(&self) -> String {
        self.number_path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Text(Vec<InlineNode>),
    List(ListNode),
    Table(TableNode),
    Figure(FigureNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListStyle {
    Numbers,
    Letters,
    Symbols,
    Hanging,
    Plain,
}

impl ListStyle {
    pub fn as_xml(self) -> &'static str {
        match self {
            ListStyle::Numbers => "numbers",
            ListStyle::Letters => "letters",
            ListStyle::Symbols => "symbols",
            ListStyle::Hanging => "hanging",
            ListStyle::Plain => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListNode {
    pub style: ListStyle,
    pub hang_indent: Option<usize>,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub marker: Option<String>,
    pub text: Vec<InlineNode>,
    /// Positions in `text` after which one blank line separated the source
    /// paragraphs. A position repeats once per blank line.
    pub blanks: Vec<usize>,
    pub sublist: Option<ListNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableStyle {
    Headers,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub start: usize,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableNode {
    pub style: TableStyle,
    pub columns: Vec<Column>,
    pub header_cells: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub caption: Option<String>,
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureNode {
    /// Left-aligned, whitespace-preserving artwork.
    pub raw: String,
    pub caption: Option<String>,
    pub anchor: Option<String>,
    pub is_source_code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InlineNode {
    Text(String),
    /// Internal cross-reference to a section, figure, table or reference anchor.
    XRef(String),
    /// External reference to a URL.
    ERef(String),
}

impl InlineNode {
    /// The text a reader would see, used when re-tokenizing.
    pub fn plain_text(&self) -> &str {
        match self {
            InlineNode::Text(t) | InlineNode::XRef(t) | InlineNode::ERef(t) => t,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Back {
    pub references: Vec<ReferenceGroup>,
    pub sections: Vec<Section>,
}

/// Document-wide flags computed once the tree is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentFlags {
    pub symrefs: bool,
    pub sortrefs: bool,
    pub bullets: BTreeSet<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub front: Front,
    pub middle: Vec<Section>,
    pub back: Back,
    pub entities: Vec<Entity>,
    pub flags: DocumentFlags,
}

impl Document {
    /// Visits every section of the document (front, middle and back), depth first.
    pub fn visit_sections(&self, f: &mut impl FnMut(&Section)) {
        fn walk(s: &Section, f: &mut impl FnMut(&Section)) {
            f(s);
            for c in &s.children {
                walk(c, f);
            }
        }
        let front = self.front.abstract_section.iter().chain(&self.front.notes);
        for s in front.chain(&self.middle).chain(&self.back.sections) {
            walk(s, f);
        }
    }

    /// Mutable counterpart of [`Document::visit_sections`].
    pub fn visit_sections_mut(&mut self, f: &mut impl FnMut(&mut Section)) {
        fn walk(s: &mut Section, f: &mut impl FnMut(&mut Section)) {
            f(s);
            for c in &mut s.children {
                walk(c, f);
            }
        }
        let front = self
            .front
            .abstract_section
            .iter_mut()
            .chain(self.front.notes.iter_mut());
        for s in front
            .chain(self.middle.iter_mut())
            .chain(self.back.sections.iter_mut())
        {
            walk(s, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rfc8446.txt", DocKind::Rfc)]
    #[case("RFC2119", DocKind::Rfc)]
    #[case("drafts/rfc791.txt", DocKind::Rfc)]
    #[case("draft-ietf-foo-bar-03.txt", DocKind::Draft)]
    fn doc_kind_from_file_name(#[case] name: &str, #[case] expected: DocKind) {
        assert_eq!(DocKind::from_name(name), expected);
    }

    #[rstest]
    #[case("Standards Track", Some(Category::Standard))]
    #[case("Informational", Some(Category::Informational))]
    #[case("Best Current Practice", Some(Category::BestCurrentPractice))]
    #[case("Sideways", None)]
    fn category_labels(#[case] label: &str, #[case] expected: Option<Category>) {
        assert_eq!(Category::from_label(label), expected);
    }

    #[test]
    fn month_names() {
        assert_eq!(Date::month_from_name("March"), Some(3));
        assert_eq!(Date::month_from_name("Sep"), Some(9));
        assert_eq!(Date::month_from_name("Ma"), None);
        let d = Date {
            year: 1997,
            month: Some(3),
            day: None,
        };
        assert_eq!(d.month_name(), Some("March"));
    }

    #[test]
    fn author_fullname_defaults_to_short_form() {
        let a = Author::new("S.", "Bradner");
        assert_eq!(a.fullname, "S. Bradner");
    }
}
