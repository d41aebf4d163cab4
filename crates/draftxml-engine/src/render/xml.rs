//! xml2rfc (version 2 vocabulary) serializer.
//!
//! Fields are offered to [`XmlWriter`] as `(name, value)` pairs. Whether a
//! field becomes an attribute is decided by [`OUTPUT_SCHEMA`]; any field the
//! schema does not allow on that element is written as a child element.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

use crate::models::{
    Author, AuthorOrOrg, Block, Date, DocKind, Document, FigureNode, InlineNode, ListNode,
    ListStyle, Reference, ReferenceGroup, Role, Section, TableNode, TableStyle,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Write entity-backed references as `&NAME;` instead of inline.
    pub emit_entities: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            emit_entities: true,
        }
    }
}

/// Attributes each element may carry.
pub const OUTPUT_SCHEMA: &[(&str, &[&str])] = &[
    (
        "rfc",
        &["docName", "number", "category", "obsoletes", "updates", "seriesNo", "submissionType"],
    ),
    ("title", &["abbrev"]),
    ("author", &["initials", "surname", "fullname", "role"]),
    ("date", &["day", "month", "year"]),
    ("section", &["anchor", "title"]),
    ("note", &["title"]),
    ("references", &["title"]),
    ("reference", &["anchor", "target"]),
    ("seriesInfo", &["name", "value"]),
    ("t", &["hangText"]),
    ("list", &["style", "hangIndent"]),
    ("vspace", &["blankLines"]),
    ("texttable", &["anchor", "title", "style"]),
    ("figure", &["anchor", "title"]),
    ("artwork", &["type"]),
    ("xref", &["target"]),
    ("eref", &["target"]),
];

pub fn is_attribute(element: &str, field: &str) -> bool {
    OUTPUT_SCHEMA
        .iter()
        .find(|(e, _)| *e == element)
        .is_some_and(|(_, attrs)| attrs.contains(&field))
}

type Fields = Vec<(&'static str, String)>;

struct XmlWriter<'o> {
    out: String,
    depth: usize,
    opts: &'o RenderOptions,
}

impl<'o> XmlWriter<'o> {
    fn new(opts: &'o RenderOptions) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            opts,
        }
    }

    fn line(&mut self, s: &str) {
        self.out
            .extend(std::iter::repeat_n(' ', self.depth * self.opts.indent));
        self.out.push_str(s);
        self.out.push('\n');
    }

    /// Attribute text for `element` plus the fields that must become children.
    fn split_fields(element: &str, fields: Fields) -> (String, Fields) {
        let mut attrs = String::new();
        let mut children = vec![];
        for (name, value) in fields {
            if is_attribute(element, name) {
                attrs.push_str(&format!(
                    " {name}=\"{}\"",
                    encode_double_quoted_attribute(&value)
                ));
            } else {
                children.push((name, value));
            }
        }
        (attrs, children)
    }

    fn child_fields(&mut self, children: Fields) {
        for (name, value) in children {
            self.line(&format!("<{name}>{}</{name}>", encode_text(&value)));
        }
    }

    fn open(&mut self, element: &str, fields: Fields) {
        let (attrs, children) = Self::split_fields(element, fields);
        self.line(&format!("<{element}{attrs}>"));
        self.depth += 1;
        self.child_fields(children);
    }

    fn close(&mut self, element: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{element}>"));
    }

    fn empty(&mut self, element: &str, fields: Fields) {
        let (attrs, children) = Self::split_fields(element, fields);
        if children.is_empty() {
            self.line(&format!("<{element}{attrs}/>"));
        } else {
            self.line(&format!("<{element}{attrs}>"));
            self.depth += 1;
            self.child_fields(children);
            self.close(element);
        }
    }

    /// An element whose content is already-escaped markup on one line.
    fn leaf(&mut self, element: &str, fields: Fields, content: &str) {
        let (attrs, children) = Self::split_fields(element, fields);
        if children.is_empty() {
            self.line(&format!("<{element}{attrs}>{content}</{element}>"));
        } else {
            self.line(&format!("<{element}{attrs}>"));
            self.depth += 1;
            self.child_fields(children);
            self.line(content);
            self.close(element);
        }
    }
}

fn inline_markup(nodes: &[InlineNode]) -> String {
    let mut s = String::new();
    for n in nodes {
        match n {
            InlineNode::Text(t) => s.push_str(&encode_text(t)),
            InlineNode::XRef(target) => s.push_str(&format!(
                "<xref target=\"{}\"/>",
                encode_double_quoted_attribute(target)
            )),
            InlineNode::ERef(target) => s.push_str(&format!(
                "<eref target=\"{}\"/>",
                encode_double_quoted_attribute(target)
            )),
        }
    }
    s
}

fn cdata(raw: &str) -> String {
    format!("<![CDATA[{}]]>", raw.replace("]]>", "]]]]><![CDATA[>"))
}

fn date_fields(date: &Date) -> Fields {
    let mut f = vec![];
    if let Some(day) = date.day {
        f.push(("day", day.to_string()));
    }
    if let Some(month) = date.month_name() {
        f.push(("month", month.to_string()));
    }
    f.push(("year", date.year.to_string()));
    f
}

fn author_fields(a: &Author) -> Fields {
    let mut f = vec![
        ("initials", a.initials.clone()),
        ("surname", a.surname.clone()),
        ("fullname", a.fullname.clone()),
    ];
    if a.role == Some(Role::Editor) {
        f.push(("role", "editor".to_string()));
    }
    f
}

impl XmlWriter<'_> {
    fn author(&mut self, a: &Author) {
        self.open("author", author_fields(a));
        if let Some(org) = &a.organization {
            self.line(&format!("<organization>{}</organization>", encode_text(org)));
        }
        if let Some(addr) = a.address.as_ref().filter(|addr| !addr.is_empty()) {
            self.open("address", vec![]);
            if !addr.postal.is_empty() {
                self.open("postal", vec![]);
                for street in &addr.postal {
                    self.line(&format!("<street>{}</street>", encode_text(street)));
                }
                self.close("postal");
            }
            let contact = [
                ("phone", &addr.phone),
                ("facsimile", &addr.facsimile),
                ("email", &addr.email),
                ("uri", &addr.uri),
            ];
            for (name, value) in contact {
                if let Some(v) = value {
                    self.line(&format!("<{name}>{}</{name}>", encode_text(v)));
                }
            }
            self.close("address");
        }
        self.close("author");
    }

    fn blocks(&mut self, blocks: &[Block]) {
        for b in blocks {
            match b {
                Block::Text(nodes) => self.leaf("t", vec![], &inline_markup(nodes)),
                Block::List(list) => {
                    self.open("t", vec![]);
                    self.list(list);
                    self.close("t");
                }
                Block::Table(table) => self.table(table),
                Block::Figure(fig) => self.figure(fig),
            }
        }
    }

    fn list(&mut self, list: &ListNode) {
        let mut fields = vec![("style", list.style.as_xml().to_string())];
        if list.style == ListStyle::Hanging
            && let Some(h) = list.hang_indent
        {
            fields.push(("hangIndent", h.to_string()));
        }
        self.open("list", fields);
        for item in &list.items {
            let mut fields = vec![];
            if list.style == ListStyle::Hanging
                && let Some(m) = &item.marker
            {
                fields.push(("hangText", m.clone()));
            }
            let mut content = String::new();
            for (i, node) in item.text.iter().enumerate() {
                content.push_str(&inline_markup(std::slice::from_ref(node)));
                let blanks = item.blanks.iter().filter(|b| **b == i).count();
                if blanks > 0 {
                    content.push_str(&format!("<vspace blankLines=\"{blanks}\"/>"));
                }
            }
            match &item.sublist {
                None => self.leaf("t", fields, &content),
                Some(sub) => {
                    self.open("t", fields);
                    if !content.is_empty() {
                        self.line(&content);
                    }
                    self.list(sub);
                    self.close("t");
                }
            }
        }
        self.close("list");
    }

    fn table(&mut self, table: &TableNode) {
        let mut fields = vec![];
        if let Some(a) = &table.anchor {
            fields.push(("anchor", a.clone()));
        }
        if let Some(c) = &table.caption {
            fields.push(("title", c.clone()));
        }
        let style = match table.style {
            TableStyle::Headers => "headers",
            TableStyle::Full => "full",
        };
        fields.push(("style", style.to_string()));
        self.open("texttable", fields);
        for i in 0..table.columns.len() {
            let header = table.header_cells.get(i).map_or("", String::as_str);
            self.line(&format!("<ttcol>{}</ttcol>", encode_text(header)));
        }
        for row in &table.rows {
            for cell in row {
                self.line(&format!("<c>{}</c>", encode_text(cell)));
            }
        }
        self.close("texttable");
    }

    fn figure(&mut self, fig: &FigureNode) {
        let mut fields = vec![];
        if let Some(a) = &fig.anchor {
            fields.push(("anchor", a.clone()));
        }
        if let Some(c) = &fig.caption {
            fields.push(("title", c.clone()));
        }
        self.open("figure", fields);
        let art_fields = if fig.is_source_code {
            vec![("type", "code".to_string())]
        } else {
            vec![]
        };
        let (attrs, _) = Self::split_fields("artwork", art_fields);
        // artwork content is written flush left; indentation would change it
        self.out
            .push_str(&format!("<artwork{attrs}>{}</artwork>\n", cdata(&fig.raw)));
        self.close("figure");
    }

    fn section(&mut self, s: &Section) {
        self.open(
            "section",
            vec![("anchor", s.anchor.clone()), ("title", s.title.clone())],
        );
        self.blocks(&s.blocks);
        for c in &s.children {
            self.section(c);
        }
        self.close("section");
    }

    fn reference(&mut self, r: &Reference) {
        if self.opts.emit_entities
            && let Some(name) = &r.entity
        {
            self.line(&format!("&{name};"));
            return;
        }
        let mut fields = vec![("anchor", r.anchor.clone())];
        if let Some(t) = &r.target {
            fields.push(("target", t.clone()));
        }
        self.open("reference", fields);
        self.open("front", vec![]);
        let title = r.title.as_deref().unwrap_or_default();
        self.line(&format!("<title>{}</title>", encode_text(title)));
        match &r.author {
            Some(AuthorOrOrg::Authors(authors)) => {
                for a in authors {
                    self.empty("author", author_fields(a));
                }
            }
            Some(AuthorOrOrg::Organization(org)) => {
                self.open("author", vec![]);
                self.line(&format!("<organization>{}</organization>", encode_text(org)));
                self.close("author");
            }
            None => self.empty("author", vec![]),
        }
        match &r.date {
            Some(d) => self.empty("date", date_fields(d)),
            None => self.empty("date", vec![]),
        }
        self.close("front");
        for s in &r.series_info {
            self.empty(
                "seriesInfo",
                vec![("name", s.name.clone()), ("value", s.value.clone())],
            );
        }
        for content in r.refcontent.iter().chain(&r.raw) {
            self.line(&format!("<annotation>{}</annotation>", encode_text(content)));
        }
        self.close("reference");
    }

    fn references(&mut self, group: &ReferenceGroup) {
        group.visit(&mut |g| {
            if g.references.is_empty() {
                return;
            }
            self.open("references", vec![("title", g.title.clone())]);
            for r in &g.references {
                self.reference(r);
            }
            self.close("references");
        });
    }
}

fn prolog(doc: &Document, w: &mut XmlWriter<'_>) {
    w.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    if doc.entities.is_empty() {
        w.line(r#"<!DOCTYPE rfc SYSTEM "rfc2629.dtd">"#);
    } else {
        w.line(r#"<!DOCTYPE rfc SYSTEM "rfc2629.dtd" ["#);
        for e in &doc.entities {
            w.line(&format!(
                "<!ENTITY {} SYSTEM \"{}\">",
                e.name,
                encode_double_quoted_attribute(&e.url)
            ));
        }
        w.line("]>");
    }
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    w.line(&format!("<?rfc symrefs=\"{}\"?>", yes_no(doc.flags.symrefs)));
    w.line(&format!("<?rfc sortrefs=\"{}\"?>", yes_no(doc.flags.sortrefs)));
    if !doc.flags.bullets.is_empty() {
        let bullets: String = doc.flags.bullets.iter().collect();
        w.line(&format!(
            "<?rfc bullets=\"{}\"?>",
            encode_double_quoted_attribute(&bullets)
        ));
    }
}

fn rfc_fields(doc: &Document) -> Fields {
    let front = &doc.front;
    let mut f = vec![];
    match front.kind {
        DocKind::Draft => {
            if let Some(name) = &front.docname {
                f.push(("docName", name.clone()));
            }
        }
        DocKind::Rfc => {
            if let Some(n) = &front.rfc_number {
                f.push(("number", n.clone()));
            }
        }
    }
    if let Some(c) = front.category {
        f.push(("category", c.as_xml().to_string()));
    }
    if !front.obsoletes.is_empty() {
        f.push(("obsoletes", front.obsoletes.join(", ")));
    }
    if !front.updates.is_empty() {
        f.push(("updates", front.updates.join(", ")));
    }
    if let Some((_, n)) = front.series.first() {
        f.push(("seriesNo", n.clone()));
    }
    f.push(("submissionType", front.stream.as_str().to_string()));
    f
}

/// Serializes `doc` as an xml2rfc document.
pub fn render_xml(doc: &Document, opts: &RenderOptions) -> String {
    let mut w = XmlWriter::new(opts);
    prolog(doc, &mut w);
    w.open("rfc", rfc_fields(doc));

    let front = &doc.front;
    w.open("front", vec![]);
    let mut title_fields = vec![];
    if let Some(a) = &front.abbrev {
        title_fields.push(("abbrev", a.clone()));
    }
    w.leaf("title", title_fields, &encode_text(&front.title));
    for a in &front.authors {
        w.author(a);
    }
    if let Some(d) = &front.date {
        w.empty("date", date_fields(d));
    }
    if let Some(wg) = &front.workgroup {
        w.line(&format!("<workgroup>{}</workgroup>", encode_text(wg)));
    }
    if let Some(abs) = &front.abstract_section {
        w.open("abstract", vec![]);
        w.blocks(&abs.blocks);
        w.close("abstract");
    }
    for note in &front.notes {
        w.open("note", vec![("title", note.title.clone())]);
        w.blocks(&note.blocks);
        w.close("note");
    }
    w.close("front");

    w.open("middle", vec![]);
    for s in &doc.middle {
        w.section(s);
    }
    w.close("middle");

    if !doc.back.references.is_empty() || !doc.back.sections.is_empty() {
        w.open("back", vec![]);
        for g in &doc.back.references {
            w.references(g);
        }
        for s in &doc.back.sections {
            w.section(s);
        }
        w.close("back");
    }
    w.close("rfc");
    w.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Front;

    fn doc() -> Document {
        let mut front = Front::new(DocKind::Draft);
        front.title = "A & B".into();
        Document {
            front,
            middle: vec![Section {
                number_path: vec!["1".into()],
                title: "Intro".into(),
                anchor: "section-1".into(),
                numbered: true,
                blocks: vec![Block::Text(vec![
                    InlineNode::Text("see ".into()),
                    InlineNode::XRef("RFC2119".into()),
                ])],
                children: vec![],
            }],
            back: Default::default(),
            entities: vec![],
            flags: Default::default(),
        }
    }

    #[test]
    fn schema_decides_attributes() {
        assert!(is_attribute("author", "surname"));
        assert!(!is_attribute("author", "organization"));
        assert!(!is_attribute("unknown", "anchor"));
    }

    #[test]
    fn disallowed_fields_become_children() {
        let opts = RenderOptions::default();
        let mut w = XmlWriter::new(&opts);
        w.empty("reference", vec![("anchor", "X".into()), ("docname", "draft-x".into())]);
        assert_eq!(
            w.out,
            "<reference anchor=\"X\">\n  <docname>draft-x</docname>\n</reference>\n"
        );
    }

    #[test]
    fn cdata_is_split_around_terminator() {
        assert_eq!(cdata("a]]>b"), "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn text_is_escaped_and_xrefs_written() {
        let xml = render_xml(&doc(), &RenderOptions::default());
        assert!(xml.contains("<title>A &amp; B</title>"));
        assert!(xml.contains("<t>see <xref target=\"RFC2119\"/></t>"));
        assert!(xml.contains("<?rfc symrefs=\"no\"?>"));
    }

    #[test]
    fn rendering_snapshot() {
        insta::assert_snapshot!(render_xml(&doc(), &RenderOptions::default()), @r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <!DOCTYPE rfc SYSTEM "rfc2629.dtd">
        <?rfc symrefs="no"?>
        <?rfc sortrefs="no"?>
        <rfc submissionType="IETF">
          <front>
            <title>A &amp; B</title>
          </front>
          <middle>
            <section anchor="section-1" title="Intro">
              <t>see <xref target="RFC2119"/></t>
            </section>
          </middle>
        </rfc>
        "#);
    }
}
