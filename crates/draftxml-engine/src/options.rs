use serde::{Deserialize, Serialize};

/// Layout heuristics and URL templates used by the parser.
///
/// The thresholds are empirical. They are kept as named, overridable values
/// and should only be changed against a corpus of real drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Lines are padded to this width before looking for the column gap.
    pub min_line_width: usize,
    /// Indentation of body text; anything shallower is a heading or artwork.
    pub body_indent: usize,
    /// Running page headers are only recognised after this many lines.
    pub header_min_line: usize,
    /// Below this symbol-to-alphanumeric ratio a paragraph reads as prose.
    pub low_symbol_ratio: f64,
    /// Up to this ratio a single or filled paragraph still reads as prose.
    pub moderate_symbol_ratio: f64,
    /// Slack (in columns) at a line end that marks the line as not filled.
    pub fill_change: usize,
    /// Border rows required before a paragraph is read as a table.
    pub table_min_border_rows: usize,
    /// Distinct border shapes a table may use.
    pub table_max_border_styles: usize,
    /// Hang indent written instead of a computed 0.
    pub zero_hang_indent: usize,
    /// `{number}` is replaced by the RFC number.
    pub rfc_entity_url: String,
    /// `{name}` is replaced by the draft name without `draft-` and revision.
    pub draft_entity_url: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            min_line_width: 72,
            body_indent: 3,
            header_min_line: 25,
            low_symbol_ratio: 0.3,
            moderate_symbol_ratio: 0.6,
            fill_change: 15,
            table_min_border_rows: 2,
            table_max_border_styles: 2,
            zero_hang_indent: 1,
            rfc_entity_url: "https://bib.ietf.org/public/rfc/bibxml/reference.RFC.{number}.xml"
                .to_string(),
            draft_entity_url:
                "https://bib.ietf.org/public/rfc/bibxml3/reference.I-D.{name}.xml".to_string(),
        }
    }
}

impl ParserOptions {
    pub fn rfc_url(&self, number: &str) -> String {
        self.rfc_entity_url.replace("{number}", number)
    }

    pub fn draft_url(&self, name: &str) -> String {
        self.draft_entity_url.replace("{name}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let o = ParserOptions::default();
        assert_eq!(o.fill_change, 15);
        assert_eq!(o.table_min_border_rows, 2);
        assert_eq!(o.body_indent, 3);
    }

    #[test]
    fn entity_urls_are_templated() {
        let o = ParserOptions::default();
        assert_eq!(
            o.rfc_url("2119"),
            "https://bib.ietf.org/public/rfc/bibxml/reference.RFC.2119.xml"
        );
        assert!(o.draft_url("ietf-foo-bar").ends_with("reference.I-D.ietf-foo-bar.xml"));
    }
}
