use serde::Serialize;

use super::document::{Author, Date};

/// Who wrote a referenced document: a list of people or a single organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AuthorOrOrg {
    Authors(Vec<Author>),
    Organization(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesInfo {
    pub name: String,
    pub value: String,
}

impl SeriesInfo {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A synthesized pointer to an external bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    pub url: String,
}

/// One bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub anchor: String,
    pub target: Option<String>,
    pub title: Option<String>,
    pub author: Option<AuthorOrOrg>,
    pub date: Option<Date>,
    pub series_info: Vec<SeriesInfo>,
    pub docname: Option<String>,
    /// Series fragments that are neither a known label nor an identifier.
    pub refcontent: Vec<String>,
    /// Name of the entity this reference is replaced by, when its anchor equals it.
    pub entity: Option<String>,
    /// Source text of an entry no grammar could read.
    pub raw: Option<String>,
}

impl Reference {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            target: None,
            title: None,
            author: None,
            date: None,
            series_info: vec![],
            docname: None,
            refcontent: vec![],
            entity: None,
            raw: None,
        }
    }

    pub fn is_entity_backed(&self) -> bool {
        self.entity.is_some()
    }
}

/// A references section (e.g. "Normative References") and its subsections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceGroup {
    pub number_path: Vec<String>,
    pub title: String,
    pub anchor: String,
    pub references: Vec<Reference>,
    pub children: Vec<ReferenceGroup>,
}

impl ReferenceGroup {
    /// Visits this group and all nested groups, depth first.
    pub fn visit(&self, f: &mut impl FnMut(&ReferenceGroup)) {
        f(self);
        for c in &self.children {
            c.visit(f);
        }
    }
}
