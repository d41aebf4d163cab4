use std::collections::{HashMap, HashSet};

use log::warn;

use crate::error::Diagnostic;
use crate::models::Entity;

use super::blocks::Classification;

/// Document-scoped state filled left to right during the parse and read by
/// the inline and postprocessing passes.
#[derive(Debug, Default)]
pub struct DocContext {
    pub section_anchors: HashSet<String>,
    pub reference_anchors: HashSet<String>,
    pub figure_table_anchors: HashSet<String>,
    entities: Vec<Entity>,
    classifications: HashMap<u64, Classification>,
    diagnostics: Vec<Diagnostic>,
    unparsed_references: usize,
}

impl DocContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a recoverable problem at 1-based `line` and logs it.
    pub fn warn(&mut self, line: usize, message: impl Into<String>) {
        let d = Diagnostic::new(line, message);
        warn!("{d}");
        self.diagnostics.push(d);
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Adds `entity` unless one with the same name exists.
    pub fn add_entity(&mut self, entity: Entity) {
        if !self.entities.iter().any(|e| e.name == entity.name) {
            self.entities.push(entity);
        }
    }

    pub fn take_entities(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }

    pub fn cached_classification(&self, key: u64) -> Option<Classification> {
        self.classifications.get(&key).copied()
    }

    pub fn cache_classification(&mut self, key: u64, class: Classification) {
        self.classifications.insert(key, class);
    }

    /// Anchor for a reference entry that had no usable label.
    pub fn next_unparsed_anchor(&mut self) -> String {
        self.unparsed_references += 1;
        format!("unparsed-{}", self.unparsed_references)
    }
}
