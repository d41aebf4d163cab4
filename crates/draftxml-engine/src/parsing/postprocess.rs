//! Whole-document flags computed once the tree is complete.

use std::collections::BTreeSet;

use crate::models::{Block, Document, DocumentFlags, ListNode, ListStyle, ReferenceGroup};

fn is_numeric_anchor(anchor: &str) -> bool {
    anchor
        .strip_prefix("ref-")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// True when any reference uses a symbolic (non-numeric) anchor.
pub fn uses_symbolic_refs(groups: &[ReferenceGroup]) -> bool {
    let mut symbolic = false;
    for g in groups {
        g.visit(&mut |g| {
            symbolic |= g.references.iter().any(|r| !is_numeric_anchor(&r.anchor));
        });
    }
    symbolic
}

/// False when `RFC`-prefixed anchors appear out of lexical order in a group.
pub fn refs_are_sorted(groups: &[ReferenceGroup]) -> bool {
    let mut sorted = true;
    for g in groups {
        g.visit(&mut |g| {
            let rfcs: Vec<&str> = g
                .references
                .iter()
                .map(|r| r.anchor.as_str())
                .filter(|a| a.starts_with("RFC"))
                .collect();
            sorted &= rfcs.windows(2).all(|w| w[0] <= w[1]);
        });
    }
    sorted
}

fn collect_bullets(list: &ListNode, out: &mut BTreeSet<char>) {
    for item in &list.items {
        if list.style == ListStyle::Symbols
            && let Some(c) = item.marker.as_deref().and_then(|m| m.chars().next())
        {
            out.insert(c);
        }
        if let Some(sub) = &item.sublist {
            collect_bullets(sub, out);
        }
    }
}

/// Bullet characters used by symbol lists anywhere in the document.
pub fn bullet_inventory(doc: &Document) -> BTreeSet<char> {
    let mut bullets = BTreeSet::new();
    doc.visit_sections(&mut |s| {
        for block in &s.blocks {
            if let Block::List(list) = block {
                collect_bullets(list, &mut bullets);
            }
        }
    });
    bullets
}

pub fn compute_flags(doc: &Document) -> DocumentFlags {
    DocumentFlags {
        symrefs: uses_symbolic_refs(&doc.back.references),
        sortrefs: refs_are_sorted(&doc.back.references),
        bullets: bullet_inventory(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reference;

    fn group(anchors: &[&str]) -> ReferenceGroup {
        ReferenceGroup {
            number_path: vec!["7".into()],
            title: "References".into(),
            anchor: "section-7".into(),
            references: anchors.iter().map(|a| Reference::new(*a)).collect(),
            children: vec![],
        }
    }

    #[test]
    fn numeric_anchors_are_not_symbolic() {
        assert!(!uses_symbolic_refs(&[group(&["ref-1", "ref-2"])]));
        assert!(uses_symbolic_refs(&[group(&["ref-1", "RFC2119"])]));
        assert!(!uses_symbolic_refs(&[]));
    }

    #[test]
    fn rfc_anchor_order() {
        assert!(refs_are_sorted(&[group(&["RFC2119", "RFC8174", "TLS13"])]));
        assert!(!refs_are_sorted(&[group(&["RFC8174", "RFC2119"])]));
    }

    #[test]
    fn sort_order_is_checked_per_group() {
        let mut normative = group(&["RFC8174"]);
        normative.children.push(group(&["RFC2119"]));
        assert!(refs_are_sorted(&[normative]));
    }
}
