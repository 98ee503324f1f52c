//! Position queries over a parsed [`Document`].
//!
//! Descent uses binary search over each node's ordered children; tag-name
//! lookups use the document's sorted name table, so no query re-scans text.

use serde::Serialize;
use xsml_lexer::Span;

use crate::tree::{Document, NodeId};

/// A tag name under the cursor and the name it pairs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchingTag {
    pub node: NodeId,
    /// The name the offset sits in.
    pub current: Span,
    /// The start or end tag name on the other side.
    pub counterpart: Span,
}

/// Read-only position index over a document.
#[derive(Debug, Clone, Copy)]
pub struct StructuralIndex<'d> {
    document: &'d Document,
}

impl<'d> StructuralIndex<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Innermost node whose span covers `offset`, the root when none does.
    ///
    /// An offset equal to a child's start belongs to the parent; one equal
    /// to its end belongs to the child. `None` when out of range.
    pub fn node_at(&self, offset: usize) -> Option<NodeId> {
        if offset > self.document.text_len() {
            return None;
        }
        let mut current = self.document.root();
        loop {
            let Some(child) = self.last_child_starting_before(current, offset) else {
                return Some(current);
            };
            let node = self.document.node(child);
            if offset > node.start && offset <= node.end {
                current = child;
            } else {
                return Some(current);
            }
        }
    }

    /// Like [`node_at`](Self::node_at), but an offset right after an
    /// element still selects it (or its innermost last descendant sharing
    /// its end). Used to classify the cursor for completion.
    pub fn node_before(&self, offset: usize) -> Option<NodeId> {
        if offset > self.document.text_len() {
            return None;
        }
        let mut current = self.document.root();
        loop {
            let Some(child) = self.last_child_starting_before(current, offset) else {
                return Some(current);
            };
            let node = self.document.node(child);
            if offset <= node.start {
                return Some(current);
            }
            if offset < node.end {
                current = child;
                continue;
            }
            let shares_end = node
                .children
                .last()
                .is_some_and(|&last| self.document.node(last).end == node.end);
            if shares_end {
                current = child;
                continue;
            }
            return Some(child);
        }
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> crate::tree::Ancestors<'d> {
        self.document.ancestors(id)
    }

    /// For an offset inside (or at the edge of) a tag name, that name's span
    /// and the span of its counterpart. `None` for unmatched and
    /// self-closing elements or when not on a name.
    pub fn matching_tag(&self, offset: usize) -> Option<MatchingTag> {
        let names = &self.document.names;
        let first = names.partition_point(|entry| entry.span.end < offset);
        let entry = names.get(first).filter(|e| e.span.touches(offset))?;
        let node = self.document.node(entry.node);
        let counterpart = if entry.is_end {
            node.name_span?
        } else {
            node.end_name_span?
        };
        Some(MatchingTag {
            node: entry.node,
            current: entry.span,
            counterpart,
        })
    }

    /// The offset at the same relative position inside the counterpart name.
    pub fn mirror_offset(&self, offset: usize) -> Option<usize> {
        let matching = self.matching_tag(offset)?;
        Some(matching.counterpart.start + (offset - matching.current.start))
    }

    fn last_child_starting_before(&self, id: NodeId, offset: usize) -> Option<NodeId> {
        let children = self.document.children(id);
        let idx = children.partition_point(|&c| self.document.node(c).start < offset);
        idx.checked_sub(1).map(|i| children[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;
    use xsml_vocabulary::DataVocabulary;

    fn tag_at(doc: &Document, offset: usize) -> Option<String> {
        let id = StructuralIndex::new(doc).node_at(offset)?;
        Some(doc.node(id).tag.clone().unwrap_or_default())
    }

    fn tag_before(doc: &Document, offset: usize) -> Option<String> {
        let id = StructuralIndex::new(doc).node_before(offset)?;
        Some(doc.node(id).tag.clone().unwrap_or_default())
    }

    // =========================================================================
    // node_at / node_before
    // =========================================================================

    #[test]
    fn test_node_at() {
        //              0    5    10   15   20
        let text = "<div><span>x</span></div>";
        let doc = parse(text, DataVocabulary::html());
        assert_eq!(tag_at(&doc, 0).as_deref(), Some(""));
        assert_eq!(tag_at(&doc, 1).as_deref(), Some("div"));
        assert_eq!(tag_at(&doc, 5).as_deref(), Some("div"));
        assert_eq!(tag_at(&doc, 6).as_deref(), Some("span"));
        assert_eq!(tag_at(&doc, 11).as_deref(), Some("span"));
        assert_eq!(tag_at(&doc, 19).as_deref(), Some("span"));
        assert_eq!(tag_at(&doc, 20).as_deref(), Some("div"));
        assert_eq!(tag_at(&doc, 25).as_deref(), Some("div"));
        assert_eq!(tag_at(&doc, 26), None);
    }

    #[test]
    fn test_node_at_between_siblings() {
        let text = "<p></p> <p></p>";
        let doc = parse(text, DataVocabulary::html());
        let index = StructuralIndex::new(&doc);
        let second = doc.children(doc.root())[1];
        assert_eq!(index.node_at(8), Some(doc.root()));
        assert_eq!(index.node_at(9), Some(second));
    }

    #[test]
    fn test_node_before() {
        let text = "<div><br></div>";
        let doc = parse(text, DataVocabulary::html());
        // right after `<br>`
        assert_eq!(tag_before(&doc, 9).as_deref(), Some("br"));
        // right after `</div>`
        assert_eq!(tag_before(&doc, 15).as_deref(), Some("div"));
        assert_eq!(tag_before(&doc, 6).as_deref(), Some("br"));
        assert_eq!(tag_before(&doc, 5).as_deref(), Some("div"));
    }

    #[test]
    fn test_node_before_descends_through_shared_end() {
        let text = "<div><span>";
        let doc = parse(text, DataVocabulary::html());
        assert_eq!(tag_before(&doc, 11).as_deref(), Some("span"));
    }

    // =========================================================================
    // matching_tag
    // =========================================================================

    #[test]
    fn test_matching_tag_from_both_sides() {
        let text = "<div><p></p></div>";
        let doc = parse(text, DataVocabulary::html());
        let index = StructuralIndex::new(&doc);

        let from_start = index.matching_tag(2).unwrap();
        assert_eq!(from_start.current, Span::new(1, 4));
        assert_eq!(from_start.counterpart, Span::new(14, 17));

        let from_end = index.matching_tag(15).unwrap();
        assert_eq!(from_end.current, Span::new(14, 17));
        assert_eq!(from_end.counterpart, Span::new(1, 4));

        let inner = index.matching_tag(7).unwrap();
        assert_eq!(inner.current, Span::new(6, 7));
        assert_eq!(inner.counterpart, Span::new(10, 11));
    }

    #[test]
    fn test_matching_tag_at_name_edges() {
        let doc = parse("<div></div>", DataVocabulary::html());
        let index = StructuralIndex::new(&doc);
        assert!(index.matching_tag(1).is_some());
        assert!(index.matching_tag(4).is_some());
        assert!(index.matching_tag(0).is_none());
        assert!(index.matching_tag(5).is_none());
    }

    #[test]
    fn test_matching_tag_none_for_unmatched() {
        let doc = parse("<a><b></a><c/>", DataVocabulary::html());
        let index = StructuralIndex::new(&doc);
        assert!(index.matching_tag(5).is_none()); // <b> was never closed
        assert!(index.matching_tag(12).is_none()); // self-closing
        assert!(index.matching_tag(1).is_some());
    }

    #[test]
    fn test_mirror_offset() {
        let doc = parse("<div></div>", DataVocabulary::html());
        let index = StructuralIndex::new(&doc);
        assert_eq!(index.mirror_offset(2), Some(8));
        assert_eq!(index.mirror_offset(8), Some(2));
        assert_eq!(index.mirror_offset(4), Some(10));
        assert_eq!(index.mirror_offset(6), None);
    }
}
