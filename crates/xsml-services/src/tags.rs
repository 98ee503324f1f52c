//! Tag-name pairing services: matching tag, linked editing, highlights
//! and rename.

use serde::Serialize;
use xsml_lexer::Span;
use xsml_parser::{Document, MatchingTag, NodeId, StructuralIndex};

/// A replacement of `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

/// The tag name under `offset` and its counterpart.
pub fn matching_tag_range(document: &Document, offset: usize) -> Option<MatchingTag> {
    StructuralIndex::new(document).matching_tag(offset)
}

/// Start and end tag names of a matched pair, in that order, so an edit to
/// one can be mirrored into the other.
pub fn linked_editing_ranges(document: &Document, offset: usize) -> Option<[Span; 2]> {
    let matching = matching_tag_range(document, offset)?;
    let node = document.node(matching.node);
    Some([node.name_span?, node.end_name_span?])
}

/// Every occurrence of the tag name under `offset`. Unlike linked editing
/// this also answers for elements without an end tag.
pub fn document_highlights(document: &Document, offset: usize) -> Vec<Span> {
    let Some(id) = name_owner(document, offset) else {
        return Vec::new();
    };
    let node = document.node(id);
    node.name_span.into_iter().chain(node.end_name_span).collect()
}

/// Edits renaming the element whose start or end tag name is under `offset`.
/// Empty when the cursor is not on a name or `new_name` is not a tag name.
pub fn rename(document: &Document, offset: usize, new_name: &str) -> Vec<TextEdit> {
    if !is_tag_name(new_name) {
        return Vec::new();
    }
    document_highlights(document, offset)
        .into_iter()
        .map(|span| TextEdit {
            span,
            new_text: new_name.to_string(),
        })
        .collect()
}

/// The element whose start or end tag name touches `offset`.
fn name_owner(document: &Document, offset: usize) -> Option<NodeId> {
    let id = StructuralIndex::new(document).node_at(offset)?;
    let node = document.node(id);
    let on_name = [node.name_span, node.end_name_span]
        .into_iter()
        .flatten()
        .any(|span| span.touches(offset));
    on_name.then_some(id)
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '='))
}
