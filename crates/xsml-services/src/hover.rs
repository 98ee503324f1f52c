//! Hover: what the vocabulary knows about the tag or attribute name under
//! the cursor.

use serde::Serialize;
use xsml_lexer::Span;
use xsml_parser::{Document, Node, StructuralIndex};
use xsml_vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    /// The name the hover describes.
    pub span: Span,
    /// Plain text, one fact per line; the first line is the name itself.
    pub contents: String,
}

/// Hover for the start tag, end tag or attribute name touching `offset`.
///
/// Names the vocabulary does not know get no hover.
pub fn hover(document: &Document, vocabulary: &dyn Vocabulary, offset: usize) -> Option<Hover> {
    let id = StructuralIndex::new(document).node_at(offset)?;
    let node = document.node(id);
    let tag = node.tag.as_deref()?;
    if !vocabulary.is_known_tag(tag) {
        return None;
    }

    if let Some(span) = node.name_span.filter(|s| s.touches(offset)) {
        return Some(Hover {
            span,
            contents: tag_contents(vocabulary, tag, format!("<{tag}>")),
        });
    }
    if let Some(span) = node.end_name_span.filter(|s| s.touches(offset)) {
        return Some(Hover {
            span,
            contents: tag_contents(vocabulary, tag, format!("</{tag}>")),
        });
    }
    attribute_hover(node, tag, vocabulary, offset)
}

fn tag_contents(vocabulary: &dyn Vocabulary, tag: &str, heading: String) -> String {
    let mut lines = vec![heading];
    if vocabulary.is_void(tag) {
        lines.push("Void element: never has an end tag.".to_string());
    }
    if vocabulary.is_embedded_content(tag) {
        lines.push("Content is embedded text, not markup.".to_string());
    }
    lines.join("\n")
}

fn attribute_hover(node: &Node, tag: &str, vocabulary: &dyn Vocabulary, offset: usize) -> Option<Hover> {
    let attribute = node.attributes.iter().find(|a| a.name_span.touches(offset))?;
    let info = vocabulary
        .attributes_for(tag)
        .into_iter()
        .find(|info| info.name.eq_ignore_ascii_case(&attribute.name))?;

    let mut lines = vec![info.name.to_string()];
    if info.is_valueless() {
        lines.push("Boolean attribute: written without a value.".to_string());
    } else if info.is_handler() {
        lines.push("Event handler.".to_string());
    } else {
        let values = vocabulary.values_for(tag, info.name);
        if !values.is_empty() {
            lines.push(format!("Values: {}", values.join(", ")));
        }
    }
    if vocabulary.is_reference_attribute(tag, info.name) {
        lines.push("Value is a link reference.".to_string());
    }
    Some(Hover {
        span: attribute.name_span,
        contents: lines.join("\n"),
    })
}
