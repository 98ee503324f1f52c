//! Document symbols for outline and navigation.
//!
//! Every element becomes a symbol named after its tag, decorated with its
//! `id` and classes: `<div id="main" class="a b">` shows up as
//! `div#main.a.b`.

use serde::Serialize;
use xsml_lexer::Span;
use xsml_parser::{Document, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Element,
}

/// A symbol in the outline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// The whole element.
    pub range: Span,
    /// The start tag name.
    pub selection_range: Span,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentSymbol>,
}

/// A symbol with the name of the element containing it, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

/// Symbols nested the way the elements are.
pub fn document_symbols(document: &Document) -> Vec<DocumentSymbol> {
    document
        .children(document.root())
        .iter()
        .map(|&id| symbol_tree(document, id))
        .collect()
}

fn symbol_tree(document: &Document, id: NodeId) -> DocumentSymbol {
    let node = document.node(id);
    DocumentSymbol {
        name: symbol_name(node),
        kind: SymbolKind::Element,
        range: node.span(),
        selection_range: selection_span(node),
        children: node
            .children
            .iter()
            .map(|&child| symbol_tree(document, child))
            .collect(),
    }
}

/// Every symbol in document order, each naming its container.
pub fn flat_symbols(document: &Document) -> Vec<FlatSymbol> {
    document
        .elements()
        .map(|id| {
            let node = document.node(id);
            let container_name = node
                .parent
                .map(|parent| document.node(parent))
                .filter(|parent| !parent.is_root())
                .map(symbol_name);
            FlatSymbol {
                name: symbol_name(node),
                kind: SymbolKind::Element,
                range: node.span(),
                container_name,
            }
        })
        .collect()
}

fn symbol_name(node: &Node) -> String {
    let mut name = node.tag.clone().unwrap_or_default();
    let unquote = |value: &str| value.replace(['"', '\''], "");
    if let Some(id) = node.attribute("id").and_then(|a| a.value.as_deref()) {
        let id = unquote(id);
        if !id.is_empty() {
            name.push('#');
            name.push_str(&id);
        }
    }
    if let Some(classes) = node.attribute("class").and_then(|a| a.value.as_deref()) {
        for class in unquote(classes).split_whitespace() {
            name.push('.');
            name.push_str(class);
        }
    }
    if name.is_empty() {
        name.push('?');
    }
    name
}

fn selection_span(node: &Node) -> Span {
    node.name_span
        .unwrap_or_else(|| Span::new(node.start, node.content_start()))
}
