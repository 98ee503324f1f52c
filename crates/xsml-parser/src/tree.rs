//! Arena tree for parsed XSML documents.
//!
//! Nodes live in a flat `Vec` addressed by [`NodeId`]; each node keeps its
//! ordered children and a parent back-index. The tree is immutable once the
//! parser hands it out, so it can be shared freely across threads.

use serde::Serialize;
use xsml_lexer::Span;

/// Index of a node in its [`Document`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An attribute as written in a start tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    /// Raw value text, quotes included.
    pub value: Option<String>,
    pub name_span: Span,
    pub value_span: Option<Span>,
}

impl Attribute {
    /// From the start of the name to the end of the value, if any.
    pub fn span(&self) -> Span {
        let end = self.value_span.map_or(self.name_span.end, |v| v.end);
        Span::new(self.name_span.start, end)
    }

    /// The value with one layer of matching quotes removed.
    pub fn unquoted_value(&self) -> Option<&str> {
        self.value.as_deref().map(strip_quotes)
    }

    /// Span of the value without its quotes.
    pub fn value_content_span(&self) -> Option<Span> {
        let (value, span) = (self.value.as_deref()?, self.value_span?);
        let inner = strip_quotes(value);
        if inner.len() == value.len() {
            return Some(span);
        }
        let start = span.start + 1;
        Some(Span::new(start, start + inner.len()))
    }

    pub fn is_quoted(&self) -> bool {
        self.value
            .as_deref()
            .is_some_and(|v| v.starts_with('"') || v.starts_with('\''))
    }
}

/// Remove a leading quote and, when present, the matching trailing one.
pub fn strip_quotes(value: &str) -> &str {
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return value;
    };
    let rest = &value[1..];
    rest.strip_suffix(quote).unwrap_or(rest)
}

/// An element (or the synthetic root) in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// `None` for the root and for a `<` with no name.
    pub tag: Option<String>,
    pub start: usize,
    pub end: usize,
    /// Offset just past the start tag's `>`.
    pub start_tag_end: Option<usize>,
    /// Offset of the `</` of the matching end tag.
    pub end_tag_start: Option<usize>,
    pub name_span: Option<Span>,
    pub end_name_span: Option<Span>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Whether the element was properly terminated.
    pub closed: bool,
    pub self_closing: bool,
}

impl Node {
    pub(crate) fn new(start: usize, end: usize, parent: Option<NodeId>) -> Self {
        Self {
            tag: None,
            start,
            end,
            start_tag_end: None,
            end_tag_start: None,
            name_span: None,
            end_name_span: None,
            attributes: Vec::new(),
            children: Vec::new(),
            parent,
            closed: false,
            self_closing: false,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Start of the content area; the element's end when the start tag never closed.
    pub fn content_start(&self) -> usize {
        self.start_tag_end.unwrap_or(self.end)
    }

    /// End of the content area; the element's end when there is no end tag.
    pub fn content_end(&self) -> usize {
        self.end_tag_start.unwrap_or(self.end)
    }

    /// Look up an attribute by name, ASCII case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Attribute::unquoted_value)
    }

    /// Whether a matched end tag closed this element.
    pub fn has_end_tag(&self) -> bool {
        self.end_name_span.is_some()
    }
}

/// A `<!-- -->` comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// From `<!--` to past `-->` (or the end of input).
    pub span: Span,
    /// Text between the delimiters.
    pub content: Span,
}

/// One tag-name occurrence; the table is sorted by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NameEntry {
    pub span: Span,
    pub node: NodeId,
    pub is_end: bool,
}

/// The result of parsing: node arena, comments and name table.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    nodes: Vec<Node>,
    comments: Vec<Comment>,
    text_len: usize,
    #[serde(skip)]
    pub(crate) names: Vec<NameEntry>,
}

impl Document {
    pub(crate) fn new(
        nodes: Vec<Node>,
        comments: Vec<Comment>,
        text_len: usize,
        names: Vec<NameEntry>,
    ) -> Self {
        Self {
            nodes,
            comments,
            text_len,
            names,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    /// If `id` does not come from this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent chain of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.node(id).parent,
        }
    }

    /// Pre-order walk of the subtree below `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    /// Every element in document order.
    pub fn elements(&self) -> Descendants<'_> {
        self.descendants(self.root())
    }

    /// Elements the parser had to close implicitly.
    pub fn unclosed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.elements().filter(|&id| !self.node(id).closed)
    }

    /// The first element whose `id` attribute equals `value`.
    pub fn find_by_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .find(|&id| self.node(id).attribute_value("id") == Some(value))
    }
}

pub struct Ancestors<'d> {
    document: &'d Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.document.node(id).parent;
        Some(id)
    }
}

pub struct Descendants<'d> {
    document: &'d Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(value: Option<&str>, value_start: usize) -> Attribute {
        Attribute {
            name: "x".into(),
            value: value.map(String::from),
            name_span: Span::new(0, 1),
            value_span: value.map(|v| Span::new(value_start, value_start + v.len())),
        }
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'a'"), "a");
        assert_eq!(strip_quotes("\"open"), "open");
        assert_eq!(strip_quotes("bare"), "bare");
        assert_eq!(strip_quotes("\""), "");
    }

    #[test]
    fn test_attribute_spans() {
        let a = attr(Some("\"abc\""), 2);
        assert_eq!(a.span(), Span::new(0, 7));
        assert_eq!(a.value_content_span(), Some(Span::new(3, 6)));
        assert_eq!(a.unquoted_value(), Some("abc"));
        assert!(a.is_quoted());

        let bare = attr(Some("abc"), 2);
        assert_eq!(bare.value_content_span(), Some(Span::new(2, 5)));
        assert!(!bare.is_quoted());

        let none = attr(None, 0);
        assert_eq!(none.span(), Span::new(0, 1));
        assert_eq!(none.value_content_span(), None);
    }

    #[test]
    fn test_node_boundaries_collapse_to_end() {
        let node = Node::new(3, 10, Some(NodeId(0)));
        assert_eq!(node.content_start(), 10);
        assert_eq!(node.content_end(), 10);
        assert!(!node.is_root());
    }
}
