//! Recovering tree builder for XSML.
//!
//! Consumes the scanner's token stream (with pseudo close tags enabled) and
//! builds the arena tree with an explicit stack of open elements. Parsing is
//! total: malformed input becomes `closed = false` nodes, never an error.
//!
//! Recovery rules:
//! - void tags are closed at their name and never receive children
//! - a `<` interrupting a start tag closes that element on the spot
//! - an end tag closes the nearest open element with the same name; every
//!   element above it ends where the end tag starts, unclosed
//! - an end tag with no open counterpart is ignored
//! - whatever is still open at end of input ends there, unclosed

use xsml_lexer::{Scanner, Span, Token, TokenKind};
use xsml_vocabulary::Vocabulary;

use crate::tree::{Attribute, Comment, Document, NameEntry, Node, NodeId};

/// XSML document parser.
pub struct Parser<'a> {
    text: &'a str,
    vocabulary: &'a dyn Vocabulary,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    comments: Vec<Comment>,
    /// Element whose start tag is being scanned; receives attributes.
    open_tag: Option<NodeId>,
    end_tag_start: Option<usize>,
    /// Element closed by the end tag being scanned.
    end_tag_match: Option<NodeId>,
    comment_start: Option<usize>,
    comment_content: Option<Span>,
    recoveries: usize,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, vocabulary: &'a dyn Vocabulary) -> Self {
        let mut root = Node::new(0, text.len(), None);
        root.closed = true;
        Self {
            text,
            vocabulary,
            nodes: vec![root],
            stack: vec![NodeId(0)],
            comments: Vec::new(),
            open_tag: None,
            end_tag_start: None,
            end_tag_match: None,
            comment_start: None,
            comment_content: None,
            recoveries: 0,
        }
    }

    /// Parse source text into a document tree.
    pub fn parse(mut self) -> Document {
        let scanner = Scanner::new(self.text, 0, self.vocabulary).with_pseudo_close_tags(true);
        for token in scanner {
            self.token(token);
        }
        self.finish()
    }

    fn token(&mut self, token: Token<'_>) {
        match token.kind {
            TokenKind::StartTagOpen => self.start_tag_open(token.start()),
            TokenKind::StartTag => self.start_tag(token),
            TokenKind::StartTagClose => self.start_tag_close(token),
            TokenKind::StartTagSelfClose => self.start_tag_self_close(token.end()),
            TokenKind::EndTagOpen => {
                self.open_tag = None;
                self.end_tag_match = None;
                self.end_tag_start = Some(token.start());
            }
            TokenKind::EndTag => self.end_tag(token),
            TokenKind::EndTagClose => {
                if let Some(id) = self.end_tag_match.take() {
                    self.nodes[id.0].end = token.end();
                }
            }
            TokenKind::AttributeName => {
                if let Some(id) = self.open_tag {
                    self.nodes[id.0].attributes.push(Attribute {
                        name: token.text.to_string(),
                        value: None,
                        name_span: token.span,
                        value_span: None,
                    });
                }
            }
            TokenKind::AttributeValue => {
                let Some(id) = self.open_tag else { return };
                if let Some(attr) = self.nodes[id.0].attributes.last_mut() {
                    if attr.value.is_none() {
                        attr.value = Some(token.text.to_string());
                        attr.value_span = Some(token.span);
                    }
                }
            }
            TokenKind::StartComment => {
                self.comment_start = Some(token.start());
                self.comment_content = None;
            }
            TokenKind::Comment => self.comment_content = Some(token.span),
            TokenKind::EndComment => self.end_comment(token.start(), token.end()),
            TokenKind::Eof => {
                if self.comment_start.is_some() {
                    self.end_comment(token.start(), token.end());
                }
            }
            _ => {}
        }
    }

    fn top(&self) -> NodeId {
        *self.stack.last().expect("root is never popped")
    }

    fn start_tag_open(&mut self, start: usize) {
        let parent = self.top();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(start, self.text.len(), Some(parent)));
        self.nodes[parent.0].children.push(id);
        self.stack.push(id);
        self.open_tag = Some(id);
    }

    fn start_tag(&mut self, token: Token<'_>) {
        let Some(id) = self.open_tag else { return };
        let node = &mut self.nodes[id.0];
        node.tag = Some(token.text.to_string());
        node.name_span = Some(token.span);
        if self.vocabulary.is_void(token.text) {
            node.closed = true;
            if self.top() == id {
                self.stack.pop();
            }
        }
    }

    fn start_tag_close(&mut self, token: Token<'_>) {
        let Some(id) = self.open_tag.take() else { return };
        let node = &mut self.nodes[id.0];
        node.end = token.end();
        let still_open = self.stack.last() == Some(&id);
        if token.span.is_empty() {
            // `<` interrupted the start tag
            if still_open {
                tracing::trace!(target: "xsml::parser", start = node.start, "unterminated start tag");
                self.recoveries += 1;
                self.stack.pop();
            }
            return;
        }
        node.start_tag_end = Some(token.end());
        if node.tag.is_none() && still_open {
            // a nameless tag can never be closed, so it takes no children
            self.recoveries += 1;
            self.stack.pop();
        }
    }

    fn start_tag_self_close(&mut self, end: usize) {
        let Some(id) = self.open_tag.take() else { return };
        let node = &mut self.nodes[id.0];
        node.end = end;
        node.start_tag_end = Some(end);
        node.closed = true;
        node.self_closing = true;
        if self.stack.last() == Some(&id) {
            self.stack.pop();
        }
    }

    fn end_tag(&mut self, token: Token<'_>) {
        let Some(end_tag_start) = self.end_tag_start else { return };
        let name = token.text;
        let position = self.stack.iter().skip(1).rposition(|id| {
            self.nodes[id.0]
                .tag
                .as_deref()
                .is_some_and(|tag| self.vocabulary.tag_names_match(tag, name))
        });
        let Some(position) = position.map(|p| p + 1) else {
            tracing::trace!(target: "xsml::parser", name, start = end_tag_start, "stray end tag ignored");
            self.recoveries += 1;
            return;
        };

        for id in self.stack.drain(position + 1..) {
            let node = &mut self.nodes[id.0];
            node.end = end_tag_start;
            node.closed = false;
            tracing::trace!(target: "xsml::parser", tag = ?node.tag, "implicitly closed by </{name}>");
            self.recoveries += 1;
        }

        let id = self.stack[position];
        self.stack.truncate(position);
        let node = &mut self.nodes[id.0];
        node.closed = true;
        node.end_tag_start = Some(end_tag_start);
        node.end_name_span = Some(token.span);
        node.end = token.end();
        self.end_tag_match = Some(id);
    }

    fn end_comment(&mut self, content_end: usize, end: usize) {
        let Some(start) = self.comment_start.take() else { return };
        let content = self
            .comment_content
            .take()
            .unwrap_or_else(|| Span::new(content_end, content_end));
        self.comments.push(Comment {
            span: Span::new(start, end),
            content,
        });
    }

    fn finish(mut self) -> Document {
        let len = self.text.len();
        for id in self.stack.drain(1..) {
            let node = &mut self.nodes[id.0];
            node.end = len;
            node.closed = false;
            self.recoveries += 1;
        }

        let mut names = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(span) = node.name_span {
                names.push(NameEntry {
                    span,
                    node: NodeId(index),
                    is_end: false,
                });
            }
            if let Some(span) = node.end_name_span {
                names.push(NameEntry {
                    span,
                    node: NodeId(index),
                    is_end: true,
                });
            }
        }
        names.sort_by_key(|entry| entry.span.start);

        tracing::debug!(
            target: "xsml::parser",
            nodes = self.nodes.len(),
            comments = self.comments.len(),
            recoveries = self.recoveries,
            "parsed document"
        );
        Document::new(self.nodes, self.comments, len, names)
    }
}
