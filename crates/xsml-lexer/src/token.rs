use serde::Serialize;

use crate::ScanError;

/// A half-open byte range `[start, end)` in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `start <= offset <= end`: a cursor at either edge still touches the span.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Token classification for XSML markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Start tags
    StartTagOpen,     // <
    StartTag,         // div
    StartTagClose,    // >
    StartTagSelfClose, // />

    // End tags
    EndTagOpen,  // </
    EndTag,      // div
    EndTagClose, // >

    // Attributes
    AttributeName,
    DelimiterAssign, // =
    AttributeValue,

    // Text
    Content,
    Whitespace,

    // Comments
    StartComment, // <!--
    Comment,
    EndComment, // -->

    // Doctype and other `<!` declarations
    StartDoctype,
    Doctype,
    EndDoctype,

    /// Opaque body of a script/style-like element.
    EmbeddedContent,

    Unknown,
    Eof,
}

/// A token produced by the scanner. `text` borrows the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScanError>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, span: Span, text: &'a str) -> Self {
        Self {
            kind,
            span,
            text,
            error: None,
        }
    }

    pub fn with_error(mut self, error: ScanError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }
}
