//! XSML Lexer
//!
//! Tokenizes markup into a lazy stream of offset-tagged tokens.
//! Handles start/end tags, attributes in all three quoting styles,
//! comments, doctype declarations and opaque embedded regions
//! (script/style-like elements named by the vocabulary).
//!
//! Malformed input never fails: it is reported through `Unknown` tokens
//! and per-token [`ScanError`]s so the parser can recover.
//!
//! # Example
//!
//! ```
//! use xsml_lexer::{Scanner, TokenKind};
//! use xsml_vocabulary::DataVocabulary;
//!
//! let tokens: Vec<_> = Scanner::new("", 0, DataVocabulary::html()).collect();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! assert_eq!(tokens[0].kind, TokenKind::Eof);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::{scan, Scanner, ScannerState};
pub use token::{Span, Token, TokenKind};

use serde::Serialize;

/// Problems the scanner reports alongside (never instead of) tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum ScanError {
    #[error("Tag name must directly follow the open bracket.")]
    TagNameNotAdjacent,
    #[error("Start tag name expected.")]
    StartTagNameExpected,
    #[error("End tag name expected.")]
    EndTagNameExpected,
    #[error("Unexpected character in tag.")]
    UnexpectedCharacter,
    #[error("Closing bracket expected.")]
    ClosingBracketExpected,
    #[error("Closing bracket missing.")]
    ClosingBracketMissing,
    #[error("Unterminated quoted attribute value.")]
    UnterminatedQuote,
    #[error("Unterminated comment.")]
    UnterminatedComment,
    #[error("Scan offset {offset} is outside the input (length {len}) or not on a character boundary.")]
    OffsetOutOfBounds { offset: usize, len: usize },
}
