//! XSML Parser
//!
//! Builds an arena tree from the scanner's token stream and answers
//! position queries over it.
//!
//! Parsing never fails. Unterminated, mismatched and stray tags are
//! recovered from and show up as `closed = false` nodes, so every query
//! service downstream can work on half-typed documents.
//!
//! # Example
//!
//! ```
//! use xsml_parser::{parse, StructuralIndex};
//! use xsml_vocabulary::DataVocabulary;
//!
//! let doc = parse("<ul><li>one</ul>", DataVocabulary::html());
//! let ul = doc.children(doc.root())[0];
//! let li = doc.children(ul)[0];
//! assert!(doc.node(ul).closed);
//! assert!(!doc.node(li).closed);
//!
//! let index = StructuralIndex::new(&doc);
//! assert_eq!(index.node_at(9), Some(li));
//! ```

pub mod index;
pub mod parser;
pub mod tree;

pub use index::{MatchingTag, StructuralIndex};
pub use parser::Parser;
pub use tree::{strip_quotes, Attribute, Comment, Document, Node, NodeId};

use xsml_vocabulary::Vocabulary;

/// Parse `text` into a document tree.
pub fn parse(text: &str, vocabulary: &dyn Vocabulary) -> Document {
    Parser::new(text, vocabulary).parse()
}
