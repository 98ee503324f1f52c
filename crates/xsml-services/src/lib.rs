//! XSML Services
//!
//! Query services over a parsed document: context-aware completion,
//! folding, selection ranges, tag matching and linked editing, symbols,
//! links, hover, highlights and rename. Each service is a pure function of the
//! text and its tree; [`LanguageService`] bundles them with a vocabulary,
//! a [`ServiceConfig`] and a per-document parse cache.
//!
//! Offsets are byte offsets into the text. An offset past the end, or one
//! that splits a character, gets an empty answer rather than an error.
//!
//! # Example
//!
//! ```
//! use xsml_services::{LanguageService, ServiceConfig};
//! use xsml_vocabulary::DataVocabulary;
//!
//! let service = LanguageService::new(DataVocabulary::html(), ServiceConfig::default());
//! let parsed = service.parse("<div clas");
//! let suggestions = service.complete(&parsed, 9);
//! assert_eq!(suggestions[0].label, "class");
//! ```

pub mod completion;
pub mod config;
pub mod folding;
pub mod hover;
pub mod links;
pub mod selection;
pub mod service;
pub mod symbols;
pub mod tags;
pub mod text;

pub use completion::{complete, quote_complete, tag_complete, Suggestion, SuggestionKind};
pub use config::{
    AttributeDefaultValue, CompletionConfig, ConfigError, FoldingConfig, ServiceConfig,
    VocabularyConfig,
};
pub use folding::{folding_ranges, FoldingRange, FoldingRangeKind};
pub use hover::{hover, Hover};
pub use links::{document_links, DocumentContext, DocumentLink, LinkTarget, UriContext};
pub use selection::selection_ranges;
pub use service::{LanguageService, ParsedDocument};
pub use symbols::{document_symbols, flat_symbols, DocumentSymbol, FlatSymbol, SymbolKind};
pub use tags::{
    document_highlights, linked_editing_ranges, matching_tag_range, rename, TextEdit,
};
pub use text::LineIndex;
