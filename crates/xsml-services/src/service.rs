//! The `LanguageService` facade: one vocabulary and configuration, a parse
//! cache keyed by document URI and version, and every query service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use xsml_lexer::{Scanner, Span};
use xsml_parser::{Document, MatchingTag, Parser, StructuralIndex};
use xsml_vocabulary::{DataVocabulary, Vocabulary};

use crate::completion::{self, Suggestion};
use crate::config::{ConfigError, ServiceConfig};
use crate::folding::{self, FoldingRange};
use crate::hover::{self, Hover};
use crate::links::{self, DocumentContext, DocumentLink};
use crate::selection;
use crate::symbols::{self, DocumentSymbol, FlatSymbol};
use crate::tags::{self, TextEdit};

/// A document's text together with its parse tree.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    text: String,
    document: Document,
}

impl ParsedDocument {
    pub fn new(text: impl Into<String>, vocabulary: &dyn Vocabulary) -> Self {
        let text = text.into();
        let document = Parser::new(&text, vocabulary).parse();
        Self { text, document }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> StructuralIndex<'_> {
        StructuralIndex::new(&self.document)
    }
}

#[derive(Debug)]
struct CacheEntry {
    version: i32,
    parsed: Arc<ParsedDocument>,
}

pub struct LanguageService<V: Vocabulary = DataVocabulary> {
    vocabulary: V,
    config: ServiceConfig,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl LanguageService<DataVocabulary> {
    /// Build the vocabulary named by `config` and a service over it.
    pub fn from_config(config: ServiceConfig) -> Result<Self, ConfigError> {
        let vocabulary = config.vocabulary.build()?;
        Ok(Self::new(vocabulary, config))
    }
}

impl<V: Vocabulary> LanguageService<V> {
    pub fn new(vocabulary: V, config: ServiceConfig) -> Self {
        Self {
            vocabulary,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn vocabulary(&self) -> &V {
        &self.vocabulary
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// A token stream over `text`, starting at `offset`.
    pub fn scan<'a>(&'a self, text: &'a str, offset: usize) -> Scanner<'a> {
        Scanner::new(text, offset, &self.vocabulary)
    }

    /// Parse `text` without touching the cache.
    pub fn parse(&self, text: &str) -> ParsedDocument {
        ParsedDocument::new(text, &self.vocabulary)
    }

    /// The parse of `uri` at `version`, reusing the cached one when the
    /// version has not changed.
    pub fn parse_document(&self, uri: &str, version: i32, text: &str) -> Arc<ParsedDocument> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cache.get(uri).filter(|e| e.version == version) {
            tracing::trace!(target: "xsml::service", uri, version, "parse cache hit");
            return Arc::clone(&entry.parsed);
        }
        tracing::debug!(target: "xsml::service", uri, version, len = text.len(), "parsing document");
        let parsed = Arc::new(self.parse(text));
        cache.insert(
            uri.to_string(),
            CacheEntry {
                version,
                parsed: Arc::clone(&parsed),
            },
        );
        parsed
    }

    /// Drop the cached parse of a closed document.
    pub fn forget(&self, uri: &str) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri);
    }

    pub fn complete(&self, parsed: &ParsedDocument, offset: usize) -> Vec<Suggestion> {
        completion::complete(
            parsed.text(),
            parsed.document(),
            offset,
            &self.vocabulary,
            &self.config.completion,
        )
    }

    pub fn tag_complete(&self, parsed: &ParsedDocument, offset: usize) -> Option<String> {
        completion::tag_complete(parsed.text(), parsed.document(), offset, &self.vocabulary)
    }

    pub fn quote_complete(&self, parsed: &ParsedDocument, offset: usize) -> Option<String> {
        completion::quote_complete(
            parsed.text(),
            parsed.document(),
            offset,
            &self.vocabulary,
            &self.config.completion,
        )
    }

    pub fn folding_ranges(&self, parsed: &ParsedDocument) -> Vec<FoldingRange> {
        folding::folding_ranges(parsed.text(), parsed.document(), &self.config.folding)
    }

    pub fn selection_ranges(&self, parsed: &ParsedDocument, offsets: &[usize]) -> Vec<Vec<Span>> {
        selection::selection_ranges(parsed.document(), offsets)
    }

    pub fn matching_tag_range(&self, parsed: &ParsedDocument, offset: usize) -> Option<MatchingTag> {
        tags::matching_tag_range(parsed.document(), offset)
    }

    pub fn linked_editing_ranges(&self, parsed: &ParsedDocument, offset: usize) -> Option<[Span; 2]> {
        tags::linked_editing_ranges(parsed.document(), offset)
    }

    pub fn hover(&self, parsed: &ParsedDocument, offset: usize) -> Option<Hover> {
        hover::hover(parsed.document(), &self.vocabulary, offset)
    }

    pub fn document_highlights(&self, parsed: &ParsedDocument, offset: usize) -> Vec<Span> {
        tags::document_highlights(parsed.document(), offset)
    }

    pub fn rename(&self, parsed: &ParsedDocument, offset: usize, new_name: &str) -> Vec<TextEdit> {
        tags::rename(parsed.document(), offset, new_name)
    }

    pub fn document_symbols(&self, parsed: &ParsedDocument) -> Vec<DocumentSymbol> {
        symbols::document_symbols(parsed.document())
    }

    pub fn flat_symbols(&self, parsed: &ParsedDocument) -> Vec<FlatSymbol> {
        symbols::flat_symbols(parsed.document())
    }

    pub fn document_links(&self, parsed: &ParsedDocument, context: &dyn DocumentContext) -> Vec<DocumentLink> {
        links::document_links(parsed.text(), parsed.document(), &self.vocabulary, context)
    }
}
