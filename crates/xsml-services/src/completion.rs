//! Context-aware completion.
//!
//! The cursor is classified by re-scanning from the start of the node before
//! it: whichever token the cursor falls into (tag name, attribute name,
//! value, end tag, ...) decides what gets proposed. Candidates are then
//! ranked against the partial token already typed.

use std::collections::HashSet;

use serde::Serialize;
use xsml_lexer::{Scanner, ScannerState, Span, TokenKind};
use xsml_parser::{Document, NodeId, StructuralIndex};
use xsml_vocabulary::Vocabulary;

use crate::config::{AttributeDefaultValue, CompletionConfig};
use crate::text::{difference, is_valid_offset};

/// Length difference beyond which two strings are considered unrelated.
const MAX_LEN_DELTA: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SuggestionKind {
    Tag,
    CloseTag,
    Attribute,
    /// Event handler attribute (`onclick`).
    Handler,
    Value,
}

/// A completion proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    /// Text replacing `replace`. May contain `$0`/`$1` tab stops when `snippet` is set.
    pub insert_text: String,
    pub kind: SuggestionKind,
    /// Similarity to the typed partial token; higher is closer.
    pub sort_score: f64,
    pub replace: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
    pub snippet: bool,
}

impl Suggestion {
    fn new(label: impl Into<String>, insert_text: impl Into<String>, kind: SuggestionKind, replace: Span) -> Self {
        Self {
            label: label.into(),
            insert_text: insert_text.into(),
            kind,
            sort_score: 0.0,
            replace,
            filter_text: None,
            snippet: false,
        }
    }

    fn filter(mut self, filter_text: impl Into<String>) -> Self {
        self.filter_text = Some(filter_text.into());
        self
    }

    fn snippet(mut self) -> Self {
        self.snippet = true;
        self
    }
}

struct Candidate {
    suggestion: Suggestion,
    /// Ranked above everything else.
    pinned: bool,
}

/// Completion proposals for `offset`, best first.
///
/// Empty when the offset is out of range or the cursor sits in plain content.
pub fn complete(
    text: &str,
    document: &Document,
    offset: usize,
    vocabulary: &dyn Vocabulary,
    config: &CompletionConfig,
) -> Vec<Suggestion> {
    if !is_valid_offset(text, offset) {
        return Vec::new();
    }
    let Some(node) = StructuralIndex::new(document).node_before(offset) else {
        return Vec::new();
    };
    let mut completion = Completion {
        text,
        document,
        offset,
        vocabulary,
        config,
        node,
        current_tag: None,
        current_attribute: None,
        candidates: Vec::new(),
    };
    completion.run();
    tracing::debug!(
        target: "xsml::completion",
        offset,
        candidates = completion.candidates.len(),
        "completed"
    );
    rank(text, offset, completion.candidates)
}

struct Completion<'a> {
    text: &'a str,
    document: &'a Document,
    offset: usize,
    vocabulary: &'a dyn Vocabulary,
    config: &'a CompletionConfig,
    node: NodeId,
    current_tag: Option<&'a str>,
    current_attribute: Option<&'a str>,
    candidates: Vec<Candidate>,
}

impl<'a> Completion<'a> {
    fn run(&mut self) {
        let offset = self.offset;
        let start = self.document.node(self.node).start;
        let mut scanner = Scanner::new(self.text, start, self.vocabulary);
        loop {
            let token = scanner.next_token();
            if token.kind == TokenKind::Eof || token.start() > offset {
                return;
            }
            match token.kind {
                TokenKind::StartTagOpen => {
                    if token.end() == offset {
                        let end = self.scan_next_for_end(&mut scanner, token.end(), TokenKind::StartTag);
                        return self.tag_suggestions(offset, end, token.start());
                    }
                }
                TokenKind::StartTag => {
                    if token.span.touches(offset) {
                        let parent = self.parent_of_tag_at(token.start() - 1);
                        return self.open_tag_suggestions(token.start(), token.end(), parent);
                    }
                    self.current_tag = Some(token.text);
                }
                TokenKind::AttributeName => {
                    if token.span.touches(offset) {
                        return self.attribute_name_suggestions(token.start(), token.end());
                    }
                    self.current_attribute = Some(token.text);
                }
                TokenKind::DelimiterAssign => {
                    if token.end() == offset {
                        let end =
                            self.scan_next_for_end(&mut scanner, token.end(), TokenKind::AttributeValue);
                        return self.attribute_value_suggestions(offset, end);
                    }
                }
                TokenKind::AttributeValue => {
                    if token.span.touches(offset) {
                        return self.attribute_value_suggestions(token.start(), token.end());
                    }
                }
                TokenKind::Whitespace if offset <= token.end() => match scanner.state() {
                    ScannerState::AfterOpeningStartTag => {
                        let end = self.scan_next_for_end(&mut scanner, token.end(), TokenKind::StartTag);
                        return self.tag_suggestions(token.start(), end, token.start() - 1);
                    }
                    ScannerState::WithinTag | ScannerState::AfterAttributeName => {
                        return self.attribute_name_suggestions(token.end(), offset);
                    }
                    ScannerState::BeforeAttributeValue => {
                        return self.attribute_value_suggestions(token.end(), offset);
                    }
                    ScannerState::AfterOpeningEndTag => {
                        return self.close_tag_suggestions(token.start() - 1, false, offset);
                    }
                    ScannerState::WithinContent => return,
                    _ => {}
                },
                TokenKind::EndTagOpen => {
                    if offset <= token.end() {
                        let end = self.scan_next_for_end(&mut scanner, token.end(), TokenKind::EndTag);
                        return self.close_tag_suggestions(token.start() + 1, false, end);
                    }
                }
                TokenKind::EndTag => {
                    if offset <= token.end() {
                        let before = self.text[..token.start()].trim_end_matches(is_whitespace);
                        if before.ends_with('/') {
                            return self.close_tag_suggestions(before.len() - 1, false, token.end());
                        }
                    }
                }
                TokenKind::StartTagClose => {
                    if offset <= token.end() {
                        if let Some(tag) = self.current_tag {
                            self.auto_close_suggestion(token.end(), tag);
                        }
                        return;
                    }
                }
                _ => {
                    if offset <= token.end() {
                        return;
                    }
                }
            }
        }
    }

    /// End of the token right after the cursor when it has kind `next`, else the cursor.
    fn scan_next_for_end(&self, scanner: &mut Scanner<'_>, token_end: usize, next: TokenKind) -> usize {
        if self.offset == token_end {
            let token = scanner.next_token();
            if token.kind == next && token.start() == self.offset {
                return token.end();
            }
        }
        self.offset
    }

    fn replace_span(&self, start: usize, end: usize) -> Span {
        Span::new(start.min(self.offset), end.max(self.offset))
    }

    fn push(&mut self, suggestion: Suggestion, pinned: bool) {
        self.candidates.push(Candidate { suggestion, pinned });
    }

    /// Element that would contain a tag opened at `open_bracket`.
    fn parent_of_tag_at(&self, open_bracket: usize) -> Option<NodeId> {
        let node = self.document.node(self.node);
        if node.start == open_bracket {
            node.parent
        } else {
            Some(self.node)
        }
    }

    // --- Tags ---

    fn tag_suggestions(&mut self, name_start: usize, name_end: usize, open_bracket: usize) {
        let parent = self.parent_of_tag_at(open_bracket);
        self.open_tag_suggestions(name_start, name_end, parent);
        self.close_tag_suggestions(name_start, true, name_end);
    }

    fn open_tag_suggestions(&mut self, name_start: usize, name_end: usize, parent: Option<NodeId>) {
        let replace = self.replace_span(name_start, name_end);
        let (document, vocabulary) = (self.document, self.vocabulary);
        let parent_tag = parent.and_then(|id| document.node(id).tag.as_deref());
        for tag in vocabulary.tags() {
            if parent_tag.is_some_and(|p| !vocabulary.allows_child(p, tag)) {
                continue;
            }
            self.push(Suggestion::new(tag, tag, SuggestionKind::Tag, replace), false);
        }
    }

    /// Close of the nearest open ancestor (pinned), then, outside a start
    /// tag, every other known tag as `/tag`.
    fn close_tag_suggestions(&mut self, after_open_bracket: usize, in_open_tag: bool, name_end: usize) {
        let (text, document, vocabulary) = (self.text, self.document, self.vocabulary);
        let replace = self.replace_span(after_open_bracket, name_end);
        let close = if is_followed_by(
            text,
            name_end,
            ScannerState::WithinEndTag,
            TokenKind::EndTagClose,
            vocabulary,
        ) {
            ""
        } else {
            ">"
        };

        let mut current = Some(self.node);
        if in_open_tag {
            current = current.and_then(|id| document.node(id).parent);
        }
        let mut open_ancestor = None;
        while let Some(id) = current {
            let node = document.node(id);
            if let Some(tag) = node.tag.as_deref() {
                if !node.closed || node.end_tag_start.is_some_and(|s| s > self.offset) {
                    open_ancestor = Some((tag, node.start));
                    break;
                }
            }
            current = node.parent;
        }

        if let Some((tag, start)) = open_ancestor {
            let mut suggestion = Suggestion::new(
                format!("/{tag}"),
                format!("/{tag}{close}"),
                SuggestionKind::CloseTag,
                replace,
            )
            .filter(format!("/{tag}"));
            // close on its own line: align with the start tag
            let start_indent = blank_line_prefix(text, start);
            let end_indent = blank_line_prefix(text, after_open_bracket - 1);
            if let (Some(start_indent), Some(end_indent)) = (start_indent, end_indent) {
                if start_indent != end_indent {
                    suggestion.insert_text = format!("{start_indent}</{tag}{close}");
                    suggestion.replace =
                        self.replace_span(after_open_bracket - 1 - end_indent.len(), self.offset);
                    suggestion.filter_text = Some(format!("{end_indent}</{tag}"));
                }
            }
            self.push(suggestion, true);
        }

        if in_open_tag {
            return;
        }
        let ancestor_tag = open_ancestor.map(|(tag, _)| tag);
        for tag in vocabulary.tags() {
            if ancestor_tag.is_some_and(|a| vocabulary.tag_names_match(a, tag)) {
                continue;
            }
            let suggestion = Suggestion::new(
                format!("/{tag}"),
                format!("/{tag}{close}"),
                SuggestionKind::CloseTag,
                replace,
            )
            .filter(format!("/{tag}{close}"));
            self.push(suggestion, false);
        }
    }

    fn auto_close_suggestion(&mut self, tag_close_end: usize, tag: &str) {
        if self.config.hide_auto_complete_proposals || self.vocabulary.is_void(tag) {
            return;
        }
        let label = format!("</{tag}>");
        let suggestion = Suggestion::new(
            label.clone(),
            format!("$0</{tag}>"),
            SuggestionKind::CloseTag,
            Span::new(tag_close_end, tag_close_end),
        )
        .filter(label)
        .snippet();
        self.push(suggestion, true);
    }

    // --- Attributes ---

    fn attribute_name_suggestions(&mut self, name_start: usize, name_end: usize) {
        let text = self.text;
        let mut replace_end = self.offset;
        while replace_end < name_end && text.as_bytes()[replace_end] != b'<' {
            replace_end += 1;
        }
        let current = text.get(name_start..name_end).unwrap_or("");
        let replace = self.replace_span(name_start, replace_end);

        let value = if is_followed_by(
            text,
            name_end,
            ScannerState::AfterAttributeName,
            TokenKind::DelimiterAssign,
            self.vocabulary,
        ) {
            ""
        } else {
            match self.config.attribute_default_value {
                AttributeDefaultValue::DoubleQuotes => "=\"$0\"",
                AttributeDefaultValue::SingleQuotes => "='$0'",
                AttributeDefaultValue::Empty => "=$0",
            }
        };

        let node = self.document.node(self.node);
        let mut seen: HashSet<String> = node
            .attributes
            .iter()
            .filter(|a| a.name != current)
            .map(|a| a.name.to_ascii_lowercase())
            .collect();

        let vocabulary = self.vocabulary;
        let tag = self.current_tag.unwrap_or("");
        for attr in vocabulary.attributes_for(tag) {
            if !seen.insert(attr.name.to_ascii_lowercase()) {
                continue;
            }
            let insert_text = if !attr.is_valueless() && !value.is_empty() {
                format!("{}{value}", attr.name)
            } else {
                attr.name.to_string()
            };
            let kind = if attr.is_handler() {
                SuggestionKind::Handler
            } else {
                SuggestionKind::Attribute
            };
            self.push(
                Suggestion::new(attr.name, insert_text, kind, replace).snippet(),
                false,
            );
        }
        self.data_attribute_suggestions(replace, current, &seen);
    }

    /// `data-` plus every `data-*` attribute already used in the document.
    fn data_attribute_suggestions(&mut self, replace: Span, current: &str, seen: &HashSet<String>) {
        const PREFIX: &str = "data-";
        self.push(
            Suggestion::new(PREFIX, "data-$1=\"$2\"", SuggestionKind::Attribute, replace).snippet(),
            false,
        );
        let document = self.document;
        let mut found: Vec<&str> = Vec::new();
        for id in document.elements() {
            for attr in &document.node(id).attributes {
                let name = attr.name.as_str();
                if name.starts_with(PREFIX)
                    && name.len() > PREFIX.len()
                    && name != current
                    && !seen.contains(&name.to_ascii_lowercase())
                    && !found.contains(&name)
                {
                    found.push(name);
                }
            }
        }
        for name in found {
            self.push(
                Suggestion::new(name, format!("{name}=\"$1\""), SuggestionKind::Attribute, replace)
                    .snippet(),
                false,
            );
        }
    }

    fn attribute_value_suggestions(&mut self, value_start: usize, value_end: usize) {
        let text = self.text;
        let bytes = text.as_bytes();
        let offset = self.offset;
        let quote = bytes.get(value_start).copied().filter(|b| *b == b'"' || *b == b'\'');

        let (replace, add_quotes) = match quote {
            Some(quote) if offset > value_start && offset <= value_end => {
                let content_start = value_start + 1;
                let mut content_end = value_end;
                if value_end > content_start && bytes[value_end - 1] == quote {
                    content_end -= 1;
                }
                let start = word_start(text, offset, content_start);
                let end = word_end(text, offset, content_end);
                (self.replace_span(start, end), false)
            }
            _ => (self.replace_span(value_start, value_end), true),
        };

        let quote_char = match self.config.attribute_default_value {
            AttributeDefaultValue::SingleQuotes => '\'',
            _ => '"',
        };
        let tag = self.current_tag.unwrap_or("");
        let attribute = self.current_attribute.unwrap_or("");
        let vocabulary = self.vocabulary;
        for value in vocabulary.values_for(tag, attribute) {
            let insert_text = if add_quotes {
                format!("{quote_char}{value}{quote_char}")
            } else {
                value.to_string()
            };
            let suggestion = Suggestion::new(value, insert_text.clone(), SuggestionKind::Value, replace)
                .filter(insert_text);
            self.push(suggestion, false);
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
}

fn word_start(text: &str, mut offset: usize, limit: usize) -> usize {
    let bytes = text.as_bytes();
    while offset > limit && !is_whitespace(bytes[offset - 1] as char) {
        offset -= 1;
    }
    offset
}

fn word_end(text: &str, mut offset: usize, limit: usize) -> usize {
    let bytes = text.as_bytes();
    while offset < limit && !is_whitespace(bytes[offset] as char) {
        offset += 1;
    }
    offset
}

/// The text between the line start and `offset` when it is all whitespace.
fn blank_line_prefix(text: &str, offset: usize) -> Option<&str> {
    let before = &text[..offset];
    let line_start = before.rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let prefix = &before[line_start..];
    prefix.chars().all(is_whitespace).then_some(prefix)
}

/// Whether the first non-whitespace token at `offset`, scanning in `state`,
/// has kind `expected`.
fn is_followed_by(
    text: &str,
    offset: usize,
    state: ScannerState,
    expected: TokenKind,
    vocabulary: &dyn Vocabulary,
) -> bool {
    let mut scanner = Scanner::new(text, offset, vocabulary).with_state(state);
    let mut token = scanner.next_token();
    while token.kind == TokenKind::Whitespace {
        token = scanner.next_token();
    }
    token.kind == expected
}

/// Pinned first, then prefix matches of the typed token, then the rest;
/// each tier by similarity, ties by label.
fn rank(text: &str, offset: usize, candidates: Vec<Candidate>) -> Vec<Suggestion> {
    let mut ranked: Vec<(u8, Suggestion)> = candidates
        .into_iter()
        .map(|candidate| {
            let mut suggestion = candidate.suggestion;
            let typed = text.get(suggestion.replace.start..offset).unwrap_or("");
            let key = suggestion
                .filter_text
                .as_deref()
                .unwrap_or(&suggestion.label);
            let score = if typed.is_empty() {
                0.0
            } else {
                difference(typed, key, MAX_LEN_DELTA)
            };
            let tier = if candidate.pinned {
                0
            } else if starts_with_ignore_case(key, typed) {
                1
            } else {
                2
            };
            suggestion.sort_score = score;
            (tier, suggestion)
        })
        .collect();
    ranked.sort_by(|(tier_a, a), (tier_b, b)| {
        tier_a
            .cmp(tier_b)
            .then_with(|| b.sort_score.total_cmp(&a.sort_score))
            .then_with(|| a.label.cmp(&b.label))
    });
    ranked.into_iter().map(|(_, s)| s).collect()
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

// --- Auto-insertion ---

/// Text to insert after typing `>` or `/` at `offset`: `$0</tag>` when a
/// start tag was just closed, `tag>` when an end tag was just opened.
pub fn tag_complete(
    text: &str,
    document: &Document,
    offset: usize,
    vocabulary: &dyn Vocabulary,
) -> Option<String> {
    if offset == 0 || !is_valid_offset(text, offset) {
        return None;
    }
    let index = StructuralIndex::new(document);
    match text.as_bytes()[offset - 1] {
        b'>' => {
            let id = index.node_before(offset)?;
            let node = document.node(id);
            let tag = node.tag.as_deref()?;
            if vocabulary.is_void(tag)
                || node.start >= offset
                || node.end_tag_start.is_some_and(|s| s <= offset)
            {
                return None;
            }
            Scanner::new(text, node.start, vocabulary)
                .take_while(|t| t.kind != TokenKind::Eof && t.end() <= offset)
                .any(|t| t.kind == TokenKind::StartTagClose && t.end() == offset)
                .then(|| format!("$0</{tag}>"))
        }
        b'/' => {
            let mut current = index.node_before(offset);
            while let Some(id) = current {
                let node = document.node(id);
                if !node.closed || node.end_tag_start.is_some_and(|s| s > offset) {
                    break;
                }
                current = node.parent;
            }
            let node = document.node(current?);
            let tag = node.tag.as_deref()?;
            let just_opened = Scanner::new(text, node.start, vocabulary)
                .take_while(|t| t.kind != TokenKind::Eof && t.end() <= offset)
                .any(|t| t.kind == TokenKind::EndTagOpen && t.end() == offset);
            if !just_opened {
                return None;
            }
            if text.as_bytes().get(offset) == Some(&b'>') {
                Some(tag.to_string())
            } else {
                Some(format!("{tag}>"))
            }
        }
        _ => None,
    }
}

/// Quotes to insert after typing `=` behind an attribute name.
pub fn quote_complete(
    text: &str,
    document: &Document,
    offset: usize,
    vocabulary: &dyn Vocabulary,
    config: &CompletionConfig,
) -> Option<String> {
    if offset == 0 || !is_valid_offset(text, offset) || text.as_bytes()[offset - 1] != b'=' {
        return None;
    }
    let value = match config.attribute_default_value {
        AttributeDefaultValue::DoubleQuotes => "\"$1\"",
        AttributeDefaultValue::SingleQuotes => "'$1'",
        AttributeDefaultValue::Empty => return None,
    };
    let id = StructuralIndex::new(document).node_before(offset)?;
    let node = document.node(id);
    if node.attributes.is_empty()
        || node.start >= offset
        || node.end_tag_start.is_some_and(|s| s <= offset)
    {
        return None;
    }
    let mut scanner = Scanner::new(text, node.start, vocabulary);
    loop {
        let token = scanner.next_token();
        if token.kind == TokenKind::Eof || token.end() > offset {
            return None;
        }
        if token.kind == TokenKind::AttributeName && token.end() == offset - 1 {
            if scanner.next_token().kind != TokenKind::DelimiterAssign {
                return None;
            }
            return match scanner.next_token().kind {
                TokenKind::Unknown | TokenKind::AttributeValue => None,
                _ => Some(value.to_string()),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xsml_parser::parse;
    use xsml_vocabulary::DataVocabulary;

    /// Complete at the `|` marker.
    fn complete_at(marked: &str) -> Vec<Suggestion> {
        complete_with(marked, &CompletionConfig::default())
    }

    fn complete_with(marked: &str, config: &CompletionConfig) -> Vec<Suggestion> {
        let offset = marked.find('|').expect("cursor marker");
        let text = marked.replacen('|', "", 1);
        let vocab = DataVocabulary::html();
        let doc = parse(&text, vocab);
        complete(&text, &doc, offset, vocab, config)
    }

    fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.label.as_str()).collect()
    }

    fn find<'s>(suggestions: &'s [Suggestion], label: &str) -> &'s Suggestion {
        suggestions
            .iter()
            .find(|s| s.label == label)
            .unwrap_or_else(|| panic!("no suggestion {label}"))
    }

    // =========================================================================
    // Tag names
    // =========================================================================

    #[test]
    fn test_tag_names_after_open_bracket() {
        let result = complete_at("<|");
        assert!(result.len() > 50);
        let div = find(&result, "div");
        assert_eq!(div.insert_text, "div");
        assert_eq!(div.replace, Span::new(1, 1));
        assert_eq!(div.kind, SuggestionKind::Tag);
    }

    #[test]
    fn test_partial_tag_name() {
        let result = complete_at("<di|");
        assert_eq!(result[0].label, "div");
        let div = find(&result, "div");
        assert_eq!(div.replace, Span::new(1, 3));
    }

    #[test]
    fn test_partial_tag_name_prefers_exact_prefix() {
        let result = complete_at("<spa|");
        assert_eq!(result[0].label, "span");
    }

    #[test]
    fn test_tag_name_replaces_whole_name() {
        let result = complete_at("<d|iv></div>");
        let div = find(&result, "div");
        assert_eq!(div.replace, Span::new(1, 4));
    }

    #[test]
    fn test_open_ancestor_close_inside_start_context() {
        let result = complete_at("<div><|");
        let close = find(&result, "/div");
        assert_eq!(close.insert_text, "/div>");
        assert_eq!(result[0].label, "/div");
    }

    #[test]
    fn test_content_model_filters_tags() {
        let vocab = DataVocabulary::from_json(
            r#"{ "tags": [{ "name": "xr-scene", "children": ["xr-model"] },
                         { "name": "xr-model" }, { "name": "xr-light" }] }"#,
        )
        .unwrap();
        let text = "<xr-scene><";
        let doc = parse(text, &vocab);
        let result = complete(text, &doc, text.len(), &vocab, &CompletionConfig::default());
        assert_eq!(labels(&result), vec!["/xr-scene", "xr-model"]);
    }

    // =========================================================================
    // End tags
    // =========================================================================

    #[test]
    fn test_end_tag_pins_nearest_open_ancestor() {
        let result = complete_at("<div><span></|");
        assert_eq!(result[0].label, "/span");
        assert_eq!(result[0].insert_text, "/span>");
        assert_eq!(result[0].replace, Span::new(12, 13));
        // the rest of the vocabulary follows
        assert!(result.iter().any(|s| s.label == "/div"));
        assert!(result.iter().any(|s| s.label == "/p"));
        assert_eq!(result.iter().filter(|s| s.label == "/span").count(), 1);
    }

    #[test]
    fn test_end_tag_skips_closed_elements() {
        let result = complete_at("<div><p></p></|");
        assert_eq!(result[0].label, "/div");
    }

    #[test]
    fn test_end_tag_followed_by_bracket() {
        let result = complete_at("<div></|>");
        assert_eq!(result[0].insert_text, "/div");
    }

    #[test]
    fn test_end_tag_partial_name() {
        let result = complete_at("<div></d|");
        assert_eq!(result[0].label, "/div");
        assert_eq!(result[0].replace, Span::new(6, 8));
    }

    #[test]
    fn test_end_tag_aligns_with_start_indent() {
        let result = complete_at("  <div>\n    text\n    </|");
        let close = &result[0];
        assert_eq!(close.label, "/div");
        assert_eq!(close.insert_text, "  </div>");
        assert_eq!(close.replace, Span::new(17, 23));
        assert_eq!(close.filter_text.as_deref(), Some("    </div"));
    }

    #[test]
    fn test_no_open_ancestor_lists_vocabulary() {
        let result = complete_at("</|");
        assert!(result.len() > 50);
        assert!(result.iter().all(|s| s.kind == SuggestionKind::CloseTag));
    }

    // =========================================================================
    // Auto close
    // =========================================================================

    #[test]
    fn test_auto_close_after_start_tag() {
        let result = complete_at("<div>|");
        assert_eq!(labels(&result), vec!["</div>"]);
        assert_eq!(result[0].insert_text, "$0</div>");
        assert_eq!(result[0].replace, Span::new(5, 5));
        assert!(result[0].snippet);
    }

    #[test]
    fn test_no_auto_close_for_void() {
        assert!(complete_at("<br>|").is_empty());
    }

    #[test]
    fn test_auto_close_can_be_hidden() {
        let config = CompletionConfig {
            hide_auto_complete_proposals: true,
            ..CompletionConfig::default()
        };
        assert!(complete_with("<div>|", &config).is_empty());
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    #[test]
    fn test_attribute_name_partial_prefers_prefix() {
        let result = complete_at("<div clas|");
        assert_eq!(result[0].label, "class");
        assert_eq!(result[0].insert_text, "class=\"$0\"");
        assert_eq!(result[0].replace, Span::new(5, 9));
        assert!(result[0].snippet);
    }

    #[test]
    fn test_attribute_names_after_whitespace() {
        let result = complete_at("<input |>");
        let ty = find(&result, "type");
        assert_eq!(ty.replace, Span::new(7, 7));
        assert_eq!(ty.insert_text, "type=\"$0\"");
        let disabled = find(&result, "disabled");
        assert_eq!(disabled.insert_text, "disabled");
    }

    #[test]
    fn test_attribute_quote_style_from_config() {
        let single = CompletionConfig {
            attribute_default_value: AttributeDefaultValue::SingleQuotes,
            ..CompletionConfig::default()
        };
        assert_eq!(find(&complete_with("<div |", &single), "id").insert_text, "id='$0'");
        let empty = CompletionConfig {
            attribute_default_value: AttributeDefaultValue::Empty,
            ..CompletionConfig::default()
        };
        assert_eq!(find(&complete_with("<div |", &empty), "id").insert_text, "id=$0");
    }

    #[test]
    fn test_attribute_without_value_when_assign_follows() {
        let result = complete_at("<div cl|=\"a\">");
        assert_eq!(result[0].label, "class");
        assert_eq!(result[0].insert_text, "class");
    }

    #[test]
    fn test_existing_attributes_are_excluded() {
        let result = complete_at("<div id=\"a\" |>");
        assert!(!result.iter().any(|s| s.label == "id"));
        assert!(result.iter().any(|s| s.label == "class"));
    }

    #[test]
    fn test_handler_attributes() {
        let result = complete_at("<div oncl|");
        assert_eq!(result[0].label, "onclick");
        assert_eq!(result[0].kind, SuggestionKind::Handler);
    }

    #[test]
    fn test_data_attributes_from_document() {
        let result = complete_at("<p data-role=\"x\"></p><div |>");
        assert!(result.iter().any(|s| s.label == "data-"));
        let role = find(&result, "data-role");
        assert_eq!(role.insert_text, "data-role=\"$1\"");
    }

    // =========================================================================
    // Attribute values
    // =========================================================================

    #[test]
    fn test_values_after_assign() {
        let result = complete_at("<div dir=|");
        assert_eq!(labels(&result), vec!["auto", "ltr", "rtl"]);
        assert_eq!(result[0].insert_text, "\"auto\"");
        assert_eq!(result[0].replace, Span::new(9, 9));
    }

    #[test]
    fn test_values_inside_quotes() {
        let result = complete_at("<div dir=\"r|\">");
        assert_eq!(result[0].label, "rtl");
        assert_eq!(result[0].insert_text, "rtl");
        assert_eq!(result[0].replace, Span::new(10, 11));
    }

    #[test]
    fn test_values_replace_word_under_cursor() {
        let result = complete_at("<input type=\"te|xt\">");
        let text = find(&result, "text");
        assert_eq!(text.replace, Span::new(13, 17));
    }

    #[test]
    fn test_free_form_values_are_empty() {
        assert!(complete_at("<div id=\"|\">").is_empty());
    }

    // =========================================================================
    // Content and bounds
    // =========================================================================

    #[test]
    fn test_content_is_empty() {
        assert!(complete_at("<div>some |text</div>").is_empty());
        assert!(complete_at("hello |").is_empty());
    }

    #[test]
    fn test_out_of_range_offset() {
        let vocab = DataVocabulary::html();
        let doc = parse("<d", vocab);
        assert!(complete("<d", &doc, 3, vocab, &CompletionConfig::default()).is_empty());
        let doc = parse("<é", vocab);
        assert!(complete("<é", &doc, 2, vocab, &CompletionConfig::default()).is_empty());
    }

    #[test]
    fn test_inside_comment_is_empty() {
        assert!(complete_at("<!-- <di| -->").is_empty());
    }

    // =========================================================================
    // tag_complete / quote_complete
    // =========================================================================

    fn tag_complete_at(marked: &str) -> Option<String> {
        let offset = marked.find('|').expect("cursor marker");
        let text = marked.replacen('|', "", 1);
        let vocab = DataVocabulary::html();
        let doc = parse(&text, vocab);
        tag_complete(&text, &doc, offset, vocab)
    }

    fn quote_complete_at(marked: &str, config: &CompletionConfig) -> Option<String> {
        let offset = marked.find('|').expect("cursor marker");
        let text = marked.replacen('|', "", 1);
        let vocab = DataVocabulary::html();
        let doc = parse(&text, vocab);
        quote_complete(&text, &doc, offset, vocab, config)
    }

    #[test]
    fn test_tag_complete_after_start_tag() {
        assert_eq!(tag_complete_at("<div>|").as_deref(), Some("$0</div>"));
        assert_eq!(tag_complete_at("<div class=\"a\">|").as_deref(), Some("$0</div>"));
        assert_eq!(tag_complete_at("<br>|"), None);
        assert_eq!(tag_complete_at("<div/>|"), None);
        assert_eq!(tag_complete_at("a>|"), None);
    }

    #[test]
    fn test_tag_complete_after_end_tag_open() {
        assert_eq!(tag_complete_at("<div></|").as_deref(), Some("div>"));
        assert_eq!(tag_complete_at("<div></|>").as_deref(), Some("div"));
        assert_eq!(tag_complete_at("<div><p></p></|").as_deref(), Some("div>"));
        assert_eq!(tag_complete_at("</|"), None);
    }

    #[test]
    fn test_quote_complete() {
        let config = CompletionConfig::default();
        assert_eq!(quote_complete_at("<div class=|", &config).as_deref(), Some("\"$1\""));
        assert_eq!(quote_complete_at("<div class=|>", &config).as_deref(), Some("\"$1\""));
        assert_eq!(quote_complete_at("<div class=|\"a\">", &config), None);
        assert_eq!(quote_complete_at("a=|", &config), None);

        let single = CompletionConfig {
            attribute_default_value: AttributeDefaultValue::SingleQuotes,
            ..CompletionConfig::default()
        };
        assert_eq!(quote_complete_at("<div class=|", &single).as_deref(), Some("'$1'"));
        let empty = CompletionConfig {
            attribute_default_value: AttributeDefaultValue::Empty,
            ..CompletionConfig::default()
        };
        assert_eq!(quote_complete_at("<div class=|", &empty), None);
    }
}
