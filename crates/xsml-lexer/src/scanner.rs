use serde::Serialize;
use xsml_vocabulary::Vocabulary;

use crate::token::{Span, Token, TokenKind};
use crate::ScanError;

/// Where the scanner currently sits in the markup grammar.
///
/// Exposed so callers that restart the scanner mid-document (completion)
/// can tell, for example, a whitespace run between attributes from one
/// right after `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScannerState {
    WithinContent,
    AfterOpeningStartTag,
    AfterOpeningEndTag,
    WithinDoctype,
    /// Inside a start tag's attribute list.
    WithinTag,
    WithinEndTag,
    WithinComment,
    /// Inside the opaque body of an embedded element.
    WithinEmbeddedContent,
    AfterAttributeName,
    BeforeAttributeValue,
}

/// `type` values that keep a script's body scanned as markup.
const HTML_SCRIPT_TYPES: &[&str] = &["text/x-handlebars-template", "text/html"];

/// Start a scanner at `offset`, within content.
pub fn scan<'a>(source: &'a str, offset: usize, vocabulary: &'a dyn Vocabulary) -> Scanner<'a> {
    Scanner::new(source, offset, vocabulary)
}

/// XSML markup scanner.
///
/// A lazy, restartable state machine over the source bytes. Every call to
/// [`Scanner::next_token`] produces exactly one token; iteration ends after the
/// single `Eof` token. Tokens borrow the source, so scanning allocates
/// nothing per token.
///
/// Structural characters are all ASCII, so the cursor moves bytewise and
/// only steps over whole characters where non-ASCII text may appear
/// (attribute names, unquoted values, unexpected characters).
pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: ScannerState,
    vocabulary: &'a dyn Vocabulary,
    emit_pseudo_close_tags: bool,
    last_tag: &'a str,
    last_attribute_name: &'a str,
    last_type_value: Option<&'a str>,
    embedded_tag: Option<&'a str>,
    has_space_after_tag: bool,
    done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEscape {
    Normal,
    Escaped,
    DoubleEscaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptMarker {
    CommentOpen,
    CommentClose,
    Tag { closing: bool },
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at `offset`, within content.
    ///
    /// An offset past the end or inside a multi-byte character is clamped to
    /// the end of the source; use [`Scanner::try_new`] to reject it instead.
    pub fn new(source: &'a str, offset: usize, vocabulary: &'a dyn Vocabulary) -> Self {
        let pos = if source.is_char_boundary(offset) {
            offset
        } else {
            source.len()
        };
        Self {
            source,
            bytes: source.as_bytes(),
            pos,
            state: ScannerState::WithinContent,
            vocabulary,
            emit_pseudo_close_tags: false,
            last_tag: "",
            last_attribute_name: "",
            last_type_value: None,
            embedded_tag: None,
            has_space_after_tag: false,
            done: false,
        }
    }

    /// Like [`Scanner::new`] but fails on an offset outside the source.
    pub fn try_new(
        source: &'a str,
        offset: usize,
        vocabulary: &'a dyn Vocabulary,
    ) -> Result<Self, ScanError> {
        if !source.is_char_boundary(offset) {
            return Err(ScanError::OffsetOutOfBounds {
                offset,
                len: source.len(),
            });
        }
        Ok(Self::new(source, offset, vocabulary))
    }

    /// Restart in a specific state instead of `WithinContent`.
    pub fn with_state(mut self, state: ScannerState) -> Self {
        self.state = state;
        self
    }

    /// Emit zero-length close tokens when a `<` interrupts an unterminated
    /// start or end tag.
    pub fn with_pseudo_close_tags(mut self, emit: bool) -> Self {
        self.emit_pseudo_close_tags = emit;
        self
    }

    /// State after the most recently scanned token.
    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Scan the next token. Keeps returning `Eof` once the input is exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        let token = self.internal_scan();
        tracing::trace!(
            target: "xsml::lexer",
            kind = ?token.kind,
            start = token.span.start,
            end = token.span.end,
            "token"
        );
        token
    }

    fn internal_scan(&mut self) -> Token<'a> {
        loop {
            let offset = self.pos;
            if self.is_at_end() {
                return self.finish(offset, TokenKind::Eof);
            }

            let error = match self.state {
                ScannerState::WithinComment => {
                    if self.advance_if_str("-->") {
                        self.state = ScannerState::WithinContent;
                        return self.finish(offset, TokenKind::EndComment);
                    }
                    let terminated = self.advance_until_str("-->");
                    let token = self.finish(offset, TokenKind::Comment);
                    return if terminated {
                        token
                    } else {
                        token.with_error(ScanError::UnterminatedComment)
                    };
                }

                ScannerState::WithinDoctype => {
                    if self.advance_if_byte(b'>') {
                        self.state = ScannerState::WithinContent;
                        return self.finish(offset, TokenKind::EndDoctype);
                    }
                    self.advance_until_byte(b'>');
                    return self.finish(offset, TokenKind::Doctype);
                }

                ScannerState::WithinContent => {
                    if self.advance_if_byte(b'<') {
                        if self.peek() == Some(b'!') {
                            if self.advance_if_str("!--") {
                                self.state = ScannerState::WithinComment;
                                return self.finish(offset, TokenKind::StartComment);
                            }
                            self.pos += 1; // consume `!`
                            self.advance_if_str_ignore_case("doctype");
                            self.state = ScannerState::WithinDoctype;
                            return self.finish(offset, TokenKind::StartDoctype);
                        }
                        if self.advance_if_byte(b'/') {
                            self.state = ScannerState::AfterOpeningEndTag;
                            return self.finish(offset, TokenKind::EndTagOpen);
                        }
                        self.state = ScannerState::AfterOpeningStartTag;
                        return self.finish(offset, TokenKind::StartTagOpen);
                    }
                    self.advance_until_byte(b'<');
                    return self.finish(offset, TokenKind::Content);
                }

                ScannerState::AfterOpeningEndTag => {
                    if self.next_element_name() > 0 {
                        self.state = ScannerState::WithinEndTag;
                        return self.finish(offset, TokenKind::EndTag);
                    }
                    if self.skip_whitespace() {
                        return self
                            .finish(offset, TokenKind::Whitespace)
                            .with_error(ScanError::TagNameNotAdjacent);
                    }
                    self.state = ScannerState::WithinEndTag;
                    self.advance_until_byte(b'>');
                    if offset < self.pos {
                        return self
                            .finish(offset, TokenKind::Unknown)
                            .with_error(ScanError::EndTagNameExpected);
                    }
                    continue;
                }

                ScannerState::WithinEndTag => {
                    if self.skip_whitespace() {
                        return self.finish(offset, TokenKind::Whitespace);
                    }
                    if self.advance_if_byte(b'>') {
                        self.state = ScannerState::WithinContent;
                        return self.finish(offset, TokenKind::EndTagClose);
                    }
                    if self.emit_pseudo_close_tags && self.peek() == Some(b'<') {
                        self.state = ScannerState::WithinContent;
                        return self
                            .finish(offset, TokenKind::EndTagClose)
                            .with_error(ScanError::ClosingBracketMissing);
                    }
                    ScanError::ClosingBracketExpected
                }

                ScannerState::AfterOpeningStartTag => {
                    let len = self.next_element_name();
                    self.last_tag = &self.source[offset..offset + len];
                    self.last_type_value = None;
                    self.last_attribute_name = "";
                    if len > 0 {
                        self.has_space_after_tag = false;
                        self.state = ScannerState::WithinTag;
                        return self.finish(offset, TokenKind::StartTag);
                    }
                    if self.skip_whitespace() {
                        return self
                            .finish(offset, TokenKind::Whitespace)
                            .with_error(ScanError::TagNameNotAdjacent);
                    }
                    self.state = ScannerState::WithinTag;
                    self.advance_until_byte(b'>');
                    if offset < self.pos {
                        return self
                            .finish(offset, TokenKind::Unknown)
                            .with_error(ScanError::StartTagNameExpected);
                    }
                    continue;
                }

                ScannerState::WithinTag => {
                    if self.skip_whitespace() {
                        self.has_space_after_tag = true;
                        return self.finish(offset, TokenKind::Whitespace);
                    }
                    if self.has_space_after_tag && self.next_attribute_name() > 0 {
                        self.last_attribute_name = &self.source[offset..self.pos];
                        self.has_space_after_tag = false;
                        self.state = ScannerState::AfterAttributeName;
                        return self.finish(offset, TokenKind::AttributeName);
                    }
                    if self.advance_if_str("/>") {
                        self.state = ScannerState::WithinContent;
                        return self.finish(offset, TokenKind::StartTagSelfClose);
                    }
                    if self.advance_if_byte(b'>') {
                        self.state = self.state_after_start_tag();
                        return self.finish(offset, TokenKind::StartTagClose);
                    }
                    if self.emit_pseudo_close_tags && self.peek() == Some(b'<') {
                        self.state = ScannerState::WithinContent;
                        return self
                            .finish(offset, TokenKind::StartTagClose)
                            .with_error(ScanError::ClosingBracketMissing);
                    }
                    self.advance_char();
                    return self
                        .finish(offset, TokenKind::Unknown)
                        .with_error(ScanError::UnexpectedCharacter);
                }

                ScannerState::AfterAttributeName => {
                    if self.skip_whitespace() {
                        self.has_space_after_tag = true;
                        return self.finish(offset, TokenKind::Whitespace);
                    }
                    if self.advance_if_byte(b'=') {
                        self.state = ScannerState::BeforeAttributeValue;
                        return self.finish(offset, TokenKind::DelimiterAssign);
                    }
                    // valueless attribute
                    self.state = ScannerState::WithinTag;
                    continue;
                }

                ScannerState::BeforeAttributeValue => {
                    if self.skip_whitespace() {
                        return self.finish(offset, TokenKind::Whitespace);
                    }
                    let mut len = self.next_unquoted_value();
                    if len > 0 {
                        // `<a href=foo/>`: the slash belongs to the self-close
                        if self.peek() == Some(b'>') && self.bytes[self.pos - 1] == b'/' {
                            self.pos -= 1;
                            len -= 1;
                        }
                        if self.last_attribute_name.eq_ignore_ascii_case("type") {
                            self.last_type_value = Some(&self.source[offset..self.pos]);
                        }
                        if len > 0 {
                            self.state = ScannerState::WithinTag;
                            self.has_space_after_tag = false;
                            return self.finish(offset, TokenKind::AttributeValue);
                        }
                    }
                    match self.peek() {
                        Some(quote @ (b'"' | b'\'')) => {
                            self.pos += 1;
                            let terminated = self.advance_until_byte(quote);
                            let content_end = self.pos;
                            if terminated {
                                self.pos += 1;
                            }
                            if self.last_attribute_name.eq_ignore_ascii_case("type") {
                                self.last_type_value = Some(&self.source[offset + 1..content_end]);
                            }
                            self.state = ScannerState::WithinTag;
                            self.has_space_after_tag = false;
                            let token = self.finish(offset, TokenKind::AttributeValue);
                            return if terminated {
                                token
                            } else {
                                token.with_error(ScanError::UnterminatedQuote)
                            };
                        }
                        _ => {
                            // no value after `=`
                            self.state = ScannerState::WithinTag;
                            self.has_space_after_tag = false;
                            continue;
                        }
                    }
                }

                ScannerState::WithinEmbeddedContent => {
                    self.scan_embedded_content();
                    self.state = ScannerState::WithinContent;
                    if offset < self.pos {
                        return self.finish(offset, TokenKind::EmbeddedContent);
                    }
                    continue;
                }
            };

            self.advance_char();
            self.state = ScannerState::WithinContent;
            return self.finish(offset, TokenKind::Unknown).with_error(error);
        }
    }

    // --- Embedded regions ---

    fn state_after_start_tag(&mut self) -> ScannerState {
        let tag = self.last_tag;
        if tag.is_empty() || !self.vocabulary.is_embedded_content(tag) {
            return ScannerState::WithinContent;
        }
        if tag.eq_ignore_ascii_case("script")
            && self
                .last_type_value
                .is_some_and(|t| HTML_SCRIPT_TYPES.contains(&t))
        {
            return ScannerState::WithinContent;
        }
        self.embedded_tag = Some(tag);
        ScannerState::WithinEmbeddedContent
    }

    /// Advance to the `<` of the embedded element's closing tag, or to the end.
    fn scan_embedded_content(&mut self) {
        match self.embedded_tag {
            Some(tag) if tag.eq_ignore_ascii_case("script") => self.scan_script_content(tag),
            Some(tag) => self.advance_until_closing_tag(tag),
            None => {
                self.advance_until_str("</");
            }
        }
    }

    /// Script bodies honour `<!-- <script> ... </script> -->` escaping.
    fn scan_script_content(&mut self, tag: &str) {
        let mut escape = ScriptEscape::Normal;
        while !self.is_at_end() {
            let Some((start, end, marker)) = self.find_script_marker(tag) else {
                self.pos = self.bytes.len();
                return;
            };
            self.pos = end;
            match marker {
                ScriptMarker::CommentOpen => {
                    if escape == ScriptEscape::Normal {
                        escape = ScriptEscape::Escaped;
                    }
                }
                ScriptMarker::CommentClose => escape = ScriptEscape::Normal,
                ScriptMarker::Tag { closing: false } => {
                    if escape == ScriptEscape::Escaped {
                        escape = ScriptEscape::DoubleEscaped;
                    }
                }
                ScriptMarker::Tag { closing: true } => {
                    if escape == ScriptEscape::DoubleEscaped {
                        escape = ScriptEscape::Escaped;
                    } else {
                        self.pos = start;
                        return;
                    }
                }
            }
        }
    }

    /// Leftmost of `<!--`, `-->` or `</?tag\s*/?>?` from the cursor.
    fn find_script_marker(&self, tag: &str) -> Option<(usize, usize, ScriptMarker)> {
        let len = self.bytes.len();
        let mut i = self.pos;
        while i < len {
            match self.bytes[i] {
                b'<' => {
                    if self.bytes[i..].starts_with(b"<!--") {
                        return Some((i, i + 4, ScriptMarker::CommentOpen));
                    }
                    let mut j = i + 1;
                    let closing = self.bytes.get(j) == Some(&b'/');
                    if closing {
                        j += 1;
                    }
                    if self.starts_with_ignore_case_at(j, tag) {
                        j += tag.len();
                        while j < len && self.bytes[j].is_ascii_whitespace() {
                            j += 1;
                        }
                        if self.bytes.get(j) == Some(&b'/') {
                            j += 1;
                        }
                        if self.bytes.get(j) == Some(&b'>') {
                            j += 1;
                        }
                        return Some((i, j, ScriptMarker::Tag { closing }));
                    }
                }
                b'-' if self.bytes[i..].starts_with(b"-->") => {
                    return Some((i, i + 3, ScriptMarker::CommentClose));
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    fn advance_until_closing_tag(&mut self, tag: &str) {
        let len = self.bytes.len();
        let mut i = self.pos;
        while i + 1 < len {
            if self.bytes[i] == b'<'
                && self.bytes[i + 1] == b'/'
                && self.starts_with_ignore_case_at(i + 2, tag)
            {
                self.pos = i;
                return;
            }
            i += 1;
        }
        self.pos = len;
    }

    // --- Names and values ---

    /// `[_:A-Za-z0-9][_:A-Za-z0-9.-]*`, returns the consumed length.
    fn next_element_name(&mut self) -> usize {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b':' => self.pos += 1,
            _ => return 0,
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.') {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos - start
    }

    fn next_attribute_name(&mut self) -> usize {
        self.advance_while_char(is_attribute_name_char)
    }

    fn next_unquoted_value(&mut self) -> usize {
        self.advance_while_char(|c| {
            !(c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '=' | '<' | '>'))
        })
    }

    // --- Helpers ---

    fn finish(&self, start: usize, kind: TokenKind) -> Token<'a> {
        Token::new(
            kind,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Step over one whole character.
    fn advance_char(&mut self) {
        if let Some(c) = self.source[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while_char(&mut self, accept: impl Fn(char) -> bool) -> usize {
        let rest = &self.source[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        len
    }

    fn advance_if_byte(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance_if_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn advance_if_str_ignore_case(&mut self, s: &str) -> bool {
        if self.starts_with_ignore_case_at(self.pos, s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn starts_with_ignore_case_at(&self, at: usize, needle: &str) -> bool {
        let needle = needle.as_bytes();
        self.bytes.len() >= at + needle.len()
            && self.bytes[at..at + needle.len()].eq_ignore_ascii_case(needle)
    }

    /// Move to the next `b`; to the end of input when there is none.
    fn advance_until_byte(&mut self, b: u8) -> bool {
        match self.bytes[self.pos..].iter().position(|&c| c == b) {
            Some(rel) => {
                self.pos += rel;
                true
            }
            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    fn advance_until_str(&mut self, s: &str) -> bool {
        match self.source[self.pos..].find(s) {
            Some(rel) => {
                self.pos += rel;
                true
            }
            None => {
                self.pos = self.bytes.len();
                false
            }
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\x0C' | b'\r')) {
            self.pos += 1;
        }
        self.pos > start
    }
}

fn is_attribute_name_char(c: char) -> bool {
    !(c.is_whitespace()
        || matches!(
            c,
            '"' | '\'' | '>' | '<' | '/' | '=' | '\0'..='\x0F' | '\x7F'..='\u{9F}'
        ))
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}
