//! Document links from reference-bearing attribute values.
//!
//! Resolution of relative references is left to a [`DocumentContext`];
//! [`UriContext`] is a plain URI-joining implementation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use xsml_lexer::Span;
use xsml_parser::{Attribute, Document};
use xsml_vocabulary::Vocabulary;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w[\w\d+.-]*):").expect("valid scheme regex"));
static JAVASCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*javascript:").expect("valid javascript regex"));

/// Where links are resolved from.
pub trait DocumentContext {
    /// URI of the document being linked from.
    fn document_uri(&self) -> &str;

    /// Resolve `reference` against `base`. `None` when it cannot be resolved.
    fn resolve_reference(&self, reference: &str, base: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum LinkTarget {
    Uri(String),
    /// A `#fragment` pointing at the element with that `id` in the same document.
    Offset(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    /// The reference without its quotes.
    pub span: Span,
    pub target: LinkTarget,
}

/// Links for every reference-bearing attribute value in `document`.
///
/// The first `<base href>` becomes the resolution base for the links after
/// it. Values that are empty, multi-line, `javascript:` or of an unknown
/// scheme are skipped, as are fragments naming no element.
pub fn document_links(
    text: &str,
    document: &Document,
    vocabulary: &dyn Vocabulary,
    context: &dyn DocumentContext,
) -> Vec<DocumentLink> {
    if text.len() != document.text_len() {
        return Vec::new();
    }
    let document_uri = context.document_uri();
    let mut base: Option<String> = None;
    let mut links = Vec::new();

    for id in document.elements() {
        let node = document.node(id);
        let Some(tag) = node.tag.as_deref() else { continue };
        let mut base_candidate = base.is_none() && tag.eq_ignore_ascii_case("base");
        for attribute in &node.attributes {
            let (Some(value), Some(span)) = (attribute.value.as_deref(), attribute.value_span) else {
                continue;
            };
            if !vocabulary.is_reference_attribute(tag, &attribute.name) {
                continue;
            }
            if base_candidate {
                let reference = strip_matching_quotes(value);
                if !reference.is_empty() {
                    base = context.resolve_reference(reference, document_uri);
                }
                base_candidate = false;
                continue;
            }
            if let Some(link) = create_link(document, context, attribute, value, span, base.as_deref()) {
                links.push(link);
            }
        }
    }
    tracing::debug!(target: "xsml::links", links = links.len(), "collected document links");
    links
}

fn create_link(
    document: &Document,
    context: &dyn DocumentContext,
    attribute: &Attribute,
    value: &str,
    span: Span,
    base: Option<&str>,
) -> Option<DocumentLink> {
    let reference = strip_matching_quotes(value);
    if reference.trim().is_empty() {
        return None;
    }
    let span = if reference.len() < value.len() {
        Span::new(span.start + 1, span.end - 1)
    } else {
        span
    };

    if JAVASCRIPT.is_match(reference) || reference.contains(['\n', '\r']) {
        return None;
    }
    let reference = reference.trim_start();
    let document_uri = context.document_uri();

    let target = if let Some(scheme) = SCHEME.captures(reference).and_then(|c| c.get(1)) {
        match scheme.as_str().to_ascii_lowercase().as_str() {
            "http" | "https" => LinkTarget::Uri(reference.to_string()),
            "file" => LinkTarget::Uri(strip_query(reference).to_string()),
            _ => return None,
        }
    } else if let Some(fragment) = reference.strip_prefix('#') {
        let id = document.find_by_id(fragment)?;
        LinkTarget::Offset(document.node(id).start)
    } else if reference.starts_with("//") {
        let scheme = if document_uri.starts_with("https://") { "https" } else { "http" };
        LinkTarget::Uri(format!("{scheme}:{reference}"))
    } else {
        let resolved = context.resolve_reference(reference, base.unwrap_or(document_uri))?;
        LinkTarget::Uri(resolved)
    };
    tracing::trace!(target: "xsml::links", attribute = %attribute.name, ?target, "link");
    Some(DocumentLink { span, target })
}

/// Remove quotes only when both ends carry the same one.
fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) if value.len() >= 2 && first == last && matches!(first, b'"' | b'\'') => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

fn strip_query(uri: &str) -> &str {
    uri.find('?').map_or(uri, |i| &uri[..i])
}

/// Resolves references by joining them onto the base URI's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriContext {
    uri: String,
}

impl UriContext {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl DocumentContext for UriContext {
    fn document_uri(&self) -> &str {
        &self.uri
    }

    fn resolve_reference(&self, reference: &str, base: &str) -> Option<String> {
        join_uri(base, reference)
    }
}

/// Join `reference` onto `base`, normalising `.` and `..` segments.
/// References that carry their own scheme are returned unchanged.
pub fn join_uri(base: &str, reference: &str) -> Option<String> {
    if SCHEME.is_match(reference) {
        return Some(reference.to_string());
    }
    let authority_start = base.find("://")? + 3;
    let path_start = base[authority_start..]
        .find('/')
        .map_or(base.len(), |i| authority_start + i);
    let (origin, path) = base.split_at(path_start);
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let (reference_path, suffix) = reference
        .find(['?', '#'])
        .map_or((reference, ""), |i| reference.split_at(i));
    let mut segments: Vec<&str> = if reference_path.starts_with('/') {
        Vec::new()
    } else {
        let directory = path.rfind('/').map_or("", |i| &path[..i]);
        directory.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in reference_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    let trailing = if reference_path.ends_with('/') && !segments.is_empty() { "/" } else { "" };
    Some(format!("{origin}/{}{trailing}{suffix}", segments.join("/")))
}
