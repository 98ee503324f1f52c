//! Built-in HTML vocabulary.

use std::sync::LazyLock;

use crate::data::VocabularyData;
use crate::vocabulary::DataVocabulary;

/// HTML5 void elements (no children, no closing tag).
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "menuitem",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is raw text.
pub const EMBEDDED_ELEMENTS: &[&str] = &["script", "style"];

/// Resource-locating attributes beyond the universal `src` and `href`.
pub const PATH_ATTRIBUTES: &[(&str, &str)] = &[
    ("body", "background"),
    ("blockquote", "cite"),
    ("del", "cite"),
    ("form", "action"),
    ("frame", "longdesc"),
    ("img", "longdesc"),
    ("ins", "cite"),
    ("object", "data"),
    ("q", "cite"),
    ("button", "formaction"),
    ("command", "icon"),
    ("html", "manifest"),
    ("input", "formaction"),
    ("video", "poster"),
];

const HTML_DATA: &str = include_str!("../data/html.json");

static HTML: LazyLock<DataVocabulary> = LazyLock::new(|| {
    let data = VocabularyData::from_json(HTML_DATA).expect("built-in HTML data is valid");
    let mut vocab = DataVocabulary::from_data(&data);
    vocab.mark_void(VOID_ELEMENTS);
    vocab.mark_embedded(EMBEDDED_ELEMENTS);
    vocab.mark_references(PATH_ATTRIBUTES);
    vocab
});

impl DataVocabulary {
    /// The built-in HTML vocabulary, parsed on first use.
    pub fn html() -> &'static DataVocabulary {
        &HTML
    }
}
