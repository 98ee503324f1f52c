//! XSML Vocabulary
//!
//! The tag/attribute/value tables that guide scanning, tree building and
//! completion. The engine only ever talks to the [`Vocabulary`] trait; the
//! data-driven [`DataVocabulary`] implements it over the HTML custom-data
//! JSON format, and [`DataVocabulary::html`] provides the built-in set.
//!
//! Lookups are permissive: an unknown tag or attribute yields empty results,
//! never an error.
//!
//! # Example
//!
//! ```
//! use xsml_vocabulary::{DataVocabulary, Vocabulary};
//!
//! let vocab = DataVocabulary::html();
//! assert!(vocab.is_void("br"));
//! assert!(vocab.is_embedded_content("script"));
//! assert!(vocab.values_for("input", "type").contains(&"checkbox"));
//! ```

pub mod data;
pub mod html;
pub mod vocabulary;

pub use data::{AttributeData, TagData, ValueData, ValueSetData, VocabularyData};
pub use vocabulary::DataVocabulary;

use std::path::PathBuf;

/// Value set marking an attribute that takes no value (`hidden`, `disabled`).
pub const VALUELESS_SET: &str = "v";

/// Value set marking an event handler attribute (`onclick`).
pub const HANDLER_SET: &str = "handler";

/// Error raised while loading custom vocabulary data.
#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vocabulary data: {0}")]
    Json(#[from] serde_json::Error),
}

/// An attribute known for some tag, as returned by [`Vocabulary::attributes_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo<'a> {
    pub name: &'a str,
    pub value_set: Option<&'a str>,
}

impl AttributeInfo<'_> {
    /// Attributes like `hidden` that are written without `=value`.
    pub fn is_valueless(&self) -> bool {
        self.value_set == Some(VALUELESS_SET)
    }

    pub fn is_handler(&self) -> bool {
        self.value_set == Some(HANDLER_SET)
    }
}

/// Lookup table of known tags, attributes and attribute values.
///
/// Implementations must be pure: the same question always gets the same
/// answer for the lifetime of the value.
pub trait Vocabulary {
    /// All known tag names, in declaration order.
    fn tags(&self) -> Vec<&str>;

    fn is_known_tag(&self, name: &str) -> bool;

    /// Attributes valid on `tag`: the tag's own attributes followed by the
    /// global ones. Unknown tags get only the global attributes.
    fn attributes_for(&self, tag: &str) -> Vec<AttributeInfo<'_>>;

    /// Allowed values for `attribute` on `tag`. Empty when the attribute is
    /// free-form or unknown.
    fn values_for(&self, tag: &str, attribute: &str) -> Vec<&str>;

    /// Void tags never have children or a closing tag.
    fn is_void(&self, tag: &str) -> bool;

    /// Tags whose content is opaque text up to the verbatim closing tag.
    fn is_embedded_content(&self, tag: &str) -> bool;

    /// Attributes whose value locates another resource (`src`, `href`, ...).
    fn is_reference_attribute(&self, tag: &str, attribute: &str) -> bool {
        let _ = tag;
        attribute.eq_ignore_ascii_case("src") || attribute.eq_ignore_ascii_case("href")
    }

    /// Content-model hook used to filter tag completions.
    fn allows_child(&self, parent: &str, child: &str) -> bool {
        let _ = (parent, child);
        true
    }

    /// Case rule for pairing start and end tags.
    fn tag_names_match(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

impl<V: Vocabulary + ?Sized> Vocabulary for &V {
    fn tags(&self) -> Vec<&str> {
        (**self).tags()
    }

    fn is_known_tag(&self, name: &str) -> bool {
        (**self).is_known_tag(name)
    }

    fn attributes_for(&self, tag: &str) -> Vec<AttributeInfo<'_>> {
        (**self).attributes_for(tag)
    }

    fn values_for(&self, tag: &str, attribute: &str) -> Vec<&str> {
        (**self).values_for(tag, attribute)
    }

    fn is_void(&self, tag: &str) -> bool {
        (**self).is_void(tag)
    }

    fn is_embedded_content(&self, tag: &str) -> bool {
        (**self).is_embedded_content(tag)
    }

    fn is_reference_attribute(&self, tag: &str, attribute: &str) -> bool {
        (**self).is_reference_attribute(tag, attribute)
    }

    fn allows_child(&self, parent: &str, child: &str) -> bool {
        (**self).allows_child(parent, child)
    }

    fn tag_names_match(&self, a: &str, b: &str) -> bool {
        (**self).tag_names_match(a, b)
    }
}
