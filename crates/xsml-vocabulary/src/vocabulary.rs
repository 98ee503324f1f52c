use std::collections::HashMap;

use crate::data::{AttributeData, TagData, VocabularyData};
use crate::{AttributeInfo, Vocabulary, VocabularyError};

/// A [`Vocabulary`] backed by one or more custom-data sets.
///
/// Data sets are merged in the order they are added: the first declaration
/// of a tag, attribute or value set wins, later ones only contribute what is
/// missing.
#[derive(Debug, Clone, Default)]
pub struct DataVocabulary {
    tags: Vec<TagEntry>,
    tag_index: HashMap<String, usize>,
    global_attributes: Vec<AttributeEntry>,
    value_sets: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
struct TagEntry {
    name: String,
    void: bool,
    embedded: bool,
    attributes: Vec<AttributeEntry>,
    children: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
struct AttributeEntry {
    name: String,
    value_set: Option<String>,
    values: Vec<String>,
    reference: bool,
}

impl From<&AttributeData> for AttributeEntry {
    fn from(data: &AttributeData) -> Self {
        Self {
            name: data.name.clone(),
            value_set: data.value_set.clone(),
            values: data.values.iter().map(|v| v.name.clone()).collect(),
            reference: data.reference,
        }
    }
}

impl From<&TagData> for TagEntry {
    fn from(data: &TagData) -> Self {
        Self {
            name: data.name.clone(),
            void: data.void,
            embedded: data.embedded,
            attributes: data.attributes.iter().map(AttributeEntry::from).collect(),
            children: data.children.clone(),
        }
    }
}

fn merge_attributes(into: &mut Vec<AttributeEntry>, from: &[AttributeData]) {
    for attr in from {
        if !into.iter().any(|a| a.name.eq_ignore_ascii_case(&attr.name)) {
            into.push(AttributeEntry::from(attr));
        }
    }
}

impl DataVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from a single data set.
    pub fn from_data(data: &VocabularyData) -> Self {
        let mut vocab = Self::new();
        vocab.merge(data);
        vocab
    }

    pub fn from_json(json: &str) -> Result<Self, VocabularyError> {
        Ok(Self::from_data(&VocabularyData::from_json(json)?))
    }

    /// Add another data set; existing declarations take precedence.
    pub fn merge(&mut self, data: &VocabularyData) {
        for tag in &data.tags {
            let key = tag.name.to_ascii_lowercase();
            match self.tag_index.get(&key) {
                Some(&idx) => {
                    let entry = &mut self.tags[idx];
                    entry.void |= tag.void;
                    entry.embedded |= tag.embedded;
                    merge_attributes(&mut entry.attributes, &tag.attributes);
                    if entry.children.is_none() {
                        entry.children = tag.children.clone();
                    }
                }
                None => {
                    self.tag_index.insert(key, self.tags.len());
                    self.tags.push(TagEntry::from(tag));
                }
            }
        }
        merge_attributes(&mut self.global_attributes, &data.global_attributes);
        for set in &data.value_sets {
            self.value_sets
                .entry(set.name.clone())
                .or_insert_with(|| set.values.iter().map(|v| v.name.clone()).collect());
        }
    }

    /// Mark tags as void, creating entries for unknown ones.
    pub fn mark_void(&mut self, names: &[&str]) {
        for name in names {
            let idx = self.ensure_tag(name);
            self.tags[idx].void = true;
        }
    }

    /// Mark tags as embedded content, creating entries for unknown ones.
    pub fn mark_embedded(&mut self, names: &[&str]) {
        for name in names {
            let idx = self.ensure_tag(name);
            self.tags[idx].embedded = true;
        }
    }

    /// Flag `(tag, attribute)` pairs as reference-bearing.
    pub fn mark_references(&mut self, pairs: &[(&str, &str)]) {
        for (tag, attribute) in pairs {
            let idx = self.ensure_tag(tag);
            let attributes = &mut self.tags[idx].attributes;
            match attributes
                .iter_mut()
                .find(|a| a.name.eq_ignore_ascii_case(attribute))
            {
                Some(attr) => attr.reference = true,
                None => attributes.push(AttributeEntry {
                    name: attribute.to_string(),
                    value_set: None,
                    values: Vec::new(),
                    reference: true,
                }),
            }
        }
    }

    fn ensure_tag(&mut self, name: &str) -> usize {
        let key = name.to_ascii_lowercase();
        if let Some(&idx) = self.tag_index.get(&key) {
            return idx;
        }
        let idx = self.tags.len();
        self.tag_index.insert(key, idx);
        self.tags.push(TagEntry {
            name: name.to_string(),
            void: false,
            embedded: false,
            attributes: Vec::new(),
            children: None,
        });
        idx
    }

    fn tag(&self, name: &str) -> Option<&TagEntry> {
        // Tag names are short; avoid allocating for the common lowercase case.
        let idx = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.tag_index.get(&name.to_ascii_lowercase())
        } else {
            self.tag_index.get(name)
        };
        idx.map(|&i| &self.tags[i])
    }

    fn attribute(&self, tag: &str, attribute: &str) -> Option<&AttributeEntry> {
        self.tag(tag)
            .and_then(|t| {
                t.attributes
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(attribute))
            })
            .or_else(|| {
                self.global_attributes
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(attribute))
            })
    }
}

impl Vocabulary for DataVocabulary {
    fn tags(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    fn is_known_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }

    fn attributes_for(&self, tag: &str) -> Vec<AttributeInfo<'_>> {
        let own = self.tag(tag).map(|t| t.attributes.as_slice()).unwrap_or(&[]);
        own.iter()
            .chain(self.global_attributes.iter())
            .map(|a| AttributeInfo {
                name: &a.name,
                value_set: a.value_set.as_deref(),
            })
            .collect()
    }

    fn values_for(&self, tag: &str, attribute: &str) -> Vec<&str> {
        let Some(attr) = self.attribute(tag, attribute) else {
            return Vec::new();
        };
        if !attr.values.is_empty() {
            return attr.values.iter().map(String::as_str).collect();
        }
        attr.value_set
            .as_ref()
            .and_then(|set| self.value_sets.get(set))
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn is_void(&self, tag: &str) -> bool {
        self.tag(tag).is_some_and(|t| t.void)
    }

    fn is_embedded_content(&self, tag: &str) -> bool {
        self.tag(tag).is_some_and(|t| t.embedded)
    }

    fn is_reference_attribute(&self, tag: &str, attribute: &str) -> bool {
        if attribute.eq_ignore_ascii_case("src") || attribute.eq_ignore_ascii_case("href") {
            return true;
        }
        self.tag(tag).is_some_and(|t| {
            t.attributes
                .iter()
                .any(|a| a.reference && a.name.eq_ignore_ascii_case(attribute))
        })
    }

    fn allows_child(&self, parent: &str, child: &str) -> bool {
        match self.tag(parent).and_then(|t| t.children.as_ref()) {
            Some(children) => children.iter().any(|c| c.eq_ignore_ascii_case(child)),
            None => true,
        }
    }
}
