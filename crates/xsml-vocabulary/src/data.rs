//! Serde model of the custom-data JSON format.
//!
//! ```json
//! {
//!   "version": 1.1,
//!   "tags": [{ "name": "xr-model", "attributes": [{ "name": "src" }] }],
//!   "globalAttributes": [{ "name": "id" }],
//!   "valueSets": [{ "name": "b", "values": [{ "name": "true" }, { "name": "false" }] }]
//! }
//! ```
//!
//! Descriptions and references present in upstream data files are ignored.
//! `void`, `embedded`, `reference` and `children` are extensions understood
//! only by this crate.

use std::path::Path;

use serde::Deserialize;

use crate::VocabularyError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyData {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub tags: Vec<TagData>,
    #[serde(default)]
    pub global_attributes: Vec<AttributeData>,
    #[serde(default)]
    pub value_sets: Vec<ValueSetData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagData {
    pub name: String,
    #[serde(default)]
    pub void: bool,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    /// Allowed child tags. `None` means unrestricted.
    #[serde(default)]
    pub children: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeData {
    pub name: String,
    #[serde(default)]
    pub value_set: Option<String>,
    #[serde(default)]
    pub values: Vec<ValueData>,
    #[serde(default)]
    pub reference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValueData {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValueSetData {
    pub name: String,
    #[serde(default)]
    pub values: Vec<ValueData>,
}

impl VocabularyData {
    pub fn from_json(json: &str) -> Result<Self, VocabularyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a custom-data file from disk.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let json = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(target: "xsml::vocabulary", path = %path.display(), "loading custom data");
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_document() {
        let data = VocabularyData::from_json("{}").unwrap();
        assert_eq!(data, VocabularyData::default());
    }

    #[test]
    fn test_camel_case_fields() {
        let data = VocabularyData::from_json(
            r#"{
                "version": 1.1,
                "tags": [{ "name": "xr-model", "description": "ignored",
                           "attributes": [{ "name": "src", "reference": true }] }],
                "globalAttributes": [{ "name": "dir", "valueSet": "d" }],
                "valueSets": [{ "name": "d", "values": [{ "name": "ltr" }, { "name": "rtl" }] }]
            }"#,
        )
        .unwrap();
        assert_eq!(data.version, Some(1.1));
        assert_eq!(data.tags[0].name, "xr-model");
        assert!(data.tags[0].attributes[0].reference);
        assert_eq!(data.global_attributes[0].value_set.as_deref(), Some("d"));
        assert_eq!(data.value_sets[0].values.len(), 2);
    }

    #[test]
    fn test_invalid_json() {
        let err = VocabularyData::from_json("{ tags: ").unwrap_err();
        assert!(err.to_string().starts_with("invalid vocabulary data"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = VocabularyData::load(Path::new("/nonexistent/xsml-data.json")).unwrap_err();
        assert!(matches!(err, VocabularyError::Io { .. }));
    }
}
