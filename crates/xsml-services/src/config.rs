//! Service configuration, loaded from `xsml.toml`.
//!
//! ```toml
//! [completion]
//! attribute_default_value = "singlequotes"
//! hide_auto_complete_proposals = false
//!
//! [folding]
//! range_limit = 5000
//!
//! [vocabulary]
//! use_default_data = true
//! custom_data = ["xr.json"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xsml_vocabulary::{DataVocabulary, VocabularyData, VocabularyError};

/// Error raised while loading configuration or the vocabulary it names.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub completion: CompletionConfig,
    pub folding: FoldingConfig,
    pub vocabulary: VocabularyConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeDefaultValue {
    /// `name="$0"`
    #[default]
    DoubleQuotes,
    /// `name='$0'`
    SingleQuotes,
    /// `name=$0`
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub attribute_default_value: AttributeDefaultValue,
    /// Suppress the `</tag>` proposal offered right after a start tag's `>`.
    pub hide_auto_complete_proposals: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldingConfig {
    /// Keep at most this many ranges, dropping the innermost levels first.
    pub range_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Start from the built-in HTML data.
    pub use_default_data: bool,
    /// Custom data files merged after the built-in set. Relative paths
    /// resolve against the config file's directory.
    pub custom_data: Vec<PathBuf>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            use_default_data: true,
            custom_data: Vec::new(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read a config file, resolving `custom_data` paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&source)?;
        if let Some(dir) = path.parent() {
            for data in &mut config.vocabulary.custom_data {
                if data.is_relative() {
                    *data = dir.join(&*data);
                }
            }
        }
        tracing::debug!(target: "xsml::config", path = %path.display(), "loaded config");
        Ok(config)
    }
}

impl VocabularyConfig {
    /// Build the vocabulary this configuration describes.
    pub fn build(&self) -> Result<DataVocabulary, ConfigError> {
        let mut vocab = if self.use_default_data {
            DataVocabulary::html().clone()
        } else {
            DataVocabulary::new()
        };
        for path in &self.custom_data {
            vocab.merge(&VocabularyData::load(path)?);
        }
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xsml_vocabulary::Vocabulary;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_toml("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(
            config.completion.attribute_default_value,
            AttributeDefaultValue::DoubleQuotes
        );
        assert!(config.vocabulary.use_default_data);
        assert_eq!(config.folding.range_limit, None);
    }

    #[test]
    fn test_full_config() {
        let config = ServiceConfig::from_toml(
            r#"
            [completion]
            attribute_default_value = "singlequotes"
            hide_auto_complete_proposals = true

            [folding]
            range_limit = 10

            [vocabulary]
            use_default_data = false
            custom_data = ["/data/xr.json"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.completion.attribute_default_value,
            AttributeDefaultValue::SingleQuotes
        );
        assert!(config.completion.hide_auto_complete_proposals);
        assert_eq!(config.folding.range_limit, Some(10));
        assert!(!config.vocabulary.use_default_data);
        assert_eq!(config.vocabulary.custom_data, vec![PathBuf::from("/data/xr.json")]);
    }

    #[test]
    fn test_invalid_config() {
        let err = ServiceConfig::from_toml("[completion]\nattribute_default_value = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_build_without_default_data() {
        let vocab = VocabularyConfig {
            use_default_data: false,
            custom_data: Vec::new(),
        }
        .build()
        .unwrap();
        assert!(vocab.tags().is_empty());
    }

    #[test]
    fn test_build_reports_missing_custom_data() {
        let err = VocabularyConfig {
            use_default_data: true,
            custom_data: vec![PathBuf::from("/nonexistent/xsml-data.json")],
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Vocabulary(VocabularyError::Io { .. })));
    }
}
