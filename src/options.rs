//! Conversion options, loadable from JSON.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// How the input should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Treat the input as HTML if it contains anything tag-shaped, else Markdown.
    #[default]
    Auto,
    Html,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub format: InputFormat,
    /// Placeholder paragraph text for empty input.
    pub empty_placeholder: String,
    /// Placeholder paragraph text when nothing usable was found.
    pub unparsable_placeholder: String,
    /// Attribute holding the real URL of lazily loaded images; empty disables it.
    pub lazy_image_attribute: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            format: InputFormat::Auto,
            empty_placeholder: "content empty".to_string(),
            unparsable_placeholder: "content unparsable".to_string(),
            lazy_image_attribute: "data-src".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::ReadOptions {
            path: path.to_path_buf(),
            source,
        })?;
        let options = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), "loaded conversion options");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert_eq!(options.format, InputFormat::Auto);
        assert_eq!(options.empty_placeholder, "content empty");
        assert_eq!(options.unparsable_placeholder, "content unparsable");
        assert_eq!(options.lazy_image_attribute, "data-src");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options =
            ConvertOptions::from_json_str(r#"{"format": "markdown", "lazy_image_attribute": ""}"#)
                .unwrap();
        assert_eq!(options.format, InputFormat::Markdown);
        assert_eq!(options.lazy_image_attribute, "");
        assert_eq!(options.empty_placeholder, "content empty");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = ConvertOptions::from_json_str(r#"{"format": "rtf"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ConvertOptions::from_json_file("/nonexistent/telenode.json").unwrap_err();
        assert!(matches!(err, Error::ReadOptions { .. }));
        assert!(err.to_string().contains("/nonexistent/telenode.json"));
    }
}
