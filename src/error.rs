//! Errors raised at the fallible edges of the crate.
//!
//! Conversion itself never fails; these cover loading options, (de)serializing
//! node arrays handed over by callers, and page URL handling.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported tag `{0}`")]
    UnsupportedTag(String),

    #[error("`li` is only allowed directly inside `ul` or `ol`")]
    MisplacedListItem,

    #[error("`{parent}` may only contain `li` children")]
    ExpectedListItem { parent: String },

    #[error("`{tag}` requires the `{attribute}` attribute")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },

    #[error("image source must be an external URL, not a data URI")]
    DataUriImage,

    #[error("`{tag}` may only contain text")]
    TextOnly { tag: &'static str },

    #[error("failed to read options file {}", path.display())]
    ReadOptions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a published page URL: {0}")]
    InvalidPageUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
