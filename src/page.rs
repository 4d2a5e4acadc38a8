//! Request payloads and URLs for the publishing API.
//!
//! Only the shapes live here. Sending requests is left to the caller's HTTP
//! client.
use serde::Serialize;

use crate::ast::Node;
use crate::error::{Error, Result};

pub const API_URL: &str = "https://api.telegra.ph";
pub const PAGE_HOST: &str = "telegra.ph";
pub const DEFAULT_TITLE: &str = "Untitled article";
pub const DEFAULT_AUTHOR_NAME: &str = "Telegram Bot";

/// Body of a `createPage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRequest {
    pub access_token: String,
    pub title: String,
    pub content: Vec<Node>,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    pub return_content: bool,
}

impl PageRequest {
    /// A blank title falls back to [`DEFAULT_TITLE`].
    pub fn new(access_token: impl Into<String>, title: &str, content: Vec<Node>) -> Self {
        let title = title.trim();
        PageRequest {
            access_token: access_token.into(),
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            content,
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_url: None,
            return_content: false,
        }
    }

    pub fn with_author(mut self, name: &str, url: Option<String>) -> Self {
        if !name.trim().is_empty() {
            self.author_name = name.trim().to_string();
        }
        self.author_url = url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Endpoint URL for an API method, e.g. `createPage`.
pub fn method_url(method: &str) -> String {
    format!("{API_URL}/{method}")
}

pub fn build_page_url(path: &str) -> String {
    format!("https://{PAGE_HOST}/{}", path.trim_start_matches('/'))
}

/// A published page lives at `http(s)://telegra.ph/<path>`, where the path is
/// a single segment of ASCII letters, digits and dashes.
pub fn is_valid_page_url(url: &str) -> bool {
    page_path(url).is_some()
}

pub fn extract_page_path(url: &str) -> Result<&str> {
    page_path(url).ok_or_else(|| Error::InvalidPageUrl(url.to_string()))
}

fn page_path(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let path = rest.strip_prefix(PAGE_HOST)?.strip_prefix('/')?;
    let valid = !path.is_empty()
        && path
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    valid.then_some(path)
}
