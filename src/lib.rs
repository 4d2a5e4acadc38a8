//! Converts article HTML or Markdown into the rich-text node tree accepted by
//! the Telegraph publishing API.
pub mod ast;
pub mod converter;
pub mod error;
pub mod options;
pub mod page;

mod blocks;
mod entities;
mod inline;
mod markdown;
mod scanner;

pub use ast::{Child, HeadingLevel, ListItem, Node, TAG_WHITELIST, is_data_uri};
pub use converter::{Converter, convert_with_options, looks_like_html};
pub use error::{Error, Result};
pub use options::{ConvertOptions, InputFormat};
pub use page::PageRequest;

/// Convert HTML or Markdown into nodes using the default options.
///
/// Never fails and never returns an empty vector.
pub fn convert(content: &str) -> Vec<Node> {
    convert_with_options(content, &ConvertOptions::default())
}

/// Serialize nodes into the JSON array the publishing API expects.
pub fn to_json(nodes: &[Node]) -> Result<String> {
    Ok(serde_json::to_string(nodes)?)
}
