//! Top-level assembly: pick the input dialect, run the passes, and make sure
//! the result is never empty.
use std::borrow::Cow;

use tracing::debug;

use crate::ast::Node;
use crate::blocks::BlockDispatcher;
use crate::markdown::markdown_to_html;
use crate::options::{ConvertOptions, InputFormat};

/// Converter bound to a set of options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Converter { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn convert(&self, content: &str) -> Vec<Node> {
        convert_with_options(content, &self.options)
    }
}

/// Convert HTML or Markdown into a node sequence.
///
/// Total: any input yields at least one node. Empty input and input without
/// anything usable each map to a single placeholder paragraph.
pub fn convert_with_options(content: &str, options: &ConvertOptions) -> Vec<Node> {
    if content.is_empty() {
        debug!("empty content, using placeholder");
        return vec![placeholder(&options.empty_placeholder)];
    }

    let html = match options.format {
        InputFormat::Html => Cow::Borrowed(content),
        InputFormat::Auto if looks_like_html(content) => Cow::Borrowed(content),
        InputFormat::Auto | InputFormat::Markdown => {
            debug!("running markdown pre-pass");
            Cow::Owned(markdown_to_html(content))
        }
    };

    let nodes = BlockDispatcher::new(&options.lazy_image_attribute).dispatch(&html);
    if nodes.is_empty() {
        debug!("no usable content, using placeholder");
        return vec![placeholder(&options.unparsable_placeholder)];
    }

    debug!(nodes = nodes.len(), "converted content");
    nodes
}

/// True if `content` contains something tag-shaped: `<`, optional whitespace,
/// a word character, and a `>` somewhere after it.
///
/// Closing tags and comments alone do not count.
pub fn looks_like_html(content: &str) -> bool {
    let Some(last_close) = content.rfind('>') else {
        return false;
    };
    let bytes = content.as_bytes();

    content[..last_close].match_indices('<').any(|(open, _)| {
        bytes[open + 1..last_close]
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
    })
}

fn placeholder(text: &str) -> Node {
    Node::Paragraph(vec![text.into()])
}
