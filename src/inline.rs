//! Inline span parser: text, line breaks, images, links, bold, italic, code.
use tracing::trace;

use crate::ast::{Child, Node, is_data_uri};
use crate::entities::strip_tags;
use crate::scanner::{self, ClosingTags, OpenTag};

/// Inline tags the parser understands. Everything else is stripped as text.
const INLINE_TAGS: &[&str] = &["br", "img", "a", "b", "strong", "i", "em", "code"];

/// Parses a fragment that carries no block-level structure.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InlineParser<'o> {
    /// Attribute holding the real URL of a lazily loaded image. Empty disables it.
    lazy_image_attribute: &'o str,
}

impl<'o> InlineParser<'o> {
    pub(crate) fn new(lazy_image_attribute: &'o str) -> Self {
        InlineParser {
            lazy_image_attribute,
        }
    }

    /// Parse `fragment` into inline children, in reading order.
    ///
    /// Never fails: unknown tags are stripped, unterminated ones dropped, and
    /// whitespace-only text runs are left out.
    pub(crate) fn parse(&self, fragment: &str) -> Vec<Child> {
        let mut closing = ClosingTags::default();
        let mut children = Vec::new();
        let mut cursor = 0;

        while let Some(tag) = scanner::find_open_tag(fragment, cursor, INLINE_TAGS) {
            push_text(&mut children, &fragment[cursor..tag.start]);
            let (node, next) = self.parse_tag(fragment, &tag, &mut closing);
            if let Some(node) = node {
                children.push(Child::Node(node));
            }
            cursor = next;
        }
        push_text(&mut children, &fragment[cursor..]);

        children
    }

    /// Build the node for one opening tag. Returns the node, if any, and the
    /// offset where scanning resumes.
    fn parse_tag(
        &self,
        fragment: &str,
        tag: &OpenTag<'_>,
        closing: &mut ClosingTags,
    ) -> (Option<Node>, usize) {
        match tag.name {
            "br" => (Some(Node::LineBreak), tag.end),
            "img" => (self.image(tag.attrs), tag.end),
            name => match closing.find(fragment, tag.end, name) {
                Some((close_start, close_end)) => {
                    let inner = &fragment[tag.end..close_start];
                    (self.wrap(name, tag.attrs, inner), close_end)
                }
                None => {
                    trace!(tag = name, "dropping unterminated inline tag");
                    (None, tag.end)
                }
            },
        }
    }

    /// Wrap the content of a paired tag. Wrappers around nothing are omitted.
    fn wrap(&self, name: &str, attrs: &str, inner: &str) -> Option<Node> {
        if name == "code" {
            let text = strip_tags(inner);
            return (!text.is_empty()).then_some(Node::Code(text));
        }

        let mut children = self.parse(inner);
        if children.is_empty() {
            let text = strip_tags(inner);
            if text.trim().is_empty() {
                return None;
            }
            children.push(Child::Text(text));
        }

        let node = match name {
            "a" => Node::Link {
                href: scanner::attribute(attrs, "href").unwrap_or_default(),
                children,
            },
            "b" | "strong" => Node::Bold(children),
            _ => Node::Italic(children),
        };
        Some(node)
    }

    /// Build an image from the attribute text of an `img` tag.
    ///
    /// Falls back to the lazy-load attribute when `src` is missing, empty or an
    /// embedded payload. Returns `None` when no external URL is left.
    pub(crate) fn image(&self, attrs: &str) -> Option<Node> {
        let usable = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty() && !is_data_uri(&value)).then_some(value)
        };

        let src = scanner::attribute(attrs, "src").and_then(usable).or_else(|| {
            (!self.lazy_image_attribute.is_empty())
                .then(|| scanner::attribute(attrs, self.lazy_image_attribute))
                .flatten()
                .and_then(usable)
        });

        let Some(src) = src else {
            trace!("dropping image without an external source");
            return None;
        };
        let alt = scanner::attribute(attrs, "alt").filter(|alt| !alt.is_empty());
        Node::image(src, alt)
    }
}

/// Normalize a text run and keep it unless it is only whitespace.
fn push_text(children: &mut Vec<Child>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let text = strip_tags(raw);
    if !text.trim().is_empty() {
        children.push(Child::Text(text));
    }
}
