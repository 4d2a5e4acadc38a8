//! Rich-text node tree accepted by the publishing API.
//!
//! The tree only has room for the API's tag whitelist, so anything else in
//! the source markup has to be projected onto these variants or dropped.
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One element of the output tree.
///
/// Serializes to the wire shape `{"tag", "attrs"?, "children"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum Node {
    // Block-level nodes
    Paragraph(Vec<Child>),
    Heading {
        level: HeadingLevel,
        children: Vec<Child>,
    },
    BlockQuote(Vec<Child>),
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    FigCaption(Vec<Child>),
    Preformatted(String), // verbatim code, no inline parsing
    // Inline nodes
    Bold(Vec<Child>),
    Italic(Vec<Child>),
    Link {
        href: String,
        children: Vec<Child>,
    },
    Code(String),
    /// Build through [`Node::image`], which refuses `data:` sources. Debug
    /// builds assert the same when serializing.
    Image {
        src: String,
        alt: Option<String>,
    },
    LineBreak,
}

/// A child slot: either a nested node or a literal text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(Node),
}

/// Entry of a list. Only constructible inside [`Node::List`], so a list
/// never holds anything but items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem(pub Vec<Child>);

/// The two heading sizes the API renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    Major,
    Minor,
}

impl HeadingLevel {
    /// Collapse an HTML heading level: 1-2 become major, everything else minor.
    pub fn from_source(level: u8) -> Self {
        if level <= 2 {
            HeadingLevel::Major
        } else {
            HeadingLevel::Minor
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::Major => "h3",
            HeadingLevel::Minor => "h4",
        }
    }
}

/// Every tag the output may contain.
pub const TAG_WHITELIST: &[&str] = &[
    "p",
    "h3",
    "h4",
    "blockquote",
    "ul",
    "ol",
    "li",
    "figcaption",
    "pre",
    "b",
    "i",
    "a",
    "code",
    "img",
    "br",
];

/// True for `data:` URIs, which embed the image payload instead of pointing at it.
pub fn is_data_uri(src: &str) -> bool {
    let src = src.trim_start().as_bytes();
    src.len() >= 5 && src[..5].eq_ignore_ascii_case(b"data:")
}

impl Node {
    /// Build an image node, refusing embedded payloads.
    pub fn image(src: impl Into<String>, alt: Option<String>) -> Option<Node> {
        let src = src.into();
        if src.trim().is_empty() || is_data_uri(&src) {
            return None;
        }
        Some(Node::Image { src, alt })
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Node::Paragraph(_) => "p",
            Node::Heading { level, .. } => level.tag(),
            Node::BlockQuote(_) => "blockquote",
            Node::List { ordered: true, .. } => "ol",
            Node::List { ordered: false, .. } => "ul",
            Node::FigCaption(_) => "figcaption",
            Node::Preformatted(_) => "pre",
            Node::Bold(_) => "b",
            Node::Italic(_) => "i",
            Node::Link { .. } => "a",
            Node::Code(_) => "code",
            Node::Image { .. } => "img",
            Node::LineBreak => "br",
        }
    }

    /// Inline children of container nodes; empty for leaves, lists and code.
    pub fn children(&self) -> &[Child] {
        match self {
            Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::FigCaption(children)
            | Node::Bold(children)
            | Node::Italic(children)
            | Node::Heading { children, .. }
            | Node::Link { children, .. } => children,
            _ => &[],
        }
    }
}

impl Child {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Text(text) => Some(text),
            Child::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Text(_) => None,
        }
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl ListItem {
    pub fn children(&self) -> &[Child] {
        &self.0
    }
}

// Wire representation, shared by serialization and validation on the way in.

#[derive(Debug, Default, Serialize, Deserialize)]
struct Attrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alt: Option<String>,
}

impl Attrs {
    fn is_empty(&self) -> bool {
        self.href.is_none() && self.src.is_none() && self.alt.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawNode {
    tag: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<RawChild>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawChild {
    Text(String),
    Node(RawNode),
}

impl RawNode {
    fn container(tag: &str, children: Vec<Child>) -> Self {
        RawNode {
            tag: tag.to_string(),
            attrs: Attrs::default(),
            children: Some(children.into_iter().map(RawChild::from).collect()),
        }
    }

    fn text(tag: &str, text: String) -> Self {
        RawNode {
            tag: tag.to_string(),
            attrs: Attrs::default(),
            children: Some(vec![RawChild::Text(text)]),
        }
    }
}

impl From<Child> for RawChild {
    fn from(child: Child) -> Self {
        match child {
            Child::Text(text) => RawChild::Text(text),
            Child::Node(node) => RawChild::Node(node.into()),
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let tag = node.tag();
        match node {
            Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::FigCaption(children)
            | Node::Bold(children)
            | Node::Italic(children)
            | Node::Heading { children, .. } => RawNode::container(tag, children),
            Node::List { items, .. } => RawNode {
                tag: tag.to_string(),
                attrs: Attrs::default(),
                children: Some(
                    items
                        .into_iter()
                        .map(|item| RawChild::Node(RawNode::container("li", item.0)))
                        .collect(),
                ),
            },
            Node::Link { href, children } => RawNode {
                attrs: Attrs {
                    href: Some(href),
                    ..Attrs::default()
                },
                ..RawNode::container(tag, children)
            },
            Node::Code(text) | Node::Preformatted(text) => RawNode::text(tag, text),
            Node::Image { src, alt } => {
                debug_assert!(
                    !is_data_uri(&src),
                    "data URI image built without Node::image"
                );
                RawNode {
                    tag: tag.to_string(),
                    attrs: Attrs {
                        src: Some(src),
                        alt,
                        href: None,
                    },
                    children: None,
                }
            }
            Node::LineBreak => RawNode {
                tag: tag.to_string(),
                attrs: Attrs::default(),
                children: None,
            },
        }
    }
}

impl TryFrom<RawNode> for Node {
    type Error = Error;

    fn try_from(raw: RawNode) -> Result<Self, Error> {
        let RawNode {
            tag,
            attrs,
            children,
        } = raw;
        let children = children.unwrap_or_default();

        let node = match tag.as_str() {
            "p" => Node::Paragraph(convert_children(children)?),
            "h3" | "h4" => Node::Heading {
                level: if tag == "h3" {
                    HeadingLevel::Major
                } else {
                    HeadingLevel::Minor
                },
                children: convert_children(children)?,
            },
            "blockquote" => Node::BlockQuote(convert_children(children)?),
            "figcaption" => Node::FigCaption(convert_children(children)?),
            "b" => Node::Bold(convert_children(children)?),
            "i" => Node::Italic(convert_children(children)?),
            "a" => Node::Link {
                href: attrs.href.unwrap_or_default(),
                children: convert_children(children)?,
            },
            "code" => Node::Code(flatten_text("code", children)?),
            "pre" => Node::Preformatted(flatten_text("pre", children)?),
            "ul" | "ol" => Node::List {
                ordered: tag == "ol",
                items: children
                    .into_iter()
                    .map(|child| list_item(&tag, child))
                    .collect::<Result<_, _>>()?,
            },
            "img" => {
                let src = attrs.src.ok_or(Error::MissingAttribute {
                    tag: "img",
                    attribute: "src",
                })?;
                if is_data_uri(&src) {
                    return Err(Error::DataUriImage);
                }
                Node::Image {
                    src,
                    alt: attrs.alt,
                }
            }
            "br" => Node::LineBreak,
            "li" => return Err(Error::MisplacedListItem),
            _ => return Err(Error::UnsupportedTag(tag)),
        };

        Ok(node)
    }
}

fn convert_children(children: Vec<RawChild>) -> Result<Vec<Child>, Error> {
    children
        .into_iter()
        .map(|child| match child {
            RawChild::Text(text) => Ok(Child::Text(text)),
            RawChild::Node(raw) => Node::try_from(raw).map(Child::Node),
        })
        .collect()
}

fn list_item(parent: &str, child: RawChild) -> Result<ListItem, Error> {
    match child {
        RawChild::Node(raw) if raw.tag == "li" => Ok(ListItem(convert_children(
            raw.children.unwrap_or_default(),
        )?)),
        _ => Err(Error::ExpectedListItem {
            parent: parent.to_string(),
        }),
    }
}

fn flatten_text(tag: &'static str, children: Vec<RawChild>) -> Result<String, Error> {
    children
        .into_iter()
        .map(|child| match child {
            RawChild::Text(text) => Ok(text),
            RawChild::Node(_) => Err(Error::TextOnly { tag }),
        })
        .collect()
}
