//! Block dispatcher: walks a document for block-level elements in document
//! order and builds one or more nodes per element.
use tracing::trace;

use crate::ast::{Child, HeadingLevel, ListItem, Node};
use crate::entities::strip_tags;
use crate::inline::InlineParser;
use crate::scanner::{self, ClosingTags, Element};

const BLOCK_TAGS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "div",
    "blockquote",
    "ul",
    "ol",
    "pre",
    "figure",
];

pub(crate) struct BlockDispatcher<'o> {
    inline: InlineParser<'o>,
}

impl<'o> BlockDispatcher<'o> {
    pub(crate) fn new(lazy_image_attribute: &'o str) -> Self {
        BlockDispatcher {
            inline: InlineParser::new(lazy_image_attribute),
        }
    }

    /// Convert a document fragment into block-level nodes.
    ///
    /// Text between recognized blocks becomes loose paragraphs. Returns an
    /// empty vector when nothing usable is found.
    pub(crate) fn dispatch(&self, html: &str) -> Vec<Node> {
        let html = scanner::strip_non_content(html);
        let mut closing = ClosingTags::default();
        let mut nodes = Vec::new();
        let mut cursor = 0;

        while let Some(element) = scanner::find_element(&html, cursor, BLOCK_TAGS, &mut closing) {
            self.push_loose(&html[cursor..element.start], &mut nodes);
            self.push_block(&element, &mut nodes);
            cursor = element.end;
        }
        self.push_loose(&html[cursor..], &mut nodes);

        nodes
    }

    fn push_block(&self, element: &Element<'_>, out: &mut Vec<Node>) {
        match element.name {
            "p" | "div" => self.push_paragraph(element.content, out),
            "blockquote" => self.push_blockquote(element.content, out),
            "ul" | "ol" => self.push_list(element.name == "ol", element.content, out),
            "pre" => self.push_preformatted(element.content, out),
            "figure" => self.push_figure(element.content, out),
            heading => {
                let level = heading[1..].parse::<u8>().unwrap_or(6);
                let children = self.inline.parse(element.content);
                if children.is_empty() {
                    trace!(tag = heading, "skipping empty heading");
                    return;
                }
                out.push(Node::Heading {
                    level: HeadingLevel::from_source(level),
                    children,
                });
            }
        }
    }

    /// Text outside any block: images are emitted on their own, the rest is
    /// wrapped in a paragraph if anything is left.
    fn push_loose(&self, fragment: &str, out: &mut Vec<Node>) {
        if fragment.trim().is_empty() {
            return;
        }

        let mut text = String::with_capacity(fragment.len());
        let mut cursor = 0;
        while let Some(tag) = scanner::find_open_tag(fragment, cursor, &["img"]) {
            text.push_str(&fragment[cursor..tag.start]);
            if let Some(image) = self.inline.image(tag.attrs) {
                out.push(image);
            }
            cursor = tag.end;
        }
        text.push_str(&fragment[cursor..]);

        let children = self.inline.parse(&text);
        if !children.is_empty() {
            out.push(Node::Paragraph(children));
        }
    }

    /// A paragraph never holds images, not even inside links or emphasis;
    /// they follow it as siblings.
    fn push_paragraph(&self, content: &str, out: &mut Vec<Node>) {
        let mut images = Vec::new();
        let children = hoist_images(self.inline.parse(content), &mut images);

        if !children.is_empty() {
            out.push(Node::Paragraph(children));
        }
        out.extend(images);
    }

    fn push_blockquote(&self, content: &str, out: &mut Vec<Node>) {
        let mut paragraphs: Vec<Child> = scanner::elements(content, "p")
            .map(|p| self.inline.parse(p.content))
            .filter(|children| !children.is_empty())
            .map(|children| Node::Paragraph(children).into())
            .collect();

        if paragraphs.is_empty() {
            let children = self.inline.parse(content);
            if !children.is_empty() {
                paragraphs.push(Node::Paragraph(children).into());
            }
        }

        if !paragraphs.is_empty() {
            out.push(Node::BlockQuote(paragraphs));
        }
    }

    fn push_list(&self, ordered: bool, content: &str, out: &mut Vec<Node>) {
        let items: Vec<ListItem> = scanner::elements(content, "li")
            .map(|li| self.inline.parse(li.content))
            .filter(|children| !children.is_empty())
            .map(ListItem)
            .collect();

        if items.is_empty() {
            trace!(ordered, "skipping list without items");
            return;
        }
        out.push(Node::List { ordered, items });
    }

    /// Code is kept verbatim: tags stripped, entities decoded, no inline parsing.
    fn push_preformatted(&self, content: &str, out: &mut Vec<Node>) {
        let code = scanner::elements(content, "code")
            .next()
            .map_or(content, |code| code.content);
        let text = strip_tags(code);
        let text = text.trim();
        if !text.is_empty() {
            out.push(Node::Preformatted(text.to_string()));
        }
    }

    fn push_figure(&self, content: &str, out: &mut Vec<Node>) {
        if let Some(tag) = scanner::find_open_tag(content, 0, &["img"])
            && let Some(image) = self.inline.image(tag.attrs)
        {
            out.push(image);
        }

        if let Some(caption) = scanner::elements(content, "figcaption").next() {
            let children = self.inline.parse(caption.content);
            if !children.is_empty() {
                out.push(Node::FigCaption(children));
            }
        }
    }
}

/// Move every image in `children`, at any depth, into `images` in reading
/// order. Wrappers left without children are dropped.
fn hoist_images(children: Vec<Child>, images: &mut Vec<Node>) -> Vec<Child> {
    let mut kept = Vec::with_capacity(children.len());

    for child in children {
        let node = match child {
            Child::Node(image @ Node::Image { .. }) => {
                images.push(image);
                continue;
            }
            Child::Node(Node::Bold(inner)) => {
                non_empty(hoist_images(inner, images)).map(Node::Bold)
            }
            Child::Node(Node::Italic(inner)) => {
                non_empty(hoist_images(inner, images)).map(Node::Italic)
            }
            Child::Node(Node::Link { href, children }) => non_empty(hoist_images(children, images))
                .map(|children| Node::Link { href, children }),
            other => {
                kept.push(other);
                continue;
            }
        };
        kept.extend(node.map(Child::Node));
    }

    kept
}

fn non_empty(children: Vec<Child>) -> Option<Vec<Child>> {
    (!children.is_empty()).then_some(children)
}
