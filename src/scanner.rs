//! Cursor-based tag scanning over raw markup.
//!
//! Nothing here builds a DOM. Callers locate the next interesting tag from a
//! byte offset and slice the input themselves. All offsets land on ASCII
//! bytes (`<`, `>`, tag names), so slicing at them is always valid UTF-8.
use crate::entities::decode_entities;

/// An opening tag found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenTag<'a> {
    /// Canonical lowercase name, taken from the list the caller searched for.
    pub name: &'static str,
    /// Offset of the `<`.
    pub start: usize,
    /// Offset just past the `>`.
    pub end: usize,
    /// Raw text between the tag name and the `>`.
    pub attrs: &'a str,
}

/// An opening tag together with its closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Element<'a> {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub attrs: &'a str,
    pub content: &'a str,
}

/// Find the next opening tag at or after `from` whose name is one of `names`.
///
/// Names match case-insensitively and only as whole names, so searching for
/// `b` does not stop at `<blockquote>`. Closing tags, comments and declarations
/// are skipped.
pub(crate) fn find_open_tag<'a>(
    html: &'a str,
    from: usize,
    names: &[&'static str],
) -> Option<OpenTag<'a>> {
    let bytes = html.as_bytes();
    let mut i = from;

    while let Some(offset) = html.get(i..).and_then(|rest| rest.find('<')) {
        let start = i + offset;
        let name_start = start + 1;
        let name_end = name_start
            + bytes[name_start..]
                .iter()
                .take_while(|b| is_name_byte(**b))
                .count();

        if name_end > name_start {
            let written = &bytes[name_start..name_end];
            let matched = names
                .iter()
                .find(|name| name.as_bytes().eq_ignore_ascii_case(written))
                .copied();
            if let Some(name) = matched
                && let Some(close) = find_tag_end(html, name_end)
            {
                return Some(OpenTag {
                    name,
                    start,
                    end: close + 1,
                    attrs: &html[name_end..close],
                });
            }
        }

        i = start + 1;
    }

    None
}

/// Find the first `</name>` at or after `from`. Returns `(start, end)` offsets.
///
/// This is deliberately not nesting-aware: the first closing tag of that name
/// ends the element, even if another element of the same name was opened in
/// between. Content in practice is shallow and the truncation is accepted.
pub(crate) fn find_closing_tag(html: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = html.as_bytes();
    let mut i = from;

    while let Some(offset) = html.get(i..).and_then(|rest| rest.find("</")) {
        let start = i + offset;
        let name_start = start + 2;
        let name_end = name_start + name.len();

        if bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
        {
            let after = name_end
                + bytes[name_end..]
                    .iter()
                    .take_while(|b| b.is_ascii_whitespace())
                    .count();
            if bytes.get(after) == Some(&b'>') {
                return Some((start, after + 1));
            }
        }

        i = start + 2;
    }

    None
}

/// Closing-tag lookups over one input, remembering for each name the lowest
/// offset from which no closing tag exists.
///
/// Without this, every unclosed opening tag rescans the rest of the input. A
/// cache must only ever be used with the input it was created for.
#[derive(Debug, Default)]
pub(crate) struct ClosingTags {
    unclosed_from: Vec<(&'static str, usize)>,
}

impl ClosingTags {
    /// Same as [`find_closing_tag`], skipping searches known to fail.
    pub(crate) fn find(
        &mut self,
        html: &str,
        from: usize,
        name: &'static str,
    ) -> Option<(usize, usize)> {
        if self.unclosed_from(name).is_some_and(|offset| from >= offset) {
            return None;
        }

        let found = find_closing_tag(html, from, name);
        if found.is_none() {
            match self.unclosed_from.iter_mut().find(|(known, _)| *known == name) {
                Some((_, offset)) => *offset = (*offset).min(from),
                None => self.unclosed_from.push((name, from)),
            }
        }
        found
    }

    /// Offset from which `name` is known to have no closing tag.
    pub(crate) fn unclosed_from(&self, name: &str) -> Option<usize> {
        self.unclosed_from
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, offset)| *offset)
    }
}

/// Find the next element (opening tag plus first matching close) whose name is
/// one of `names`. An opening tag that is never closed is skipped over and the
/// search continues behind it.
pub(crate) fn find_element<'a>(
    html: &'a str,
    from: usize,
    names: &[&'static str],
    closing: &mut ClosingTags,
) -> Option<Element<'a>> {
    let mut i = from;

    while let Some(open) = find_open_tag(html, i, names) {
        if let Some((close_start, close_end)) = closing.find(html, open.end, open.name) {
            return Some(Element {
                name: open.name,
                start: open.start,
                end: close_end,
                attrs: open.attrs,
                content: &html[open.end..close_start],
            });
        }
        tracing::trace!(tag = open.name, offset = open.start, "skipping unterminated tag");
        i = open.start + 1;
    }

    None
}

/// Iterate over every `name` element in `html`, in document order.
pub(crate) fn elements<'a>(html: &'a str, name: &'static str) -> Elements<'a> {
    Elements {
        html,
        names: [name],
        cursor: 0,
        closing: ClosingTags::default(),
    }
}

pub(crate) struct Elements<'a> {
    html: &'a str,
    names: [&'static str; 1],
    cursor: usize,
    closing: ClosingTags,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let element = find_element(self.html, self.cursor, &self.names, &mut self.closing)?;
        self.cursor = element.end;
        Some(element)
    }
}

/// Look up an attribute in the raw attribute text of a tag.
///
/// Handles double-quoted, single-quoted, unquoted and bare attributes. The
/// value is entity-decoded. Bare attributes yield an empty string.
pub(crate) fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    let bytes = attrs.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        // Skip separators between attributes
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'/' | b'>')
        {
            i += 1;
        }
        if i == name_start {
            // Stray `=` or `>`; step over it
            i += 1;
            continue;
        }
        let name = &attrs[name_start..i];

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let (value, next) = attribute_value(attrs, i);
            i = next;
            value
        } else {
            ""
        };

        if name.eq_ignore_ascii_case(wanted) {
            return Some(decode_entities(value));
        }
    }

    None
}

/// Read a value starting at `start`; returns the value and the offset after it.
fn attribute_value(attrs: &str, start: usize) -> (&str, usize) {
    let bytes = attrs.as_bytes();
    match bytes.get(start) {
        Some(&quote @ (b'"' | b'\'')) => {
            let value_start = start + 1;
            match attrs[value_start..].find(quote as char) {
                Some(len) => (&attrs[value_start..value_start + len], value_start + len + 1),
                None => (&attrs[value_start..], attrs.len()),
            }
        }
        _ => {
            let start = start.min(bytes.len());
            let len = bytes[start..]
                .iter()
                .take_while(|b| !b.is_ascii_whitespace() && **b != b'>')
                .count();
            (&attrs[start..start + len], start + len)
        }
    }
}

/// Remove `<script>` and `<style>` elements and HTML comments.
///
/// Unterminated ones are left in place; the normalizer strips their tags later.
pub(crate) fn strip_non_content(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut closing = ClosingTags::default();
    let mut cursor = 0;
    // Once a comment is unterminated, no later one can be terminated either
    let mut comments_closed = true;

    loop {
        let comment = html
            .get(cursor..)
            .filter(|_| comments_closed)
            .and_then(|rest| rest.find("<!--"))
            .map(|offset| cursor + offset);
        let element = find_element(html, cursor, &["script", "style"], &mut closing);

        let (start, end) = match (comment, element) {
            (Some(c), Some(e)) if c < e.start => match comment_end(html, c) {
                Some(end) => (c, end),
                None => {
                    comments_closed = false;
                    (e.start, e.end)
                }
            },
            (Some(c), None) => match comment_end(html, c) {
                Some(end) => (c, end),
                None => break,
            },
            (_, Some(e)) => (e.start, e.end),
            (None, None) => break,
        };

        result.push_str(&html[cursor..start]);
        cursor = end;
    }

    result.push_str(&html[cursor..]);
    result
}

fn comment_end(html: &str, start: usize) -> Option<usize> {
    html[start + 4..]
        .find("-->")
        .map(|offset| start + 4 + offset + 3)
}

/// Offset of the `>` closing a tag whose name ends at `from`.
///
/// A quote right after `=` opens a value that may contain `>`. If that quote
/// never closes, the first `>` wins.
fn find_tag_end(html: &str, from: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for (offset, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
                continue;
            }
            None => match b {
                b'>' => return Some(from + offset),
                b'"' | b'\'' if after_equals => {
                    quote = Some(b);
                    continue;
                }
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_equals = b == b'=';
        }
    }

    quote.and_then(|_| html[from..].find('>').map(|offset| from + offset))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_respects_name_boundary() {
        let html = "<blockquote><b class=\"x\">bold</b>";
        let tag = find_open_tag(html, 0, &["b"]).unwrap();
        assert_eq!(tag.name, "b");
        assert_eq!(tag.start, 12);
        assert_eq!(tag.attrs, " class=\"x\"");
        assert_eq!(&html[tag.end..tag.end + 4], "bold");
    }

    #[test]
    fn test_open_tag_is_case_insensitive() {
        let tag = find_open_tag("text <IMG SRC='a.png'>", 0, &["img"]).unwrap();
        assert_eq!(tag.name, "img");
        assert_eq!(attribute(tag.attrs, "src").as_deref(), Some("a.png"));
    }

    #[test]
    fn test_open_tag_skips_closing_and_comments() {
        assert!(find_open_tag("</p><!-- p -->", 0, &["p"]).is_none());
        assert!(find_open_tag("<p", 0, &["p"]).is_none());
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let html = "<img alt=\"a > b\" src=\"x.png\">rest";
        let tag = find_open_tag(html, 0, &["img"]).unwrap();
        assert_eq!(&html[tag.end..], "rest");
        assert_eq!(attribute(tag.attrs, "alt").as_deref(), Some("a > b"));
    }

    #[test]
    fn test_first_close_wins() {
        let html = "<div>a<div>b</div>c</div>";
        let element = find_element(html, 0, &["div"], &mut ClosingTags::default()).unwrap();
        assert_eq!(element.content, "a<div>b");
        assert_eq!(&html[element.end..], "c</div>");
    }

    #[test]
    fn test_closing_tag_allows_whitespace() {
        assert_eq!(find_closing_tag("x</B >", 0, "b"), Some((1, 6)));
        assert_eq!(find_closing_tag("x</br>", 0, "b"), None);
    }

    #[test]
    fn test_unterminated_element_is_skipped() {
        let html = "<p>open <p>closed</p>";
        let element = find_element(html, 0, &["p"], &mut ClosingTags::default()).unwrap();
        assert_eq!(element.start, 0);
        assert_eq!(element.content, "open <p>closed");

        let html = "<ul>never closed <p>x</p>";
        let element = find_element(html, 0, &["ul", "p"], &mut ClosingTags::default()).unwrap();
        assert_eq!(element.name, "p");
        assert_eq!(element.content, "x");
    }

    #[test]
    fn test_closing_tags_remember_failed_searches() {
        let html = "<ul>a<p>x</p><ul>b</p>";
        let mut closing = ClosingTags::default();
        assert_eq!(closing.find(html, 4, "ul"), None);
        assert_eq!(closing.unclosed_from("ul"), Some(4));
        assert_eq!(closing.find(html, 17, "ul"), None);
        assert_eq!(closing.unclosed_from("ul"), Some(4));
        assert_eq!(closing.find(html, 0, "ul"), None);
        assert_eq!(closing.unclosed_from("ul"), Some(0));

        // Successful searches are never cached
        assert_eq!(closing.find(html, 0, "p"), Some((9, 13)));
        assert_eq!(closing.find(html, 13, "p"), Some((18, 22)));
        assert_eq!(closing.unclosed_from("p"), None);
    }

    #[test]
    fn test_many_unclosed_elements_are_skipped() {
        let html = "<ul><p>x</p>".repeat(2_000);
        let mut closing = ClosingTags::default();
        let mut cursor = 0;
        let mut count = 0;
        while let Some(element) = find_element(&html, cursor, &["ul", "p"], &mut closing) {
            assert_eq!(element.name, "p");
            cursor = element.end;
            count += 1;
        }
        assert_eq!(count, 2_000);
        assert_eq!(closing.unclosed_from("ul"), Some(4));
    }

    #[test]
    fn test_elements_iterates_in_order() {
        let items: Vec<_> = elements("<li>A</li> <LI class=x>B</li>", "li")
            .map(|e| e.content)
            .collect();
        assert_eq!(items, vec!["A", "B"]);
    }

    #[test]
    fn test_attribute_forms() {
        let attrs = " href=\"a?x=1&amp;y=2\" data-src='lazy.png' width=300 hidden";
        assert_eq!(attribute(attrs, "href").as_deref(), Some("a?x=1&y=2"));
        assert_eq!(attribute(attrs, "data-src").as_deref(), Some("lazy.png"));
        assert_eq!(attribute(attrs, "src"), None);
        assert_eq!(attribute(attrs, "WIDTH").as_deref(), Some("300"));
        assert_eq!(attribute(attrs, "hidden").as_deref(), Some(""));
        assert_eq!(attribute(" src=\"unterminated", "src").as_deref(), Some("unterminated"));
        assert_eq!(attribute(" src=", "src").as_deref(), Some(""));
    }

    #[test]
    fn test_strip_non_content() {
        let html = "a<script>var x = '<p>';</script>b<!-- <p>c</p> -->d<STYLE>p{}</style>e";
        assert_eq!(strip_non_content(html), "abde");
    }

    #[test]
    fn test_strip_non_content_leaves_unterminated() {
        assert_eq!(strip_non_content("a<!-- b"), "a<!-- b");
        assert_eq!(strip_non_content("a<script>b"), "a<script>b");
    }
}
