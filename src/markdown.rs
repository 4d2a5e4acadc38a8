//! Markdown pre-pass.
//!
//! Rewrites a small Markdown dialect line by line into the HTML vocabulary the
//! block dispatcher understands. Literal `<` and `>` are escaped so plain text
//! can never be mistaken for markup further down.
use std::mem;

/// Text used for a link written with an empty label.
const EMPTY_LINK_TEXT: &str = "link";

/// Convert Markdown into dispatcher-ready HTML, one block per output line.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let mut converter = MarkdownConverter::default();
    for line in markdown.lines() {
        converter.push_line(line);
    }
    converter.finish()
}

/// Line-level state. At most one block is pending at a time, so flushing it
/// before starting another keeps output in source order.
#[derive(Debug, Default, PartialEq)]
enum State {
    #[default]
    Normal,
    CodeFence(Vec<String>),
    List {
        ordered: bool,
        items: Vec<String>,
    },
    Paragraph(Vec<String>),
}

#[derive(Debug, Default)]
struct MarkdownConverter {
    state: State,
    html: Vec<String>,
}

impl MarkdownConverter {
    fn push_line(&mut self, raw: &str) {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            match mem::take(&mut self.state) {
                State::CodeFence(lines) => self.emit_code(&lines),
                pending => {
                    self.flush_state(pending);
                    self.state = State::CodeFence(Vec::new());
                }
            }
            return;
        }

        if let State::CodeFence(lines) = &mut self.state {
            lines.push(raw.to_string());
            return;
        }

        if trimmed.is_empty() {
            self.flush();
            return;
        }

        if let Some((level, text)) = parse_heading(trimmed) {
            self.flush();
            self.html
                .push(format!("<h{level}>{}</h{level}>", render_inline(text)));
            return;
        }

        if let Some(text) = parse_quote(trimmed) {
            self.flush();
            self.html
                .push(format!("<blockquote>{}</blockquote>", render_inline(text)));
            return;
        }

        if let Some((ordered, item)) = parse_list_item(trimmed) {
            self.push_list_item(ordered, render_inline(item));
            return;
        }

        let text = render_inline(trimmed);
        if let State::Paragraph(lines) = &mut self.state {
            lines.push(text);
            return;
        }
        self.flush();
        self.state = State::Paragraph(vec![text]);
    }

    fn push_list_item(&mut self, ordered: bool, item: String) {
        if let State::List {
            ordered: current,
            items,
        } = &mut self.state
            && *current == ordered
        {
            items.push(item);
            return;
        }
        self.flush();
        self.state = State::List {
            ordered,
            items: vec![item],
        };
    }

    fn flush(&mut self) {
        let pending = mem::take(&mut self.state);
        self.flush_state(pending);
    }

    fn flush_state(&mut self, state: State) {
        match state {
            State::Normal => {}
            State::CodeFence(lines) => self.emit_code(&lines),
            State::List { ordered, items } => {
                let tag = if ordered { "ol" } else { "ul" };
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{item}</li>"))
                    .collect();
                self.html.push(format!("<{tag}>{items}</{tag}>"));
            }
            State::Paragraph(lines) => {
                let text = lines.join(" ");
                let text = text.trim();
                if !text.is_empty() {
                    self.html.push(format!("<p>{text}</p>"));
                }
            }
        }
    }

    fn emit_code(&mut self, lines: &[String]) {
        self.html
            .push(format!("<pre>{}</pre>", escape_code(&lines.join("\n"))));
    }

    /// Flush whatever is pending, including an unclosed code fence.
    fn finish(mut self) -> String {
        self.flush();
        self.html.join("\n")
    }
}

/// `#` to `######`, whitespace, then the heading text.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    (!text.is_empty()).then_some((level, text))
}

fn parse_quote(line: &str) -> Option<&str> {
    let text = line.strip_prefix('>')?.trim_start();
    (!text.is_empty()).then_some(text)
}

/// A `*`, `-` or `•` bullet, or `N.`, followed by whitespace and the item text.
/// Returns whether the item is numbered.
fn parse_list_item(line: &str) -> Option<(bool, &str)> {
    let (ordered, rest) = if let Some(rest) = line.strip_prefix(['*', '-', '•']) {
        (false, rest)
    } else {
        let digits = line.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        (true, line[digits..].strip_prefix('.')?)
    };

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some((ordered, item))
}

/// Rewrite inline syntax (code, images, links, bold, italic) into tags.
fn render_inline(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    render_span(&chars)
}

fn render_span(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let rendered = match chars[i] {
            '`' => try_code_span(chars, i),
            '!' => try_image(chars, i),
            '[' => try_link(chars, i),
            '*' => try_delimited(chars, i, 2, "b").or_else(|| try_delimited(chars, i, 1, "i")),
            _ => None,
        };

        match rendered {
            Some((html, next)) => {
                out.push_str(&html);
                i = next;
            }
            None => {
                push_escaped(&mut out, chars[i]);
                i += 1;
            }
        }
    }

    out
}

/// `` `code` ``; the content is taken literally.
fn try_code_span(chars: &[char], start: usize) -> Option<(String, usize)> {
    let len = chars[start + 1..].iter().position(|&c| c == '`')?;
    if len == 0 {
        return None;
    }
    let code: String = chars[start + 1..start + 1 + len].iter().collect();
    Some((
        format!("<code>{}</code>", escape_code(&code)),
        start + len + 2,
    ))
}

fn try_image(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.get(start + 1) != Some(&'[') {
        return None;
    }
    let (alt, url, next) = parse_link_parts(chars, start + 1)?;
    let alt: String = alt.iter().collect();
    let html = if alt.trim().is_empty() {
        format!("<img src=\"{}\">", escape_attr(&url))
    } else {
        format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_attr(&url),
            escape_attr(alt.trim())
        )
    };
    Some((html, next))
}

fn try_link(chars: &[char], start: usize) -> Option<(String, usize)> {
    let (label, url, next) = parse_link_parts(chars, start)?;
    let label = render_span(label);
    let label = if label.trim().is_empty() {
        EMPTY_LINK_TEXT.to_string()
    } else {
        label
    };
    Some((format!("<a href=\"{}\">{label}</a>", escape_attr(&url)), next))
}

/// `[label](url)` starting at the `[`. Returns the label, the URL and the
/// offset after the closing parenthesis.
fn parse_link_parts(chars: &[char], start: usize) -> Option<(&[char], String, usize)> {
    let label_end = start + 1 + chars[start + 1..].iter().position(|&c| c == ']')?;
    if chars.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let url_start = label_end + 2;
    let url_len = chars[url_start..].iter().position(|&c| c == ')')?;
    let url: String = chars[url_start..url_start + url_len].iter().collect();
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    Some((
        &chars[start + 1..label_end],
        url.to_string(),
        url_start + url_len + 1,
    ))
}

/// `width` asterisks, a run without asterisks, then `width` asterisks again.
fn try_delimited(
    chars: &[char],
    start: usize,
    width: usize,
    tag: &str,
) -> Option<(String, usize)> {
    let is_delimiter = |at: usize| {
        chars
            .get(at..at + width)
            .is_some_and(|run| run.iter().all(|&c| c == '*'))
    };
    if !is_delimiter(start) {
        return None;
    }

    let inner_start = start + width;
    let len = chars[inner_start..].iter().take_while(|&&c| c != '*').count();
    let inner_end = inner_start + len;
    if len == 0 || !is_delimiter(inner_end) {
        return None;
    }

    let inner = render_span(&chars[inner_start..inner_end]);
    Some((format!("<{tag}>{inner}</{tag}>"), inner_end + width))
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(c),
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

/// Code is verbatim, so `&` is escaped too and `&lt;` written in a fence
/// survives entity decoding as `&lt;`.
fn escape_code(text: &str) -> String {
    escape_text(&text.replace('&', "&amp;"))
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
