//! Entity decoding and residual tag stripping for text runs.

/// Longest reference we try to decode, `&` through `;` inclusive.
const MAX_ENTITY_LEN: usize = 12;

/// Turn leftover markup into plain text.
///
/// `<br>` variants become newlines, every other `<...>` run is removed, then
/// character references are decoded. Stripping happens first so that an
/// escaped `&lt;b&gt;` survives as literal text.
pub(crate) fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match candidate.find('>') {
            Some(close) => {
                if is_line_break(&candidate[..=close]) {
                    result.push('\n');
                }
                rest = &candidate[close + 1..];
            }
            None => {
                // A lone `<` with nothing to close it is just text
                result.push_str(candidate);
                rest = "";
            }
        }
    }
    result.push_str(rest);

    decode_entities(&result)
}

/// Matches `<br>`, `<br/>` and `<br />` in any case.
fn is_line_break(tag: &str) -> bool {
    let inner = tag[1..tag.len() - 1].trim_end();
    let inner = inner.strip_suffix('/').unwrap_or(inner).trim_end();
    inner.eq_ignore_ascii_case("br")
}

/// Decode the named entities the source platform emits plus numeric references.
///
/// Unknown or malformed references are copied through unchanged. Decoding is a
/// single pass, so `&amp;lt;` becomes `&lt;` rather than `<`.
pub(crate) fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match try_parse_entity(candidate) {
            Some((decoded, consumed)) => {
                result.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                result.push('&');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Parse a reference at the start of `text` (which begins with `&`).
/// Returns the decoded character and the number of bytes consumed.
fn try_parse_entity(text: &str) -> Option<(char, usize)> {
    let end = text
        .bytes()
        .take(MAX_ENTITY_LEN)
        .position(|b| b == b';')?;
    let body = &text[1..end];

    let decoded = match body.strip_prefix('#') {
        Some(number) => decode_numeric(number)?,
        None => decode_named(body)?,
    };

    Some((decoded, end + 1))
}

fn decode_named(name: &str) -> Option<char> {
    let decoded = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        // Rendered as a plain space; the API collapses it anyway
        "nbsp" => ' ',
        _ => return None,
    };
    Some(decoded)
}

fn decode_numeric(number: &str) -> Option<char> {
    let (digits, radix) = match number.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (number, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let code_point = u32::from_str_radix(digits, radix).ok()?;
    if code_point == 0 {
        return Some('\u{FFFD}');
    }
    Some(char::from_u32(code_point).unwrap_or('\u{FFFD}'))
}
