//! Link extraction from raw page bytes
//!
//! This is a literal attribute scan, not a markup parser. It looks for
//! `name="value"` and `name='value'` anywhere in the body and knows nothing about
//! tags, comments or scripts, so it will pick up attribute-looking text inside
//! scripts and miss unquoted values. Every value it returns is only a candidate
//! reference for the resolver.

/// Attribute holding hyperlink targets
pub const HREF: &str = "href";

/// Attribute holding embedded resource sources
pub const SRC: &str = "src";

/// Values shorter than this are ignored (`"#"`, `"/"`, single letters)
const MIN_VALUE_LEN: usize = 2;

/// Extracts every quoted value assigned to `attribute`
///
/// # Matching Rules
///
/// - `attribute` is matched literally and case-sensitively, anywhere in the input
/// - It must be followed by optional whitespace, at least one `=`, and optional
///   whitespace (`href = "x"` and `href=="x"` both match)
/// - The value must open with `"` or `'` and runs to the next identical quote
/// - Unterminated values and values shorter than two bytes are skipped
///
/// # Arguments
///
/// * `page` - The raw response body
/// * `attribute` - Attribute name to look for, e.g. `href`
///
/// # Returns
///
/// The values in document order, duplicates included
///
/// # Example
///
/// ```
/// use sumi_mirror::crawler::extract_attribute_values;
///
/// let page = br#"<a href="http://a/b">x</a> <img src='img.png'> <a href=no-quotes>"#;
/// assert_eq!(extract_attribute_values(page, "href"), vec!["http://a/b"]);
/// assert_eq!(extract_attribute_values(page, "src"), vec!["img.png"]);
/// ```
pub fn extract_attribute_values(page: &[u8], attribute: &str) -> Vec<String> {
    let needle = attribute.as_bytes();
    let mut values = Vec::new();

    if needle.is_empty() {
        return values;
    }

    let mut search_from = 0;
    while let Some(offset) = find(&page[search_from..], needle) {
        let after_name = search_from + offset + needle.len();
        search_from = after_name;

        let Some(value_start) = skip_assignment(page, after_name) else {
            continue;
        };

        let quote = page[value_start];
        let body = &page[value_start + 1..];
        let Some(len) = body.iter().position(|&b| b == quote) else {
            continue;
        };

        let value = &body[..len];
        if value.len() >= MIN_VALUE_LEN {
            values.push(String::from_utf8_lossy(value).into_owned());
        }
    }

    values
}

/// Extracts candidate references for both hyperlinks and embedded resources
///
/// Returns the `href` values followed by the `src` values.
pub fn extract_links(page: &[u8]) -> Vec<String> {
    let mut links = extract_attribute_values(page, HREF);
    links.extend(extract_attribute_values(page, SRC));
    links
}

/// Skips `\s*=+\s*` after an attribute name
///
/// Returns the index of the opening quote, or None if the assignment is missing
/// or the value is not quoted.
fn skip_assignment(page: &[u8], mut cursor: usize) -> Option<usize> {
    let mut saw_equals = false;

    while let Some(&b) = page.get(cursor) {
        match b {
            b'=' => saw_equals = true,
            b if b.is_ascii_whitespace() => {}
            _ => break,
        }
        cursor += 1;
    }

    match page.get(cursor) {
        Some(b'"') | Some(b'\'') if saw_equals => Some(cursor),
        _ => None,
    }
}

/// Finds the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
