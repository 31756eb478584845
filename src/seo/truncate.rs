use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Punctuation a truncated description may end on.
const BOUNDARIES: [&str; 6] = [". ", "? ", "! ", ", ", "; ", "-"];

/// Remove HTML tags, keeping their text content.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Shorten `text` to at most `max_len` characters without splitting words.
///
/// Cuts after the right-most sentence/clause boundary inside the window, or after
/// the last space when the punctuation would throw away more than a quarter of it.
/// A `max_len` of 0 disables truncation.
pub fn truncate_description(text: &str, max_len: usize) -> String {
    if max_len == 0 || text.chars().count() < max_len {
        return text.to_string();
    }

    let window: String = text.chars().take(max_len).collect();
    let window = window.trim();

    let char_pos = |byte: usize| window[..byte].chars().count();

    let mut best = BOUNDARIES
        .iter()
        .filter_map(|b| window.rfind(b))
        .map(char_pos)
        .max()
        .unwrap_or(0);

    if let Some(space) = window.rfind(' ').map(char_pos) {
        if space > best && (space as f64 - max_len as f64 / 4.0) > best as f64 {
            best = space;
        }
    }

    if best == 0 {
        best = max_len;
    }

    window.chars().take(best + 1).collect::<String>().trim().to_string()
}
