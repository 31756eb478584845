use log::warn;

use super::truncate::strip_tags;

/// Separator between key and value in a custom tag line.
const SEPARATOR: &str = ":=";

/// Longest value kept for a custom tag.
const MAX_VALUE_CHARS: usize = 255;

/// Parse custom tag lines of the form `key := value`, one per line.
///
/// Keys are sanitized to `[A-Za-z0-9\-.:_]` (spaces become `-`), values are
/// entity-decoded and flattened to single-line text. Blank lines are ignored and
/// lines without `:=` are skipped. A repeated key keeps its first position and
/// takes the last value.
pub fn parse_custom(block: &str) -> Vec<(String, String)> {
    let mut tags: Vec<(String, String)> = Vec::new();

    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = line.split_once(SEPARATOR) else {
            warn!("Skipping custom tag line without '{}': {:?}", SEPARATOR, line.trim());
            continue;
        };

        let key = sanitize_key(raw_key);
        if key.is_empty() {
            warn!("Skipping custom tag line with empty key: {:?}", line.trim());
            continue;
        }
        let value = sanitize_text(&html_escape::decode_html_entities(raw_value));

        match tags.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => tags.push((key, value)),
        }
    }

    tags
}

/// Merge site-wide and page-level custom tags. Page entries win on key collision.
pub fn merge_custom(site: Vec<(String, String)>, page: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut merged = site;
    for (key, value) in page {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

/// Tag names keep only `[A-Za-z0-9\-.:_]`; spaces become `-`.
pub(crate) fn sanitize_key(raw: &str) -> String {
    raw.trim()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | ':' | '_'))
        .collect()
}

/// Single-line plain text: tags removed, whitespace collapsed, length capped.
pub fn sanitize_text(value: &str) -> String {
    let stripped = strip_tags(value);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_VALUE_CHARS).collect::<String>().trim().to_string()
}
