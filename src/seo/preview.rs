use serde::Serialize;

use super::config::SeoConfig;
use super::fields::FieldKey;
use super::resolve::{ResolvedPageData, SeoPage};

/// Characters of the description shown in a search result snippet.
const SNIPPET_CHARS: usize = 155;

/// How a page would look as a search result, plus the length checks the
/// editor shows next to the title and description fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPreview {
    pub title: String,
    pub url: String,
    pub description: String,
    pub title_length: usize,
    pub description_length: usize,
    pub title_limit: usize,
    pub description_limit: usize,
    pub hard_limit: bool,
    pub title_over_limit: bool,
    pub description_over_limit: bool,
}

impl SearchPreview {
    pub fn build<P: SeoPage + ?Sized>(page: &P, data: &ResolvedPageData, config: &SeoConfig) -> Self {
        let title = data.get(&FieldKey::Title).trim().to_string();
        let description = data.get(&FieldKey::Description).trim().to_string();

        let page_canonical = page
            .field(&FieldKey::Canonical.page_field())
            .map(|v| v.as_text())
            .filter(|v| !v.trim().is_empty());
        let url = page_canonical.unwrap_or_else(|| data.get(&FieldKey::Canonical).to_string());

        let title_length = title.chars().count();
        let description_length = description.chars().count();

        SearchPreview {
            title: if title.is_empty() {
                "Title".to_string()
            } else {
                title
            },
            url,
            description: if description.is_empty() {
                "This is just a short description.".to_string()
            } else {
                description.chars().take(SNIPPET_CHARS).collect()
            },
            title_length,
            description_length,
            title_limit: config.title_limit,
            description_limit: config.description_limit,
            hard_limit: config.hard_limit,
            title_over_limit: config.title_limit > 0 && title_length > config.title_limit,
            description_over_limit: config.description_limit > 0
                && description_length > config.description_limit,
        }
    }
}
