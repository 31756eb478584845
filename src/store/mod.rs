use std::collections::HashMap;

use crate::models::page::{Page, PageForm};
use crate::seo::PageTree;

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementation: `SqliteStore` (wraps rusqlite/r2d2).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Option<String>;
    fn setting_get_or(&self, key: &str, default: &str) -> String {
        self.setting_get(key).unwrap_or_else(|| default.to_string())
    }
    fn setting_set(&self, key: &str, value: &str) -> Result<(), String>;
    fn setting_set_many(&self, settings: &HashMap<String, String>) -> Result<(), String>;
    fn setting_get_group(&self, prefix: &str) -> HashMap<String, String>;
    fn setting_all(&self) -> HashMap<String, String>;
    fn setting_delete(&self, key: &str) -> Result<(), String>;

    // ── Pages ───────────────────────────────────────────────────────
    fn page_find_by_id(&self, id: i64) -> Option<Page>;
    fn page_find_by_path(&self, path: &str) -> Option<Page>;
    fn page_children(&self, parent_id: i64) -> Vec<Page>;
    fn page_create(&self, form: &PageForm) -> Result<i64, String>;
    fn page_update(&self, id: i64, form: &PageForm) -> Result<(), String>;
    fn page_delete(&self, id: i64) -> Result<(), String>;
}

impl<S: Store + ?Sized> PageTree for S {
    type Page = Page;

    fn parent_of(&self, page: &Page) -> Option<Page> {
        page.parent_id.and_then(|id| self.page_find_by_id(id))
    }
}
