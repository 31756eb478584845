use std::collections::HashMap;

use crate::models::page::{Page, PageForm};
use crate::models::settings::Setting;

use super::Store;

pub use crate::db::DbPool;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool and delegates to model methods.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Option<String> {
        Setting::get(&self.pool, key)
    }

    fn setting_set(&self, key: &str, value: &str) -> Result<(), String> {
        Setting::set(&self.pool, key, value)
    }

    fn setting_set_many(&self, settings: &HashMap<String, String>) -> Result<(), String> {
        Setting::set_many(&self.pool, settings)
    }

    fn setting_get_group(&self, prefix: &str) -> HashMap<String, String> {
        Setting::get_group(&self.pool, prefix)
    }

    fn setting_all(&self) -> HashMap<String, String> {
        Setting::all(&self.pool)
    }

    fn setting_delete(&self, key: &str) -> Result<(), String> {
        Setting::delete(&self.pool, key)
    }

    // ── Pages ───────────────────────────────────────────────────────

    fn page_find_by_id(&self, id: i64) -> Option<Page> {
        Page::find_by_id(&self.pool, id)
    }

    fn page_find_by_path(&self, path: &str) -> Option<Page> {
        Page::find_by_path(&self.pool, path)
    }

    fn page_children(&self, parent_id: i64) -> Vec<Page> {
        Page::children(&self.pool, parent_id)
    }

    fn page_create(&self, form: &PageForm) -> Result<i64, String> {
        Page::create(&self.pool, form)
    }

    fn page_update(&self, id: i64, form: &PageForm) -> Result<(), String> {
        Page::update(&self.pool, id, form)
    }

    fn page_delete(&self, id: i64) -> Result<(), String> {
        Page::delete(&self.pool, id)
    }
}
