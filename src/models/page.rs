use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::seo::{FieldValue, SeoPage};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Page {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub path: String,
    pub template: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub parent_id: Option<i64>,
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Page {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let raw: String = row.get("fields")?;
        let fields = serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Unreadable field map on page {:?}: {}", row.get::<_, i64>("id"), e);
            BTreeMap::new()
        });
        Ok(Page {
            id: row.get("id")?,
            parent_id: row.get("parent_id")?,
            name: row.get("name")?,
            path: row.get("path")?,
            template: row.get("template")?,
            fields,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM pages WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_path(pool: &DbPool, path: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM pages WHERE path = ?1",
            params![normalize_path(path)],
            Self::from_row,
        )
        .ok()
    }

    pub fn children(pool: &DbPool, parent_id: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM pages WHERE parent_id = ?1 ORDER BY name") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![parent_id], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn create(pool: &DbPool, form: &PageForm) -> Result<i64, String> {
        let path = Self::child_path(pool, form.parent_id, &form.name)?;
        let conn = pool.get().map_err(|e| e.to_string())?;
        let fields = serde_json::to_string(&form.fields).map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO pages (parent_id, name, path, template, fields) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![form.parent_id, slug::slugify(&form.name), path, form.template, fields],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    /// Update template and fields. Name and parent (and so the path) stay fixed.
    pub fn update(pool: &DbPool, id: i64, form: &PageForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let fields = serde_json::to_string(&form.fields).map_err(|e| e.to_string())?;
        let changed = conn
            .execute(
                "UPDATE pages SET template = ?1, fields = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?3",
                params![form.template, fields, id],
            )
            .map_err(|e| e.to_string())?;
        if changed == 0 {
            return Err(format!("Page {} not found", id));
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM pages WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn child_path(pool: &DbPool, parent_id: Option<i64>, name: &str) -> Result<String, String> {
        let segment = slug::slugify(name);
        if segment.is_empty() {
            return Err("Page name must contain letters or digits".to_string());
        }
        let parent_path = match parent_id {
            Some(id) => Self::find_by_id(pool, id)
                .map(|p| p.path)
                .ok_or_else(|| format!("Parent page {} not found", id))?,
            None => return Err("Only the root page may be created without a parent".to_string()),
        };
        Ok(format!("{}{}/", parent_path, segment))
    }
}

impl SeoPage for Page {
    fn template(&self) -> &str {
        &self.template
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

/// Page paths always start and end with `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
