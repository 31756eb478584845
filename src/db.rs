use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const DEFAULT_DB_PATH: &str = "website/db/headwise.db";

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    let path = std::env::var("HEADWISE_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    init_pool_at(&path)
}

pub fn init_pool_at(path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    // Foreign keys are per connection; subtree deletes rely on the cascade
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Page tree. `fields` holds the page's field map as JSON.
        CREATE TABLE IF NOT EXISTS pages (
            id INTEGER PRIMARY KEY,
            parent_id INTEGER REFERENCES pages(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            path TEXT UNIQUE NOT NULL,
            template TEXT NOT NULL,
            fields TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_pages_parent ON pages(parent_id);

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // General
        ("site_name", "Headwise"),
        ("admin_api_token", ""),
        // SEO: site-wide defaults
        ("seo_author", ""),
        ("seo_title", ""),
        ("seo_title_smart", r#"["title"]"#),
        ("seo_description", ""),
        ("seo_description_smart", "[]"),
        ("seo_image", ""),
        ("seo_image_smart", "[]"),
        ("seo_title_format", ""),
        ("seo_canonical_protocol", "auto"),
        ("seo_robots", r#"["index","follow"]"#),
        ("seo_custom", ""),
        ("seo_custom_head", ""),
        ("seo_custom_body", ""),
        // SEO: output
        ("seo_include_generator", "true"),
        ("seo_include_open_graph", "true"),
        ("seo_include_twitter", "true"),
        ("seo_twitter_username", ""),
        ("seo_use_parents", "false"),
        ("seo_method", "auto"),
        ("seo_add_whitespace", "true"),
        ("seo_include_templates", r#"["home","basic-page"]"#),
        // SEO: request origin
        ("seo_trust_proxy", "false"),
        ("seo_http_hosts", "[]"),
        // SEO: analytics
        ("seo_google_analytics", ""),
        ("seo_google_analytics_anonymize_ip", "false"),
        ("seo_piwik_url", ""),
        ("seo_piwik_site_id", ""),
        // SEO: limits
        ("seo_hard_limit", "false"),
        ("seo_title_limit", "60"),
        ("seo_description_limit", "160"),
        ("seo_truncate_description", "true"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    // Seed the root page if the tree is empty
    let page_count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;

    if page_count == 0 {
        conn.execute(
            "INSERT INTO pages (parent_id, name, path, template, fields) VALUES (NULL, ?1, ?2, ?3, ?4)",
            params!["home", "/", "home", r#"{"title":"Home"}"#],
        )?;
    }

    Ok(())
}
