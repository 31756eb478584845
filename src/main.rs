#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};

mod boot;
mod db;
mod inject;
mod models;
mod render;
mod routes;
mod seo;
mod store;


use inject::SeoInjectFairing;
use store::sqlite::SqliteStore;
use store::Store;

/// Mount point of the JSON admin API.
pub const ADMIN_API_MOUNT: &str = "/admin/api";

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><head><title>Not found</title></head><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Assemble the server around an already migrated store.
pub fn build_rocket(store: Arc<dyn Store>) -> Rocket<Build> {
    rocket::build()
        .manage(store)
        .attach(SeoInjectFairing)
        .mount("/", routes::public::routes())
        .mount(ADMIN_API_MOUNT, routes::admin_api::routes())
        .register("/", catchers![not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    // Boot check: database directory and config file
    boot::run();

    let pool = db::init_pool().expect("Failed to initialize database pool");
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
    store.run_migrations().expect("Failed to run database migrations");
    store.seed_defaults().expect("Failed to seed default settings");

    if store.setting_get_or("admin_api_token", "").is_empty() {
        log::warn!("admin_api_token is empty; the admin API at {} is disabled", ADMIN_API_MOUNT);
    }

    build_rocket(store)
}
