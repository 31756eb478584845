use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::models::page::PageForm;
use crate::seo::preview::SearchPreview;
use crate::seo::{self, RequestInfo, SeoConfig};
use crate::store::Store;

type ApiResult = Result<Json<Value>, (Status, Json<Value>)>;

fn api_error(status: Status, message: &str) -> (Status, Json<Value>) {
    (status, Json(json!({ "ok": false, "error": message })))
}

// ── Admin token guard ──

/// Admin API access: the `X-Admin-Token` header must match the
/// `admin_api_token` setting. An empty setting disables the API.
pub struct AdminToken;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let store = match request.rocket().state::<Arc<dyn Store>>() {
            Some(s) => s,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };
        let expected = store.setting_get_or("admin_api_token", "");
        if expected.is_empty() {
            return Outcome::Error((Status::Forbidden, ()));
        }
        match request.headers().get_one("X-Admin-Token") {
            Some(token) if token == expected => Outcome::Success(AdminToken),
            _ => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// Keys the settings endpoint accepts.
fn is_seo_setting(key: &str) -> bool {
    key == "site_name" || key.starts_with("seo_")
}

// ── Settings ───────────────────────────────────────────

#[get("/seo/settings")]
pub fn seo_settings(_admin: AdminToken, store: &State<Arc<dyn Store>>) -> Json<Value> {
    let mut settings = store.setting_get_group("seo_");
    if let Some(name) = store.setting_get("site_name") {
        settings.insert("site_name".to_string(), name);
    }
    let config = SeoConfig::from_settings(&store.setting_all());
    Json(json!({
        "settings": settings,
        "site_meta": config.site_meta(),
    }))
}

#[post("/seo/settings", data = "<form>")]
pub fn seo_settings_save(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    form: Json<HashMap<String, String>>,
) -> ApiResult {
    let data = form.into_inner();
    if let Some(bad) = data.keys().find(|k| !is_seo_setting(k)) {
        return Err(api_error(Status::BadRequest, &format!("Unknown setting: {}", bad)));
    }

    store
        .setting_set_many(&data)
        .map_err(|e| api_error(Status::InternalServerError, &e))?;

    info!("Saved {} SEO setting(s)", data.len());
    Ok(Json(json!({ "ok": true, "updated": data.len() })))
}

#[delete("/seo/settings/<key>")]
pub fn seo_setting_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, key: &str) -> ApiResult {
    if !is_seo_setting(key) {
        return Err(api_error(Status::BadRequest, &format!("Unknown setting: {}", key)));
    }
    store
        .setting_delete(key)
        .map_err(|e| api_error(Status::InternalServerError, &e))?;
    info!("Removed SEO setting {}", key);
    Ok(Json(json!({ "ok": true })))
}

// ── Resolved data / preview ────────────────────────────

#[get("/seo/pages/<id>")]
pub fn seo_page(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    request: RequestInfo,
    id: i64,
) -> ApiResult {
    let store: &dyn Store = store.inner().as_ref();
    let page = store
        .page_find_by_id(id)
        .ok_or_else(|| api_error(Status::NotFound, "Page not found"))?;
    let config = SeoConfig::load(store, Some(&request.host));
    let data = seo::resolve(&page, store, &config, &request);
    Ok(Json(json!({
        "ok": true,
        "included": config.includes_template(&page.template),
        "seo": data,
    })))
}

#[get("/seo/preview/<id>")]
pub fn seo_preview(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    request: RequestInfo,
    id: i64,
) -> ApiResult {
    let store: &dyn Store = store.inner().as_ref();
    let page = store
        .page_find_by_id(id)
        .ok_or_else(|| api_error(Status::NotFound, "Page not found"))?;
    let config = SeoConfig::load(store, Some(&request.host));
    let data = seo::resolve(&page, store, &config, &request);
    let preview = SearchPreview::build(&page, &data, &config);
    Ok(Json(json!({ "ok": true, "preview": preview })))
}

// ── Pages ──────────────────────────────────────────────

#[get("/pages/<id>")]
pub fn page_get(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> ApiResult {
    let page = store
        .page_find_by_id(id)
        .ok_or_else(|| api_error(Status::NotFound, "Page not found"))?;
    let children = store.page_children(id);
    Ok(Json(json!({ "ok": true, "page": page, "children": children })))
}

#[post("/pages", data = "<form>")]
pub fn page_create(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    form: Json<PageForm>,
) -> ApiResult {
    let id = store
        .page_create(&form)
        .map_err(|e| api_error(Status::BadRequest, &e))?;
    let page = store.page_find_by_id(id);
    Ok(Json(json!({ "ok": true, "id": id, "page": page })))
}

#[put("/pages/<id>", data = "<form>")]
pub fn page_update(
    _admin: AdminToken,
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Json<PageForm>,
) -> ApiResult {
    store
        .page_update(id, &form)
        .map_err(|e| api_error(Status::NotFound, &e))?;
    Ok(Json(json!({ "ok": true, "page": store.page_find_by_id(id) })))
}

#[delete("/pages/<id>")]
pub fn page_delete(_admin: AdminToken, store: &State<Arc<dyn Store>>, id: i64) -> ApiResult {
    let page = store
        .page_find_by_id(id)
        .ok_or_else(|| api_error(Status::NotFound, "Page not found"))?;
    if page.parent_id.is_none() {
        return Err(api_error(Status::BadRequest, "The root page cannot be deleted"));
    }
    store
        .page_delete(id)
        .map_err(|e| api_error(Status::InternalServerError, &e))?;
    Ok(Json(json!({ "ok": true })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        seo_settings,
        seo_settings_save,
        seo_setting_delete,
        seo_page,
        seo_preview,
        page_get,
        page_create,
        page_update,
        page_delete,
    ]
}
