use std::path::PathBuf;
use std::sync::Arc;

use rocket::response::content::RawHtml;
use rocket::State;

use crate::inject::{resolve_for_request, SeoSlot};
use crate::render;
use crate::seo::RequestInfo;
use crate::store::Store;

// ── Pages ──────────────────────────────────────────────

#[get("/<path..>", rank = 10)]
pub fn page(
    store: &State<Arc<dyn Store>>,
    slot: &SeoSlot,
    request: RequestInfo,
    path: PathBuf,
) -> Option<RawHtml<String>> {
    let path = path
        .iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    let store: &dyn Store = store.inner().as_ref();
    let page = store.page_find_by_path(&path)?;
    let seo = resolve_for_request(slot, store, &page, &request);
    let site_name = store.setting_get_or("site_name", "Headwise");

    Some(RawHtml(render::render_page(&page, &site_name, seo)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![page]
}
