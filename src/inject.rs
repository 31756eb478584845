use std::io::Cursor;
use std::sync::{Arc, LazyLock, OnceLock};

use log::{debug, error, warn};
use regex::{NoExpand, Regex};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, Response};

use crate::models::page::Page;
use crate::models::settings::{parse_bool, parse_list};
use crate::seo::config::strip_port;
use crate::seo::{self, InjectionMethod, RequestInfo, ResolvedPageData, SeoConfig, SeoPage};
use crate::store::Store;

static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head>").unwrap());
static BODY_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body>").unwrap());

/// SEO data resolved for the page rendered by the current request.
#[derive(Debug)]
pub struct PageSeo {
    pub data: ResolvedPageData,
    pub method: InjectionMethod,
}

/// Request-local, set-once holder of the page's SEO data.
///
/// The first resolution in a request is kept; the page renderer and the
/// injection fairing both read that same value.
#[derive(Debug, Default)]
pub struct SeoSlot(OnceLock<PageSeo>);

impl SeoSlot {
    pub fn get(&self) -> Option<&PageSeo> {
        self.0.get()
    }

    pub fn get_or_resolve<F>(&self, resolve: F) -> &PageSeo
    where
        F: FnOnce() -> PageSeo,
    {
        self.0.get_or_init(resolve)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r SeoSlot {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(request.local_cache(SeoSlot::default))
    }
}

// ── Request scheme / host guard ──

/// Which request headers may name the site's scheme and host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostPolicy {
    /// Honour `X-Forwarded-Proto` / `X-Forwarded-Host` (set only behind a proxy).
    pub trust_proxy: bool,
    /// Hosts the site answers to. Empty accepts any `Host`.
    pub allowed_hosts: Vec<String>,
}

impl HostPolicy {
    pub fn load(store: &dyn Store) -> Self {
        HostPolicy {
            trust_proxy: parse_bool(&store.setting_get_or("seo_trust_proxy", "false")),
            allowed_hosts: parse_list(&store.setting_get_or("seo_http_hosts", "")),
        }
    }

    fn allows(&self, host: &str) -> bool {
        self.allowed_hosts.iter().any(|allowed| {
            allowed.eq_ignore_ascii_case(host) || allowed.eq_ignore_ascii_case(strip_port(host))
        })
    }
}

fn first_value(header: Option<&str>) -> Option<&str> {
    header
        .map(|h| h.split(',').next().unwrap_or("").trim())
        .filter(|h| !h.is_empty())
}

/// Scheme and host for URL building. Forwarded headers count only when the
/// policy trusts the proxy; a host outside the allowlist is replaced by the
/// first allowed host.
pub fn request_origin(
    policy: &HostPolicy,
    tls: bool,
    host: Option<&str>,
    forwarded_proto: Option<&str>,
    forwarded_host: Option<&str>,
) -> RequestInfo {
    let (https, candidate) = if policy.trust_proxy {
        let https = first_value(forwarded_proto)
            .map(|p| p.eq_ignore_ascii_case("https"))
            .unwrap_or(tls);
        (https, first_value(forwarded_host).or_else(|| first_value(host)))
    } else {
        (tls, first_value(host))
    };

    let host = match (candidate, policy.allowed_hosts.first()) {
        (Some(h), _) if policy.allowed_hosts.is_empty() || policy.allows(h) => h.to_string(),
        (Some(h), Some(fallback)) => {
            debug!("Host {} is not in seo_http_hosts, using {}", h, fallback);
            fallback.clone()
        }
        (None, Some(fallback)) => fallback.clone(),
        (_, None) => "localhost".to_string(),
    };

    RequestInfo::new(https, &host)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestInfo {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let policy = match request.rocket().state::<Arc<dyn Store>>() {
            Some(store) => HostPolicy::load(store.as_ref()),
            None => HostPolicy::default(),
        };
        let headers = request.headers();

        Outcome::Success(request_origin(
            &policy,
            request.rocket().config().tls_enabled(),
            headers.get_one("Host"),
            headers.get_one("X-Forwarded-Proto"),
            headers.get_one("X-Forwarded-Host"),
        ))
    }
}

/// Resolve (once per request) the SEO data of `page`.
/// Pages whose template is not enabled for SEO get `None`.
pub fn resolve_for_request<'a>(
    slot: &'a SeoSlot,
    store: &dyn Store,
    page: &Page,
    request: &RequestInfo,
) -> Option<&'a PageSeo> {
    if let Some(seo) = slot.get() {
        return Some(seo);
    }

    let config = SeoConfig::load(store, Some(&request.host));
    if !config.includes_template(page.template()) {
        debug!("Template {} has no SEO output", page.template());
        return None;
    }

    Some(slot.get_or_resolve(|| PageSeo {
        data: seo::resolve(page, store, &config, request),
        method: config.method,
    }))
}

/// Splice head markup before `</head>` and the body fragment before `</body>`.
/// Every occurrence is replaced, case-insensitively.
pub fn inject_markup(html: &str, data: &ResolvedPageData) -> String {
    let head = format!("{}{}\n</head>", data.rendered, data.custom_head);
    let body = format!("{}\n</body>", data.custom_body);
    let html = HEAD_CLOSE.replace_all(html, NoExpand(&head));
    BODY_CLOSE.replace_all(&html, NoExpand(&body)).into_owned()
}

// ── Auto injection fairing ──

/// Response fairing for the `auto` injection method: rewrites HTML responses of
/// requests that resolved SEO data.
pub struct SeoInjectFairing;

#[rocket::async_trait]
impl Fairing for SeoInjectFairing {
    fn info(&self) -> Info {
        Info {
            name: "SEO Head Injection",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(seo) = req.local_cache(SeoSlot::default).get() else {
            return;
        };
        if seo.method != InjectionMethod::Auto {
            return;
        }
        if !res.content_type().map(|ct| ct.is_html()).unwrap_or(false) {
            return;
        }

        let bytes = match res.body_mut().to_bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                // The body is gone once reading starts; do not send a truncated page
                error!("SEO injection failed reading body for {}: {}", req.uri(), e);
                res.set_status(Status::InternalServerError);
                res.set_sized_body(0, Cursor::new(Vec::new()));
                return;
            }
        };

        match String::from_utf8(bytes) {
            Ok(body) => {
                let injected = inject_markup(&body, &seo.data);
                res.set_sized_body(injected.len(), Cursor::new(injected));
            }
            Err(e) => {
                warn!("SEO injection skipped for {}: body is not UTF-8", req.uri());
                let bytes = e.into_bytes();
                res.set_sized_body(bytes.len(), Cursor::new(bytes));
            }
        }
    }
}
