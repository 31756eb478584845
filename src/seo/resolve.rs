use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::config::{FieldDefaults, SeoConfig};
use super::custom::{merge_custom, parse_custom, sanitize_key};
use super::fields::{FieldKey, FieldValue, ImageRef, PAGE_FIELD_PREFIX};
use super::render::render_head;
use super::truncate::{strip_tags, truncate_description};

/// Deepest ancestor chain followed when inheriting values from parents.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// Read access to a page, as the resolver needs it.
pub trait SeoPage {
    fn template(&self) -> &str;
    /// Site-relative path, e.g. `/about/team/`.
    fn path(&self) -> &str;
    fn is_root(&self) -> bool;
    fn field(&self, name: &str) -> Option<&FieldValue>;
    fn field_names(&self) -> Vec<String>;
}

/// Ancestor traversal over the page tree.
pub trait PageTree {
    type Page: SeoPage;

    fn parent_of(&self, page: &Self::Page) -> Option<Self::Page>;
}

/// What the resolver needs to know about the current request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    pub https: bool,
    pub host: String,
}

impl RequestInfo {
    pub fn new(https: bool, host: &str) -> Self {
        RequestInfo {
            https,
            host: host.to_string(),
        }
    }

    /// Site root URL with a trailing slash.
    pub fn root_url(&self, https: bool) -> String {
        format!("{}://{}/", if https { "https" } else { "http" }, self.host)
    }
}

/// Ordered string mapping; setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaMap(Vec<(String, String)>);

impl MetaMap {
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Value for `key`, empty when absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MetaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Final SEO data for one page render.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolvedPageData {
    pub meta: MetaMap,
    /// Raw fragment injected before `</head>`.
    pub custom_head: String,
    /// Raw fragment injected before `</body>`.
    pub custom_body: String,
    /// Rendered `<head>` markup: meta tags plus analytics snippets.
    pub rendered: String,
}

impl ResolvedPageData {
    pub fn get(&self, key: &FieldKey) -> &str {
        self.meta.text(key.as_str())
    }
}

/// A primitive's resolved value. Images keep their reference until derived
/// fields are computed.
enum Resolved {
    Text(String),
    Image(Option<ImageRef>),
    Options(Vec<String>),
}

impl Resolved {
    fn is_empty(&self) -> bool {
        match self {
            Resolved::Text(s) => s.trim().is_empty(),
            Resolved::Image(i) => i.is_none(),
            Resolved::Options(o) => o.is_empty(),
        }
    }
}

/// Resolve the SEO data of `page`.
///
/// Page values win. Empty values are filled from ancestors when inheritance is on,
/// otherwise from template defaults, template smart fields, site defaults and site
/// smart fields, in that order. Derived Open Graph / Twitter keys, robots and
/// custom tags are computed afterwards and the head markup is rendered.
pub fn resolve<T>(page: &T::Page, tree: &T, config: &SeoConfig, request: &RequestInfo) -> ResolvedPageData
where
    T: PageTree + ?Sized,
{
    let template = config.template(page.template());
    let https = config.canonical_protocol.use_https(request.https);
    let root_url = request.root_url(https);

    let mut keys: Vec<FieldKey> = FieldKey::PRIMITIVES.to_vec();
    let mut extra: Vec<String> = page
        .field_names()
        .into_iter()
        .filter_map(|name| name.strip_prefix(PAGE_FIELD_PREFIX).map(str::to_string))
        .filter(|name| !FieldKey::PRIMITIVES.iter().any(|k| k.as_str() == name))
        .filter(|name| {
            // Names become tag attributes; anything sanitizing would change is dropped
            let clean = !name.is_empty() && sanitize_key(name) == *name;
            if !clean {
                debug!("Ignoring page field seo_{}: not a valid tag name", name);
            }
            clean
        })
        .collect();
    extra.sort();
    keys.extend(extra.into_iter().map(FieldKey::Other));

    let mut meta = MetaMap::default();
    let mut image: Option<ImageRef> = None;
    let mut robots: Vec<String> = Vec::new();

    for key in &keys {
        let mut value = page_value(page, key);
        if value.is_empty() && key.inherits() {
            value = if config.use_parents {
                inherited_value(page, tree, key)
            } else {
                default_value(page, key, template, config)
            };
        }

        match value {
            Resolved::Image(img) => {
                meta.set(key.as_str(), &img.as_ref().map(|i| i.absolute_url(&root_url)).unwrap_or_default());
                if *key == FieldKey::Image {
                    image = img;
                }
            }
            Resolved::Options(opts) => {
                if *key == FieldKey::Robots {
                    // Placeholder keeps the key's position; joined after fallbacks
                    meta.set(key.as_str(), "");
                    robots = opts;
                } else {
                    meta.set(key.as_str(), &opts.join(", "));
                }
            }
            Resolved::Text(text) => meta.set(key.as_str(), &text),
        }
    }

    if config.include_generator {
        meta.set(FieldKey::Generator.as_str(), &config.generator);
    }
    if !config.author.is_empty() {
        meta.set(FieldKey::Author.as_str(), &config.author);
    }

    // Robots: page selection, else template list, else site list
    if robots.is_empty() {
        robots = template
            .map(|t| t.robots.clone())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| config.site.robots.clone());
    }
    meta.set(FieldKey::Robots.as_str(), &robots.join(", "));

    let canonical = canonical_url(meta.text(FieldKey::Canonical.as_str()), page.path(), &root_url);
    meta.set(FieldKey::Canonical.as_str(), &canonical);

    let og_title = first_non_empty(meta.text("og_title"), meta.text("title")).to_string();
    let og_description = first_non_empty(meta.text("og_description"), meta.text("description")).to_string();
    let image_url = image.as_ref().map(|i| i.absolute_url(&root_url)).unwrap_or_default();

    if config.include_open_graph {
        meta.set(FieldKey::OgSiteName.as_str(), &config.site_name);
        meta.set(FieldKey::OgTitle.as_str(), &og_title);
        meta.set(FieldKey::OgUrl.as_str(), &canonical);
        meta.set(FieldKey::OgDescription.as_str(), &og_description);
        meta.set(FieldKey::OgType.as_str(), "website");
        meta.set(FieldKey::OgImage.as_str(), &image_url);
    }

    if config.include_twitter {
        meta.set(FieldKey::TwitterCard.as_str(), "summary");
        if !config.twitter_username.is_empty() {
            meta.set(FieldKey::TwitterSite.as_str(), &format!("@{}", config.twitter_username));
        }
        meta.set(FieldKey::TwitterTitle.as_str(), &og_title);
        meta.set(FieldKey::TwitterUrl.as_str(), &canonical);
        meta.set(FieldKey::TwitterDescription.as_str(), &og_description);
        meta.set(FieldKey::TwitterImage.as_str(), &image_url);
    }

    let custom = merge_custom(parse_custom(&config.site.custom), parse_custom(meta.text("custom")));
    for (key, value) in &custom {
        meta.set(key, value);
    }

    let custom_head = meta.text(FieldKey::CustomHead.as_str()).to_string();
    let custom_body = meta.text(FieldKey::CustomBody.as_str()).to_string();
    let rendered = render_head(&meta, config);

    debug!(
        "Resolved SEO data for {} ({} keys, template {})",
        page.path(),
        meta.len(),
        page.template()
    );

    ResolvedPageData {
        meta,
        custom_head,
        custom_body,
        rendered,
    }
}

fn first_non_empty<'a>(a: &'a str, b: &'a str) -> &'a str {
    if a.trim().is_empty() {
        b
    } else {
        a
    }
}

/// The page's own value for `key`, typed by what the key holds.
fn page_value<P: SeoPage + ?Sized>(page: &P, key: &FieldKey) -> Resolved {
    let value = page.field(&key.page_field());
    match key {
        FieldKey::Image => Resolved::Image(value.and_then(FieldValue::first_image)),
        FieldKey::Robots => Resolved::Options(value.map(FieldValue::options).unwrap_or_default()),
        _ => Resolved::Text(value.map(FieldValue::as_text).unwrap_or_default()),
    }
}

/// Walk up the tree until an ancestor has a value for `key`.
/// The root's own value counts; the walk ends once the current page is the root.
fn inherited_value<T>(page: &T::Page, tree: &T, key: &FieldKey) -> Resolved
where
    T: PageTree + ?Sized,
{
    if page.is_root() {
        return empty_for(key);
    }
    let mut current = match tree.parent_of(page) {
        Some(parent) => parent,
        None => return empty_for(key),
    };

    for _ in 0..MAX_ANCESTOR_DEPTH {
        let value = page_value(&current, key);
        if !value.is_empty() || current.is_root() {
            return value;
        }
        current = match tree.parent_of(&current) {
            Some(parent) => parent,
            None => return empty_for(key),
        };
    }

    debug!("Ancestor walk for {} stopped at depth {}", key, MAX_ANCESTOR_DEPTH);
    empty_for(key)
}

fn empty_for(key: &FieldKey) -> Resolved {
    match key {
        FieldKey::Image => Resolved::Image(None),
        FieldKey::Robots => Resolved::Options(Vec::new()),
        _ => Resolved::Text(String::new()),
    }
}

/// Template default, template smart fields, site default, site smart fields.
fn default_value<P: SeoPage + ?Sized>(
    page: &P,
    key: &FieldKey,
    template: Option<&FieldDefaults>,
    config: &SeoConfig,
) -> Resolved {
    let site = &config.site;
    let layers: Vec<&FieldDefaults> = template.into_iter().chain(std::iter::once(site)).collect();

    match key {
        FieldKey::Title => {
            for layer in &layers {
                if !layer.title.is_empty() {
                    return Resolved::Text(layer.title.clone());
                }
                if let Some(text) = smart_text(page, &layer.title_smart) {
                    return Resolved::Text(text);
                }
            }
            Resolved::Text(String::new())
        }
        FieldKey::Description => {
            let limit = if config.truncate_description {
                config.description_limit
            } else {
                0
            };
            for layer in &layers {
                if !layer.description.is_empty() {
                    return Resolved::Text(layer.description.clone());
                }
                if let Some(text) = smart_text(page, &layer.description_smart) {
                    return Resolved::Text(truncate_description(&text, limit));
                }
            }
            Resolved::Text(String::new())
        }
        FieldKey::Image => {
            for layer in &layers {
                if !layer.image.is_empty() {
                    return Resolved::Image(Some(ImageRef::from_url(&layer.image)));
                }
                if let Some(img) = smart_image(page, &layer.image_smart) {
                    return Resolved::Image(Some(img));
                }
            }
            Resolved::Image(None)
        }
        FieldKey::Custom | FieldKey::CustomHead | FieldKey::CustomBody => {
            let pick = |layer: &FieldDefaults| match key {
                FieldKey::Custom => layer.custom.clone(),
                FieldKey::CustomHead => layer.custom_head.clone(),
                _ => layer.custom_body.clone(),
            };
            let value = layers
                .iter()
                .map(|layer| pick(layer))
                .find(|v| !v.trim().is_empty())
                .unwrap_or_default();
            Resolved::Text(value)
        }
        // Robots fall back in a separate step; other keys have no defaults
        _ => empty_for(key),
    }
}

/// First non-empty listed page field, tags stripped.
fn smart_text<P: SeoPage + ?Sized>(page: &P, fields: &[String]) -> Option<String> {
    fields
        .iter()
        .filter_map(|name| page.field(name))
        .filter(|value| !value.is_empty())
        .map(|value| strip_tags(&value.as_text()).trim().to_string())
        .find(|text| !text.is_empty())
}

/// First image of the first listed page field holding one.
fn smart_image<P: SeoPage + ?Sized>(page: &P, fields: &[String]) -> Option<ImageRef> {
    fields
        .iter()
        .filter_map(|name| page.field(name))
        .find_map(|value| match value {
            FieldValue::Images(_) => value.first_image(),
            _ => None,
        })
}

/// Explicit canonical values are kept; relative ones are joined to the site root.
/// Empty canonicals are derived from the page path.
fn canonical_url(explicit: &str, page_path: &str, root_url: &str) -> String {
    let explicit = explicit.trim();
    let root = root_url.trim_end_matches('/');
    if explicit.is_empty() {
        return format!("{}{}", root, page_path);
    }
    if explicit.starts_with("http") {
        return explicit.to_string();
    }
    format!("{}/{}", root, explicit.trim_start_matches('/'))
}
