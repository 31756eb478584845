use std::collections::HashMap;

use crate::models::settings::{parse_bool, parse_list};
use crate::store::Store;

use super::custom::parse_custom;
use super::resolve::MetaMap;

/// Settings group holding per-template defaults: `seo_tpl:<template>:<field>`.
pub const TEMPLATE_PREFIX: &str = "seo_tpl:";

/// Settings group holding per-host overrides: `seo_domain:<host>:<key>`.
pub const DOMAIN_PREFIX: &str = "seo_domain:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalProtocol {
    Auto,
    Http,
    Https,
}

impl CanonicalProtocol {
    fn from_setting(value: &str) -> Self {
        match value.trim() {
            "http" => CanonicalProtocol::Http,
            "https" => CanonicalProtocol::Https,
            _ => CanonicalProtocol::Auto,
        }
    }

    /// Whether canonical URLs use https for a request that did (or did not) arrive over TLS.
    pub fn use_https(self, request_https: bool) -> bool {
        match self {
            CanonicalProtocol::Auto => request_https,
            CanonicalProtocol::Http => false,
            CanonicalProtocol::Https => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMethod {
    /// Markup is spliced into `</head>` / `</body>` of the rendered page.
    Auto,
    /// The page renderer places the markup itself.
    Manual,
}

impl InjectionMethod {
    fn from_setting(value: &str) -> Self {
        match value.trim() {
            "manual" => InjectionMethod::Manual,
            _ => InjectionMethod::Auto,
        }
    }
}

/// Explicit defaults and smart-field lists, either site-wide or for one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDefaults {
    pub title: String,
    pub title_smart: Vec<String>,
    pub description: String,
    pub description_smart: Vec<String>,
    pub image: String,
    pub image_smart: Vec<String>,
    pub robots: Vec<String>,
    pub custom: String,
    pub custom_head: String,
    pub custom_body: String,
}

impl FieldDefaults {
    /// Build from a lookup of the unprefixed field names (`title`, `title_smart`, ...).
    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |k: &str| get(k).map(|v| v.trim().to_string()).unwrap_or_default();
        let list = |k: &str| get(k).map(|v| parse_list(&v)).unwrap_or_default();
        FieldDefaults {
            title: text("title"),
            title_smart: list("title_smart"),
            description: text("description"),
            description_smart: list("description_smart"),
            image: text("image"),
            image_smart: list("image_smart"),
            robots: list("robots"),
            custom: get("custom").unwrap_or_default(),
            custom_head: get("custom_head").unwrap_or_default(),
            custom_body: get("custom_body").unwrap_or_default(),
        }
    }
}

/// Immutable SEO configuration, built from the flat settings mapping at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoConfig {
    pub site_name: String,
    pub author: String,
    pub site: FieldDefaults,
    pub templates: HashMap<String, FieldDefaults>,
    pub title_format: String,
    pub canonical_protocol: CanonicalProtocol,
    pub include_generator: bool,
    pub include_open_graph: bool,
    pub include_twitter: bool,
    pub twitter_username: String,
    pub use_parents: bool,
    pub method: InjectionMethod,
    pub add_whitespace: bool,
    pub include_templates: Vec<String>,
    pub google_analytics: String,
    pub google_analytics_anonymize_ip: bool,
    pub piwik_url: String,
    pub piwik_site_id: String,
    pub hard_limit: bool,
    pub title_limit: usize,
    pub description_limit: usize,
    pub truncate_description: bool,
    /// Content of the `generator` meta tag.
    pub generator: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        SeoConfig {
            site_name: String::new(),
            author: String::new(),
            site: FieldDefaults {
                title_smart: vec!["title".to_string()],
                robots: vec!["index".to_string(), "follow".to_string()],
                ..FieldDefaults::default()
            },
            templates: HashMap::new(),
            title_format: String::new(),
            canonical_protocol: CanonicalProtocol::Auto,
            include_generator: true,
            include_open_graph: true,
            include_twitter: true,
            twitter_username: String::new(),
            use_parents: false,
            method: InjectionMethod::Auto,
            add_whitespace: true,
            include_templates: Vec::new(),
            google_analytics: String::new(),
            google_analytics_anonymize_ip: false,
            piwik_url: String::new(),
            piwik_site_id: String::new(),
            hard_limit: false,
            title_limit: 60,
            description_limit: 160,
            truncate_description: true,
            generator: format!("Headwise {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SeoConfig {
    /// Build from a flat settings mapping. Missing keys keep their defaults.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let defaults = SeoConfig::default();
        let get = |k: &str| settings.get(k).cloned();
        let text = |k: &str, def: &str| get(k).unwrap_or_else(|| def.to_string());
        let flag = |k: &str, def: bool| get(k).map(|v| parse_bool(&v)).unwrap_or(def);
        let number = |k: &str, def: usize| {
            get(k)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(def)
        };

        let mut site = FieldDefaults::from_lookup(|field| get(&format!("seo_{}", field)));
        if get("seo_title_smart").is_none() {
            site.title_smart = defaults.site.title_smart.clone();
        }
        if get("seo_robots").is_none() {
            site.robots = defaults.site.robots.clone();
        }

        SeoConfig {
            site_name: text("site_name", ""),
            author: text("seo_author", ""),
            site,
            templates: template_defaults(settings),
            title_format: text("seo_title_format", ""),
            canonical_protocol: CanonicalProtocol::from_setting(&text("seo_canonical_protocol", "auto")),
            include_generator: flag("seo_include_generator", defaults.include_generator),
            include_open_graph: flag("seo_include_open_graph", defaults.include_open_graph),
            include_twitter: flag("seo_include_twitter", defaults.include_twitter),
            twitter_username: text("seo_twitter_username", "").trim().trim_start_matches('@').to_string(),
            use_parents: flag("seo_use_parents", defaults.use_parents),
            method: InjectionMethod::from_setting(&text("seo_method", "auto")),
            add_whitespace: flag("seo_add_whitespace", defaults.add_whitespace),
            include_templates: get("seo_include_templates").map(|v| parse_list(&v)).unwrap_or_default(),
            google_analytics: text("seo_google_analytics", "").trim().to_string(),
            google_analytics_anonymize_ip: flag("seo_google_analytics_anonymize_ip", false),
            piwik_url: text("seo_piwik_url", "").trim().to_string(),
            piwik_site_id: text("seo_piwik_site_id", "").trim().to_string(),
            hard_limit: flag("seo_hard_limit", defaults.hard_limit),
            title_limit: number("seo_title_limit", defaults.title_limit),
            description_limit: number("seo_description_limit", defaults.description_limit),
            truncate_description: flag("seo_truncate_description", defaults.truncate_description),
            generator: defaults.generator,
        }
    }

    /// Load from the store, applying `seo_domain:<host>:` overrides for `host`.
    pub fn load(store: &dyn Store, host: Option<&str>) -> Self {
        let mut settings = store.setting_all();
        if let Some(host) = host.map(strip_port).filter(|h| !h.is_empty()) {
            let prefix = format!("{}{}:", DOMAIN_PREFIX, host);
            for (key, value) in store.setting_get_group(&prefix) {
                if let Some(target) = key.strip_prefix(&prefix) {
                    settings.insert(target.to_string(), value);
                }
            }
        }
        SeoConfig::from_settings(&settings)
    }

    pub fn template(&self, name: &str) -> Option<&FieldDefaults> {
        self.templates.get(name)
    }

    pub fn includes_template(&self, name: &str) -> bool {
        self.include_templates.iter().any(|t| t == name)
    }

    /// Site-wide view of the configuration: no page involved, robots joined and
    /// site custom tags merged in as their own keys.
    pub fn site_meta(&self) -> MetaMap {
        let mut meta = MetaMap::default();
        meta.set("sitename", &self.site_name);
        meta.set("author", &self.author);
        meta.set("title", &self.site.title);
        meta.set("description", &self.site.description);
        meta.set("image", &self.site.image);
        meta.set("title_format", &self.title_format);
        meta.set("robots", &self.site.robots.join(", "));
        meta.set("custom_head", &self.site.custom_head);
        meta.set("custom_body", &self.site.custom_body);
        meta.set("twitter_username", &self.twitter_username);
        for (key, value) in parse_custom(&self.site.custom) {
            meta.set(&key, &value);
        }
        meta
    }
}

/// Collect `seo_tpl:<template>:<field>` settings into one `FieldDefaults` per template.
fn template_defaults(settings: &HashMap<String, String>) -> HashMap<String, FieldDefaults> {
    let mut grouped: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (key, value) in settings {
        let Some(rest) = key.strip_prefix(TEMPLATE_PREFIX) else {
            continue;
        };
        if let Some((template, field)) = rest.rsplit_once(':') {
            if template.is_empty() {
                continue;
            }
            grouped
                .entry(template.to_string())
                .or_default()
                .insert(field.to_string(), value.clone());
        }
    }

    grouped
        .into_iter()
        .map(|(template, fields)| {
            let defaults = FieldDefaults::from_lookup(|f| fields.get(f).cloned());
            (template, defaults)
        })
        .collect()
}

/// `example.com:8080` → `example.com`.
pub fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
