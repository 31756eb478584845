use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of the page fields that carry per-page SEO overrides (`seo_title`, ...).
pub const PAGE_FIELD_PREFIX: &str = "seo_";

/// A tag name in the resolved page data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Title,
    Description,
    Image,
    Custom,
    CustomHead,
    CustomBody,
    Canonical,
    Robots,
    /// Page-only source for `og:title`; never rendered.
    OgTitleSource,
    /// Page-only source for `og:description`; never rendered.
    OgDescriptionSource,
    Generator,
    Author,
    OgSiteName,
    OgTitle,
    OgDescription,
    OgUrl,
    OgType,
    OgImage,
    TwitterCard,
    TwitterSite,
    TwitterTitle,
    TwitterUrl,
    TwitterDescription,
    TwitterImage,
    /// Extra `seo_*` page fields and custom tag keys.
    Other(String),
}

impl FieldKey {
    /// Page-level fields resolved through the precedence chain, in output order.
    pub const PRIMITIVES: [FieldKey; 10] = [
        FieldKey::Title,
        FieldKey::OgTitleSource,
        FieldKey::Description,
        FieldKey::OgDescriptionSource,
        FieldKey::Image,
        FieldKey::Robots,
        FieldKey::Canonical,
        FieldKey::Custom,
        FieldKey::CustomHead,
        FieldKey::CustomBody,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldKey::Title => "title",
            FieldKey::Description => "description",
            FieldKey::Image => "image",
            FieldKey::Custom => "custom",
            FieldKey::CustomHead => "custom_head",
            FieldKey::CustomBody => "custom_body",
            FieldKey::Canonical => "canonical",
            FieldKey::Robots => "robots",
            FieldKey::OgTitleSource => "og_title",
            FieldKey::OgDescriptionSource => "og_description",
            FieldKey::Generator => "generator",
            FieldKey::Author => "author",
            FieldKey::OgSiteName => "og:site_name",
            FieldKey::OgTitle => "og:title",
            FieldKey::OgDescription => "og:description",
            FieldKey::OgUrl => "og:url",
            FieldKey::OgType => "og:type",
            FieldKey::OgImage => "og:image",
            FieldKey::TwitterCard => "twitter:card",
            FieldKey::TwitterSite => "twitter:site",
            FieldKey::TwitterTitle => "twitter:title",
            FieldKey::TwitterUrl => "twitter:url",
            FieldKey::TwitterDescription => "twitter:description",
            FieldKey::TwitterImage => "twitter:image",
            FieldKey::Other(name) => name,
        }
    }

    /// Name of the page field holding the override for this key.
    pub fn page_field(&self) -> String {
        format!("{}{}", PAGE_FIELD_PREFIX, self.as_str())
    }

    /// `canonical` always belongs to the page itself.
    pub fn inherits(&self) -> bool {
        *self != FieldKey::Canonical
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image attached to a page (or configured as a default by URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl ImageRef {
    pub fn from_url(url: &str) -> Self {
        ImageRef {
            url: url.trim().to_string(),
            description: String::new(),
        }
    }

    /// Absolute URL of the image, joining relative paths onto `root`.
    pub fn absolute_url(&self, root: &str) -> String {
        if self.url.is_empty() {
            return String::new();
        }
        if let Ok(u) = url::Url::parse(&self.url) {
            return u.to_string();
        }
        url::Url::parse(root)
            .and_then(|base| base.join(&self.url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/{}", root.trim_end_matches('/'), self.url.trim_start_matches('/')))
    }
}

/// A raw page field value.
///
/// Stored as JSON: a string, an array of option tokens, or an array of image objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Options(Vec<String>),
    Images(Vec<ImageRef>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Options(o) => o.is_empty(),
            FieldValue::Images(i) => i.iter().all(|img| img.url.is_empty()),
        }
    }

    /// Text form of the value. Options are comma-joined, images give their URL.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Options(o) => o.join(", "),
            FieldValue::Images(i) => i.first().map(|img| img.url.clone()).unwrap_or_default(),
        }
    }

    pub fn first_image(&self) -> Option<ImageRef> {
        match self {
            FieldValue::Images(i) => i.iter().find(|img| !img.url.is_empty()).cloned(),
            FieldValue::Text(s) if !s.trim().is_empty() => Some(ImageRef::from_url(s)),
            _ => None,
        }
    }

    /// Selected option tokens. A text value is read as a comma-separated list.
    pub fn options(&self) -> Vec<String> {
        match self {
            FieldValue::Options(o) => o.clone(),
            FieldValue::Text(s) => crate::models::settings::parse_list(s),
            FieldValue::Images(_) => Vec::new(),
        }
    }
}
