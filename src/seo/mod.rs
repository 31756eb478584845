pub mod analytics;
pub mod config;
pub mod custom;
pub mod fields;
pub mod preview;
pub mod render;
pub mod resolve;
pub mod truncate;

// Re-export commonly used items
pub use config::{CanonicalProtocol, InjectionMethod, SeoConfig};
pub use fields::{FieldKey, FieldValue, ImageRef};
pub use resolve::{resolve, PageTree, RequestInfo, ResolvedPageData, SeoPage};
pub use truncate::truncate_description;

/// Escape text for HTML attribute values and element content.
pub fn escape_attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s)
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
