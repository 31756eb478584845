use super::analytics::build_analytics_scripts;
use super::config::SeoConfig;
use super::escape_attr;
use super::resolve::MetaMap;

/// Render resolved page data as `<head>` markup, one tag per line, followed by
/// the analytics snippets.
pub fn render_head(meta: &MetaMap, config: &SeoConfig) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (name, content) in meta.iter() {
        if let Some(line) = render_tag(name, content, config) {
            lines.push(line);
        }
    }

    for script in build_analytics_scripts(config) {
        lines.extend(
            script
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    let mut head = String::new();
    for line in lines {
        if config.add_whitespace {
            head.push('\t');
        }
        head.push_str(&line);
        head.push('\n');
    }
    head
}

fn render_tag(name: &str, content: &str, config: &SeoConfig) -> Option<String> {
    match name {
        // Injected raw, outside the meta tags
        "custom" | "custom_head" | "custom_body" => None,
        _ if content.trim().is_empty() => None,
        "title" => {
            if config.title_format.is_empty() {
                return None;
            }
            Some(format!("<title>{}</title>", escape_attr(&format_title(config, content))))
        }
        "canonical" => Some(format!(r#"<link rel="canonical" href="{}" />"#, escape_attr(content))),
        // Page-only sources of og:title / og:description
        _ if name.starts_with("og_") => None,
        _ if name == "image" || name.starts_with("og:") => Some(format!(
            r#"<meta property="{}" content="{}" />"#,
            name,
            escape_attr(content)
        )),
        _ => Some(format!(
            r#"<meta name="{}" content="{}" />"#,
            name,
            escape_attr(content)
        )),
    }
}

/// Apply the configured title format; supports `{title}` and `{sitename}`.
pub fn format_title(config: &SeoConfig, title: &str) -> String {
    config
        .title_format
        .replace("{title}", title)
        .replace("{sitename}", &config.site_name)
}
