use crate::inject::PageSeo;
use crate::models::page::Page;
use crate::seo::{escape_attr, FieldKey, InjectionMethod, SeoPage};

/// Renders a full page document from the page's `title` and `body` fields.
///
/// With the `manual` injection method the SEO markup is placed here; with
/// `auto` the response fairing splices it in afterwards.
pub fn render_page(page: &Page, site_name: &str, seo: Option<&PageSeo>) -> String {
    let field = |name: &str| page.field(name).map(|v| v.as_text()).unwrap_or_default();

    let title = field("title");
    let body = field("body");

    // A configured title format renders its own <title>
    let seo_title = seo
        .map(|s| s.data.rendered.contains("<title>"))
        .unwrap_or(false);
    let title_tag = if seo_title {
        String::new()
    } else if title.is_empty() {
        format!("<title>{}</title>\n", escape_attr(site_name))
    } else {
        format!(
            "<title>{} — {}</title>\n",
            escape_attr(&title),
            escape_attr(site_name)
        )
    };

    let (head_markup, body_markup) = match seo {
        Some(s) if s.method == InjectionMethod::Manual => (
            format!("{}{}\n", s.data.rendered, s.data.custom_head),
            format!("{}\n", s.data.custom_body),
        ),
        _ => (String::new(), String::new()),
    };

    let heading = seo
        .map(|s| s.data.get(&FieldKey::Title).to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| title.clone());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{title_tag}{head_markup}</head>
<body class="template-{template}">
<h1>{heading}</h1>
{body}
{body_markup}</body>
</html>"#,
        title_tag = title_tag,
        head_markup = head_markup,
        template = escape_attr(&page.template),
        heading = escape_attr(&heading),
        body = body,
        body_markup = body_markup,
    )
}
