//! Crawler-facing body content: the off-screen article and JSON-LD.

use alfanero_core::PageDescriptor;
use serde_json::{Map, Value};

/// Opening tag of the hidden content block. Positioned off-screen rather than
/// `display:none` so layout-aware crawlers still read it.
pub const SEO_ARTICLE_OPEN: &str =
    r#"<article id="seo-content" style="position:absolute;left:-9999px;top:-9999px">"#;

/// Prefix that identifies a previously injected block
pub const SEO_ARTICLE_MARKER: &str = r#"<article id="seo-content""#;

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Placeholder dimensions on every injected image
pub const IMAGE_WIDTH: u32 = 800;
pub const IMAGE_HEIGHT: u32 = 450;

/// Build the hidden content block for a page.
///
/// Redirect pages get only the heading and a pointer to the replacement
/// route; their images are never emitted.
pub fn hidden_block(page: &PageDescriptor) -> String {
    let mut html = String::from(SEO_ARTICLE_OPEN);
    html.push_str(&format!("<h1>{}</h1>", page.h1));

    if let Some(target) = &page.redirects_to {
        html.push_str(&format!(
            r#"<p>This page has moved to <a href="{target}">{target}</a>.</p>"#
        ));
    } else {
        html.push_str(&page.content);
        for img in &page.images {
            html.push_str(&format!(
                r#"<img src="{}" alt="{}" width="{}" height="{}" loading="lazy" />"#,
                img.src, img.alt, IMAGE_WIDTH, IMAGE_HEIGHT
            ));
        }
    }

    html.push_str("</article>");
    html
}

/// The JSON-LD script for a page, or `None` when it has no schema or is a
/// redirect stub.
pub fn json_ld(page: &PageDescriptor) -> Option<String> {
    if page.is_redirect() {
        return None;
    }
    let schema = page.schema.as_ref()?;

    let mut doc = Map::new();
    doc.insert(
        "@context".to_string(),
        Value::String(SCHEMA_CONTEXT.to_string()),
    );
    for (key, value) in schema {
        doc.insert(key.clone(), value.clone());
    }

    // `</` inside a string would close the script element early
    let json = Value::Object(doc).to_string().replace("</", r"<\/");
    Some(format!(r#"<script type="application/ld+json">{json}</script>"#))
}
