//! Preview-image discovery on an article page.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use crate::scrapers::html::resolve;

static OPEN_GRAPH: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"meta[property="og:image"], meta[name="og:image"], meta[property="og:image:url"]"#,
    )
    .expect("static selector")
});
static TWITTER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="twitter:image"], meta[property="twitter:image"]"#)
        .expect("static selector")
});
static INLINE_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("static selector"));

/// Find the page's `og:image`, then `twitter:image`, then its first inline image.
///
/// Relative URLs are resolved against `page_url`.
pub fn find_preview_image(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    for selector in [&*OPEN_GRAPH, &*TWITTER] {
        let meta = document
            .select(selector)
            .filter_map(|el| el.value().attr("content"))
            .find_map(|content| resolve(content, base.as_ref()));
        if meta.is_some() {
            return meta;
        }
    }

    document
        .select(&INLINE_IMAGE)
        .filter_map(|el| {
            let value = el.value();
            value.attr("src").or_else(|| value.attr("data-src"))
        })
        .filter(|src| !src.starts_with("data:"))
        .find_map(|src| resolve(src, base.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_open_graph_image() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://cdn.example.com/tw.jpg">
            <meta property="og:image" content="/og.jpg">
        </head><body><img src="/inline.jpg"></body></html>"#;
        assert_eq!(
            find_preview_image(html, "https://example.com/post").as_deref(),
            Some("https://example.com/og.jpg")
        );
    }

    #[test]
    fn test_falls_back_to_first_inline_image() {
        let html = r#"<body>
            <img src="data:image/gif;base64,R0lGOD">
            <img data-src="/lazy.png">
            <img src="/second.png">
        </body>"#;
        assert_eq!(
            find_preview_image(html, "https://example.com/a/b").as_deref(),
            Some("https://example.com/lazy.png")
        );
    }

    #[test]
    fn test_no_image() {
        assert_eq!(find_preview_image("<p>text only</p>", "https://example.com"), None);
    }
}
