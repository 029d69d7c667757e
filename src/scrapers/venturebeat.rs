//! VentureBeat AI category page.

use crate::models::SelectorStrategy;

pub fn strategies() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy {
            item: "article.ArticleListing".to_string(),
            title: ".ArticleListing__title".to_string(),
            link: Some("a.ArticleListing__title-link, .ArticleListing__title a".to_string()),
            description: Some(".ArticleListing__excerpt".to_string()),
            date: Some("time".to_string()),
            image: Some("img".to_string()),
        },
        SelectorStrategy {
            item: "article.article-card".to_string(),
            title: ".article-title".to_string(),
            link: None,
            description: Some(".article-excerpt".to_string()),
            date: Some("time, .article-time".to_string()),
            image: Some("img".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::SiteAdapter;
    use crate::scrapers::html::HtmlAdapter;

    const PAGE_URL: &str = "https://venturebeat.com/category/ai/";

    #[test]
    fn test_article_card_fallback() {
        let html = r#"<div>
          <article class="article-card">
            <h2 class="article-title"><a href="/ai/agents-at-work/">Agents at work</a></h2>
            <p class="article-excerpt">Enterprises deploy agents.</p>
            <time class="article-time" datetime="2025-05-06T12:00:00+00:00">May 6, 2025</time>
          </article>
        </div>"#;
        let entries = HtmlAdapter::new("venturebeat", strategies()).parse(html, PAGE_URL);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].link.as_deref(),
            Some("https://venturebeat.com/ai/agents-at-work/")
        );
        assert_eq!(entries[0].description.as_deref(), Some("Enterprises deploy agents."));
    }
}
