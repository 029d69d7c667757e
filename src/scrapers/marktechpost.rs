//! MarkTechPost AI news listing (WordPress theme, td-block modules).

use crate::models::SelectorStrategy;

pub fn strategies() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy {
            item: ".td_module_flex".to_string(),
            title: ".entry-title".to_string(),
            link: None,
            description: Some(".td-excerpt".to_string()),
            date: Some("time.entry-date".to_string()),
            image: Some(".entry-thumb".to_string()),
        },
        SelectorStrategy {
            item: "article.post".to_string(),
            title: ".entry-title, h2".to_string(),
            link: None,
            description: Some(".entry-summary, .entry-content p".to_string()),
            date: Some("time".to_string()),
            image: Some("img".to_string()),
        },
    ]
}
