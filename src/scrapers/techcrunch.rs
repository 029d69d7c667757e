//! TechCrunch AI category page.
//!
//! TechCrunch moved from `post-block` cards to the `loop-card` block layout
//! in 2024; both are still served depending on edge cache and A/B bucket.

use crate::models::SelectorStrategy;

pub fn strategies() -> Vec<SelectorStrategy> {
    vec![
        SelectorStrategy {
            item: ".loop-card".to_string(),
            title: ".loop-card__title".to_string(),
            link: Some("a.loop-card__title-link".to_string()),
            description: Some(".loop-card__excerpt".to_string()),
            date: Some("time".to_string()),
            image: Some("img.loop-card__figure-image, img".to_string()),
        },
        SelectorStrategy {
            item: "article.post-block".to_string(),
            title: ".post-block__title".to_string(),
            link: Some(".post-block__title__link".to_string()),
            description: Some(".post-block__content".to_string()),
            date: Some("time".to_string()),
            image: Some("img".to_string()),
        },
        SelectorStrategy {
            item: "li.wp-block-post".to_string(),
            title: "h3, h2".to_string(),
            link: None,
            description: None,
            date: Some("time".to_string()),
            image: Some("img".to_string()),
        },
    ]
}
