//! Selector-driven scraping of HTML listing pages.
//!
//! Publishers rework their markup without notice, so a page adapter carries
//! an ordered list of [`SelectorStrategy`] values: the current markup class
//! first, then known older or alternate layouts. The first strategy whose
//! item selector matches anything on the page wins. Cards that lack a title
//! or a link are skipped; a page no strategy understands yields nothing.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::fetch::Fetcher;
use crate::models::{RawEntry, SelectorStrategy};
use crate::scrapers::SiteAdapter;

/// Adapter for a listing page described by selector strategies.
#[derive(Debug, Clone)]
pub struct HtmlAdapter {
    name: String,
    strategies: Vec<SelectorStrategy>,
}

impl HtmlAdapter {
    pub fn new(name: impl Into<String>, strategies: Vec<SelectorStrategy>) -> Self {
        Self {
            name: name.into(),
            strategies,
        }
    }
}

#[async_trait]
impl SiteAdapter for HtmlAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, fetcher: &Fetcher, url: &str) -> Vec<RawEntry> {
        let html = fetcher.fetch_page(url).await;
        if html.is_empty() {
            return Vec::new();
        }
        self.parse(&html, url)
    }

    #[instrument(level = "info", skip(self, payload), fields(site = %self.name))]
    fn parse(&self, payload: &str, page_url: &str) -> Vec<RawEntry> {
        let document = Html::parse_document(payload);
        let base = Url::parse(page_url).ok();

        for (index, strategy) in self.strategies.iter().enumerate() {
            let Some(compiled) = Compiled::new(strategy) else {
                warn!(index, item = %strategy.item, "invalid selector strategy; skipping");
                continue;
            };

            let cards: Vec<ElementRef<'_>> = document.select(&compiled.item).collect();
            if cards.is_empty() {
                debug!(index, item = %strategy.item, "strategy matched nothing");
                continue;
            }

            let entries: Vec<RawEntry> = cards
                .into_iter()
                .filter_map(|card| compiled.extract(card, base.as_ref()))
                .collect();
            info!(index, cards = entries.len(), "scraped listing page");
            return entries;
        }

        warn!(strategies = self.strategies.len(), "no selector strategy matched page markup");
        Vec::new()
    }
}

struct Compiled {
    item: Selector,
    title: Selector,
    link: Option<Selector>,
    description: Option<Selector>,
    date: Option<Selector>,
    image: Option<Selector>,
}

fn compile(selector: &Option<String>) -> Option<Option<Selector>> {
    match selector {
        Some(s) => Selector::parse(s).ok().map(Some),
        None => Some(None),
    }
}

impl Compiled {
    fn new(strategy: &SelectorStrategy) -> Option<Self> {
        Some(Self {
            item: Selector::parse(&strategy.item).ok()?,
            title: Selector::parse(&strategy.title).ok()?,
            link: compile(&strategy.link)?,
            description: compile(&strategy.description)?,
            date: compile(&strategy.date)?,
            image: compile(&strategy.image)?,
        })
    }

    fn extract(&self, card: ElementRef<'_>, base: Option<&Url>) -> Option<RawEntry> {
        let title_el = card.select(&self.title).next()?;
        let title = element_text(title_el);
        if title.is_empty() {
            return None;
        }

        let link_el = match &self.link {
            Some(sel) => card.select(sel).next(),
            None => Some(title_el),
        };
        let href = link_el
            .and_then(|el| {
                el.value()
                    .attr("href")
                    .or_else(|| el.select(&A_HREF).next().and_then(|a| a.value().attr("href")))
            })
            .or_else(|| card.value().attr("href"))?;
        let link = resolve(href, base)?;

        let description = self
            .description
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .map(element_text)
            .filter(|s| !s.is_empty());

        let published = self
            .date
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .and_then(|el| {
                el.value()
                    .attr("datetime")
                    .or_else(|| el.value().attr("content"))
                    .map(str::to_string)
                    .or_else(|| Some(element_text(el)))
            })
            .filter(|s| !s.is_empty());

        let image = self
            .image
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .and_then(|el| {
                let value = el.value();
                value
                    .attr("src")
                    .or_else(|| value.attr("data-src"))
                    .or_else(|| value.attr("content"))
            })
            .and_then(|src| resolve(src, base));

        Some(RawEntry {
            title: Some(title),
            link: Some(link),
            description,
            published,
            image,
            ..Default::default()
        })
    }
}

static A_HREF: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// Resolve a possibly relative reference against the page URL.
pub(crate) fn resolve(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Url::parse(href).ok().map(|u| u.to_string()),
    }
}
