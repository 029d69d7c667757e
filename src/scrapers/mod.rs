//! Site adapters: how each source is fetched and turned into raw entries.
//!
//! Every source in the registry is served by one [`SiteAdapter`]. The
//! pipeline only ever talks to the trait, so per-site markup rules stay in
//! this module tree.
//!
//! # Supported Sources
//!
//! | Adapter | Module | Method | Notes |
//! |---------|--------|--------|-------|
//! | RSS / Atom | [`rss`] | Feed parsing | Any `kind: rss` source |
//! | TechCrunch | [`techcrunch`] | HTML scraping | `loop-card` and legacy `post-block` layouts |
//! | VentureBeat | [`venturebeat`] | HTML scraping | `ArticleListing` and `article-card` layouts |
//! | MarkTechPost | [`marktechpost`] | HTML scraping | WordPress `td_module_flex` cards |
//! | Custom page | [`html`] | HTML scraping | Selector strategies declared in the registry file |

use async_trait::async_trait;

use crate::fetch::Fetcher;
use crate::models::{RawEntry, SelectorStrategy};

pub mod html;
pub mod marktechpost;
pub mod rss;
pub mod techcrunch;
pub mod venturebeat;

/// Fetch + parse capability for one kind of source.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Adapter name, used in logs.
    fn name(&self) -> &str;

    /// Retrieve `url` and extract its entries. Never fails: an unreachable or
    /// unparseable source yields an empty vector.
    async fn fetch(&self, fetcher: &Fetcher, url: &str) -> Vec<RawEntry>;

    /// Extract entries from an already downloaded payload.
    fn parse(&self, payload: &str, page_url: &str) -> Vec<RawEntry>;
}

/// Names accepted by the `site` key of a page source.
pub const BUILTIN_SITES: &[&str] = &["techcrunch", "venturebeat", "marktechpost"];

/// Selector strategies of a built-in page adapter, if `site` names one.
pub fn builtin_strategies(site: &str) -> Option<Vec<SelectorStrategy>> {
    match site {
        "techcrunch" => Some(techcrunch::strategies()),
        "venturebeat" => Some(venturebeat::strategies()),
        "marktechpost" => Some(marktechpost::strategies()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_site_has_strategies() {
        for site in BUILTIN_SITES {
            let strategies = builtin_strategies(site).unwrap();
            assert!(!strategies.is_empty(), "{site}");
        }
        assert!(builtin_strategies("cnn").is_none());
    }
}
