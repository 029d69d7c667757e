//! The source registry: which feeds and pages a run reads, in priority order.
//!
//! The registry is one declarative YAML document (see `sources.yaml` at the
//! crate root, embedded as the built-in default). It is loaded and validated
//! once at startup and never changes afterwards.

use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::models::{FeedSource, SourceKind};
use crate::scrapers::html::HtmlAdapter;
use crate::scrapers::rss::RssAdapter;
use crate::scrapers::{BUILTIN_SITES, SiteAdapter, builtin_strategies};

const BUILTIN_REGISTRY: &str = include_str!("../sources.yaml");

#[derive(Debug, Deserialize)]
struct RegistryFile {
    sources: Vec<FeedSource>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    sources: Vec<FeedSource>,
}

impl Registry {
    /// The registry compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_REGISTRY, "built-in sources.yaml")
    }

    /// Load a registry file from disk.
    #[instrument(level = "info")]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Registry {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml(&text, &path.display().to_string())
    }

    /// Parse and validate a registry document.
    ///
    /// # Errors
    ///
    /// [`Error::Registry`] when the YAML is malformed, the registry is empty,
    /// or a page source names neither a known `site` nor any `selectors`.
    pub fn from_yaml(text: &str, origin: &str) -> Result<Self> {
        let invalid = |reason: String| Error::Registry {
            origin: origin.to_string(),
            reason,
        };

        let file: RegistryFile = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        if file.sources.is_empty() {
            return Err(invalid("no sources declared".to_string()));
        }

        for source in &file.sources {
            if source.kind != SourceKind::Page {
                continue;
            }
            match source.site.as_deref() {
                Some(site) if builtin_strategies(site).is_none() => {
                    return Err(invalid(format!(
                        "source {:?} names unknown site {site:?} (known: {})",
                        source.name,
                        BUILTIN_SITES.join(", ")
                    )));
                }
                None if source.selectors.is_empty() => {
                    return Err(invalid(format!(
                        "page source {:?} needs a `site` or `selectors`",
                        source.name
                    )));
                }
                _ => {}
            }
        }

        info!(origin, sources = file.sources.len(), "loaded source registry");
        Ok(Self {
            sources: file.sources,
        })
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// Distinct categories in registry order.
    pub fn categories(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.category.clone())
            .unique()
            .collect()
    }

    /// The site adapter serving `source`.
    ///
    /// Custom `selectors` are tried before the built-in site strategies.
    pub fn adapter_for(&self, source: &FeedSource) -> Box<dyn SiteAdapter> {
        match source.kind {
            SourceKind::Rss => Box::new(RssAdapter),
            SourceKind::Page => {
                let name = source.site.clone().unwrap_or_else(|| source.name.clone());
                let mut strategies = source.selectors.clone();
                if let Some(builtin) = source.site.as_deref().and_then(builtin_strategies) {
                    strategies.extend(builtin);
                }
                Box::new(HtmlAdapter::new(name, strategies))
            }
        }
    }
}
