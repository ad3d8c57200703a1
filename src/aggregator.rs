use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, warn};

use crate::config::{Config, Source, ALL_SOURCES};
use crate::fetcher::Fetcher;
use crate::item::{sort_newest_first, Item, RawFeedItem};
use crate::normalize::Normalizer;

/// Fetches, normalizes and merges items from the configured sources.
///
/// Every failure mode degrades instead of erroring: broken feeds contribute no
/// items, malformed entries are skipped and unknown selectors fall back to the
/// default source.
pub struct Aggregator {
    config: Arc<Config>,
    fetcher: Fetcher,
    normalizer: Normalizer,
}

impl Aggregator {
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let normalizer = Normalizer::new(config.display_zones()?);
        let fetcher = Fetcher::new(
            Duration::from_secs(config.fetch_timeout_secs),
            &config.user_agent,
        )?;

        Ok(Self {
            config,
            fetcher,
            normalizer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Items for the listing view.
    ///
    /// `"All"` merges every source newest first; any other selector returns a
    /// single source in feed order.
    pub async fn list_items(&self, selector: &str) -> Vec<Item> {
        if selector == ALL_SOURCES {
            let mut items: Vec<Item> = self
                .fetch_all()
                .await
                .into_iter()
                .zip(&self.config.sources)
                .flat_map(|(raw, source)| self.normalize_capped(source, raw))
                .collect();
            sort_newest_first(&mut items);
            return items;
        }

        match self.config.resolve_source(selector) {
            Some(source) => {
                let raw = self.fetcher.fetch(source).await;
                self.normalize_capped(source, raw)
            }
            None => Vec::new(),
        }
    }

    /// Same items as [`Aggregator::list_items`], for polling clients.
    pub async fn refresh(&self, selector: &str) -> Vec<Item> {
        self.list_items(selector).await
    }

    /// Look up one item by its exact link, with the longer detail summary.
    ///
    /// The whole feed is searched, not just the capped listing.
    pub async fn get_item(&self, selector: &str, link: &str) -> Option<Item> {
        let source = self.config.resolve_source(selector)?;

        let raw = self
            .fetcher
            .fetch(source)
            .await
            .into_iter()
            .find(|raw| raw.link.as_deref() == Some(link))?;

        self.normalize_or_skip(raw, source, self.config.detail_summary_words)
    }

    /// Fetch every source concurrently. Results are indexed like `config.sources`.
    async fn fetch_all(&self) -> Vec<Vec<RawFeedItem>> {
        let mut tasks = JoinSet::new();
        for (index, source) in self.config.sources.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let source = source.clone();
            tasks.spawn(async move { (index, fetcher.fetch(&source).await) });
        }

        let mut batches = vec![Vec::new(); self.config.sources.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, raw)) => batches[index] = raw,
                Err(e) => error!("Feed fetch task failed: {}", e),
            }
        }

        batches
    }

    fn normalize_capped(&self, source: &Source, raw: Vec<RawFeedItem>) -> Vec<Item> {
        raw.into_iter()
            .filter_map(|raw| {
                self.normalize_or_skip(raw, source, self.config.listing_summary_words)
            })
            .take(self.config.items_per_source)
            .collect()
    }

    fn normalize_or_skip(
        &self,
        raw: RawFeedItem,
        source: &Source,
        max_words: usize,
    ) -> Option<Item> {
        match self.normalizer.normalize(raw, &source.name, max_words) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping entry from '{}': {}", source.name, e);
                None
            }
        }
    }
}
