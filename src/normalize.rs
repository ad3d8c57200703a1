use thiserror::Error;

use crate::image::resolve_image;
use crate::item::{Item, RawFeedItem};
use crate::text::{sanitize_html, truncate_words};
use crate::timestamp::{convert_time, DisplayZones};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("entry has no title (link: {0})")]
    MissingTitle(String),
    #[error("entry has no link: {0}")]
    MissingLink(String),
}

/// Turns raw feed entries into display-ready items.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    zones: DisplayZones,
}

impl Normalizer {
    pub fn new(zones: DisplayZones) -> Self {
        Self { zones }
    }

    pub fn normalize(
        &self,
        raw: RawFeedItem,
        source: &str,
        max_words: usize,
    ) -> Result<Item, NormalizeError> {
        let image = resolve_image(&raw);

        let (title, link) = match (raw.title, raw.link) {
            (Some(title), Some(link)) => (title, link),
            (None, Some(link)) => return Err(NormalizeError::MissingTitle(link)),
            (title, None) => {
                return Err(NormalizeError::MissingLink(
                    title.unwrap_or_else(|| "<untitled>".to_string()),
                ))
            }
        };

        let summary = sanitize_html(raw.summary.as_deref().unwrap_or_default());
        let time = convert_time(raw.published_raw.as_deref().unwrap_or_default(), &self.zones);

        Ok(Item {
            title,
            link,
            summary: truncate_words(&summary, max_words),
            time,
            published: raw.published,
            source: source.to_string(),
            image,
        })
    }
}
