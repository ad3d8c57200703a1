use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry as it came out of a parsed feed document, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Description or body text, possibly containing markup
    pub summary: Option<String>,
    /// Publication date exactly as written in the feed
    pub published_raw: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub media_content: Vec<MediaContent>,
    pub links: Vec<FeedLink>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaContent {
    pub url: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedLink {
    pub href: String,
    pub rel: Option<String>,
    pub media_type: Option<String>,
}

/// A normalized feed item, ready for display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Dual-zone display string, or the feed's raw date when it could not be parsed
    pub time: String,
    /// Only used for ordering
    pub published: Option<DateTime<Utc>>,
    pub source: String,
    pub image: Option<String>,
}

impl Item {
    /// Seconds since the epoch, with undated items counting as the epoch itself.
    pub fn sort_key(&self) -> i64 {
        self.published.map_or(0, |published| published.timestamp())
    }
}

/// Stable sort, newest first. Items with equal keys keep their relative order.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by_key(|item| std::cmp::Reverse(item.sort_key()));
}
