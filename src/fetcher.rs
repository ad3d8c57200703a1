use std::time::Duration;

use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use quick_xml::escape::unescape;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Source;
use crate::item::{FeedLink, MediaContent, RawFeedItem};
use crate::timestamp::parse_timestamp;

/// Elements that may carry an entry's publication date, in order of preference.
const DATE_ELEMENTS: [&str; 4] = ["pubDate", "published", "dc:date", "updated"];

/// Details of one `<item>`/`<entry>` that feed_rs does not keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMarkup {
    /// Publication date as written, CDATA and entities decoded
    pub date: Option<String>,
    /// `url` of every `<enclosure>` element
    pub enclosures: Vec<String>,
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch every entry of a source's feed.
    ///
    /// Failures are logged and yield an empty list; a broken feed never
    /// affects the other sources.
    pub async fn fetch(&self, source: &Source) -> Vec<RawFeedItem> {
        info!("Fetching feed: {} ({})", source.name, source.url);

        match self.try_fetch(source).await {
            Ok(items) => {
                info!("Fetched {} entries for feed '{}'", items.len(), source.name);
                items
            }
            Err(e) => {
                warn!("Failed to fetch feed '{}': {:#}", source.name, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, source: &Source) -> anyhow::Result<Vec<RawFeedItem>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        Self::parse_feed(&bytes)
    }

    /// Parse a feed document into raw entries, in document order.
    pub fn parse_feed(bytes: &[u8]) -> anyhow::Result<Vec<RawFeedItem>> {
        // feed_rs drops unparsable dates and folds enclosures into media, so read those from the raw XML
        let markup = Self::extract_entry_markup(bytes);

        let parsed = parser::parse(bytes)?;

        let markup = if markup.len() == parsed.entries.len() {
            markup
        } else {
            if !markup.is_empty() {
                debug!(
                    "Found {} entry blocks for {} entries, ignoring raw markup",
                    markup.len(),
                    parsed.entries.len()
                );
            }
            vec![EntryMarkup::default(); parsed.entries.len()]
        };

        let items = parsed
            .entries
            .into_iter()
            .zip(markup)
            .map(|(entry, markup)| Self::raw_item(entry, markup))
            .collect();

        Ok(items)
    }

    fn raw_item(entry: Entry, markup: EntryMarkup) -> RawFeedItem {
        let published = entry.published.or(entry.updated);
        let published_raw = match (markup.date, published) {
            // feed_rs read a date we cannot, so show its reading rather than the markup
            (Some(raw), Some(dt)) if parse_timestamp(&raw).is_none() => Some(dt.to_rfc2822()),
            (Some(raw), _) => Some(raw),
            (None, dt) => dt.map(|dt| dt.to_rfc2822()),
        };

        let link = Self::primary_link(&entry.links);

        let enclosure_urls: Vec<Url> = markup
            .enclosures
            .iter()
            .filter_map(|url| Url::parse(url).ok())
            .collect();
        let (enclosures, media): (Vec<_>, Vec<_>) = entry
            .media
            .iter()
            .flat_map(|media| media.content.iter())
            .partition(|content| {
                content
                    .url
                    .as_ref()
                    .is_some_and(|url| enclosure_urls.contains(url))
            });

        let media_content = media
            .into_iter()
            .map(|content| MediaContent {
                url: content.url.as_ref().map(|url| url.to_string()),
                media_type: content.content_type.as_ref().map(|mime| mime.to_string()),
            })
            .collect();

        // Enclosures are attachments, so they count as links rather than media
        let links = entry
            .links
            .into_iter()
            .map(|link| FeedLink {
                href: link.href,
                rel: link.rel,
                media_type: link.media_type,
            })
            .chain(enclosures.into_iter().filter_map(|content| {
                Some(FeedLink {
                    href: content.url.as_ref()?.to_string(),
                    rel: Some("enclosure".to_string()),
                    media_type: content.content_type.as_ref().map(|mime| mime.to_string()),
                })
            }))
            .collect();

        let summary = entry
            .summary
            .map(|text| text.content)
            .or_else(|| entry.content.and_then(|content| content.body));

        RawFeedItem {
            title: entry.title.map(|text| text.content),
            link,
            summary,
            published_raw,
            published,
            media_content,
            links,
        }
    }

    /// The entry's article link: the first alternate (or rel-less) link, else any link.
    pub fn primary_link(links: &[Link]) -> Option<String> {
        links
            .iter()
            .find(|link| {
                link.rel
                    .as_deref()
                    .map_or(true, |rel| rel.eq_ignore_ascii_case("alternate"))
            })
            .or_else(|| links.first())
            .map(|link| link.href.clone())
    }

    /// Scan every `<item>` (or Atom `<entry>`) for its date and enclosures.
    pub fn extract_entry_markup(xml_bytes: &[u8]) -> Vec<EntryMarkup> {
        let xml_str = match std::str::from_utf8(xml_bytes) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let mut blocks = Self::element_blocks(xml_str, "item");
        if blocks.is_empty() {
            blocks = Self::element_blocks(xml_str, "entry");
        }

        blocks
            .into_iter()
            .map(|block| EntryMarkup {
                date: DATE_ELEMENTS
                    .iter()
                    .find_map(|tag| Self::extract_xml_element(block, tag)),
                enclosures: Self::attribute_values(block, "enclosure", "url"),
            })
            .collect()
    }

    /// Contents of every `<tag>` or `<tag attr="...">` element, in document order.
    pub fn element_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
        let open_tag = format!("<{}", tag);
        let end_tag = format!("</{}>", tag);

        let mut blocks = Vec::new();
        let mut rest = xml;
        while let Some(start) = rest.find(&open_tag) {
            let after = &rest[start + open_tag.len()..];

            // Skip longer names sharing the prefix, e.g. <items>
            if !after.starts_with(|c: char| c == '>' || c.is_whitespace()) {
                rest = after;
                continue;
            }

            let body = match after.find('>') {
                Some(open_end) => &after[open_end + 1..],
                None => break,
            };
            let end = body.find(&end_tag).unwrap_or(body.len());
            blocks.push(&body[..end]);
            rest = &body[end..];
        }

        blocks
    }

    /// Decoded value of `attr` on every `<tag ...>` start tag, in document order.
    pub fn attribute_values(xml: &str, tag: &str, attr: &str) -> Vec<String> {
        let open_tag = format!("<{}", tag);

        let mut values = Vec::new();
        let mut rest = xml;
        while let Some(start) = rest.find(&open_tag) {
            let after = &rest[start + open_tag.len()..];
            let Some(tag_end) = after.find('>') else {
                break;
            };
            let attrs = &after[..tag_end];
            rest = &after[tag_end..];

            if !attrs.starts_with(|c: char| c.is_whitespace() || c == '/') {
                continue;
            }
            if let Some(value) = Self::attribute_value(attrs, attr) {
                values.push(value);
            }
        }

        values
    }

    fn attribute_value(attrs: &str, name: &str) -> Option<String> {
        let mut rest = attrs;
        loop {
            let pos = rest.find(name)?;
            let standalone = rest[..pos].ends_with(|c: char| c.is_whitespace());
            let after = &rest[pos + name.len()..];
            rest = after;

            if !standalone {
                continue;
            }
            let Some(value) = after.trim_start().strip_prefix('=') else {
                continue;
            };
            let value = value.trim_start();
            let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
            let value = &value[1..];
            let end = value.find(quote)?;

            return Some(Self::decode_text(&value[..end]));
        }
    }

    pub fn extract_xml_element(xml: &str, tag: &str) -> Option<String> {
        let start_tag = format!("<{}>", tag);
        let end_tag = format!("</{}>", tag);

        let start = xml.find(&start_tag)? + start_tag.len();
        let end = xml[start..].find(&end_tag)? + start;

        Some(Self::decode_text(&xml[start..end]))
    }

    /// Text as an XML parser would report it: CDATA unwrapped, entities decoded.
    fn decode_text(text: &str) -> String {
        let text = text.trim();
        if let Some(inner) = text
            .strip_prefix("<![CDATA[")
            .and_then(|inner| inner.strip_suffix("]]>"))
        {
            return inner.trim().to_string();
        }

        match unescape(text) {
            Ok(decoded) => decoded.trim().to_string(),
            Err(_) => text.to_string(),
        }
    }
}
