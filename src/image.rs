use crate::item::RawFeedItem;

/// Pick a representative image for an item.
///
/// Media content wins when present, and its first entry is used as-is. Otherwise
/// the first link declaring an `image*` type is used.
pub fn resolve_image(raw: &RawFeedItem) -> Option<String> {
    if let Some(media) = raw.media_content.first() {
        return media.url.clone();
    }

    raw.links
        .iter()
        .find(|link| {
            link.media_type
                .as_deref()
                .is_some_and(|media_type| media_type.starts_with("image"))
        })
        .map(|link| link.href.clone())
}
