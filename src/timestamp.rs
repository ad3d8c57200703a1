use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

const DISPLAY_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// A time zone together with the label printed after times rendered in it.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayZone {
    pub tz: Tz,
    pub label: String,
}

impl DisplayZone {
    pub fn new(tz: Tz, label: impl Into<String>) -> Self {
        Self {
            tz,
            label: label.into(),
        }
    }

    fn render(&self, instant: &DateTime<FixedOffset>) -> String {
        format!(
            "{} {}",
            instant.with_timezone(&self.tz).format(DISPLAY_FORMAT),
            self.label
        )
    }
}

/// The pair of zones every publication time is shown in.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayZones {
    pub reference: DisplayZone,
    pub target: DisplayZone,
}

impl Default for DisplayZones {
    fn default() -> Self {
        Self {
            reference: DisplayZone::new(Tz::GMT, "GMT"),
            target: DisplayZone::new(chrono_tz::Asia::Kolkata, "IST"),
        }
    }
}

/// Parse a feed date. RSS dates are RFC 2822; Atom dates are RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .ok()
}

/// Render `raw` as `"<reference> / <target>"`.
///
/// Anything that does not parse as a date is returned unchanged.
pub fn convert_time(raw: &str, zones: &DisplayZones) -> String {
    match parse_timestamp(raw) {
        Some(instant) => format!(
            "{} / {}",
            zones.reference.render(&instant),
            zones.target.render(&instant)
        ),
        None => raw.to_string(),
    }
}
