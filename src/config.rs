use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::timestamp::{DisplayZone, DisplayZones};

/// Selector value meaning "every configured source".
pub const ALL_SOURCES: &str = "All";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Source used when a selector names nothing configured
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default = "default_items_per_source")]
    pub items_per_source: usize,
    #[serde(default = "default_listing_summary_words")]
    pub listing_summary_words: usize,
    #[serde(default = "default_detail_summary_words")]
    pub detail_summary_words: usize,
    #[serde(default = "default_reference_zone")]
    pub reference_zone: String,
    #[serde(default = "default_reference_label")]
    pub reference_label: String,
    #[serde(default = "default_target_zone")]
    pub target_zone: String,
    #[serde(default = "default_target_label")]
    pub target_label: String,
    /// HTTP timeout for a single feed fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    pub sources: Vec<Source>,
}

fn default_source() -> String {
    "The Hindu".to_string()
}

fn default_items_per_source() -> usize {
    20
}

fn default_listing_summary_words() -> usize {
    30
}

fn default_detail_summary_words() -> usize {
    70
}

fn default_reference_zone() -> String {
    "GMT".to_string()
}

fn default_reference_label() -> String {
    "GMT".to_string()
}

fn default_target_zone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_target_label() -> String {
    "IST".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Newswire/1.0 (RSS Aggregator)".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no sources configured")]
    NoSources,
    #[error("source '{0}' is configured more than once")]
    DuplicateSource(String),
    #[error("'{0}' is reserved for selecting all sources")]
    ReservedName(String),
    #[error("default source '{0}' is not a configured source")]
    UnknownDefaultSource(String),
    #[error("unknown time zone '{0}'")]
    UnknownZone(String),
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse and validate config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name == ALL_SOURCES {
                return Err(ConfigError::ReservedName(source.name.clone()));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
        }

        if self.find_source(&self.default_source).is_none() {
            return Err(ConfigError::UnknownDefaultSource(self.default_source.clone()));
        }

        for (name, value) in [
            ("items_per_source", self.items_per_source),
            ("listing_summary_words", self.listing_summary_words),
            ("detail_summary_words", self.detail_summary_words),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
        }

        self.display_zones()?;
        Ok(())
    }

    pub fn display_zones(&self) -> Result<DisplayZones, ConfigError> {
        Ok(DisplayZones {
            reference: DisplayZone::new(parse_zone(&self.reference_zone)?, &self.reference_label),
            target: DisplayZone::new(parse_zone(&self.target_zone)?, &self.target_label),
        })
    }

    /// Source names in configuration order
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.name.as_str())
    }

    pub fn find_source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.name == name)
    }

    /// The source named by `selector`, or the default source for anything else.
    pub fn resolve_source(&self, selector: &str) -> Option<&Source> {
        self.find_source(selector)
            .or_else(|| self.find_source(&self.default_source))
    }
}

fn parse_zone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownZone(name.to_string()))
}
