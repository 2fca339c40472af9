//! Runtime configuration
//!
//! Polling behaviour lives in a JSON file (`FINDER_CONFIG`, default
//! `config.json`); credentials only ever come from the environment, which
//! `main` seeds from `.env` through dotenvy.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::discord::DiscordTarget;
use crate::error::ConfigError;
use crate::models::ReferenceZone;
use crate::scrapers::ebay;
use crate::storage::DEFAULT_CAPACITY;
use crate::traits::{ExtractionMode, ScraperConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Which messaging sink receives new listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Discord,
    Telegram,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search URLs polled in order every cycle
    pub target_urls: Vec<String>,
    /// Extra searches, expanded through `search_url_pattern` after `target_urls`
    pub search_queries: Vec<String>,
    /// Search URL with a `{query}` placeholder
    pub search_url_pattern: String,
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
    /// Pause after a target URL fails
    pub error_pause_secs: f64,
    pub request_timeout_secs: u64,
    pub max_items_per_page: usize,
    pub seen_store_path: PathBuf,
    pub seen_capacity: usize,
    pub mode: ExtractionMode,
    pub sink: SinkKind,
    pub local_zone: ReferenceZone,
    pub marketplace_zone: ReferenceZone,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_urls: Vec::new(),
            search_queries: [
                "vintage t shirt",
                "vintage polo rainbow",
                "converse usa",
                "3d emblem t shirt",
                "vintage harley t shirt",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            search_url_pattern: ebay::SEARCH_URL_PATTERN.to_string(),
            min_wait_secs: 20.0,
            max_wait_secs: 40.0,
            error_pause_secs: 3.0,
            request_timeout_secs: 30,
            max_items_per_page: 5,
            seen_store_path: PathBuf::from("seen_items.json"),
            seen_capacity: DEFAULT_CAPACITY,
            mode: ExtractionMode::Full,
            sink: SinkKind::Discord,
            local_zone: ReferenceZone::new("TH", 7, None).with_emoji("🇹🇭"),
            marketplace_zone: ReferenceZone::new("US", -8, Some("PST")).with_emoji("🇺🇸"),
        }
    }
}

/// Read and parse a config file without falling back to defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl AppConfig {
    /// Load `path`, or the defaults when it does not exist, then validate.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            load_config(path)?
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_urls().is_empty() {
            return Err(ConfigError::Invalid(
                "no target_urls or search_queries configured".to_string(),
            ));
        }
        if !self.min_wait_secs.is_finite()
            || !self.max_wait_secs.is_finite()
            || self.min_wait_secs < 0.0
            || self.min_wait_secs > self.max_wait_secs
        {
            return Err(ConfigError::Invalid(format!(
                "wait bounds must satisfy 0 <= min <= max, got {}..{}",
                self.min_wait_secs, self.max_wait_secs
            )));
        }
        if !self.error_pause_secs.is_finite() || self.error_pause_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "error_pause_secs must be a non-negative number, got {}",
                self.error_pause_secs
            )));
        }
        if self.max_items_per_page == 0 {
            return Err(ConfigError::Invalid(
                "max_items_per_page must be at least 1".to_string(),
            ));
        }
        if self.seen_capacity == 0 {
            return Err(ConfigError::Invalid(
                "seen_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Explicit URLs first, then one URL per search query.
    pub fn target_urls(&self) -> Vec<String> {
        let searches = self.search_queries.iter().map(|query| {
            self.search_url_pattern
                .replace("{query}", &urlencoding::encode(query))
        });
        self.target_urls.iter().cloned().chain(searches).collect()
    }

    pub fn poll_delay_secs(&self) -> RangeInclusive<f64> {
        self.min_wait_secs..=self.max_wait_secs
    }

    pub fn error_pause(&self) -> Duration {
        Duration::from_secs_f64(self.error_pause_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn scraper_config(&self) -> ScraperConfig {
        ebay::profile(self.mode)
    }
}

/// Notification credentials read from the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub discord_webhook_url: Option<String>,
    pub discord_bot_token: Option<String>,
    pub discord_channel_id: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            discord_webhook_url: env_var("DISCORD_WEBHOOK_URL"),
            discord_bot_token: env_var("DISCORD_BOT_TOKEN"),
            discord_channel_id: env_var("DISCORD_CHANNEL_ID"),
            telegram_bot_token: env_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: env_var("TELEGRAM_CHAT_ID"),
        }
    }

    /// Webhook if set, otherwise bot token plus channel id.
    pub fn discord_target(&self) -> Option<DiscordTarget> {
        if let Some(url) = &self.discord_webhook_url {
            return Some(DiscordTarget::Webhook(url.clone()));
        }
        match (&self.discord_bot_token, &self.discord_channel_id) {
            (Some(bot_token), Some(channel_id)) => Some(DiscordTarget::Channel {
                bot_token: bot_token.clone(),
                channel_id: channel_id.clone(),
            }),
            _ => None,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid_and_expand_search_queries() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let urls = config.target_urls();
        assert_eq!(urls.len(), 5);
        assert_eq!(
            urls[0],
            "https://www.ebay.com/sch/i.html?_nkw=vintage%20t%20shirt&LH_BIN=1&_sop=10"
        );
    }

    #[test]
    fn explicit_urls_come_before_searches() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "target_urls": ["https://www.ebay.com/sch/i.html?_nkw=polo"],
                "search_queries": ["harley tee"],
                "mode": "minimal",
                "sink": "telegram",
                "min_wait_secs": 1,
                "max_wait_secs": 1
            }"#,
        )
        .unwrap();

        assert_eq!(config.mode, ExtractionMode::Minimal);
        assert_eq!(config.sink, SinkKind::Telegram);
        assert_eq!(config.max_items_per_page, 5);
        assert_eq!(
            config.target_urls(),
            [
                "https://www.ebay.com/sch/i.html?_nkw=polo",
                "https://www.ebay.com/sch/i.html?_nkw=harley%20tee&LH_BIN=1&_sop=10",
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_wait_bounds_and_empty_targets() {
        let mut config = AppConfig {
            min_wait_secs: 10.0,
            max_wait_secs: 5.0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.max_wait_secs = 10.0;
        config.search_queries.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_uses_defaults_but_malformed_file_fails() {
        let dir = tempdir().unwrap();

        let missing = AppConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(missing.max_items_per_page, 5);

        let broken = dir.path().join("config.json");
        std::fs::write(&broken, "{ \"max_items_per_page\": ").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn webhook_takes_precedence_over_bot_channel() {
        let both = Credentials {
            discord_webhook_url: Some("https://discord.com/api/webhooks/1/abc".to_string()),
            discord_bot_token: Some("token".to_string()),
            discord_channel_id: Some("42".to_string()),
            ..Credentials::default()
        };
        assert!(matches!(both.discord_target(), Some(DiscordTarget::Webhook(_))));

        let bot = Credentials {
            discord_webhook_url: None,
            ..both
        };
        assert_eq!(
            bot.discord_target(),
            Some(DiscordTarget::Channel {
                bot_token: "token".to_string(),
                channel_id: "42".to_string(),
            })
        );

        assert_eq!(Credentials::default().discord_target(), None);
    }
}
