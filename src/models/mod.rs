//! Data models for listing candidates and notification payloads

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// A listing discovered on a search result snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub id: String,
    pub title: String,
    pub price: Option<String>,
    pub link: String,
    /// Empty when only spacer/placeholder images were present
    pub image: String,
    pub listing_date: String,
    pub found_at: FoundAt,
}

/// Capture instant of a scan, kept in UTC and rendered per reference zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundAt(pub DateTime<Utc>);

impl FoundAt {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Wall-clock time in the given zone, or UTC if the offset is out of range.
    pub fn in_zone(&self, zone: &ReferenceZone) -> DateTime<FixedOffset> {
        let offset = zone
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        self.0.with_timezone(&offset)
    }

    /// `HH:MM:SS`, suffixed with the zone abbreviation when one is set.
    pub fn clock_in(&self, zone: &ReferenceZone) -> String {
        let clock = self.in_zone(zone).format("%H:%M:%S").to_string();
        match &zone.abbreviation {
            Some(abbr) => format!("{clock} ({abbr})"),
            None => clock,
        }
    }
}

/// A fixed-offset time zone used when displaying `found_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceZone {
    pub label: String,
    pub utc_offset_hours: i32,
    #[serde(default)]
    pub abbreviation: Option<String>,
    /// Shown before the label in notifications
    #[serde(default)]
    pub emoji: Option<String>,
}

impl ReferenceZone {
    pub fn new(label: &str, utc_offset_hours: i32, abbreviation: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            utc_offset_hours,
            abbreviation: abbreviation.map(str::to_string),
            emoji: None,
        }
    }

    pub fn with_emoji(mut self, emoji: &str) -> Self {
        self.emoji = Some(emoji.to_string());
        self
    }

    /// `emoji **label:**`, or just the bold label when no emoji is set.
    pub fn heading(&self) -> String {
        match &self.emoji {
            Some(emoji) => format!("{emoji} **{}:**", self.label),
            None => format!("**{}:**", self.label),
        }
    }
}

/// Discord embed structure for rich notifications
#[derive(Debug, Serialize)]
pub struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub timestamp: String,
    pub thumbnail: Option<DiscordThumbnail>,
    pub fields: Vec<DiscordField>,
    pub footer: Option<DiscordFooter>,
}

/// Small thumbnail image for Discord embeds
#[derive(Debug, Serialize)]
pub struct DiscordThumbnail {
    pub url: String,
}

/// Key-value field for Discord embeds
#[derive(Debug, Serialize)]
pub struct DiscordField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct DiscordFooter {
    pub text: String,
}

/// Discord message payload, shared by webhooks and the channel messages API
#[derive(Debug, Serialize)]
pub struct DiscordMessage {
    pub embeds: Vec<DiscordEmbed>,
}

/// Telegram `sendMessage` request body
#[derive(Debug, Serialize)]
pub struct TelegramMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}
