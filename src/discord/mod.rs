//! # Discord Integration
//!
//! Rich notifications for newly discovered listings. Each listing becomes a
//! single embed with the price, the time it was found in two reference time
//! zones, the listed date when the page showed one, and a thumbnail.
//!
//! ## Delivery
//!
//! Two ways of reaching a channel are supported:
//!
//! - **Webhook**: `DISCORD_WEBHOOK_URL`, posted to directly.
//! - **Bot**: `DISCORD_BOT_TOKEN` + `DISCORD_CHANNEL_ID`, posted to
//!   `/api/v10/channels/{id}/messages` with a `Bot` authorization header.
//!
//! The webhook wins when both are configured. With neither, the notifier is
//! disabled: sends succeed without doing anything and a warning is logged once
//! at construction.
//!
//! ## Embed Structure
//!
//! - **Title**: `🔥 NEW: <listing title>` (listing title cut at 200 characters)
//! - **Description**: a markdown link to the listing
//! - **Color**: green (`0x00_FF00`)
//! - **Fields**: Price and Time Found, both inline
//! - **Thumbnail**: listing image, or the eBay logo when there is none
//! - **Footer**: `eBay Finder Bot`
//! - **Timestamp**: when the listing was found

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::models::{
    DiscordEmbed, DiscordField, DiscordFooter, DiscordMessage, DiscordThumbnail, ListingCandidate,
    ReferenceZone,
};
use crate::traits::Notifier;

const API_BASE: &str = "https://discord.com/api/v10";
const FALLBACK_THUMBNAIL: &str = "https://upload.wikimedia.org/wikipedia/commons/1/1b/EBay_logo.svg";
const EMBED_COLOR: u32 = 0x00_FF00;
const MAX_TITLE_CHARS: usize = 200;
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Where embeds are delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscordTarget {
    Webhook(String),
    Channel { bot_token: String, channel_id: String },
}

/// Discord notification client for listing discoveries.
///
/// Holds a reusable HTTP client, the optional delivery target and the two
/// reference zones used to render the "Time Found" field.
pub struct DiscordNotifier {
    client: Client,
    /// `None` disables sending.
    target: Option<DiscordTarget>,
    local_zone: ReferenceZone,
    marketplace_zone: ReferenceZone,
}

impl DiscordNotifier {
    /// Creates a notifier for the given target.
    ///
    /// Passing `None` yields a disabled notifier; this is logged as a warning
    /// so a missing credential is visible at startup.
    pub fn new(
        target: Option<DiscordTarget>,
        local_zone: ReferenceZone,
        marketplace_zone: ReferenceZone,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;

        if target.is_none() {
            warn!("Discord credentials not set - Discord notifications will be disabled");
        }

        Ok(Self {
            client,
            target,
            local_zone,
            marketplace_zone,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Builds the message payload for one listing.
    ///
    /// Kept separate from sending so the embed layout can be checked without
    /// a network round trip.
    pub fn build_message(&self, listing: &ListingCandidate) -> DiscordMessage {
        let title: String = listing.title.chars().take(MAX_TITLE_CHARS).collect();
        let price = listing.price.as_deref().unwrap_or("N/A");
        let thumbnail = if listing.image.is_empty() {
            FALLBACK_THUMBNAIL.to_string()
        } else {
            listing.image.clone()
        };

        let embed = DiscordEmbed {
            title: format!("🔥 NEW: {title}"),
            description: format!("Click: [Open Listing]({})", listing.link),
            url: listing.link.clone(),
            color: EMBED_COLOR,
            timestamp: listing.found_at.utc().to_rfc3339(),
            thumbnail: Some(DiscordThumbnail { url: thumbnail }),
            fields: vec![
                DiscordField {
                    name: "Price".to_string(),
                    value: format!("**{price}**"),
                    inline: true,
                },
                DiscordField {
                    name: "Time Found".to_string(),
                    value: self.time_found(listing),
                    inline: true,
                },
            ],
            footer: Some(DiscordFooter {
                text: "eBay Finder Bot".to_string(),
            }),
        };

        DiscordMessage {
            embeds: vec![embed],
        }
    }

    fn time_found(&self, listing: &ListingCandidate) -> String {
        let mut info = format!(
            "{} {}\n{} {}",
            self.local_zone.heading(),
            listing.found_at.clock_in(&self.local_zone),
            self.marketplace_zone.heading(),
            listing.found_at.clock_in(&self.marketplace_zone),
        );
        if !listing.listing_date.is_empty() {
            info.push_str(&format!("\n📅 **Listed:** {}", listing.listing_date));
        }
        info
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    /// Sends the embed for `listing`.
    ///
    /// Returns `Ok(())` when Discord is disabled. Transport failures and
    /// non-success statuses come back as [`NotifyError`]; nothing is retried.
    async fn notify(&self, listing: &ListingCandidate) -> Result<(), NotifyError> {
        let Some(target) = &self.target else {
            return Ok(());
        };

        let message = self.build_message(listing);
        let request = match target {
            DiscordTarget::Webhook(url) => self.client.post(url),
            DiscordTarget::Channel {
                bot_token,
                channel_id,
            } => self
                .client
                .post(format!("{API_BASE}/channels/{channel_id}/messages"))
                .header("Authorization", format!("Bot {bot_token}")),
        };

        let response = request.json(&message).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!(
            "✅ Sent: {} | Time: {}",
            listing.price.as_deref().unwrap_or("N/A"),
            listing.found_at.clock_in(&self.local_zone)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoundAt;
    use chrono::{TimeZone, Utc};

    fn notifier() -> DiscordNotifier {
        DiscordNotifier::new(
            None,
            ReferenceZone::new("TH", 7, None).with_emoji("🇹🇭"),
            ReferenceZone::new("US", -8, Some("PST")).with_emoji("🇺🇸"),
        )
        .unwrap()
    }

    fn listing() -> ListingCandidate {
        ListingCandidate {
            id: "1234567890".to_string(),
            title: "Vintage Rainbow Polo".to_string(),
            price: Some("$25.00".to_string()),
            link: "https://www.ebay.com/itm/1234567890".to_string(),
            image: String::new(),
            listing_date: "May-4 05:00".to_string(),
            found_at: FoundAt(Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn builds_rich_embed() {
        let message = notifier().build_message(&listing());
        let embed = &message.embeds[0];

        assert_eq!(embed.title, "🔥 NEW: Vintage Rainbow Polo");
        assert_eq!(embed.url, "https://www.ebay.com/itm/1234567890");
        assert_eq!(embed.fields[0].value, "**$25.00**");
        assert_eq!(
            embed.fields[1].value,
            "🇹🇭 **TH:** 19:00:00\n🇺🇸 **US:** 04:00:00 (PST)\n📅 **Listed:** May-4 05:00"
        );
        assert_eq!(embed.thumbnail.as_ref().unwrap().url, FALLBACK_THUMBNAIL);
    }

    #[test]
    fn zone_headings_follow_configured_zones() {
        let notifier = DiscordNotifier::new(
            None,
            ReferenceZone::new("DE", 1, Some("CET")),
            ReferenceZone::new("US", -5, Some("EST")).with_emoji("🇺🇸"),
        )
        .unwrap();
        let mut plain = listing();
        plain.listing_date.clear();

        let message = notifier.build_message(&plain);
        assert_eq!(
            message.embeds[0].fields[1].value,
            "**DE:** 13:00:00 (CET)\n🇺🇸 **US:** 07:00:00 (EST)"
        );
    }

    #[test]
    fn truncates_long_titles() {
        let mut long = listing();
        long.title = "x".repeat(300);

        let message = notifier().build_message(&long);
        assert_eq!(message.embeds[0].title.chars().count(), "🔥 NEW: ".chars().count() + 200);
    }

    #[tokio::test]
    async fn disabled_notifier_is_a_no_op() {
        let notifier = notifier();
        assert!(!notifier.is_enabled());
        assert!(notifier.notify(&listing()).await.is_ok());
    }
}
