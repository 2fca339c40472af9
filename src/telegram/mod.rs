//! Telegram notifications with a minimal payload: title and link.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::models::{ListingCandidate, TelegramMessage};
use crate::traits::Notifier;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelegramNotifier {
    client: Client,
    /// `None` disables sending.
    credentials: Option<(String, String)>,
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;

        let credentials = bot_token.zip(chat_id);
        if credentials.is_none() {
            warn!(
                "TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set - Telegram notifications will be disabled"
            );
        }

        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn build_message(chat_id: &str, listing: &ListingCandidate) -> TelegramMessage {
        TelegramMessage {
            chat_id: chat_id.to_string(),
            text: format!(
                "🔥 *New Listing Found!*\n\n{}\n\n[View on eBay]({})",
                listing.title, listing.link
            ),
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, listing: &ListingCandidate) -> Result<(), NotifyError> {
        let Some((bot_token, chat_id)) = &self.credentials else {
            return Ok(());
        };

        let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
        let message = Self::build_message(chat_id, listing);

        let response = self.client.post(&url).json(&message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            return Err(NotifyError::Rejected { status, body });
        }

        let preview: String = listing.title.chars().take(20).collect();
        info!("✅ Sent Telegram: {}...", preview);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoundAt;

    #[test]
    fn message_carries_title_and_link_only() {
        let listing = ListingCandidate {
            id: "42".to_string(),
            title: "Vintage 90s Tee".to_string(),
            price: Some("$10.00".to_string()),
            link: "https://www.ebay.com/itm/42".to_string(),
            image: "https://i.ebayimg.com/42.jpg".to_string(),
            listing_date: String::new(),
            found_at: FoundAt::now(),
        };

        let message = TelegramNotifier::build_message("8279", &listing);

        assert_eq!(
            message.text,
            "🔥 *New Listing Found!*\n\nVintage 90s Tee\n\n[View on eBay](https://www.ebay.com/itm/42)"
        );
        assert_eq!(message.parse_mode, "Markdown");
        assert!(!message.text.contains("$10.00"));
    }
}
