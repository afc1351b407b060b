use std::time::Duration;

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use teloxide::utils::markdown;

use crate::types::*;

/// Outbound channel for change reports.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to the configured destination.
    async fn send_message(&self, text: &str) -> Result<(), NotificationError>;
}

/// Sends messages to one chat through a Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramService {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramService {
    /// Creates a sender for `chat_id`, either a numeric chat id or an `@channel` name.
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotificationError> {
        let recipient = parse_recipient(&chat_id)?;

        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotificationError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bot: Bot::with_client(bot_token, client),
            recipient,
        })
    }
}

fn parse_recipient(chat_id: &str) -> Result<Recipient, NotificationError> {
    let chat_id = chat_id.trim();

    if chat_id.starts_with('@') && chat_id.len() > 1 {
        return Ok(Recipient::ChannelUsername(chat_id.to_string()));
    }

    chat_id
        .parse::<i64>()
        .map(|id| Recipient::Id(ChatId(id)))
        .map_err(|_| NotificationError::InvalidChat(chat_id.to_string()))
}

/// Report text as sent to Telegram: every markup character escaped for MarkdownV2.
fn markdown_text(text: &str) -> String {
    markdown::escape(text)
}

#[async_trait]
impl MessageSender for TelegramService {
    async fn send_message(&self, text: &str) -> Result<(), NotificationError> {
        log::debug!("Sending {} byte message to {:?}", text.len(), self.recipient);

        self.bot
            .send_message(self.recipient.clone(), markdown_text(text))
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map_err(|e| match e {
                RequestError::Api(api) => NotificationError::Rejected(api.to_string()),
                other => NotificationError::Http(other.to_string()),
            })?;

        log::info!("Message delivered to {:?}", self.recipient);
        Ok(())
    }
}
