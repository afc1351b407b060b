//! # Notification Services
//!
//! This crate delivers change reports to a chat through the Telegram Bot API.
//! It includes the `MessageSender` seam used by the scanner. Messages are sent
//! with `teloxide` and escaped for MarkdownV2.

/// Telegram sender and markdown escaping.
pub mod service;
/// Error types for notifications.
pub mod types;

pub use service::{MessageSender, TelegramService};
pub use types::NotificationError;
