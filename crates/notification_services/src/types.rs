/// Errors raised while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The configured chat is neither a numeric id nor an `@channel` name.
    #[error("Invalid Telegram chat id: {0:?}")]
    InvalidChat(String),

    /// The request could not be sent or its response could not be read.
    #[error("Telegram request failed: {0}")]
    Http(String),

    /// The Bot API answered but refused the message.
    #[error("Telegram rejected message: {0}")]
    Rejected(String),
}
