use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of the notification channel. Kept separate from [`DomainError`]
/// so callers can tell "the order transition failed" apart from "the order
/// transition committed but the e-mail did not go out".
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid recipient address: {0}")]
    Recipient(String),
    #[error("Failed to build message: {0}")]
    Message(String),
}
