//! Outbound notifications (welcome and password reset mail)

use thiserror::Error;

use crate::domain::value_object::{email::Email, user_name::UserName};

#[derive(Debug, Error)]
pub enum NotifyError {
    /// No mail transport configured
    #[error("Email service is not configured")]
    NotConfigured,

    #[error("Failed to build email: {0}")]
    Message(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    async fn send_welcome(&self, to: &Email, user_name: &UserName) -> Result<(), NotifyError>;

    /// `reset_url` already carries the plaintext token
    async fn send_password_reset(&self, to: &Email, reset_url: &str) -> Result<(), NotifyError>;
}
