//! SMTP notifier
//!
//! Sends the welcome and password reset mails through an authenticated SMTP
//! relay. Without credentials the notifier is disabled and every send fails
//! with [`NotifyError::NotConfigured`].

use std::time::Duration;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::notifier::{Notifier, NotifyError};
use crate::domain::value_object::{email::Email, user_name::UserName};

const DEFAULT_FROM_NAME: &str = "Entrepreneur Portfolio";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// SMTP settings
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// SMTP relay host (`smtp.gmail.com`, ...)
    pub host: String,
    pub user: String,
    pub password: String,
    pub from_name: Option<String>,
    /// Linked from the welcome mail
    pub frontend_url: String,
}

impl MailSettings {
    /// Relay host for a well-known provider name, or the name itself
    pub fn host_for_service(service: &str) -> String {
        match service.trim().to_ascii_lowercase().as_str() {
            "" | "gmail" => "smtp.gmail.com".to_string(),
            "outlook" | "hotmail" | "office365" => "smtp.office365.com".to_string(),
            "yahoo" => "smtp.mail.yahoo.com".to_string(),
            other => other.to_string(),
        }
    }
}

pub struct SmtpNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
    frontend_url: String,
}

impl SmtpNotifier {
    pub fn new(settings: &MailSettings) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(SmtpCredentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(SEND_TIMEOUT))
            .build();

        let from_name = settings
            .from_name
            .clone()
            .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string());
        let address = settings
            .user
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Message(e.to_string()))?;

        tracing::info!(host = %settings.host, "Email transport configured");

        Ok(Self {
            transport: Some(transport),
            from: Some(Mailbox::new(Some(from_name), address)),
            frontend_url: settings.frontend_url.clone(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
            frontend_url: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, to: &Email, subject: &str, text: String, html: String) -> Result<(), NotifyError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            return Err(NotifyError::NotConfigured);
        };

        let to = to
            .as_str()
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Message(e.to_string()))?;

        let message = Message::builder()
            .from(from.clone())
            .to(Mailbox::new(None, to))
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::info!(code = %response.code(), "Email sent");
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    async fn send_welcome(&self, to: &Email, user_name: &UserName) -> Result<(), NotifyError> {
        let text = format!(
            "Hello {user_name}! Thank you for registering with Entrepreneur Portfolio."
        );
        let html = format!(
            r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1>Welcome to Entrepreneur Portfolio!</h1>
    <h2>Hello {user_name}!</h2>
    <p>Thank you for registering with Entrepreneur Portfolio. Your account has been successfully created.</p>
    <p><a href="{url}">Visit Portfolio</a></p>
    <p style="font-size: 12px; color: #666;">If you did not create this account, please ignore this email.</p>
  </body>
</html>"#,
            url = self.frontend_url,
        );

        self.send(to, "Welcome to Entrepreneur Portfolio!", text, html)
            .await
    }

    async fn send_password_reset(&self, to: &Email, reset_url: &str) -> Result<(), NotifyError> {
        let text = format!("Click this link to reset your password: {reset_url}");
        let html = format!(
            r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1>Password Reset Request</h1>
    <p>You have requested to reset your password. Click the link below to reset it:</p>
    <p><a href="{reset_url}">Reset Password</a></p>
    <p><strong>Important:</strong> This link will expire in 1 hour. If you did not request this, please ignore this email.</p>
    <p style="font-size: 12px; color: #666;">Or copy and paste this link: {reset_url}</p>
  </body>
</html>"#
        );

        self.send(
            to,
            "Password Reset Request - Entrepreneur Portfolio",
            text,
            html,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_for_service() {
        assert_eq!(MailSettings::host_for_service("gmail"), "smtp.gmail.com");
        assert_eq!(MailSettings::host_for_service("Outlook"), "smtp.office365.com");
        assert_eq!(
            MailSettings::host_for_service("smtp.example.com"),
            "smtp.example.com"
        );
    }

    #[tokio::test]
    async fn test_disabled_notifier() {
        let notifier = SmtpNotifier::disabled();
        assert!(!notifier.is_enabled());

        let to = Email::new("someone@example.com").unwrap();
        let result = notifier
            .send_password_reset(&to, "http://localhost:5173/reset-password?token=x")
            .await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }
}
