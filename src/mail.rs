//! Outgoing notifications.

use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub address: String,
    pub subject: String,
    pub content: String,
}

#[derive(Debug)]
pub enum MailError {
    RequestFailed(String),
    ApiError(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            MailError::ApiError(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl std::error::Error for MailError {}

#[async_trait]
pub trait MailService: Send + Sync {
    async fn send_mail(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes mail to the log instead of delivering it.
pub struct LocalMailService {
    from_address: String,
}

impl LocalMailService {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl MailService for LocalMailService {
    async fn send_mail(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from_address,
            to = %message.address,
            subject = %message.subject,
            "Mail: {}",
            message.content
        );
        Ok(())
    }
}

/// Builds the notification sent to sales when a lead is accepted.
pub fn lead_accepted_message(sales_address: &str, price: &bigdecimal::BigDecimal) -> MailMessage {
    MailMessage {
        address: sales_address.to_string(),
        subject: "Lead Accepted".to_string(),
        content: format!("A new lead with price {} was accepted", price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money;

    #[tokio::test]
    async fn test_local_mail_never_fails() {
        let service = LocalMailService::new("local.system@email.com");
        let message = lead_accepted_message("vendas@test.com", &money::from_cents(54_000));

        assert!(service.send_mail(message).await.is_ok());
    }

    #[test]
    fn test_accepted_message_shows_cents() {
        let message = lead_accepted_message("vendas@test.com", &money::from_cents(54_000));

        assert_eq!(message.subject, "Lead Accepted");
        assert_eq!(message.content, "A new lead with price 540.00 was accepted");
    }
}
