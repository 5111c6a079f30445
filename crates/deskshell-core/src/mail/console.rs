//! Log-only mail provider.
//!
//! Used in development and as the last resort when every real provider is
//! unavailable: the message is written to the log instead of being sent.

use super::provider::{DeliveryReceipt, MailProvider, OutgoingMail, ProviderHealth};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProvider;

impl ConsoleProvider {
    pub const NAME: &'static str = "console";
}

#[async_trait]
impl MailProvider for ConsoleProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn health_check(&self) -> ProviderHealth {
        ProviderHealth {
            provider: Self::NAME.to_string(),
            configured: true,
            healthy: true,
            detail: None,
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt> {
        let message_id = format!("console-{}", Uuid::new_v4());
        info!(
            message_id = %message_id,
            from = %mail.from,
            to = %mail.to.join(", "),
            subject = %mail.subject,
            "Mail not sent (console delivery)\n{}",
            mail.text
        );

        Ok(DeliveryReceipt {
            provider: Self::NAME.to_string(),
            message_id,
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_always_delivers() {
        let mail = OutgoingMail {
            from: "a@b".into(),
            to: vec!["c@d".into()],
            subject: "hi".into(),
            html: "<p>hi</p>".into(),
            text: "hi".into(),
            reply_to: None,
        };

        let receipt = ConsoleProvider.send(&mail).await.unwrap();
        assert_eq!(receipt.provider, "console");
        assert!(receipt.message_id.starts_with("console-"));
        assert!(ConsoleProvider.health_check().await.healthy);
    }
}
