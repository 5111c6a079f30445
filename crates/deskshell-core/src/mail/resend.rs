//! HTTP client for the Resend transactional mail API.
//!
//! Sends via `POST /emails` and checks health with `GET /domains`, both with
//! bearer authentication.

use super::provider::{DeliveryReceipt, MailProvider, OutgoingMail, ProviderHealth};
use crate::config::{AppConfig, MailConfig};
use crate::error::{DeskError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

/// Response from `POST /emails`.
#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

pub struct ResendProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ResendProvider {
    pub const NAME: &'static str = "resend";

    /// Create a provider for the public Resend endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, MailConfig::RESEND_API_BASE)
    }

    /// Create a provider against a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(MailConfig::REQUEST_TIMEOUT)
            .user_agent(AppConfig::USER_AGENT)
            .build()
            .map_err(|e| DeskError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn mail_err(message: String) -> DeskError {
        DeskError::Mail {
            provider: Self::NAME.to_string(),
            message,
        }
    }
}

#[async_trait]
impl MailProvider for ResendProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn health_check(&self) -> ProviderHealth {
        if !self.is_configured() {
            return ProviderHealth::unconfigured(Self::NAME);
        }

        let url = format!("{}/domains", self.base_url);
        let result = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(MailConfig::HEALTH_TIMEOUT)
            .send()
            .await;

        let (healthy, detail) = match result {
            Ok(resp) if resp.status().is_success() => (true, None),
            Ok(resp) => (false, Some(format!("API returned {}", resp.status()))),
            Err(e) => (false, Some(e.to_string())),
        };

        ProviderHealth {
            provider: Self::NAME.to_string(),
            configured: true,
            healthy,
            detail,
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt> {
        if !self.is_configured() {
            return Err(Self::mail_err("API key is not set".to_string()));
        }

        let url = format!("{}/emails", self.base_url);
        debug!("Sending '{}' to {} recipients via {}", mail.subject, mail.to.len(), url);

        let body = SendRequest {
            from: &mail.from,
            to: &mail.to,
            subject: &mail.subject,
            html: &mail.html,
            text: &mail.text,
            reply_to: mail.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::mail_err(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::mail_err(format!("API returned {}: {}", status, body)));
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| Self::mail_err(format!("unexpected response: {}", e)))?;

        Ok(DeliveryReceipt {
            provider: Self::NAME.to_string(),
            message_id: parsed.id,
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "desk <noreply@desk.example>".into(),
            to: vec!["ada@example.com".into()],
            subject: "Welcome".into(),
            html: "<p>hi</p>".into(),
            text: "hi".into(),
            reply_to: None,
        }
    }

    #[test]
    fn test_configured_requires_key() {
        assert!(!ResendProvider::new("  ").unwrap().is_configured());
        assert!(ResendProvider::new("re_123").unwrap().is_configured());
    }

    #[test]
    fn test_request_body_shape() {
        let mail = mail();
        let body = SendRequest {
            from: &mail.from,
            to: &mail.to,
            subject: &mail.subject,
            html: &mail.html,
            text: &mail.text,
            reply_to: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "ada@example.com");
        assert!(json.get("reply_to").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_skips_network() {
        let provider = ResendProvider::with_base_url("", "http://127.0.0.1:9").unwrap();

        let health = provider.health_check().await;
        assert!(!health.configured);
        assert!(!health.healthy);

        let err = provider.send(&mail()).await.unwrap_err();
        assert!(matches!(err, DeskError::Mail { .. }));
    }
}
