//! Mail provider abstraction.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Proof that a provider accepted a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub provider: String,
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Health of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderHealth {
    pub provider: String,
    pub configured: bool,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProviderHealth {
    pub fn unconfigured(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            configured: false,
            healthy: false,
            detail: Some("not configured".to_string()),
        }
    }
}

/// A transactional mail backend.
#[async_trait]
pub trait MailProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the provider has the credentials it needs. Unconfigured
    /// providers are skipped without any network traffic.
    fn is_configured(&self) -> bool;

    async fn health_check(&self) -> ProviderHealth;

    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt>;
}
