//! Provider selection and delivery.

use super::console::ConsoleProvider;
use super::provider::{MailProvider, OutgoingMail, ProviderHealth};
use super::resend::ResendProvider;
use super::smtp::SmtpProvider;
use super::template::{MailTemplate, RenderedMail};
use crate::config::{AppConfig, MailConfig};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings used to assemble a [`MailService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailSettings {
    pub from: String,
    pub resend_api_key: Option<String>,
    /// SMTP relay URL, tried after Resend.
    pub smtp_url: Option<String>,
    /// Log undeliverable mail instead of failing.
    pub degrade_to_console: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from: MailConfig::DEFAULT_FROM.to_string(),
            resend_api_key: None,
            smtp_url: None,
            degrade_to_console: true,
        }
    }
}

/// Result of a delivery attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Delivered only to the console fallback.
    pub degraded: bool,
    /// One entry per provider that failed, in the order they were tried.
    pub errors: Vec<String>,
}

impl DeliveryOutcome {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }
}

/// Sends mail through the first provider that accepts it.
pub struct MailService {
    providers: Vec<Arc<dyn MailProvider>>,
    fallback: Option<ConsoleProvider>,
    from: String,
}

impl MailService {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            providers: Vec::new(),
            fallback: None,
            from: from.into(),
        }
    }

    /// Build the service the shell runs with: Resend when a key is set,
    /// then SMTP when a relay URL is set, console fallback when enabled.
    pub fn from_settings(settings: &MailSettings) -> Result<Self> {
        let mut service = Self::new(settings.from.clone())
            .degrade_to_console(settings.degrade_to_console);

        if let Some(key) = settings.resend_api_key.as_deref() {
            service = service.with_provider(Arc::new(ResendProvider::new(key)?));
        }
        if let Some(url) = settings.smtp_url.as_deref() {
            service = service.with_provider(Arc::new(SmtpProvider::new(url)?));
        }

        Ok(service)
    }

    /// Append a provider. Providers are tried in insertion order.
    pub fn with_provider(mut self, provider: Arc<dyn MailProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn degrade_to_console(mut self, enable: bool) -> Self {
        self.fallback = enable.then_some(ConsoleProvider);
        self
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Names of providers that have credentials.
    pub fn configured_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Deliver a rendered message.
    ///
    /// Never returns an error: failures are collected in the outcome.
    pub async fn send(&self, to: &[String], mail: RenderedMail) -> DeliveryOutcome {
        if to.is_empty() {
            return DeliveryOutcome::failed(vec!["no recipients".to_string()]);
        }

        let outgoing = OutgoingMail {
            from: self.from.clone(),
            to: to.to_vec(),
            subject: mail.subject,
            html: mail.html,
            text: mail.text,
            reply_to: None,
        };

        let mut errors = Vec::new();
        for provider in &self.providers {
            if !provider.is_configured() {
                debug!("Skipping unconfigured mail provider {}", provider.name());
                continue;
            }

            match provider.send(&outgoing).await {
                Ok(receipt) => {
                    info!(
                        "Sent '{}' via {} ({})",
                        outgoing.subject, receipt.provider, receipt.message_id
                    );
                    return DeliveryOutcome {
                        success: true,
                        provider: Some(receipt.provider),
                        message_id: Some(receipt.message_id),
                        degraded: false,
                        errors,
                    };
                }
                Err(e) => {
                    warn!("Mail provider {} failed: {}", provider.name(), e);
                    errors.push(e.to_string());
                }
            }
        }

        let Some(fallback) = &self.fallback else {
            if errors.is_empty() {
                errors.push("no mail provider configured".to_string());
            }
            return DeliveryOutcome::failed(errors);
        };

        warn!("Falling back to console delivery for '{}'", outgoing.subject);
        match fallback.send(&outgoing).await {
            Ok(receipt) => DeliveryOutcome {
                success: true,
                provider: Some(receipt.provider),
                message_id: Some(receipt.message_id),
                degraded: true,
                errors,
            },
            Err(e) => {
                errors.push(e.to_string());
                DeliveryOutcome::failed(errors)
            }
        }
    }

    /// Render `template` and deliver it.
    ///
    /// `app_name` is filled in when the caller doesn't supply it.
    pub async fn send_template(
        &self,
        template: MailTemplate,
        to: &[String],
        vars: &HashMap<String, String>,
    ) -> DeliveryOutcome {
        let mut vars = vars.clone();
        vars.entry("app_name".to_string())
            .or_insert_with(|| AppConfig::APP_NAME.to_string());

        match template.render(&vars) {
            Ok(rendered) => self.send(to, rendered).await,
            Err(e) => {
                warn!("Cannot render {} mail: {}", template.as_str(), e);
                DeliveryOutcome::failed(vec![e.to_string()])
            }
        }
    }

    /// Check every provider, then the fallback if enabled.
    pub async fn health(&self) -> Vec<ProviderHealth> {
        let mut report = Vec::with_capacity(self.providers.len() + 1);
        for provider in &self.providers {
            report.push(provider.health_check().await);
        }
        if let Some(fallback) = &self.fallback {
            report.push(fallback.health_check().await);
        }
        report
    }
}
