//! Transactional mail delivery.
//!
//! Templates are rendered locally and handed to the first configured
//! [`MailProvider`] that accepts them. When every provider is missing or
//! failing, the service can fall back to logging the message so account
//! flows keep working in development.

mod console;
mod provider;
mod resend;
mod service;
mod smtp;
mod template;

pub use console::ConsoleProvider;
pub use provider::{DeliveryReceipt, MailProvider, OutgoingMail, ProviderHealth};
pub use resend::ResendProvider;
pub use service::{DeliveryOutcome, MailService, MailSettings};
pub use smtp::SmtpProvider;
pub use template::{escape_html, render_str, MailTemplate, RenderedMail};
