//! Transactional mail templates.
//!
//! Templates carry `{{placeholder}}` markers. Rendering fails if any marker
//! has no value, so a half-filled message is never sent. Values are
//! HTML-escaped in the HTML body only.

use crate::error::{DeskError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

/// Messages the shell sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTemplate {
    EmailVerification,
    PasswordReset,
    Welcome,
}

/// A fully rendered message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl MailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailTemplate::EmailVerification => "email_verification",
            MailTemplate::PasswordReset => "password_reset",
            MailTemplate::Welcome => "welcome",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email_verification" => Some(MailTemplate::EmailVerification),
            "password_reset" => Some(MailTemplate::PasswordReset),
            "welcome" => Some(MailTemplate::Welcome),
            _ => None,
        }
    }

    fn parts(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            MailTemplate::EmailVerification => (
                "Verify your email for {{app_name}}",
                "<p>Hi {{name}},</p>\
                 <p>Confirm your address to finish setting up your desktop.</p>\
                 <p><a href=\"{{url}}\">Verify email</a></p>",
                "Hi {{name}},\n\nConfirm your address to finish setting up your desktop:\n{{url}}\n",
            ),
            MailTemplate::PasswordReset => (
                "Reset your {{app_name}} password",
                "<p>Hi {{name}},</p>\
                 <p>Someone asked to reset your password. If that was you, continue below.</p>\
                 <p><a href=\"{{url}}\">Reset password</a></p>",
                "Hi {{name}},\n\nSomeone asked to reset your password. If that was you, open:\n{{url}}\n",
            ),
            MailTemplate::Welcome => (
                "Welcome to {{app_name}}",
                "<p>Hi {{name}},</p><p>Your desktop is ready.</p>",
                "Hi {{name}},\n\nYour desktop is ready.\n",
            ),
        }
    }

    /// Placeholder names used anywhere in the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        let (subject, html, text) = self.parts();
        [subject, html, text]
            .into_iter()
            .flat_map(|part| PLACEHOLDER.captures_iter(part))
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn render(&self, vars: &HashMap<String, String>) -> Result<RenderedMail> {
        let (subject, html, text) = self.parts();
        Ok(RenderedMail {
            subject: render_str(subject, vars)?,
            html: substitute(html, vars, escape_html)?,
            text: render_str(text, vars)?,
        })
    }
}

/// Substitute `{{name}}` markers in `template` from `vars`.
pub fn render_str(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    substitute(template, vars, |value| value.to_string())
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn substitute(
    template: &str,
    vars: &HashMap<String, String>,
    encode: impl Fn(&str) -> String,
) -> Result<String> {
    let missing: BTreeSet<&str> = PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            (!vars.contains_key(key)).then_some(key)
        })
        .collect();

    if !missing.is_empty() {
        return Err(DeskError::Template {
            message: format!(
                "missing values for: {}",
                missing.into_iter().collect::<Vec<_>>().join(", ")
            ),
        });
    }

    Ok(PLACEHOLDER
        .replace_all(template, |caps: &Captures| encode(&vars[&caps[1]]))
        .into_owned())
}
