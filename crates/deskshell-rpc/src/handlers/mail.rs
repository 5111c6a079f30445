//! Mail handlers.

use super::{get_typed_param, require_str_param, require_typed_param};
use crate::server::AppState;
use deskshell_core::{DeskError, MailTemplate, Result};
use serde_json::{json, Value};
use std::collections::HashMap;

pub async fn get_mail_health(state: &AppState, _params: &Value) -> Result<Value> {
    let providers = state.mail.health().await;
    let healthy = providers.iter().any(|p| p.healthy);
    Ok(json!({
        "success": true,
        "healthy": healthy,
        "providers": serde_json::to_value(providers)?
    }))
}

pub async fn send_mail(state: &AppState, params: &Value) -> Result<Value> {
    let name = require_str_param(params, "template", "template")?;
    let template = MailTemplate::from_str(&name).ok_or_else(|| DeskError::InvalidParams {
        message: format!("Unknown mail template: {}", name),
    })?;

    // Accept a single address or a list
    let to: Vec<String> = match params.get("to") {
        Some(Value::String(addr)) => vec![addr.clone()],
        _ => require_typed_param(params, "to", "to")?,
    };
    let vars: HashMap<String, String> =
        get_typed_param(params, "vars", "vars")?.unwrap_or_default();

    let outcome = state.mail.send_template(template, &to, &vars).await;
    Ok(serde_json::to_value(outcome)?)
}
