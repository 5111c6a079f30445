//! JSON-RPC request handlers, split by domain.

mod apps;
mod mail;

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use deskshell_core::{DeskError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn, Level};

// ============================================================================
// JSON-RPC types
// ============================================================================

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }
}

/// JSON-RPC code for failures the caller did not cause.
const INTERNAL_ERROR: i32 = -32603;

/// Internal failures are errors; everything else is a rejected request.
fn error_log_level(code: i32) -> Level {
    if code == INTERNAL_ERROR {
        Level::ERROR
    } else {
        Level::WARN
    }
}

// ============================================================================
// Parameter extraction helpers
// ============================================================================

fn lookup<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a Value> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .filter(|v| !v.is_null())
}

/// Extract an optional string parameter, supporting both snake_case and camelCase.
pub(crate) fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a str> {
    lookup(params, snake, camel).and_then(|v| v.as_str())
}

/// Extract a required string parameter or return an error.
pub(crate) fn require_str_param(params: &Value, snake: &str, camel: &str) -> Result<String> {
    get_str_param(params, snake, camel)
        .map(String::from)
        .ok_or_else(|| DeskError::InvalidParams {
            message: format!("Missing required parameter: {}", snake),
        })
}

/// Extract an optional bool parameter, supporting both snake_case and camelCase.
pub(crate) fn get_bool_param(params: &Value, snake: &str, camel: &str) -> Option<bool> {
    lookup(params, snake, camel).and_then(|v| v.as_bool())
}

/// Deserialize an optional structured parameter.
pub(crate) fn get_typed_param<T: DeserializeOwned>(
    params: &Value,
    snake: &str,
    camel: &str,
) -> Result<Option<T>> {
    lookup(params, snake, camel)
        .map(|v| {
            serde_json::from_value(v.clone()).map_err(|e| DeskError::InvalidParams {
                message: format!("Invalid parameter {}: {}", snake, e),
            })
        })
        .transpose()
}

/// Deserialize a required structured parameter.
pub(crate) fn require_typed_param<T: DeserializeOwned>(
    params: &Value,
    snake: &str,
    camel: &str,
) -> Result<T> {
    get_typed_param(params, snake, camel)?.ok_or_else(|| DeskError::InvalidParams {
        message: format!("Missing required parameter: {}", snake),
    })
}

// ============================================================================
// HTTP endpoints
// ============================================================================

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = &request.method;
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id.clone();

    debug!("RPC call: {}({:?})", method, params);

    if method == "health_check" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, json!({"status": "ok"}))),
        );
    }

    match dispatch_method(&state, method, &params).await {
        Ok(value) => (StatusCode::OK, Json(JsonRpcResponse::success(id, value))),
        Err(e) => {
            let code = e.to_rpc_error_code();
            if error_log_level(code) == Level::ERROR {
                error!("RPC error for {}: {}", method, e);
            } else {
                warn!("RPC call {} rejected ({}): {}", method, code, e);
            }
            (
                StatusCode::OK,
                Json(JsonRpcResponse::error(id, code, e.to_string())),
            )
        }
    }
}

// ============================================================================
// Method dispatcher
// ============================================================================

/// Dispatch a method call to the appropriate domain handler.
async fn dispatch_method(state: &AppState, method: &str, params: &Value) -> Result<Value> {
    match method {
        // Registry queries
        "list_apps" => apps::list_apps(state, params).await,
        "get_app" => apps::get_app(state, params).await,
        "get_apps_by_category" => apps::get_apps_by_category(state, params).await,
        "search_apps" => apps::search_apps(state, params).await,
        "get_registry_stats" => apps::get_registry_stats(state, params).await,
        "get_registry_status" => apps::get_registry_status(state, params).await,
        "get_window_metadata" => apps::get_window_metadata(state, params).await,
        "validate_app" => apps::validate_app(state, params).await,

        // Registry writes
        "register_app" => apps::register_app(state, params).await,
        "update_app" => apps::update_app(state, params).await,
        "clone_app" => apps::clone_app(state, params).await,
        "create_app" => apps::create_app(state, params).await,

        // Mail
        "get_mail_health" => mail::get_mail_health(state, params).await,
        "send_mail" => mail::send_mail(state, params).await,

        _ => Err(DeskError::MethodNotFound {
            method: method.to_string(),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"data": "test"}));
        assert!(response.error.is_none());
        assert!(response.result.is_some());
    }

    #[test]
    fn test_json_rpc_response_error() {
        let response = JsonRpcResponse::error(Some(json!(1)), -32600, "Test error".into());
        assert!(response.error.is_some());
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[test]
    fn test_client_errors_log_as_warnings() {
        let client_errors = [
            DeskError::MethodNotFound {
                method: "nope".into(),
            },
            DeskError::InvalidParams {
                message: "missing".into(),
            },
            DeskError::AppNotFound { id: "a".into() },
        ];
        for e in client_errors {
            assert_eq!(error_log_level(e.to_rpc_error_code()), Level::WARN, "{}", e);
        }

        let internal = DeskError::Other("disk on fire".into());
        assert_eq!(error_log_level(internal.to_rpc_error_code()), Level::ERROR);
    }

    #[test]
    fn test_param_helpers_accept_both_cases() {
        let params = json!({"app_id": "notes", "overwrite": true, "newId": "notes-2"});
        assert_eq!(get_str_param(&params, "app_id", "appId"), Some("notes"));
        assert_eq!(get_str_param(&params, "new_id", "newId"), Some("notes-2"));
        assert_eq!(get_bool_param(&params, "overwrite", "overwrite"), Some(true));
        assert!(require_str_param(&params, "query", "query").is_err());
    }

    #[test]
    fn test_typed_param() {
        let params = json!({"size": {"width": 1, "height": 2}, "empty": null});
        let size: deskshell_core::WindowSize =
            require_typed_param(&params, "size", "size").unwrap();
        assert_eq!(size.height, 2);

        let missing: Option<deskshell_core::WindowSize> =
            get_typed_param(&params, "empty", "empty").unwrap();
        assert!(missing.is_none());

        let bad: Result<deskshell_core::WindowSize> = require_typed_param(
            &json!({"size": "big"}),
            "size",
            "size",
        );
        assert!(matches!(bad, Err(DeskError::InvalidParams { .. })));
    }
}
