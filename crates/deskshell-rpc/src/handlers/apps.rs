//! App registry handlers.

use super::{get_bool_param, get_str_param, require_str_param, require_typed_param};
use crate::server::AppState;
use deskshell_core::{
    validate, window_metadata, AppCategory, AppDescriptor, CreateAppRequest, DeskError,
    DescriptorPatch, RegisterOptions, Result,
};
use serde_json::{json, Value};

fn not_found(app_id: &str) -> Value {
    json!({
        "success": false,
        "error": format!("App not found: {}", app_id)
    })
}

pub async fn list_apps(state: &AppState, _params: &Value) -> Result<Value> {
    let registry = state.registry.read().await;
    Ok(json!({
        "success": true,
        "apps": serde_json::to_value(registry.list())?
    }))
}

pub async fn get_app(state: &AppState, params: &Value) -> Result<Value> {
    let app_id = require_str_param(params, "app_id", "appId")?;
    let registry = state.registry.read().await;
    match registry.get(&app_id) {
        Some(app) => Ok(json!({
            "success": true,
            "app": serde_json::to_value(app)?
        })),
        None => Ok(not_found(&app_id)),
    }
}

pub async fn get_apps_by_category(state: &AppState, params: &Value) -> Result<Value> {
    let raw = require_str_param(params, "category", "category")?;
    let category = AppCategory::from_str(&raw).ok_or_else(|| DeskError::InvalidParams {
        message: format!("Unknown category: {}", raw),
    })?;

    let registry = state.registry.read().await;
    Ok(json!({
        "success": true,
        "apps": serde_json::to_value(registry.by_category(category))?
    }))
}

pub async fn search_apps(state: &AppState, params: &Value) -> Result<Value> {
    let query = require_str_param(params, "query", "query")?;
    let registry = state.registry.read().await;
    Ok(json!({
        "success": true,
        "apps": serde_json::to_value(registry.search(&query))?
    }))
}

pub async fn get_registry_stats(state: &AppState, _params: &Value) -> Result<Value> {
    let stats = state.registry.read().await.stats();
    Ok(json!({
        "success": true,
        "stats": serde_json::to_value(stats)?
    }))
}

pub async fn get_registry_status(state: &AppState, _params: &Value) -> Result<Value> {
    let status = state.registry.read().await.status();
    Ok(json!({
        "success": true,
        "status": serde_json::to_value(status)?
    }))
}

pub async fn get_window_metadata(state: &AppState, params: &Value) -> Result<Value> {
    let app_id = require_str_param(params, "app_id", "appId")?;
    let registry = state.registry.read().await;
    match registry.get(&app_id) {
        Some(app) => Ok(json!({
            "success": true,
            "metadata": serde_json::to_value(window_metadata(app))?
        })),
        None => Ok(not_found(&app_id)),
    }
}

pub async fn validate_app(_state: &AppState, params: &Value) -> Result<Value> {
    let descriptor: AppDescriptor = require_typed_param(params, "descriptor", "descriptor")?;
    let report = validate(&descriptor);
    Ok(json!({
        "success": true,
        "valid": report.valid,
        "errors": report.errors
    }))
}

pub async fn register_app(state: &AppState, params: &Value) -> Result<Value> {
    let descriptor: AppDescriptor = require_typed_param(params, "descriptor", "descriptor")?;
    let overwrite = get_bool_param(params, "overwrite", "overwrite").unwrap_or(false);

    let mut registry = state.registry.write().await;
    match registry.register(descriptor, RegisterOptions { overwrite }) {
        Ok(()) => Ok(json!({"success": true, "errors": []})),
        Err(DeskError::InvalidDescriptor { errors, .. }) => {
            Ok(json!({"success": false, "errors": errors}))
        }
        Err(e @ DeskError::DuplicateApp { .. }) => {
            Ok(json!({"success": false, "errors": [e.to_string()]}))
        }
        Err(e) => Err(e),
    }
}

pub async fn update_app(state: &AppState, params: &Value) -> Result<Value> {
    let app_id = require_str_param(params, "app_id", "appId")?;
    let patch: DescriptorPatch = require_typed_param(params, "patch", "patch")?;

    let mut registry = state.registry.write().await;
    match registry.update(&app_id, patch) {
        Ok(app) => Ok(json!({
            "success": true,
            "app": serde_json::to_value(app)?,
            "errors": []
        })),
        Err(DeskError::InvalidDescriptor { errors, .. }) => {
            Ok(json!({"success": false, "errors": errors}))
        }
        Err(DeskError::AppNotFound { .. }) => Ok(json!({
            "success": false,
            "errors": [format!("App not found: {}", app_id)]
        })),
        Err(e) => Err(e),
    }
}

pub async fn clone_app(state: &AppState, params: &Value) -> Result<Value> {
    let source_id = require_str_param(params, "source_id", "sourceId")?;
    let new_id = require_str_param(params, "new_id", "newId")?;
    let new_name = get_str_param(params, "new_name", "newName").map(String::from);

    let mut registry = state.registry.write().await;
    let result = state
        .builder
        .clone_app(&mut registry, &source_id, &new_id, new_name);
    Ok(serde_json::to_value(result)?)
}

pub async fn create_app(state: &AppState, params: &Value) -> Result<Value> {
    let request: CreateAppRequest =
        serde_json::from_value(params.clone()).map_err(|e| DeskError::InvalidParams {
            message: format!("Invalid create_app request: {}", e),
        })?;

    let mut registry = state.registry.write().await;
    let result = state.builder.create(&mut registry, request);
    Ok(serde_json::to_value(result)?)
}
