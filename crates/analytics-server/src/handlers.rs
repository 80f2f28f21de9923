//! Route handlers for the tool API.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use toolkit_core::{ToolCall, ToolError, ToolResult, ToolSchema};
use web3_analytics::DataSourceMode;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub data_source: &'static str,
    pub tools: usize,
}

/// Body of `POST /api/tools/{name}`. Both fields may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &ToolError) -> ApiError {
    let status = match err {
        ToolError::ToolNotFound(_) => StatusCode::NOT_FOUND,
        ToolError::ToolValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ToolError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: err.code().into(),
        }),
    )
}

/// Liveness plus the active data-source mode.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        data_source: match state.data_source {
            DataSourceMode::Live => "live",
            DataSourceMode::Mock => "mock",
        },
        tools: state.tools.len(),
    })
}

/// Every registered schema, sorted by tool name.
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

/// Run one tool call.
///
/// Domain failures (unknown chain, short history, upstream outage) are
/// returned as `200` with `success: false` and a `code`; only contract
/// violations map to error statuses.
pub async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<ExecuteRequest>,
) -> Result<Json<ToolResult>, ApiError> {
    let call = ToolCall {
        name,
        arguments: payload.arguments,
        id: Some(payload.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
    };

    let result = state.tools.execute(&call).await.map_err(|e| {
        tracing::warn!(tool = %call.name, code = e.code(), "Tool call rejected: {}", e);
        api_error(&e)
    })?;

    if !result.success {
        tracing::info!(tool = %call.name, code = result.code.as_deref().unwrap_or("-"), "Tool reported failure");
    }

    Ok(Json(result))
}
