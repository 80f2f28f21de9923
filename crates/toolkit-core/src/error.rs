//! Contract-level errors for tool dispatch.

use thiserror::Error;

/// Shorthand for results produced by the registry and tools.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the tool contract itself.
///
/// Domain failures of a tool run are not errors at this level; they are
/// reported through [`crate::ToolResult::failure`].
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool registered under this name
    #[error("unknown tool: {0}")]
    ToolNotFound(String),

    /// Arguments do not satisfy the tool schema
    #[error("invalid arguments: {0}")]
    ToolValidation(String),

    /// A tool's report could not be encoded as JSON
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Machine-readable code surfaced by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound(_) => "TOOL_NOT_FOUND",
            ToolError::ToolValidation(_) => "INVALID_ARGUMENTS",
            ToolError::Json(_) => "JSON_ERROR",
        }
    }

    /// Message safe to hand back to API callers.
    pub fn user_message(&self) -> String {
        match self {
            ToolError::ToolNotFound(name) => format!("No tool named '{name}' is registered."),
            ToolError::ToolValidation(msg) => format!("Invalid arguments: {msg}"),
            ToolError::Json(_) => "Tool output could not be encoded.".into(),
        }
    }
}
