//! # toolkit-core
//!
//! The calling contract shared by every analytics tool.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ToolCall    ┌──────────────┐   execute   ┌──────────────┐
//! │    Caller    │──────────────▶│ ToolRegistry │────────────▶│  dyn Tool    │
//! │ (HTTP, CLI)  │◀──────────────│  (by name)   │◀────────────│ (schema+run) │
//! └──────────────┘   ToolResult  └──────────────┘             └──────────────┘
//! ```
//!
//! A tool is a name, a typed parameter schema and an async `execute` that
//! returns a structured [`ToolResult`]. Recoverable domain outcomes (not found,
//! not computable, insufficient history) travel inside the result with a
//! machine-readable `code`; only contract violations surface as [`ToolError`].

pub mod error;
pub mod tool;

pub use error::{Result, ToolError};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
