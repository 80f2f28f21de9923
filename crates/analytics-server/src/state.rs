//! State shared across handlers.

use std::sync::Arc;

use toolkit_core::ToolRegistry;
use web3_analytics::DataSourceMode;

/// Cloned into every request by axum.
#[derive(Clone)]
pub struct AppState {
    /// Tool registry with all available tools
    pub tools: Arc<ToolRegistry>,

    /// Whether tools read live APIs or fixtures
    pub data_source: DataSourceMode,
}
