//! Tool System
//!
//! Typed tool schemas, calls and results, plus the registry that dispatches
//! calls by name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, ToolError};

/// A request to run one tool by name
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,

    /// Named JSON arguments
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Caller-chosen correlation id, echoed on the result
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style argument insertion
    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    /// String argument; blank strings count as absent
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Unsigned integer argument, accepting numeric strings as well
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float argument, accepting numeric strings as well
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Outcome of one tool run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,

    /// Echo of [`ToolCall::id`]
    pub id: Option<String>,

    pub success: bool,

    /// Output (summary text or error message)
    pub output: String,

    /// Machine-readable outcome code for failures (e.g. `NOT_FOUND`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Structured report, when the run produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            code: None,
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            code: None,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// One named argument of a tool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,

    /// JSON type name: `string`, `number`, `integer`, `boolean`, `object` or `array`
    #[serde(rename = "type")]
    pub param_type: String,

    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Value the tool uses when the argument is omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Accepted values, when the set is closed
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

impl ParameterSchema {
    /// A required parameter with no default
    pub fn required(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    /// An optional parameter
    pub fn optional(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_enum(mut self, values: Vec<serde_json::Value>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// Self-description of a tool, as listed to callers
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Registry key
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSchema>,

    #[serde(default)]
    pub category: Option<String>,

    /// Read-only tools leave this false
    #[serde(default)]
    pub has_side_effects: bool,
}

/// A named, self-describing async operation
#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Checked by the registry before `execute`; rejects missing or null required arguments
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();
        let missing = schema
            .parameters
            .iter()
            .filter(|p| p.required)
            .find(|p| call.arguments.get(&p.name).is_none_or(serde_json::Value::is_null));

        match missing {
            Some(param) => Err(ToolError::ToolValidation(format!("Missing required parameter: {}", param.name))),
            None => Ok(()),
        }
    }
}

/// Tools keyed by schema name
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.schema().name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Look up, validate and run a call, echoing its id on the result
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;

        tracing::debug!(tool = %call.name, args = call.arguments.len(), "Executing tool");
        let result = tool.execute(call).await?;

        Ok(match &call.id {
            Some(id) => result.with_id(id.clone()),
            None => result,
        })
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo a message back".into(),
                parameters: vec![ParameterSchema::required("message", "string", "Text to echo")],
                category: Some("test".into()),
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let message = call.get_str("message").unwrap_or_default();
            Ok(ToolResult::success("echo", message).with_data(json!({ "len": message.len() })))
        }
    }

    #[test]
    fn test_argument_helpers() {
        let call = ToolCall::new("x")
            .with_arg("depth", json!(5))
            .with_arg("depth_str", json!(" 7 "))
            .with_arg("ratio", json!("0.5"))
            .with_arg("blank", json!("   "))
            .with_arg("negative", json!(-3));

        assert_eq!(call.get_u64("depth"), Some(5));
        assert_eq!(call.get_u64("depth_str"), Some(7));
        assert_eq!(call.get_u64("negative"), None);
        assert_eq!(call.get_f64("ratio"), Some(0.5));
        assert_eq!(call.get_str("blank"), None);
        assert_eq!(call.get_str("missing"), None);
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[tokio::test]
    async fn test_registry_execute_propagates_id() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let mut call = ToolCall::new("echo").with_arg("message", json!("hi"));
        call.id = Some("call-1".into());

        let result = registry.execute(&call).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hi");
        assert_eq!(result.id.as_deref(), Some("call-1"));
        assert_eq!(result.data, Some(json!({ "len": 2 })));
    }

    #[tokio::test]
    async fn test_registry_rejects_missing_required() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let err = registry.execute(&ToolCall::new("echo")).await.unwrap_err();
        assert!(matches!(err, ToolError::ToolValidation(_)));

        let null_arg = ToolCall::new("echo").with_arg("message", json!(null));
        assert!(matches!(registry.execute(&null_arg).await, Err(ToolError::ToolValidation(_))));

        let err = registry.execute(&ToolCall::new("nope")).await.unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound(_)));
    }

    #[test]
    fn test_parameter_schema_wire_form() {
        let param = ParameterSchema::optional("timeframe", "string", "Candle interval")
            .with_default(json!("1h"))
            .with_enum(vec![json!("1h"), json!("1d")]);
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value["type"], "string");
        assert_eq!(value["required"], false);
        assert_eq!(value["enum"], json!(["1h", "1d"]));
    }

    #[test]
    fn test_failure_serializes_code() {
        let result = ToolResult::failure("echo", "missing").with_code("NOT_FOUND");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
    }
}
