use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use parley_core::ToolError;

pub mod fraud;
pub mod records;
pub mod tutor;

/// Accepted JSON shapes for a declared argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Integer,
    Object,
}

impl ArgKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Object => value.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Object => "an object",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
}

impl ArgSpec {
    pub const fn required(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// Declared call shape for a tool. Arguments are validated before dispatch so
/// individual tools never see malformed input.
#[derive(Clone, Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub args: Vec<ArgSpec>,
}

impl ToolSpec {
    pub fn check(&self, args: &Value) -> Result<(), ToolError> {
        let map = match args {
            Value::Object(map) => map,
            Value::Null if self.args.iter().all(|a| !a.required) => return Ok(()),
            _ => {
                return Err(ToolError::InvalidArguments {
                    tool: self.name.to_string(),
                    message: "arguments must be a JSON object".to_string(),
                })
            }
        };

        if let Some(unexpected) = map.keys().find(|key| {
            !self.args.iter().any(|spec| spec.name == key.as_str())
        }) {
            return Err(ToolError::InvalidArguments {
                tool: self.name.to_string(),
                message: format!("unexpected argument `{unexpected}`"),
            });
        }

        for spec in &self.args {
            match map.get(spec.name) {
                Some(value) if spec.kind.accepts(value) => {}
                Some(_) => {
                    return Err(ToolError::InvalidArguments {
                        tool: self.name.to_string(),
                        message: format!("`{}` must be {}", spec.name, spec.kind.describe()),
                    })
                }
                None if spec.required => {
                    return Err(ToolError::InvalidArguments {
                        tool: self.name.to_string(),
                        message: format!("missing required argument `{}`", spec.name),
                    })
                }
                None => {}
            }
        }

        Ok(())
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.spec().name.to_string(), Box::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Validates the arguments against the tool's declared spec, then executes.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.spec().check(&args)?;

        debug!(tool = name, "tool.invoked");
        match tool.execute(args).await {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(tool = name, error = %err, "tool.failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArgKind, ArgSpec, Tool, ToolRegistry, ToolSpec};
    use async_trait::async_trait;
    use parley_core::ToolError;
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo",
                description: "echoes the message back",
                args: vec![
                    ArgSpec::required("message", ArgKind::String),
                    ArgSpec::optional("times", ArgKind::Integer),
                ],
            }
        }

        async fn execute(&self, args: Value) -> Result<Value, ToolError> {
            Ok(json!({ "echo": args["message"] }))
        }
    }

    #[tokio::test]
    async fn invoke_dispatches_to_registered_tool() {
        let mut registry = ToolRegistry::default();
        registry.register(Echo);

        let result = registry.invoke("echo", json!({ "message": "hi" })).await.unwrap();
        assert_eq!(result["echo"], "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_by_name() {
        let registry = ToolRegistry::default();
        let err = registry.invoke("nope", json!({})).await.unwrap_err();
        match err {
            ToolError::UnknownTool(name) => assert_eq!(name, "nope"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_required_argument_is_rejected_before_execution() {
        let mut registry = ToolRegistry::default();
        registry.register(Echo);

        let err = registry.invoke("echo", json!({ "times": 2 })).await.unwrap_err();
        match err {
            ToolError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "echo");
                assert!(message.contains("message"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn wrong_argument_type_is_rejected() {
        let mut registry = ToolRegistry::default();
        registry.register(Echo);

        let err = registry.invoke("echo", json!({ "message": 7 })).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
