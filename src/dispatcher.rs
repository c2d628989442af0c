//! Resolves tool calls against the registry and runs them.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::backend::ModelBackend;
use crate::handlers::{run, Arguments};
use crate::outcome::ToolOutcome;
use crate::tools::{ToolDefinition, ToolError, ToolRegistry};

/// A single tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Option<Value>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments),
        }
    }
}

impl From<(String, Option<Map<String, Value>>)> for ToolCallRequest {
    fn from((name, arguments): (String, Option<Map<String, Value>>)) -> Self {
        Self {
            name,
            arguments: arguments.map(Value::Object),
        }
    }
}

/// Executes tool calls. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Dispatcher {
    registry: ToolRegistry,
    backend: Arc<dyn ModelBackend>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, backend: Arc<dyn ModelBackend>) -> Self {
        Self { registry, backend }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Definitions of every registered tool.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.list().cloned().collect()
    }

    /// Run one call and return its outcome.
    pub async fn execute(&self, request: ToolCallRequest) -> ToolOutcome {
        let tool = match self.registry.resolve(&request.name) {
            Ok(tool) => tool,
            Err(e) => {
                info!("Call to unknown tool {}", request.name);
                return e.into();
            }
        };

        let args = match Arguments::from_value(request.arguments) {
            Ok(args) => args,
            Err(e) => return e.into(),
        };

        info!("Tool call requested: {}", request.name);
        debug!("Tool arguments: {:?}", args);

        let outcome = run(tool.definition.name, tool.operation, self.backend.as_ref(), &args).await;
        match &outcome {
            ToolOutcome::Success(_) => info!("Tool {} executed successfully", request.name),
            ToolOutcome::Failure { kind, .. } => {
                info!("Tool {} finished with {:?}", request.name, kind)
            }
        }
        outcome
    }

    /// Run one call and flatten the outcome to the text returned to callers.
    pub async fn dispatch(&self, request: ToolCallRequest) -> String {
        self.execute(request).await.into_text()
    }

    /// Look up a tool without running it.
    pub fn resolve(&self, name: &str) -> Result<&ToolDefinition, ToolError> {
        self.registry.resolve(name).map(|t| &t.definition)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
