//! Tool catalog: definitions, parameter schemas and the registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::outcome::Operation;

/// Error raised while a tool call is resolved or its arguments decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool {0}")]
    ToolNotFound(String),

    #[error("invalid argument {name}: expected {expected}")]
    InvalidArgument {
        name: String,
        expected: &'static str,
    },
}

/// Error raised while the catalog is assembled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool {0} is registered twice")]
    DuplicateTool(String),
}

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    String,
    /// Sequence of objects, e.g. a prediction dataset.
    ObjectArray,
}

impl ParamType {
    /// Human name used in argument errors.
    pub fn expected(self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::String => "string",
            ParamType::ObjectArray => "array of objects",
        }
    }

    fn schema(self) -> Value {
        match self {
            ParamType::Integer => json!({ "type": "integer" }),
            ParamType::String => json!({ "type": "string" }),
            ParamType::ObjectArray => json!({
                "type": "array",
                "items": { "type": "object", "additionalProperties": true }
            }),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            description,
        }
    }

    pub fn optional(
        name: &'static str,
        ty: ParamType,
        default: Value,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: Some(default),
            description,
        }
    }
}

/// Name, description and ordered parameter list of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON Schema object describing the tool arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut schema = param.ty.schema();
            if let Value::Object(fields) = &mut schema {
                fields.insert("description".to_string(), json!(param.description));
                if let Some(default) = &param.default {
                    fields.insert("default".to_string(), default.clone());
                }
            }
            properties.insert(param.name.to_string(), schema);
            if param.required {
                required.push(json!(param.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }
}

/// A definition together with the operation that serves it.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub operation: Operation,
}

/// Immutable name → tool mapping, built once at startup.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Arc<[RegisteredTool]>,
    index: Arc<HashMap<&'static str, usize>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Definitions in registration order.
    pub fn list(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(|t| &t.definition)
    }

    pub fn resolve(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Collects registrations; [`build`](Self::build) freezes them.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistryBuilder {
    pub fn register(
        mut self,
        definition: ToolDefinition,
        operation: Operation,
    ) -> Result<Self, RegistryError> {
        if self.index.contains_key(definition.name) {
            return Err(RegistryError::DuplicateTool(definition.name.to_string()));
        }
        self.index.insert(definition.name, self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            operation,
        });
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools.into(),
            index: Arc::new(self.index),
        }
    }
}

/// The Jaqpot tool catalog.
pub fn jaqpot_registry() -> Result<ToolRegistry, RegistryError> {
    let model_id =
        || ParamSpec::required("model_id", ParamType::Integer, "The ID of the Jaqpot model");

    Ok(ToolRegistry::builder()
        .register(
            ToolDefinition {
                name: "predict",
                description: "Make predictions using a Jaqpot model.",
                params: vec![
                    model_id(),
                    ParamSpec::required(
                        "dataset",
                        ParamType::ObjectArray,
                        "Input rows: a list of objects mapping feature names to values",
                    ),
                ],
            },
            Operation::Predict,
        )?
        .register(
            ToolDefinition {
                name: "search_models",
                description: "Search for Jaqpot models by criteria.",
                params: vec![
                    ParamSpec::required("query", ParamType::String, "Query to search for models"),
                    ParamSpec::optional(
                        "page",
                        ParamType::Integer,
                        json!(0),
                        "Page number for pagination",
                    ),
                    ParamSpec::optional(
                        "size",
                        ParamType::Integer,
                        json!(20),
                        "Number of results per page",
                    ),
                ],
            },
            Operation::SearchModels,
        )?
        .register(
            ToolDefinition {
                name: "get_model_info",
                description: "Get detailed information about a specific Jaqpot model.",
                params: vec![model_id()],
            },
            Operation::GetModelInfo,
        )?
        .register(
            ToolDefinition {
                name: "get_model_summary",
                description: "Get a summary of a Jaqpot model including features and description.",
                params: vec![model_id()],
            },
            Operation::GetModelSummary,
        )?
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_four_tools_in_order() {
        let registry = jaqpot_registry().unwrap();
        let names: Vec<_> = registry.list().map(|d| d.name).collect();
        assert_eq!(
            names,
            ["predict", "search_models", "get_model_info", "get_model_summary"]
        );
    }

    #[test]
    fn resolve_unknown_tool() {
        let registry = jaqpot_registry().unwrap();
        assert_eq!(
            registry.resolve("nonexistent").unwrap_err(),
            ToolError::ToolNotFound("nonexistent".to_string())
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let definition = ToolDefinition {
            name: "dup",
            description: "",
            params: Vec::new(),
        };
        let err = ToolRegistry::builder()
            .register(definition.clone(), Operation::GetModelInfo)
            .unwrap()
            .register(definition, Operation::GetModelSummary)
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("dup".to_string()));
        assert_eq!(err.to_string(), "tool dup is registered twice");
    }

    #[test]
    fn search_schema_declares_defaults() {
        let registry = jaqpot_registry().unwrap();
        let schema = registry
            .resolve("search_models")
            .unwrap()
            .definition
            .input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["page"]["default"], 0);
        assert_eq!(schema["properties"]["size"]["default"], 20);
        assert_eq!(schema["properties"]["query"]["type"], "string");
    }

    #[test]
    fn predict_schema_requires_dataset() {
        let registry = jaqpot_registry().unwrap();
        let schema = registry.resolve("predict").unwrap().definition.input_schema();
        assert_eq!(schema["required"], json!(["model_id", "dataset"]));
        assert_eq!(schema["properties"]["dataset"]["type"], "array");
        assert_eq!(schema["properties"]["dataset"]["items"]["type"], "object");
    }
}
