//! The four tool handlers.
//!
//! Each handler checks its required arguments, calls one backend operation and
//! formats the result. A required argument that is absent, null, zero, empty
//! text or an empty list counts as missing: the handler answers with an
//! explanatory message and the backend is not called.

use serde_json::{Map, Value};

use crate::backend::ModelBackend;
use crate::outcome::{normalize, FailureKind, Operation, ToolOutcome};
use crate::render::render;
use crate::tools::{ParamType, ToolError};

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_SIZE: i64 = 20;

/// Arguments of one tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accepts an object or null; anything else is rejected.
    pub fn from_value(value: Option<Value>) -> Result<Self, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(map)) => Ok(Self(map)),
            Some(_) => Err(ToolError::InvalidArgument {
                name: "arguments".to_string(),
                expected: "object",
            }),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// A required value, `None` when it is falsy whatever its JSON type.
    fn truthy(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !is_falsy(v))
    }

    /// Required integer; `None` when absent or falsy (including zero).
    pub fn integer(&self, name: &str) -> Result<Option<i64>, ToolError> {
        self.truthy(name)
            .map(|value| as_integer(name, value))
            .transpose()
    }

    /// Optional integer where zero is meaningful, e.g. a page number.
    pub fn integer_or(&self, name: &str, default: i64) -> Result<i64, ToolError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => as_integer(name, value),
        }
    }

    /// Required text; `None` when absent or falsy.
    pub fn text(&self, name: &str) -> Result<Option<&str>, ToolError> {
        match self.truthy(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(invalid(name, ParamType::String)),
        }
    }

    /// Required list of objects; `None` when absent or falsy.
    pub fn objects(&self, name: &str) -> Result<Option<Vec<Value>>, ToolError> {
        match self.truthy(name) {
            None => Ok(None),
            Some(Value::Array(items)) if items.iter().all(Value::is_object) => {
                Ok(Some(items.clone()))
            }
            Some(_) => Err(invalid(name, ParamType::ObjectArray)),
        }
    }
}

/// `null`, `false`, zero, `""`, `[]` and `{}`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn as_integer(name: &str, value: &Value) -> Result<i64, ToolError> {
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| invalid(name, ParamType::Integer))
}

fn invalid(name: &str, ty: ParamType) -> ToolError {
    ToolError::InvalidArgument {
        name: name.to_string(),
        expected: ty.expected(),
    }
}

fn missing(detail: &str) -> ToolOutcome {
    ToolOutcome::failure(FailureKind::MissingArgument, detail)
}

/// Run `operation` for the tool `tool` against `backend`.
pub async fn run(
    tool: &str,
    operation: Operation,
    backend: &dyn ModelBackend,
    args: &Arguments,
) -> ToolOutcome {
    let outcome = match operation {
        Operation::Predict => predict(tool, backend, args).await,
        Operation::SearchModels => search_models(tool, backend, args).await,
        Operation::GetModelInfo => get_model_info(tool, backend, args).await,
        Operation::GetModelSummary => get_model_summary(tool, backend, args).await,
    };
    outcome.unwrap_or_else(ToolOutcome::from)
}

async fn predict(
    tool: &str,
    backend: &dyn ModelBackend,
    args: &Arguments,
) -> Result<ToolOutcome, ToolError> {
    let model_id = args.integer("model_id")?;
    let dataset = args.objects("dataset")?;
    let (Some(model_id), Some(dataset)) = (model_id, dataset) else {
        return Ok(missing("model_id and dataset are required"));
    };

    Ok(match backend.predict(model_id, dataset).await {
        Ok(result) => ToolOutcome::Success(format!(
            "Prediction successful for model {}:\n{}",
            model_id,
            render(&result)
        )),
        Err(e) => normalize(tool, Operation::Predict, e),
    })
}

async fn search_models(
    tool: &str,
    backend: &dyn ModelBackend,
    args: &Arguments,
) -> Result<ToolOutcome, ToolError> {
    let query = args.text("query")?;
    let page = args.integer_or("page", DEFAULT_PAGE)?;
    let size = args.integer_or("size", DEFAULT_SIZE)?;
    let Some(query) = query else {
        return Ok(missing("query is required"));
    };

    Ok(match backend.search_models(query, page, size).await {
        Ok(models) => ToolOutcome::Success(format!("Found models:\n{}", render(&models))),
        Err(e) => normalize(tool, Operation::SearchModels, e),
    })
}

async fn get_model_info(
    tool: &str,
    backend: &dyn ModelBackend,
    args: &Arguments,
) -> Result<ToolOutcome, ToolError> {
    let Some(model_id) = args.integer("model_id")? else {
        return Ok(missing("model_id is required"));
    };

    Ok(match backend.get_model_by_id(model_id).await {
        Ok(model) => ToolOutcome::Success(format!("Model {} info:\n{}", model_id, render(&model))),
        Err(e) => normalize(tool, Operation::GetModelInfo, e),
    })
}

async fn get_model_summary(
    tool: &str,
    backend: &dyn ModelBackend,
    args: &Arguments,
) -> Result<ToolOutcome, ToolError> {
    let Some(model_id) = args.integer("model_id")? else {
        return Ok(missing("model_id is required"));
    };

    Ok(match backend.get_model_summary(model_id).await {
        Ok(summary) => ToolOutcome::Success(format!(
            "Model {} summary:\n{}",
            model_id,
            render(&summary)
        )),
        Err(e) => normalize(tool, Operation::GetModelSummary, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        Arguments::from_value(Some(value)).unwrap()
    }

    #[test]
    fn zero_and_absent_ids_are_missing() {
        assert_eq!(args(json!({"model_id": 0})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({"model_id": null})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({"model_id": 7})).integer("model_id"), Ok(Some(7)));
        assert_eq!(args(json!({"model_id": 7.0})).integer("model_id"), Ok(Some(7)));
    }

    #[test]
    fn mistyped_id_is_invalid() {
        let err = args(json!({"model_id": "seven"})).integer("model_id").unwrap_err();
        assert_eq!(err.to_string(), "invalid argument model_id: expected integer");
        assert!(args(json!({"model_id": 1.5})).integer("model_id").is_err());
    }

    #[test]
    fn page_zero_is_kept() {
        let a = args(json!({"page": 0}));
        assert_eq!(a.integer_or("page", 3), Ok(0));
        assert_eq!(a.integer_or("size", DEFAULT_SIZE), Ok(20));
    }

    #[test]
    fn empty_text_and_lists_are_missing() {
        assert_eq!(args(json!({"query": ""})).text("query"), Ok(None));
        assert_eq!(args(json!({"dataset": []})).objects("dataset"), Ok(None));
        assert!(args(json!({"dataset": [1, 2]})).objects("dataset").is_err());
    }

    #[test]
    fn falsy_values_of_another_type_are_missing() {
        assert_eq!(args(json!({"model_id": ""})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({"model_id": false})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({"model_id": 0.0})).integer("model_id"), Ok(None));
        assert_eq!(args(json!({"dataset": ""})).objects("dataset"), Ok(None));
        assert_eq!(args(json!({"dataset": {}})).objects("dataset"), Ok(None));
        assert_eq!(args(json!({"query": []})).text("query"), Ok(None));
        assert_eq!(args(json!({"query": 0})).text("query"), Ok(None));
        assert!(args(json!({"model_id": true})).integer("model_id").is_err());
        assert!(args(json!({"dataset": "rows"})).objects("dataset").is_err());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(Arguments::from_value(Some(json!([1]))).is_err());
        assert_eq!(Arguments::from_value(None), Ok(Arguments::default()));
    }
}
