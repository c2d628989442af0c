//! HTTP client for the Jaqpot REST API.
//!
//! Every request is authenticated with the `X-Api-Key` / `X-Api-Secret`
//! header pair. Predictions are asynchronous on the Jaqpot side: the predict
//! call answers `201 Created` with a `Location` pointing at a dataset, which is
//! polled until it reaches `SUCCESS` or `FAILURE`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::{BackendError, ModelBackend};
use crate::config::{Credentials, ServerConfig};
use crate::http::{build_http_client, RequestBuilderExt, ResponseExt};
use crate::options::{PredictionOptions, TransportOptions};

const API_KEY_HEADER: &str = "X-Api-Key";
const API_SECRET_HEADER: &str = "X-Api-Secret";

/// Request body of `POST /v1/models/{id}/predict`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    entry_type: &'static str,
    input: &'a [Value],
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    query: &'a str,
    page: i64,
    size: i64,
}

/// Jaqpot API client. Built once at startup and shared by all tool calls.
#[derive(Debug, Clone)]
pub struct JaqpotClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    prediction_options: PredictionOptions,
}

impl JaqpotClient {
    /// Create a new client.
    pub fn new(
        credentials: Credentials,
        base_url: impl Into<String>,
        transport_options: TransportOptions,
        prediction_options: PredictionOptions,
    ) -> Result<Self, reqwest::Error> {
        let http = build_http_client(&transport_options)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            prediction_options,
        })
    }

    /// Create a client from the startup configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.credentials.clone(),
            config.base_url.clone(),
            config.transport.clone(),
            config.prediction,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("Jaqpot {} {}", method, url);

        self.http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, self.credentials.key())
            .header(API_SECRET_HEADER, self.credentials.secret())
    }

    async fn get_json(&self, path: &str) -> Result<Value, BackendError> {
        self.request(Method::GET, path)
            .send()
            .await?
            .json_checked()
            .await
    }

    /// Poll a prediction dataset until it reaches a terminal status or the
    /// prediction timeout elapses.
    async fn wait_for_dataset(&self, dataset_id: &str) -> Result<Value, BackendError> {
        let PredictionOptions {
            poll_interval,
            timeout,
        } = self.prediction_options;
        let deadline = Instant::now() + timeout;
        let path = format!("/v1/datasets/{}", dataset_id);

        loop {
            let dataset = self.get_json(&path).await?;
            if let Some(outcome) = dataset_outcome(&dataset) {
                return outcome;
            }

            if Instant::now() + poll_interval > deadline {
                warn!("Prediction dataset {} still pending after {:?}", dataset_id, timeout);
                return Err(BackendError::PredictionTimeout(format!(
                    "prediction did not complete within {:?}",
                    timeout
                )));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[async_trait]
impl ModelBackend for JaqpotClient {
    async fn predict(&self, model_id: i64, dataset: Vec<Value>) -> Result<Value, BackendError> {
        let body = PredictionRequest {
            kind: "PREDICTION",
            entry_type: "ARRAY",
            input: &dataset,
        };

        let response = self
            .request(Method::POST, &format!("/v1/models/{}/predict", model_id))
            .json_logged(&body)
            .send()
            .await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let created = response.json_checked().await?;

        // Some deployments answer synchronously with the finished dataset.
        if let Some(outcome) = dataset_outcome(&created) {
            return outcome;
        }

        let dataset_id = location
            .as_deref()
            .and_then(dataset_id_from_location)
            .or_else(|| created.get("id").map(id_text))
            .ok_or_else(|| {
                BackendError::Unexpected("prediction response did not reference a dataset".into())
            })?;

        debug!("Prediction for model {} queued as dataset {}", model_id, dataset_id);
        self.wait_for_dataset(&dataset_id).await
    }

    async fn search_models(
        &self,
        query: &str,
        page: i64,
        size: i64,
    ) -> Result<Value, BackendError> {
        self.request(Method::GET, "/v1/models/search")
            .query(&SearchParams { query, page, size })
            .send()
            .await?
            .json_checked()
            .await
    }

    async fn get_model_by_id(&self, model_id: i64) -> Result<Value, BackendError> {
        self.get_json(&format!("/v1/models/{}", model_id)).await
    }

    async fn get_model_summary(&self, model_id: i64) -> Result<Value, BackendError> {
        let model = self.get_model_by_id(model_id).await?;
        Ok(summarize_model(&model))
    }
}

/// Terminal outcome of a prediction dataset, `None` while it is still running.
fn dataset_outcome(dataset: &Value) -> Option<Result<Value, BackendError>> {
    match dataset.get("status").and_then(Value::as_str)? {
        "SUCCESS" => Some(Ok(dataset.get("result").cloned().unwrap_or(Value::Null))),
        "FAILURE" => {
            let reason = dataset
                .get("failureReason")
                .and_then(Value::as_str)
                .filter(|r| !r.is_empty())
                .unwrap_or("prediction failed");
            Some(Err(BackendError::PredictionFailure(reason.to_string())))
        }
        _ => None,
    }
}

fn dataset_id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Project a full model onto the fields a caller needs to prepare a prediction.
fn summarize_model(model: &Value) -> Value {
    let field = |key: &str| model.get(key).cloned().unwrap_or(Value::Null);

    let mut summary = Map::new();
    summary.insert("modelId".to_string(), field("id"));
    summary.insert("name".to_string(), field("name"));
    summary.insert("description".to_string(), field("description"));
    summary.insert("type".to_string(), field("type"));
    summary.insert(
        "independentFeatures".to_string(),
        summarize_features(model.get("independentFeatures")),
    );
    summary.insert(
        "dependentFeatures".to_string(),
        summarize_features(model.get("dependentFeatures")),
    );
    Value::Object(summary)
}

fn summarize_features(features: Option<&Value>) -> Value {
    let Some(features) = features.and_then(Value::as_array) else {
        return Value::Array(Vec::new());
    };

    features
        .iter()
        .map(|feature| {
            let mut entry = Map::new();
            for key in ["key", "name", "featureType"] {
                entry.insert(
                    key.to_string(),
                    feature.get(key).cloned().unwrap_or(Value::Null),
                );
            }
            if let Some(description) = feature.get("description").filter(|d| !d.is_null()) {
                entry.insert("description".to_string(), description.clone());
            }
            Value::Object(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dataset_id_is_last_location_segment() {
        assert_eq!(
            dataset_id_from_location("https://api.jaqpot.org/v1/datasets/42"),
            Some("42".to_string())
        );
        assert_eq!(dataset_id_from_location("/v1/datasets/7/"), Some("7".to_string()));
    }

    #[test]
    fn pending_dataset_has_no_outcome() {
        assert!(dataset_outcome(&json!({"status": "EXECUTING"})).is_none());
        assert!(dataset_outcome(&json!({})).is_none());
    }

    #[test]
    fn failed_dataset_carries_reason() {
        let outcome = dataset_outcome(&json!({"status": "FAILURE", "failureReason": "bad input"}));
        assert_eq!(
            outcome,
            Some(Err(BackendError::PredictionFailure("bad input".to_string())))
        );
    }

    #[test]
    fn summary_keeps_feature_essentials() {
        let model = json!({
            "id": 3,
            "name": "solubility",
            "description": "LogS regression",
            "type": "SKLEARN_ONNX",
            "visibility": "PUBLIC",
            "independentFeatures": [
                {"key": "mw", "name": "Molecular weight", "featureType": "FLOAT", "id": 10}
            ],
            "dependentFeatures": [
                {"key": "logs", "name": "LogS", "featureType": "FLOAT", "description": "solubility"}
            ]
        });

        let summary = summarize_model(&model);
        assert_eq!(
            summary,
            json!({
                "modelId": 3,
                "name": "solubility",
                "description": "LogS regression",
                "type": "SKLEARN_ONNX",
                "independentFeatures": [
                    {"key": "mw", "name": "Molecular weight", "featureType": "FLOAT"}
                ],
                "dependentFeatures": [
                    {
                        "key": "logs",
                        "name": "LogS",
                        "featureType": "FLOAT",
                        "description": "solubility"
                    }
                ]
            })
        );
    }
}
