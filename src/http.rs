//! HTTP helpers shared by the Jaqpot client.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::backend::BackendError;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    match transport_options {
        TransportOptions::Http { timeout, proxy } => {
            if let Some(t) = timeout {
                builder = builder.timeout(*t);
            }
            if let Some(proxy_url) = proxy {
                match reqwest::Proxy::all(proxy_url) {
                    Ok(p) => builder = builder.proxy(p),
                    Err(e) => tracing::warn!("Ignoring invalid proxy {}: {}", proxy_url, e),
                }
            }
        }
    }

    builder.build()
}

/// Extension trait for RequestBuilder that logs the request body.
pub trait RequestBuilderExt {
    /// Set JSON request body and log it. Returns the RequestBuilder for chaining.
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        if let Ok(req_body) = serde_json::to_string(json) {
            tracing::debug!("Jaqpot request body ({} bytes): {}", req_body.len(), req_body);
        }

        self.json(json)
    }
}

/// Extension trait for Response that logs the body and maps error statuses.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Parse a successful response as JSON, or turn an error status into
    /// [`BackendError::Api`]. Consumes the response.
    async fn json_checked(self) -> Result<Value, BackendError>;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn json_checked(self) -> Result<Value, BackendError> {
        let status = self.status();
        let bytes = self.bytes().await?;

        let text = String::from_utf8_lossy(&bytes);
        tracing::debug!("Jaqpot response {} ({} bytes): {}", status, bytes.len(), text);

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Build an API error from an error response body.
///
/// Jaqpot error bodies carry a `message` field, some gateways use `error`.
pub fn api_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));

    BackendError::Api {
        status: Some(status.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_message_field() {
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, r#"{"message":"rate limited"}"#);
        assert_eq!(
            err,
            BackendError::Api {
                status: Some(429),
                message: "rate limited".to_string()
            }
        );
    }

    #[test]
    fn client_builds_with_proxy() {
        let options = TransportOptions::new()
            .with_timeout(std::time::Duration::from_secs(3))
            .with_proxy("http://127.0.0.1:3128".to_string());
        assert!(build_http_client(&options).is_ok());
    }

    #[test]
    fn api_error_falls_back_to_status() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.detail(), "HTTP 502 Bad Gateway");
    }
}
