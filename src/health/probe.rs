//! Live `eth_syncing` probe of the single upstream node.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Deadline for the whole probe call.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const PROBE_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"method":"eth_syncing"}"#;
const JSON_CONTENT_TYPE: &str = "application/json;charset=utf8";

/// Result of one probe, already mapped to what the caller sees.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Node reports it is fully synced.
    Healthy,
    /// Node reports it is still syncing.
    Syncing,
    /// The call could not be completed.
    Unreachable(String),
    /// The answer could not be read or was not a JSON object.
    Undecodable(String),
    /// `result` was not a boolean. Carries the raw upstream body.
    Unexpected(Bytes),
}

impl ProbeOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ProbeOutcome::Healthy => StatusCode::OK,
            ProbeOutcome::Syncing | ProbeOutcome::Undecodable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProbeOutcome::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProbeOutcome::Unexpected(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Interpret a complete upstream body.
    pub fn from_body(body: Bytes) -> Self {
        // arbitrary_precision keeps large numbers as their original text
        let doc: Map<String, Value> = match serde_json::from_slice(&body) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(error = %e, "decode health check response error");
                return ProbeOutcome::Undecodable(e.to_string());
            }
        };

        match doc.get("result") {
            Some(Value::Bool(false)) => ProbeOutcome::Healthy,
            Some(Value::Bool(true)) => {
                tracing::error!(result = true, "unexpected health check result");
                ProbeOutcome::Syncing
            }
            other => {
                let result = other.cloned().unwrap_or(Value::Null);
                tracing::info!(result = %result, "health check result");
                ProbeOutcome::Unexpected(body)
            }
        }
    }
}

impl IntoResponse for ProbeOutcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ProbeOutcome::Unexpected(body) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
                Body::from(body),
            )
                .into_response(),
            _ => status.into_response(),
        }
    }
}

/// Probe bound to one upstream.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    target: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(target: Url) -> Self {
        Self::with_timeout(target, PROBE_TIMEOUT)
    }

    pub fn with_timeout(target: Url, timeout: Duration) -> Self {
        Self {
            target,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Run one probe.
    pub async fn check(&self) -> ProbeOutcome {
        let response = self
            .client
            .post(self.target.clone())
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(PROBE_BODY)
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(node = %self.target, error = %e, "health check request error");
                return ProbeOutcome::Unreachable(e.to_string());
            }
        };

        match response.bytes().await {
            Ok(body) => ProbeOutcome::from_body(body),
            Err(e) => {
                tracing::error!(node = %self.target, error = %e, "read health check response error");
                ProbeOutcome::Undecodable(e.to_string())
            }
        }
    }
}
