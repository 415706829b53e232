//! Upstream response inspection.
//!
//! JSON-RPC nodes often answer `200 OK` with an `error` object in the body.
//! The inspector looks inside the body and reports such responses to the
//! client as `429 Too Many Requests` so callers treat them as retryable.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use flate2::read::{DeflateDecoder, MultiGzDecoder};
use serde_json::Value;
use std::io::Read;
use thiserror::Error;

use crate::load_balancer::Node;

/// Status sent to the client when an error signature is found.
pub const ERROR_SIGNATURE_STATUS: StatusCode = StatusCode::TOO_MANY_REQUESTS;

/// Failure to decode a compressed body.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to decode {encoding} body: {source}")]
    Decode {
        encoding: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of inspecting one response.
#[derive(Debug, Clone)]
pub struct InspectionDecision {
    /// Body exactly as received from the node.
    pub raw: Bytes,
    /// Body after content decoding (equal to `raw` when not encoded).
    pub decoded: Bytes,
    /// Replacement status, set only when an error signature was found.
    pub override_status: Option<StatusCode>,
}

impl InspectionDecision {
    pub fn final_status(&self, upstream: StatusCode) -> StatusCode {
        self.override_status.unwrap_or(upstream)
    }
}

/// Decode `raw` according to a `Content-Encoding` value.
///
/// Every member of a multi-member gzip body is decoded. A gzip stream whose
/// first header cannot be parsed is treated as not encoded. Any failure
/// after that, and any deflate failure, is an error.
pub fn decode_body(encoding: Option<&str>, raw: &Bytes) -> Result<Bytes, InspectError> {
    match encoding.map(str::trim) {
        Some(e) if e.eq_ignore_ascii_case("gzip") => {
            let mut decoder = MultiGzDecoder::new(raw.as_ref());
            if decoder.header().is_none() {
                return Ok(raw.clone());
            }
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|source| InspectError::Decode {
                    encoding: "gzip",
                    source,
                })?;
            Ok(out.into())
        }
        Some(e) if e.eq_ignore_ascii_case("deflate") => {
            let mut out = Vec::new();
            DeflateDecoder::new(raw.as_ref())
                .read_to_end(&mut out)
                .map_err(|source| InspectError::Decode {
                    encoding: "deflate",
                    source,
                })?;
            Ok(out.into())
        }
        _ => Ok(raw.clone()),
    }
}

/// Find the first field named `error` at any depth.
pub fn find_error(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => map
            .get("error")
            .or_else(|| map.values().find_map(find_error)),
        Value::Array(items) => items.iter().find_map(find_error),
        _ => None,
    }
}

/// Decode and inspect a buffered response body from `node`.
///
/// Only a decode failure is returned as an error; unparsable JSON is logged
/// and yields a decision without an override.
pub fn inspect(
    node: &Node,
    headers: &HeaderMap,
    raw: Bytes,
) -> Result<InspectionDecision, InspectError> {
    let encoding = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok());
    let decoded = decode_body(encoding, &raw)?;

    let override_status = match serde_json::from_slice::<Value>(&decoded) {
        Ok(doc) => find_error(&doc).map(|error| {
            tracing::warn!(node = %node.url(), content = %error, "detect error from node");
            ERROR_SIGNATURE_STATUS
        }),
        Err(e) => {
            tracing::warn!(node = %node.url(), error = %e, "parse response from node failed");
            None
        }
    };

    Ok(InspectionDecision {
        raw,
        decoded,
        override_status,
    })
}

/// Run the full inspection pipeline and build the client response.
///
/// The node's counters are updated exactly once, using the final status.
pub fn respond(node: &Node, status: StatusCode, mut headers: HeaderMap, raw: Bytes) -> Response {
    let final_status = match inspect(node, &headers, raw.clone()) {
        Ok(decision) => decision.final_status(status),
        Err(e) => {
            tracing::warn!(node = %node.url(), error = %e, "decode response from node failed");
            status
        }
    };
    node.record(final_status);

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(raw.len()));
    let mut response = Response::new(Body::from(raw));
    *response.status_mut() = final_status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder};
    use flate2::Compression;
    use serde_json::json;
    use std::io::Write;
    use url::Url;

    fn node() -> Node {
        Node::with_client(
            Url::parse("http://127.0.0.1:8545").unwrap(),
            reqwest::Client::new(),
        )
    }

    fn gzip(data: &[u8]) -> Bytes {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap().into()
    }

    fn deflate(data: &[u8]) -> Bytes {
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap().into()
    }

    fn encoded(encoding: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_str(encoding).unwrap());
        headers
    }

    async fn body_of(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[test]
    fn test_find_error_nested() {
        let doc = json!({"jsonrpc": "2.0", "result": [{"ok": 1}, {"inner": {"error": "boom"}}]});
        assert_eq!(find_error(&doc), Some(&json!("boom")));

        let doc = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32005}});
        assert_eq!(find_error(&doc), Some(&json!({"code": -32005})));

        let doc = json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"});
        assert_eq!(find_error(&doc), None);

        let doc = json!([{"id": 1, "result": "0x1"}, {"id": 2, "error": null}]);
        assert_eq!(find_error(&doc), Some(&Value::Null));
    }

    #[test]
    fn test_decode_plain_and_unknown() {
        let raw = Bytes::from_static(b"{}");
        assert_eq!(decode_body(None, &raw).unwrap(), raw);
        assert_eq!(decode_body(Some("br"), &raw).unwrap(), raw);
    }

    #[test]
    fn test_decode_gzip_and_deflate() {
        let body = br#"{"result":"0x1"}"#;
        assert_eq!(decode_body(Some("gzip"), &gzip(body)).unwrap(), &body[..]);
        assert_eq!(decode_body(Some("deflate"), &deflate(body)).unwrap(), &body[..]);
    }

    #[test]
    fn test_decode_gzip_all_members() {
        let mut raw = gzip(br#"{"jsonrpc":"2.0","#).to_vec();
        raw.extend_from_slice(&gzip(br#""error":"x"}"#));
        let raw = Bytes::from(raw);

        let decoded = decode_body(Some("gzip"), &raw).unwrap();
        assert_eq!(decoded, &br#"{"jsonrpc":"2.0","error":"x"}"#[..]);

        let decision = inspect(&node(), &encoded("gzip"), raw).unwrap();
        assert_eq!(decision.override_status, Some(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_decode_gzip_bad_header_is_noop() {
        let raw = Bytes::from_static(br#"{"error":"plain"}"#);
        assert_eq!(decode_body(Some("gzip"), &raw).unwrap(), raw);
    }

    #[test]
    fn test_decode_deflate_failure_is_error() {
        let raw = Bytes::from_static(b"not deflate at all");
        let err = decode_body(Some("deflate"), &raw).unwrap_err();
        assert!(err.to_string().starts_with("failed to decode deflate body"));
    }

    #[test]
    fn test_inspect_overrides_on_error() {
        let n = node();
        let raw = gzip(br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"limit"}}"#);
        let decision = inspect(&n, &encoded("gzip"), raw.clone()).unwrap();
        assert_eq!(decision.override_status, Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(decision.raw, raw);
        assert_ne!(decision.decoded, raw);
        assert_eq!(decision.final_status(StatusCode::OK), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_inspect_invalid_json_keeps_status() {
        let n = node();
        let decision = inspect(&n, &HeaderMap::new(), Bytes::from_static(b"<html>")).unwrap();
        assert_eq!(decision.override_status, None);
        assert_eq!(decision.final_status(StatusCode::BAD_GATEWAY), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_respond_error_signature() {
        let n = node();
        let raw = Bytes::from_static(br#"{"jsonrpc":"2.0","id":1,"error":"rate limited"}"#);
        let response = respond(&n, StatusCode::OK, HeaderMap::new(), raw.clone());

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            raw.len().to_string().as_str()
        );
        assert_eq!(body_of(response).await, raw);

        let snap = n.snapshot();
        assert_eq!((snap.calls, snap.calls_2xx, snap.calls_4xx), (1, 0, 1));
    }

    #[tokio::test]
    async fn test_respond_passthrough() {
        let n = node();
        let raw = Bytes::from_static(br#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#);
        let response = respond(&n, StatusCode::OK, HeaderMap::new(), raw.clone());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, raw);

        let response = respond(&n, StatusCode::SERVICE_UNAVAILABLE, HeaderMap::new(), Bytes::new());
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let snap = n.snapshot();
        assert_eq!((snap.calls, snap.calls_2xx, snap.calls_5xx), (2, 1, 1));
    }

    #[tokio::test]
    async fn test_respond_keeps_encoded_bytes() {
        let n = node();
        let raw = gzip(br#"{"error":"x"}"#);
        let response = respond(&n, StatusCode::OK, encoded("gzip"), raw.clone());
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
        assert_eq!(body_of(response).await, raw);
    }

    #[tokio::test]
    async fn test_respond_deflate_failure_forwards_unmodified() {
        let n = node();
        let raw = Bytes::from_static(b"not deflate at all");
        let response = respond(&n, StatusCode::OK, encoded("deflate"), raw.clone());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, raw);
        assert_eq!(n.snapshot().calls_2xx, 1);
    }
}
