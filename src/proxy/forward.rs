//! Forwarding transport.
//!
//! # Responsibilities
//! - Rewrite the inbound URI onto the node's URL
//! - Filter headers (hop-by-hop, `Host`, `X-Forwarded-For`)
//! - Send through the node's client and buffer the answer
//! - Hand the buffered response to the inspector

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request, Uri};
use axum::response::Response;
use thiserror::Error;
use url::Url;

use crate::load_balancer::Node;
use crate::proxy::inspector;

/// Errors that turn into `502 Bad Gateway` for the client.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read client request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to read upstream response body: {0}")]
    ResponseBody(#[source] reqwest::Error),
}

/// Headers that only apply to a single connection.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Join the node URL with the request path and query.
///
/// Paths are joined with a single slash and one trailing slash is removed
/// from the result. Query strings from both sides are kept.
pub fn upstream_url(target: &Url, uri: &Uri) -> Url {
    let base = target.path();
    let path = uri.path();
    let joined = match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    };

    let mut url = target.clone();
    url.set_path(joined.strip_suffix('/').unwrap_or(&joined));

    let query = match (target.query().unwrap_or(""), uri.query().unwrap_or("")) {
        ("", "") => None,
        (t, "") => Some(t.to_string()),
        ("", r) => Some(r.to_string()),
        (t, r) => Some(format!("{}&{}", t, r)),
    };
    url.set_query(query.as_deref());
    url
}

/// Copy headers that may cross the proxy.
pub fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    // Headers named in `Connection` are hop-by-hop too.
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || listed.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Forward `request` to `node` and build the inspected client response.
pub async fn forward(node: &Node, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let url = upstream_url(node.url(), &parts.uri);

    let mut headers = filter_headers(&parts.headers);
    headers.remove(header::HOST);
    headers.remove("x-forwarded-for");

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(ProxyError::RequestBody)?;

    tracing::debug!(node = %node.url(), method = %parts.method, url = %url, "forwarding request");

    let upstream = node
        .client()
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(ProxyError::Upstream)?;

    let status = upstream.status();
    let headers = filter_headers(upstream.headers());
    let raw = match upstream.bytes().await {
        Ok(raw) => raw,
        Err(e) => {
            node.record(status);
            return Err(ProxyError::ResponseBody(e));
        }
    };

    Ok(inspector::respond(node, status, headers, raw))
}
