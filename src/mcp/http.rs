//! Hosted transport — JSON-RPC over HTTP POST.
//!
//! Same dispatcher, different framing: the bearer credential arrives in
//! the `Authorization` header per request. Authentication and
//! authorization failures are surfaced as HTTP 401/403 so "not logged
//! in" is never confused with a protocol-level error, which always
//! rides a 200 alongside its JSON-RPC error envelope.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use super::dispatch::Dispatcher;
use super::types::{codes, JsonRpcResponse};

/// Build the hosted router: a single `POST /mcp` endpoint.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/mcp", post(handle))
        .with_state(dispatcher)
}

/// Bind and serve until the process is terminated.
pub async fn serve(addr: &str, dispatcher: Arc<Dispatcher>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "MCP server listening over HTTP");
    axum::serve(listener, router(dispatcher)).await
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let bearer = bearer_token(&headers);
    match dispatcher.dispatch(bearer, &body).await {
        Some(response) => (status_for(&response), Json(response)).into_response(),
        // Notifications are accepted without a response body.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Extract the token from an `Authorization: Bearer …` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Map the domain error codes to their HTTP-equivalent statuses.
fn status_for(response: &JsonRpcResponse) -> StatusCode {
    match response.error_code() {
        Some(codes::AUTH_REQUIRED) => StatusCode::UNAUTHORIZED,
        Some(codes::UPGRADE_REQUIRED) => StatusCode::FORBIDDEN,
        _ => StatusCode::OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer tok_live".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("tok_live"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn auth_and_upgrade_map_to_distinct_http_statuses() {
        let auth = JsonRpcResponse::error(
            Value::Null,
            codes::AUTH_REQUIRED,
            "Authentication required".to_string(),
        );
        let upgrade = JsonRpcResponse::error(
            Value::Null,
            codes::UPGRADE_REQUIRED,
            "Upgrade required".to_string(),
        );
        let protocol = JsonRpcResponse::error(
            Value::Null,
            codes::METHOD_NOT_FOUND,
            "Method not found".to_string(),
        );
        let ok = JsonRpcResponse::success(Value::Null, json!({}));

        assert_eq!(status_for(&auth), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&upgrade), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&protocol), StatusCode::OK);
        assert_eq!(status_for(&ok), StatusCode::OK);
    }
}
