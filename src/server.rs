//! HTTP surface for the upload-authorization issuer.
//!
//! One endpoint: `POST /api/sign-upload`, body `{filename, contentType}`.
//! Outcomes:
//!
//! - `200` `{uploadUrl, publicUrl}` — credential minted.
//! - `400` `{error}` — malformed JSON, or missing fields named in the message.
//! - `405` `{error}` — any verb other than POST.
//! - `500` `{error, details?}` — missing storage credentials or a signing
//!   failure. Logged server-side; never a partial response.

use crate::config::Settings;
use crate::storage::{SignUploadResponse, UploadAuthorizer};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

/// Build the router. The settings are read per request, so a credential
/// pair added to the environment only takes effect on restart — matching
/// the one-process deployment model.
pub fn router(settings: Settings) -> Router {
    Router::new()
        .route(
            "/api/sign-upload",
            post(sign_upload).fallback(method_not_allowed),
        )
        .with_state(Arc::new(settings))
}

/// Serve the router until the process is stopped.
pub async fn serve(settings: Settings, addr: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "sign-upload endpoint listening");
    axum::serve(listener, router(settings)).await
}

async fn sign_upload(State(settings): State<Arc<Settings>>, body: Bytes) -> Response {
    // Parsed by hand so every failure shape shares the {error} envelope.
    let body: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("invalid JSON body: {e}"),
                    None,
                );
            }
        }
    };

    let filename = nonempty_str(&body, "filename");
    let content_type = nonempty_str(&body, "contentType");

    let (filename, content_type) = match (filename, content_type) {
        (Some(f), Some(c)) => (f, c),
        (f, c) => {
            let mut missing = Vec::new();
            if f.is_none() {
                missing.push("filename");
            }
            if c.is_none() {
                missing.push("contentType");
            }
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("missing required fields: {}", missing.join(", ")),
                None,
            );
        }
    };

    let creds = match settings.storage_credentials() {
        Ok(creds) => creds,
        Err(e) => {
            error!("sign-upload rejected: {e}");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error: missing storage credentials",
                None,
            );
        }
    };

    match UploadAuthorizer::new(creds).authorize(filename, content_type) {
        Ok(credential) => Json(SignUploadResponse {
            upload_url: credential.upload_url,
            public_url: credential.public_url,
        })
        .into_response(),
        Err(e) => {
            error!("failed to generate upload URL: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate upload URL",
                Some(&e.to_string()),
            )
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
}

fn nonempty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn error_response(status: StatusCode, message: &str, details: Option<&str>) -> Response {
    let mut body = json!({ "error": message });
    if let Some(details) = details {
        body["details"] = json!(details);
    }
    (status, Json(body)).into_response()
}
