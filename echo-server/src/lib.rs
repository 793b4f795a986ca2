//! Test server that reports back what it received.
//!
//! Routes:
//! - `/echo` (any method): the request as JSON (`Echo`).
//! - `/status/{code}` (any method): responds with `code` and a two-line
//!   diagnostic body.
//! - `/lines`: a body mixing `\r\n`, `\r` and `\n` line endings.
//! - `/strict` (POST): rejects an empty body with 411 Length Required.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Body of a CRLF/CR/LF mixed response served on `/lines`.
pub const MIXED_LINES: &str = "first\r\nsecond\rthird\n";

/// A received request, as reported by `/echo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased header names; repeated headers are joined with `, `.
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub body_len: usize,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/lines", get(lines))
        .route("/strict", post(strict))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: collected,
        body: String::from_utf8_lossy(&body).into_owned(),
        body_len: body.len(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (
            status,
            format!(
                "status {code}\r\n{}",
                status.canonical_reason().unwrap_or("unknown")
            ),
        ),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn lines() -> &'static str {
    MIXED_LINES
}

async fn strict(body: Bytes) -> (StatusCode, String) {
    if body.is_empty() {
        return (StatusCode::LENGTH_REQUIRED, "request body required".to_string());
    }
    (StatusCode::OK, format!("accepted {} bytes", body.len()))
}
