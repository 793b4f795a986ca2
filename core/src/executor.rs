//! Synchronous request execution.
//!
//! # Design
//! `RequestExecutor` splits a call the same way in every case:
//! `prepare` turns a `RequestSpec` into an `HttpRequest` without any I/O,
//! and `send` performs exactly one round-trip on a fresh connection. A
//! non-2xx status falls back to the error stream and still yields an
//! `HttpResponse`; only a malformed target or an I/O failure with no
//! readable response produces an error. The executor holds no mutable
//! state, so one instance can serve concurrent callers.

use tracing::{debug, trace};

use crate::config::ExecutorConfig;
use crate::error::TransportError;
use crate::http::{set_header, HttpMethod, HttpRequest, HttpResponse, RequestSpec};
use crate::query::build_target_url;
use crate::transport::{Connection, ConnectionGuard, Transport, UreqTransport};

/// Payload sent for a POST without a body. Some servers reject a POST that
/// carries no body at all.
const EMPTY_POST_PAYLOAD: &[u8] = b" ";

/// Executes HTTP requests synchronously over a `Transport`.
#[derive(Debug, Clone)]
pub struct RequestExecutor<T = UreqTransport> {
    config: ExecutorConfig,
    transport: T,
}

impl RequestExecutor<UreqTransport> {
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for RequestExecutor<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RequestExecutor<T> {
    pub fn with_transport(config: ExecutorConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the wire-level request for `spec`.
    ///
    /// Header precedence, lowest first: configured defaults, body headers,
    /// then the spec's custom headers. `Content-Length` always reflects the
    /// payload; a configured or custom value for it is ignored.
    pub fn prepare(&self, spec: &RequestSpec) -> Result<HttpRequest, TransportError> {
        let url = build_target_url(&spec.target_url, &spec.query)?;

        let mut headers = Vec::new();
        for (name, value) in &self.config.default_headers {
            if !is_content_length(name) {
                set_header(&mut headers, name, value);
            }
        }

        let body = match &spec.body {
            Some(body) => {
                let bytes = body.content.as_bytes().to_vec();
                if let Some(format) = body.format {
                    set_header(&mut headers, "Content-Type", format.mime());
                }
                set_header(&mut headers, "Charset", "utf-8");
                set_header(&mut headers, "Content-Length", &bytes.len().to_string());
                Some(bytes)
            }
            None if spec.method == HttpMethod::Post => {
                set_header(
                    &mut headers,
                    "Content-Length",
                    &EMPTY_POST_PAYLOAD.len().to_string(),
                );
                Some(EMPTY_POST_PAYLOAD.to_vec())
            }
            None => None,
        };

        for (name, value) in &spec.headers {
            if !is_content_length(name) {
                set_header(&mut headers, name, value);
            }
        }

        Ok(HttpRequest {
            method: spec.method,
            url,
            headers,
            body,
        })
    }

    /// Prepare and send `spec`, returning the response whatever its status.
    pub fn execute(&self, spec: &RequestSpec) -> Result<HttpResponse, TransportError> {
        let request = self.prepare(spec).inspect_err(|err| {
            if self.config.enable_debug_logging {
                debug!(method = %spec.method, url = %spec.target_url, error = %err, "request rejected");
            }
        })?;
        self.send(&request)
    }

    /// Send an already prepared request on a new connection.
    ///
    /// The connection is closed before this returns, on every path.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = self.exchange(request);
        match &result {
            Ok(response) => trace!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                "exchange complete"
            ),
            Err(err) if self.config.enable_debug_logging => debug!(
                method = %request.method,
                url = %request.url,
                error = %err,
                "exchange failed"
            ),
            Err(_) => {}
        }
        result
    }

    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut conn = ConnectionGuard::new(self.transport.open(request)?);
        let head = conn.send(request.body.as_deref())?;

        let bytes = match conn.read_body() {
            Ok(bytes) => bytes,
            Err(err) if !head.is_error() => return Err(err.into()),
            Err(err) => {
                let bytes = conn.read_error_body()?;
                if self.config.enable_debug_logging {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        status = head.status,
                        status_message = %head.status_message,
                        cause = %err,
                        error_stream = %String::from_utf8_lossy(&bytes),
                        "content stream unreadable, using error stream"
                    );
                }
                bytes
            }
        };
        drop(conn);

        Ok(HttpResponse {
            body: normalize_lines(&String::from_utf8_lossy(&bytes)),
            status: head.status,
            status_message: head.status_message,
        })
    }
}

fn is_content_length(name: &str) -> bool {
    name.eq_ignore_ascii_case("content-length")
}

/// Split `text` on `\n`, `\r\n` or a lone `\r` and rejoin the lines with
/// `\n`. A final line terminator does not start a new line.
pub fn normalize_lines(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            joined.push('\n');
        } else {
            joined.push(c);
        }
    }
    if joined.ends_with('\n') {
        joined.pop();
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MediaFormat;

    fn executor() -> RequestExecutor {
        RequestExecutor::new()
    }

    #[test]
    fn prepare_get_with_query() {
        let spec = RequestSpec::get("https://example.com/items").query("q", "a b");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://example.com/items?q=a+b");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn prepare_post_json_body() {
        let spec = RequestSpec::post("https://example.com/items").body(MediaFormat::Json, r#"{"x":1}"#);
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.url, "https://example.com/items");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Charset"), Some("utf-8"));
        assert_eq!(req.header("Content-Length"), Some("7"));
        assert_eq!(req.body.as_deref(), Some(&br#"{"x":1}"#[..]));
    }

    #[test]
    fn prepare_post_without_body_sends_single_space() {
        let req = executor().prepare(&RequestSpec::post("https://example.com/items")).unwrap();
        assert_eq!(req.body.as_deref(), Some(&b" "[..]));
        assert_eq!(req.header("Content-Length"), Some("1"));
        assert_eq!(req.header("Content-Type"), None);
        assert_eq!(req.header("Charset"), None);
    }

    #[test]
    fn prepare_bodyless_non_post_has_no_payload() {
        for spec in [
            RequestSpec::get("https://example.com/items"),
            RequestSpec::put("https://example.com/items"),
            RequestSpec::delete("https://example.com/items"),
        ] {
            let req = executor().prepare(&spec).unwrap();
            assert!(req.body.is_none(), "{}: unexpected payload", spec.method);
            assert_eq!(req.header("Content-Length"), None);
        }
    }

    #[test]
    fn content_length_counts_utf8_bytes() {
        let spec = RequestSpec::put("https://example.com/items").body(MediaFormat::Xml, "<a>é</a>");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.header("Content-Length"), Some("9"));
        assert_eq!(req.body.as_ref().map(Vec::len), Some(9));
    }

    #[test]
    fn empty_body_is_still_a_body() {
        let spec = RequestSpec::post("https://example.com/items").body(MediaFormat::Json, "");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.body.as_deref(), Some(&b""[..]));
        assert_eq!(req.header("Content-Length"), Some("0"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn custom_headers_override_content_type() {
        let spec = RequestSpec::post("https://example.com/items")
            .body(MediaFormat::Json, "{}")
            .header("content-type", "application/vnd.api+json");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.header("Content-Type"), Some("application/vnd.api+json"));
        let content_types = req
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .count();
        assert_eq!(content_types, 1);
    }

    #[test]
    fn custom_content_length_is_ignored() {
        let spec = RequestSpec::post("https://example.com/items")
            .body(MediaFormat::Json, r#"{"x":1}"#)
            .header("Content-Length", "5");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.header("Content-Length"), Some("7"));
        assert_eq!(req.body.as_ref().map(Vec::len), Some(7));

        let spec = RequestSpec::get("https://example.com/items").header("content-length", "5");
        let req = executor().prepare(&spec).unwrap();
        assert_eq!(req.header("Content-Length"), None);
    }

    #[test]
    fn configured_content_length_is_ignored() {
        let executor = RequestExecutor::with_config(
            ExecutorConfig::new().with_default_header("Content-Length", "99"),
        );
        let req = executor.prepare(&RequestSpec::delete("https://example.com/items")).unwrap();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn default_headers_have_lowest_precedence() {
        let config = ExecutorConfig::new()
            .with_default_header("Accept", "text/plain")
            .with_default_header("Content-Type", "text/plain");
        let executor = RequestExecutor::with_config(config);
        let spec = RequestSpec::post("https://example.com/items")
            .body(MediaFormat::Xml, "<a/>")
            .header("Accept", "application/xml");
        let req = executor.prepare(&spec).unwrap();
        assert_eq!(req.header("Accept"), Some("application/xml"));
        assert_eq!(req.header("Content-Type"), Some("application/xml"));
    }

    #[test]
    fn prepare_rejects_malformed_target() {
        let err = executor().prepare(&RequestSpec::get("example.com/items")).unwrap_err();
        assert!(matches!(err, TransportError::MalformedTarget { .. }));
    }

    #[test]
    fn execute_surfaces_malformed_target() {
        let err = executor().execute(&RequestSpec::delete("::not a url::")).unwrap_err();
        assert!(matches!(err, TransportError::MalformedTarget { .. }));
    }

    #[test]
    fn normalize_lines_joins_with_newline() {
        assert_eq!(normalize_lines("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn normalize_lines_drops_final_terminator_only() {
        assert_eq!(normalize_lines("a\n"), "a");
        assert_eq!(normalize_lines("a\n\n"), "a\n");
        assert_eq!(normalize_lines("a\r\n\r\nb\r\n"), "a\n\nb");
    }

    #[test]
    fn normalize_lines_empty_input() {
        assert_eq!(normalize_lines(""), "");
        assert_eq!(normalize_lines("\n"), "");
    }
}
