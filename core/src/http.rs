//! HTTP request and response types.
//!
//! # Design
//! A call moves through two shapes. `RequestSpec` is what the caller
//! describes: method, target, query parameters, an optional body with its
//! media format, and custom headers. `HttpRequest` is the prepared,
//! wire-level form produced by `RequestExecutor::prepare`: an absolute URL
//! with the encoded query attached, the final ordered header list, and the
//! exact payload bytes. Keeping the prepared form as plain data lets tests
//! inspect everything a transport will send without touching the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// The method name as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical content type of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Json,
    Jpeg,
    Png,
    Xml,
    FormUrlEncoded,
}

impl MediaFormat {
    /// MIME string sent in the `Content-Type` header.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaFormat::Json => "application/json",
            MediaFormat::Jpeg => "application/jpeg",
            MediaFormat::Png => "application/png",
            MediaFormat::Xml => "application/xml",
            MediaFormat::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A request body together with its declared media format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub format: Option<MediaFormat>,
    pub content: String,
}

/// Caller-side description of one request.
///
/// Query parameters and headers are kept in `BTreeMap`s so the encoded
/// query string and header order are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub target_url: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, target_url: impl Into<String>) -> Self {
        Self {
            method,
            target_url: target_url.into(),
            query: BTreeMap::new(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(target_url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, target_url)
    }

    pub fn post(target_url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, target_url)
    }

    pub fn put(target_url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, target_url)
    }

    pub fn delete(target_url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, target_url)
    }

    /// Add a query parameter. A repeated key replaces the earlier value.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, format: MediaFormat, content: impl Into<String>) -> Self {
        self.body = Some(RequestBody {
            format: Some(format),
            content: content.into(),
        });
        self
    }

    /// Add a custom header. Custom headers win over every default header,
    /// `Content-Type` included. `Content-Length` is the exception: it is
    /// always computed from the payload and a custom value is ignored.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A fully prepared HTTP request, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header value, ignoring the case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of one completed exchange.
///
/// A non-2xx status is still a response: `body` then holds the text of the
/// error stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub body: String,
    pub status: u16,
    pub status_message: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Set `name` to `value`, replacing an existing header of the same name
/// (case-insensitive) in place.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(entry) => *entry = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}
