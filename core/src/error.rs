//! Error types for request execution.
//!
//! # Design
//! A non-2xx status is not an error: it comes back as a normal
//! `HttpResponse` carrying the error-stream body. Only two things fail a
//! call: a target that does not parse as an absolute URL, and an I/O
//! failure that leaves no readable response (connect refused, DNS failure,
//! or both the content and error streams unreadable).

use thiserror::Error;

/// Errors returned by `RequestExecutor::execute`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target URL, with its query attached, is not a valid absolute URL.
    #[error("malformed target URL `{url}`: {source}")]
    MalformedTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The connection failed outside of a readable HTTP response.
    #[error("transport I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
