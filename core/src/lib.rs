//! Small synchronous HTTP helper.
//!
//! # Overview
//! Sends one GET, POST, PUT or DELETE request per call with optional query
//! parameters, a body of a declared media format and custom headers, and
//! returns the response body text with its status code and status message.
//!
//! # Design
//! - `RequestExecutor::prepare` builds the wire-level `HttpRequest` as plain
//!   data; `send` performs the round-trip. `execute` does both.
//! - Non-2xx responses are returned, not raised. Their body is read from the
//!   error stream of the connection.
//! - The network sits behind the `Transport` / `Connection` traits. The
//!   default `UreqTransport` is blocking and opens a fresh connection per
//!   call; tests plug in scripted transports.
//! - No state survives a call: no pooling, no retries, no cache.

pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod query;
pub mod transport;

pub use config::ExecutorConfig;
pub use error::TransportError;
pub use executor::{normalize_lines, RequestExecutor};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MediaFormat, RequestBody, RequestSpec};
pub use query::{build_target_url, encode_query_parameters};
pub use transport::{Connection, ConnectionGuard, ResponseHead, Transport, UreqTransport};
