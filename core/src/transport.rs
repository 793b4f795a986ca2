//! The connection seam between `RequestExecutor` and the network.
//!
//! # Design
//! A `Transport` opens one `Connection` per request; nothing is shared
//! between calls. The connection exposes two response streams the way a
//! classic blocking HTTP connection does: the content stream, which fails
//! when the server answered with an error status, and the error stream,
//! which carries the diagnostic body of that failed exchange. The executor
//! holds every connection in a `ConnectionGuard`, so `close` runs on every
//! exit path.

use std::io::{self, Read};
use std::ops::{Deref, DerefMut};

use ureq::{Agent, AgentBuilder, Request, Response};

use crate::http::{HttpMethod, HttpRequest};

/// Status line of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub status_message: String,
}

impl ResponseHead {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Opens connections for prepared requests.
pub trait Transport {
    type Connection: Connection;

    /// Create a connection for `request`. Method, URL and headers are fixed
    /// here; no payload has been written yet.
    fn open(&self, request: &HttpRequest) -> io::Result<Self::Connection>;
}

/// One request/response exchange.
pub trait Connection {
    /// Write `payload` (if any) and wait for the response head.
    fn send(&mut self, payload: Option<&[u8]>) -> io::Result<ResponseHead>;

    /// Read the content stream. Fails when the status is an error status.
    fn read_body(&mut self) -> io::Result<Vec<u8>>;

    /// Read the error stream of a failed exchange.
    fn read_error_body(&mut self) -> io::Result<Vec<u8>>;

    /// Release the connection.
    fn close(&mut self);
}

/// Closes the wrapped connection when dropped.
#[derive(Debug)]
pub struct ConnectionGuard<C: Connection> {
    inner: C,
}

impl<C: Connection> ConnectionGuard<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Connection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Connection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent keeps no idle connections, so every request opens and closes
/// its own socket. 4xx/5xx responses come back from ureq as
/// `Error::Status` and are kept as data.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = AgentBuilder::new()
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .build();
        Self { agent }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    type Connection = UreqConnection;

    fn open(&self, request: &HttpRequest) -> io::Result<UreqConnection> {
        let mut pending = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            pending = pending.set(name, value);
        }
        Ok(UreqConnection {
            request: Some(pending),
            response: None,
        })
    }
}

/// A single ureq exchange. The request goes out on `send`.
///
/// `Content-Length` is never forwarded: ureq writes it from the payload it
/// is handed, the same count `RequestExecutor::prepare` declares.
pub struct UreqConnection {
    request: Option<Request>,
    response: Option<Response>,
}

impl UreqConnection {
    fn status(&self) -> io::Result<u16> {
        self.response
            .as_ref()
            .map(Response::status)
            .ok_or_else(not_connected)
    }

    fn read_stream(&mut self) -> io::Result<Vec<u8>> {
        let response = self.response.take().ok_or_else(not_connected)?;
        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Connection for UreqConnection {
    fn send(&mut self, payload: Option<&[u8]>) -> io::Result<ResponseHead> {
        let request = self
            .request
            .take()
            .ok_or_else(|| io::Error::other("request already sent"))?;

        let result = match payload {
            Some(bytes) => request.send_bytes(bytes),
            None => request.call(),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => return Err(io::Error::other(err)),
        };

        let head = ResponseHead {
            status: response.status(),
            status_message: response.status_text().to_string(),
        };
        self.response = Some(response);
        Ok(head)
    }

    fn read_body(&mut self) -> io::Result<Vec<u8>> {
        let status = self.status()?;
        if status >= 400 {
            return Err(io::Error::other(format!("server returned HTTP {status}")));
        }
        self.read_stream()
    }

    fn read_error_body(&mut self) -> io::Result<Vec<u8>> {
        let status = self.status()?;
        if status < 400 {
            return Err(io::Error::other(format!("no error stream for HTTP {status}")));
        }
        self.read_stream()
    }

    fn close(&mut self) {
        self.request = None;
        self.response = None;
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "no response received")
}
