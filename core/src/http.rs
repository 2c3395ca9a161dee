//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `QueryClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; the
//! `Transport` trait is the single seam where a caller plugs in real I/O.
//! Owned fields (`String`, `Vec`) keep the values FFI-friendly.

use crate::error::TransportError;

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request. The query API only accepts POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `QueryClient::build_*` methods; the body is already
/// form-encoded.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value, ignoring ASCII case in the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The status is carried for diagnostics only; parsing never rejects a
/// response based on it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one `HttpRequest` and hands back the raw response.
///
/// Timeouts, TLS and connection reuse belong to the implementation. Any
/// closure `Fn(HttpRequest) -> Result<HttpResponse, TransportError>` is a
/// transport, which keeps test doubles short.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}
