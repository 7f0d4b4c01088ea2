//! Dispatcher core - the per-request path from middleware chain to inner handler.
//!
//! Headers live in a `SmallVec` so typical requests never touch the heap
//! for header storage.

use crate::ids::RequestId;
use crate::middleware::Middleware;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the request path
///
/// Header names use `Arc<str>` because they repeat across requests and
/// `Arc::clone()` is an atomic increment rather than a string copy.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data seen by middleware and the inner handler
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for log correlation
    pub request_id: RequestId,
    /// HTTP method (GET, OPTIONS, etc.)
    pub method: Method,
    /// Request path
    pub path: String,
    /// HTTP headers in arrival order
    pub headers: HeaderVec,
}

impl HandlerRequest {
    /// Build a request, reusing an upstream `X-Request-Id` when present.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderVec) -> Self {
        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("x-request-id"))
                .map(|(_, v)| v.as_str()),
        );
        Self {
            request_id,
            method,
            path: path.into(),
            headers,
        }
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    ///
    /// Returns the first occurrence when a header is repeated.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by the inner handler or by a short-circuiting middleware
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 403, 500, etc.)
    pub status: u16,
    /// HTTP response headers in emission order
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderVec,
    /// Response body as JSON; `Value::Null` means an empty body
    pub body: Value,
}

fn serialize_headers<S: serde::Serializer>(
    headers: &HeaderVec,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(headers.len()))?;
    for (name, value) in headers {
        seq.serialize_element(&(name.as_ref(), value.as_str()))?;
    }
    seq.end()
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a header-less response with an empty body
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    /// Create a JSON response with a content-type header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("Content-Type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in emission order
    #[must_use]
    pub fn get_header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Add a header without touching existing values of the same name
    pub fn append_header(&mut self, name: &str, value: String) {
        self.headers.push((Arc::from(name), value));
    }

    /// Merge a token into `Vary`, leaving any existing tokens in place.
    ///
    /// A token already present (case-insensitive, in any `Vary` line) is not
    /// added twice, so calling this from more than one hook is harmless.
    pub fn add_vary(&mut self, token: &str) {
        let present = self.get_header_all("vary").any(|line| {
            line.split(',')
                .any(|t| t.trim() == "*" || t.trim().eq_ignore_ascii_case(token))
        });
        if !present {
            self.append_header("Vary", token.to_string());
        }
    }
}

/// The inner request handler a dispatcher forwards to
pub trait Handler: Send + Sync {
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse;
}

impl<F> Handler for F
where
    F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync,
{
    fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        self(req)
    }
}

/// Runs an ordered middleware chain around one inner handler
///
/// `before` hooks run in order until one returns an early response; later
/// hooks and the handler are then skipped. Every `after` hook runs on the
/// final response, whether it came from the handler or from a middleware.
#[derive(Clone)]
pub struct Dispatcher {
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Dispatcher {
    /// Create a dispatcher with no middleware in front of `handler`
    #[must_use]
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            middlewares: Vec::new(),
            handler,
        }
    }

    /// Add middleware to the processing pipeline
    ///
    /// Middleware is executed in the order it's added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Dispatch one request through the chain
    #[must_use]
    pub fn dispatch(&self, request: &HandlerRequest) -> HandlerResponse {
        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            early_resp = mw.before(request);
            if early_resp.is_some() {
                debug!(
                    request_id = %request.request_id,
                    middleware_idx = idx,
                    middleware_name = std::any::type_name_of_val(mw.as_ref()),
                    "Middleware returned early response"
                );
                break;
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::from_millis(0)),
            None => {
                debug!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    "Request forwarded to handler"
                );
                let start = Instant::now();
                let r = self.handler.handle(request);
                (r, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(request, &mut resp, latency);
        }
        resp
    }
}
