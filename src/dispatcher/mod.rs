//! # Dispatcher Module
//!
//! Runs a request through the middleware chain and, unless a middleware
//! answers early, forwards it to the inner handler.
//!
//! ## Request Flow
//!
//! 1. Every middleware `before` hook sees the request
//! 2. The first early response (e.g. a CORS preflight answer) wins and the
//!    inner handler is never invoked
//! 3. Otherwise the inner handler produces the response
//! 4. Every middleware `after` hook may decorate the final response
//!
//! ```rust
//! use std::sync::Arc;
//! use corsgate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec};
//! use http::Method;
//!
//! let handler = |_req: &HandlerRequest| HandlerResponse::json(200, serde_json::json!({"ok": true}));
//! let dispatcher = Dispatcher::new(Arc::new(handler));
//! let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/", HeaderVec::new()));
//! assert_eq!(resp.status, 200);
//! ```

mod core;

pub use self::core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
