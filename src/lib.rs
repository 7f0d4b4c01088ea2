//! # corsgate
//!
//! **corsgate** is a Cross-Origin Resource Sharing (CORS) middleware. For every
//! request it decides whether to honor it, which `Access-Control-*` headers
//! to emit, and whether the request reaches the inner handler or is answered
//! on the spot (preflight).
//!
//! ## Architecture
//!
//! - **[`middleware`]** - the CORS policy, its decision engine, and the
//!   `Middleware` adapter (plus a request-logging middleware)
//! - **[`dispatcher`]** - request/response types and the middleware chain
//!   around an inner handler
//! - **[`config`]** - YAML configuration and `CORSGATE_*` environment overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `corsgate` command for inspecting a policy
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Dispatcher
//!     participant Cors as CorsMiddleware
//!     participant Handler as Inner Handler
//!
//!     Client->>Dispatcher: Request (Origin, Access-Control-Request-*)
//!     Dispatcher->>Cors: before()
//!     alt No Origin
//!         Cors-->>Dispatcher: proceed
//!         Dispatcher->>Handler: handle()
//!     else Origin not allowed / invalid preflight
//!         Cors-->>Client: reject response (Vary only)
//!     else Valid preflight
//!         Cors-->>Client: 200, Allow-Methods/Headers/Max-Age/Origin
//!     else Valid simple request
//!         Cors-->>Dispatcher: proceed
//!         Dispatcher->>Handler: handle()
//!     end
//!     Dispatcher->>Cors: after() adds Vary and CORS headers
//!     Dispatcher-->>Client: Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use corsgate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec};
//! use corsgate::middleware::{CorsConfig, CorsMiddleware};
//! use http::Method;
//!
//! let cors = CorsMiddleware::new(&CorsConfig {
//!     origins: "http://a.com".to_string(),
//!     methods: "GET, POST".to_string(),
//!     credentials: true,
//!     ..CorsConfig::default()
//! })
//! .expect("valid CORS config");
//!
//! let handler = |_req: &HandlerRequest| HandlerResponse::json(200, serde_json::json!({"ok": true}));
//! let mut dispatcher = Dispatcher::new(Arc::new(handler));
//! dispatcher.add_middleware(Arc::new(cors));
//!
//! let mut headers = HeaderVec::new();
//! headers.push((Arc::from("Origin"), "http://a.com".to_string()));
//! let resp = dispatcher.dispatch(&HandlerRequest::new(Method::GET, "/", headers));
//!
//! assert_eq!(resp.get_header("Access-Control-Allow-Origin"), Some("http://a.com"));
//! assert_eq!(resp.get_header("Access-Control-Allow-Credentials"), Some("true"));
//! ```
//!
//! ## Matching Rules
//!
//! - Origins and methods match exactly and case-sensitively
//! - Request header names match case-insensitively
//! - `origins: "*"` matches any origin; with credentials the concrete origin
//!   is echoed instead of `*`
//! - Refused requests are never forwarded and get no CORS headers; the
//!   response they receive is chosen by [`middleware::RejectBehavior`]

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;

pub use config::{AppConfig, ConfigLoadError};
pub use middleware::{
    CorsAction, CorsConfig, CorsConfigError, CorsDecision, CorsMiddleware, CorsPolicy,
    RejectBehavior,
};
