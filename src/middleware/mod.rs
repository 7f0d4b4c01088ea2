mod core;
mod cors;
mod tracing;

pub use self::core::Middleware;
pub use cors::{
    CorsAction, CorsConfig, CorsConfigError, CorsDecision, CorsMiddleware,
    CorsMiddlewareBuilder, CorsPolicy, RejectBehavior, RejectReason, ALLOW_CREDENTIALS,
    ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, EXPOSE_HEADERS, MAX_AGE, ORIGIN,
    REQUEST_HEADERS, REQUEST_METHOD, VARY,
};
pub use self::tracing::TracingMiddleware;
