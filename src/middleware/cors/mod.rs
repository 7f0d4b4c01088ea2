mod builder;
mod config;
mod error;
mod policy;
mod reject;

pub use builder::CorsMiddlewareBuilder;
pub use config::CorsConfig;
pub use error::CorsConfigError;
pub use policy::{
    CorsAction, CorsDecision, CorsPolicy, RejectReason, ALLOW_CREDENTIALS, ALLOW_HEADERS,
    ALLOW_METHODS, ALLOW_ORIGIN, EXPOSE_HEADERS, MAX_AGE, ORIGIN, REQUEST_HEADERS,
    REQUEST_METHOD, VARY,
};
pub use reject::RejectBehavior;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::middleware::Middleware;

/// CORS (Cross-Origin Resource Sharing) middleware
///
/// Adapts a [`CorsPolicy`] to the dispatcher's `before`/`after` hooks:
///
/// | Decision             | `before`                         | `after`                        |
/// |----------------------|----------------------------------|--------------------------------|
/// | `Forward`            | proceed                          | `Vary: Origin`                 |
/// | `ForwardWithHeaders` | proceed                          | `Vary` + CORS headers          |
/// | `PreflightOk`        | answer 200, empty body           | `Vary` (already present)       |
/// | `Reject`             | answer per [`RejectBehavior`]    | `Vary` (already present)       |
///
/// The policy is immutable and shared, so one middleware instance serves any
/// number of concurrent requests.
///
/// # Usage
///
/// ```rust
/// use corsgate::middleware::{CorsConfig, CorsMiddleware};
///
/// let cors = CorsMiddleware::new(&CorsConfig {
///     origins: "https://example.com".to_string(),
///     credentials: true,
///     ..CorsConfig::default()
/// })
/// .expect("Invalid CORS configuration");
/// ```
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    policy: Arc<CorsPolicy>,
}

impl CorsMiddleware {
    /// Normalize `config` and build the middleware
    ///
    /// # Errors
    ///
    /// Any [`CorsConfigError`] from normalization; the middleware must not be
    /// installed in that case.
    pub fn new(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let policy = CorsPolicy::from_config(config)?;
        info!(
            origins = ?policy.origins(),
            any_origin = policy.allows_any_origin(),
            methods = %config.methods,
            credentials = config.credentials,
            validate_headers = config.validate_headers,
            on_reject = %config.on_reject,
            "CORS policy installed"
        );
        Ok(Self::from_policy(Arc::new(policy)))
    }

    /// Wrap an already normalized, shared policy
    #[must_use]
    pub fn from_policy(policy: Arc<CorsPolicy>) -> Self {
        Self { policy }
    }

    /// Create a permissive CORS middleware for development/testing
    ///
    /// Allows every origin, `GET, POST, PUT, DELETE, PATCH`, the
    /// `Content-Type` and `Authorization` headers, and skips preflight
    /// validation. **Do not use in production.**
    #[must_use]
    pub fn permissive() -> Self {
        Self::from_policy(Arc::new(CorsPolicy::permissive()))
    }

    #[must_use]
    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }
}

impl Middleware for CorsMiddleware {
    /// Answer preflights and refusals without reaching the handler
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        let decision = self.policy.evaluate(req);
        match &decision.action {
            CorsAction::Forward | CorsAction::ForwardWithHeaders => None,
            CorsAction::PreflightOk => {
                debug!(
                    request_id = %req.request_id,
                    origin = req.get_header(ORIGIN).unwrap_or(""),
                    requested_method = req.get_header(REQUEST_METHOD).unwrap_or(""),
                    "CORS preflight accepted"
                );
                let mut res = HandlerResponse::empty(200);
                decision.apply_to(&mut res);
                Some(res)
            }
            CorsAction::Reject(reason) => {
                warn!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    reason = %reason,
                    "CORS request rejected"
                );
                let mut res = self.policy.on_reject().response();
                decision.apply_to(&mut res);
                Some(res)
            }
        }
    }

    /// Decorate forwarded responses; every response varies on `Origin`
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        let decision = self.policy.evaluate(req);
        if decision.action.forwards() {
            decision.apply_to(res);
        } else {
            res.add_vary(ORIGIN);
        }
    }
}
