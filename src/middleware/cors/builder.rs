use std::time::Duration;

use http::Method;

use super::{CorsConfig, CorsConfigError, CorsMiddleware, RejectBehavior};

/// Builder for creating `CorsMiddleware` with a fluent API
///
/// Every setter writes into a [`CorsConfig`], so the builder and a YAML file
/// go through the same normalization in `build()`.
///
/// # Example
///
/// ```rust
/// use corsgate::middleware::CorsMiddlewareBuilder;
/// use http::Method;
/// use std::time::Duration;
///
/// let cors = CorsMiddlewareBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_methods(&[Method::GET, Method::POST, Method::PUT])
///     .allowed_headers(&["Content-Type", "Authorization", "X-Custom-Header"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count", "X-Page-Number"])
///     .max_age(Duration::from_secs(3600))
///     .build()
///     .expect("Invalid CORS configuration");
/// assert!(!cors.policy().allows_any_origin());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorsMiddlewareBuilder {
    config: CorsConfig,
}

impl CorsMiddlewareBuilder {
    /// Create a builder starting from [`CorsConfig::default()`]
    ///
    /// No origins are allowed until [`allowed_origins`](Self::allowed_origins)
    /// or [`any_origin`](Self::any_origin) is called; `build()` fails otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing raw configuration
    #[must_use]
    pub fn from_config(config: CorsConfig) -> Self {
        Self { config }
    }

    /// Set allowed origins (exact, case-sensitive matches)
    #[must_use]
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.config.origins = origins.join(", ");
        self
    }

    /// Allow every origin (`"*"`)
    ///
    /// With credentials enabled the concrete request origin is echoed instead
    /// of `*`.
    #[must_use]
    pub fn any_origin(mut self) -> Self {
        self.config.origins = "*".to_string();
        self
    }

    /// Set allowed HTTP methods
    #[must_use]
    pub fn allowed_methods(mut self, methods: &[Method]) -> Self {
        self.config.methods = methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        self
    }

    /// Set allowed request headers
    ///
    /// The casing given here is what `Access-Control-Allow-Headers` shows;
    /// matching is case-insensitive.
    #[must_use]
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        self.config.request_headers = headers.join(", ");
        self
    }

    /// Enable or disable credentials
    #[must_use]
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.config.credentials = allow;
        self
    }

    /// Set headers to expose to JavaScript on simple requests
    #[must_use]
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.config.exposed_headers = headers.join(", ");
        self
    }

    /// Set preflight cache duration; `Duration::ZERO` omits the header
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.config.max_age = max_age;
        self
    }

    /// Check preflight method and headers against the allowed lists
    #[must_use]
    pub fn validate_headers(mut self, validate: bool) -> Self {
        self.config.validate_headers = validate;
        self
    }

    /// Choose the response for refused requests
    #[must_use]
    pub fn on_reject(mut self, behavior: RejectBehavior) -> Self {
        self.config.on_reject = behavior;
        self
    }

    /// Build the CORS middleware
    ///
    /// # Errors
    ///
    /// Returns `CorsConfigError::EmptyOrigins` when no origin was configured,
    /// and `CorsConfigError::InvalidRejectStatus` for a non-error reject status.
    pub fn build(self) -> Result<CorsMiddleware, CorsConfigError> {
        CorsMiddleware::new(&self.config)
    }
}
