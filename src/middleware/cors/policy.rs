use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde::Serialize;

use super::{CorsConfig, CorsConfigError, RejectBehavior};
use crate::dispatcher::{HandlerRequest, HandlerResponse, HeaderVec};

pub const VARY: &str = "Vary";
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const MAX_AGE: &str = "Access-Control-Max-Age";
pub const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

pub const ORIGIN: &str = "Origin";
pub const REQUEST_METHOD: &str = "Access-Control-Request-Method";
pub const REQUEST_HEADERS: &str = "Access-Control-Request-Headers";

/// Why a request was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum RejectReason {
    /// The `Origin` is not in the allowed list
    OriginNotAllowed(String),
    /// The preflight asked for a method outside the allowed list
    MethodNotAllowed(String),
    /// The preflight asked for a header outside the allowed list
    HeaderNotAllowed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OriginNotAllowed(o) => write!(f, "origin '{}' not allowed", o),
            RejectReason::MethodNotAllowed(m) => write!(f, "method '{}' not allowed", m),
            RejectReason::HeaderNotAllowed(h) => write!(f, "header '{}' not allowed", h),
        }
    }
}

/// Outcome of one CORS decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CorsAction {
    /// No `Origin`: not a CORS request, forward untouched
    Forward,
    /// Accepted simple request: forward and decorate the response
    ForwardWithHeaders,
    /// Accepted preflight: answer 200 with an empty body, never forward
    PreflightOk,
    /// Refused: never forward, add nothing beyond `Vary`
    Reject(RejectReason),
}

impl CorsAction {
    /// Whether the inner handler runs for this outcome
    #[must_use]
    pub fn forwards(&self) -> bool {
        matches!(self, CorsAction::Forward | CorsAction::ForwardWithHeaders)
    }
}

/// The action plus every header the action calls for, in emission order
///
/// `Vary: Origin` is always the first header.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    pub action: CorsAction,
    pub headers: HeaderVec,
}

impl CorsDecision {
    fn new(action: CorsAction) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from(VARY), ORIGIN.to_string()));
        Self { action, headers }
    }

    fn set(&mut self, name: &str, value: &str) {
        self.headers.push((Arc::from(name), value.to_string()));
    }

    /// Write the decision's headers onto a response
    ///
    /// `Vary` is merged with whatever the response already varies on; every
    /// other header replaces an existing value of the same name.
    pub fn apply_to(&self, res: &mut HandlerResponse) {
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(VARY) {
                res.add_vary(value);
            } else {
                res.set_header(name, value.clone());
            }
        }
    }
}

/// Normalized, immutable CORS policy
///
/// Built once from a [`CorsConfig`] and shared read-only across requests.
#[derive(Debug, Clone, Serialize)]
pub struct CorsPolicy {
    origins: Vec<String>,
    force_origin_match: bool,
    methods: Vec<String>,
    methods_raw: String,
    request_headers: Vec<String>,
    request_headers_raw: String,
    exposed_headers: Option<String>,
    max_age: Option<String>,
    allow_credentials: bool,
    credentials: &'static str,
    validate_headers: bool,
    on_reject: RejectBehavior,
}

/// Split a comma-delimited list into trimmed, non-empty tokens
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl CorsPolicy {
    /// Normalize a raw configuration
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::EmptyOrigins`] if `origins` holds no origin
    /// - [`CorsConfigError::InvalidRejectStatus`] if `on_reject` is a status outside 400..=599
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let origins = split_list(&config.origins);
        if origins.is_empty() {
            return Err(CorsConfigError::EmptyOrigins);
        }
        if let RejectBehavior::Status(status) = config.on_reject {
            if !(400..=599).contains(&status) {
                return Err(CorsConfigError::InvalidRejectStatus { status });
            }
        }

        Ok(Self::normalize(config, origins))
    }

    /// Build the policy from an already validated config
    fn normalize(config: &CorsConfig, origins: Vec<String>) -> Self {
        // A max-age that rounds to 0 drops the header.
        let max_age_secs = config.max_age_secs();

        Self {
            force_origin_match: config.origins.trim() == "*",
            origins,
            methods: split_list(&config.methods),
            methods_raw: config.methods.clone(),
            request_headers: split_list(&config.request_headers)
                .into_iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
            request_headers_raw: config.request_headers.clone(),
            exposed_headers: (!config.exposed_headers.is_empty())
                .then(|| config.exposed_headers.clone()),
            max_age: (max_age_secs != 0).then(|| max_age_secs.to_string()),
            allow_credentials: config.credentials,
            credentials: if config.credentials { "true" } else { "false" },
            validate_headers: config.validate_headers,
            on_reject: config.on_reject,
        }
    }

    /// Wildcard policy for development: common methods and headers, no
    /// preflight validation, 60 second max-age.
    #[must_use]
    pub fn permissive() -> Self {
        let config = CorsConfig {
            origins: "*".to_string(),
            methods: "GET, POST, PUT, DELETE, PATCH".to_string(),
            request_headers: "Content-Type, Authorization".to_string(),
            max_age: Duration::from_secs(60),
            ..CorsConfig::default()
        };
        Self::normalize(&config, split_list(&config.origins))
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.force_origin_match
    }

    #[must_use]
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Allowed request headers, lower-cased
    #[must_use]
    pub fn request_headers(&self) -> &[String] {
        &self.request_headers
    }

    /// Rendered `Access-Control-Max-Age` value, `None` when disabled
    #[must_use]
    pub fn max_age(&self) -> Option<&str> {
        self.max_age.as_deref()
    }

    #[must_use]
    pub fn on_reject(&self) -> RejectBehavior {
        self.on_reject
    }

    /// Exact, case-sensitive origin match; always true under `"*"`
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.force_origin_match || self.origins.iter().any(|o| o == origin)
    }

    /// Case-sensitive method match
    #[must_use]
    pub fn is_method_allowed(&self, method: &str) -> bool {
        !method.is_empty() && self.methods.iter().any(|m| m == method)
    }

    /// Check an `Access-Control-Request-Headers` value
    ///
    /// Tokens are trimmed and lower-cased; blank tokens are ignored, so an
    /// empty value asks for nothing and passes. Returns the first token that
    /// is not allowed.
    #[must_use]
    pub fn find_disallowed_header<'a>(&self, requested: &'a str) -> Option<&'a str> {
        requested
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .find(|h| {
                !self
                    .request_headers
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(h))
            })
    }

    /// Evaluate a request held by the dispatcher
    #[must_use]
    pub fn evaluate(&self, req: &HandlerRequest) -> CorsDecision {
        self.decide(
            &req.method,
            req.get_header(ORIGIN),
            req.get_header(REQUEST_METHOD),
            req.get_header(REQUEST_HEADERS),
        )
    }

    /// The CORS decision for one request
    ///
    /// Pure: the result depends only on the policy and the arguments.
    #[must_use]
    pub fn decide(
        &self,
        method: &Method,
        origin: Option<&str>,
        requested_method: Option<&str>,
        requested_headers: Option<&str>,
    ) -> CorsDecision {
        let origin = match origin.filter(|o| !o.is_empty()) {
            Some(o) => o,
            None => return CorsDecision::new(CorsAction::Forward),
        };

        if !self.is_origin_allowed(origin) {
            return CorsDecision::new(CorsAction::Reject(RejectReason::OriginNotAllowed(
                origin.to_string(),
            )));
        }

        // Preflight: OPTIONS carrying a non-empty Access-Control-Request-Method.
        let preflight_method = if *method == Method::OPTIONS {
            requested_method.filter(|m| !m.is_empty())
        } else {
            None
        };

        let mut decision = match preflight_method {
            Some(requested) => {
                if self.validate_headers {
                    if !self.is_method_allowed(requested) {
                        return CorsDecision::new(CorsAction::Reject(
                            RejectReason::MethodNotAllowed(requested.to_string()),
                        ));
                    }
                    if let Some(header) =
                        self.find_disallowed_header(requested_headers.unwrap_or(""))
                    {
                        return CorsDecision::new(CorsAction::Reject(
                            RejectReason::HeaderNotAllowed(header.to_string()),
                        ));
                    }
                }
                let mut d = CorsDecision::new(CorsAction::PreflightOk);
                d.set(ALLOW_METHODS, &self.methods_raw);
                d.set(ALLOW_HEADERS, &self.request_headers_raw);
                if let Some(age) = &self.max_age {
                    d.set(MAX_AGE, age);
                }
                d
            }
            None => {
                let mut d = CorsDecision::new(CorsAction::ForwardWithHeaders);
                if let Some(exposed) = &self.exposed_headers {
                    d.set(EXPOSE_HEADERS, exposed);
                }
                d
            }
        };

        // Credentialed responses must name the concrete origin, never "*".
        if self.allow_credentials {
            decision.set(ALLOW_CREDENTIALS, self.credentials);
            decision.set(ALLOW_ORIGIN, origin);
        } else if self.force_origin_match {
            decision.set(ALLOW_ORIGIN, "*");
        } else {
            decision.set(ALLOW_ORIGIN, origin);
        }

        decision
    }
}
