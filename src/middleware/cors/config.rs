use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::RejectBehavior;

/// Raw CORS configuration, as written by an operator
///
/// Lists are comma-delimited strings (`"GET, POST"`). Nothing here is
/// validated; [`CorsPolicy::from_config`](super::CorsPolicy::from_config)
/// normalizes it once at startup.
///
/// # Defaults
///
/// - `origins`: empty (must be supplied; `"*"` allows every origin)
/// - `methods`: `"GET, PUT, POST, DELETE"`
/// - `request_headers`: `"Origin, Authorization, Content-Type"`
/// - `exposed_headers`: empty
/// - `max_age`: 60 seconds
/// - `credentials`: `false`
/// - `validate_headers`: `false`
/// - `on_reject`: `passthrough`
///
/// # YAML
///
/// ```yaml
/// origins: "https://app.example.com, https://admin.example.com"
/// methods: "GET, POST"
/// request_headers: "Content-Type, Authorization"
/// exposed_headers: "X-Total-Count"
/// max_age_secs: 600
/// credentials: true
/// validate_headers: true
/// on_reject: 403
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Comma-delimited allowed origins, or `"*"`
    pub origins: String,
    /// Comma-delimited allowed methods; also the `Access-Control-Allow-Methods` value
    pub methods: String,
    /// Comma-delimited allowed request headers; also the `Access-Control-Allow-Headers` value
    pub request_headers: String,
    /// Emitted verbatim as `Access-Control-Expose-Headers` on simple requests
    pub exposed_headers: String,
    /// How long browsers may cache a preflight answer; zero disables the header
    #[serde(rename = "max_age_secs", with = "duration_secs")]
    pub max_age: Duration,
    /// Allow cookies and `Authorization` on cross-origin requests
    pub credentials: bool,
    /// Check preflight method and headers against the allowed lists
    pub validate_headers: bool,
    /// Response for refused requests
    pub on_reject: RejectBehavior,
}

impl CorsConfig {
    /// `max_age` in whole seconds, rounded to the nearest second
    #[must_use]
    pub fn max_age_secs(&self) -> u64 {
        round_secs(&self.max_age)
    }
}

fn round_secs(value: &Duration) -> u64 {
    value.as_secs_f64().round() as u64
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: String::new(),
            methods: "GET, PUT, POST, DELETE".to_string(),
            request_headers: "Origin, Authorization, Content-Type".to_string(),
            exposed_headers: String::new(),
            max_age: Duration::from_secs(60),
            credentials: false,
            validate_headers: false,
            on_reject: RejectBehavior::Passthrough,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(super::round_secs(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
