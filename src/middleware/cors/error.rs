use std::fmt;

/// CORS configuration error
///
/// Returned when a [`CorsConfig`](super::CorsConfig) cannot be normalized into
/// a policy. Any of these must stop the middleware from being installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// No allowed origins were configured
    ///
    /// CORS cannot run with zero origins. To disable CORS, leave the
    /// middleware out of the chain instead.
    EmptyOrigins,
    /// The on-reject status is not a client or server error code
    InvalidRejectStatus {
        /// The configured status
        status: u16,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::EmptyOrigins => {
                write!(
                    f,
                    "CORS configuration error: at least one allowed origin must be set. \
                    If CORS should not apply, remove the middleware instead."
                )
            }
            CorsConfigError::InvalidRejectStatus { status } => {
                write!(
                    f,
                    "CORS configuration error: on_reject status {} is not in 400..=599",
                    status
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
