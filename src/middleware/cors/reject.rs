use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::dispatcher::HandlerResponse;

/// What the middleware answers when it refuses a request
///
/// A refused request is never forwarded and never receives CORS headers.
/// `Passthrough` leaves the response at the host default (an empty 200);
/// `Status` answers with an explicit error status such as 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectBehavior {
    #[default]
    Passthrough,
    Status(u16),
}

impl RejectBehavior {
    /// Build the bare response for a refused request
    #[must_use]
    pub fn response(&self) -> HandlerResponse {
        match self {
            RejectBehavior::Passthrough => HandlerResponse::empty(200),
            RejectBehavior::Status(status) => HandlerResponse::empty(*status),
        }
    }
}

impl fmt::Display for RejectBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectBehavior::Passthrough => f.write_str("passthrough"),
            RejectBehavior::Status(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for RejectBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("passthrough") {
            return Ok(RejectBehavior::Passthrough);
        }
        s.parse::<u16>()
            .map(RejectBehavior::Status)
            .map_err(|_| format!("expected \"passthrough\" or an HTTP status, got '{}'", s))
    }
}

impl Serialize for RejectBehavior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RejectBehavior::Passthrough => serializer.serialize_str("passthrough"),
            RejectBehavior::Status(status) => serializer.serialize_u16(*status),
        }
    }
}

impl<'de> Deserialize<'de> for RejectBehavior {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Status(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Status(status) => Ok(RejectBehavior::Status(status)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}
