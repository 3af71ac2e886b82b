//! Request correlation identifiers.
//!
//! Every decoded [`Request`](crate::server::Request) carries a [`RequestId`]. The dispatcher,
//! the `Log` middleware and the service's request span all record it, so one id ties together
//! the log lines of a single request. A client or proxy can supply its own id through the
//! [`REQUEST_ID_HEADER`]; anything that is not a ULID is replaced.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lower-case header name an incoming id is read from.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a valid ULID header value, otherwise mint a new id.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.trim().parse::<RequestId>().ok())
            .unwrap_or_default()
    }

    /// Id for a request whose header map uses lower-case names.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, String>) -> Self {
        Self::from_header_or_new(headers.get(REQUEST_ID_HEADER).map(String::as_str))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

// Logged as the 26-character ULID string.
impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_is_reused() {
        let id = RequestId::new();
        let reused = RequestId::from_header_or_new(Some(&format!(" {id} ")));
        assert_eq!(reused, id);
    }

    #[test]
    fn test_invalid_header_mints_new_id() {
        let a = RequestId::from_header_or_new(Some("not-a-ulid"));
        let b = RequestId::from_header_or_new(None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_headers() {
        let id = RequestId::new();
        let mut headers = HashMap::new();
        headers.insert(REQUEST_ID_HEADER.to_string(), id.to_string());
        assert_eq!(RequestId::from_headers(&headers), id);
        assert_ne!(RequestId::from_headers(&HashMap::new()), id);
    }

    #[test]
    fn test_serializes_as_string() {
        let id = RequestId::new();
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(id.to_string()));
    }
}
