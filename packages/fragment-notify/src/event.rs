//! Response events fired by the fragment-swap library.
//!
//! A [`ResponseEvent`] describes the outcome of one asynchronous content
//! fetch. Its payload (`detail`) is owned by the library that fired it and is
//! treated as untrusted: the only thing read from it is an integer status
//! code, located through a list of JSON pointers.
//!
//! ```ignore
//! use fragment_notify::ResponseEvent;
//! use serde_json::json;
//!
//! let event = ResponseEvent::new("htmx:responseError", json!({ "xhr": { "status": 404 } }));
//! assert_eq!(event.status_code(&["/xhr/status"]), Some(404));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Largest value accepted as an HTTP status.
const MAX_STATUS: u64 = 999;

/// Correlation ID tying an event back to the request that produced it.
///
/// Use `CorrelationId::NONE` when the host has no request identity to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Sentinel for uncorrelated events (nil UUID).
    pub const NONE: Self = Self(Uuid::nil());

    /// Create a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Check if this is the NONE sentinel value.
    pub fn is_none(&self) -> bool {
        self.0.is_nil()
    }

    /// Get a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the request that triggered an event.
///
/// The matching policy never looks at this. The path is only used to fill
/// the `{path}` placeholder of a message template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
    pub path: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Outcome of one asynchronous fragment fetch, as dispatched on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    /// Dispatched event name, e.g. `htmx:responseError`.
    pub name: String,
    /// Payload supplied by the fragment-swap library.
    #[serde(default)]
    pub detail: Value,
    #[serde(default)]
    pub request: RequestContext,
}

impl ResponseEvent {
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
            request: RequestContext::new(),
        }
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Read the HTTP status from the payload.
    ///
    /// Pointers are tried in order and the first one resolving to a whole
    /// number between 0 and 999 wins (`404` and `404.0` alike). Strings,
    /// fractions, negatives and out-of-range numbers count as absent.
    pub fn status_code<S: AsRef<str>>(&self, pointers: &[S]) -> Option<u16> {
        pointers
            .iter()
            .filter_map(|pointer| self.detail.pointer(pointer.as_ref()))
            .find_map(as_status)
    }
}

fn as_status(value: &Value) -> Option<u16> {
    let code = match value.as_u64() {
        Some(code) => code,
        None => {
            let float = value.as_f64()?;
            if float.fract() != 0.0 || !(0.0..=MAX_STATUS as f64).contains(&float) {
                return None;
            }
            float as u64
        }
    };
    if code > MAX_STATUS {
        return None;
    }
    u16::try_from(code).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const POINTERS: [&str; 2] = ["/xhr/status", "/statusCode"];

    #[test]
    fn test_reads_htmx_shaped_payload() {
        let event = ResponseEvent::new("htmx:responseError", json!({ "xhr": { "status": 404 } }));
        assert_eq!(event.status_code(&POINTERS), Some(404));
    }

    #[test]
    fn test_reads_flat_status_code() {
        let event = ResponseEvent::new("response-error", json!({ "statusCode": 500 }));
        assert_eq!(event.status_code(&POINTERS), Some(500));
    }

    #[test]
    fn test_integral_float_status_is_accepted() {
        let event = ResponseEvent::new("response-error", json!({ "statusCode": 404.0 }));
        assert_eq!(event.status_code(&POINTERS), Some(404));

        let event = ResponseEvent::new("htmx:responseError", json!({ "xhr": { "status": 404.0 } }));
        assert_eq!(event.status_code(&POINTERS), Some(404));
    }

    #[test]
    fn test_first_resolving_pointer_wins() {
        let event = ResponseEvent::new(
            "response-error",
            json!({ "xhr": { "status": 410 }, "statusCode": 404 }),
        );
        assert_eq!(event.status_code(&POINTERS), Some(410));
    }

    #[test]
    fn test_skips_non_numeric_pointer_and_falls_through() {
        let event = ResponseEvent::new(
            "response-error",
            json!({ "xhr": { "status": "oops" }, "statusCode": 404 }),
        );
        assert_eq!(event.status_code(&POINTERS), Some(404));
    }

    #[test]
    fn test_malformed_payloads_have_no_status() {
        let payloads = [
            Value::Null,
            json!({}),
            json!({ "statusCode": "404" }),
            json!({ "statusCode": 404.5 }),
            json!({ "statusCode": -404 }),
            json!({ "statusCode": -404.0 }),
            json!({ "statusCode": 1000.0 }),
            json!({ "statusCode": 40400 }),
            json!({ "xhr": null }),
            json!([404]),
        ];

        for detail in payloads {
            let event = ResponseEvent::new("response-error", detail.clone());
            assert_eq!(event.status_code(&POINTERS), None, "payload: {detail}");
        }
    }

    #[test]
    fn test_deserializes_without_request_context() {
        let event: ResponseEvent =
            serde_json::from_str(r#"{"name":"htmx:responseError","detail":{"statusCode":404}}"#)
                .unwrap();
        assert_eq!(event.request.path, None);
        assert!(!event.request.correlation_id.is_none());
    }

    #[test]
    fn test_correlation_none_is_nil() {
        assert!(CorrelationId::NONE.is_none());
        assert!(!CorrelationId::new().is_none());
    }
}
