use serde_json::Value;

use crate::data::{Payload, RequestBody};

/// Content type emitted for JSON-serialized payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Result of classifying a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiated {
    pub body:         RequestBody,
    /// Content type implied by the payload, if any.
    pub content_type: Option<&'static str>,
}

/// Decide the wire body for a payload and the content type it implies.
///
/// Only objects and arrays are JSON-serialized and marked as JSON. Other
/// JSON scalars travel as their textual form, and text and opaque handles
/// are forwarded untouched with no content type, leaving multipart framing
/// to the transport.
pub fn negotiate(payload: &Payload) -> Negotiated {
    match payload {
        Payload::None | Payload::Json(Value::Null) => plain(RequestBody::Empty),
        Payload::Json(value @ (Value::Object(_) | Value::Array(_))) => Negotiated {
            body:         RequestBody::Text(value.to_string()),
            content_type: Some(JSON_CONTENT_TYPE),
        },
        Payload::Json(Value::String(text)) => plain(RequestBody::Text(text.clone())),
        Payload::Json(scalar) => plain(RequestBody::Text(scalar.to_string())),
        Payload::Text(text) => plain(RequestBody::Text(text.clone())),
        Payload::Opaque(handle) => plain(RequestBody::Opaque(handle.clone())),
    }
}

fn plain(body: RequestBody) -> Negotiated {
    Negotiated {
        body,
        content_type: None,
    }
}
