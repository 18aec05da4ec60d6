use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

/// The request payload as supplied by the caller.
///
/// The variant decides how the body is negotiated: structured values are
/// serialized as JSON, text and opaque handles are forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    /// A structured value. Objects and arrays are serialized to JSON text.
    Json(Value),
    /// A body the caller already serialized.
    Text(String),
    /// A handle forwarded as-is, e.g. multipart form data or file bytes.
    Opaque(OpaqueBody),
}

impl Payload {
    pub fn is_none(&self) -> bool { matches!(self, Payload::None) }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self { Payload::Json(value) }
}

impl From<String> for Payload {
    fn from(text: String) -> Self { Payload::Text(text) }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self { Payload::Text(text.to_string()) }
}

impl From<OpaqueBody> for Payload {
    fn from(body: OpaqueBody) -> Self { Payload::Opaque(body) }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self { Payload::Opaque(OpaqueBody::Form(Arc::new(form))) }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self { Payload::Opaque(OpaqueBody::Bytes(bytes)) }
}

/// A body that is never inspected or re-encoded by this layer.
///
/// Cloning shares the underlying buffer or form, so the handle that reaches
/// the transport is the one the caller built.
#[derive(Debug, Clone, PartialEq)]
pub enum OpaqueBody {
    /// Raw bytes, e.g. the contents of a file.
    Bytes(Bytes),
    /// Multipart form data; the transport owns the encoding.
    Form(Arc<FormData>),
}

/// Ordered multipart form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

/// A single multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name:  String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name:    Option<String>,
        content_type: Option<String>,
        bytes:        Bytes,
    },
}

impl FormData {
    pub fn new() -> Self { Self::default() }

    /// Append a text field.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart {
            name:  name.into(),
            value: FormValue::Text(value.into()),
        });
    }

    /// Append a file field.
    pub fn append_file(
        &mut self,
        name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) {
        self.parts.push(FormPart {
            name:  name.into(),
            value: FormValue::File {
                file_name,
                content_type,
                bytes: bytes.into(),
            },
        });
    }

    pub fn parts(&self) -> &[FormPart] { &self.parts }
}

/// The body representation handed to the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Text(String),
    Opaque(OpaqueBody),
}

impl RequestBody {
    /// The body as text, if it is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestBody::Text(text) => Some(text),
            _ => None,
        }
    }
}
