use std::fmt;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use futures_util::stream;
use serde_json::Value;

use super::headers::Headers;
use super::options::RequestOptions;
use crate::effects::BodyStream;
use crate::error::TransportError;

/// What a transport hands back: status line, metadata and an unread body.
pub struct RawResponse {
    pub status:      u16,
    pub status_text: String,
    /// The transport's own success notion, normally `200..=299`.
    pub ok:          bool,
    /// Final URL after redirects.
    pub url:         String,
    pub redirected:  bool,
    /// Transport-specific response kind, e.g. `"basic"`.
    pub kind:        String,
    pub headers:     Headers,
    pub body:        BodyStream,
}

impl RawResponse {
    /// A response with the given status, an empty body and `ok` derived from
    /// the status class.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: String::new(),
            ok: (200..300).contains(&status),
            url: String::new(),
            redirected: false,
            kind: "default".to_string(),
            headers: Headers::new(),
            body: Box::pin(stream::empty::<Result<Bytes, TransportError>>()),
        }
    }

    #[must_use]
    pub fn status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    #[must_use]
    pub fn ok(mut self, ok: bool) -> Self {
        self.ok = ok;
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn redirected(mut self, redirected: bool) -> Self {
        self.redirected = redirected;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the body with a single buffered chunk.
    #[must_use]
    pub fn body(mut self, bytes: impl Into<Bytes>) -> Self {
        let bytes: Bytes = bytes.into();
        self.body = Box::pin(stream::once(async move { Ok::<_, TransportError>(bytes) }));
        self
    }

    #[must_use]
    pub fn stream(mut self, body: BodyStream) -> Self {
        self.body = body;
        self
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("ok", &self.ok)
            .field("url", &self.url)
            .field("redirected", &self.redirected)
            .field("kind", &self.kind)
            .field("headers", &self.headers)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// The response body in the shape the interpreter settled on.
pub enum ResponseData {
    /// Nothing could be extracted, e.g. a failed JSON parse in `json` mode.
    Empty,
    Text(String),
    Json(Value),
    Bytes(Bytes),
    Form(Vec<(String, String)>),
    /// The unread body, for `stream` mode. Locked only to make the data
    /// `Sync`; take it with [`ResponseData::into_stream`].
    Stream(Mutex<BodyStream>),
}

impl ResponseData {
    pub fn is_empty(&self) -> bool { matches!(self, ResponseData::Empty) }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&[(String, String)]> {
        match self {
            ResponseData::Form(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<BodyStream> {
        match self {
            ResponseData::Stream(body) => Some(body.into_inner().unwrap_or_else(PoisonError::into_inner)),
            _ => None,
        }
    }
}

impl From<BodyStream> for ResponseData {
    fn from(body: BodyStream) -> Self { ResponseData::Stream(Mutex::new(body)) }
}

impl fmt::Debug for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseData::Empty => f.write_str("Empty"),
            ResponseData::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ResponseData::Json(value) => f.debug_tuple("Json").field(value).finish(),
            ResponseData::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            ResponseData::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            ResponseData::Stream(_) => f.write_str("Stream { ... }"),
        }
    }
}

/// Normalized result of one call.
#[derive(Debug)]
pub struct Response {
    pub status:      u16,
    pub status_text: String,
    /// The transport's `ok` flag, copied unchanged.
    pub ok:          bool,
    pub url:         String,
    pub redirected:  bool,
    pub kind:        String,
    pub headers:     Headers,
    pub data:        ResponseData,
    /// Effective options the request was assembled from.
    pub config:      RequestOptions,
}
