use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tiller_merge::deep_merge;

use super::abort::AbortSignal;
use super::headers::Headers;
use super::method::Method;
use super::params::{Params, ParamsSerializer};
use super::payload::{OpaqueBody, Payload};
use crate::effects::Transport;

/// How the response body is extracted before interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseType {
    /// UTF-8 text. The default.
    #[default]
    Text,
    /// A JSON document.
    Json,
    /// The raw body stream, left unread.
    Stream,
    /// Opaque binary data.
    Blob,
    /// Binary data as a byte buffer.
    ArrayBuffer,
    /// `application/x-www-form-urlencoded` fields.
    FormData,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Text => "text",
            ResponseType::Json => "json",
            ResponseType::Stream => "stream",
            ResponseType::Blob => "blob",
            ResponseType::ArrayBuffer => "arrayBuffer",
            ResponseType::FormData => "formData",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ResponseType::Text),
            "json" => Ok(ResponseType::Json),
            "stream" => Ok(ResponseType::Stream),
            "blob" => Ok(ResponseType::Blob),
            "arrayBuffer" => Ok(ResponseType::ArrayBuffer),
            "formData" => Ok(ResponseType::FormData),
            other => Err(format!("unknown response type: {other}")),
        }
    }
}

/// Credential inclusion policy forwarded to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    /// Send credentials with every request.
    Include,
    /// Send credentials to the same origin only.
    #[default]
    SameOrigin,
}

impl Credentials {
    pub fn from_with_credentials(with_credentials: bool) -> Self {
        if with_credentials { Credentials::Include } else { Credentials::SameOrigin }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Credentials::Include => "include",
            Credentials::SameOrigin => "same-origin",
        }
    }
}

/// Caller-supplied success predicate over the numeric status.
#[derive(Clone)]
pub struct StatusValidator(Arc<dyn Fn(u16) -> bool + Send + Sync>);

impl StatusValidator {
    pub fn new(f: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self { Self(Arc::new(f)) }

    pub fn accepts(&self, status: u16) -> bool { (self.0)(status) }
}

impl fmt::Debug for StatusValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("StatusValidator { ... }") }
}

/// Loosely specified description of one request.
///
/// Every field is optional; [`crate::core::assemble`] fills in the defaults
/// (method `GET`, response type `text`, same-origin credentials).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tiller_fetch::{Method, RequestOptions, ResponseType};
///
/// let options = RequestOptions::new()
///     .method(Method::Post)
///     .base_url("https://api.example.com")
///     .header("X-Request-Id", "42")
///     .json(json!({"name": "tiller"}))
///     .params(json!({"page": 2}))
///     .response_type(ResponseType::Json);
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub url:               Option<String>,
    pub method:            Option<Method>,
    pub headers:           Headers,
    pub payload:           Payload,
    pub response_type:     Option<ResponseType>,
    pub params:            Option<Params>,
    pub params_serializer: Option<ParamsSerializer>,
    pub with_credentials:  Option<bool>,
    /// Value of the `authorization` header.
    pub auth:              Option<String>,
    /// Value of the `x-xsrf-token` header.
    pub csrf:              Option<String>,
    pub validate_status:   Option<StatusValidator>,
    pub base_url:          Option<String>,
    /// Overrides the client's transport for this request.
    pub transport:         Option<Arc<dyn Transport>>,
    pub signal:            Option<AbortSignal>,
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("payload", &self.payload)
            .field("response_type", &self.response_type)
            .field("params", &self.params)
            .field("params_serializer", &self.params_serializer)
            .field("with_credentials", &self.with_credentials)
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("csrf", &self.csrf.as_ref().map(|_| "<redacted>"))
            .field("validate_status", &self.validate_status)
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.as_ref().map(|_| "{ ... }"))
            .field("signal", &self.signal)
            .finish()
    }
}

impl RequestOptions {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add one header. Names are folded when the request is assembled.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all caller headers.
    #[must_use]
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Structured payload, serialized as JSON when it is an object or array.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.payload = Payload::Json(value);
        self
    }

    /// Pre-serialized payload, forwarded untouched.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.payload = Payload::Text(body.into());
        self
    }

    #[must_use]
    pub fn opaque(mut self, body: OpaqueBody) -> Self {
        self.payload = Payload::Opaque(body);
        self
    }

    #[must_use]
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = Some(params.into());
        self
    }

    #[must_use]
    pub fn params_serializer(
        mut self,
        serializer: impl Fn(&Params) -> String + Send + Sync + 'static,
    ) -> Self {
        self.params_serializer = Some(ParamsSerializer::new(serializer));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = Some(with_credentials);
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    #[must_use]
    pub fn csrf(mut self, token: impl Into<String>) -> Self {
        self.csrf = Some(token.into());
        self
    }

    #[must_use]
    pub fn validate_status(mut self, f: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self {
        self.validate_status = Some(StatusValidator::new(f));
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Layer `overrides` on top of `self`, returning a new set of options.
    ///
    /// Fields set in `overrides` win. Headers are merged with folded names so
    /// a per-call `Accept` replaces a default `accept`. Mapping params are
    /// deep merged; any other params shape replaces the default.
    #[must_use]
    pub fn merged(&self, overrides: &RequestOptions) -> RequestOptions {
        let overrides = overrides.clone();
        RequestOptions {
            url:               overrides.url.or_else(|| self.url.clone()),
            method:            overrides.method.or(self.method),
            headers:           self.headers.merged(&overrides.headers),
            payload:           if overrides.payload.is_none() {
                self.payload.clone()
            } else {
                overrides.payload
            },
            response_type:     overrides.response_type.or(self.response_type),
            params:            merge_params(self.params.as_ref(), overrides.params),
            params_serializer: overrides
                .params_serializer
                .or_else(|| self.params_serializer.clone()),
            with_credentials:  overrides.with_credentials.or(self.with_credentials),
            auth:              overrides.auth.or_else(|| self.auth.clone()),
            csrf:              overrides.csrf.or_else(|| self.csrf.clone()),
            validate_status:   overrides
                .validate_status
                .or_else(|| self.validate_status.clone()),
            base_url:          overrides.base_url.or_else(|| self.base_url.clone()),
            transport:         overrides.transport.or_else(|| self.transport.clone()),
            signal:            overrides.signal.or_else(|| self.signal.clone()),
        }
    }
}

fn merge_params(defaults: Option<&Params>, overrides: Option<Params>) -> Option<Params> {
    match (defaults, overrides) {
        (Some(Params::Map(base)), Some(Params::Map(over))) => Some(Params::from_value(deep_merge(
            &Value::Object(base.clone()),
            &Value::Object(over),
            false,
        ))),
        (_, Some(over)) => Some(over),
        (base, None) => base.cloned(),
    }
}
