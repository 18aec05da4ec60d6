use super::abort::AbortSignal;
use super::headers::Headers;
use super::method::Method;
use super::options::Credentials;
use super::payload::RequestBody;

/// The final transport call descriptor. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct AssembledRequest {
    url:         String,
    method:      Method,
    headers:     Headers,
    body:        RequestBody,
    credentials: Credentials,
    signal:      Option<AbortSignal>,
}

impl AssembledRequest {
    pub(crate) fn new(
        url: String,
        method: Method,
        headers: Headers,
        body: RequestBody,
        credentials: Credentials,
        signal: Option<AbortSignal>,
    ) -> Self {
        Self {
            url,
            method,
            headers,
            body,
            credentials,
            signal,
        }
    }

    pub fn url(&self) -> &str { &self.url }

    pub fn method(&self) -> Method { self.method }

    /// Composed headers: one lower-case entry per name.
    pub fn headers(&self) -> &Headers { &self.headers }

    pub fn body(&self) -> &RequestBody { &self.body }

    pub fn credentials(&self) -> Credentials { self.credentials }

    /// The caller's cancellation handle, passed through unchanged.
    pub fn signal(&self) -> Option<&AbortSignal> { self.signal.as_ref() }
}
