use async_trait::async_trait;
use futures_util::{Stream, StreamExt, TryStreamExt, stream};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use reqwest::multipart;

use super::transport::{BodyStream, Transport};
use crate::data::{AbortSignal, AssembledRequest, FormData, FormValue, Headers, OpaqueBody, RawResponse, RequestBody};
use crate::error::TransportError;

/// Production transport using `reqwest`.
///
/// Relative URLs are rejected by `reqwest`; apply a base URL first.
/// `reqwest` has no notion of a credentials mode, so the policy is not
/// forwarded. Form bodies are sent as `multipart/form-data` with a generated
/// boundary, replacing any caller `content-type`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self { Self { client } }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: AssembledRequest) -> Result<RawResponse, TransportError> {
        if request.signal().is_some_and(AbortSignal::is_aborted) {
            return Err(TransportError::Aborted);
        }

        let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let mut builder = self.client.request(method, request.url());

        let is_form = matches!(request.body(), RequestBody::Opaque(OpaqueBody::Form(_)));
        for (name, value) in request.headers().iter() {
            // multipart bodies carry their own boundary parameter
            if is_form && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name:   name.to_string(),
                reason: e.to_string(),
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| TransportError::InvalidHeader {
                name:   name.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.header(header_name, header_value);
        }

        tracing::trace!(credentials = request.credentials().as_str(), "credentials mode not forwarded");

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text.clone()),
            RequestBody::Opaque(OpaqueBody::Bytes(bytes)) => builder.body(bytes.clone()),
            RequestBody::Opaque(OpaqueBody::Form(form)) => builder.multipart(multipart_form(form)?),
        };

        let send = builder.send();
        let response = match request.signal() {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.aborted() => return Err(TransportError::Aborted),
                response = send => response,
            },
            None => send.await,
        }
        .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let redirected = reqwest::Url::parse(request.url()).is_ok_and(|requested| requested != *response.url());

        let headers = collect_headers(response.headers());

        let mut raw = RawResponse::new(status.as_u16())
            .status_text(status.canonical_reason().unwrap_or_default())
            .ok(status.is_success())
            .url(response.url().as_str())
            .redirected(redirected)
            .kind("basic");
        raw.headers = headers;

        let body = response
            .bytes_stream()
            .map_err(|e| TransportError::Body(e.to_string()));
        let body: BodyStream = match request.signal().cloned() {
            Some(signal) => Box::pin(abortable(body, signal)),
            None => Box::pin(body),
        };

        Ok(raw.stream(body))
    }
}

/// Repeated headers are joined with `", "`, except `set-cookie`, whose lines
/// are kept as a list.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for name in map.keys() {
        let values: Vec<String> = map
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        if *name == SET_COOKIE {
            headers.insert(name.as_str(), values);
        } else {
            headers.insert(name.as_str(), values.join(", "));
        }
    }
    headers
}

fn multipart_form(form: &FormData) -> Result<multipart::Form, TransportError> {
    let mut out = multipart::Form::new();
    for part in form.parts() {
        out = match &part.value {
            FormValue::Text(text) => out.text(part.name.clone(), text.clone()),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = multipart::Part::bytes(bytes.to_vec());
                if let Some(file_name) = file_name {
                    file = file.file_name(file_name.clone());
                }
                if let Some(content_type) = content_type {
                    file = file.mime_str(content_type).map_err(|e| TransportError::InvalidHeader {
                        name:   "content-type".to_string(),
                        reason: e.to_string(),
                    })?;
                }
                out.part(part.name.clone(), file)
            }
        };
    }
    Ok(out)
}

/// End a body stream with [`TransportError::Aborted`] once `signal` fires.
fn abortable<S>(body: S, signal: AbortSignal) -> impl Stream<Item = Result<bytes::Bytes, TransportError>> + Send
where
    S: Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static,
{
    let body: BodyStream = Box::pin(body);
    stream::unfold(Some((body, signal)), |state| async move {
        let (mut body, signal) = state?;
        let next = tokio::select! {
            biased;
            _ = signal.aborted() => Some(Err(TransportError::Aborted)),
            next = body.next() => next,
        };
        match next {
            Some(Err(TransportError::Aborted)) => Some((Err(TransportError::Aborted), None)),
            Some(item) => Some((item, Some((body, signal)))),
            None => None,
        }
    })
}
