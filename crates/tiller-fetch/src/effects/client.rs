use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{Span, debug, instrument};

use super::transport::Transport;
use crate::core::{Assembled, assemble, interpret};
use crate::data::{AssembledRequest, Method, Payload, RequestOptions, Response};
use crate::error::{Error, Result};

/// Entry point: assembles requests, dispatches them and interprets responses.
///
/// A client holds a transport and a set of default options that are layered
/// under every call's options (see [`RequestOptions::merged`]). A transport
/// set on the call's options overrides the client's.
///
/// # Examples
///
/// ```no_run
/// use tiller_fetch::{Client, RequestOptions};
///
/// # async fn run() -> tiller_fetch::Result<()> {
/// let client = Client::default().with_defaults(RequestOptions::new().base_url("https://api.example.com"));
/// let response = client.get("/users/1", RequestOptions::new()).await?;
/// println!("{} {:?}", response.status, response.data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Option<Arc<dyn Transport>>,
    defaults:  RequestOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport.as_ref().map(|_| "{ ... }"))
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Default for Client {
    /// A client over [`ReqwestTransport`](crate::ReqwestTransport) when the
    /// `reqwest` feature is enabled, otherwise a client without a transport.
    fn default() -> Self {
        #[cfg(feature = "reqwest")]
        {
            Self::new(Arc::new(super::ReqwestTransport::default()))
        }
        #[cfg(not(feature = "reqwest"))]
        {
            Self::without_transport()
        }
    }
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            defaults:  RequestOptions::default(),
        }
    }

    /// A client whose calls must each carry `options.transport`.
    pub fn without_transport() -> Self {
        Self {
            transport: None,
            defaults:  RequestOptions::default(),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: RequestOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &RequestOptions { &self.defaults }

    /// Validate and assemble a call without dispatching it.
    ///
    /// The target is `target` if non-empty, else `options.url`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingUrl`] when no target is usable.
    /// - [`Error::NoTransport`] when neither the options nor the client carry
    ///   a transport.
    pub fn prepare(&self, target: Option<&str>, options: RequestOptions) -> Result<Call> {
        let options = self.defaults.merged(&options);
        let Assembled { request, config } = assemble(target, options)?;

        let transport = config
            .transport
            .clone()
            .or_else(|| self.transport.clone())
            .ok_or(Error::NoTransport)?;

        Ok(Call {
            request,
            config,
            transport,
        })
    }

    /// Issue one request. Validation happens before the transport is touched.
    pub async fn request(&self, target: Option<&str>, options: RequestOptions) -> Result<Response> {
        self.prepare(target, options)?.send().await
    }

    /// `GET` shorthand. An empty `url` falls back to `options.url`.
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Some(url), options.method(Method::Get)).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Some(url), options.method(Method::Delete)).await
    }

    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Some(url), options.method(Method::Head)).await
    }

    pub async fn options(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Some(url), options.method(Method::Options)).await
    }

    /// `POST` shorthand; `payload` replaces any payload in `options`.
    pub async fn post(&self, url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
        self.send_with_payload(url, Method::Post, payload.into(), options).await
    }

    pub async fn put(&self, url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
        self.send_with_payload(url, Method::Put, payload.into(), options).await
    }

    pub async fn patch(&self, url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
        self.send_with_payload(url, Method::Patch, payload.into(), options).await
    }

    async fn send_with_payload(
        &self,
        url: &str,
        method: Method,
        payload: Payload,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Some(url), options.payload(payload).method(method)).await
    }
}

/// A validated request ready for dispatch.
pub struct Call {
    request:   AssembledRequest,
    config:    RequestOptions,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("request", &self.request)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Call {
    /// The descriptor the transport will receive.
    pub fn request(&self) -> &AssembledRequest { &self.request }

    /// Effective options of this call.
    pub fn config(&self) -> &RequestOptions { &self.config }

    /// Dispatch exactly once and interpret the response. No retries.
    #[instrument(
        name = "http_request",
        skip(self),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn send(self) -> Result<Response> {
        let span = Span::current();
        span.record("http.method", self.request.method().as_str());
        span.record("http.url", self.request.url());
        debug!("dispatching request");

        let raw = self.transport.send(self.request).await?;
        span.record("http.status_code", raw.status);

        interpret(raw, self.config).await
    }
}

/// The process-wide client used by the free functions.
pub fn default_client() -> &'static Client {
    static DEFAULT: OnceLock<Client> = OnceLock::new();
    DEFAULT.get_or_init(Client::default)
}

/// [`Client::request`] on the [`default_client`].
pub async fn request(target: Option<&str>, options: RequestOptions) -> Result<Response> {
    default_client().request(target, options).await
}

pub async fn get(url: &str, options: RequestOptions) -> Result<Response> {
    default_client().get(url, options).await
}

pub async fn delete(url: &str, options: RequestOptions) -> Result<Response> {
    default_client().delete(url, options).await
}

pub async fn head(url: &str, options: RequestOptions) -> Result<Response> {
    default_client().head(url, options).await
}

pub async fn options(url: &str, options: RequestOptions) -> Result<Response> {
    default_client().options(url, options).await
}

pub async fn post(url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
    default_client().post(url, payload, options).await
}

pub async fn put(url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
    default_client().put(url, payload, options).await
}

pub async fn patch(url: &str, payload: impl Into<Payload>, options: RequestOptions) -> Result<Response> {
    default_client().patch(url, payload, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawResponse;
    use crate::error::TransportError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_transport(calls: Arc<AtomicUsize>) -> Arc<dyn Transport> {
        Arc::new(move |_request: AssembledRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, TransportError>(RawResponse::new(200).body("hello")) }
        })
    }

    #[test]
    fn test_prepare_fails_without_target_and_never_calls_transport() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = Client::new(counting_transport(Arc::clone(&calls)));

        let err = client.prepare(None, RequestOptions::new()).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Missing required 'options.url'.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prepare_without_any_transport() {
        let err = Client::without_transport()
            .prepare(Some("http://x/"), RequestOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::NoTransport));
    }

    #[test]
    fn test_missing_url_is_reported_before_missing_transport() {
        let err = Client::without_transport().prepare(None, RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::MissingUrl));
    }

    #[test]
    fn test_prepare_layers_defaults() {
        let client = Client::new(counting_transport(Arc::new(AtomicUsize::new(0)))).with_defaults(
            RequestOptions::new()
                .base_url("http://api")
                .header("Accept", "text/plain"),
        );

        let call = client
            .prepare(Some("/items"), RequestOptions::new().header("accept", "application/json"))
            .unwrap();

        assert_eq!(client.defaults().base_url.as_deref(), Some("http://api"));
        assert_eq!(call.request().url(), "http://api/items");
        assert_eq!(call.request().headers().len(), 1);
        assert_eq!(call.request().headers().get("accept").as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_options_transport_overrides_client_transport() {
        let client_calls = Arc::new(AtomicUsize::new(0));
        let override_calls = Arc::new(AtomicUsize::new(0));
        let client = Client::new(counting_transport(Arc::clone(&client_calls)));

        let options = RequestOptions::new().transport(counting_transport(Arc::clone(&override_calls)));
        client.get("http://x/", options).await.unwrap();

        assert_eq!(client_calls.load(Ordering::SeqCst), 0);
        assert_eq!(override_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transport: Arc<dyn Transport> = Arc::new(move |_request: AssembledRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err::<RawResponse, _>(TransportError::Request("connection refused".into())) }
        });

        let err = Client::new(transport).get("http://x/", RequestOptions::new()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Request(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_abort_is_distinguishable() {
        let transport: Arc<dyn Transport> =
            Arc::new(|_request: AssembledRequest| async move { Err::<RawResponse, _>(TransportError::Aborted) });

        let err = Client::new(transport).get("http://x/", RequestOptions::new()).await.unwrap_err();

        assert!(matches!(err, Error::Aborted));
    }
}
