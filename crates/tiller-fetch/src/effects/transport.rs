use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::data::{AssembledRequest, RawResponse};
use crate::error::TransportError;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An unread response body.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// The network call this layer sits in front of.
///
/// Implementations own redirects, TLS, pooling and timeouts. They receive a
/// fully assembled request and must honour its [`AbortSignal`] if they
/// support cancellation, reporting [`TransportError::Aborted`].
///
/// Transports are shared between concurrent calls without locking, hence
/// `Send + Sync`. Any `Fn(AssembledRequest) -> impl Future` with the right
/// output is a transport too.
///
/// # Implementations
///
/// - [`ReqwestTransport`](crate::ReqwestTransport): production transport using `reqwest`
/// - Closures and mocks for testing
///
/// [`AbortSignal`]: crate::AbortSignal
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: AssembledRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<F, Fut> Transport for F
where
    F: Fn(AssembledRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RawResponse, TransportError>> + Send + 'static,
{
    async fn send(&self, request: AssembledRequest) -> Result<RawResponse, TransportError> {
        (self)(request).await
    }
}
