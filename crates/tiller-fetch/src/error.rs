//! Error types for tiller-fetch.

use thiserror::Error;

use crate::data::Response;

#[derive(Debug, Error)]
pub enum Error {
    /// Neither a direct target nor `options.url` was usable. Raised before
    /// any transport call.
    #[error("Missing required 'options.url'.")]
    MissingUrl,

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("no transport configured")]
    NoTransport,

    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    #[error("request aborted")]
    Aborted,

    /// The success predicate rejected the status. Carries the full response,
    /// parsed body included, so callers can inspect it without re-requesting.
    #[error("request failed with status {}", .0.status)]
    Status(Box<Response>),
}

impl Error {
    /// The rejected response, for [`Error::Status`].
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Error::Status(response) => Some(*response),
            _ => None,
        }
    }

    /// The status code, for [`Error::Status`].
    pub fn status(&self) -> Option<u16> { self.response().map(|r| r.status) }

    /// Whether this failure was raised before the transport was invoked.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::MissingUrl | Error::InvalidMethod(_))
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Aborted => Error::Aborted,
            other => Error::Transport(other),
        }
    }
}

/// Failures reported by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("aborted by signal")]
    Aborted,

    #[error("request failed: {0}")]
    Request(String),

    #[error("body read failed: {0}")]
    Body(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
