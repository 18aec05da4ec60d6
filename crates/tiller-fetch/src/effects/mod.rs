//! Effects: the transport seam and the client that drives a call through
//! assembly, dispatch and interpretation.

mod client;
#[cfg(feature = "reqwest")]
mod reqwest_impl;
mod transport;

pub use client::{Call, Client, default_client, delete, get, head, options, patch, post, put, request};
#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;
pub use transport::{BodyStream, BoxStream, Transport};
