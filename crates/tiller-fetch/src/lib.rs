//! Request configuration in front of a fetch-style transport.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Options, request descriptors and response types
//! - [`core`] - Pure transformations: target and URL resolution, body
//!   negotiation, header composition, response interpretation
//! - [`effects`] - The [`Transport`] seam and the [`Client`] driving a call
//!
//! A call flows options → [`assemble`](crate::core::assemble) → [`Transport::send`] →
//! [`interpret`](crate::core::interpret). Each call dispatches exactly once; there is no retry,
//! caching or interceptor chain.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tiller_fetch::RequestOptions;
//!
//! # async fn run() -> tiller_fetch::Result<()> {
//! let response = tiller_fetch::post(
//!     "https://api.example.com/items",
//!     json!({"name": "widget"}),
//!     RequestOptions::new().auth("Bearer token"),
//! )
//! .await?;
//! assert!(response.ok);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::{
    AbortController, AbortSignal, AssembledRequest, Credentials, FormData, FormPart, FormValue, Headers, Method,
    OpaqueBody, Params, ParamsSerializer, Payload, RawResponse, RequestBody, RequestOptions, Response, ResponseData,
    ResponseType, StatusValidator,
};
pub use effects::{
    BodyStream, BoxStream, Call, Client, Transport, default_client, delete, get, head, options, patch, post, put,
    request,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestTransport;

pub use error::{Error, Result, TransportError};
