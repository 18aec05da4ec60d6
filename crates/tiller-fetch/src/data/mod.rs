//! Immutable data types for request configuration and response results.
//!
//! Nothing in this module performs I/O. Options are built by the caller,
//! consumed by [`crate::core`] and handed to [`crate::effects`] as an
//! [`AssembledRequest`].

pub mod abort;
pub mod headers;
pub mod method;
pub mod options;
pub mod params;
pub mod payload;
pub mod request;
pub mod response;

pub use abort::{AbortController, AbortSignal};
pub use headers::Headers;
pub use method::Method;
pub use options::{Credentials, RequestOptions, ResponseType, StatusValidator};
pub use params::{Params, ParamsSerializer};
pub use payload::{FormData, FormPart, FormValue, OpaqueBody, Payload, RequestBody};
pub use request::AssembledRequest;
pub use response::{RawResponse, Response, ResponseData};
