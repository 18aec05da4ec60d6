//! Pure transformations between caller options, transport descriptors and
//! normalized responses.
//!
//! Everything here is synchronous except [`interpret`], whose only await is
//! buffering the response body.

mod assemble;
mod body;
mod headers;
mod interpret;
mod resolve;

pub use assemble::{Assembled, assemble, resolve_target};
pub use body::{JSON_CONTENT_TYPE, Negotiated, negotiate};
pub use headers::{AUTHORIZATION, CONTENT_TYPE, XSRF_TOKEN, compose_headers, derived_headers};
pub use interpret::{interpret, is_success};
pub use resolve::{append_query, apply_base_url, resolve_url, serialize_params};
