use crate::data::Headers;

pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
pub const XSRF_TOKEN: &str = "x-xsrf-token";

/// Headers the pipeline derives from the options rather than the caller.
pub fn derived_headers(content_type: Option<&str>, csrf: Option<&str>, auth: Option<&str>) -> Headers {
    let mut headers = Headers::new();
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, content_type);
    }
    if let Some(token) = csrf {
        headers.insert(XSRF_TOKEN, token);
    }
    if let Some(auth) = auth {
        headers.insert(AUTHORIZATION, auth);
    }
    headers
}

/// Fold derived and caller headers into one lower-case set.
///
/// Caller headers are merged last, so they win over derived headers with the
/// same folded name.
pub fn compose_headers(derived: &Headers, user: &Headers) -> Headers { derived.merged(user) }
