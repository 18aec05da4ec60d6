use serde_json::Value;
use url::form_urlencoded;

use crate::data::{Params, ParamsSerializer};

/// Prefix `target` with `base` unless the target already names a scheme or
/// authority (contains `//`).
///
/// One leading `/` of the target is dropped so that exactly one separator
/// joins the two.
///
/// # Examples
///
/// ```
/// use tiller_fetch::core::apply_base_url;
///
/// assert_eq!(apply_base_url("http://foo", "/bar"), "http://foo/bar");
/// assert_eq!(apply_base_url("http://foo", "bar"), "http://foo/bar");
/// assert_eq!(apply_base_url("http://foo", "http://other/bar"), "http://other/bar");
/// ```
pub fn apply_base_url(base: &str, target: &str) -> String {
    if target.contains("//") {
        return target.to_string();
    }
    let stripped = target.strip_prefix('/').unwrap_or(target);
    format!("{base}/{stripped}")
}

/// Append an encoded query after `&` if `url` already has a query, else `?`.
///
/// Existing parameters are never parsed or deduplicated.
pub fn append_query(url: &str, query: &str) -> String {
    let divider = if url.contains('?') { '&' } else { '?' };
    format!("{url}{divider}{query}")
}

/// Serialize params, preferring the caller's serializer over form encoding.
pub fn serialize_params(params: &Params, serializer: Option<&ParamsSerializer>) -> String {
    if let Some(serializer) = serializer {
        return serializer.serialize(params);
    }

    match params {
        Params::Query(query) => query.strip_prefix('?').unwrap_or(query).to_string(),
        Params::Pairs(pairs) => form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish(),
        Params::Map(map) => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in map {
                serializer.append_pair(key, &render_value(value));
            }
            serializer.finish()
        }
    }
}

/// Apply the base URL, then any query params, to `target`.
pub fn resolve_url(
    target: &str,
    base_url: Option<&str>,
    params: Option<&Params>,
    serializer: Option<&ParamsSerializer>,
) -> String {
    let url = match base_url {
        Some(base) if !base.is_empty() => apply_base_url(base, target),
        _ => target.to_string(),
    };

    match params {
        Some(params) => append_query(&url, &serialize_params(params, serializer)),
        None => url,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
