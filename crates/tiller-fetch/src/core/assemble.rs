use crate::core::body::negotiate;
use crate::core::headers::{compose_headers, derived_headers};
use crate::core::resolve::resolve_url;
use crate::data::{AssembledRequest, Credentials, RequestOptions};
use crate::error::{Error, Result};

/// An assembled request paired with the effective options it came from.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub request: AssembledRequest,
    /// The caller's options with `url`, `method` and `response_type` filled in.
    pub config:  RequestOptions,
}

/// Pick the request target: a non-empty direct target, else a non-empty
/// `options.url`.
///
/// # Errors
///
/// [`Error::MissingUrl`] when neither is usable.
pub fn resolve_target(target: Option<&str>, options: &RequestOptions) -> Result<String> {
    target
        .filter(|t| !t.is_empty())
        .or_else(|| options.url.as_deref().filter(|u| !u.is_empty()))
        .map(str::to_string)
        .ok_or(Error::MissingUrl)
}

/// Turn loosely specified options into the transport call descriptor.
///
/// Synchronous and side-effect free: a missing target fails here, before any
/// transport is involved.
pub fn assemble(target: Option<&str>, options: RequestOptions) -> Result<Assembled> {
    let target = resolve_target(target, &options)?;
    let method = options.method.unwrap_or_default();

    let url = resolve_url(
        &target,
        options.base_url.as_deref(),
        options.params.as_ref(),
        options.params_serializer.as_ref(),
    );

    let negotiated = negotiate(&options.payload);
    let derived = derived_headers(
        negotiated.content_type,
        non_empty(options.csrf.as_deref()),
        non_empty(options.auth.as_deref()),
    );
    let headers = compose_headers(&derived, &options.headers);

    let credentials = Credentials::from_with_credentials(options.with_credentials.unwrap_or(false));

    let request = AssembledRequest::new(
        url,
        method,
        headers,
        negotiated.body,
        credentials,
        options.signal.clone(),
    );

    let response_type = options.response_type.unwrap_or_default();
    let config = RequestOptions {
        url: Some(target),
        method: Some(method),
        response_type: Some(response_type),
        ..options
    };

    Ok(Assembled { request, config })
}

fn non_empty(value: Option<&str>) -> Option<&str> { value.filter(|v| !v.is_empty()) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FormData, Method, Payload, RequestBody, ResponseType};
    use serde_json::json;

    #[test]
    fn test_missing_target_is_rejected() {
        let err = assemble(None, RequestOptions::new()).unwrap_err();
        assert!(matches!(err, Error::MissingUrl));
        assert_eq!(err.to_string(), "Missing required 'options.url'.");
    }

    #[test]
    fn test_empty_targets_are_rejected() {
        let err = assemble(Some(""), RequestOptions::new().url("")).unwrap_err();
        assert!(matches!(err, Error::MissingUrl));
    }

    #[test]
    fn test_options_url_is_used_without_direct_target() {
        let assembled = assemble(None, RequestOptions::new().url("http://x/a")).unwrap();
        assert_eq!(assembled.request.url(), "http://x/a");
    }

    #[test]
    fn test_direct_target_wins_over_options_url() {
        let assembled = assemble(Some("http://x/direct"), RequestOptions::new().url("http://x/opt")).unwrap();
        assert_eq!(assembled.request.url(), "http://x/direct");
        assert_eq!(assembled.config.url.as_deref(), Some("http://x/direct"));
    }

    #[test]
    fn test_defaults_are_filled_in() {
        let assembled = assemble(Some("/"), RequestOptions::new()).unwrap();
        assert_eq!(assembled.request.method(), Method::Get);
        assert_eq!(assembled.request.credentials(), Credentials::SameOrigin);
        assert_eq!(assembled.request.body(), &RequestBody::Empty);
        assert!(assembled.request.headers().is_empty());
        assert_eq!(assembled.config.method, Some(Method::Get));
        assert_eq!(assembled.config.response_type, Some(ResponseType::Text));
    }

    #[test]
    fn test_json_payload_sets_body_and_content_type() {
        let options = RequestOptions::new().method(Method::Post).json(json!({"hello": "world"}));
        let assembled = assemble(Some("http://mocked-server/post-json"), options).unwrap();

        assert_eq!(assembled.request.method().as_str(), "POST");
        assert_eq!(assembled.request.body().as_text(), Some(r#"{"hello":"world"}"#));
        let headers: Vec<_> = assembled.request.headers().iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(headers, vec![("content-type".to_string(), "application/json".to_string())]);
    }

    #[test]
    fn test_form_payload_keeps_caller_content_type() {
        let mut form = FormData::new();
        form.append("hello", "world");
        let options = RequestOptions::new()
            .payload(Payload::from(form))
            .header("content-type", "multipart/form-data");

        let assembled = assemble(Some("http://mocked-server/post-formdata"), options).unwrap();

        assert_eq!(assembled.request.headers().len(), 1);
        assert_eq!(
            assembled.request.headers().get("content-type").as_deref(),
            Some("multipart/form-data")
        );
        assert!(matches!(assembled.request.body(), RequestBody::Opaque(_)));
    }

    #[test]
    fn test_auth_and_csrf_become_headers() {
        let options = RequestOptions::new().auth("Bearer abc").csrf("tok");
        let assembled = assemble(Some("/"), options).unwrap();
        assert_eq!(assembled.request.headers().get("authorization").as_deref(), Some("Bearer abc"));
        assert_eq!(assembled.request.headers().get("x-xsrf-token").as_deref(), Some("tok"));
    }

    #[test]
    fn test_empty_auth_is_ignored() {
        let assembled = assemble(Some("/"), RequestOptions::new().auth("")).unwrap();
        assert!(!assembled.request.headers().contains("authorization"));
    }

    #[test]
    fn test_with_credentials_includes() {
        let assembled = assemble(Some("/"), RequestOptions::new().with_credentials(true)).unwrap();
        assert_eq!(assembled.request.credentials(), Credentials::Include);
    }

    #[test]
    fn test_base_url_and_params_compose() {
        let options = RequestOptions::new()
            .base_url("/foo")
            .params(json!({"a": 1, "b": true}));
        let assembled = assemble(Some("/bar?c=42"), options).unwrap();
        assert_eq!(assembled.request.url(), "/foo/bar?c=42&a=1&b=true");
    }
}
