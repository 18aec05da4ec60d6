use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, trace};
use url::form_urlencoded;

use crate::core::headers::CONTENT_TYPE;
use crate::data::{Headers, RawResponse, RequestOptions, Response, ResponseData, ResponseType, StatusValidator};
use crate::effects::BodyStream;
use crate::error::{Error, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Success classification: the caller's predicate if configured, else the
/// transport's `ok` flag.
pub fn is_success(status: u16, ok: bool, validator: Option<&StatusValidator>) -> bool {
    match validator {
        Some(validator) => validator.accepts(status),
        None => ok,
    }
}

/// Project a raw response into a [`Response`] and classify it.
///
/// In `stream` mode the body is handed over unread and the response is
/// returned without status classification. Otherwise it is buffered,
/// extracted per the response type, then textual data is opportunistically
/// re-parsed as JSON: a JSON-looking text body becomes structured data even
/// in `text` mode, anything else is kept as extracted.
///
/// # Errors
///
/// - [`Error::Status`] with the full response when the status is rejected
///   (never in `stream` mode).
/// - [`Error::Transport`] / [`Error::Aborted`] when reading the body fails.
pub async fn interpret(raw: RawResponse, config: RequestOptions) -> Result<Response> {
    let RawResponse {
        status,
        status_text,
        ok,
        url,
        redirected,
        kind,
        headers,
        body,
    } = raw;

    let mode = config.response_type.unwrap_or_default();
    let data = match mode {
        ResponseType::Stream => ResponseData::from(body),
        mode => {
            let bytes = buffer(body).await?;
            reparse(extract(mode, bytes, &headers))
        }
    };

    let response = Response {
        status,
        status_text,
        ok,
        url,
        redirected,
        kind,
        headers,
        data,
        config,
    };

    if mode == ResponseType::Stream {
        return Ok(response);
    }

    if is_success(status, ok, response.config.validate_status.as_ref()) {
        Ok(response)
    } else {
        debug!(status, url = %response.url, "status rejected");
        Err(Error::Status(Box::new(response)))
    }
}

async fn buffer(mut body: BodyStream) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

fn extract(mode: ResponseType, bytes: Bytes, headers: &Headers) -> ResponseData {
    match mode {
        ResponseType::Text => ResponseData::Text(String::from_utf8_lossy(&bytes).into_owned()),
        ResponseType::Json => match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => ResponseData::Json(value),
            Err(e) => {
                trace!(error = %e, "json extraction failed");
                ResponseData::Empty
            }
        },
        ResponseType::FormData => {
            let is_form = headers
                .get(CONTENT_TYPE)
                .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE));
            if is_form {
                ResponseData::Form(form_urlencoded::parse(&bytes).into_owned().collect())
            } else {
                ResponseData::Empty
            }
        }
        ResponseType::Blob | ResponseType::ArrayBuffer | ResponseType::Stream => ResponseData::Bytes(bytes),
    }
}

fn reparse(data: ResponseData) -> ResponseData {
    let text = match &data {
        ResponseData::Text(text) | ResponseData::Json(Value::String(text)) => text,
        _ => return data,
    };

    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            trace!("textual body promoted to JSON");
            ResponseData::Json(value)
        }
        Err(_) => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use futures_util::stream;
    use serde_json::json;

    fn config(response_type: ResponseType) -> RequestOptions {
        RequestOptions::new().response_type(response_type)
    }

    #[tokio::test]
    async fn test_plain_text_stays_text() {
        let raw = RawResponse::new(200).body("some example content");
        let response = interpret(raw, config(ResponseType::Text)).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data.as_text(), Some("some example content"));
    }

    #[tokio::test]
    async fn test_json_text_is_promoted_in_text_mode() {
        let raw = RawResponse::new(200).body(r#"{"message":"some example content"}"#);
        let response = interpret(raw, config(ResponseType::Text)).await.unwrap();
        assert_eq!(response.data.as_json(), Some(&json!({"message": "some example content"})));
    }

    #[tokio::test]
    async fn test_json_mode_parses() {
        let raw = RawResponse::new(200).body(r#"{"message":"hi"}"#);
        let response = interpret(raw, config(ResponseType::Json)).await.unwrap();
        assert_eq!(response.data.as_json(), Some(&json!({"message": "hi"})));
    }

    #[tokio::test]
    async fn test_json_mode_with_invalid_body_is_empty() {
        let raw = RawResponse::new(200).body("some example content");
        let response = interpret(raw, config(ResponseType::Json)).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_json_string_value_is_promoted() {
        let raw = RawResponse::new(200).body(r#""{\"nested\":1}""#);
        let response = interpret(raw, config(ResponseType::Json)).await.unwrap();
        assert_eq!(response.data.as_json(), Some(&json!({"nested": 1})));
    }

    #[tokio::test]
    async fn test_blob_is_kept_as_bytes() {
        let raw = RawResponse::new(200).body(Bytes::from_static(b"[1,2]"));
        let response = interpret(raw, config(ResponseType::Blob)).await.unwrap();
        assert_eq!(response.data.as_bytes().map(|b| b.as_ref()), Some(&b"[1,2]"[..]));
    }

    #[tokio::test]
    async fn test_form_data_is_decoded() {
        let raw = RawResponse::new(200)
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body("a=1&b=two+words");
        let response = interpret(raw, config(ResponseType::FormData)).await.unwrap();
        assert_eq!(
            response.data.as_form(),
            Some(&[("a".to_string(), "1".to_string()), ("b".to_string(), "two words".to_string())][..])
        );
    }

    #[tokio::test]
    async fn test_form_data_without_form_content_type_is_empty() {
        let raw = RawResponse::new(200).header("content-type", "text/plain").body("a=1");
        let response = interpret(raw, config(ResponseType::FormData)).await.unwrap();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_stream_mode_does_not_read_body() {
        let body: BodyStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"chunk")),
            Err(TransportError::Body("never read".into())),
        ]));
        let raw = RawResponse::new(200).stream(body);

        let response = interpret(raw, config(ResponseType::Stream)).await.unwrap();

        let mut body = response.data.into_stream().expect("stream data");
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from_static(b"chunk"));
    }

    #[tokio::test]
    async fn test_stream_mode_skips_status_classification() {
        let raw = RawResponse::new(404).body("not found");

        let response = interpret(raw, config(ResponseType::Stream)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.ok);
        let mut body = response.data.into_stream().expect("stream data");
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from_static(b"not found"));
    }

    #[tokio::test]
    async fn test_stream_mode_ignores_rejecting_validator() {
        let options = config(ResponseType::Stream).validate_status(|_| false);
        let response = interpret(RawResponse::new(200), options).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_fields_are_copied() {
        let raw = RawResponse::new(201)
            .status_text("Created")
            .url("http://x/final")
            .redirected(true)
            .kind("basic")
            .header("x-id", "7");

        let response = interpret(raw, config(ResponseType::Text)).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.status_text, "Created");
        assert!(response.ok);
        assert_eq!(response.url, "http://x/final");
        assert!(response.redirected);
        assert_eq!(response.kind, "basic");
        assert_eq!(response.headers.get("x-id").as_deref(), Some("7"));
        assert_eq!(response.config.response_type, Some(ResponseType::Text));
    }

    #[tokio::test]
    async fn test_rejected_status_carries_response() {
        let raw = RawResponse::new(404).body(r#"{"error":"missing"}"#);

        let err = interpret(raw, config(ResponseType::Text)).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        let response = err.response().unwrap();
        assert_eq!(response.data.as_json(), Some(&json!({"error": "missing"})));
    }

    #[tokio::test]
    async fn test_validator_overrides_ok_flag() {
        let accept_404 = RequestOptions::new().validate_status(|status| status == 404);
        let response = interpret(RawResponse::new(404), accept_404).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.ok);

        let reject_all = RequestOptions::new().validate_status(|_| false);
        let err = interpret(RawResponse::new(200), reject_all).await.unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn test_body_read_failure_propagates() {
        let body: BodyStream = Box::pin(stream::iter(vec![Err::<Bytes, _>(TransportError::Body("reset".into()))]));
        let raw = RawResponse::new(200).stream(body);

        let err = interpret(raw, config(ResponseType::Text)).await.unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Body(_))));
    }

    #[tokio::test]
    async fn test_body_abort_surfaces_as_aborted() {
        let body: BodyStream = Box::pin(stream::iter(vec![Err::<Bytes, _>(TransportError::Aborted)]));
        let raw = RawResponse::new(200).stream(body);

        let err = interpret(raw, config(ResponseType::Text)).await.unwrap_err();

        assert!(matches!(err, Error::Aborted));
    }

    #[test]
    fn test_is_success_defaults_to_ok_flag() {
        assert!(is_success(200, true, None));
        assert!(!is_success(500, false, None));
        let validator = StatusValidator::new(|s| s < 500);
        assert!(is_success(404, false, Some(&validator)));
    }
}
