//! HTTP response building module
//!
//! Constructors used by handlers and the dispatcher, decoupled from routing.

use crate::error::HandlerError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG};
use hyper::{HeaderMap, Response, StatusCode};
use serde::Serialize;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Status and headers for [`end`]
#[derive(Debug, Clone)]
pub struct ResponseInit {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl Default for ResponseInit {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

impl From<StatusCode> for ResponseInit {
    fn from(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Raw response: body and init passed through unchanged
pub fn end(body: impl Into<Bytes>, init: impl Into<ResponseInit>) -> Response<Full<Bytes>> {
    let init = init.into();
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = init.status;
    *response.headers_mut() = init.headers;
    response
}

/// Build JSON response (pretty-printed)
pub fn build_json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, HandlerError> {
    let json = serde_json::to_string_pretty(body)?;
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .body(Full::new(Bytes::from(json)))?)
}

/// Build generic HTML response
pub fn build_html_response(
    status: StatusCode,
    content: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    build_typed_response(status, TEXT_HTML, content.into())
}

/// Build plain text response
pub fn build_text_response(
    status: StatusCode,
    content: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    build_typed_response(status, TEXT_PLAIN, content.into())
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    if let Some(etag) = etag {
        builder = builder.header(ETAG, etag);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "Not found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
}

/// Build 500 response around a rendered error page
pub fn build_500_response(page: String) -> Response<Full<Bytes>> {
    build_html_response(StatusCode::INTERNAL_SERVER_ERROR, page)
}

/// Build a static asset response
pub fn build_asset_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    cache_control: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header("Content-Length", content_length)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_typed_response(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static(content_type));
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(status, error = %error, "failed to build response");
}
