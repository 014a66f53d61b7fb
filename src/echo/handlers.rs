//! Echo route handlers
//!
//! Each handler reflects some part of the incoming request back as JSON.

use super::extract::{self, extract_headers, extract_origin};
use crate::error::HandlerError;
use crate::handler::{HandlerFuture, RequestContext};
use crate::http::{self, cache};
use chrono::Utc;
use hyper::header::{HeaderValue, ETAG, LAST_MODIFIED, USER_AGENT};
use hyper::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

type StringMap = BTreeMap<String, String>;

#[derive(Debug, Serialize)]
struct OriginBody {
    origin: String,
}

#[derive(Debug, Serialize)]
struct UserAgentBody<'a> {
    user_agent: Option<&'a str>,
}

/// Body of `/get` and `/cache`
#[derive(Debug, Serialize)]
struct GetBody {
    args: StringMap,
    headers: StringMap,
    origin: String,
    url: String,
}

/// Body of the methods carrying a form payload
#[derive(Debug, Serialize)]
struct FormBody {
    args: StringMap,
    formdata: StringMap,
    headers: StringMap,
    origin: String,
    url: String,
}

fn origin(ctx: &RequestContext) -> String {
    extract_origin(ctx.headers(), &ctx.config().http.client_ip_header)
}

fn get_body(ctx: &RequestContext) -> Result<GetBody, HandlerError> {
    let url = extract::request_url(ctx)?;
    Ok(GetBody {
        args: extract::query_args(ctx),
        headers: extract_headers(ctx.headers()),
        origin: origin(ctx),
        url: url.into(),
    })
}

/// `GET /`
pub fn index(_ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async { Ok(http::build_html_response(StatusCode::OK, "Hello, world!")) })
}

/// `GET /headers`
pub fn headers(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        http::build_json_response(StatusCode::OK, &extract_headers(ctx.headers()))
    })
}

/// `GET /ip`
pub fn ip(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        http::build_json_response(StatusCode::OK, &OriginBody { origin: origin(ctx) })
    })
}

/// `GET /user-agent`
pub fn user_agent(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let body = UserAgentBody {
            user_agent: ctx.header_str(USER_AGENT),
        };
        http::build_json_response(StatusCode::OK, &body)
    })
}

/// `GET /get`
pub fn get(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move { http::build_json_response(StatusCode::OK, &get_body(ctx)?) })
}

/// `POST /post`, `PUT /put`, `PATCH /patch` and `DELETE /delete`
pub fn form(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let formdata = extract::form_data(ctx).await?;
        let GetBody {
            args,
            headers,
            origin,
            url,
        } = get_body(ctx)?;

        let body = FormBody {
            args,
            formdata,
            headers,
            origin,
            url,
        };
        http::build_json_response(StatusCode::OK, &body)
    })
}

/// `GET /cache`
///
/// Conditional requests are always answered 304. Otherwise the `/get` body
/// with a fresh `Last-Modified` and a random `ETag`.
pub fn cache(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        if cache::has_conditional_headers(ctx.headers()) {
            return Ok(http::build_304_response(None));
        }

        let body = get_body(ctx)?;
        let last_modified = HeaderValue::from_str(&cache::http_date(Utc::now()))?;
        let etag = HeaderValue::from_str(&cache::generate_random_etag())?;

        let headers = ctx.response_headers_mut();
        headers.insert(LAST_MODIFIED, last_modified);
        headers.insert(ETAG, etag);

        http::build_json_response(StatusCode::OK, &body)
    })
}
