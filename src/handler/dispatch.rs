//! Request dispatch module
//!
//! Entry point for request processing: route matching, handler invocation
//! and the error boundary. Every call resolves to a response.

use super::context::{HandlerFuture, RequestBody, RequestContext};
use crate::config::AppState;
use crate::error::HandlerError;
use crate::http::{self, error_page};
use crate::routing;
use futures_util::FutureExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Request, Response};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Dispatch one request through the route table
///
/// - matched route, handler succeeds: its response, plus accumulated headers
/// - matched route, body over `http.max_body_size`: 413
/// - matched route, handler fails or panics: 500 diagnostic page
/// - no route: 404 "Not found"
pub async fn dispatch(
    state: Arc<AppState>,
    request: Request<RequestBody>,
) -> Response<Full<Bytes>> {
    let Some(route) = routing::match_route(&state.routes, request.method(), request.uri().path())
    else {
        tracing::debug!(method = %request.method(), uri = %request.uri(), "no route matched");
        return http::build_404_response();
    };

    tracing::trace!(
        method = %request.method(),
        uri = %request.uri(),
        route = %route.path(),
        "route matched"
    );

    let mut ctx = RequestContext::new(request, Arc::clone(&state));
    let outcome = run_handler(route.handler().call(&mut ctx)).await;

    match outcome {
        Ok(response) => merge_headers(response, &ctx.take_response_headers()),
        Err(HandlerError::BodyTooLarge(limit)) => {
            tracing::warn!(uri = %ctx.uri(), limit, "request body too large");
            http::build_413_response()
        }
        Err(err) => failure_response(&ctx, &err),
    }
}

/// Await a handler, folding panics into `HandlerError::Panic`
async fn run_handler(future: HandlerFuture<'_>) -> Result<Response<Full<Bytes>>, HandlerError> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Append accumulator headers; values already on the response are kept
fn merge_headers(
    mut response: Response<Full<Bytes>>,
    accumulated: &HeaderMap,
) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    for (name, value) in accumulated {
        headers.append(name.clone(), value.clone());
    }
    response
}

fn failure_response(ctx: &RequestContext, err: &HandlerError) -> Response<Full<Bytes>> {
    tracing::error!(
        method = %ctx.method(),
        uri = %ctx.uri(),
        error = %err,
        "handler failed"
    );
    let page = error_page::render_error_page(ctx.head(), err, ctx.config().http.error_details);
    http::build_500_response(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{MethodPattern, PathPattern, RouteTable};
    use crate::testing::{self, body_string, text_handler};
    use futures_util::future::join_all;
    use hyper::header::{CONTENT_TYPE, ETAG};
    use hyper::StatusCode;

    fn failing(_ctx: &mut RequestContext) -> HandlerFuture<'_> {
        Box::pin(async { Err(HandlerError::UnsupportedFormType("text/csv".to_string())) })
    }

    fn panicking(_ctx: &mut RequestContext) -> HandlerFuture<'_> {
        Box::pin(async { panic!("boom") })
    }

    fn with_accumulated_headers(ctx: &mut RequestContext) -> HandlerFuture<'_> {
        Box::pin(async move {
            ctx.response_headers_mut().append(ETAG, "from-accumulator".parse()?);
            ctx.response_headers_mut().append("x-extra", "1".parse()?);
            let mut response = http::build_text_response(StatusCode::OK, "ok");
            response.headers_mut().insert(ETAG, "from-handler".parse()?);
            Ok(response)
        })
    }

    fn read_body(ctx: &mut RequestContext) -> HandlerFuture<'_> {
        Box::pin(async move {
            let body = ctx.body_bytes().await?;
            Ok(http::build_text_response(StatusCode::OK, body))
        })
    }

    fn echo_path(ctx: &mut RequestContext) -> HandlerFuture<'_> {
        Box::pin(async move {
            let path = ctx.uri().path().to_string();
            tokio::task::yield_now().await;
            ctx.response_headers_mut().insert("x-path", path.parse()?);
            Ok(http::build_text_response(StatusCode::OK, path))
        })
    }

    #[tokio::test]
    async fn test_dispatch_to_registered_route() {
        let mut routes = RouteTable::new();
        routes
            .get("/a", text_handler("a"))
            .post("/a", text_handler("post a"))
            .get("/b", text_handler("b"));
        let state = testing::state(routes);

        let response = dispatch(Arc::clone(&state), testing::request("GET", "/b")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "b");

        let response = dispatch(state, testing::request("POST", "/a")).await;
        assert_eq!(body_string(response).await, "post a");
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let mut routes = RouteTable::new();
        routes
            .get("/dup", text_handler("first"))
            .get("/dup", text_handler("second"));

        let response = dispatch(testing::state(routes), testing::request("GET", "/dup")).await;
        assert_eq!(body_string(response).await, "first");
    }

    #[tokio::test]
    async fn test_unregistered_path_is_404() {
        let mut routes = RouteTable::new();
        routes.get("/get", text_handler("get"));
        let state = testing::state(routes);

        for (method, path) in [("GET", "/nope"), ("POST", "/get"), ("GET", "/get/")] {
            let response = dispatch(Arc::clone(&state), testing::request(method, path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {path}");
            assert_eq!(body_string(response).await, "Not found");
        }
    }

    #[tokio::test]
    async fn test_user_catch_all_overrides_default_404() {
        let mut routes = RouteTable::new();
        routes.register(
            MethodPattern::Any,
            PathPattern::regex("(.*)").unwrap(),
            text_handler("custom"),
        );

        let response = dispatch(testing::state(routes), testing::request("DELETE", "/x")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "custom");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500_html() {
        let mut routes = RouteTable::new();
        routes.get("/fail", failing);

        let response = dispatch(testing::state(routes), testing::request("GET", "/fail")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = body_string(response).await;
        assert!(body.contains("unsupported form content type: text/csv"));
        assert!(body.contains("/fail"));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500_html() {
        let mut routes = RouteTable::new();
        routes.get("/panic", panicking);

        let response = dispatch(testing::state(routes), testing::request("GET", "/panic")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response
            .headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(body_string(response).await.contains("boom"));
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_is_413() {
        let mut config = crate::config::Config::default();
        config.http.max_body_size = 4;
        let mut routes = RouteTable::new();
        routes.post("/upload", read_body);
        let state = testing::state_with_config(config, routes);

        let request = testing::request_with_body("POST", "/upload", "0123456789");
        let response = dispatch(Arc::clone(&state), request).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let request = testing::request_with_body("POST", "/upload", "0123");
        let response = dispatch(state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "0123");
    }

    #[tokio::test]
    async fn test_accumulated_headers_are_additive() {
        let mut routes = RouteTable::new();
        routes.get("/h", with_accumulated_headers);

        let response = dispatch(testing::state(routes), testing::request("GET", "/h")).await;
        let etags: Vec<_> = response.headers().get_all(ETAG).iter().collect();
        assert_eq!(etags, vec!["from-handler", "from-accumulator"]);
        assert_eq!(response.headers().get("x-extra").unwrap(), "1");
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_isolated() {
        let mut routes = RouteTable::new();
        routes.register(MethodPattern::Get, PathPattern::regex("/r/.*").unwrap(), echo_path);
        let state = testing::state(routes);

        let paths: Vec<String> = (0..64).map(|i| format!("/r/{i}")).collect();
        let responses = join_all(
            paths
                .iter()
                .map(|path| dispatch(Arc::clone(&state), testing::request("GET", path))),
        )
        .await;

        for (path, response) in paths.iter().zip(responses) {
            let header: Vec<_> = response.headers().get_all("x-path").iter().collect();
            assert_eq!(header, vec![path.as_str()]);
            assert_eq!(&body_string(response).await, path);
        }
    }
}
