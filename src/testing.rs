//! Test helpers shared by unit tests

use crate::config::{AppState, Config};
use crate::handler::{boxed_body, HandlerFuture, RequestBody, RequestContext};
use crate::http;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

pub fn state(routes: crate::routing::RouteTable) -> Arc<AppState> {
    state_with_config(Config::default(), routes)
}

pub fn state_with_config(config: Config, routes: crate::routing::RouteTable) -> Arc<AppState> {
    Arc::new(AppState::new(config, routes))
}

pub fn empty_body() -> RequestBody {
    boxed_body(Full::new(Bytes::new()))
}

pub fn request(method: &str, uri: &str) -> Request<RequestBody> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(empty_body())
        .unwrap()
}

pub fn request_with_body(method: &str, uri: &str, body: &'static str) -> Request<RequestBody> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(boxed_body(Full::new(Bytes::from_static(body.as_bytes()))))
        .unwrap()
}

pub async fn body_string(response: Response<Full<Bytes>>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

/// Handler answering 200 with a fixed text body
pub fn text_handler(
    body: &'static str,
) -> impl for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static {
    move |_ctx| Box::pin(async move { Ok(http::build_text_response(StatusCode::OK, body)) })
}
