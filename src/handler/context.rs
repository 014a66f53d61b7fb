//! Request context module
//!
//! Per-request state handed to route handlers.

use crate::config::{AppState, Config};
use crate::error::{BoxError, HandlerError};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::AsHeaderName;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Uri};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Request body type seen by handlers
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// Outcome of a handler invocation
pub type HandlerResult = Result<Response<Full<Bytes>>, HandlerError>;

/// Boxed handler future borrowing the request context
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + 'a>>;

/// A route handler
///
/// Implemented for every `fn(&mut RequestContext) -> HandlerFuture<'_>`.
pub trait Handler: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> HandlerFuture<'a>;
}

impl<F> Handler for F
where
    F: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> HandlerFuture<'a> {
        self(ctx)
    }
}

/// Box any byte body into a [`RequestBody`]
pub fn boxed_body<B>(body: B) -> RequestBody
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed_unsync()
}

/// Request context encapsulating information needed for request processing
///
/// Owned by exactly one dispatch. Handlers may push headers into the
/// outgoing accumulator; the dispatcher appends them to the final response.
pub struct RequestContext {
    head: Parts,
    body: Option<RequestBody>,
    state: Arc<AppState>,
    response_headers: HeaderMap,
}

impl RequestContext {
    pub fn new(request: Request<RequestBody>, state: Arc<AppState>) -> Self {
        let (head, body) = request.into_parts();
        Self {
            head,
            body: Some(body),
            state,
            response_headers: HeaderMap::new(),
        }
    }

    pub const fn head(&self) -> &Parts {
        &self.head
    }

    pub const fn method(&self) -> &Method {
        &self.head.method
    }

    pub const fn uri(&self) -> &Uri {
        &self.head.uri
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Header value as a string; `None` when absent or not visible ASCII
    pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Outgoing header accumulator
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub(crate) fn take_response_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.response_headers)
    }

    /// Read the whole request body, bounded by `http.max_body_size`
    ///
    /// The body can only be read once; later calls return empty bytes.
    pub async fn body_bytes(&mut self) -> Result<Bytes, HandlerError> {
        let Some(body) = self.body.take() else {
            return Ok(Bytes::new());
        };
        let limit = usize::try_from(self.config().http.max_body_size).unwrap_or(usize::MAX);

        match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.is::<LengthLimitError>() => Err(HandlerError::BodyTooLarge(limit)),
            Err(e) => Err(HandlerError::Body(e)),
        }
    }
}
