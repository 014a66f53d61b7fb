//! Route table module
//!
//! Append-only, ordered list of routes built once at startup.

use super::pattern::{MethodPattern, PathPattern};
use crate::handler::{Handler, HandlerFuture, RequestContext};
use hyper::Method;
use std::fmt;

/// A registered (method, path, handler) triple
pub struct Route {
    method: MethodPattern,
    path: PathPattern,
    handler: Box<dyn Handler>,
}

impl Route {
    pub const fn method(&self) -> MethodPattern {
        self.method
    }

    pub const fn path(&self) -> &PathPattern {
        &self.path
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Both the method and the (already normalized) path must match
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.path.matches(path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered route table; earlier registrations win
#[derive(Default, Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Duplicates are kept; the first one shadows the rest.
    pub fn register<P, H>(&mut self, method: MethodPattern, path: P, handler: H) -> &mut Self
    where
        P: Into<PathPattern>,
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        let route = Route {
            method,
            path: path.into(),
            handler: Box::new(handler),
        };
        tracing::debug!(method = %route.method, path = %route.path, "route registered");
        self.routes.push(route);
        self
    }

    pub fn get<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Get, path, handler)
    }

    pub fn post<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Post, path, handler)
    }

    pub fn put<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Put, path, handler)
    }

    pub fn patch<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Patch, path, handler)
    }

    pub fn delete<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Delete, path, handler)
    }

    pub fn any<H>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: for<'c> Fn(&'c mut RequestContext) -> HandlerFuture<'c> + Send + Sync + 'static,
    {
        self.register(MethodPattern::Any, path, handler)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
