//! Request handler module
//!
//! Responsible for request dispatch: the per-request context, the handler
//! contract, the error boundary, and the static asset catch-all.

mod context;
mod dispatch;
pub mod static_files;

// Re-export main entry point
pub use context::{
    boxed_body, Handler, HandlerFuture, HandlerResult, RequestBody, RequestContext,
};
pub use dispatch::dispatch;
