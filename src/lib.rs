//! echobin: an HTTP request inspection service
//!
//! Reflects headers, query arguments, form data, client address and
//! user-agent back to the caller, and answers conditional requests on
//! `/cache`. Requests flow listener -> connection -> dispatcher -> route
//! table -> handler; every path resolves to a response.

pub mod config;
pub mod echo;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

#[cfg(test)]
mod testing;
