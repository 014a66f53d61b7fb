//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from routing:
//! response constructors, cache helpers, MIME detection and the 500 page.

pub mod cache;
pub mod error_page;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_413_response, build_500_response,
    build_asset_response, build_html_response, build_json_response, build_text_response, end,
    ResponseInit,
};
