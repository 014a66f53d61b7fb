//! Routing module
//!
//! Provides the ordered route table and the first-match-wins matcher:
//! - Method matching (exact or ANY)
//! - Path matching (literal or anchored regex)
//! - Registration order as the only tie-break

mod matcher;
mod pattern;
mod table;

pub use matcher::{match_route, normalize_path};
pub use pattern::{MethodPattern, PathPattern};
pub use table::{Route, RouteTable};
