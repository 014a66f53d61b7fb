//! Route matching module
//!
//! First route, in registration order, whose method and path both match.

use super::table::{Route, RouteTable};
use hyper::Method;

/// Find the first matching route for a given method and path
pub fn match_route<'a>(routes: &'a RouteTable, method: &Method, path: &str) -> Option<&'a Route> {
    let path = normalize_path(path);
    routes.iter().find(|route| route.matches(method, path))
}

/// Strip query string and fragment; an empty path is the root
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    match &path[..end] {
        "" => "/",
        stripped => stripped,
    }
}
