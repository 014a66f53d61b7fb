//! Echo service
//!
//! The fixed route surface reflecting requests back to the caller.

pub mod extract;
pub mod handlers;

use crate::config::Config;
use crate::error::RouteError;
use crate::handler::static_files::{self, CATCH_ALL_PATTERN};
use crate::routing::{MethodPattern, PathPattern, RouteTable};

/// Register the echo routes, in matching order
///
/// The static asset catch-all goes last so it only sees unmatched paths.
pub fn register_routes(routes: &mut RouteTable, config: &Config) -> Result<(), RouteError> {
    routes
        .get("/", handlers::index)
        .get("/headers", handlers::headers)
        .get("/ip", handlers::ip)
        .get("/user-agent", handlers::user_agent)
        .get("/get", handlers::get)
        .post("/post", handlers::form)
        .put("/put", handlers::form)
        .patch("/patch", handlers::form)
        .delete("/delete", handlers::form)
        .get("/cache", handlers::cache);

    if config.assets.dir.is_some() {
        routes.register(
            MethodPattern::Any,
            PathPattern::regex(CATCH_ALL_PATTERN)?,
            static_files::serve_asset,
        );
    }

    tracing::debug!(routes = routes.len(), "echo routes registered");
    Ok(())
}
