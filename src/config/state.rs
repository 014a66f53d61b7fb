// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::routing::RouteTable;

/// Application state
///
/// Built once before the listener starts and never mutated afterwards, so
/// concurrent dispatches read it through an `Arc` without locking.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub const fn new(config: Config, routes: RouteTable) -> Self {
        Self { config, routes }
    }
}
