use std::sync::Arc;

use echobin::config::{AppState, Config};
use echobin::routing::RouteTable;
use echobin::{echo, logger, server};
use tokio::sync::Notify;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;

    // Handler futures are not `Send`: every connection is a local task, so a
    // single-threaded runtime serves them all
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let mut routes = RouteTable::new();
    echo::register_routes(&mut routes, &cfg)?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg, routes));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    let local = tokio::task::LocalSet::new();
    local.run_until(server::serve(listener, state, shutdown)).await;

    tracing::info!("server stopped");
    Ok(())
}
