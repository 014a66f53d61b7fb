// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop on the current `LocalSet`
///
/// Returns once `shutdown` is notified and every open connection has
/// finished, or `performance.write_timeout` has elapsed since shutdown.
pub async fn serve(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_accept_error(&e),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on open connections
    drop(listener);
    let grace = Duration::from_secs(state.config.performance.write_timeout);
    drain_connections(&active_connections, grace).await;
}

/// Wait until the counter reaches zero or `grace` elapses
async fn drain_connections(active: &AtomicUsize, grace: Duration) {
    logger::log_shutdown(active.load(Ordering::SeqCst));

    let deadline = tokio::time::Instant::now() + grace;
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(
                remaining = active.load(Ordering::SeqCst),
                "drain deadline reached, closing remaining connections"
            );
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
    tracing::info!("all connections drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::echo;
    use crate::routing::RouteTable;
    use crate::server::create_reusable_listener;
    use crate::testing;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::task::LocalSet;

    async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let config = Config::default();
        let mut routes = RouteTable::new();
        echo::register_routes(&mut routes, &config).unwrap();
        let state = testing::state_with_config(config, routes);

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());

        LocalSet::new()
            .run_until(async move {
                let server = tokio::task::spawn_local(serve(listener, state, Arc::clone(&shutdown)));

                let response = roundtrip(
                    addr,
                    "GET /get?a=1 HTTP/1.1\r\nHost: echo.test\r\nConnection: close\r\n\r\n",
                )
                .await;
                let lower = response.to_ascii_lowercase();
                assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
                assert!(lower.contains("server: echobin"), "{response}");
                assert!(response.contains("\"url\": \"http://echo.test/get?a=1\""));

                let response = roundtrip(
                    addr,
                    "GET /nope HTTP/1.1\r\nHost: echo.test\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
                assert!(response.ends_with("Not found"));

                shutdown.notify_one();
                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .unwrap()
                    .unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        tokio::time::timeout(
            Duration::from_secs(1),
            drain_connections(&active, Duration::from_secs(30)),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_drain_gives_up_at_deadline() {
        let active = AtomicUsize::new(1);
        drain_connections(&active, Duration::from_millis(120)).await;
        assert_eq!(active.load(Ordering::SeqCst), 1);
    }
}
