// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 requests on them

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Request, Response};
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config::{AppState, Config};
use crate::error::BoxError;
use crate::handler::{self, boxed_body};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Accept a connection, enforcing `performance.max_connections`
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_connection_rejected(&peer_addr, prev_count, max_conn);
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection on a local task
///
/// The counter is decremented when the connection ends, whatever the outcome.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let timeout_duration = Duration::from_secs(
            perf.read_timeout
                .max(perf.write_timeout)
                .max(perf.keep_alive_timeout),
        );

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(perf.read_timeout))
            .keep_alive(perf.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_connection_timeout(timeout_duration.as_secs()),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Serve a single request: size check, dispatch, `Server` header, access log
pub async fn serve_request<B>(
    request: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let config = &state.config;
    let (head, body) = request.into_parts();

    logger::log_headers(&head.headers, config.logging.show_headers);
    let entry = config.logging.access_log.then(|| {
        AccessLogEntry::from_request(client_addr(&head.headers, peer_addr, config), &head)
    });

    let mut response = match check_body_size(&head.headers, config.http.max_body_size) {
        Some(response) => response,
        None => {
            let request = Request::from_parts(head, boxed_body(body));
            handler::dispatch(Arc::clone(&state), request).await
        }
    };

    match HeaderValue::from_str(&config.http.server_name) {
        Ok(server) => {
            response.headers_mut().insert(SERVER, server);
        }
        Err(_) => tracing::warn!(
            server_name = %config.http.server_name,
            "server name is not a valid header value"
        ),
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Address reported in the access log: trusted proxy header, else the peer
fn client_addr(headers: &HeaderMap, peer_addr: SocketAddr, config: &Config) -> String {
    headers
        .get(config.http.client_ip_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| peer_addr.ip().to_string(), str::to_string)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            tracing::warn!("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                tracing::warn!(size, max_body_size, "request body too large");
                Some(http::build_413_response())
            }
            Err(_) => {
                tracing::warn!(
                    value = size_str,
                    "invalid Content-Length value, skipping size check"
                );
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echo;
    use crate::routing::RouteTable;
    use crate::testing::{self, body_json, body_string};
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "192.0.2.10:50000".parse().unwrap()
    }

    fn echo_state(config: Config) -> Arc<AppState> {
        let mut routes = RouteTable::new();
        echo::register_routes(&mut routes, &config).unwrap();
        testing::state_with_config(config, routes)
    }

    fn full_request(method: &str, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_LENGTH, body.len())
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_every_response_has_server_header() {
        let state = echo_state(Config::default());
        for uri in ["/", "/get", "/missing"] {
            let response = serve_request(full_request("GET", uri, ""), peer(), Arc::clone(&state))
                .await
                .unwrap();
            assert_eq!(response.headers().get(SERVER).unwrap(), "echobin", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_oversized_body_rejected_before_dispatch() {
        let mut config = Config::default();
        config.http.max_body_size = 8;
        let state = echo_state(config);

        let response = serve_request(
            full_request("POST", "/post", "payload=too-long"),
            peer(),
            Arc::clone(&state),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers().get(SERVER).unwrap(), "echobin");

        let response = serve_request(full_request("POST", "/post", "a=b"), peer(), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["formdata"]["a"], "b");
    }

    #[tokio::test]
    async fn test_custom_server_name() {
        let mut config = Config::default();
        config.http.server_name = "inspector/2".to_string();
        config.logging.access_log = false;
        let state = echo_state(config);

        let response = serve_request(full_request("GET", "/", ""), peer(), state)
            .await
            .unwrap();
        assert_eq!(response.headers().get(SERVER).unwrap(), "inspector/2");
        assert_eq!(body_string(response).await, "Hello, world!");
    }

    #[test]
    fn test_check_body_size() {
        let mut headers = HeaderMap::new();
        assert!(check_body_size(&headers, 10).is_none());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_body_size(&headers, 10).is_none());

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("11"));
        let response = check_body_size(&headers, 10).unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert!(check_body_size(&headers, 10).is_none());
    }

    #[test]
    fn test_client_addr_prefers_proxy_header() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        assert_eq!(client_addr(&headers, peer(), &config), "192.0.2.10");

        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.1"));
        assert_eq!(client_addr(&headers, peer(), &config), "203.0.113.1");
    }
}
