// Server module entry point
// Listener setup, connection handling, the accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is named server_loop
#[path = "loop.rs"]
pub mod server_loop;

pub use connection::serve_request;
pub use listener::create_reusable_listener;
pub use server_loop::serve;
pub use signal::start_signal_handler;
