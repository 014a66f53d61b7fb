//! Error types
//!
//! Three failure classes exist: route configuration errors (fail fast at
//! startup), handler errors (always turned into a 500 page by the
//! dispatcher), and logger setup errors.

use thiserror::Error;

/// Boxed error used by request bodies and subscriber setup.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Route registration errors
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failures raised while a handler extracts request data or builds a response
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to read request body: {0}")]
    Body(#[source] BoxError),

    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("malformed form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("unsupported form content type: {0}")]
    UnsupportedFormType(String),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    HeaderValue(#[from] hyper::header::InvalidHeaderValue),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("asset i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handler panicked: {0}")]
    Panic(String),
}

/// Logger initialization errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install log subscriber: {0}")]
    Init(#[source] BoxError),
}
