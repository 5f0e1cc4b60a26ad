//! Error types for the Limpet file server

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the Limpet file server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// Hyper connection/protocol errors
    #[error("connection error: {0}")]
    Hyper(#[from] hyper::Error),

    /// Invalid HTTP request
    #[error("invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// The underlying directory responder failed
    #[error("responder error: {0}")]
    Responder(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
