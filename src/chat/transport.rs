use std::error::Error;
use thiserror::Error;

/// Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Error raised by chat transports regardless of the underlying chat server.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The chat server could not be reached or rejected the request.
    #[error("chat transport unavailable: {message}")]
    Unavailable {
        /// Human readable summary.
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl TransportError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        TransportError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
