//! Error types for the `sancert` core library.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for certificate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request body is valid JSON but not a sanitization event.
    #[error("Invalid sanitization event: {0}")]
    InvalidEvent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// PDF assembly or serialization error
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while serializing the PDF
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
