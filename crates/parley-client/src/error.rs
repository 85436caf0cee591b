use thiserror::Error;

use parley_shared::error::ProtocolError;

/// Errors produced by the client layer.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure talking to the chat backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server responded {status} for {url}")]
    Status { status: u16, url: String },

    /// The configured server URL cannot be joined with an API path.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// A real-time event could not be decoded.
    #[error("Event error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
