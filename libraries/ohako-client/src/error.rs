//! Error types for the OHAKO client.

use thiserror::Error;

/// Errors that can occur when talking to the OHAKO API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Token missing, expired or rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Login rejected
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration rejected because the name is in use
    #[error("Username already taken")]
    UsernameTaken,

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ClientError {
    /// Whether the request failed in transport or on the server, as opposed
    /// to a domain-level rejection or a body the client could not decode.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Request(_)
                | ClientError::ServerUnreachable(_)
                | ClientError::ServerError { .. }
                | ClientError::AuthRequired
        )
    }

    /// Map a failure to send a request.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ClientError::ServerUnreachable(e.to_string())
        } else {
            ClientError::Request(e)
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
