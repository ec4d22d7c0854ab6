// Client-side error taxonomy
use thiserror::Error;

/// Generic message shown when the login endpoint gives no reason
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Try again.";

/// A stored credential could not be decoded into claims.
///
/// Never surfaced to the user: the session clears itself and falls back to anonymous.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed credential: {0}")]
    Malformed(String),

    #[error("Credential is missing the '{0}' claim")]
    MissingClaim(&'static str),

    #[error("Credential role is empty")]
    InvalidRole,
}

/// Login was rejected or could not be completed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("Failed to persist session: {0}")]
    Storage(String),
}

impl AuthError {
    pub fn authentication_failed(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => AuthError::AuthenticationFailed(msg),
            _ => AuthError::AuthenticationFailed(LOGIN_FAILED_MESSAGE.to_string()),
        }
    }

    /// Message suitable for a form-level error line
    pub fn message(&self) -> &str {
        match self {
            AuthError::AuthenticationFailed(msg) => msg,
            AuthError::Storage(_) => LOGIN_FAILED_MESSAGE,
        }
    }
}

/// Fetch or mutation against the backend failed.
///
/// Clone so that one in-flight fetch can hand the same failure to every waiter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetworkError::Decode(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

/// Durable key-value store failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}
