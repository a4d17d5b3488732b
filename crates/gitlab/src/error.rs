//! Error types for GitLab API operations.
//!
//! Errors are categorized so the CLI can print actionable advice next to
//! the raw response the server sent back.

use std::fmt;

/// Result type alias for GitLab operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of GitLab errors for operator feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection failures and timeouts.
    Network,
    /// The token was rejected or lacks the `api` scope.
    Auth,
    /// Project or variable does not exist.
    NotFound,
    /// The server refused the payload (validation, duplicate key, ...).
    Rejected,
    /// Server-side failure.
    Server,
    /// Response body could not be decoded.
    Format,
    /// Client was configured incorrectly.
    Config,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Project or variable not found",
            Self::Rejected => "Request rejected by GitLab",
            Self::Server => "GitLab server error",
            Self::Format => "Unexpected response format",
            Self::Config => "Invalid client configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your connection and the API URL, then try again",
            Self::Auth => "Use a personal access token with the 'api' scope",
            Self::NotFound => "Verify the project ID and that the token can see the project",
            Self::Rejected => "Read the response above; GitLab names the offending field",
            Self::Server => "Try again later",
            Self::Format => "Check that the API URL points at a GitLab v4 API",
            Self::Config => "Pass --project and --token, or set them in the config file",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to GitLab.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-success HTTP status. The body is kept exactly as received.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// Invalid response from the API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed client settings.
    #[error("{0}")]
    InvalidConfig(String),
}

impl Error {
    /// Raw response body, if the server answered.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Classify this error for operator feedback.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { status, .. } => match *status {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                500.. => ErrorCategory::Server,
                _ => ErrorCategory::Rejected,
            },
            Error::Transport(_) => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::InvalidConfig(_) => ErrorCategory::Config,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                status: code,
                body: String::new(),
            },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
