//! Error types for the reconcile crate

use crate::diff::Operation;
use crate::types::VariableKey;
use std::fmt;
use thiserror::Error;

/// Which side of a reconciliation a variable set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOrigin {
    /// Declared by the operator
    Desired,
    /// Reported by the remote
    Observed,
}

impl fmt::Display for SetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desired => write!(f, "desired"),
            Self::Observed => write!(f, "observed"),
        }
    }
}

/// Errors that can occur during reconciliation
#[derive(Error, Debug)]
pub enum Error {
    /// The same composite key appears twice in one set
    #[error("duplicate variable {key} in {origin} state")]
    DuplicateKey { origin: SetOrigin, key: VariableKey },

    /// The remote rejected a change; `message` is its response verbatim
    #[error("failed to {operation} {key}: {message}")]
    Remote {
        operation: Operation,
        key: VariableKey,
        message: String,
    },
}

/// Result type for reconcile operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_message() {
        let err = Error::DuplicateKey {
            origin: SetOrigin::Observed,
            key: VariableKey::new("TOKEN", "prod"),
        };
        assert_eq!(
            err.to_string(),
            "duplicate variable TOKEN (prod) in observed state"
        );
    }

    #[test]
    fn test_remote_message_keeps_body() {
        let err = Error::Remote {
            operation: Operation::Create,
            key: VariableKey::new("TOKEN", "*"),
            message: r#"HTTP 400: {"message":"bad"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"failed to create TOKEN (*): HTTP 400: {"message":"bad"}"#
        );
    }
}
