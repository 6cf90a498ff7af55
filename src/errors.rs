//! Unified error types for the bots.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors that reach the
//! Discord layer are rendered as plain text for the invoking user; none of them is
//! fatal to the process.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Malformed command arguments supplied by a user.
    #[error("{message}")]
    InvalidInput {
        /// Message shown to the user, usually including the expected format
        message: String,
    },

    /// A paginated view was constructed with a page size of zero.
    #[error("Page size must be positive")]
    InvalidPageSize,

    /// A lookup that the caller required to succeed found nothing.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing thing
        what: String,
    },

    /// A remote API answered with an error status.
    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    External {
        /// Name of the remote service (e.g. "drive", "sheets")
        service: &'static str,
        /// HTTP status, when one was received
        status: Option<u16>,
        /// Body or description returned by the service
        message: String,
    },

    /// Obtaining a Google access token failed.
    #[error("Authentication error: {message}")]
    Auth {
        /// What went wrong
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether the failure is a server-side overload/unavailable condition that is
    /// safe to retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::External {
                status: Some(status),
                ..
            } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Shorthand for building an [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn external(status: Option<u16>) -> Error {
        Error::External {
            service: "drive",
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_overload_statuses_are_transient() {
        for status in [429, 500, 502, 503, 504] {
            assert!(external(Some(status)).is_transient(), "status {status}");
        }
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        for status in [400, 401, 403, 404] {
            assert!(!external(Some(status)).is_transient(), "status {status}");
        }
        assert!(!external(None).is_transient());
        assert!(!Error::invalid_input("bad").is_transient());
    }

    #[test]
    fn test_external_display_includes_status() {
        assert_eq!(
            external(Some(503)).to_string(),
            "drive request failed with status 503: boom"
        );
        assert_eq!(external(None).to_string(), "drive request failed: boom");
    }
}
