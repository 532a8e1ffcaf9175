use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error as ThisError;

/// Field-keyed validation messages, as the collaboration service returns
/// them in HTTP 422 bodies: `{"errors": {"field": ["message", ...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// All messages across all fields, joined for user-facing display.
    pub fn joined(&self) -> String {
        self.errors.values().flatten().cloned().collect::<Vec<_>>().join("; ")
    }

    pub fn is_empty(&self) -> bool {
        self.errors.values().all(|msgs| msgs.is_empty())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined())
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(ValidationErrors),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("business error: {0}")]
    Business(String),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the same request unchanged could succeed.
    /// Validation, permission and local-rule failures will not; transport
    /// and server-side failures might.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Validation(_) | Error::Permission(_) | Error::Business(_) | Error::Config(_) => false,
            Error::Transport(_) => true,
            Error::Api { status, .. } => *status >= 500,
        }
    }
}
