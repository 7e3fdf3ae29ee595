//! Common error types shared across crates

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Core error types that can be shared across crates
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO operation failed: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

/// Uniform error surfaced to every caller of the API client.
///
/// `code` is the HTTP status for server errors, `0` for a cancelled request,
/// `400` for local validation failures and `500` for anything unexpected.
/// Messages are user facing and written in Portuguese.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ApiError {
    pub const CANCELED: &'static str = "Requisição cancelada";
    pub const REQUEST_FAILED: &'static str = "Erro ao processar a requisição";
    pub const SESSION_EXPIRED: &'static str = "Sessão expirada, faça login novamente";
    pub const INTERNAL: &'static str = "Erro interno, tente novamente mais tarde";

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The caller aborted the request
    pub fn canceled() -> Self {
        Self::new(0, Self::CANCELED)
    }

    /// Non-2xx response. A missing status becomes 500 and a missing server
    /// message falls back to a generic one.
    pub fn http(status: Option<u16>, message: Option<String>) -> Self {
        Self::new(
            status.unwrap_or(500),
            message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::REQUEST_FAILED.to_string()),
        )
    }

    /// Local validation failure, all messages joined into one
    pub fn validation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(400, joined)
    }

    /// Refresh failed or no refresh token was available
    pub fn session_expired() -> Self {
        Self::new(401, Self::SESSION_EXPIRED)
    }

    /// Anything that does not fit another category; `detail` lands in `data`
    pub fn internal(detail: impl Display) -> Self {
        Self {
            code: 500,
            message: Self::INTERNAL.to_string(),
            data: Some(detail.to_string()),
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.code == 0
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == 401
    }
}
