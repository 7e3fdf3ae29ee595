//! Client error types

use lavacar_core::{ApiError, ValidationErrors};
use thiserror::Error;

/// Everything that can go wrong inside the client, before it is flattened
/// into the uniform [`ApiError`] handed to callers.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-2xx status
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// The caller cancelled the request
    #[error("Request canceled")]
    Canceled,

    /// Body rejected locally before sending
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Refresh exchange failed, credentials were wiped
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Successful response whose body does not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and raw response body.
    ///
    /// The server message is read from a JSON `message` field, falling back
    /// to `error`.
    pub fn from_status(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| json.get(key).and_then(|v| v.as_str()).map(str::to_owned))
            });

        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Canceled => Self::canceled(),
            ClientError::Status { status, message } => Self::http(Some(status), message),
            ClientError::Validation(errors) => errors.into(),
            ClientError::SessionExpired(_) => Self::session_expired(),
            ClientError::Request(e) => match e.status() {
                Some(status) => Self::http(Some(status.as_u16()), None),
                None => Self::internal(e),
            },
            ClientError::Serialization(e) => Self::internal(e),
            ClientError::UnexpectedResponse(message) | ClientError::Configuration(message) => {
                Self::internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_reads_server_message() {
        let err = ClientError::from_status(
            StatusCode::CONFLICT,
            r#"{"message":"Placa já cadastrada"}"#.as_bytes(),
        );
        let api: ApiError = err.into();
        assert_eq!(api.code, 409);
        assert_eq!(api.message, "Placa já cadastrada");
    }

    #[test]
    fn status_without_json_uses_generic_message() {
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.status(), Some(502));
        let api: ApiError = err.into();
        assert_eq!(api.message, ApiError::REQUEST_FAILED);
    }

    #[test]
    fn uniform_shapes() {
        assert_eq!(ApiError::from(ClientError::Canceled).code, 0);
        assert_eq!(
            ApiError::from(ClientError::SessionExpired("refresh returned 401".into())),
            ApiError::session_expired()
        );

        let decode = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let api = ApiError::from(ClientError::from(decode));
        assert_eq!(api.code, 500);
        assert!(api.data.is_some());
    }
}
