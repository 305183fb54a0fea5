// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Client error types with normalized `{code, message}` pairs.

use serde::{Deserialize, Serialize};

/// Error surfaced to callers of the API client, services and session store.
///
/// Every variant carries a human-readable message suitable for showing
/// inline and in a toast. The type is `Clone` because a single refresh
/// failure is delivered to every request queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("{0}")]
    Transport(String),

    /// The access token expired and could not be refreshed.
    #[error("{0}")]
    SessionExpired(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid request body: {0}")]
    Encode(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    pub const INVALID_CREDENTIALS: &'static str = "INVALID_CREDENTIALS";
    pub const EMAIL_EXISTS: &'static str = "EMAIL_EXISTS";
    pub const WEAK_PASSWORD: &'static str = "WEAK_PASSWORD";
    pub const UNAUTHORIZED: &'static str = "UNAUTHORIZED";
    pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";
    pub const SESSION_EXPIRED: &'static str = "SESSION_EXPIRED";
    pub const DECODE_ERROR: &'static str = "DECODE_ERROR";
    pub const ENCODE_ERROR: &'static str = "ENCODE_ERROR";
    pub const STORAGE_ERROR: &'static str = "STORAGE_ERROR";

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            ClientError::Api { code, .. } => code,
            ClientError::Transport(_) => Self::NETWORK_ERROR,
            ClientError::SessionExpired(_) => Self::SESSION_EXPIRED,
            ClientError::Decode(_) => Self::DECODE_ERROR,
            ClientError::Encode(_) => Self::ENCODE_ERROR,
            ClientError::Storage(_) => Self::STORAGE_ERROR,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalized `{code, message}` pair.
    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }

    /// Build an error from a failed response's status and raw body.
    ///
    /// A structured body contributes its `message` (and `code` when
    /// present); otherwise the status reason phrase is used.
    pub fn from_response_body(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();

        let code = parsed
            .as_ref()
            .and_then(|b| b.code.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| match status.as_u16() {
                401 => Self::UNAUTHORIZED.to_string(),
                other => format!("HTTP_{}", other),
            });

        let message = parsed
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());

        ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }

    /// Normalize a transport-level failure.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        tracing::debug!(error = %err, "Transport error");
        if err.is_timeout() {
            ClientError::Transport("Request timed out".to_string())
        } else if err.is_connect() {
            ClientError::Transport("Network Error".to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Normalized authentication/API error pair shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Structured error body as sent by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_structured_body_is_unwrapped() {
        let err = ClientError::from_response_body(
            StatusCode::CONFLICT,
            r#"{"status":"error","code":"EMAIL_EXISTS","message":"Email is already registered."}"#,
        );

        assert_eq!(err.code(), ClientError::EMAIL_EXISTS);
        assert_eq!(err.to_string(), "Email is already registered.");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_unstructured_body_falls_back_to_reason() {
        let err = ClientError::from_response_body(StatusCode::BAD_GATEWAY, "<html>oops</html>");

        assert_eq!(err.code(), "HTTP_502");
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_empty_message_falls_back_to_reason() {
        let err = ClientError::from_response_body(StatusCode::UNAUTHORIZED, r#"{"message":""}"#);

        assert_eq!(err.code(), ClientError::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_to_api_error() {
        let err = ClientError::Transport("Network Error".to_string());
        let pair = err.to_api_error();

        assert_eq!(pair.code, ClientError::NETWORK_ERROR);
        assert_eq!(pair.message, "Network Error");
    }
}
