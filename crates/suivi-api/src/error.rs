//! Error types for the API client
//!
//! Covers:
//! - transport failures (connection, timeout, TLS)
//! - non-success HTTP statuses, with authentication failures split out
//! - bodies that are not the expected shape
//! - session tokens that cannot be read

use suivi_model::DecodeError;

/// Main API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint path
        endpoint: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Token rejected
    #[error("not authorized for {endpoint} (HTTP {status})")]
    Unauthorized {
        /// Endpoint path
        endpoint: String,
        /// 401 or 403
        status: u16,
    },

    /// Any other non-success status
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        /// Endpoint path
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Server-provided message, if any
        message: String,
    },

    /// Body was not valid JSON
    #[error("invalid JSON from {endpoint}: {source}")]
    Json {
        /// Endpoint path
        endpoint: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// Listing body had the wrong shape
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Base URL could not be used
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),

    /// Login answered without a usable token
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Whether the user must sign in again
    #[inline]
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Session(_))
    }

    /// Whether the failure happened before any response was received
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Errors reading a session token
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Not three dot-separated segments
    #[error("token is not a JWT")]
    MalformedToken,

    /// Payload segment is not base64url
    #[error("token payload is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Payload is not a JSON claims object
    #[error("token claims are invalid: {0}")]
    Claims(#[from] serde_json::Error),

    /// Neither the claims nor the login response name the user
    #[error("token does not identify a user")]
    MissingMatricule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_auth() {
        let err = ApiError::Unauthorized {
            endpoint: "/projets".into(),
            status: 401,
        };
        assert!(err.is_auth());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[test]
    fn status_is_not_auth() {
        let err = ApiError::Status {
            endpoint: "/projets".into(),
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_auth());
        assert_eq!(err.to_string(), "/projets returned HTTP 500: boom");
    }

    #[test]
    fn session_errors_are_auth() {
        let err = ApiError::from(SessionError::MissingMatricule);
        assert!(err.is_auth());
    }
}
