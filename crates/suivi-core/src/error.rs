//! Error types for Suivi core

use suivi_api::ApiError;

/// Errors loading a screen
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    /// One of the screen's fetches failed
    #[error("{screen}: {source}")]
    Fetch {
        /// Screen being loaded
        screen: &'static str,
        /// Failed request
        #[source]
        source: ApiError,
    },
}

impl ScreenError {
    /// Wrap an API failure for `screen`
    #[inline]
    #[must_use]
    pub fn fetch(screen: &'static str, source: ApiError) -> Self {
        Self::Fetch { screen, source }
    }

    /// Whether the user must sign in again
    #[inline]
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Fetch { source, .. } if source.is_auth())
    }

    /// Message suitable for display next to an empty screen
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { source, .. } if source.is_auth() => {
                "Session expired, please sign in again".to_string()
            }
            Self::Fetch { source, .. } if source.is_transport() => {
                "Server unreachable, try refreshing later".to_string()
            }
            Self::Fetch { .. } => "Could not load data from the server".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_require_login() {
        let err = ScreenError::fetch(
            "phases",
            ApiError::Unauthorized {
                endpoint: "projets/phases".into(),
                status: 401,
            },
        );
        assert!(err.requires_login());
        assert_eq!(err.user_message(), "Session expired, please sign in again");
    }

    #[test]
    fn server_errors_do_not_require_login() {
        let err = ScreenError::fetch(
            "admin",
            ApiError::Status {
                endpoint: "utilisateurs".into(),
                status: 500,
                message: String::new(),
            },
        );
        assert!(!err.requires_login());
        assert!(err.to_string().starts_with("admin: "));
    }
}
