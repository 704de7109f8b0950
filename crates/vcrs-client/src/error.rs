//! Client error types.

use thiserror::Error;

/// Errors that can occur while talking to the complaint service or
/// driving a page flow.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS,
    /// unreadable body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The service rejected the session token (401 or 403).
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// No usable session is stored for the requested operation.
    #[error("No active session")]
    MissingSession,

    /// The current page does not carry the control that raised the event.
    #[error("Control not present on page: {0}")]
    ControlNotPresent(String),

    /// Session storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A view template failed to render.
    #[error("Template error: {0}")]
    Template(String),

    /// A response body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns true when the failure should end the session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Returns true when no response was received from the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::Unauthorized { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<serde_yaml::Error> for ClientError {
    fn from(e: serde_yaml::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl From<minijinja::Error> for ClientError {
    fn from(e: minijinja::Error) -> Self {
        ClientError::Template(e.to_string())
    }
}

impl From<envy::Error> for ClientError {
    fn from(e: envy::Error) -> Self {
        ClientError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Api {
            status: 400,
            message: "Title is required".to_string(),
        };
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));

        let err = ClientError::ControlNotPresent("complaintForm".to_string());
        assert_eq!(err.to_string(), "Control not present on page: complaintForm");
    }

    #[test]
    fn test_auth_failure_is_variant_based() {
        let err = ClientError::Unauthorized {
            status: 403,
            message: "Access denied".to_string(),
        };
        assert!(err.is_auth_failure());

        // A message mentioning authorization is not enough on its own.
        let err = ClientError::Api {
            status: 400,
            message: "Unauthorized field".to_string(),
        };
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ClientError = io_err.into();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
