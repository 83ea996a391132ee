use painel_protocol::ProtocolError;

/// Errors that can occur while talking to the dashboard API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// No response within the client's request timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("http status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        /// Server-provided explanation from the error body, if any.
        message: Option<String>,
    },

    /// The response body didn't match the expected message shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    /// Returns `true` for 401 and 403 — the statuses that mean the
    /// session token is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Returns `true` when the server could not be reached at all, as
    /// opposed to reaching it and being told no.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// The HTTP status, if the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            message: None,
        }
    }

    #[test]
    fn test_is_unauthorized_only_for_401_and_403() {
        assert!(status(401).is_unauthorized());
        assert!(status(403).is_unauthorized());
        assert!(!status(404).is_unauthorized());
        assert!(!status(500).is_unauthorized());
        assert!(!ApiError::Timeout.is_unauthorized());
    }

    #[test]
    fn test_is_unreachable_for_network_and_timeout() {
        assert!(ApiError::Network("refused".into()).is_unreachable());
        assert!(ApiError::Timeout.is_unreachable());
        assert!(!status(401).is_unreachable());
    }

    #[test]
    fn test_status_display_includes_server_message() {
        let err = ApiError::Status {
            status: 403,
            message: Some("Token expirado".into()),
        };
        assert_eq!(err.to_string(), "http status 403: Token expirado");
        assert_eq!(err.status(), Some(403));
    }
}
