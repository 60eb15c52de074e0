//! Error types surfaced by the conversation core.

use thiserror::Error;

use crate::Role;

/// Malformed arguments to a store mutation. The call is rejected and nothing changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message role is empty")]
    EmptyRole,

    #[error("unknown message role: {0}")]
    UnknownRole(String),

    #[error("{role} message text is empty")]
    EmptyText { role: Role },
}

/// Classification of a failed LLM call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Transport failure or timeout
    Network,
    /// Rate limited or out of quota (429)
    Quota,
    /// The provider rejected the request (400, 404)
    InvalidRequest,
    /// Bad or missing credentials (401, 403)
    Auth,
    /// Provider side failure (5xx)
    Server,
    /// The call succeeded but returned no text
    EmptyResponse,
    Unknown,
}

impl ProviderErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Quota => "quota",
            Self::InvalidRequest => "invalid request",
            Self::Auth => "auth",
            Self::Server => "server",
            Self::EmptyResponse => "empty response",
            Self::Unknown => "unknown",
        }
    }
}

/// A failed call to the LLM collaborator. Terminal for the turn that made it.
#[derive(Debug, Clone, Error)]
#[error("{} error: {message}", .kind.as_str())]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    #[must_use]
    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Quota, message)
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Server, message)
    }

    #[must_use]
    pub fn empty_response() -> Self {
        Self::new(ProviderErrorKind::EmptyResponse, "no text in reply")
    }

    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unknown, message)
    }

    /// Map an HTTP status code to an error kind.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            429 => ProviderErrorKind::Quota,
            401 | 403 => ProviderErrorKind::Auth,
            400 | 404 | 413 | 422 => ProviderErrorKind::InvalidRequest,
            500..=599 => ProviderErrorKind::Server,
            _ => ProviderErrorKind::Unknown,
        };
        Self::new(kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(
            ProviderError::from_status(429, "slow down").kind,
            ProviderErrorKind::Quota
        );
        assert_eq!(
            ProviderError::from_status(403, "nope").kind,
            ProviderErrorKind::Auth
        );
        assert_eq!(
            ProviderError::from_status(400, "bad").kind,
            ProviderErrorKind::InvalidRequest
        );
        assert_eq!(
            ProviderError::from_status(503, "down").kind,
            ProviderErrorKind::Server
        );
        assert_eq!(
            ProviderError::from_status(302, "moved").kind,
            ProviderErrorKind::Unknown
        );
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = ProviderError::quota("daily limit reached");
        assert_eq!(err.to_string(), "quota error: daily limit reached");

        let err = ValidationError::EmptyText { role: Role::User };
        assert_eq!(err.to_string(), "user message text is empty");
    }
}
