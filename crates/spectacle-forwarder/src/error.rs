//! Error types for the forwarding pipeline.

use std::time::Duration;

use thiserror::Error;

/// Failure of the outbound HTTP exchange itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response within the request timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection, TLS or protocol failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Why an invocation failed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("no event name provided for track call")]
    MissingEventName,

    #[error("no group id provided for group call")]
    MissingGroupId,

    #[error("unknown method type: {0}")]
    UnknownMethod(String),

    /// The collection endpoint answered with a non-2xx status.
    #[error("collection endpoint returned status {status}")]
    Rejected { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForwardError {
    /// Returns `true` when the invocation itself was unusable, as opposed to
    /// the collection endpoint failing.
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingEventName | Self::MissingGroupId | Self::UnknownMethod(_)
        )
    }

    /// Returns `true` when the collection endpoint rejected or never
    /// answered the request.
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(ForwardError::MissingEventName.is_invocation_error());
        assert!(ForwardError::UnknownMethod("alias".into()).is_invocation_error());
        assert!(ForwardError::Rejected { status: 500 }.is_upstream_error());
        assert!(
            ForwardError::from(TransportError::Timeout(Duration::from_millis(5)))
                .is_upstream_error()
        );
        assert!(!ForwardError::MissingGroupId.is_upstream_error());
    }

    #[test]
    fn timeout_message_uses_millis() {
        let err = TransportError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "request timed out after 5000ms");
    }
}
