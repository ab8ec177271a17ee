//! Error type for cached reads.

/// Failure of a cached read.
///
/// The error is broadcast to every caller coalesced onto one in-flight
/// fetch, so it must be cheap to clone and carry everything a view needs
/// for display: the HTTP status (when the failure came from the backend)
/// and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub status: Option<u16>,
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// The leader of an in-flight read disappeared without broadcasting a
    /// result (it panicked or was aborted).
    pub fn interrupted() -> Self {
        Self::new("read was interrupted before a result arrived")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shows_message_only() {
        let err = QueryError::with_status(503, "backend unavailable");
        assert_eq!(err.to_string(), "backend unavailable");
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_plain_error_has_no_status() {
        assert_eq!(QueryError::new("boom").status, None);
    }
}
