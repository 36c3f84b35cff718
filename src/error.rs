//! Error types for the content boundary

/// Errors raised while talking to the CMS or validating its payloads
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Transport failure (connection, timeout, body decoding)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The CMS answered with a non-success status
    #[error("{url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The API root did not advertise a master ref
    #[error("the content repository has no master ref")]
    NoMasterRef,

    /// No document matches the requested identifier
    #[error("not found: {0}")]
    NotFound(String),

    /// A document is missing a required field
    #[error("malformed document {id}: {reason}")]
    Malformed { id: String, reason: String },

    /// A next-page pointer that does not belong to the configured repository
    #[error("invalid page cursor: {0}")]
    InvalidCursor(String),

    /// Misconfigured client (empty or unparsable endpoint)
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ContentError {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is a not-found outcome rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ContentError::NotFound("my-post".to_string());
        assert_eq!(err.to_string(), "not found: my-post");
        assert!(err.is_not_found());

        let err = ContentError::malformed("YMqJ0x", "missing uid");
        assert_eq!(err.to_string(), "malformed document YMqJ0x: missing uid");
        assert!(!err.is_not_found());
    }
}
