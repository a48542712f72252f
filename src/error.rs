//! Error types for the buffer word source
//!
//! Only two kinds of failure abort an operation: a host call that failed and a
//! keyword pattern that does not compile. A buffer that is too large to cache
//! is not an error; see [`crate::cache::size_guard::Eligibility`].

use thiserror::Error;

/// A failed call into the editor host.
///
/// Implementations of [`crate::host::BufferHost`] return this for any RPC
/// failure. The engine never commits a partial entry when it sees one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("host call `{call}` failed: {message}")]
pub struct HostError {
    /// Name of the host function that failed (e.g. `getbufline`)
    pub call: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::source::BufferSource`] operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("invalid keyword pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid source params: {0}")]
    InvalidParams(#[from] serde_json::Error),
}

pub type HostResult<T> = Result<T, HostError>;

pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        let err = HostError::new("getbufline", "channel closed");
        assert_eq!(err.to_string(), "host call `getbufline` failed: channel closed");

        let err: SourceError = err.into();
        assert_eq!(err.to_string(), "host call `getbufline` failed: channel closed");
    }

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = SourceError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid keyword pattern `(`"));
    }
}
