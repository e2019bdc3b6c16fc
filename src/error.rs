//! Typed failures of the fetch stage.

use std::time::Duration;
use thiserror::Error;

/// Why a fetch produced no records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport-level failure: DNS, refused connection, interrupted transfer.
    #[error("connection error: {0}")]
    Connection(String),
    /// No response within the per-attempt timeout window.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },
    /// Non-2xx status that the retry policy could not resolve.
    #[error("request failed with HTTP {status} after {attempts} attempt(s)")]
    HttpStatus { status: u16, attempts: u32 },
    /// The body was not a JSON array of records.
    #[error("could not decode response body: {0}")]
    Decode(String),
    /// The request succeeded but contained zero records.
    #[error("the source returned no country records")]
    EmptyResult,
}

/// Coarse failure classes surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    HttpStatusFailure,
    EmptyResultFailure,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Connection(_) | FetchError::Timeout { .. } | FetchError::Decode(_) => {
                FailureKind::NetworkFailure
            }
            FetchError::HttpStatus { .. } => FailureKind::HttpStatusFailure,
            FetchError::EmptyResult => FailureKind::EmptyResultFailure,
        }
    }

    /// Transport failures are worth another attempt; the status path decides separately.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(self, FetchError::Connection(_) | FetchError::Timeout { .. })
    }

    /// One-line message meant for end users.
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::NetworkFailure => {
                format!("Could not reach the countries source ({self}).")
            }
            FailureKind::HttpStatusFailure => {
                format!("The countries source answered with an error ({self}).")
            }
            FailureKind::EmptyResultFailure => "The countries source returned no data.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_timeouts_keep_their_precision() {
        let err = FetchError::Timeout {
            after: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "request timed out after 500ms");
        assert_eq!(err.kind(), FailureKind::NetworkFailure);
        assert!(err.is_transient());
    }
}
