//! Error types for a single lookup cycle.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can end a lookup cycle without a rendered card.
///
/// `Display` yields the bare reason; the view layer prefixes it with
/// `query failed: `.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The city field was empty after trimming. Not a failure, the
    /// controller turns it into a validation prompt.
    #[error("please enter a valid city name")]
    EmptyCity,

    /// Connection-level failure, including timeouts.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("{reason}")]
    Rejected { status: StatusCode, reason: String },

    /// A response body (success or failure) was not the JSON we expected.
    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl LookupError {
    /// Whether this error should be shown as `query failed: ...`.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::EmptyCity)
    }

    /// HTTP status attached to the error, if the endpoint responded at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }
}
