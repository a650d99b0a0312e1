//! Shared error types for the services crate.

use thiserror::Error;

use taleem_core::model::Category;

/// Errors emitted by the HTTP progress API.
///
/// Malformed fields inside otherwise-successful responses are not errors:
/// they are recovered to empty defaults at decode time and logged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The single aggregated failure surfaced from a refresh cycle.
///
/// Any one fetch failing aborts the whole aggregation; the caller gets one
/// error naming the category that failed and may simply retry the refresh.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefreshError {
    #[error("{category} progress fetch failed: {source}")]
    Fetch {
        category: Category,
        #[source]
        source: ApiError,
    },
}

impl RefreshError {
    /// The category whose fetch failed.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            RefreshError::Fetch { category, .. } => *category,
        }
    }
}
