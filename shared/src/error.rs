//! Error types for validation and content API access.

use thiserror::Error;

/// Why a JSON value could not be turned into an [`crate::Article`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value was not a JSON object; carries the JSON type found.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// `id`, `title`, or `slug` was absent, empty, or not a string.
    #[error("required field `{0}` is missing or not a non-empty string")]
    MissingField(&'static str),
}

/// Why a content API call produced no usable data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The slug failed validation; no request was sent.
    #[error("invalid slug: {0:?}")]
    InvalidSlug(String),
    /// Transport failure, including timeouts.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("content API answered HTTP {0}")]
    Status(u16),
    /// The body was not JSON.
    #[error("invalid JSON from content API: {0}")]
    Decode(#[from] serde_json::Error),
    /// The body was JSON but not a valid article.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl FetchError {
    /// True for an HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }
}
