//! Product API error types.

use thiserror::Error;

use super::CompressError;

/// Product API error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("invalid API URL: {message}")]
    InvalidUrl { message: String },

    #[error("no restaurant ID available for this product")]
    MissingRestaurant,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("server rejected request with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to prepare product image: {0}")]
    Image(#[from] CompressError),

    #[error("unexpected API error: {message}")]
    Unexpected { message: String },
}

impl ApiError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates rejected error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether the request timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_builder() {
            Self::InvalidUrl {
                message: e.to_string(),
            }
        } else {
            Self::network(e.to_string())
        }
    }
}
