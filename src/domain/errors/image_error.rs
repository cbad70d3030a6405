//! Image fetch and compression error types.

use thiserror::Error;

/// Failures surfaced by the fetch-and-cache pipeline.
///
/// Cache tier failures never appear here; they degrade to misses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("invalid image URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("image could not be found or loaded: {reason}")]
    ImageNotFound { reason: String },

    #[error("network error while fetching image: {message}")]
    NetworkError { message: String },
}

impl ImageError {
    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates not found error.
    #[must_use]
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::ImageNotFound {
            reason: reason.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Returns whether the error came from the transport.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::NetworkError { .. })
    }
}

/// Failures of the JPEG encoder during compression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CompressError {
    #[error("cannot compress an image with no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("JPEG encoding failed: {message}")]
    Encode { message: String },
}
