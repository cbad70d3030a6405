//! Port for downloading image bodies.

use bytes::Bytes;

use crate::domain::errors::ImageError;

/// Raw HTTP reply to an image request.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub bytes: Bytes,
}

impl FetchedBody {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport used by the image pipeline on a cache miss.
///
/// Implementations must bypass any transport-level caching and only fail with
/// [`ImageError::NetworkError`]; status handling belongs to the caller.
#[async_trait::async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Issues a GET for the given absolute URL.
    async fn fetch(&self, url: &str) -> Result<FetchedBody, ImageError>;
}
