//! Port definition for the image cache service.

use crate::domain::entities::LoadedImage;
use crate::domain::errors::ImageError;

/// Result type for image pipeline operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Image cache as seen by use cases.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Loads an image, checking caches first then network.
    async fn fetch(&self, url: &str) -> ImageResult<LoadedImage>;

    /// Drops one key from every tier and notifies subscribers.
    async fn invalidate(&self, key: &str);

    /// Drops every cached image.
    async fn clear(&self);
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;

    /// Records invalidations; fetches always fail.
    #[derive(Default)]
    pub struct MockImageCache {
        pub invalidated: Mutex<Vec<String>>,
        pub cleared: Mutex<usize>,
    }

    impl MockImageCache {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait::async_trait]
    impl ImageCachePort for MockImageCache {
        async fn fetch(&self, url: &str) -> ImageResult<LoadedImage> {
            Err(ImageError::not_found(format!("mock has no image for {url}")))
        }

        async fn invalidate(&self, key: &str) {
            self.invalidated.lock().push(key.to_string());
        }

        async fn clear(&self) {
            *self.cleared.lock() += 1;
        }
    }
}
