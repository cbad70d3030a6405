//! Domain types for image handling.

use std::sync::Arc;

use super::Fingerprint;

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from the in-memory cache.
    MemoryCache,
    /// Loaded from the disk cache.
    DiskCache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::DiskCache => write!(f, "disk"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image together with its cache identity.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Fingerprint of the key the image was loaded for.
    pub fingerprint: Fingerprint,
    /// Decoded image. Shared read-only with the memory cache.
    pub image: Arc<image::DynamicImage>,
    /// Tier that served the request.
    pub source: ImageSource,
}

impl LoadedImage {
    /// Returns `(width, height)` of the decoded image.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Notification published when cached images are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// One key was removed from both tiers. Views showing it should refetch.
    Invalidated {
        /// Key as supplied by the caller.
        key: String,
        /// Fingerprint derived from the key.
        fingerprint: Fingerprint,
    },
    /// Both tiers were emptied.
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(ImageSource::MemoryCache.to_string(), "memory");
        assert_eq!(ImageSource::DiskCache.to_string(), "disk");
        assert_eq!(ImageSource::Network.to_string(), "network");
    }
}
