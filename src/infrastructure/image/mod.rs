//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with a bounded LRU
//! - Disk caching in a flat fingerprint-named directory
//! - Adaptive JPEG compression for uploads
//! - The fetch-and-cache pipeline and its invalidation events

pub mod compressor;
pub mod disk_cache;
pub mod events;
pub mod http_fetcher;
pub mod loader;
pub mod memory_cache;

pub use compressor::{CompressedImage, CompressionTarget, compress, placeholder_jpeg};
pub use disk_cache::DiskImageCache;
pub use events::CacheEventBus;
pub use http_fetcher::HttpImageFetcher;
pub use loader::{ImageLoadedEvent, ImageLoader, ImageLoaderConfig};
pub use memory_cache::{CacheStats, MemoryImageCache};
