//! Infrastructure layer with external service adapters.

/// Product API client.
pub mod api;
/// Application configuration.
pub mod config;
/// Image handling (caching, loading, compression).
pub mod image;
/// Token storage adapters.
pub mod storage;

pub use api::ProductApiClient;
pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use image::{
    CacheEventBus, CacheStats, CompressedImage, CompressionTarget, DiskImageCache,
    HttpImageFetcher, ImageLoadedEvent, ImageLoader, ImageLoaderConfig, MemoryImageCache,
    compress, placeholder_jpeg,
};
pub use storage::InMemoryTokenStore;
