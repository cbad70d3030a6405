//! Fetch-and-cache pipeline.
//!
//! Lookup order: Memory -> Disk -> Network. A network hit is decoded, written
//! back to disk as a JPEG copy, and kept decoded in memory.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Semaphore, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{CacheEvent, Fingerprint, ImageSource, LoadedImage, fingerprint};
use crate::domain::errors::ImageError;
use crate::domain::ports::{ImageCachePort, ImageFetcherPort, ImageResult};

use super::compressor::{PERSIST_QUALITY, encode_jpeg};
use super::disk_cache::DiskImageCache;
use super::events::{CacheEventBus, DEFAULT_EVENT_CAPACITY};
use super::memory_cache::{CacheStats, DEFAULT_CACHE_SIZE, MemoryImageCache};

/// Bodies shorter than this are logged as text when they fail to decode.
const BODY_PREVIEW_LIMIT: usize = 1000;

/// Message sent when a background load finishes.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// URL that was requested.
    pub url: String,
    /// The loaded image or the failure.
    pub result: ImageResult<LoadedImage>,
}

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum images in memory cache.
    pub memory_cache_size: usize,
    /// Maximum concurrent background downloads.
    pub max_concurrent_downloads: usize,
    /// Events buffered per invalidation subscriber.
    pub event_capacity: usize,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: DEFAULT_CACHE_SIZE,
            max_concurrent_downloads: 4,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Shared image cache service.
///
/// Construct once at startup and hand out clones; all clones share the same
/// tiers and event bus.
#[derive(Clone)]
pub struct ImageLoader {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    fetcher: Arc<dyn ImageFetcherPort>,
    events: CacheEventBus,
    semaphore: Arc<Semaphore>,
    config: ImageLoaderConfig,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .field("disk_cache", &self.disk_cache.dir())
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a loader over the given disk cache and transport.
    #[must_use]
    pub fn new(
        config: ImageLoaderConfig,
        disk_cache: Arc<DiskImageCache>,
        fetcher: Arc<dyn ImageFetcherPort>,
    ) -> Self {
        let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_size));
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1)));
        let events = CacheEventBus::new(config.event_capacity);

        Self {
            memory_cache,
            disk_cache,
            fetcher,
            events,
            semaphore,
            config,
        }
    }

    /// Registers a listener for invalidation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Checks the memory tier only, without promoting the entry.
    #[must_use]
    pub fn check_memory_cache(&self, url: &str) -> Option<Arc<image::DynamicImage>> {
        self.memory_cache.peek(&fingerprint(url))
    }

    /// Loads an image, checking caches first.
    ///
    /// # Errors
    /// Returns [`ImageError::InvalidUrl`] for malformed URLs,
    /// [`ImageError::ImageNotFound`] for non-2xx replies or undecodable bodies,
    /// and [`ImageError::NetworkError`] for transport failures.
    pub async fn fetch_image(&self, url: &str) -> ImageResult<LoadedImage> {
        validate_url(url)?;
        let fp = fingerprint(url);

        if let Some(image) = self.memory_cache.get(&fp) {
            return Ok(LoadedImage {
                fingerprint: fp,
                image,
                source: ImageSource::MemoryCache,
            });
        }

        if let Some(image) = self.load_from_disk(&fp).await {
            self.memory_cache.put(fp.clone(), image.clone());
            return Ok(LoadedImage {
                fingerprint: fp,
                image,
                source: ImageSource::DiskCache,
            });
        }

        debug!(url, fingerprint = %fp, "Downloading image from network");
        let body = self.fetcher.fetch(url).await?;

        if !body.is_success() {
            warn!(url, status = body.status, "Image request returned error status");
            return Err(ImageError::not_found(format!("HTTP {}", body.status)));
        }

        let (decoded, persisted) = decode_for_cache(url, body.bytes).await?;
        let image = Arc::new(decoded);

        self.memory_cache.put(fp.clone(), image.clone());
        if let Some(bytes) = persisted {
            self.disk_cache.put(&fp, &bytes).await;
        }

        debug!(url, fingerprint = %fp, source = "network", "Image loaded successfully");

        Ok(LoadedImage {
            fingerprint: fp,
            image,
            source: ImageSource::Network,
        })
    }

    async fn load_from_disk(&self, fp: &Fingerprint) -> Option<Arc<image::DynamicImage>> {
        let bytes = self.disk_cache.get(fp).await?;

        let result = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;

        match result {
            Ok(Ok(img)) => {
                debug!(fingerprint = %fp, "Decoded image from disk cache");
                Some(Arc::new(img))
            }
            Ok(Err(e)) => {
                warn!(fingerprint = %fp, error = %e, "Dropping undecodable disk cache entry");
                self.disk_cache.remove(fp).await;
                None
            }
            Err(e) => {
                warn!(fingerprint = %fp, error = %e, "Decode task panicked");
                None
            }
        }
    }

    /// Loads an image on a background task.
    ///
    /// At most `max_concurrent_downloads` loads run at once; the outcome is
    /// sent to `event_tx`.
    pub fn spawn_load(
        &self,
        url: String,
        event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> JoinHandle<()> {
        let loader = self.clone();
        tokio::spawn(async move {
            let Ok(_permit) = loader.semaphore.clone().acquire_owned().await else {
                return;
            };

            let result = loader.fetch_image(&url).await;
            if event_tx.send(ImageLoadedEvent { url, result }).is_err() {
                trace!("Image load finished after receiver was dropped");
            }
        })
    }

    /// Removes one key from both tiers and notifies subscribers.
    pub async fn clear_one(&self, key: &str) {
        let fp = fingerprint(key);
        self.memory_cache.remove(&fp);
        self.disk_cache.remove(&fp).await;

        debug!(key, fingerprint = %fp, "Invalidated cached image");
        self.events.publish(CacheEvent::Invalidated {
            key: key.to_string(),
            fingerprint: fp,
        });
    }

    /// Empties both tiers.
    pub async fn clear_all(&self) {
        self.memory_cache.clear();
        self.disk_cache.clear().await;
        info!("Cleared all image caches");
        self.events.publish(CacheEvent::Cleared);
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.memory_cache.stats()
    }

    /// Returns the number of images stored on disk.
    pub async fn disk_entries(&self) -> usize {
        self.disk_cache.len().await
    }
}

#[async_trait::async_trait]
impl ImageCachePort for ImageLoader {
    async fn fetch(&self, url: &str) -> ImageResult<LoadedImage> {
        self.fetch_image(url).await
    }

    async fn invalidate(&self, key: &str) {
        self.clear_one(key).await;
    }

    async fn clear(&self) {
        self.clear_all().await;
    }
}

fn validate_url(url: &str) -> ImageResult<()> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ImageError::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ImageError::invalid_url(
            url,
            format!("unsupported scheme {other:?}"),
        )),
    }
}

/// Decodes a network body and re-encodes the copy kept on disk.
async fn decode_for_cache(
    url: &str,
    body: Bytes,
) -> ImageResult<(image::DynamicImage, Option<Vec<u8>>)> {
    let url = url.to_string();
    tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&body).map_err(|e| {
            log_undecodable_body(&url, &body);
            ImageError::not_found(format!("response is not an image: {e}"))
        })?;

        let persisted = encode_jpeg(&decoded, PERSIST_QUALITY)
            .inspect_err(|e| warn!(url = %url, error = %e, "Failed to encode image for disk cache"))
            .ok();

        Ok((decoded, persisted))
    })
    .await
    .map_err(|e| ImageError::not_found(format!("decode task panicked: {e}")))?
}

fn log_undecodable_body(url: &str, body: &[u8]) {
    match std::str::from_utf8(body) {
        Ok(text) if text.chars().count() < BODY_PREVIEW_LIMIT => {
            debug!(url, body = text, "Image response was text");
        }
        _ => debug!(url, size = body.len(), "Received non-image data"),
    }
}
