//! Disk-based image cache.
//!
//! One file per image, named by its fingerprint, in a single flat directory.
//! Listing the directory is the only index. Every failure is logged and
//! reported as a miss so that the memory tier keeps working.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::entities::Fingerprint;
use crate::infrastructure::config::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER};

/// Name of the cache directory inside the application data directory.
pub const CACHE_DIR_NAME: &str = "ImageCache";

/// Disk cache of encoded image bytes.
#[derive(Debug, Clone)]
pub struct DiskImageCache {
    cache_dir: PathBuf,
}

impl DiskImageCache {
    /// Creates a cache rooted at `cache_dir`.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Creates a cache in the default location (`<data dir>/ImageCache`).
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(default_cache_dir())
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, fp: &Fingerprint) -> PathBuf {
        self.cache_dir.join(fp.as_str())
    }

    /// Stores bytes under a fingerprint, replacing any previous entry.
    pub async fn put(&self, fp: &Fingerprint, bytes: &[u8]) {
        if let Err(e) = self.try_put(fp, bytes).await {
            warn!(fingerprint = %fp, error = %e, "Failed to write image to disk cache");
        }
    }

    async fn try_put(&self, fp: &Fingerprint, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;

        let path = self.cache_path(fp);
        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!(fingerprint = %fp, path = %path.display(), size = bytes.len(), "Stored image in disk cache");
        Ok(())
    }

    /// Reads the bytes stored under a fingerprint.
    pub async fn get(&self, fp: &Fingerprint) -> Option<Vec<u8>> {
        let path = self.cache_path(fp);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(fingerprint = %fp, path = %path.display(), "Disk cache hit");
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(fingerprint = %fp, "Disk cache miss");
                None
            }
            Err(e) => {
                warn!(fingerprint = %fp, error = %e, "Unreadable disk cache entry");
                None
            }
        }
    }

    /// Removes one entry. Absent entries are ignored.
    pub async fn remove(&self, fp: &Fingerprint) {
        match fs::remove_file(self.cache_path(fp)).await {
            Ok(()) => debug!(fingerprint = %fp, "Removed image from disk cache"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(fingerprint = %fp, error = %e, "Failed to remove from disk cache"),
        }
    }

    /// Removes every file in the cache directory.
    ///
    /// A file that cannot be removed is logged and skipped.
    pub async fn clear(&self) {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(dir = %self.cache_dir.display(), error = %e, "Failed to read disk cache dir");
                return;
            }
        };

        let mut removed = 0usize;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to list disk cache entries");
                    break;
                }
            };

            let path = entry.path();
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            } else {
                removed += 1;
            }
        }

        debug!(removed, "Cleared disk cache");
    }

    /// Lists the fingerprints currently stored.
    pub async fn entries(&self) -> Vec<Fingerprint> {
        let Ok(mut dir) = fs::read_dir(&self.cache_dir).await else {
            return Vec::new();
        };

        let mut found = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            if let Some(fp) = entry.file_name().to_str().and_then(Fingerprint::parse) {
                found.push(fp);
            }
        }
        found
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Checks if a fingerprint is stored.
    pub async fn contains(&self, fp: &Fingerprint) -> bool {
        fs::try_exists(self.cache_path(fp)).await.unwrap_or(false)
    }
}

/// Returns the default cache directory path.
fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
        || std::env::temp_dir().join(APP_NAME).join(CACHE_DIR_NAME),
        |dirs| dirs.data_dir().join(CACHE_DIR_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fingerprint;
    use tempfile::TempDir;

    fn create_test_cache() -> (DiskImageCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskImageCache::new(temp_dir.path().join(CACHE_DIR_NAME));
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (cache, _temp) = create_test_cache();
        let fp = fingerprint("test1");

        cache.put(&fp, b"test image data").await;

        assert_eq!(cache.get(&fp).await.as_deref(), Some(&b"test image data"[..]));
    }

    #[tokio::test]
    async fn test_put_creates_directory_and_names_file_by_fingerprint() {
        let (cache, _temp) = create_test_cache();
        let fp = fingerprint("test1");
        assert!(!cache.dir().exists());

        cache.put(&fp, b"x").await;

        assert!(cache.dir().join(fp.as_str()).is_file());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (cache, _temp) = create_test_cache();
        let fp = fingerprint("test1");

        cache.put(&fp, b"first version").await;
        cache.put(&fp, b"v2").await;

        assert_eq!(cache.get(&fp).await.as_deref(), Some(&b"v2"[..]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.get(&fingerprint("nonexistent")).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_twice() {
        let (cache, _temp) = create_test_cache();
        let fp = fingerprint("test1");

        cache.put(&fp, b"test").await;
        assert!(cache.contains(&fp).await);

        cache.remove(&fp).await;
        assert!(cache.get(&fp).await.is_none());

        cache.remove(&fp).await;
        assert!(!cache.contains(&fp).await);
    }

    #[tokio::test]
    async fn test_clear() {
        let (cache, _temp) = create_test_cache();
        let keys: Vec<_> = ["a", "b", "c"].into_iter().map(fingerprint).collect();
        for fp in &keys {
            cache.put(fp, b"data").await;
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await;

        assert!(cache.is_empty().await);
        for fp in &keys {
            assert!(cache.get(fp).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_clear_missing_directory_is_noop() {
        let (cache, _temp) = create_test_cache();
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_into_unwritable_location_does_not_panic() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let cache = DiskImageCache::new(blocker.join(CACHE_DIR_NAME));
        let fp = fingerprint("k");

        cache.put(&fp, b"data").await;

        assert!(cache.get(&fp).await.is_none());
    }
}
