//! Product create/update/delete workflow.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::application::services::{delete_outcome, normalize_response};
use crate::domain::entities::{ProductDraft, RecordId};
use crate::domain::errors::{ApiError, CompressError};
use crate::domain::ports::{ImageCachePort, ProductApiPort};
use crate::infrastructure::image::CompressionTarget;

/// Compresses product photos, uploads them, and keeps the photo cache fresh.
#[derive(Clone)]
pub struct SaveProductUseCase {
    api: Arc<dyn ProductApiPort>,
    images: Arc<dyn ImageCachePort>,
    target: CompressionTarget,
}

impl SaveProductUseCase {
    /// Creates new save product use case.
    #[must_use]
    pub fn new(api: Arc<dyn ProductApiPort>, images: Arc<dyn ImageCachePort>) -> Self {
        Self {
            api,
            images,
            target: CompressionTarget::default(),
        }
    }

    /// Overrides the upload compression limits.
    #[must_use]
    pub const fn with_target(mut self, target: CompressionTarget) -> Self {
        self.target = target;
        self
    }

    /// Creates a product.
    ///
    /// Sends multipart first. A timed out multipart upload is retried once as
    /// JSON with the image base64-encoded.
    ///
    /// # Errors
    /// Returns error if the restaurant is missing, compression fails, the
    /// transport fails, or the server rejects the request.
    pub async fn create(
        &self,
        draft: &ProductDraft,
        image: Option<DynamicImage>,
    ) -> Result<RecordId, ApiError> {
        if !draft.has_restaurant() {
            warn!(product = %draft.name, "Refusing to create product without restaurant");
            return Err(ApiError::MissingRestaurant);
        }

        let compressed = self.prepare(image).await?;

        let response = match self
            .api
            .create_product_multipart(draft, compressed.clone())
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!("Multipart create timed out, retrying as JSON");
                self.api.create_product_json(draft, compressed).await?
            }
            Err(e) => return Err(e),
        };

        let id = normalize_response(&response)?;
        info!(id = %id, provisional = id.is_provisional(), "Product created");
        Ok(id)
    }

    /// Updates a product and invalidates its cached photo.
    ///
    /// # Errors
    /// Returns error if compression fails, the transport fails, or the server
    /// rejects the request.
    pub async fn update(
        &self,
        product_id: &str,
        draft: &ProductDraft,
        image: Option<DynamicImage>,
    ) -> Result<RecordId, ApiError> {
        let compressed = self.prepare(image).await?;
        let response = self
            .api
            .update_product(product_id, draft, compressed)
            .await?;

        if !response.is_success() {
            warn!(product_id, status = response.status, "Product update rejected");
            return Err(ApiError::rejected(response.status, response.body_text()));
        }

        let photo_url = self.api.product_photo_url(product_id);
        self.images.invalidate(&photo_url).await;

        info!(product_id, "Product updated");
        Ok(RecordId::Confirmed(product_id.to_string()))
    }

    /// Deletes a product and drops its cached photo.
    ///
    /// Returns the server's `success` flag. The cache is only touched when it
    /// is true.
    ///
    /// # Errors
    /// Returns error if the transport fails, the status is not 200, or the
    /// reply is unreadable.
    pub async fn delete(&self, product_id: &str) -> Result<bool, ApiError> {
        let response = self.api.delete_product(product_id).await?;
        let deleted = delete_outcome(&response)?;

        if deleted {
            let photo_url = self.api.product_photo_url(product_id);
            self.images.invalidate(&photo_url).await;
            info!(product_id, "Product deleted");
        } else {
            warn!(product_id, "Server declined to delete product");
        }

        Ok(deleted)
    }

    async fn prepare(&self, image: Option<DynamicImage>) -> Result<Option<Vec<u8>>, ApiError> {
        let Some(image) = image else {
            return Ok(None);
        };

        let target = self.target;
        let compressed = tokio::task::spawn_blocking(move || target.compress(&image))
            .await
            .map_err(|e| {
                ApiError::Image(CompressError::Encode {
                    message: e.to_string(),
                })
            })??;

        debug!(
            size = compressed.bytes.len(),
            quality = compressed.quality,
            attempts = compressed.attempts,
            "Compressed product image"
        );
        Ok(Some(compressed.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageCache;
    use crate::domain::ports::{MockProductApiPort, RawResponse};
    use bytes::Bytes;
    use image::{Rgb, RgbImage};

    fn draft() -> ProductDraft {
        ProductDraft::new("Paneer Roll", "rest-1", "Rolls", 90)
    }

    fn reply(status: u16, body: &'static str) -> RawResponse {
        RawResponse {
            status,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn photo() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(1200, 800, Rgb([200, 120, 40])))
    }

    fn use_case(api: MockProductApiPort, cache: Arc<MockImageCache>) -> SaveProductUseCase {
        SaveProductUseCase::new(Arc::new(api), cache)
    }

    #[tokio::test]
    async fn test_create_without_restaurant_fails_before_network() {
        let api = MockProductApiPort::new();
        let uc = use_case(api, Arc::new(MockImageCache::new()));

        let result = uc
            .create(&ProductDraft::new("Tea", "", "Drinks", 10), None)
            .await;

        assert!(matches!(result, Err(ApiError::MissingRestaurant)));
    }

    #[tokio::test]
    async fn test_create_without_image_leaves_photo_to_transport() {
        let mut api = MockProductApiPort::new();
        api.expect_create_product_multipart()
            .withf(|_, image| image.is_none())
            .times(1)
            .returning(|_, _| Ok(reply(201, r#"{"productId":"p-100"}"#)));
        api.expect_create_product_json().never();

        let uc = use_case(api, Arc::new(MockImageCache::new()));
        let id = uc.create(&draft(), None).await.unwrap();

        assert_eq!(id, RecordId::Confirmed("p-100".to_string()));
    }

    #[tokio::test]
    async fn test_create_compresses_image_within_limits() {
        let mut api = MockProductApiPort::new();
        api.expect_create_product_multipart()
            .withf(|_, image| {
                image.as_ref().is_some_and(|bytes| {
                    let decoded = image::load_from_memory(bytes).unwrap();
                    decoded.width() == 600 && decoded.height() == 400
                })
            })
            .times(1)
            .returning(|_, _| Ok(reply(200, "64f1a2b3c4d5e6f7")));

        let uc = use_case(api, Arc::new(MockImageCache::new()));
        let id = uc.create(&draft(), Some(photo())).await.unwrap();

        assert_eq!(id.as_str(), "64f1a2b3c4d5e6f7");
    }

    #[tokio::test]
    async fn test_create_timeout_falls_back_to_json() {
        let mut api = MockProductApiPort::new();
        api.expect_create_product_multipart()
            .times(1)
            .returning(|_, _| Err(ApiError::Timeout));
        api.expect_create_product_json()
            .withf(|_, image| image.is_none())
            .times(1)
            .returning(|_, _| Ok(reply(200, "")));

        let uc = use_case(api, Arc::new(MockImageCache::new()));
        let id = uc.create(&draft(), None).await.unwrap();

        assert!(id.is_provisional());
    }

    #[tokio::test]
    async fn test_create_network_error_is_not_retried() {
        let mut api = MockProductApiPort::new();
        api.expect_create_product_multipart()
            .times(1)
            .returning(|_, _| Err(ApiError::network("connection reset")));
        api.expect_create_product_json().never();

        let uc = use_case(api, Arc::new(MockImageCache::new()));
        let result = uc.create(&draft(), None).await;

        assert!(matches!(result, Err(ApiError::NetworkError { .. })));
    }

    #[tokio::test]
    async fn test_create_rejected() {
        let mut api = MockProductApiPort::new();
        api.expect_create_product_multipart()
            .returning(|_, _| Ok(reply(422, r#"{"error":"bad price"}"#)));

        let uc = use_case(api, Arc::new(MockImageCache::new()));
        let result = uc.create(&draft(), None).await;

        assert!(matches!(result, Err(ApiError::Rejected { status: 422, .. })));
    }

    #[tokio::test]
    async fn test_update_invalidates_photo() {
        let mut api = MockProductApiPort::new();
        api.expect_update_product()
            .withf(|id, d, image| id == "p-9" && d.name == "Paneer Roll" && image.is_none())
            .times(1)
            .returning(|_, _, _| Ok(reply(200, r#"{"ok":true}"#)));
        api.expect_product_photo_url()
            .withf(|id| id == "p-9")
            .returning(|id| format!("https://api.example.com/get_product_photo/{id}"));

        let cache = Arc::new(MockImageCache::new());
        let uc = use_case(api, Arc::clone(&cache));
        let id = uc.update("p-9", &draft(), None).await.unwrap();

        assert_eq!(id, RecordId::Confirmed("p-9".to_string()));
        assert_eq!(
            *cache.invalidated.lock(),
            vec!["https://api.example.com/get_product_photo/p-9".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_update_keeps_cache() {
        let mut api = MockProductApiPort::new();
        api.expect_update_product()
            .returning(|_, _, _| Ok(reply(404, "not found")));
        api.expect_product_photo_url().never();

        let cache = Arc::new(MockImageCache::new());
        let uc = use_case(api, Arc::clone(&cache));
        let result = uc.update("missing", &draft(), Some(photo())).await;

        assert!(matches!(result, Err(ApiError::Rejected { status: 404, .. })));
        assert!(cache.invalidated.lock().is_empty());
    }

    #[tokio::test]
    async fn test_delete_invalidates_photo() {
        let mut api = MockProductApiPort::new();
        api.expect_delete_product()
            .withf(|id| id == "p-9")
            .times(1)
            .returning(|_| Ok(reply(200, r#"{"success":true}"#)));
        api.expect_product_photo_url()
            .returning(|id| format!("https://api.example.com/get_product_photo/{id}"));

        let cache = Arc::new(MockImageCache::new());
        let uc = use_case(api, Arc::clone(&cache));

        assert!(uc.delete("p-9").await.unwrap());
        assert_eq!(
            *cache.invalidated.lock(),
            vec!["https://api.example.com/get_product_photo/p-9".to_string()]
        );
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_cache() {
        let mut api = MockProductApiPort::new();
        api.expect_delete_product()
            .returning(|_| Ok(reply(200, r#"{"success":false}"#)));
        api.expect_product_photo_url().never();

        let cache = Arc::new(MockImageCache::new());
        let uc = use_case(api, Arc::clone(&cache));

        assert!(!uc.delete("p-9").await.unwrap());
        assert!(cache.invalidated.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_is_rejected() {
        let mut api = MockProductApiPort::new();
        api.expect_delete_product()
            .returning(|_| Ok(reply(500, "boom")));
        api.expect_product_photo_url().never();

        let cache = Arc::new(MockImageCache::new());
        let uc = use_case(api, Arc::clone(&cache));
        let result = uc.delete("p-9").await;

        assert!(matches!(result, Err(ApiError::Rejected { status: 500, .. })));
        assert!(cache.invalidated.lock().is_empty());
    }
}
