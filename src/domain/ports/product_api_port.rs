//! Port for the remote product endpoints.

use bytes::Bytes;

use crate::domain::entities::ProductDraft;
use crate::domain::errors::ApiError;

/// Status and body of a create/update reply, left unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the body as lossy UTF-8, for logging.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Product create/update transport.
///
/// `image` is an already compressed JPEG. Implementations return any HTTP
/// reply as `Ok`; only transport failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductApiPort: Send + Sync {
    /// Creates a product with a multipart body.
    ///
    /// Without an image a small placeholder photo is sent instead.
    async fn create_product_multipart(
        &self,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError>;

    /// Creates a product with a JSON body and base64 image.
    async fn create_product_json(
        &self,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError>;

    /// Updates an existing product with a multipart body.
    async fn update_product(
        &self,
        product_id: &str,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError>;

    /// Deletes a product.
    async fn delete_product(&self, product_id: &str) -> Result<RawResponse, ApiError>;

    /// Returns the public URL of a product photo.
    fn product_photo_url(&self, product_id: &str) -> String;
}
