//! Product API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use tracing::{debug, warn};

use super::payload::{product_form, product_json};
use crate::infrastructure::image::placeholder_jpeg;
use crate::domain::entities::ProductDraft;
use crate::domain::errors::ApiError;
use crate::domain::ports::{ProductApiPort, RawResponse, TokenProviderPort};

const USER_AGENT: &str = concat!("qskipper-media/", env!("CARGO_PKG_VERSION"));

/// Timeout for JSON create and multipart update calls.
pub const JSON_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for multipart create calls.
pub const MULTIPART_TIMEOUT: Duration = Duration::from_secs(120);

const UPLOAD_FILE_NAME: &str = "product.jpg";
const UPDATE_FILE_NAME: &str = "image.jpg";
const PLACEHOLDER_FILE_NAME: &str = "placeholder.jpg";

/// Client for the product create/update endpoints.
pub struct ProductApiClient {
    client: Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenProviderPort>>,
}

impl ProductApiClient {
    /// Creates a client for the given API root.
    ///
    /// # Errors
    /// Returns error if the base URL is malformed or the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            message: format!("{base_url}: {e}"),
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(MULTIPART_TIMEOUT)
            .build()
            .map_err(|e| ApiError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            tokens: None,
        })
    }

    /// Attaches a bearer token source.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenProviderPort>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Returns the API root without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_url(&self) -> String {
        format!("{}/create-product", self.base_url)
    }

    fn update_url(&self, product_id: &str) -> String {
        format!("{}/update-food/{product_id}", self.base_url)
    }

    fn delete_url(&self, product_id: &str) -> String {
        format!("{}/delete-product/{product_id}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.as_ref().and_then(|t| t.token()) {
            Some(token) => request.header(header::AUTHORIZATION, token.bearer_header()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<RawResponse, ApiError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            warn!(error = %e, "Product API request failed");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ApiError::from)?;
        let raw = RawResponse { status, body };

        debug!(status, body = %raw.body_text(), "Product API response");
        Ok(raw)
    }
}

/// Picks the photo part of a multipart create, falling back to the placeholder.
fn create_photo_part(image: Option<Vec<u8>>) -> Result<(Vec<u8>, &'static str), ApiError> {
    match image {
        Some(bytes) => Ok((bytes, UPLOAD_FILE_NAME)),
        None => {
            debug!("No product image, sending placeholder");
            Ok((placeholder_jpeg()?, PLACEHOLDER_FILE_NAME))
        }
    }
}

impl std::fmt::Debug for ProductApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProductApiPort for ProductApiClient {
    async fn create_product_multipart(
        &self,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError> {
        let form = product_form(draft, Some(create_photo_part(image)?), false)?;

        debug!(
            url = %self.create_url(),
            restaurant_id = %draft.restaurant_id,
            "Creating product (multipart)"
        );

        let request = self
            .client
            .post(self.create_url())
            .timeout(MULTIPART_TIMEOUT)
            .multipart(form);
        self.send(request).await
    }

    async fn create_product_json(
        &self,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError> {
        let body = product_json(draft, image.as_deref());

        debug!(
            url = %self.create_url(),
            restaurant_id = %draft.restaurant_id,
            has_image = image.is_some(),
            "Creating product (JSON)"
        );

        let request = self
            .client
            .post(self.create_url())
            .timeout(JSON_TIMEOUT)
            .json(&body);
        self.send(request).await
    }

    async fn update_product(
        &self,
        product_id: &str,
        draft: &ProductDraft,
        image: Option<Vec<u8>>,
    ) -> Result<RawResponse, ApiError> {
        let form = product_form(draft, image.map(|b| (b, UPDATE_FILE_NAME)), true)?;

        debug!(url = %self.update_url(product_id), "Updating product");

        let request = self
            .client
            .put(self.update_url(product_id))
            .timeout(JSON_TIMEOUT)
            .multipart(form);
        self.send(request).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<RawResponse, ApiError> {
        debug!(url = %self.delete_url(product_id), "Deleting product");

        let request = self
            .client
            .delete(self.delete_url(product_id))
            .timeout(JSON_TIMEOUT);
        self.send(request).await
    }

    fn product_photo_url(&self, product_id: &str) -> String {
        format!("{}/get_product_photo/{product_id}", self.base_url)
    }
}
