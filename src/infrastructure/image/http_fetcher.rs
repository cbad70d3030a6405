//! HTTP transport for the image pipeline.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, header};
use tracing::{debug, warn};

use crate::domain::errors::ImageError;
use crate::domain::ports::{FetchedBody, ImageFetcherPort, TokenProviderPort};

/// Timeout for a single image download.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("qskipper-media/", env!("CARGO_PKG_VERSION"));

/// Downloads images with reqwest, bypassing HTTP caches.
pub struct HttpImageFetcher {
    client: Client,
    tokens: Option<Arc<dyn TokenProviderPort>>,
}

impl HttpImageFetcher {
    /// Creates a fetcher without authentication.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ImageError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(IMAGE_TIMEOUT)
            .build()
            .map_err(|e| ImageError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            tokens: None,
        })
    }

    /// Attaches a bearer token source.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenProviderPort>) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

impl std::fmt::Debug for HttpImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageFetcher")
            .field("authenticated", &self.tokens.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpImageFetcher {
    /// Builds the uncached GET for `url`.
    fn request(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .timeout(IMAGE_TIMEOUT)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache");

        match self.tokens.as_ref().and_then(|t| t.token()) {
            Some(token) => request.header(header::AUTHORIZATION, token.bearer_header()),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody, ImageError> {
        let response = self.request(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Image request failed");
            if e.is_timeout() {
                ImageError::network("request timed out")
            } else if e.is_connect() {
                ImageError::network(format!("failed to connect: {e}"))
            } else {
                ImageError::network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::network(format!("failed to read body: {e}")))?;

        debug!(url, status, size = bytes.len(), "Image response received");

        Ok(FetchedBody { status, bytes })
    }
}
