mod image_cache_port;
mod image_fetcher_port;
mod product_api_port;
mod token_provider_port;

pub use image_cache_port::{ImageCachePort, ImageResult};
pub use image_fetcher_port::{FetchedBody, ImageFetcherPort};
#[cfg(test)]
pub use product_api_port::MockProductApiPort;
pub use product_api_port::{ProductApiPort, RawResponse};
pub use token_provider_port::TokenProviderPort;
