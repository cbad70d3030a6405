//! Product API client.

pub mod payload;
pub mod product_client;

pub use product_client::ProductApiClient;
