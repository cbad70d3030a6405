//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{Fingerprint, LoadedImage, fingerprint};
pub use errors::{ApiError, ImageError};
pub use ports::{ImageCachePort, ImageFetcherPort, ProductApiPort};
