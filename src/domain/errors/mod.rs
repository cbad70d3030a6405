//! Domain error types.

mod api_error;
mod image_error;

pub use api_error::ApiError;
pub use image_error::{CompressError, ImageError};
