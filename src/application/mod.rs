//! Application layer with use cases and response handling.

/// Response parsing services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{delete_outcome, normalize_response};
pub use use_cases::SaveProductUseCase;
