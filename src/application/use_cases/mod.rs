//! Use case implementations.

mod save_product_use_case;

pub use save_product_use_case::SaveProductUseCase;
