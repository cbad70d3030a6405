//! Domain entity definitions.

mod fingerprint;
mod image;
mod product;
mod record_id;
mod token;

pub use fingerprint::{Fingerprint, fingerprint};
pub use image::{CacheEvent, ImageSource, LoadedImage};
pub use product::ProductDraft;
pub use record_id::{PROVISIONAL_PREFIX, RecordId};
pub use token::AuthToken;
