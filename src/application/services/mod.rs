mod response_normalizer;

pub use response_normalizer::{delete_outcome, normalize_response};
