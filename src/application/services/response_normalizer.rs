//! Extracts results from create, update and delete replies.
//!
//! Create replies have come in several shapes over time, so the body is tried
//! against an ordered list of strategies. The first one that yields an
//! identifier wins.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::entities::RecordId;
use crate::domain::errors::ApiError;
use crate::domain::ports::RawResponse;

/// Bodies shorter than this are logged verbatim when nothing matches.
const MAX_LOGGED_BODY: usize = 1000;

/// Bare identifiers must be longer than this.
const MIN_BARE_ID_LEN: usize = 5;

type Strategy = fn(&[u8]) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("id_field", id_field),
    ("bare_string", bare_string),
    ("envelope", envelope),
];

#[derive(Deserialize)]
struct IdField {
    #[serde(rename = "productId")]
    product_id: String,
}

#[derive(Deserialize)]
struct Envelope {
    product: EnvelopeProduct,
}

#[derive(Deserialize)]
struct EnvelopeProduct {
    #[serde(alias = "_id")]
    id: String,
}

fn non_empty(id: String) -> Option<String> {
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn id_field(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<IdField>(body)
        .ok()
        .and_then(|parsed| non_empty(parsed.product_id))
}

fn bare_string(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    let candidate = if text.starts_with('"') {
        serde_json::from_str::<String>(text).ok()?
    } else {
        text.to_string()
    };

    let looks_like_document = candidate.starts_with('{') || candidate.starts_with('[');

    (candidate.chars().count() > MIN_BARE_ID_LEN && !looks_like_document).then_some(candidate)
}

fn envelope(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Envelope>(body)
        .ok()
        .and_then(|parsed| non_empty(parsed.product.id))
}

/// Turns a create reply into a [`RecordId`].
///
/// A successful reply with no readable identifier yields a provisional one.
///
/// # Errors
/// Returns `ApiError::Rejected` for non-2xx statuses.
pub fn normalize_response(response: &RawResponse) -> Result<RecordId, ApiError> {
    if !response.is_success() {
        warn!(status = response.status, "Server rejected product request");
        return Err(ApiError::rejected(response.status, response.body_text()));
    }

    for (name, strategy) in STRATEGIES {
        if let Some(id) = strategy(&response.body) {
            debug!(strategy = *name, id = %id, "Extracted product id");
            return Ok(RecordId::Confirmed(id));
        }
    }

    if response.body.len() < MAX_LOGGED_BODY {
        warn!(body = %response.body_text(), "No product id in response, using provisional id");
    } else {
        warn!(
            len = response.body.len(),
            "No product id in response, using provisional id"
        );
    }

    Ok(RecordId::provisional())
}

#[derive(Deserialize)]
struct DeleteReply {
    success: bool,
}

/// Reads the `{"success": bool}` reply of a delete call.
///
/// # Errors
/// Returns `ApiError::Rejected` unless the status is exactly 200, and
/// `ApiError::Unexpected` if the body is not a delete reply.
pub fn delete_outcome(response: &RawResponse) -> Result<bool, ApiError> {
    if response.status != 200 {
        warn!(status = response.status, body = %response.body_text(), "Server rejected delete");
        return Err(ApiError::rejected(response.status, response.body_text()));
    }

    serde_json::from_slice::<DeleteReply>(&response.body)
        .map(|reply| reply.success)
        .map_err(|e| ApiError::unexpected(format!("unreadable delete reply: {e}")))
}
