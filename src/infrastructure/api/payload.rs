//! Request bodies for the product endpoints.
//!
//! Field names are fixed by the remote service and must not change.

use base64::{Engine as _, engine::general_purpose};
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::domain::entities::ProductDraft;
use crate::domain::errors::ApiError;

/// Form and JSON field names.
pub mod fields {
    /// Product display name.
    pub const PRODUCT_NAME: &str = "product_name";
    /// Owning restaurant.
    pub const RESTAURANT_ID: &str = "restaurant_id";
    /// Description text.
    pub const DESCRIPTION: &str = "description";
    /// Category label.
    pub const FOOD_CATEGORY: &str = "food_category";
    /// Extra preparation time.
    pub const EXTRA_TIME: &str = "extraTime";
    /// Price.
    pub const PRODUCT_PRICE: &str = "product_price";
    /// Image, base64 in JSON bodies and a file part in multipart bodies.
    pub const PRODUCT_PHOTO: &str = "product_photo64Image";
    /// Featured flag, sent on update only.
    pub const FEATURED_ITEM: &str = "featured_Item";
}

const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Serialize)]
struct ProductJsonBody<'a> {
    product_name: &'a str,
    restaurant_id: &'a str,
    description: &'a str,
    food_category: &'a str,
    #[serde(rename = "extraTime")]
    extra_time: String,
    product_price: String,
    #[serde(rename = "product_photo64Image", skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
}

/// Builds the JSON create body, embedding the image as base64.
#[must_use]
pub fn product_json(draft: &ProductDraft, image: Option<&[u8]>) -> serde_json::Value {
    let body = ProductJsonBody {
        product_name: &draft.name,
        restaurant_id: &draft.restaurant_id,
        description: &draft.description,
        food_category: &draft.category,
        extra_time: draft.extra_time.to_string(),
        product_price: draft.price.to_string(),
        photo: image.map(|bytes| general_purpose::STANDARD.encode(bytes)),
    };
    serde_json::to_value(body).unwrap_or_default()
}

/// Returns the text fields of a multipart body in send order.
#[must_use]
pub fn text_fields(draft: &ProductDraft, include_featured: bool) -> Vec<(&'static str, String)> {
    let mut out = vec![
        (fields::PRODUCT_NAME, draft.name.clone()),
        (fields::RESTAURANT_ID, draft.restaurant_id.clone()),
        (fields::DESCRIPTION, draft.description.clone()),
        (fields::FOOD_CATEGORY, draft.category.clone()),
        (fields::EXTRA_TIME, draft.extra_time.to_string()),
        (fields::PRODUCT_PRICE, draft.price.to_string()),
    ];
    if include_featured {
        out.push((fields::FEATURED_ITEM, draft.featured.to_string()));
    }
    out
}

/// Builds a multipart body with an optional JPEG part.
///
/// # Errors
/// Returns error if the part cannot be built.
pub fn product_form(
    draft: &ProductDraft,
    image: Option<(Vec<u8>, &'static str)>,
    include_featured: bool,
) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in text_fields(draft, include_featured) {
        form = form.text(name, value);
    }

    if let Some((bytes, file_name)) = image {
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(JPEG_MIME)
            .map_err(|e| ApiError::unexpected(format!("invalid image part: {e}")))?;
        form = form.part(fields::PRODUCT_PHOTO, part);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft::new("Paneer Tikka", "rest-42", "Starters", 180)
            .with_description("Smoky")
            .with_extra_time(15)
            .with_featured(true)
    }

    #[test]
    fn test_json_uses_service_field_names() {
        let body = product_json(&draft(), None);

        assert_eq!(body["product_name"], "Paneer Tikka");
        assert_eq!(body["restaurant_id"], "rest-42");
        assert_eq!(body["description"], "Smoky");
        assert_eq!(body["food_category"], "Starters");
        assert_eq!(body["extraTime"], "15");
        assert_eq!(body["product_price"], "180");
        assert!(body.get("product_photo64Image").is_none());
    }

    #[test]
    fn test_json_embeds_base64_image() {
        let body = product_json(&draft(), Some(&[0xff, 0xd8, 0xff]));

        let encoded = body["product_photo64Image"].as_str().unwrap();
        assert_eq!(
            general_purpose::STANDARD.decode(encoded).unwrap(),
            vec![0xff, 0xd8, 0xff]
        );
    }

    #[test]
    fn test_featured_only_on_update() {
        let create: Vec<_> = text_fields(&draft(), false).into_iter().map(|(k, _)| k).collect();
        let update = text_fields(&draft(), true);

        assert!(!create.contains(&fields::FEATURED_ITEM));
        assert_eq!(
            update.last(),
            Some(&(fields::FEATURED_ITEM, "true".to_string()))
        );
    }

    #[test]
    fn test_form_has_boundary() {
        let form = product_form(&draft(), Some((vec![1, 2, 3], "product.jpg")), false).unwrap();
        assert!(!form.boundary().is_empty());
    }
}
