//! Product upload record.

/// Fields of a product sent on create or update.
///
/// Built by the caller, serialized once into a request body, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Owning restaurant.
    pub restaurant_id: String,
    /// Free-form description.
    pub description: String,
    /// Food category label.
    pub category: String,
    /// Extra preparation time in minutes.
    pub extra_time: u32,
    /// Price in whole currency units.
    pub price: u64,
    /// Whether the product is featured on the menu.
    pub featured: bool,
}

impl ProductDraft {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        restaurant_id: impl Into<String>,
        category: impl Into<String>,
        price: u64,
    ) -> Self {
        Self {
            name: name.into(),
            restaurant_id: restaurant_id.into(),
            category: category.into(),
            price,
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the extra preparation time.
    #[must_use]
    pub const fn with_extra_time(mut self, minutes: u32) -> Self {
        self.extra_time = minutes;
        self
    }

    /// Marks the product as featured.
    #[must_use]
    pub const fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    /// Returns true if the draft names its restaurant.
    #[must_use]
    pub fn has_restaurant(&self) -> bool {
        !self.restaurant_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_optional_fields() {
        let draft = ProductDraft::new("Masala Dosa", "r1", "South Indian", 120)
            .with_description("Crispy")
            .with_extra_time(10)
            .with_featured(true);

        assert_eq!(draft.description, "Crispy");
        assert_eq!(draft.extra_time, 10);
        assert!(draft.featured);
    }

    #[test]
    fn test_blank_restaurant_is_missing() {
        let draft = ProductDraft::new("Tea", "  ", "Drinks", 10);
        assert!(!draft.has_restaurant());
    }
}
