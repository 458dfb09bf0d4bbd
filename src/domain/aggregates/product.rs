//! Product Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, ProductId, Quantity};

/// Catalog entry. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    description: String,
    image: Option<String>,
    available: Quantity,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, available: Quantity) -> Self {
        Self { id: id.into(), name: name.into(), price, description: String::new(), image: None, available }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn id(&self) -> ProductId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> Money { self.price }
    pub fn description(&self) -> &str { &self.description }
    pub fn image(&self) -> Option<&str> { self.image.as_deref() }
    pub fn available(&self) -> Quantity { self.available }
    pub fn is_in_stock(&self) -> bool { !self.available.is_zero() }

    /// Case-insensitive match on name or description. `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_product_create() {
        let p = Product::new(7, "Product 7", Money::new(250), Quantity::new(3))
            .with_description("Description of product 7 from category Books")
            .with_image("https://picsum.photos/id/8/150/150");
        assert_eq!(p.id(), ProductId::new(7));
        assert_eq!(p.image(), Some("https://picsum.photos/id/8/150/150"));
        assert!(p.is_in_stock());
    }
    #[test]
    fn test_matches_description() {
        let p = Product::new(1, "Product 1", Money::new(100), Quantity::new(1)).with_description("Fresh Groceries");
        assert!(p.matches("groceries"));
        assert!(p.matches("product"));
        assert!(!p.matches("books"));
    }
}
