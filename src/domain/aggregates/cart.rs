//! Cart Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, ProductId, Quantity};

/// Orders below this total are rejected before reaching the order service.
pub const MINIMUM_ORDER_AMOUNT: Money = Money::new(1000);

/// Cart ledger: at most one line per product, every line with a positive quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: Quantity,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.product.price().multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id() == product_id)
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Quantity {
        self.line(product_id).map(|l| l.quantity).unwrap_or_default()
    }

    pub fn total_amount(&self) -> Money { self.lines.iter().map(CartLine::line_total).sum() }

    pub fn total_items(&self) -> u64 { self.lines.iter().map(|l| u64::from(l.quantity.value())).sum() }

    pub fn is_minimum_order_met(&self) -> bool { self.total_amount() >= MINIMUM_ORDER_AMOUNT }

    /// Merges into the existing line for `product` or inserts a new one.
    /// Rejects the whole call if the resulting quantity would exceed available stock.
    pub fn add_item(&mut self, product: &Product, quantity: Quantity) -> Result<(), CartError> {
        if quantity.is_zero() { return Err(CartError::InvalidQuantity); }
        let requested = self.quantity_of(product.id()).add(quantity);
        ensure_stock(product, requested)?;
        match self.lines.iter_mut().find(|l| l.product.id() == product.id()) {
            Some(existing) => existing.quantity = requested,
            None => self.lines.push(CartLine { product: product.clone(), quantity }),
        }
        Ok(())
    }

    /// Sets the quantity of an existing line. Returns `Ok(false)` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: Quantity) -> Result<bool, CartError> {
        if quantity.is_zero() { return Err(CartError::InvalidQuantity); }
        let Some(line) = self.lines.iter_mut().find(|l| l.product.id() == product_id) else { return Ok(false) };
        ensure_stock(&line.product, quantity)?;
        line.quantity = quantity;
        Ok(true)
    }

    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id() != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) { self.lines.clear(); }

    /// True while another unit of `product_id` still fits in the available stock.
    pub fn can_increment(&self, product: &Product) -> bool { self.quantity_of(product.id()) < product.available() }
}

fn ensure_stock(product: &Product, requested: Quantity) -> Result<(), CartError> {
    if requested > product.available() {
        return Err(CartError::InsufficientStock { product_id: product.id(), requested, available: product.available() });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    ProductNotFound(ProductId),
    InvalidQuantity,
    InsufficientStock { product_id: ProductId, requested: Quantity, available: Quantity },
}

impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProductNotFound(id) => write!(f, "Product {id} not found"),
            Self::InvalidQuantity => write!(f, "Quantity must be positive"),
            Self::InsufficientStock { product_id, requested, available } => {
                write!(f, "Insufficient stock for product {product_id}: requested {requested}, available {available}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, price: u64, stock: u32) -> Product {
        Product::new(id, format!("Product {id}"), Money::new(price), Quantity::new(stock))
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        let p1 = product(1, 600, 10);
        cart.add_item(&p1, Quantity::new(2)).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_amount(), Money::new(1200));
        cart.add_item(&p1, Quantity::ONE).unwrap();
        assert_eq!(cart.lines()[0].quantity, Quantity::new(3)); // Merged
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_one_line_per_product_across_mutations() {
        let mut cart = Cart::new();
        let (a, b) = (product(1, 100, 20), product(2, 300, 20));
        for _ in 0..3 {
            cart.add_item(&a, Quantity::ONE).unwrap();
            cart.add_item(&b, Quantity::new(2)).unwrap();
        }
        cart.set_quantity(a.id(), Quantity::new(5)).unwrap();
        cart.remove_item(b.id());
        cart.add_item(&b, Quantity::ONE).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_amount(), Money::new(5 * 100 + 300));
        assert_eq!(cart.total_items(), 6);
    }

    #[test]
    fn test_minimum_order_threshold() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 999, 5), Quantity::ONE).unwrap();
        assert!(!cart.is_minimum_order_met());
        cart.add_item(&product(2, 1, 5), Quantity::ONE).unwrap();
        assert!(cart.is_minimum_order_met());
    }

    #[test]
    fn test_stock_ceiling_rejects_without_change() {
        let mut cart = Cart::new();
        let p = product(1, 100, 2);
        cart.add_item(&p, Quantity::new(2)).unwrap();
        assert!(!cart.can_increment(&p));
        let err = cart.add_item(&p, Quantity::ONE).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { requested, .. } if requested == Quantity::new(3)));
        assert_eq!(cart.quantity_of(p.id()), Quantity::new(2));
        assert!(cart.set_quantity(p.id(), Quantity::new(3)).is_err());
    }

    #[test]
    fn test_set_quantity_missing_line_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.set_quantity(ProductId::new(9), Quantity::new(2)), Ok(false));
        assert!(cart.is_empty());
        assert!(!cart.remove_item(ProductId::new(9)));
    }
}
