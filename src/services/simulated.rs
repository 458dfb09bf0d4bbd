//! In-process stand-ins for the catalog, order and analytics endpoints

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use crate::config::StoreConfig;
use crate::domain::aggregates::{OrderErrorCode, OrderRequest, OrderSubmissionResult, Product, MINIMUM_ORDER_AMOUNT};
use crate::domain::events::AnalyticsEvent;
use crate::domain::value_objects::{Money, Quantity};
use super::{AnalyticsSink, OrderService, ProductSupplier};

const CATEGORIES: [&str; 5] = ["Groceries", "Electronics", "Clothing", "Furniture", "Books"];

/// Generates `count` products with random prices (100..1100) and stock (1..=20).
pub fn generate_products(count: usize) -> Vec<Product> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|i| {
            let category = CATEGORIES[(i % CATEGORIES.len() as u64) as usize];
            Product::new(i, format!("Product {i}"), Money::new(rng.gen_range(100..1100)), Quantity::new(rng.gen_range(1..=20)))
                .with_description(format!("Description of product {i} from category {category}"))
                .with_image(format!("https://picsum.photos/id/{}/150/150", (i % 1000) + 1))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SimulatedCatalog { latency: Duration }

impl SimulatedCatalog {
    pub fn new(config: &StoreConfig) -> Self { Self { latency: config.latency(Duration::from_millis(500)) } }
}

#[async_trait]
impl ProductSupplier for SimulatedCatalog {
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<Product>> {
        tokio::time::sleep(self.latency).await;
        Ok(generate_products(count))
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedOrders { latency: Duration, failure_rate: f64 }

impl SimulatedOrders {
    pub fn new(config: &StoreConfig) -> Self {
        Self { latency: config.latency(Duration::from_millis(1000)), failure_rate: config.order_failure_rate }
    }
}

#[async_trait]
impl OrderService for SimulatedOrders {
    async fn submit(&self, order: &OrderRequest) -> anyhow::Result<OrderSubmissionResult> {
        tokio::time::sleep(self.latency).await;
        if rand::random::<f64>() < self.failure_rate {
            return Ok(OrderSubmissionResult::failure(OrderErrorCode::ServerUnavailable));
        }
        if order.total_amount < MINIMUM_ORDER_AMOUNT {
            return Ok(OrderSubmissionResult::failure(OrderErrorCode::MinimumAmountNotReached));
        }
        Ok(OrderSubmissionResult::success())
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedAnalytics { latency: Duration, failure_rate: f64 }

impl SimulatedAnalytics {
    pub fn new(config: &StoreConfig) -> Self {
        Self { latency: config.latency(Duration::from_millis(500)), failure_rate: config.analytics_failure_rate }
    }
}

#[async_trait]
impl AnalyticsSink for SimulatedAnalytics {
    async fn send(&self, _event: &AnalyticsEvent) -> anyhow::Result<bool> {
        tokio::time::sleep(self.latency).await;
        Ok(rand::random::<f64>() >= self.failure_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ProductId;

    fn instant() -> StoreConfig { StoreConfig::default().with_latency_scale(0.0) }

    #[test]
    fn test_generated_products_within_ranges() {
        let products = generate_products(200);
        assert_eq!(products.len(), 200);
        assert_eq!(products[0].id(), ProductId::new(1));
        assert_eq!(products[4].description(), "Description of product 5 from category Groceries");
        assert_eq!(products[199].image(), Some("https://picsum.photos/id/201/150/150"));
        for p in &products {
            assert!((100..1100).contains(&p.price().amount()));
            assert!((1..=20).contains(&p.available().value()));
        }
    }

    #[tokio::test]
    async fn test_orders_below_minimum_rejected() {
        let orders = SimulatedOrders::new(&instant().with_failure_rates(0.0, 0.0));
        let request = OrderRequest { items: vec![], options: vec![], total_amount: Money::new(999) };
        let result = orders.submit(&request).await.unwrap();
        assert_eq!(result.error_code, Some(OrderErrorCode::MinimumAmountNotReached));
        let request = OrderRequest { total_amount: Money::new(1000), ..request };
        assert!(orders.submit(&request).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_orders_always_unavailable_at_full_failure_rate() {
        let orders = SimulatedOrders::new(&instant().with_failure_rates(1.0, 0.0));
        let request = OrderRequest { items: vec![], options: vec![], total_amount: Money::new(5000) };
        assert_eq!(orders.submit(&request).await.unwrap().error_code, Some(OrderErrorCode::ServerUnavailable));
    }

    #[tokio::test]
    async fn test_analytics_failure_rate_bounds() {
        let event = AnalyticsEvent::new(crate::domain::events::EventKind::CartUpdated, vec![], vec![]);
        assert!(SimulatedAnalytics::new(&instant().with_failure_rates(0.0, 0.0)).send(&event).await.unwrap());
        assert!(!SimulatedAnalytics::new(&instant().with_failure_rates(0.0, 1.0)).send(&event).await.unwrap());
    }
}
