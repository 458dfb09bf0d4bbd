//! External collaborators the store depends on

use async_trait::async_trait;
use std::sync::Arc;
use crate::domain::aggregates::{OrderRequest, OrderSubmissionResult, Product};
use crate::domain::events::AnalyticsEvent;

pub mod simulated;
#[cfg(test)]
pub(crate) mod scripted;

pub use simulated::{SimulatedAnalytics, SimulatedCatalog, SimulatedOrders};

#[async_trait]
pub trait ProductSupplier: Send + Sync {
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<Product>>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// A returned `Err` is a transport failure; service-level rejections come back as `Ok` with `success: false`.
    async fn submit(&self, order: &OrderRequest) -> anyhow::Result<OrderSubmissionResult>;
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// `Ok(true)` when the event was delivered.
    async fn send(&self, event: &AnalyticsEvent) -> anyhow::Result<bool>;
}

/// The three collaborators injected into a store.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn ProductSupplier>,
    pub orders: Arc<dyn OrderService>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl Services {
    pub fn new(catalog: Arc<dyn ProductSupplier>, orders: Arc<dyn OrderService>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self { catalog, orders, analytics }
    }

    pub fn simulated(config: &crate::StoreConfig) -> Self {
        Self::new(
            Arc::new(SimulatedCatalog::new(config)),
            Arc::new(SimulatedOrders::new(config)),
            Arc::new(SimulatedAnalytics::new(config)),
        )
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("catalog", &"<dyn ProductSupplier>")
            .field("orders", &"<dyn OrderService>")
            .field("analytics", &"<dyn AnalyticsSink>")
            .finish()
    }
}
