//! Test doubles with preset outcomes and call recording

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::domain::aggregates::{OrderRequest, OrderSubmissionResult, Product};
use crate::domain::events::AnalyticsEvent;
use crate::domain::value_objects::{Money, Quantity};
use super::{AnalyticsSink, OrderService, ProductSupplier, Services};

pub(crate) fn product(id: u64, price: u64, stock: u32) -> Product {
    Product::new(id, format!("Product {id}"), Money::new(price), Quantity::new(stock))
}

pub(crate) struct ScriptedCatalog {
    products: Option<Vec<Product>>,
}

#[async_trait]
impl ProductSupplier for ScriptedCatalog {
    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<Product>> {
        match &self.products {
            Some(products) => Ok(products.iter().take(count).cloned().collect()),
            None => anyhow::bail!("catalog offline"),
        }
    }
}

pub(crate) enum OrderOutcome {
    Result(OrderSubmissionResult),
    Transport,
    Hang,
}

#[derive(Default)]
pub(crate) struct ScriptedOrders {
    outcomes: Mutex<VecDeque<OrderOutcome>>,
    requests: Mutex<Vec<OrderRequest>>,
    delay: Duration,
}

impl ScriptedOrders {
    pub(crate) fn push(&self, outcome: OrderOutcome) { self.outcomes.lock().push_back(outcome); }
    pub(crate) fn calls(&self) -> usize { self.requests.lock().len() }
    pub(crate) fn requests(&self) -> Vec<OrderRequest> { self.requests.lock().clone() }
}

#[async_trait]
impl OrderService for ScriptedOrders {
    async fn submit(&self, order: &OrderRequest) -> anyhow::Result<OrderSubmissionResult> {
        self.requests.lock().push(order.clone());
        let outcome = self.outcomes.lock().pop_front();
        tokio::time::sleep(self.delay).await;
        match outcome.unwrap_or(OrderOutcome::Result(OrderSubmissionResult::success())) {
            OrderOutcome::Result(result) => Ok(result),
            OrderOutcome::Transport => anyhow::bail!("connection reset"),
            OrderOutcome::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub(crate) struct ScriptedAnalytics {
    fail: bool,
    error: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl AnalyticsSink for ScriptedAnalytics {
    async fn send(&self, _event: &AnalyticsEvent) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.error { anyhow::bail!("analytics endpoint unreachable"); }
        Ok(!self.fail)
    }
}

impl ScriptedAnalytics {
    pub(crate) fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

/// Handles onto the doubles behind a [`Services`] bundle.
pub(crate) struct Harness {
    pub orders: Arc<ScriptedOrders>,
    pub analytics: Arc<ScriptedAnalytics>,
}

pub(crate) struct HarnessBuilder {
    products: Option<Vec<Product>>,
    order_delay: Duration,
    analytics_fail: bool,
    analytics_error: bool,
}

impl HarnessBuilder {
    pub(crate) fn new(products: Vec<Product>) -> Self {
        Self { products: Some(products), order_delay: Duration::ZERO, analytics_fail: false, analytics_error: false }
    }

    pub(crate) fn offline_catalog(mut self) -> Self { self.products = None; self }
    pub(crate) fn order_delay(mut self, delay: Duration) -> Self { self.order_delay = delay; self }
    pub(crate) fn analytics_failing(mut self) -> Self { self.analytics_fail = true; self }
    pub(crate) fn analytics_erroring(mut self) -> Self { self.analytics_error = true; self }

    pub(crate) fn build(self) -> (Services, Harness) {
        let orders = Arc::new(ScriptedOrders { delay: self.order_delay, ..Default::default() });
        let analytics = Arc::new(ScriptedAnalytics { fail: self.analytics_fail, error: self.analytics_error, ..Default::default() });
        let services = Services::new(Arc::new(ScriptedCatalog { products: self.products }), orders.clone(), analytics.clone());
        (services, Harness { orders, analytics })
    }
}
