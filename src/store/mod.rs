//! CartStore - catalog cache, cart ledger, option set and order submission
//!
//! All state lives in one container behind a short-lived lock. Mutators are
//! synchronous: they update state, publish a [`StoreChange`] and hand an
//! analytics event to the [`AnalyticsEmitter`] without waiting for it.
//!
//! # Submission Flow
//!
//! ```text
//! submit_order()
//!     ├─ 1. Validate: empty cart / below minimum → failure, no network call
//!     ├─ 2. Set loading, clear error, snapshot the cart
//!     ├─ 3. Call the order service (timeout + shutdown bounded)
//!     ├─ 4. Deliver ORDER_SUBMITTED for the snapshot (awaited)
//!     └─ 5. Success → clear cart and options; failure → translated error, cart kept
//! ```

mod analytics;

pub use analytics::AnalyticsEmitter;

use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::StoreConfig;
use crate::domain::aggregates::{
    Cart, CartError, CartLine, OptionId, OptionSet, OrderErrorCode, OrderOption, OrderRequest,
    OrderSubmissionResult, Product, SubmissionPhase,
};
use crate::domain::events::{AnalyticsEvent, EventKind};
use crate::domain::value_objects::{Money, ProductId, Quantity};
use crate::services::Services;
use crate::{Result, StoreError};

pub const MSG_LOAD_FAILED: &str = "Failed to load products";

/// Change notification capacity. Slow subscribers see `Lagged` and should re-read a snapshot.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// What part of the store changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreChange {
    Catalog,
    Cart,
    Options,
    Loading,
    Error,
    Submission,
    Analytics,
}

/// Read-only view of everything a UI renders.
#[derive(Clone, Debug, Serialize)]
pub struct StoreSnapshot {
    pub product_count: usize,
    pub cart_items: Vec<CartLine>,
    pub order_options: Vec<OrderOption>,
    pub selected_options: Vec<OrderOption>,
    pub total_amount: Money,
    pub total_items: u64,
    pub is_minimum_order_met: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub submission: SubmissionPhase,
    pub analytics_events: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    products: Vec<Product>,
    cart: Cart,
    options: OptionSet,
    is_loading: bool,
    error: Option<String>,
    phase: SubmissionPhase,
}

impl StoreState {
    fn analytics_event(&self, kind: EventKind) -> AnalyticsEvent {
        AnalyticsEvent::new(kind, self.cart.lines().to_vec(), self.options.selected())
    }
}

pub struct CartStore {
    state: RwLock<StoreState>,
    services: Services,
    config: StoreConfig,
    analytics: AnalyticsEmitter,
    changes: broadcast::Sender<StoreChange>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.state.read())
            .field("analytics", &self.analytics)
            .finish()
    }
}

impl CartStore {
    /// Creates an empty store bound to the current Tokio runtime.
    pub fn new(config: StoreConfig, services: Services) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();
        let analytics = AnalyticsEmitter::new(
            services.analytics.clone(),
            runtime,
            config.service_timeout,
            shutdown.clone(),
            changes.clone(),
        );
        Ok(Self { state: RwLock::default(), services, config, analytics, changes, shutdown })
    }

    /// Creates the store and loads the catalog once.
    pub async fn init(config: StoreConfig, services: Services) -> Result<Self> {
        let store = Self::new(config, services)?;
        store.load_products().await;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig { &self.config }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> { self.changes.subscribe() }

    fn notify(&self, change: StoreChange) {
        let _ = self.changes.send(change);
    }

    /// Cancels in-flight service calls and drops pending analytics.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.analytics.settle().await;
        tracing::info!("Cart store shut down");
    }

    // ========== Catalog ==========

    pub async fn load_products(&self) {
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        self.notify(StoreChange::Loading);

        let fetched = bounded(self.config.service_timeout, &self.shutdown, self.services.catalog.fetch(self.config.catalog_size)).await;

        let mut state = self.state.write();
        match fetched {
            Ok(products) => {
                tracing::info!(count = products.len(), "Catalog loaded");
                state.products = products;
            }
            Err(e) => {
                tracing::warn!("Failed to load catalog: {:#}", e);
                state.error = Some(MSG_LOAD_FAILED.to_string());
            }
        }
        state.is_loading = false;
        drop(state);
        self.notify(StoreChange::Catalog);
        self.notify(StoreChange::Loading);
    }

    pub fn products(&self) -> Vec<Product> { self.state.read().products.clone() }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.state.read().products.iter().find(|p| p.id() == id).cloned()
    }

    /// Case-insensitive substring search over name and description.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.trim().to_lowercase();
        let state = self.state.read();
        if needle.is_empty() {
            return state.products.clone();
        }
        state.products.iter().filter(|p| p.matches(&needle)).cloned().collect()
    }

    // ========== Cart ledger ==========

    pub fn add_to_cart(&self, product: &Product, quantity: Quantity) -> std::result::Result<(), CartError> {
        let event = {
            let mut state = self.state.write();
            state.cart.add_item(product, quantity)?;
            state.analytics_event(EventKind::CartUpdated)
        };
        self.notify(StoreChange::Cart);
        self.analytics.emit(event);
        Ok(())
    }

    /// Looks the product up in the catalog, then behaves as [`CartStore::add_to_cart`].
    pub fn add_product(&self, product_id: ProductId, quantity: Quantity) -> std::result::Result<(), CartError> {
        let product = self.product(product_id).ok_or(CartError::ProductNotFound(product_id))?;
        self.add_to_cart(&product, quantity)
    }

    /// Removes the line if present. Emits `CART_UPDATED` either way.
    pub fn remove_from_cart(&self, product_id: ProductId) -> bool {
        let (removed, event) = {
            let mut state = self.state.write();
            let removed = state.cart.remove_item(product_id);
            (removed, state.analytics_event(EventKind::CartUpdated))
        };
        if removed {
            self.notify(StoreChange::Cart);
        }
        self.analytics.emit(event);
        removed
    }

    /// Non-positive quantities remove the line. Products not in the cart are left alone.
    pub fn update_quantity(&self, product_id: ProductId, quantity: i64) -> std::result::Result<(), CartError> {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return Ok(());
        }
        let quantity = Quantity::new(u32::try_from(quantity).unwrap_or(u32::MAX));
        let event = {
            let mut state = self.state.write();
            if !state.cart.set_quantity(product_id, quantity)? {
                return Ok(());
            }
            state.analytics_event(EventKind::CartUpdated)
        };
        self.notify(StoreChange::Cart);
        self.analytics.emit(event);
        Ok(())
    }

    /// Empties the cart and deselects every option. Not tracked by analytics.
    pub fn clear_cart(&self) {
        {
            let mut state = self.state.write();
            state.cart.clear();
            state.options.reset();
        }
        self.notify(StoreChange::Cart);
        self.notify(StoreChange::Options);
    }

    pub fn cart_items(&self) -> Vec<CartLine> { self.state.read().cart.lines().to_vec() }
    pub fn quantity_of(&self, product_id: ProductId) -> Quantity { self.state.read().cart.quantity_of(product_id) }
    pub fn can_increment(&self, product: &Product) -> bool { self.state.read().cart.can_increment(product) }
    pub fn total_amount(&self) -> Money { self.state.read().cart.total_amount() }
    pub fn total_items(&self) -> u64 { self.state.read().cart.total_items() }
    pub fn is_minimum_order_met(&self) -> bool { self.state.read().cart.is_minimum_order_met() }

    // ========== Options ==========

    /// Flips the named option and returns its new state, or `None` for an unknown id.
    pub fn toggle_option(&self, option_id: &str) -> Option<bool> {
        let id: OptionId = match option_id.parse() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Ignoring toggle: {}", e);
                return None;
            }
        };
        let (selected, event) = {
            let mut state = self.state.write();
            let selected = state.options.toggle(id);
            (selected, state.analytics_event(EventKind::CartUpdated))
        };
        self.notify(StoreChange::Options);
        self.analytics.emit(event);
        Some(selected)
    }

    pub fn order_options(&self) -> Vec<OrderOption> { self.state.read().options.all().to_vec() }
    pub fn selected_options(&self) -> Vec<OrderOption> { self.state.read().options.selected() }

    // ========== Submission ==========

    pub fn is_loading(&self) -> bool { self.state.read().is_loading }
    pub fn error(&self) -> Option<String> { self.state.read().error.clone() }
    pub fn submission_phase(&self) -> SubmissionPhase { self.state.read().phase }

    /// Validates the cart and submits it. Errors are reported through the result and the
    /// shared error field, never as `Err`.
    ///
    /// Callers must not start a second submission while [`CartStore::is_loading`] is true.
    pub async fn submit_order(&self) -> OrderSubmissionResult {
        let request = {
            let mut state = self.state.write();
            state.phase = SubmissionPhase::Validating;
            let rejection = if state.cart.is_empty() {
                Some(OrderErrorCode::EmptyCart)
            } else if !state.cart.is_minimum_order_met() {
                Some(OrderErrorCode::MinimumAmountNotReached)
            } else {
                None
            };
            if let Some(code) = rejection {
                tracing::info!(code = %code, "Order rejected before submission");
                let result = OrderSubmissionResult::failure(code);
                state.error = result.message.clone();
                state.phase = SubmissionPhase::Failed;
                drop(state);
                self.notify(StoreChange::Error);
                self.notify(StoreChange::Submission);
                return result;
            }
            state.phase = SubmissionPhase::Submitting;
            state.is_loading = true;
            state.error = None;
            OrderRequest {
                items: state.cart.lines().to_vec(),
                options: state.options.selected(),
                total_amount: state.cart.total_amount(),
            }
        };
        self.notify(StoreChange::Loading);
        self.notify(StoreChange::Submission);
        tracing::info!(total = %request.total_amount, lines = request.items.len(), "Submitting order");

        let outcome = bounded(self.config.service_timeout, &self.shutdown, self.services.orders.submit(&request)).await;

        let event = AnalyticsEvent::new(EventKind::OrderSubmitted, request.items, request.options);
        self.analytics.deliver(event).await;

        let mut state = self.state.write();
        state.is_loading = false;
        let result = match outcome {
            Ok(result) if result.success => {
                tracing::info!("Order submitted");
                state.cart.clear();
                state.options.reset();
                state.phase = SubmissionPhase::Succeeded;
                result
            }
            Ok(result) => {
                let code = result.error_code.unwrap_or_else(|| OrderErrorCode::Other("UNKNOWN".into()));
                tracing::warn!(code = %code, "Order service rejected the order");
                let failure = OrderSubmissionResult::failure(code);
                state.error = failure.message.clone();
                state.phase = SubmissionPhase::Failed;
                failure
            }
            Err(e) => {
                tracing::warn!("Order submission failed: {:#}", e);
                let failure = OrderSubmissionResult::unexpected();
                state.error = failure.message.clone();
                state.phase = SubmissionPhase::Failed;
                failure
            }
        };
        let succeeded = result.success;
        drop(state);

        self.notify(StoreChange::Loading);
        if succeeded {
            self.notify(StoreChange::Cart);
            self.notify(StoreChange::Options);
        } else {
            self.notify(StoreChange::Error);
        }
        self.notify(StoreChange::Submission);
        result
    }

    // ========== Analytics ==========

    pub fn analytics(&self) -> &AnalyticsEmitter { &self.analytics }
    pub fn analytics_events(&self) -> Vec<AnalyticsEvent> { self.analytics.events() }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        StoreSnapshot {
            product_count: state.products.len(),
            cart_items: state.cart.lines().to_vec(),
            order_options: state.options.all().to_vec(),
            selected_options: state.options.selected(),
            total_amount: state.cart.total_amount(),
            total_items: state.cart.total_items(),
            is_minimum_order_met: state.cart.is_minimum_order_met(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            submission: state.phase,
            analytics_events: self.analytics.recorded(),
        }
    }
}

/// Runs an external call under `timeout`, abandoning it once `shutdown` fires.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    shutdown: &CancellationToken,
    call: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => Err(anyhow::anyhow!("cancelled by shutdown")),
        outcome = tokio::time::timeout(timeout, call) => match outcome {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("timed out after {:?}", timeout)),
        },
    }
}
