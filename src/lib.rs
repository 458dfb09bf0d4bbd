//! OpenSASE Cart
//!
//! Cart and order state manager for the storefront apps.
//!
//! ## Features
//! - Product catalog cache
//! - Cart ledger with stock ceiling and derived totals
//! - Delivery options
//! - Order submission with minimum-order enforcement and error translation
//! - Best-effort analytics with recorded delivery status

pub mod api;
pub mod config;
pub mod domain;
pub mod services;
pub mod store;

use thiserror::Error;

pub use config::StoreConfig;
pub use domain::aggregates::{
    Cart, CartError, CartLine, OptionId, OrderErrorCode, OrderOption, OrderRequest, OrderSubmissionResult, Product,
    SubmissionPhase, MINIMUM_ORDER_AMOUNT,
};
pub use domain::events::{AnalyticsEvent, DeliveryStatus, EventKind};
pub use domain::value_objects::{Money, ProductId, Quantity};
pub use services::{AnalyticsSink, OrderService, ProductSupplier, Services};
pub use store::{CartStore, StoreChange, StoreSnapshot};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cart store must be created inside a Tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
