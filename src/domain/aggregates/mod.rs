//! Aggregates module
pub mod product;
pub mod cart;
pub mod options;
pub mod order;

pub use product::Product;
pub use cart::{Cart, CartError, CartLine, MINIMUM_ORDER_AMOUNT};
pub use options::{OptionId, OptionSet, OrderOption, UnknownOption};
pub use order::{OrderErrorCode, OrderRequest, OrderSubmissionResult, SubmissionPhase};
