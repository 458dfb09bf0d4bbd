//! Order submission types

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::{CartLine, OrderOption};
use crate::domain::value_objects::Money;

pub const MSG_EMPTY_CART: &str = "Cart is empty";
pub const MSG_MINIMUM_AMOUNT: &str = "Minimum order amount is 1000 ₽";
pub const MSG_SERVER_UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";
pub const MSG_PROCESSING_FAILED: &str = "An error occurred while processing the order";
pub const MSG_SUBMISSION_FAILED: &str = "Failed to submit the order";

/// Snapshot of the cart handed to the order service at dispatch time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<CartLine>,
    pub options: Vec<OrderOption>,
    pub total_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderErrorCode {
    EmptyCart,
    ServerUnavailable,
    MinimumAmountNotReached,
    Other(String),
}

impl OrderErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmptyCart => "EMPTY_CART",
            Self::ServerUnavailable => "SERVER_UNAVAILABLE",
            Self::MinimumAmountNotReached => "MINIMUM_AMOUNT_NOT_REACHED",
            Self::Other(code) => code,
        }
    }

    /// User-facing text for a code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyCart => MSG_EMPTY_CART,
            Self::ServerUnavailable => MSG_SERVER_UNAVAILABLE,
            Self::MinimumAmountNotReached => MSG_MINIMUM_AMOUNT,
            Self::Other(_) => MSG_PROCESSING_FAILED,
        }
    }
}

impl From<String> for OrderErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "EMPTY_CART" => Self::EmptyCart,
            "SERVER_UNAVAILABLE" => Self::ServerUnavailable,
            "MINIMUM_AMOUNT_NOT_REACHED" => Self::MinimumAmountNotReached,
            _ => Self::Other(code),
        }
    }
}

impl From<OrderErrorCode> for String {
    fn from(code: OrderErrorCode) -> Self { code.as_str().to_string() }
}

impl std::fmt::Display for OrderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<OrderErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OrderSubmissionResult {
    pub fn success() -> Self { Self { success: true, error_code: None, message: None } }

    pub fn failure(code: OrderErrorCode) -> Self {
        let message = Some(code.message().to_string());
        Self { success: false, error_code: Some(code), message }
    }

    /// Failure that did not come back from the service as a result (transport error, timeout, cancellation).
    pub fn unexpected() -> Self { Self { success: false, error_code: None, message: Some(MSG_SUBMISSION_FAILED.to_string()) } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}
