//! Analytics events
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::{CartLine, OrderOption};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    CartUpdated,
    OrderSubmitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Snapshot of cart and options at emission time. `status` is `None` while delivery is in flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub items: Vec<CartLine>,
    pub options: Vec<OrderOption>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}

impl AnalyticsEvent {
    pub fn new(kind: EventKind, items: Vec<CartLine>, options: Vec<OrderOption>) -> Self {
        Self { id: Uuid::new_v4(), kind, items, options, timestamp: Utc::now(), status: None }
    }

    pub(crate) fn resolved(mut self, status: DeliveryStatus) -> Self {
        self.status = Some(status);
        self
    }
}
