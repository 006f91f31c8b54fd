//! Order records as delivered by the admin API.
//!
//! Orders are read-only to this crate. Elapsed time is never stored on the
//! record; it is derived from `created_at` at every evaluation.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sort rank given to states this build does not know about.
pub const UNKNOWN_STATE_RANK: u32 = 999;

/// Lifecycle state of an order.
///
/// Wire values this build does not recognize decode to [`OrderState::Unknown`]
/// so that a newer API never breaks the orders view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Pending,
    Preparing,
    Ready,
    Dispatched,
    Delivered,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OrderState {
    pub const ALL: [OrderState; 6] = [
        OrderState::Pending,
        OrderState::Preparing,
        OrderState::Ready,
        OrderState::Dispatched,
        OrderState::Delivered,
        OrderState::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Preparing => "preparing",
            OrderState::Ready => "ready",
            OrderState::Dispatched => "dispatched",
            OrderState::Delivered => "delivered",
            OrderState::Canceled => "canceled",
            OrderState::Unknown => "unknown",
        }
    }

    /// Display priority, lower sorts first.
    pub fn rank(self) -> u32 {
        match self {
            OrderState::Pending => 1,
            OrderState::Preparing => 2,
            OrderState::Ready => 3,
            OrderState::Dispatched => 4,
            OrderState::Delivered => 5,
            OrderState::Canceled => 6,
            OrderState::Unknown => UNKNOWN_STATE_RANK,
        }
    }

    /// Whether the kitchen can still act on the order.
    pub fn is_actionable(self) -> bool {
        matches!(
            self,
            OrderState::Pending | OrderState::Preparing | OrderState::Ready
        )
    }

    /// Target of the "advance status" action, if any.
    pub fn next(self) -> Option<OrderState> {
        match self {
            OrderState::Pending => Some(OrderState::Preparing),
            OrderState::Preparing => Some(OrderState::Ready),
            OrderState::Ready => Some(OrderState::Dispatched),
            OrderState::Dispatched => Some(OrderState::Delivered),
            OrderState::Delivered | OrderState::Canceled | OrderState::Unknown => None,
        }
    }

    /// Orders can be canceled until the kitchen marks them ready.
    pub fn can_cancel(self) -> bool {
        matches!(self, OrderState::Pending | OrderState::Preparing)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderState::Pending,
            "preparing" => OrderState::Preparing,
            "ready" => OrderState::Ready,
            "dispatched" => OrderState::Dispatched,
            "delivered" => OrderState::Delivered,
            "canceled" => OrderState::Canceled,
            _ => OrderState::Unknown,
        };
        Ok(state)
    }
}

/// How the order reaches the customer.
///
/// Urgency thresholds are the same for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    Delivery,
    DineIn,
    Takeout,
}

impl FulfillmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentType::Delivery => "delivery",
            FulfillmentType::DineIn => "dine_in",
            FulfillmentType::Takeout => "takeout",
        }
    }
}

impl fmt::Display for FulfillmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as served by `GET /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub state: OrderState,
    pub fulfillment_type: FulfillmentType,
    /// Missing timestamps count as "just created".
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        state: OrderState,
        fulfillment_type: FulfillmentType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            fulfillment_type,
            created_at: Some(created_at),
        }
    }

    /// Whole minutes since creation, clamped at zero.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        elapsed_minutes(self.created_at, now)
    }
}

/// Whole minutes between `created_at` and `now`.
///
/// A missing timestamp or a creation time in the future (clock skew between
/// the API server and this machine) yields 0.
pub fn elapsed_minutes(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    created_at
        .map(|created| (now - created).num_minutes().max(0))
        .unwrap_or(0)
}
