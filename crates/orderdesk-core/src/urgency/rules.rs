//! Per-state urgency thresholds.
//!
//! Each actionable state owns a list of `(minutes, level)` rules sorted by
//! descending threshold. The first rule whose threshold the order has
//! reached wins; an order below every threshold is `Normal`.
//!
//! Thresholds do not depend on the fulfillment type: delivery, dine-in and
//! takeout orders share the same kitchen-side targets.

use chrono::{DateTime, Utc};

use super::UrgencyLevel;
use crate::order::{Order, OrderState};

/// Inclusive lower bound in minutes and the level it triggers.
pub type UrgencyRule = (i64, UrgencyLevel);

const PENDING_RULES: &[UrgencyRule] = &[
    (10, UrgencyLevel::Critical),
    (8, UrgencyLevel::Urgent),
    (5, UrgencyLevel::Attention),
];

const PREPARING_RULES: &[UrgencyRule] = &[
    (35, UrgencyLevel::Critical),
    (25, UrgencyLevel::Urgent),
    (15, UrgencyLevel::Attention),
];

// No critical tier: the food is done, only pickup is late.
const READY_RULES: &[UrgencyRule] = &[(20, UrgencyLevel::Urgent), (10, UrgencyLevel::Attention)];

/// Rule table for a state. Orders that left the kitchen pipeline have none.
pub fn rules_for(state: OrderState) -> &'static [UrgencyRule] {
    match state {
        OrderState::Pending => PENDING_RULES,
        OrderState::Preparing => PREPARING_RULES,
        OrderState::Ready => READY_RULES,
        OrderState::Dispatched
        | OrderState::Delivered
        | OrderState::Canceled
        | OrderState::Unknown => &[],
    }
}

/// Urgency of an order in `state` that is `elapsed_minutes` old.
///
/// Negative ages are treated as 0.
pub fn classify(state: OrderState, elapsed_minutes: i64) -> UrgencyLevel {
    let minutes = elapsed_minutes.max(0);
    rules_for(state)
        .iter()
        .find(|(threshold, _)| minutes >= *threshold)
        .map(|(_, level)| *level)
        .unwrap_or(UrgencyLevel::Normal)
}

/// Urgency of `order` at `now`.
pub fn classify_order(order: &Order, now: DateTime<Utc>) -> UrgencyLevel {
    classify(order.state, order.elapsed_minutes(now))
}
