//! Point-in-time snapshot of the orders view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{classify, display_order, UrgencyLevel};
use crate::order::{FulfillmentType, Order, OrderState};

/// One classified line of the orders view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRow {
    pub id: String,
    pub state: OrderState,
    pub fulfillment_type: FulfillmentType,
    pub elapsed_minutes: i64,
    pub elapsed_label: String,
    pub urgency: UrgencyLevel,
}

/// Every order classified against the same instant, in display order,
/// with the per-level and per-state counts used by the dashboard tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBoard {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<BoardRow>,
    pub by_urgency: BTreeMap<UrgencyLevel, usize>,
    pub by_state: BTreeMap<OrderState, usize>,
}

impl OrderBoard {
    pub fn build(orders: &[Order], now: DateTime<Utc>) -> Self {
        let mut by_urgency: BTreeMap<UrgencyLevel, usize> =
            UrgencyLevel::ALL.iter().map(|level| (*level, 0)).collect();
        let mut by_state = BTreeMap::new();

        let rows: Vec<BoardRow> = display_order(orders)
            .into_iter()
            .map(|order| {
                let elapsed = order.elapsed_minutes(now);
                let urgency = classify(order.state, elapsed);
                *by_urgency.entry(urgency).or_insert(0) += 1;
                *by_state.entry(order.state).or_insert(0) += 1;
                BoardRow {
                    id: order.id.clone(),
                    state: order.state,
                    fulfillment_type: order.fulfillment_type,
                    elapsed_minutes: elapsed,
                    elapsed_label: format_elapsed(elapsed),
                    urgency,
                }
            })
            .collect();

        Self {
            generated_at: now,
            rows,
            by_urgency,
            by_state,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, level: UrgencyLevel) -> usize {
        self.by_urgency.get(&level).copied().unwrap_or(0)
    }

    /// Highest level on the board, `Normal` when empty.
    pub fn most_urgent(&self) -> UrgencyLevel {
        self.rows
            .iter()
            .map(|row| row.urgency)
            .max()
            .unwrap_or(UrgencyLevel::Normal)
    }

    /// Rows at or above `level`, in display order.
    pub fn at_least(&self, level: UrgencyLevel) -> impl Iterator<Item = &BoardRow> {
        self.rows.iter().filter(move |row| row.urgency >= level)
    }
}

/// Short human label for an order age.
pub fn format_elapsed(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> Vec<Order> {
        vec![
            Order::new(
                "late-prep",
                OrderState::Preparing,
                FulfillmentType::Delivery,
                now - Duration::minutes(40),
            ),
            Order::new(
                "fresh",
                OrderState::Pending,
                FulfillmentType::Takeout,
                now - Duration::minutes(1),
            ),
            Order::new(
                "waiting-pickup",
                OrderState::Ready,
                FulfillmentType::DineIn,
                now - Duration::minutes(12),
            ),
            Order::new(
                "done",
                OrderState::Delivered,
                FulfillmentType::Delivery,
                now - Duration::minutes(90),
            ),
        ]
    }

    #[test]
    fn rows_are_classified_and_sorted() {
        let now = Utc::now();
        let board = OrderBoard::build(&sample(now), now);

        let ids: Vec<&str> = board.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "late-prep", "waiting-pickup", "done"]);

        let levels: Vec<UrgencyLevel> = board.rows.iter().map(|r| r.urgency).collect();
        assert_eq!(
            levels,
            vec![
                UrgencyLevel::Normal,
                UrgencyLevel::Critical,
                UrgencyLevel::Attention,
                UrgencyLevel::Normal,
            ]
        );
        assert_eq!(board.rows[3].elapsed_label, "1h 30m");
    }

    #[test]
    fn counts_cover_every_level() {
        let now = Utc::now();
        let board = OrderBoard::build(&sample(now), now);
        assert_eq!(board.count(UrgencyLevel::Normal), 2);
        assert_eq!(board.count(UrgencyLevel::Attention), 1);
        assert_eq!(board.count(UrgencyLevel::Urgent), 0);
        assert_eq!(board.count(UrgencyLevel::Critical), 1);
        assert_eq!(board.by_urgency.len(), 4);
        assert_eq!(board.by_state.get(&OrderState::Pending), Some(&1));
        assert_eq!(board.most_urgent(), UrgencyLevel::Critical);
        assert_eq!(board.at_least(UrgencyLevel::Attention).count(), 2);
    }

    #[test]
    fn empty_board() {
        let board = OrderBoard::build(&[], Utc::now());
        assert!(board.is_empty());
        assert_eq!(board.most_urgent(), UrgencyLevel::Normal);
        assert_eq!(board.count(UrgencyLevel::Critical), 0);
    }

    #[test]
    fn board_serializes_level_keys() {
        let now = Utc::now();
        let board = OrderBoard::build(&sample(now), now);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["by_urgency"]["critical"], 1);
        assert_eq!(json["rows"][0]["urgency"], "normal");
    }

    #[test]
    fn elapsed_labels() {
        assert_eq!(format_elapsed(-4), "just now");
        assert_eq!(format_elapsed(0), "just now");
        assert_eq!(format_elapsed(1), "1 min");
        assert_eq!(format_elapsed(59), "59 min");
        assert_eq!(format_elapsed(60), "1h 0m");
        assert_eq!(format_elapsed(125), "2h 5m");
    }
}
