//! Display ordering for the orders list.
//!
//! Orders sort by state rank (pending first, unknown states last), then
//! oldest first. Orders without a creation time follow the dated ones of the
//! same rank. The sort is stable, so fully equal keys keep input order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::order::Order;

/// Total order used by the orders view.
pub fn display_cmp(a: &Order, b: &Order) -> Ordering {
    a.state
        .rank()
        .cmp(&b.state.rank())
        .then_with(|| cmp_created(a.created_at, b.created_at))
}

fn cmp_created(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Borrowing view of `orders` in display order. The input is left untouched.
pub fn display_order(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| display_cmp(a, b));
    sorted
}

/// Sorts an owned list in place.
pub fn sort_for_display(orders: &mut [Order]) {
    orders.sort_by(display_cmp);
}
