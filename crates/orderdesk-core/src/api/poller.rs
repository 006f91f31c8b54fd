//! Fixed-interval order refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::OrderSource;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::urgency::OrderBoard;

/// Refreshes orders from a source and classifies each snapshot.
pub struct OrderPoller<S> {
    source: S,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl<S: OrderSource> OrderPoller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self::with_clock(source, interval, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            interval,
            clock,
        }
    }

    /// Fetch once and classify against the clock's "now".
    pub async fn poll_once(&self) -> Result<OrderBoard> {
        let orders = self.source.fetch_orders().await?;
        Ok(OrderBoard::build(&orders, self.clock.now()))
    }

    /// Poll until `shutdown` turns true or its sender is dropped.
    ///
    /// The first fetch happens immediately. A failed fetch is logged and the
    /// previous board stays current until the next interval.
    pub async fn run<F>(&self, mut on_board: F, mut shutdown: watch::Receiver<bool>)
    where
        F: FnMut(OrderBoard),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                return;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = ticker.tick() => match self.poll_once().await {
                    Ok(board) => {
                        tracing::info!(
                            count = board.len(),
                            most_urgent = %board.most_urgent(),
                            "orders refreshed"
                        );
                        on_board(board);
                    }
                    Err(e) => tracing::warn!(error = %e, "order refresh failed"),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticSource;
    use crate::clock::ManualClock;
    use crate::order::{FulfillmentType, Order, OrderState};
    use crate::urgency::UrgencyLevel;
    use chrono::Utc;

    #[tokio::test]
    async fn poll_once_classifies_at_clock_time() {
        let now = Utc::now();
        let clock = Arc::new(ManualClock::new(now));
        let source = StaticSource::new(vec![Order::new(
            "p",
            OrderState::Pending,
            FulfillmentType::Delivery,
            now,
        )]);
        let poller = OrderPoller::with_clock(source, Duration::from_secs(30), clock.clone());

        assert_eq!(poller.poll_once().await.unwrap().most_urgent(), UrgencyLevel::Normal);
        clock.advance(chrono::Duration::minutes(10));
        assert_eq!(poller.poll_once().await.unwrap().most_urgent(), UrgencyLevel::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_on_interval_until_shutdown() {
        let source = StaticSource::new(Vec::new());
        let poller = OrderPoller::new(source, Duration::from_secs(30));
        let (tx, rx) = watch::channel(false);

        let mut boards = 0;
        let run = poller.run(|_| boards += 1, rx);
        let stop = async {
            tokio::time::sleep(Duration::from_secs(65)).await;
            tx.send(true).unwrap();
        };
        tokio::join!(run, stop);

        // Ticks at 0s, 30s and 60s.
        assert_eq!(boards, 3);
    }
}
