//! Order sources.
//!
//! The orders view refreshes from the admin REST API on a fixed interval.
//! [`OrderSource`] is the seam: [`OrdersClient`] talks HTTP, [`FileSource`]
//! reads a JSON export, and [`StaticSource`] serves a fixed list in tests.

mod client;
mod poller;

pub use client::OrdersClient;
pub use poller::OrderPoller;

use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::order::Order;

/// Anything that can produce the current order list.
pub trait OrderSource {
    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<Order>>> + Send;
}

/// Accepted response shapes: a bare array, or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrdersPayload {
    List(Vec<Order>),
    Wrapped {
        #[serde(alias = "data")]
        orders: Vec<Order>,
    },
}

impl OrdersPayload {
    fn into_orders(self) -> Vec<Order> {
        match self {
            OrdersPayload::List(orders) | OrdersPayload::Wrapped { orders } => orders,
        }
    }
}

/// Decode an orders response body.
pub fn parse_orders(body: &str) -> Result<Vec<Order>> {
    let payload: OrdersPayload = serde_json::from_str(body)?;
    Ok(payload.into_orders())
}

/// Orders read from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OrderSource for FileSource {
    async fn fetch_orders(&self) -> Result<Vec<Order>> {
        let body = std::fs::read_to_string(&self.path)?;
        parse_orders(&body)
    }
}

/// A fixed order list.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    orders: Vec<Order>,
}

impl StaticSource {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }
}

impl OrderSource for StaticSource {
    async fn fetch_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderState;

    const ORDER: &str =
        r#"{"id": "a1", "state": "ready", "fulfillmentType": "takeout", "createdAt": "2024-05-01T12:00:00Z"}"#;

    #[test]
    fn parses_bare_array() {
        let orders = parse_orders(&format!("[{ORDER}]")).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].state, OrderState::Ready);
    }

    #[test]
    fn parses_wrapped_payloads() {
        let orders = parse_orders(&format!(r#"{{"orders": [{ORDER}]}}"#)).unwrap();
        assert_eq!(orders.len(), 1);
        let orders = parse_orders(&format!(r#"{{"data": [{ORDER}, {ORDER}]}}"#)).unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_orders("{\"total\": 3}").is_err());
        assert!(parse_orders("not json").is_err());
    }

    #[tokio::test]
    async fn file_source_reads_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, format!("[{ORDER}]")).unwrap();

        let orders = FileSource::new(&path).fetch_orders().await.unwrap();
        assert_eq!(orders[0].id, "a1");
    }

    #[tokio::test]
    async fn file_source_missing_file_is_io_error() {
        let err = FileSource::new("/nonexistent/orders.json")
            .fetch_orders()
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Io(_)));
    }
}
