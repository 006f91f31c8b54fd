//! Integration tests for the orders HTTP client against a mock server.

use std::time::Duration;

use orderdesk_core::error::ApiError;
use orderdesk_core::storage::ApiConfig;
use orderdesk_core::{CoreError, OrderPoller, OrderState, OrdersClient, UrgencyLevel};

const BODY: &str = r#"[
    {"id": "1", "state": "pending", "fulfillmentType": "delivery", "createdAt": "2020-01-01T00:00:00Z"},
    {"id": "2", "state": "delivered", "fulfillmentType": "dine_in", "createdAt": "2020-01-01T00:00:00Z"}
]"#;

fn api_for(server: &mockito::Server) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api", server.url()),
        orders_path: "orders".into(),
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn fetch_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/orders")
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BODY)
        .create_async()
        .await;

    let client = OrdersClient::new(&api_for(&server), Some("secret-token".into())).unwrap();
    let orders = client.fetch().await.unwrap();

    mock.assert_async().await;
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].state, OrderState::Pending);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/orders")
        .with_status(401)
        .create_async()
        .await;

    let client = OrdersClient::new(&api_for(&server), None).unwrap();
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Api(ApiError::Status { status: 401, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/orders")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = OrdersClient::new(&api_for(&server), None).unwrap();
    assert!(matches!(client.fetch().await, Err(CoreError::Json(_))));
}

#[tokio::test]
async fn poller_builds_board_from_http_source() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/orders")
        .with_status(200)
        .with_body(BODY)
        .create_async()
        .await;

    let client = OrdersClient::new(&api_for(&server), None).unwrap();
    let poller = OrderPoller::new(client, Duration::from_secs(30));
    let board = poller.poll_once().await.unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board.rows[0].id, "1");
    assert_eq!(board.most_urgent(), UrgencyLevel::Critical);
}
