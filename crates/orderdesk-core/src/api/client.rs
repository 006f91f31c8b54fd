//! HTTP client for the admin orders endpoint.

use reqwest::Client;
use url::Url;

use super::{parse_orders, OrderSource};
use crate::error::{ApiError, Result};
use crate::order::Order;
use crate::storage::ApiConfig;

/// `GET {base_url}/{orders_path}` with an externally issued bearer token.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    http: Client,
    endpoint: Url,
    token: Option<String>,
}

impl OrdersClient {
    pub fn new(api: &ApiConfig, token: Option<String>) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            endpoint: Self::endpoint(&api.base_url, &api.orders_path)?,
            token,
        })
    }

    /// Build from config, taking the token from the configured env var.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::new(api, api.token())
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    fn endpoint(base_url: &str, path: &str) -> Result<Url, ApiError> {
        // Without the trailing slash `join` would replace the last segment.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
    }

    pub async fn fetch(&self) -> Result<Vec<Order>> {
        let mut request = self.http.get(self.endpoint.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(ApiError::from)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            }
            .into());
        }

        let body = resp.text().await.map_err(ApiError::from)?;
        let orders = parse_orders(&body)?;
        tracing::debug!(count = orders.len(), url = %self.endpoint, "orders fetched");
        Ok(orders)
    }
}

impl OrderSource for OrdersClient {
    async fn fetch_orders(&self) -> Result<Vec<Order>> {
        self.fetch().await
    }
}
