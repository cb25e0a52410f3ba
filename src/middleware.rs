//! Middleware sending reqwest requests through proxies from the pool.

use crate::pool::{Manager, ProxyPool};

use anyhow::anyhow;
use async_trait::async_trait;
use log::{info, warn};
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;
use std::time::Duration;

/// Middleware that routes each request through one proxy picked by the
/// pool's selection strategy. Failed requests are not retried.
#[derive(Clone)]
pub struct ProxyPoolMiddleware {
    /// The proxy pool.
    pool: Arc<ProxyPool>,
    /// Timeout for the proxied request.
    timeout: Option<Duration>,
}

impl ProxyPoolMiddleware {
    /// Create a middleware drawing proxies from `pool`.
    pub fn new(pool: Arc<ProxyPool>, timeout: Option<Duration>) -> Self {
        if pool.is_empty() {
            warn!("Proxy pool middleware created with an empty pool");
        }
        Self { pool, timeout }
    }
}

#[async_trait]
impl Middleware for ProxyPoolMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        _extensions: &mut http::Extensions,
        _next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let endpoint = self.pool.get_proxy().map_err(|e| {
            warn!("No proxy available for {} {}", req.method(), req.url());
            Error::Middleware(anyhow!(e))
        })?;
        info!("Using proxy: {}", endpoint);

        let reqwest_proxy = endpoint.to_reqwest_proxy().map_err(|e| {
            warn!("Failed to create proxy from {}: {}", endpoint, e);
            Error::Reqwest(e)
        })?;

        let mut builder = reqwest::Client::builder().proxy(reqwest_proxy);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            warn!("Failed to build client with proxy {}: {}", endpoint, e);
            Error::Reqwest(e)
        })?;

        client.execute(req).await.map_err(|e| {
            warn!("Request failed with proxy {}: {}", endpoint, e);
            Error::Reqwest(e)
        })
    }
}
