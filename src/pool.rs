//! Core proxy pool implementation.

use crate::config::ProxySelectionStrategy;
use crate::error::PoolError;
use crate::proxy::Endpoint;

use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;

/// Operations for handing out, adding and removing proxies.
pub trait Manager {
    /// Get a proxy according to the pool's selection strategy.
    fn get_proxy(&self) -> Result<Endpoint, PoolError>;
    /// Append a proxy to the pool.
    fn add_proxy(&self, endpoint: Endpoint);
    /// Remove the first proxy equal to `endpoint`, if any.
    fn remove_proxy(&self, endpoint: &Endpoint);
}

/// A pool of validated proxies.
///
/// Every operation runs under a single lock, so the pool can be shared
/// between tasks behind an `Arc`. Duplicates are allowed.
pub struct ProxyPool {
    /// Proxies in selection order.
    proxies: Mutex<VecDeque<Endpoint>>,
    /// Strategy used by `get_proxy`.
    strategy: ProxySelectionStrategy,
}

impl ProxyPool {
    /// Create an empty pool.
    pub fn new(strategy: ProxySelectionStrategy) -> Self {
        Self::with_proxies(Vec::new(), strategy)
    }

    /// Create a pool seeded with `proxies`, kept in the given order.
    pub fn with_proxies(proxies: Vec<Endpoint>, strategy: ProxySelectionStrategy) -> Self {
        Self {
            proxies: Mutex::new(proxies.into()),
            strategy,
        }
    }

    /// Strategy used by `get_proxy`.
    pub fn strategy(&self) -> ProxySelectionStrategy {
        self.strategy
    }

    /// Get a proxy using the strategy named by `policy` instead of the
    /// configured one. An unknown name leaves the pool untouched.
    pub fn get_proxy_with(&self, policy: &str) -> Result<Endpoint, PoolError> {
        let strategy: ProxySelectionStrategy = policy.parse()?;
        self.select(strategy)
    }

    /// Get a proxy using `strategy`.
    pub fn select(&self, strategy: ProxySelectionStrategy) -> Result<Endpoint, PoolError> {
        let mut proxies = self.proxies.lock();

        let selected = match strategy {
            ProxySelectionStrategy::RoundRobin => {
                let front = proxies.pop_front().ok_or(PoolError::NoProxyAvailable)?;
                proxies.push_back(front.clone());
                front
            }
            ProxySelectionStrategy::Random => {
                if proxies.is_empty() {
                    return Err(PoolError::NoProxyAvailable);
                }
                // ThreadRng is a CSPRNG seeded from the OS
                let idx = rand::rng().random_range(0..proxies.len());
                proxies[idx].clone()
            }
        };

        debug!("Selected proxy {} ({})", selected, strategy);
        Ok(selected)
    }

    /// Number of proxies in the pool.
    pub fn len(&self) -> usize {
        self.proxies.lock().len()
    }

    /// Whether the pool holds no proxies.
    pub fn is_empty(&self) -> bool {
        self.proxies.lock().is_empty()
    }

    /// Copy of the pool contents in their current order.
    pub fn snapshot(&self) -> Vec<Endpoint> {
        self.proxies.lock().iter().cloned().collect()
    }
}

impl Manager for ProxyPool {
    fn get_proxy(&self) -> Result<Endpoint, PoolError> {
        self.select(self.strategy)
    }

    fn add_proxy(&self, endpoint: Endpoint) {
        self.proxies.lock().push_back(endpoint);
    }

    fn remove_proxy(&self, endpoint: &Endpoint) {
        let mut proxies = self.proxies.lock();
        if let Some(pos) = proxies.iter().position(|p| p == endpoint) {
            proxies.remove(pos);
        }
    }
}
