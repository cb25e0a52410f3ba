//! # socks5-proxy-checker
//!
//! Validates SOCKS5 proxies by sending a probe request through each one and
//! serves the survivors from a rotating pool.
//!
//! Every probe response is kept as a fingerprint artifact. Working proxies
//! are handed out round-robin or at random, either directly through
//! [`Manager::get_proxy`] or as a reqwest middleware.

pub mod checker;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pool;
pub mod proxy;
pub mod validator;
mod utils;

pub use checker::{CheckReport, ParseFailure, ProxyChecker};
pub use config::{CheckerConfig, CheckerConfigBuilder, ParseErrorPolicy, ProxySelectionStrategy};
pub use error::{ArtifactError, CheckerError, ParseError, PoolError, ValidationError};
pub use middleware::ProxyPoolMiddleware;
pub use pool::{Manager, ProxyPool};
pub use proxy::{parse_endpoint, Endpoint};
pub use validator::{ArtifactStore, ProbeValidator, Validator};
