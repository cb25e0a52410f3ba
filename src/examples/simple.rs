//! Simple example: check proxies, then send a request through the pool.

use reqwest_middleware::ClientBuilder;
use socks5_proxy_checker::{CheckerConfig, ProxyChecker, ProxyPoolMiddleware, ProxySelectionStrategy};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Checking proxies...");

    let config = CheckerConfig::builder()
        // one `[user:password@]host` per line
        .input("proxy.txt")
        .output("good_proxy.txt")
        .probe_url("https://httpbin.org/ip")
        .request_timeout(Some(Duration::from_secs(5)))
        .concurrency(32)
        .selection_strategy(ProxySelectionStrategy::RoundRobin)
        .build();

    let checker = ProxyChecker::new(config);
    let report = checker.run().await?;
    println!("{} of {} proxies working", report.valid.len(), report.candidates);

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(ProxyPoolMiddleware::new(checker.pool(), Some(Duration::from_secs(10))))
        .build();

    println!("Sending request...");
    let response = client.get("https://httpbin.org/ip").send().await?;

    println!("Status: {}", response.status());
    println!("Response: {}", response.text().await?);

    Ok(())
}
