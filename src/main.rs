//! # socks5-proxy-checker
//!
//! Reads candidate SOCKS5 proxies, probes each one and writes the working
//! ones back out.
//!
//! ```bash
//! # proxy.txt -> good_proxy.txt, fingerprints/ for probe responses
//! socks5-proxy-checker
//!
//! # custom paths, 32 probes in flight, no request timeout
//! socks5-proxy-checker -i list.txt -o alive.txt -c 32 --timeout-secs 0 -v
//!
//! # one probe at a time, stop on the first malformed line
//! socks5-proxy-checker -c 1 --abort-on-parse-error
//! ```

use clap::Parser;
use log::{error, info, warn};
use socks5_proxy_checker::{
    CheckerConfig, ParseErrorPolicy, ProxyChecker, ProxySelectionStrategy,
};
use std::path::PathBuf;
use std::time::Duration;

/// Validate SOCKS5 proxies through a probe request.
#[derive(Parser, Debug)]
#[command(name = "socks5-proxy-checker")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Candidate list: file path or http(s) URL, one `[user:password@]host` per line
    #[arg(short, long, env = "PROXY_INPUT", default_value = "proxy.txt")]
    input: String,

    /// File receiving the working proxies
    #[arg(short, long, env = "PROXY_OUTPUT", default_value = "good_proxy.txt")]
    output: PathBuf,

    /// Directory for probe response artifacts
    #[arg(long, env = "PROXY_ARTIFACT_DIR", default_value = "fingerprints")]
    artifact_dir: PathBuf,

    /// Selection policy for the pool: round-robin or random
    #[arg(long, env = "PROXY_POLICY", default_value = "random")]
    policy: ProxySelectionStrategy,

    /// URL requested through each proxy
    #[arg(long, env = "PROXY_PROBE_URL")]
    probe_url: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, env = "PROXY_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Maximum number of probes in flight
    #[arg(short, long, env = "PROXY_CONCURRENCY", default_value_t = 16)]
    concurrency: usize,

    /// Stop at the first malformed line instead of skipping it
    #[arg(long)]
    abort_on_parse_error: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn into_config(self) -> CheckerConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let parse_error_policy = if self.abort_on_parse_error {
            ParseErrorPolicy::Abort
        } else {
            ParseErrorPolicy::Skip
        };

        let mut builder = CheckerConfig::builder()
            .input(self.input)
            .output(self.output)
            .artifact_dir(self.artifact_dir)
            .selection_strategy(self.policy)
            .request_timeout(timeout)
            .concurrency(self.concurrency)
            .parse_error_policy(parse_error_policy);
        if let Some(url) = self.probe_url {
            builder = builder.probe_url(url);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let config = args.into_config();
    info!(
        "Starting socks5-proxy-checker {} ({} policy)",
        env!("CARGO_PKG_VERSION"),
        config.selection_strategy
    );

    let checker = ProxyChecker::new(config);

    let cancel = checker.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with the proxies checked so far");
            cancel.cancel();
        }
    });

    match checker.run().await {
        Ok(report) => {
            if !report.parse_failures.is_empty() {
                warn!("{} malformed lines skipped", report.parse_failures.len());
            }
            info!(
                "Done: {} of {} candidates working, {} rejected",
                report.valid.len(),
                report.candidates,
                report.rejected.len()
            );
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
