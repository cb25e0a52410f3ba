//! Configuration for the proxy checker and pool.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PoolError;

/// Default probe URL. The response body is kept as a fingerprint artifact.
pub const DEFAULT_PROBE_URL: &str =
    "http://fingerprints.bablosoft.com/prepare?version=5&tags=Microsoft%20Windows%2CChrome&returnpc=true";

/// Strategy for selecting a proxy from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxySelectionStrategy {
    /// Hand out the front proxy and rotate it to the back.
    RoundRobin,
    /// Select a uniformly random proxy.
    #[default]
    Random,
}

impl ProxySelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::Random => "random",
        }
    }
}

impl FromStr for ProxySelectionStrategy {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round-robin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => Err(PoolError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ProxySelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the checker does with a candidate line that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorPolicy {
    /// Log the line, record it in the report and keep going.
    #[default]
    Skip,
    /// Stop the run without writing the output snapshot.
    Abort,
}

/// Configuration for a checker run.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// File path or `http(s)://` URL listing candidate proxies.
    pub input: String,
    /// File receiving the surviving proxies.
    pub output: PathBuf,
    /// Directory receiving one fingerprint file per probe.
    pub artifact_dir: PathBuf,
    /// URL requested through each candidate.
    pub probe_url: String,
    /// Per-request timeout; `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Maximum number of validations in flight.
    pub concurrency: usize,
    /// Strategy for selecting proxies from the resulting pool.
    pub selection_strategy: ProxySelectionStrategy,
    /// Handling of malformed candidate lines.
    pub parse_error_policy: ParseErrorPolicy,
}

impl CheckerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CheckerConfigBuilder {
        CheckerConfigBuilder::new()
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfigBuilder::new().build()
    }
}

/// Builder for `CheckerConfig`.
pub struct CheckerConfigBuilder {
    input: Option<String>,
    output: Option<PathBuf>,
    artifact_dir: Option<PathBuf>,
    probe_url: Option<String>,
    request_timeout: Option<Option<Duration>>,
    concurrency: Option<usize>,
    selection_strategy: Option<ProxySelectionStrategy>,
    parse_error_policy: Option<ParseErrorPolicy>,
}

impl CheckerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            input: None,
            output: None,
            artifact_dir: None,
            probe_url: None,
            request_timeout: None,
            concurrency: None,
            selection_strategy: None,
            parse_error_policy: None,
        }
    }

    /// Set the candidate source (file path or URL).
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set the output snapshot path.
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the fingerprint artifact directory.
    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Set the URL probed through each candidate.
    pub fn probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = Some(url.into());
        self
    }

    /// Set the per-request timeout. `None` disables it.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of concurrent validations.
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    /// Set the strategy for selecting proxies.
    pub fn selection_strategy(mut self, strategy: ProxySelectionStrategy) -> Self {
        self.selection_strategy = Some(strategy);
        self
    }

    /// Set how malformed candidate lines are handled.
    pub fn parse_error_policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.parse_error_policy = Some(policy);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> CheckerConfig {
        CheckerConfig {
            input: self.input.unwrap_or_else(|| "proxy.txt".to_string()),
            output: self.output.unwrap_or_else(|| PathBuf::from("good_proxy.txt")),
            artifact_dir: self.artifact_dir.unwrap_or_else(|| PathBuf::from("fingerprints")),
            probe_url: self.probe_url.unwrap_or_else(|| DEFAULT_PROBE_URL.to_string()),
            request_timeout: self.request_timeout.unwrap_or(Some(Duration::from_secs(10))),
            concurrency: self.concurrency.unwrap_or(16).max(1),
            selection_strategy: self.selection_strategy.unwrap_or_default(),
            parse_error_policy: self.parse_error_policy.unwrap_or_default(),
        }
    }
}

impl Default for CheckerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
