//! End-to-end checking pipeline: read candidates, validate them, keep the
//! survivors in a pool and write them out.

use crate::config::{CheckerConfig, ParseErrorPolicy};
use crate::error::{CheckerError, ParseError, ValidationError};
use crate::pool::{Manager, ProxyPool};
use crate::proxy::{parse_endpoint, Endpoint};
use crate::utils;
use crate::validator::{ArtifactStore, ProbeValidator, Validator};

use futures::{stream, StreamExt};
use log::{error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A candidate line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// 1-based line number in the candidate source.
    pub line_number: usize,
    pub error: ParseError,
}

/// Outcome of a checker run.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Number of candidate lines read.
    pub candidates: usize,
    /// Surviving proxies in pool order, as written to the output.
    pub valid: Vec<Endpoint>,
    /// Proxies that failed validation.
    pub rejected: Vec<(Endpoint, ValidationError)>,
    /// Lines skipped because they did not parse.
    pub parse_failures: Vec<ParseFailure>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
}

enum Outcome {
    Malformed(ParseFailure),
    Checked {
        endpoint: Endpoint,
        result: Result<(), ValidationError>,
    },
}

/// Drives validation of a candidate list into a [`ProxyPool`].
pub struct ProxyChecker<V = ProbeValidator> {
    config: CheckerConfig,
    pool: Arc<ProxyPool>,
    validator: V,
    cancel: CancellationToken,
}

impl ProxyChecker<ProbeValidator> {
    /// Create a checker probing through reqwest. The artifact directory is
    /// created here, alongside the empty pool.
    pub fn new(config: CheckerConfig) -> Self {
        let artifacts = ArtifactStore::new(&config.artifact_dir);
        let validator =
            ProbeValidator::new(config.probe_url.clone(), config.request_timeout, artifacts);
        Self::with_validator(config, validator)
    }
}

impl<V: Validator> ProxyChecker<V> {
    /// Create a checker using a custom validator.
    pub fn with_validator(config: CheckerConfig, validator: V) -> Self {
        let pool = Arc::new(ProxyPool::new(config.selection_strategy));
        Self {
            config,
            pool,
            validator,
            cancel: CancellationToken::new(),
        }
    }

    /// The pool receiving validated proxies.
    pub fn pool(&self) -> Arc<ProxyPool> {
        Arc::clone(&self.pool)
    }

    /// Token that stops a running check. Proxies validated so far are
    /// still written out.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline once.
    ///
    /// Up to `concurrency` validations run at once, but results are applied
    /// in input order, so the pool order matches the candidate list.
    pub async fn run(&self) -> Result<CheckReport, CheckerError> {
        let lines = utils::read_candidates(&self.config.input).await?;
        info!(
            "Checking {} candidate proxies from {} ({} at a time)",
            lines.len(),
            self.config.input,
            self.config.concurrency
        );

        let mut report = CheckReport {
            candidates: lines.len(),
            ..Default::default()
        };

        // Parse ahead of the validation stream. Under `Abort`, nothing past
        // the first malformed line is handed out.
        let abort_on_parse_error = self.config.parse_error_policy == ParseErrorPolicy::Abort;
        let mut halted = false;
        let candidates = lines.into_iter().map_while(move |(line_number, line)| {
            if halted {
                return None;
            }
            let parsed =
                parse_endpoint(&line).map_err(|error| ParseFailure { line_number, error });
            halted = parsed.is_err() && abort_on_parse_error;
            Some(parsed)
        });

        let validator = &self.validator;
        let mut outcomes = stream::iter(candidates)
            .map(|parsed| async move {
                match parsed {
                    Ok(endpoint) => {
                        let result = validator.validate(&endpoint).await;
                        Outcome::Checked { endpoint, result }
                    }
                    Err(failure) => Outcome::Malformed(failure),
                }
            })
            .buffered(self.config.concurrency);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Check cancelled, keeping {} proxies validated so far", self.pool.len());
                    report.cancelled = true;
                    break;
                }
                next = outcomes.next() => next,
            };
            let Some(outcome) = next else { break };

            match outcome {
                Outcome::Checked {
                    endpoint,
                    result: Ok(()),
                } => {
                    info!("GOOD proxy: {}", endpoint);
                    self.pool.add_proxy(endpoint);
                }
                Outcome::Checked {
                    endpoint,
                    result: Err(e),
                } => {
                    warn!("{}", e);
                    report.rejected.push((endpoint, e));
                }
                Outcome::Malformed(failure) => match self.config.parse_error_policy {
                    ParseErrorPolicy::Abort => {
                        error!("Line {}: {}", failure.line_number, failure.error);
                        return Err(failure.error.into());
                    }
                    ParseErrorPolicy::Skip => {
                        warn!("Skipping line {}: {}", failure.line_number, failure.error);
                        report.parse_failures.push(failure);
                    }
                },
            }
        }
        drop(outcomes);

        report.valid = self.pool.snapshot();
        info!("Loaded {} proxies", report.valid.len());

        utils::write_snapshot(&self.config.output, &report.valid).await?;
        info!(
            "Wrote {} proxies to {}",
            report.valid.len(),
            self.config.output.display()
        );

        Ok(report)
    }
}
