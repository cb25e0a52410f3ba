//! Proxy validation through a probe request.
//!
//! Each probe both decides whether a proxy works and harvests the probe
//! response as a fingerprint artifact.

use crate::error::{ArtifactError, ValidationError};
use crate::proxy::Endpoint;

use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Artifact names are drawn from `0..ARTIFACT_TOKEN_RANGE`.
pub const ARTIFACT_TOKEN_RANGE: u32 = 10_000_000;

/// Checks whether a proxy is usable.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate a single endpoint.
    async fn validate(&self, endpoint: &Endpoint) -> Result<(), ValidationError>;
}

/// Directory receiving one randomly named file per probe response.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating `dir` if needed.
    ///
    /// A failure to create the directory is logged; later writes will
    /// report their own errors.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Failed to create artifact directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    /// Directory the artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `body` to `fingerprint_<n>.txt` with a fresh random `n`.
    pub async fn write(&self, body: &[u8]) -> Result<PathBuf, ArtifactError> {
        let token = rand::rng().random_range(0..ARTIFACT_TOKEN_RANGE);
        let path = self.dir.join(format!("fingerprint_{}.txt", token));

        match tokio::fs::write(&path, body).await {
            Ok(()) => Ok(path),
            Err(source) => Err(ArtifactError { path, source }),
        }
    }
}

/// Validator issuing one GET to a probe URL through the SOCKS5 endpoint.
pub struct ProbeValidator {
    probe_url: String,
    timeout: Option<Duration>,
    artifacts: ArtifactStore,
}

impl ProbeValidator {
    /// Create a validator probing `probe_url` and saving responses to
    /// `artifacts`.
    pub fn new(
        probe_url: impl Into<String>,
        timeout: Option<Duration>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            probe_url: probe_url.into(),
            timeout,
            artifacts,
        }
    }

    /// Store receiving the probe responses.
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Build a client dialing through `endpoint`. An empty host dials
    /// directly.
    fn client_for(&self, endpoint: &Endpoint) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = if endpoint.host.is_empty() {
            builder.no_proxy()
        } else {
            builder.proxy(endpoint.to_reqwest_proxy()?)
        };

        builder.build()
    }
}

#[async_trait]
impl Validator for ProbeValidator {
    async fn validate(&self, endpoint: &Endpoint) -> Result<(), ValidationError> {
        let client = self
            .client_for(endpoint)
            .map_err(|source| ValidationError::Client {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let response = client
            .get(&self.probe_url)
            .send()
            .await
            .map_err(|source| ValidationError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        // Any response counts; the status code is not inspected.
        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                warn!("[{}] failed to read probe response body: {}", endpoint, e);
                Vec::new()
            }
        };

        match self.artifacts.write(&body).await {
            Ok(path) => debug!(
                "[{}] probe returned {}, saved {} bytes to {}",
                endpoint,
                status,
                body.len(),
                path.display()
            ),
            Err(e) => warn!("[{}] {}", endpoint, e),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_artifact_store_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("fingerprints"));
        assert!(store.dir().is_dir());

        let path = store.write(b"payload").await.unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        let token: u32 = name
            .strip_prefix("fingerprint_")
            .and_then(|n| n.strip_suffix(".txt"))
            .unwrap()
            .parse()
            .unwrap();
        assert!(token < ARTIFACT_TOKEN_RANGE);
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_artifact_store_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::new(dir.path());
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.dir(), dir.path());
    }

    #[tokio::test]
    async fn test_artifact_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("gone"));
        std::fs::remove_dir(dir.path().join("gone")).unwrap();

        let err = store.write(b"x").await.unwrap_err();
        assert!(err.path.starts_with(dir.path().join("gone")));
    }

    #[tokio::test]
    async fn test_unreachable_proxy_fails() {
        let dir = tempfile::tempdir().unwrap();
        let validator = ProbeValidator::new(
            "http://127.0.0.1:9/",
            Some(Duration::from_secs(5)),
            ArtifactStore::new(dir.path()),
        );

        // bind and drop to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let endpoint = Endpoint::with_auth(format!("127.0.0.1:{}", port), "bob", "secret");

        let err = validator.validate(&endpoint).await.unwrap_err();
        assert!(matches!(err, ValidationError::Request { .. }));
        assert!(err.to_string().contains(&endpoint.to_string()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
