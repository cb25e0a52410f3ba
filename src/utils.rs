//! Reading candidate lists and writing snapshots.

use crate::error::CheckerError;
use crate::proxy::Endpoint;

use reqwest::Client;
use std::path::Path;

/// A candidate line with its 1-based line number in the source.
pub(crate) type NumberedLine = (usize, String);

/// Whether `source` names a remote list rather than a local file.
pub(crate) fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch candidate lines from a URL or file path.
pub(crate) async fn read_candidates(source: &str) -> Result<Vec<NumberedLine>, CheckerError> {
    let content = if is_remote(source) {
        let fetch_err = |source_err: reqwest::Error| CheckerError::Fetch {
            url: source.to_string(),
            source: source_err,
        };
        let response = Client::new().get(source).send().await.map_err(fetch_err)?;
        response.text().await.map_err(fetch_err)?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| CheckerError::io(source, e))?
    };

    Ok(split_candidates(&content))
}

/// Split a candidate list into numbered lines, dropping blank ones.
///
/// Lines are otherwise kept verbatim.
pub(crate) fn split_candidates(content: &str) -> Vec<NumberedLine> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

/// Write one proxy per line to `path`, replacing any existing file.
pub(crate) async fn write_snapshot(path: &Path, proxies: &[Endpoint]) -> Result<(), CheckerError> {
    let mut content = String::new();
    for proxy in proxies {
        content.push_str(&proxy.to_string());
        content.push('\n');
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| CheckerError::io(path, e))
}
