//! Input resolution: read a CSV document from an HTTP(S) URL or a local path.
//!
//! The whole body is fetched before parsing starts; a transport error, a
//! timeout, or a non-2xx status aborts the run with no partial processing.
//! Bytes are decoded as UTF-8 with invalid sequences replaced, so a stray
//! Latin-1 byte in a card name never fails the run.

use crate::error::BinderError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Build the HTTP client used for every request of a run.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, BinderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("tcg-binder/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| BinderError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Read the CSV text behind `input`.
pub async fn fetch_text(input: &str, timeout_secs: u64) -> Result<String, BinderError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(BinderError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_text(input, timeout_secs).await
    } else if input.contains("://") {
        Err(BinderError::InvalidInput {
            input: input.to_string(),
        })
    } else {
        read_local(input).await
    }
}

/// Read a local file, mapping I/O failures to actionable errors.
async fn read_local(path_str: &str) -> Result<String, BinderError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => BinderError::PermissionDenied { path: path.clone() },
        _ => BinderError::FileNotFound { path: path.clone() },
    })?;

    debug!("Read local CSV: {} ({} bytes)", path.display(), bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// GET `url` and return the body as text.
async fn download_text(url: &str, timeout_secs: u64) -> Result<String, BinderError> {
    info!("Fetching CSV from: {}", url);

    let client = http_client(timeout_secs)?;
    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            BinderError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            BinderError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(BinderError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    info!("Fetched {} bytes", bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
