//! Error types for the tcg-binder library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BinderError`]: **Fatal**: the run cannot proceed at all (no feed URL,
//!   feed unreachable, required CSV columns missing, output not writable).
//!   Returned as `Err(BinderError)` from the top-level entry points in
//!   [`crate::generate`].
//!
//! * [`ItemError`]: **Non-fatal**: a single image failed to download or
//!   decode. Stored in the run report next to the items that succeeded; the
//!   run continues with the next item.
//!
//! A feed that simply has no rows for the requested set is neither: it is a
//! normal outcome reported through [`crate::output::SheetReport::output`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tcg-binder library.
#[derive(Debug, Error)]
pub enum BinderError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No feed URL was supplied.
    #[error("No CSV feed URL configured.\nSet the TCGCSV_URL environment variable (your private CSV link) or pass --url.")]
    MissingFeedUrl,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Local CSV file was not found at the given path.
    #[error("CSV file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a file path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// Fetch failed at the transport level or returned a non-2xx status.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection and the feed link.")]
    DownloadFailed { url: String, reason: String },

    /// Fetch exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── CSV errors ────────────────────────────────────────────────────────
    /// The CSV document could not be parsed.
    #[error("Failed to parse CSV: {detail}")]
    CsvParse { detail: String },

    /// One or more mandatory columns could not be resolved.
    #[error("CSV does not contain required columns ({}).\nFound columns: {:?}", .missing.join(" / "), .found)]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ── Binder errors ─────────────────────────────────────────────────────
    /// The image directory for the binder layout does not exist.
    #[error("Image directory not found: '{path}'\nRun `tcg-binder download-images` first.")]
    ImageDirNotFound { path: PathBuf },

    /// The metadata sidecar exists but is not valid JSON.
    #[error("Failed to read metadata file '{path}': {detail}")]
    MetadataRead { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// printpdf rejected a font, image, or the final save.
    #[error("PDF rendering failed: {0}")]
    PdfRender(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
///
/// Stored in [`crate::output::DownloadReport`] or
/// [`crate::output::BinderReport`]; the item is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// Transport-level failure (connection refused, timeout, reset).
    #[error("{product_id}: download failed: {detail}")]
    DownloadFailed { product_id: String, detail: String },

    /// The image server answered with a non-2xx status.
    #[error("{product_id}: HTTP {status}")]
    HttpStatus { product_id: String, status: u16 },

    /// The response body is not a PNG or JPEG image.
    #[error("{product_id}: response is not a supported image")]
    UnsupportedImage { product_id: String },

    /// The row has an image URL but no product id to name the file after.
    #[error("row {row}: image URL without a product id")]
    MissingProductId { row: usize },

    /// The image could not be written into the image directory.
    #[error("{product_id}: could not save image: {detail}")]
    WriteFailed { product_id: String, detail: String },

    /// A downloaded file could not be decoded during binder layout.
    #[error("Could not process {file}: {detail}")]
    DecodeFailed { file: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_found_headers() {
        let e = BinderError::MissingColumns {
            missing: vec!["Game".into(), "Set Name".into()],
            found: vec!["productId".into(), "name".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("Game / Set Name"), "got: {msg}");
        assert!(msg.contains("productId"), "got: {msg}");
    }

    #[test]
    fn missing_feed_url_mentions_env_var() {
        assert!(BinderError::MissingFeedUrl.to_string().contains("TCGCSV_URL"));
    }

    #[test]
    fn download_timeout_display() {
        let e = BinderError::DownloadTimeout {
            url: "https://example.com/feed.csv".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("feed.csv"));
    }

    #[test]
    fn item_error_display() {
        let e = ItemError::HttpStatus {
            product_id: "624103".into(),
            status: 404,
        };
        assert_eq!(e.to_string(), "624103: HTTP 404");

        let e = ItemError::DecodeFailed {
            file: "bad.jpg".into(),
            detail: "truncated".into(),
        };
        assert!(e.to_string().starts_with("Could not process bad.jpg"));
    }
}
