//! Run reports and the image metadata sidecar.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name and raw price recorded for one downloaded product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub name: String,
    pub price: String,
}

/// Image file stem (the sanitised product id) → `{name, price}`, serialised
/// as the metadata sidecar.
pub type MetadataMap = BTreeMap<String, ImageMetadata>;

/// Outcome of a placeholder-sheet run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetReport {
    pub set_name: String,
    /// Rows in the feed.
    pub total_rows: usize,
    /// Rows that belong to the set.
    pub matched_rows: usize,
    /// Pages written (0 when nothing matched).
    pub pages: usize,
    /// Occupied slots on each page, in page order.
    pub slots_per_page: Vec<usize>,
    /// Written PDF, or `None` when no rows matched and no file was produced.
    pub output: Option<PathBuf>,
    pub duration_ms: u64,
}

/// Outcome of an image-download run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    /// Rows that carried an image URL.
    pub candidates: usize,
    /// Images fetched in this run.
    pub downloaded: usize,
    /// Images already on disk and left untouched.
    pub skipped_existing: usize,
    /// Rows without an image URL.
    pub skipped_no_url: usize,
    /// Per-image failures; each one was skipped.
    pub failures: Vec<ItemError>,
    /// Entries written to the sidecar.
    pub metadata_entries: usize,
    pub metadata_path: PathBuf,
    pub duration_ms: u64,
}

/// Outcome of a binder-layout run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinderReport {
    /// Image files found in the directory.
    pub images_found: usize,
    /// Images placed on a page.
    pub placed: usize,
    /// Images that could not be decoded.
    pub failures: Vec<ItemError>,
    pub pages: usize,
    /// Written PDF, or `None` when no image could be placed.
    pub output: Option<PathBuf>,
    pub duration_ms: u64,
}
