//! Top-level entry points, one per run.
//!
//! Network and file reads are async; PDF drawing and image decoding are
//! CPU-bound and run inside `spawn_blocking`.

use crate::config::{BinderConfig, DownloadConfig, SheetConfig};
use crate::error::BinderError;
use crate::output::{BinderReport, DownloadReport, SheetReport};
use crate::pipeline::filter::{filter_rows, sort_records};
use crate::pipeline::render::{render_sheet_pdf, SheetStyle};
use crate::pipeline::{binder, columns::SheetColumns, images, input, table::CsvTable};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetch the feed, keep one set, and write the placeholder sheet PDF.
///
/// # Returns
/// A [`SheetReport`]. When no row matches the set, `output` is `None` and
/// no file is written.
///
/// # Errors
/// Fatal conditions only: the feed cannot be fetched or parsed, required
/// columns are missing, or the PDF cannot be written.
pub async fn generate_sheet(config: &SheetConfig) -> Result<SheetReport, BinderError> {
    let start = Instant::now();
    info!("Generating placeholder sheet for set: {}", config.set_name);

    // ── Step 1: Fetch + parse ────────────────────────────────────────────
    let text = input::fetch_text(&config.feed_url, config.fetch_timeout_secs).await?;
    let table = CsvTable::parse(&text)?;
    info!("Feed has {} rows", table.len());

    // ── Step 2: Resolve columns + filter ─────────────────────────────────
    let columns = SheetColumns::resolve(table.headers());
    debug!("Resolved columns: {:?}", columns);
    let mut records = filter_rows(&table, &columns, &config.set_name)?;
    sort_records(&mut records);
    info!("{} rows match '{}'", records.len(), config.set_name);

    let mut report = SheetReport {
        set_name: config.set_name.clone(),
        total_rows: table.len(),
        matched_rows: records.len(),
        pages: 0,
        slots_per_page: Vec::new(),
        output: None,
        duration_ms: 0,
    };

    if records.is_empty() {
        info!("No matching rows found for set '{}'", config.set_name);
        report.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(report);
    }

    // ── Step 3: Draw + save ──────────────────────────────────────────────
    let grid = config.grid;
    let path = config.output_path.clone();
    let title = config.title();
    let footer = config.footer.clone();
    let caption = config.art_caption.clone();

    let slots_per_page = tokio::task::spawn_blocking(move || {
        let style = SheetStyle {
            title: &title,
            footer: &footer,
            art_caption: &caption,
        };
        render_sheet_pdf(&records, &grid, &style, &path)
    })
    .await
    .map_err(|e| BinderError::Internal(format!("Render task panicked: {}", e)))??;

    report.pages = slots_per_page.len();
    report.slots_per_page = slots_per_page;
    report.output = Some(config.output_path.clone());
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Wrote {} page(s) to {} in {}ms",
        report.pages,
        config.output_path.display(),
        report.duration_ms
    );
    Ok(report)
}

/// Download the product images listed in a CSV and write the metadata sidecar.
///
/// Individual image failures are collected in
/// [`DownloadReport::failures`]; only feed-level problems are errors.
pub async fn download_images(config: &DownloadConfig) -> Result<DownloadReport, BinderError> {
    let start = Instant::now();
    if config.timeout_secs == 0 {
        return Err(BinderError::InvalidConfig("Timeout must be ≥ 1 second".into()));
    }

    let text = input::fetch_text(&config.csv_input, config.timeout_secs).await?;
    let table = CsvTable::parse(&text)?;

    let mut report = images::download_all(config, &table).await?;
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Downloaded {} image(s), {} already present, {} failed",
        report.downloaded,
        report.skipped_existing,
        report.failures.len()
    );
    Ok(report)
}

/// Lay downloaded images out into the binder PDF.
///
/// Undecodable files are collected in [`BinderReport::failures`]. When no
/// image can be placed, `output` is `None` and no file is written.
pub async fn build_binder(config: &BinderConfig) -> Result<BinderReport, BinderError> {
    let start = Instant::now();
    config.grid.validate()?;

    let files = binder::list_images(&config.image_dir)?;
    info!(
        "Found {} image(s) in {}",
        files.len(),
        config.image_dir.display()
    );

    let metadata_path = config.metadata_path();
    let metadata = match images::load_metadata(&metadata_path) {
        Ok(m) => m,
        Err(e) => {
            warn!("{}; laying out images without names or prices", e);
            Default::default()
        }
    };
    debug!("Loaded {} metadata entries", metadata.len());

    let images_found = files.len();
    let grid = config.grid;
    let path = config.output_path.clone();
    let progress = config.progress_callback.clone();

    let layout = tokio::task::spawn_blocking(move || {
        binder::render_binder_pdf(&files, &metadata, &grid, progress.as_ref(), &path)
    })
    .await
    .map_err(|e| BinderError::Internal(format!("Binder task panicked: {}", e)))??;

    let output = (layout.pages > 0).then(|| config.output_path.clone());
    let report = BinderReport {
        images_found,
        placed: layout.placed,
        failures: layout.failures,
        pages: layout.pages,
        output,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Placed {} of {} image(s) on {} page(s)",
        report.placed, report.images_found, report.pages
    );
    Ok(report)
}

/// Synchronous wrapper around [`generate_sheet`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sheet_sync(config: &SheetConfig) -> Result<SheetReport, BinderError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BinderError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_sheet(config))
}
