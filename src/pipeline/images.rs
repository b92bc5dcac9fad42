//! Product image download and the metadata sidecar.
//!
//! Each CSV row with an image URL becomes `<image_dir>/<product_id>.<ext>`,
//! where `ext` comes from the detected image format rather than the URL.
//! Downloads run one at a time. A failed image is recorded as an
//! [`ItemError`] and skipped; only the feed itself can fail the run.
//!
//! After the loop, `file stem → {name, price}` for every image present on
//! disk is written once to the sidecar, replacing any earlier file. Keys are
//! the sanitised stems from [`file_stem`], so the binder finds an entry from
//! the image file name alone.

use crate::config::DownloadConfig;
use crate::error::{BinderError, ItemError};
use crate::output::{DownloadReport, ImageMetadata, MetadataMap};
use crate::pipeline::columns::{
    resolve_column, SheetColumns, IMAGE_URL, MARKET_PRICE, PRODUCT_ID, PRODUCT_NAME,
};
use crate::pipeline::filter::row_matches;
use crate::pipeline::input::http_client;
use crate::pipeline::table::{cell, CsvTable};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions the binder picks up, lower-case.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// One downloadable image taken from a CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

/// Rows of `table` that carry an image URL, optionally limited to one set.
///
/// Returns the jobs and the number of rows skipped for lack of a URL.
pub fn collect_jobs(
    table: &CsvTable,
    set_name: Option<&str>,
) -> Result<(Vec<ImageJob>, usize), BinderError> {
    let headers = table.headers();
    let url_col = resolve_column(headers, IMAGE_URL);
    let id_col = resolve_column(headers, PRODUCT_ID);

    let mut missing = Vec::new();
    if url_col.is_none() {
        missing.push("imageUrl".to_string());
    }
    if id_col.is_none() {
        missing.push("productId".to_string());
    }

    let set_columns = set_name.map(|_| SheetColumns::resolve(headers));
    if let Some(cols) = &set_columns {
        missing.extend(cols.missing_required());
    }
    if !missing.is_empty() {
        return Err(BinderError::MissingColumns {
            missing,
            found: headers.to_vec(),
        });
    }

    let url = url_col.map(|c| c.index);
    let id = id_col.map(|c| c.index);
    let name = resolve_column(headers, PRODUCT_NAME).map(|c| c.index);
    let price = resolve_column(headers, MARKET_PRICE).map(|c| c.index);

    let mut jobs = Vec::new();
    let mut no_url = 0;

    for (i, row) in table.rows().iter().enumerate() {
        if let (Some(target), Some(cols)) = (set_name, &set_columns) {
            let game = cols.game.as_ref().map(|c| c.index);
            let set = cols.set.as_ref().map(|c| c.index);
            if !row_matches(cell(row, game), cell(row, set), target) {
                continue;
            }
        }

        let image_url = cell(row, url).trim();
        if image_url.is_empty() {
            no_url += 1;
            continue;
        }
        jobs.push(ImageJob {
            row: i + 1,
            product_id: cell(row, id).trim().to_string(),
            name: cell(row, name).trim().to_string(),
            price: cell(row, price).trim().to_string(),
            image_url: image_url.to_string(),
        });
    }

    Ok((jobs, no_url))
}

/// File stem for a product id: anything outside `[A-Za-z0-9_-]` becomes `_`.
pub fn file_stem(product_id: &str) -> String {
    product_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// An image already downloaded for `stem`, if any.
pub fn existing_image(dir: &Path, stem: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

/// File extension for a detected image format, or `None` if unsupported.
pub fn extension_for(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("png"),
        ImageFormat::Jpeg => Some("jpg"),
        _ => None,
    }
}

/// Download every image listed in the configured CSV.
pub async fn download_all(
    config: &DownloadConfig,
    table: &CsvTable,
) -> Result<DownloadReport, BinderError> {
    let (jobs, no_url) = collect_jobs(table, config.set_name.as_deref())?;
    let total = jobs.len();
    info!("{} image(s) to fetch into {}", total, config.image_dir.display());

    tokio::fs::create_dir_all(&config.image_dir)
        .await
        .map_err(|e| BinderError::OutputWriteFailed {
            path: config.image_dir.clone(),
            source: e,
        })?;

    let client = http_client(config.timeout_secs)?;
    let mut report = DownloadReport {
        candidates: total,
        skipped_no_url: no_url,
        metadata_path: config.metadata_path(),
        ..Default::default()
    };
    let mut metadata = MetadataMap::new();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    for (i, job) in jobs.iter().enumerate() {
        let index = i + 1;
        let label = if job.name.is_empty() {
            job.product_id.clone()
        } else {
            job.name.clone()
        };
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &label);
        }

        let result = fetch_one(&client, config, job).await;
        match result {
            Ok(fetched) => {
                if fetched {
                    report.downloaded += 1;
                } else {
                    report.skipped_existing += 1;
                }
                let entry = ImageMetadata {
                    name: job.name.clone(),
                    price: job.price.clone(),
                };
                if metadata.insert(file_stem(&job.product_id), entry).is_some() {
                    warn!("Duplicate product id {}; keeping the later row", job.product_id);
                }
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_complete(index, total, &label);
                }
            }
            Err(err) => {
                warn!("Skipping {}: {}", label, err);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_error(index, total, &label, &err.to_string());
                }
                report.failures.push(err);
            }
        }
    }

    report.metadata_entries = metadata.len();
    write_metadata(&report.metadata_path, &metadata)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, report.downloaded + report.skipped_existing);
    }
    Ok(report)
}

/// Fetch a single image. `Ok(false)` means it was already on disk.
async fn fetch_one(
    client: &reqwest::Client,
    config: &DownloadConfig,
    job: &ImageJob,
) -> Result<bool, ItemError> {
    if job.product_id.is_empty() {
        return Err(ItemError::MissingProductId { row: job.row });
    }
    let stem = file_stem(&job.product_id);

    if !config.overwrite {
        if let Some(path) = existing_image(&config.image_dir, &stem) {
            debug!("Already downloaded: {}", path.display());
            return Ok(false);
        }
    }

    info!("Downloading {}...", job.name);
    let failed = |e: reqwest::Error| ItemError::DownloadFailed {
        product_id: job.product_id.clone(),
        detail: e.to_string(),
    };

    let response = client.get(&job.image_url).send().await.map_err(failed)?;
    if !response.status().is_success() {
        return Err(ItemError::HttpStatus {
            product_id: job.product_id.clone(),
            status: response.status().as_u16(),
        });
    }
    let bytes = response.bytes().await.map_err(failed)?;

    let ext = extension_for(&bytes).ok_or_else(|| ItemError::UnsupportedImage {
        product_id: job.product_id.clone(),
    })?;

    let path = config.image_dir.join(format!("{stem}.{ext}"));
    let part = path.with_extension(format!("{ext}.part"));
    let write_failed = |e: std::io::Error| ItemError::WriteFailed {
        product_id: job.product_id.clone(),
        detail: e.to_string(),
    };
    tokio::fs::write(&part, &bytes).await.map_err(write_failed)?;
    tokio::fs::rename(&part, &path).await.map_err(write_failed)?;

    debug!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(true)
}

/// Write the sidecar atomically (temp file + rename), replacing any old one.
pub fn write_metadata(path: &Path, metadata: &MetadataMap) -> Result<(), BinderError> {
    let write_err = |source: std::io::Error| BinderError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|e| BinderError::Internal(format!("metadata serialisation: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;

    info!("Wrote {} metadata entries to {}", metadata.len(), path.display());
    Ok(())
}

/// Read the sidecar. A missing file is an empty map.
pub fn load_metadata(path: &Path) -> Result<MetadataMap, BinderError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MetadataMap::new()),
        Err(e) => {
            return Err(BinderError::MetadataRead {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        }
    };
    serde_json::from_str(&text).map_err(|e| BinderError::MetadataRead {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}
