//! Image binder layout: downloaded card images on a 3×3 grid.
//!
//! Files are taken in file-name order. Each one is decoded, shrunk to the
//! image box at 300 dpi, and placed in the next free slot. When the
//! metadata sidecar has an entry for the file stem, the card name (wrapped
//! to two lines) and price are drawn under the image.
//!
//! A file that fails to decode is logged and skipped without taking a slot.

use crate::canvas::{Canvas, Font, PdfCanvas};
use crate::error::{BinderError, ItemError};
use crate::output::MetadataMap;
use crate::pipeline::images::IMAGE_EXTENSIONS;
use crate::pipeline::layout::{fit_within, paginate, GridConfig, Rect, SlotPosition, INCH};
use crate::pipeline::price::format_price;
use crate::pipeline::text::wrap_text;
use crate::progress::ProgressCallback;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PAD: f32 = 6.0;
const TEXT_AREA: f32 = 34.0;
const NAME_SIZE: f32 = 8.0;
const PRICE_SIZE: f32 = 8.0;
const LINE_GAP: f32 = 10.0;
const NAME_LINES: usize = 2;

/// Thumbnail resolution.
pub const THUMBNAIL_DPI: f32 = 300.0;

/// A decoded image waiting for a slot.
#[derive(Debug)]
pub struct BinderImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

impl BinderImage {
    /// File stem, used as the metadata key.
    pub fn key(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Counts from one layout pass.
#[derive(Debug, Default)]
pub struct BinderLayout {
    pub placed: usize,
    pub pages: usize,
    pub failures: Vec<ItemError>,
}

/// Image files in `dir` with a supported extension, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, BinderError> {
    if !dir.is_dir() {
        return Err(BinderError::ImageDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|_| BinderError::ImageDirNotFound {
        path: dir.to_path_buf(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image box of a slot: the cell less padding and the text area.
pub fn image_box(slot: &SlotPosition) -> Rect {
    let cell = slot.rect().inset(PAD);
    Rect::new(
        cell.x,
        cell.y + TEXT_AREA,
        cell.width,
        (cell.height - TEXT_AREA).max(0.0),
    )
}

/// Pixel size of `bounds` at [`THUMBNAIL_DPI`].
pub fn thumbnail_pixels(bounds: Rect) -> (u32, u32) {
    let px = |pt: f32| ((pt / INCH) * THUMBNAIL_DPI).round().max(1.0) as u32;
    (px(bounds.width), px(bounds.height))
}

/// Decode `path` and shrink it to fit `max`, never enlarging.
pub fn load_thumbnail(path: &Path, max: (u32, u32)) -> Result<DynamicImage, ItemError> {
    let image = image::open(path).map_err(|e| ItemError::DecodeFailed {
        file: display_name(path),
        detail: e.to_string(),
    })?;
    if image.width() > max.0 || image.height() > max.1 {
        Ok(image.thumbnail(max.0, max.1))
    } else {
        Ok(image)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Draw one image slot.
pub fn draw_binder_slot<C: Canvas + ?Sized>(
    canvas: &mut C,
    slot: &SlotPosition,
    item: &BinderImage,
    metadata: &MetadataMap,
) {
    let bounds = image_box(slot);
    let placed = fit_within(item.image.width(), item.image.height(), bounds);
    canvas.image(&item.image, placed);

    let Some(entry) = metadata.get(item.key()) else {
        return;
    };

    let mut y = bounds.y - LINE_GAP;
    for line in wrap_text(&entry.name, Font::Bold, NAME_SIZE, bounds.width, NAME_LINES) {
        canvas.text(&line, Font::Bold, NAME_SIZE, bounds.x, y);
        y -= LINE_GAP;
    }
    canvas.text(
        &format_price(&entry.price),
        Font::Regular,
        PRICE_SIZE,
        bounds.x,
        y,
    );
}

/// Decode and place `files` on `canvas`.
///
/// Files are decoded one at a time as slots are filled.
pub fn render_binder<C: Canvas + ?Sized>(
    canvas: &mut C,
    files: &[PathBuf],
    metadata: &MetadataMap,
    grid: &GridConfig,
    progress: Option<&ProgressCallback>,
) -> BinderLayout {
    let total = files.len();
    if grid.per_page() == 0 {
        warn!("Binder grid has no slots; nothing to place");
        return BinderLayout::default();
    }
    let max_px = thumbnail_pixels(image_box(&grid.position(0)));
    let mut failures = Vec::new();

    if let Some(cb) = progress {
        cb.on_run_start(total);
    }

    let decoded = files.iter().enumerate().filter_map(|(i, path)| {
        let label = display_name(path);
        if let Some(cb) = progress {
            cb.on_item_start(i + 1, total, &label);
        }
        match load_thumbnail(path, max_px) {
            Ok(image) => {
                if let Some(cb) = progress {
                    cb.on_item_complete(i + 1, total, &label);
                }
                Some(BinderImage {
                    path: path.clone(),
                    image,
                })
            }
            Err(err) => {
                warn!("{}", err);
                if let Some(cb) = progress {
                    cb.on_item_error(i + 1, total, &label, &err.to_string());
                }
                failures.push(err);
                None
            }
        }
    });

    let mut layout = BinderLayout::default();
    for page in paginate(decoded, grid) {
        canvas.begin_page(page.page_index);
        for (slot, item) in &page.slots {
            draw_binder_slot(canvas, slot, item, metadata);
            debug!(
                "Placed {} at page {} row {} col {}",
                item.path.display(),
                page.page_index + 1,
                slot.row,
                slot.column
            );
        }
        canvas.end_page();
        layout.placed += page.len();
        layout.pages += 1;
    }
    layout.failures = failures;

    if let Some(cb) = progress {
        cb.on_run_complete(total, layout.placed);
    }
    layout
}

/// Lay `files` out into a PDF at `path`. Blocking.
///
/// Nothing is written when no image could be placed; the returned layout
/// then has zero pages.
pub fn render_binder_pdf(
    files: &[PathBuf],
    metadata: &MetadataMap,
    grid: &GridConfig,
    progress: Option<&ProgressCallback>,
    path: &Path,
) -> Result<BinderLayout, BinderError> {
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Binder".to_string());
    let mut canvas = PdfCanvas::new(&title, grid.page_width, grid.page_height)?;
    let layout = render_binder(&mut canvas, files, metadata, grid, progress);
    if layout.pages == 0 {
        info!("No images could be placed; skipping PDF output");
        return Ok(layout);
    }
    canvas.save(path)?;
    Ok(layout)
}
