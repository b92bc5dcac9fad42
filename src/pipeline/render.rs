//! Placeholder sheet drawing.
//!
//! Every page gets the title centred in the top margin, up to `per_page`
//! placeholder slots, and the footer brand in the bottom margin. A slot is a
//! rounded card outline holding an empty image box (top 55 %), a
//! `name  #number` line with the price right-aligned, and `Want` / `Own`
//! checkboxes at the bottom.

use crate::canvas::{Canvas, Font, PdfCanvas};
use crate::error::BinderError;
use crate::pipeline::filter::PlaceholderRecord;
use crate::pipeline::layout::{paginate, GridConfig, Rect, SlotPosition};
use crate::pipeline::price::format_price;
use crate::pipeline::text::{truncate_chars, MAX_NAME_CHARS};
use std::path::Path;
use tracing::debug;

const PAD: f32 = 8.0;
const CORNER_RADIUS: f32 = 6.0;
const IMAGE_SHARE: f32 = 0.55;
const CHECKBOX: f32 = 8.0;

const TITLE_SIZE: f32 = 14.0;
const FOOTER_SIZE: f32 = 7.0;
const CAPTION_SIZE: f32 = 7.0;
const BODY_SIZE: f32 = 8.0;

/// Fixed strings printed on every page and slot.
#[derive(Debug, Clone, Copy)]
pub struct SheetStyle<'a> {
    pub title: &'a str,
    pub footer: &'a str,
    pub art_caption: &'a str,
}

/// `"name  #number"` with the name cut to [`MAX_NAME_CHARS`].
pub fn slot_label(record: &PlaceholderRecord) -> String {
    let name = truncate_chars(&record.card_name, MAX_NAME_CHARS);
    let number = record.card_number.trim();
    if number.is_empty() {
        name.to_string()
    } else {
        format!("{name}  #{number}")
    }
}

/// Draw one placeholder slot.
pub fn draw_placeholder<C: Canvas + ?Sized>(
    canvas: &mut C,
    slot: &SlotPosition,
    record: &PlaceholderRecord,
    art_caption: &str,
) {
    let cell = slot.rect();
    canvas.stroke_rounded_rect(cell.inset(PAD), CORNER_RADIUS);

    let image_height = (cell.height - 3.0 * PAD) * IMAGE_SHARE;
    let image_box = Rect::new(
        cell.x + 2.0 * PAD,
        cell.top() - 2.0 * PAD - image_height,
        cell.width - 4.0 * PAD,
        image_height,
    );
    canvas.stroke_rect(image_box);
    canvas.text_centered(
        art_caption,
        Font::Oblique,
        CAPTION_SIZE,
        image_box.x + image_box.width / 2.0,
        image_box.y + image_box.height / 2.0,
    );

    let text_y = image_box.y - 12.0;
    canvas.text(
        &slot_label(record),
        Font::Bold,
        BODY_SIZE,
        image_box.x + 4.0,
        text_y,
    );
    canvas.text_right(
        &format_price(&record.market_price_raw),
        Font::Regular,
        BODY_SIZE,
        cell.right() - 2.0 * PAD - 4.0,
        text_y,
    );

    let checkbox_y = cell.y + PAD + 8.0;
    canvas.stroke_rect(Rect::new(image_box.x + 2.0, checkbox_y, CHECKBOX, CHECKBOX));
    canvas.text("Want", Font::Regular, BODY_SIZE, image_box.x + 12.0, checkbox_y);
    canvas.stroke_rect(Rect::new(image_box.x + 56.0, checkbox_y, CHECKBOX, CHECKBOX));
    canvas.text("Own", Font::Regular, BODY_SIZE, image_box.x + 70.0, checkbox_y);
}

/// Lay `records` out page by page on `canvas`.
///
/// Returns the number of occupied slots on each page. Empty input draws
/// nothing and returns an empty vector.
pub fn render_sheet<C: Canvas + ?Sized>(
    canvas: &mut C,
    records: &[PlaceholderRecord],
    grid: &GridConfig,
    style: &SheetStyle<'_>,
) -> Vec<usize> {
    let mut slots_per_page = Vec::with_capacity(grid.total_pages(records.len()));

    for page in paginate(records, grid) {
        canvas.begin_page(page.page_index);
        canvas.text_centered(
            style.title,
            Font::Bold,
            TITLE_SIZE,
            grid.page_width / 2.0,
            grid.page_height - grid.margin / 2.0,
        );

        for (slot, record) in &page.slots {
            draw_placeholder(canvas, slot, record, style.art_caption);
        }

        canvas.text(
            style.footer,
            Font::Oblique,
            FOOTER_SIZE,
            grid.margin,
            grid.margin / 2.0,
        );
        canvas.end_page();

        debug!(
            "Rendered page {} with {} slot(s)",
            page.page_index + 1,
            page.len()
        );
        slots_per_page.push(page.len());
    }

    slots_per_page
}

/// Render `records` to a PDF at `path`. Blocking.
pub fn render_sheet_pdf(
    records: &[PlaceholderRecord],
    grid: &GridConfig,
    style: &SheetStyle<'_>,
    path: &Path,
) -> Result<Vec<usize>, BinderError> {
    let mut canvas = PdfCanvas::new(style.title, grid.page_width, grid.page_height)?;
    let slots_per_page = render_sheet(&mut canvas, records, grid, style);
    canvas.save(path)?;
    Ok(slots_per_page)
}
