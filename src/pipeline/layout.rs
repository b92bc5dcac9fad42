//! Grid pagination: map a linear sequence of items onto fixed-shape pages.
//!
//! ## Coordinates
//!
//! All geometry is in PDF points (1/72 inch) with the origin at the
//! bottom-left of the page and `y` increasing upward. Every page uses the
//! same, page-local coordinate system: slot `(row, column)` sits at the same
//! position on page 0 and on page 7. The renderer emits an explicit page
//! break between pages instead of accumulating a vertical offset.
//!
//! ## Index arithmetic
//!
//! For an item at linear index `i` with `per_page = columns * rows`:
//!
//! ```text
//! page   = i / per_page
//! pos    = i % per_page
//! row    = pos / columns
//! column = pos % columns
//! ```
//!
//! and conversely `i = page * per_page + row * columns + column`.

use crate::error::BinderError;
use serde::{Deserialize, Serialize};

/// Points per inch.
pub const INCH: f32 = 72.0;

/// US Letter width in points.
pub const LETTER_WIDTH: f32 = 8.5 * INCH;

/// US Letter height in points.
pub const LETTER_HEIGHT: f32 = 11.0 * INCH;

/// An axis-aligned rectangle; `(x, y)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Shrink by `pad` on every side.
    pub fn inset(&self, pad: f32) -> Rect {
        Rect::new(
            self.x + pad,
            self.y + pad,
            (self.width - 2.0 * pad).max(0.0),
            (self.height - 2.0 * pad).max(0.0),
        )
    }
}

/// Page size, margin, and grid shape for one run.
///
/// Use [`GridConfig::placeholder_sheet`] (3×6) or [`GridConfig::binder_sheet`]
/// (3×3) for the two layouts this crate produces, or [`GridConfig::new`] for
/// a custom shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub columns: usize,
    pub rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::placeholder_sheet()
    }
}

impl GridConfig {
    /// Validated constructor.
    pub fn new(
        page_width: f32,
        page_height: f32,
        margin: f32,
        columns: usize,
        rows: usize,
    ) -> Result<Self, BinderError> {
        let grid = Self {
            page_width,
            page_height,
            margin,
            columns,
            rows,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// US Letter, half-inch margin, 3 columns × 6 rows (18 slots per page).
    pub fn placeholder_sheet() -> Self {
        Self {
            page_width: LETTER_WIDTH,
            page_height: LETTER_HEIGHT,
            margin: 0.5 * INCH,
            columns: 3,
            rows: 6,
        }
    }

    /// US Letter, half-inch margin, 3 columns × 3 rows (9 slots per page).
    pub fn binder_sheet() -> Self {
        Self {
            rows: 3,
            ..Self::placeholder_sheet()
        }
    }

    /// Check that the grid has at least one slot and the margins leave room.
    pub fn validate(&self) -> Result<(), BinderError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(BinderError::InvalidConfig(format!(
                "Grid must have at least one column and one row, got {}×{}",
                self.columns, self.rows
            )));
        }
        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            return Err(BinderError::InvalidConfig(format!(
                "Page size must be positive, got {}×{}",
                self.page_width, self.page_height
            )));
        }
        if !(self.margin >= 0.0)
            || 2.0 * self.margin >= self.page_width
            || 2.0 * self.margin >= self.page_height
        {
            return Err(BinderError::InvalidConfig(format!(
                "Margin {} leaves no printable area on a {}×{} page",
                self.margin, self.page_width, self.page_height
            )));
        }
        Ok(())
    }

    /// Per-page capacity: `columns * rows`.
    pub fn per_page(&self) -> usize {
        self.columns * self.rows
    }

    pub fn slot_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin) / self.columns as f32
    }

    pub fn slot_height(&self) -> f32 {
        (self.page_height - 2.0 * self.margin) / self.rows as f32
    }

    /// `ceil(n / per_page)`; zero items means zero pages.
    ///
    /// A grid with no slots holds nothing and has zero pages.
    pub fn total_pages(&self, n: usize) -> usize {
        match self.per_page() {
            0 => 0,
            per_page => n.div_ceil(per_page),
        }
    }

    /// Number of occupied slots on page `page_index` when laying out `n` items.
    pub fn occupied_on_page(&self, n: usize, page_index: usize) -> usize {
        let start = page_index * self.per_page();
        n.saturating_sub(start).min(self.per_page())
    }

    /// Position of the item at linear index `i`.
    ///
    /// # Panics
    /// If the grid has zero columns or rows; see [`GridConfig::validate`].
    pub fn position(&self, i: usize) -> SlotPosition {
        let per_page = self.per_page();
        let page_index = i / per_page;
        let pos = i % per_page;
        let row = pos / self.columns;
        let column = pos % self.columns;
        self.slot(page_index, row, column)
    }

    /// Geometry of slot `(row, column)` on page `page_index`.
    ///
    /// `y` is page-local: it does not depend on `page_index`.
    pub fn slot(&self, page_index: usize, row: usize, column: usize) -> SlotPosition {
        let width = self.slot_width();
        let height = self.slot_height();
        SlotPosition {
            page_index,
            row,
            column,
            x: self.margin + column as f32 * width,
            y: self.page_height - self.margin - (row + 1) as f32 * height,
            width,
            height,
        }
    }

    /// Inverse of [`GridConfig::position`].
    pub fn linear_index(&self, slot: &SlotPosition) -> usize {
        slot.page_index * self.per_page() + slot.row * self.columns + slot.column
    }
}

/// Where one item lands: page, grid cell, and the cell's page-local rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotPosition {
    pub page_index: usize,
    pub row: usize,
    pub column: usize,
    /// Left edge of the slot.
    pub x: f32,
    /// Bottom edge of the slot.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SlotPosition {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// One page of laid-out items, in input order.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub page_index: usize,
    pub slots: Vec<(SlotPosition, T)>,
}

impl<T> Page<T> {
    /// Number of occupied slots (at most `per_page`).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Lazy page iterator returned by [`paginate`].
///
/// Pulls at most `per_page` items from the source per call to `next`, so the
/// caller can stream an arbitrarily long input (e.g. decoded images) while
/// holding only one page in memory.
pub struct Pages<I> {
    grid: GridConfig,
    items: I,
    next_index: usize,
}

impl<I: Iterator> Iterator for Pages<I> {
    type Item = Page<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let per_page = self.grid.per_page();
        if per_page == 0 {
            return None;
        }
        let page_index = self.next_index / per_page;
        let mut slots = Vec::with_capacity(per_page);

        while slots.len() < per_page {
            let Some(item) = self.items.next() else {
                break;
            };
            slots.push((self.grid.position(self.next_index), item));
            self.next_index += 1;
        }

        if slots.is_empty() {
            None
        } else {
            Some(Page { page_index, slots })
        }
    }
}

/// Lay `items` out on pages of `grid.per_page()` slots, in order.
///
/// Yields `ceil(n / per_page)` pages; an empty input yields none. Only
/// occupied slots appear in a page, so the final page may be short. A grid
/// with zero columns or rows yields no pages and consumes nothing.
pub fn paginate<I: IntoIterator>(items: I, grid: &GridConfig) -> Pages<I::IntoIter> {
    Pages {
        grid: *grid,
        items: items.into_iter(),
        next_index: 0,
    }
}

/// Largest rectangle with aspect `img_w : img_h` that fits inside `bounds`,
/// horizontally centred and aligned to the top of `bounds`.
pub fn fit_within(img_w: u32, img_h: u32, bounds: Rect) -> Rect {
    if img_w == 0 || img_h == 0 || bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Rect::new(bounds.x, bounds.top(), 0.0, 0.0);
    }
    let scale = (bounds.width / img_w as f32).min(bounds.height / img_h as f32);
    let width = img_w as f32 * scale;
    let height = img_h as f32 * scale;
    Rect::new(
        bounds.x + (bounds.width - width) / 2.0,
        bounds.top() - height,
        width,
        height,
    )
}
