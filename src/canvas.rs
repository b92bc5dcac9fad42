//! Drawing surface abstraction.
//!
//! Layout code draws through the [`Canvas`] trait in PDF points with a
//! bottom-left origin. Two implementations exist:
//!
//! * [`PdfCanvas`]: writes a US-Letter PDF with printpdf's builtin Helvetica
//!   faces and saves it atomically.
//! * [`Recorder`]: keeps every call as a [`DrawOp`] in memory, for layout
//!   inspection and tests.
//!
//! Pages are explicit: callers bracket each page with
//! [`Canvas::begin_page`] / [`Canvas::end_page`], and coordinates reset on
//! every page.

use crate::error::BinderError;
use crate::pipeline::layout::Rect;
use crate::pipeline::text::text_width;
use image::{DynamicImage, Rgb, RgbImage, Rgba};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point, Pt, Px, Rgb as PdfRgb,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// The three Helvetica faces used on every sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

/// A drawing surface with explicit page boundaries.
pub trait Canvas {
    /// Start page `page_index` (0-based). Coordinates are page-local.
    fn begin_page(&mut self, page_index: usize);

    /// Outline an axis-aligned rectangle.
    fn stroke_rect(&mut self, rect: Rect);

    /// Outline a rectangle with rounded corners of `radius` points.
    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32);

    /// Draw `text` with its baseline starting at `(x, y)`.
    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32);

    /// Place `image` scaled to exactly `rect`.
    fn image(&mut self, image: &DynamicImage, rect: Rect);

    /// Finish the current page.
    fn end_page(&mut self);

    /// Draw `text` horizontally centred on `center_x`.
    fn text_centered(&mut self, text: &str, font: Font, size: f32, center_x: f32, y: f32) {
        let width = text_width(text, font, size);
        self.text(text, font, size, center_x - width / 2.0, y);
    }

    /// Draw `text` so that it ends at `right_x`.
    fn text_right(&mut self, text: &str, font: Font, size: f32, right_x: f32, y: f32) {
        let width = text_width(text, font, size);
        self.text(text, font, size, right_x - width, y);
    }
}

// ── PDF backend ──────────────────────────────────────────────────────────

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Oblique => &self.oblique,
        }
    }
}

/// printpdf-backed [`Canvas`].
///
/// The document is created with one page already in it; the first
/// [`Canvas::begin_page`] draws on that page and later calls append new
/// ones. Nothing touches the file system until [`PdfCanvas::save`].
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    fonts: Fonts,
    width: f32,
    height: f32,
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    layer: Option<PdfLayerReference>,
    pages: usize,
}

impl PdfCanvas {
    /// New document titled `title` with pages of `width × height` points.
    pub fn new(title: &str, width: f32, height: f32) -> Result<Self, BinderError> {
        let (doc, page, layer) = PdfDocument::new(title, mm(width), mm(height), "Layer 1");

        let builtin = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| BinderError::PdfRender(e.to_string()))
        };
        let fonts = Fonts {
            regular: builtin(BuiltinFont::Helvetica)?,
            bold: builtin(BuiltinFont::HelveticaBold)?,
            oblique: builtin(BuiltinFont::HelveticaOblique)?,
        };

        Ok(Self {
            doc,
            fonts,
            width,
            height,
            first_page: Some((page, layer)),
            layer: None,
            pages: 0,
        })
    }

    /// Pages started so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn add_path(&self, points: Vec<(Point, bool)>) {
        if let Some(layer) = &self.layer {
            layer.add_line(Line {
                points,
                is_closed: true,
            });
        }
    }

    /// Write the document to `path`.
    ///
    /// The PDF is saved into a temporary file next to `path` and renamed into
    /// place only after the save completes, so a failure never leaves a
    /// truncated file at `path`.
    pub fn save(self, path: &Path) -> Result<(), BinderError> {
        let write_err = |source: std::io::Error| BinderError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            self.doc
                .save(&mut writer)
                .map_err(|e| BinderError::PdfRender(e.to_string()))?;
            writer.flush().map_err(write_err)?;
        }
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!("Saved {} page(s) to {}", self.pages, path.display());
        Ok(())
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, page_index: usize) {
        let (page, layer) = match self.first_page.take() {
            Some(first) => first,
            None => self.doc.add_page(mm(self.width), mm(self.height), "Layer 1"),
        };
        let layer = self.doc.get_page(page).get_layer(layer);
        layer.set_outline_color(Color::Rgb(PdfRgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(0.75);
        self.layer = Some(layer);
        self.pages += 1;
        debug!("PDF page {} started", page_index + 1);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let corners = [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.right(), rect.top()),
            (rect.x, rect.top()),
        ];
        let points = corners
            .iter()
            .map(|&(x, y)| (Point::new(mm(x), mm(y)), false))
            .collect();
        self.add_path(points);
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        if r == 0.0 {
            self.stroke_rect(rect);
            return;
        }
        // Cubic Bézier circle approximation.
        let k = 0.552_284_8 * r;
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.top());
        let p = |x: f32, y: f32, handle_next: bool| (Point::new(mm(x), mm(y)), handle_next);

        // A `true` flag marks that the next two points are Bézier handles.
        let points = vec![
            p(x0 + r, y0, false),
            p(x1 - r, y0, true),
            p(x1 - r + k, y0, true),
            p(x1, y0 + r - k, false),
            p(x1, y0 + r, false),
            p(x1, y1 - r, true),
            p(x1, y1 - r + k, true),
            p(x1 - r + k, y1, false),
            p(x1 - r, y1, false),
            p(x0 + r, y1, true),
            p(x0 + r - k, y1, true),
            p(x0, y1 - r + k, false),
            p(x0, y1 - r, false),
            p(x0, y0 + r, true),
            p(x0, y0 + r - k, true),
            p(x0 + r - k, y0, false),
            p(x0 + r, y0, false),
        ];
        self.add_path(points);
    }

    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32) {
        if let Some(layer) = &self.layer {
            layer.use_text(text, size, mm(x), mm(y), self.fonts.get(font));
        }
    }

    fn image(&mut self, image: &DynamicImage, rect: Rect) {
        let Some(layer) = &self.layer else {
            return;
        };
        if image.width() == 0 || rect.width <= 0.0 {
            return;
        }

        // Flatten transparency onto white; the XObject is plain RGB.
        let rgba = image.to_rgba8();
        let (width_px, height_px) = rgba.dimensions();
        let mut rgb = RgbImage::new(width_px, height_px);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
            rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
        }

        let xobject = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // DPI that maps the pixel width onto the requested physical width.
        let dpi = width_px as f32 / (rect.width / 72.0);

        xobject.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(mm(rect.x)),
                translate_y: Some(mm(rect.y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    fn end_page(&mut self) {
        self.layer = None;
    }
}

// ── In-memory backend ────────────────────────────────────────────────────

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    BeginPage(usize),
    Rect(Rect),
    RoundedRect { rect: Rect, radius: f32 },
    Text {
        text: String,
        font: Font,
        size: f32,
        x: f32,
        y: f32,
    },
    Image {
        rect: Rect,
        width_px: u32,
        height_px: u32,
    },
    EndPage,
}

/// [`Canvas`] that records calls instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded operations grouped by page (without the page brackets).
    pub fn pages(&self) -> Vec<&[DrawOp]> {
        let mut pages = Vec::new();
        let mut start = None;
        for (i, op) in self.ops.iter().enumerate() {
            match op {
                DrawOp::BeginPage(_) => start = Some(i + 1),
                DrawOp::EndPage => {
                    if let Some(s) = start.take() {
                        pages.push(&self.ops[s..i]);
                    }
                }
                _ => {}
            }
        }
        pages
    }

    /// All text drawn on page `page` (0-based), in drawing order.
    pub fn texts_on_page(&self, page: usize) -> Vec<&str> {
        self.pages()
            .get(page)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Canvas for Recorder {
    fn begin_page(&mut self, page_index: usize) {
        self.ops.push(DrawOp::BeginPage(page_index));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Rect(rect));
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32) {
        self.ops.push(DrawOp::RoundedRect { rect, radius });
    }

    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            font,
            size,
            x,
            y,
        });
    }

    fn image(&mut self, image: &DynamicImage, rect: Rect) {
        self.ops.push(DrawOp::Image {
            rect,
            width_px: image.width(),
            height_px: image.height(),
        });
    }

    fn end_page(&mut self) {
        self.ops.push(DrawOp::EndPage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::{LETTER_HEIGHT, LETTER_WIDTH};

    #[test]
    fn recorder_groups_ops_by_page() {
        let mut c = Recorder::new();
        c.begin_page(0);
        c.text("a", Font::Regular, 8.0, 0.0, 0.0);
        c.end_page();
        c.begin_page(1);
        c.stroke_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        c.text("b", Font::Bold, 8.0, 0.0, 0.0);
        c.end_page();

        assert_eq!(c.pages().len(), 2);
        assert_eq!(c.texts_on_page(0), vec!["a"]);
        assert_eq!(c.texts_on_page(1), vec!["b"]);
        assert!(c.texts_on_page(2).is_empty());
    }

    #[test]
    fn alignment_helpers_use_metrics() {
        let mut c = Recorder::new();
        c.begin_page(0);
        c.text_right("Own", Font::Regular, 8.0, 100.0, 10.0);
        c.text_centered("Own", Font::Regular, 8.0, 100.0, 10.0);
        c.end_page();

        let width = text_width("Own", Font::Regular, 8.0);
        let xs: Vec<f32> = c
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert!((xs[0] - (100.0 - width)).abs() < 1e-4);
        assert!((xs[1] - (100.0 - width / 2.0)).abs() < 1e-4);
    }

    #[test]
    fn pdf_canvas_saves_valid_pdf_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.pdf");

        let mut c = PdfCanvas::new("test", LETTER_WIDTH, LETTER_HEIGHT).unwrap();
        for page in 0..2 {
            c.begin_page(page);
            c.stroke_rounded_rect(Rect::new(36.0, 36.0, 180.0, 120.0), 6.0);
            c.text("Hello", Font::Bold, 12.0, 40.0, 100.0);
            c.image(
                &DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 6, Rgba([255, 0, 0, 128]))),
                Rect::new(50.0, 50.0, 40.0, 60.0),
            );
            c.end_page();
        }
        assert_eq!(c.page_count(), 2);
        c.save(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
        // Only the final file remains in the directory.
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
