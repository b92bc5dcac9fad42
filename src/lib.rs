//! # tcg-binder
//!
//! Printable binder sheets for Pokémon card sets, built from a TCG CSV feed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CSV feed (URL or path)
//!  │
//!  ├─ 1. Input    fetch the whole document, decode lossily
//!  ├─ 2. Table    parse headers + rows
//!  ├─ 3. Columns  resolve Game / Set / Name / Number / Price by candidate names
//!  ├─ 4. Filter   keep Pokémon rows of the target set, sort by card number
//!  ├─ 5. Layout   3×6 grid, 18 slots per page, page-local coordinates
//!  └─ 6. Render   placeholder slots drawn to a US-Letter PDF
//! ```
//!
//! Two further runs share the same stages: [`download_images`] fetches the
//! product images a CSV lists and records their names and prices, and
//! [`build_binder`] lays those images out 3×3 per page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tcg_binder::{generate_sheet, SheetConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SheetConfig::builder()
//!         .feed_url(std::env::var("TCGCSV_URL")?)
//!         .build()?;
//!     let report = generate_sheet(&config).await?;
//!     match report.output {
//!         Some(path) => eprintln!("{} pages -> {}", report.pages, path.display()),
//!         None => eprintln!("no rows for {}", report.set_name),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tcg-binder` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod canvas;
pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use canvas::{Canvas, DrawOp, Font, PdfCanvas, Recorder};
pub use config::{BinderConfig, DownloadConfig, SheetConfig, SheetConfigBuilder};
pub use error::{BinderError, ItemError};
pub use generate::{build_binder, download_images, generate_sheet, generate_sheet_sync};
pub use output::{BinderReport, DownloadReport, ImageMetadata, MetadataMap, SheetReport};
pub use pipeline::filter::PlaceholderRecord;
pub use pipeline::layout::{paginate, GridConfig, Page, SlotPosition};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
