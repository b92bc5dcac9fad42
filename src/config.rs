//! Configuration types for the three runs this crate performs.
//!
//! * [`SheetConfig`]: placeholder sheet for one set, built via
//!   [`SheetConfigBuilder`] because the feed URL is mandatory and validated.
//! * [`DownloadConfig`]: image download from a product CSV.
//! * [`BinderConfig`]: image binder PDF from a directory of downloads.
//!
//! Defaults mirror the environment-driven CLI: `SET_NAME` defaults to
//! [`DEFAULT_SET_NAME`] and `OUTPUT_PATH` to [`DEFAULT_SHEET_OUTPUT`].

use crate::error::BinderError;
use crate::pipeline::layout::GridConfig;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Set rendered when none is given.
pub const DEFAULT_SET_NAME: &str = "Destined Rivals";

/// Placeholder sheet output path when none is given.
pub const DEFAULT_SHEET_OUTPUT: &str = "outputs/destined_rivals_placeholders.pdf";

/// Binder PDF output path when none is given.
pub const DEFAULT_BINDER_OUTPUT: &str = "binder_sheets/Destined_Rivals_Binder.pdf";

/// Directory downloaded images are written to when none is given.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Name of the metadata sidecar inside the image directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Brand string printed in the footer of every placeholder page.
pub const DEFAULT_FOOTER: &str = "GrowliZard";

/// Caption drawn inside each empty image box.
pub const DEFAULT_ART_CAPTION: &str = "AI Art Here (drop in image in Canva)";

/// Configuration for a placeholder-sheet run.
///
/// # Example
/// ```rust
/// use tcg_binder::SheetConfig;
///
/// let config = SheetConfig::builder()
///     .feed_url("https://example.com/feed.csv")
///     .set_name("Journey Together")
///     .build()
///     .unwrap();
/// assert_eq!(config.grid.per_page(), 18);
/// ```
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// HTTP(S) URL (or local path) of the CSV feed. Required.
    pub feed_url: String,

    /// Set to keep, compared case-insensitively. Default: "Destined Rivals".
    pub set_name: String,

    /// Where the PDF is written. Default: `outputs/destined_rivals_placeholders.pdf`.
    pub output_path: PathBuf,

    /// Page and grid shape. Default: [`GridConfig::placeholder_sheet`] (3×6).
    pub grid: GridConfig,

    /// Timeout for the feed request in seconds. Default: 30.
    pub fetch_timeout_secs: u64,

    /// Footer brand string on every page.
    pub footer: String,

    /// Caption inside each image placeholder.
    pub art_caption: String,
}

impl SheetConfig {
    /// Create a new builder for `SheetConfig`.
    pub fn builder() -> SheetConfigBuilder {
        SheetConfigBuilder {
            config: SheetConfig {
                feed_url: String::new(),
                set_name: DEFAULT_SET_NAME.to_string(),
                output_path: PathBuf::from(DEFAULT_SHEET_OUTPUT),
                grid: GridConfig::placeholder_sheet(),
                fetch_timeout_secs: 30,
                footer: DEFAULT_FOOTER.to_string(),
                art_caption: DEFAULT_ART_CAPTION.to_string(),
            },
        }
    }

    /// Page title: `"<set name> - Printable Binder Placeholder Sheet"`.
    pub fn title(&self) -> String {
        format!("{} - Printable Binder Placeholder Sheet", self.set_name)
    }
}

/// Builder for [`SheetConfig`].
#[derive(Debug)]
pub struct SheetConfigBuilder {
    config: SheetConfig,
}

impl SheetConfigBuilder {
    pub fn feed_url(mut self, url: impl Into<String>) -> Self {
        self.config.feed_url = url.into();
        self
    }

    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.config.set_name = name.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn grid(mut self, grid: GridConfig) -> Self {
        self.config.grid = grid;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.config.footer = footer.into();
        self
    }

    pub fn art_caption(mut self, caption: impl Into<String>) -> Self {
        self.config.art_caption = caption.into();
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing feed URL is [`BinderError::MissingFeedUrl`], reported before
    /// any network or file activity.
    pub fn build(self) -> Result<SheetConfig, BinderError> {
        let c = &self.config;
        if c.feed_url.trim().is_empty() {
            return Err(BinderError::MissingFeedUrl);
        }
        if c.set_name.trim().is_empty() {
            return Err(BinderError::InvalidConfig("Set name must not be empty".into()));
        }
        if c.fetch_timeout_secs == 0 {
            return Err(BinderError::InvalidConfig("Timeout must be ≥ 1 second".into()));
        }
        c.grid.validate()?;
        Ok(self.config)
    }
}

/// Configuration for an image-download run.
#[derive(Clone)]
pub struct DownloadConfig {
    /// Product CSV: local path or HTTP(S) URL. Default: `data.csv`.
    pub csv_input: String,

    /// Directory images are written to. Created if missing. Default: `images`.
    pub image_dir: PathBuf,

    /// Metadata sidecar path. Default: `<image_dir>/metadata.json`.
    pub metadata_path: Option<PathBuf>,

    /// Only download rows of this set (requires game/set/name columns).
    pub set_name: Option<String>,

    /// Per-image request timeout in seconds. Default: 10.
    pub timeout_secs: u64,

    /// Re-download images that already exist on disk. Default: false.
    pub overwrite: bool,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            csv_input: "data.csv".to_string(),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            metadata_path: None,
            set_name: None,
            timeout_secs: 10,
            overwrite: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("csv_input", &self.csv_input)
            .field("image_dir", &self.image_dir)
            .field("metadata_path", &self.metadata_path)
            .field("set_name", &self.set_name)
            .field("timeout_secs", &self.timeout_secs)
            .field("overwrite", &self.overwrite)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl DownloadConfig {
    /// Effective metadata sidecar path.
    pub fn metadata_path(&self) -> PathBuf {
        metadata_path_or_default(self.metadata_path.as_deref(), &self.image_dir)
    }
}

/// Configuration for a binder-layout run.
#[derive(Clone)]
pub struct BinderConfig {
    /// Directory of downloaded images. Default: `images`.
    pub image_dir: PathBuf,

    /// Where the PDF is written. Default: `binder_sheets/Destined_Rivals_Binder.pdf`.
    pub output_path: PathBuf,

    /// Metadata sidecar path. Default: `<image_dir>/metadata.json`. A missing
    /// file means images are laid out without name/price text.
    pub metadata_path: Option<PathBuf>,

    /// Page and grid shape. Default: [`GridConfig::binder_sheet`] (3×3).
    pub grid: GridConfig,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            output_path: PathBuf::from(DEFAULT_BINDER_OUTPUT),
            metadata_path: None,
            grid: GridConfig::binder_sheet(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderConfig")
            .field("image_dir", &self.image_dir)
            .field("output_path", &self.output_path)
            .field("metadata_path", &self.metadata_path)
            .field("grid", &self.grid)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl BinderConfig {
    /// Effective metadata sidecar path.
    pub fn metadata_path(&self) -> PathBuf {
        metadata_path_or_default(self.metadata_path.as_deref(), &self.image_dir)
    }
}

fn metadata_path_or_default(explicit: Option<&Path>, image_dir: &Path) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| image_dir.join(METADATA_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = SheetConfig::builder()
            .feed_url("https://example.com/feed.csv")
            .build()
            .unwrap();
        assert_eq!(c.set_name, "Destined Rivals");
        assert_eq!(c.output_path, PathBuf::from(DEFAULT_SHEET_OUTPUT));
        assert_eq!(c.fetch_timeout_secs, 30);
        assert_eq!(c.grid, GridConfig::placeholder_sheet());
        assert_eq!(
            c.title(),
            "Destined Rivals - Printable Binder Placeholder Sheet"
        );
    }

    #[test]
    fn missing_feed_url_is_fatal() {
        let err = SheetConfig::builder().build().unwrap_err();
        assert!(matches!(err, BinderError::MissingFeedUrl));

        let err = SheetConfig::builder().feed_url("   ").build().unwrap_err();
        assert!(matches!(err, BinderError::MissingFeedUrl));
    }

    #[test]
    fn invalid_values_rejected() {
        let base = || SheetConfig::builder().feed_url("https://example.com/feed.csv");
        assert!(base().set_name("").build().is_err());
        assert!(base().fetch_timeout_secs(0).build().is_err());

        let mut grid = GridConfig::placeholder_sheet();
        grid.columns = 0;
        assert!(base().grid(grid).build().is_err());
    }

    #[test]
    fn metadata_path_defaults_into_image_dir() {
        let d = DownloadConfig {
            image_dir: PathBuf::from("cards"),
            ..Default::default()
        };
        assert_eq!(d.metadata_path(), PathBuf::from("cards/metadata.json"));

        let b = BinderConfig {
            metadata_path: Some(PathBuf::from("meta.json")),
            ..Default::default()
        };
        assert_eq!(b.metadata_path(), PathBuf::from("meta.json"));
        assert_eq!(b.grid.per_page(), 9);
    }
}
