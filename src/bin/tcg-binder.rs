//! CLI binary for tcg-binder.
//!
//! A thin shim over the library crate that maps flags and environment
//! variables to the run configs and prints the reports.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tcg_binder::config::{DEFAULT_BINDER_OUTPUT, DEFAULT_IMAGE_DIR, DEFAULT_SET_NAME, DEFAULT_SHEET_OUTPUT};
use tcg_binder::{
    build_binder, download_images, generate_sheet, BinderConfig, DownloadConfig, ProgressCallback,
    RunProgressCallback, SheetConfig,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar for downloads and binder layout.
struct CliProgressCallback {
    bar: ProgressBar,
    noun: &'static str,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(noun: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            noun,
            errors: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  {{msg}}",
            self.noun
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Working");
        self.bar.reset_eta();
    }

    fn on_item_start(&self, _index: usize, _total: usize, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn on_item_complete(&self, _index: usize, _total: usize, _label: &str) {
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, label: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['…']).collect()
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            label,
            dim(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {}/{} {}",
                green("✔"),
                bold(&success_count.to_string()),
                total,
                self.noun
            );
        } else {
            eprintln!(
                "{} {}/{} {}  ({} failed)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total,
                self.noun,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Placeholder sheet for the default set
  TCGCSV_URL=https://tcgcsv.com/.../ProductsAndPrices.csv tcg-binder sheet

  # Another set, custom output
  tcg-binder sheet --url feed.csv --set "Journey Together" -o jt.pdf

  # Download the images of one set, then lay them out
  tcg-binder download-images --csv data.csv --set "Destined Rivals"
  tcg-binder binder --images images -o binder.pdf

ENVIRONMENT VARIABLES:
  TCGCSV_URL    CSV feed for `sheet` (required)
  SET_NAME      Set to render (default: Destined Rivals)
  OUTPUT_PATH   Placeholder PDF path
  RUST_LOG      Overrides the log filter
"#;

/// Printable binder sheets for Pokémon card sets.
#[derive(Parser, Debug)]
#[command(
    name = "tcg-binder",
    version,
    about = "Printable binder sheets for Pokémon card sets",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "TCG_BINDER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "TCG_BINDER_QUIET")]
    quiet: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the placeholder sheet PDF for one set.
    Sheet(SheetArgs),
    /// Download product images listed in a CSV.
    DownloadImages(DownloadArgs),
    /// Lay downloaded images out into a binder PDF.
    Binder(BinderArgs),
}

#[derive(Args, Debug)]
struct SheetArgs {
    /// CSV feed URL (or local path).
    #[arg(long, env = "TCGCSV_URL")]
    url: Option<String>,

    /// Set name, matched case-insensitively.
    #[arg(long = "set", env = "SET_NAME", default_value = DEFAULT_SET_NAME)]
    set_name: String,

    /// Output PDF path.
    #[arg(short, long, env = "OUTPUT_PATH", default_value = DEFAULT_SHEET_OUTPUT)]
    output: PathBuf,

    /// Feed download timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Product CSV (local path or URL).
    #[arg(long, default_value = "data.csv")]
    csv: String,

    /// Directory to write images to.
    #[arg(long, default_value = DEFAULT_IMAGE_DIR)]
    images: PathBuf,

    /// Metadata sidecar path (default: <images>/metadata.json).
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Only download rows of this set.
    #[arg(long = "set")]
    set_name: Option<String>,

    /// Per-image timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Re-download images already on disk.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct BinderArgs {
    /// Directory of downloaded images.
    #[arg(long, default_value = DEFAULT_IMAGE_DIR)]
    images: PathBuf,

    /// Output PDF path.
    #[arg(short, long, default_value = DEFAULT_BINDER_OUTPUT)]
    output: PathBuf,

    /// Metadata sidecar path (default: <images>/metadata.json).
    #[arg(long)]
    metadata: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = shows_progress(&cli);
    let filter = log_filter(&cli);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Sheet(args) => run_sheet(&cli, args).await,
        Command::DownloadImages(args) => {
            let config = DownloadConfig {
                csv_input: args.csv.clone(),
                image_dir: args.images.clone(),
                metadata_path: args.metadata.clone(),
                set_name: args.set_name.clone(),
                timeout_secs: args.timeout,
                overwrite: args.overwrite,
                progress_callback: progress_for(show_progress, "images"),
            };
            let report = download_images(&config)
                .await
                .context("Image download failed")?;
            if !emit_json(&cli, &report)? && !cli.quiet {
                eprintln!(
                    "{}  {} downloaded, {} already present, {} without URL, {} failed  {}ms",
                    if report.failures.is_empty() { green("✔") } else { cyan("⚠") },
                    report.downloaded,
                    report.skipped_existing,
                    report.skipped_no_url,
                    report.failures.len(),
                    report.duration_ms,
                );
                eprintln!("   metadata → {}", bold(&report.metadata_path.display().to_string()));
            }
            Ok(())
        }
        Command::Binder(args) => {
            let config = BinderConfig {
                image_dir: args.images.clone(),
                output_path: args.output.clone(),
                metadata_path: args.metadata.clone(),
                progress_callback: progress_for(show_progress, "images"),
                ..Default::default()
            };
            let report = build_binder(&config)
                .await
                .context("Binder layout failed")?;
            if !emit_json(&cli, &report)? && !cli.quiet {
                match report.output {
                    Some(ref path) => eprintln!(
                        "{}  {}/{} images on {} page(s)  →  {}",
                        if report.failures.is_empty() { green("✔") } else { cyan("⚠") },
                        report.placed,
                        report.images_found,
                        report.pages,
                        bold(&path.display().to_string()),
                    ),
                    None => eprintln!("No images could be placed. Exiting."),
                }
            }
            Ok(())
        }
    }
}

async fn run_sheet(cli: &Cli, args: &SheetArgs) -> Result<()> {
    let config = SheetConfig::builder()
        .feed_url(args.url.clone().unwrap_or_default())
        .set_name(args.set_name.clone())
        .output_path(args.output.clone())
        .fetch_timeout_secs(args.timeout)
        .build()
        .context("Invalid configuration")?;

    let report = generate_sheet(&config)
        .await
        .context("Placeholder sheet generation failed")?;

    if emit_json(cli, &report)? || cli.quiet {
        return Ok(());
    }
    match report.output {
        Some(ref path) => eprintln!(
            "{}  {} cards on {} page(s)  {}ms  →  {}",
            green("✔"),
            report.matched_rows,
            report.pages,
            report.duration_ms,
            bold(&path.display().to_string()),
        ),
        None => eprintln!("No matching rows found for set. Exiting."),
    }
    Ok(())
}

/// Whether this run draws a progress bar. `sheet` has no per-item progress.
fn shows_progress(cli: &Cli) -> bool {
    let has_items = !matches!(cli.command, Command::Sheet(_));
    has_items && !cli.quiet && !cli.no_progress && !cli.json
}

/// Default log filter. Only errors while the progress bar is on screen.
fn log_filter(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet || shows_progress(cli) {
        "error"
    } else {
        "info"
    }
}

fn progress_for(show: bool, noun: &'static str) -> Option<ProgressCallback> {
    show.then(|| CliProgressCallback::new(noun) as Arc<dyn RunProgressCallback>)
}

/// Print `report` as JSON when `--json` is set. Returns whether it printed.
fn emit_json<T: Serialize>(cli: &Cli, report: &T) -> Result<bool> {
    if !cli.json {
        return Ok(false);
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
    println!("{json}");
    Ok(true)
}
