//! CLI binary for edgequake-pdf2json.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and writes the JSON artifact.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2json::{
    convert, convert_to_file, to_json, ExtractionConfig, ExtractionProgressCallback,
    ExtractionStats, PageSummary, ProgressCallback, MAX_DPI, MIN_DPI,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

/// Terminal progress callback: a live progress bar plus one log line per page
/// and per dropped image.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Images dropped so far.
    dropped: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner-only until `on_extraction_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            dropped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, summary: &PageSummary) {
        let mark = if summary.failed_images == 0 {
            green("✓")
        } else {
            cyan("⚠")
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            mark,
            page_num,
            total,
            dim(&format!(
                "{} blocks  {} tables  {} images",
                summary.text_blocks, summary.tables, summary.images
            )),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, page_num: usize, image_index: usize, error: &str) {
        self.dropped.fetch_add(1, Ordering::SeqCst);

        // Keep long pdfium messages on one line.
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3} image {}  {}",
            red("✗"),
            page_num,
            image_index,
            red(&msg),
        ));
    }

    fn on_extraction_complete(&self, total_pages: usize, images_extracted: usize) {
        let dropped = self.dropped.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if dropped == 0 {
            eprintln!(
                "{} {} pages extracted, {} images",
                green("✔"),
                bold(&total_pages.to_string()),
                images_extracted
            );
        } else {
            eprintln!(
                "{} {} pages extracted, {} images  ({} dropped)",
                cyan("⚠"),
                bold(&total_pages.to_string()),
                images_extracted,
                red(&dropped.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the JSON document to stdout (images embedded as base64 only)
  pdf2json document.pdf

  # Write JSON to a file and the cropped images to a directory
  pdf2json document.pdf -o document.json --image-dir images/

  # Sharper image crops
  pdf2json --dpi 200 report.pdf -o report.json

  # Encrypted document
  pdf2json --password secret locked.pdf -o locked.json

OUTPUT:
  {
      "title": "First line of page 1",
      "text_blocks": [{"text": "..."}],
      "tables": [{"headers": ["A", "B"], "rows": [["1", "2"]]}],
      "images": [{"page_number": 1, "image_index": 0,
                  "bbox": [x0, top, x1, bottom], "image_data": "<base64 PNG>",
                  "url": "file:///.../page_1_image_0.png"}]
  }

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Override the log filter (e.g. edgequake_pdf2json=debug)
"#;

/// Extract title, text, tables and images from a PDF into JSON.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2json",
    version,
    about = "Extract title, text, tables and images from a PDF into JSON",
    long_about = "Extract the title, non-empty text lines, detected tables and embedded images \
of a PDF document into a single JSON artifact. Images are cropped from the rendered page, \
embedded as base64 PNG and optionally written to an image directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "PDF2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for cropped image files (created if missing).
    #[arg(long, env = "PDF2JSON_IMAGE_DIR", conflicts_with = "no_image_files")]
    image_dir: Option<PathBuf>,

    /// Embed images as base64 only; write no image files.
    #[arg(long, env = "PDF2JSON_NO_IMAGE_FILES")]
    no_image_files: bool,

    /// Rendering DPI used when cropping images (36–600).
    #[arg(long, env = "PDF2JSON_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(MIN_DPI as i64..=MAX_DPI as i64))]
    dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2JSON_PASSWORD")]
    password: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        if !cli.quiet {
            print_summary(&stats, Some(output_path), show_progress);
        }
    } else {
        let extraction = convert(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        let json = to_json(&extraction.document).context("Failed to serialise document")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();

        if !cli.quiet {
            print_summary(&extraction.stats, None, show_progress);
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder().dpi(cli.dpi);

    if !cli.no_image_files {
        if let Some(ref dir) = cli.image_dir {
            builder = builder.image_dir(dir);
        }
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One-line run summary on stderr. With the progress bar active the page
/// and image counts were already printed, so only timing and destination
/// remain.
fn print_summary(stats: &ExtractionStats, output: Option<&PathBuf>, show_progress: bool) {
    let mark = if stats.images_failed == 0 {
        green("✔")
    } else {
        cyan("⚠")
    };
    let dest = output
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();

    if show_progress {
        eprintln!("{}  {}ms{}", mark, stats.duration_ms, dest);
        return;
    }

    eprintln!(
        "{}  {} pages  {} text blocks  {} tables  {}/{} images  {}ms{}",
        mark,
        stats.total_pages,
        stats.text_blocks,
        stats.tables,
        stats.images_extracted,
        stats.images_found,
        stats.duration_ms,
        dest,
    );
    if stats.images_failed > 0 {
        eprintln!("  {} images dropped", red(&stats.images_failed.to_string()));
    }
    if stats.images_skipped > 0 {
        eprintln!(
            "  {}",
            dim(&format!("{} images without a bounding box", stats.images_skipped))
        );
    }
}
