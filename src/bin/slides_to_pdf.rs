//! CLI binary for the slide-deck pipeline.
//!
//! Identical shape to `html_to_pdf`, plus the aspect-ratio presets and the
//! slides-per-page stacking option.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use prepress::{convert, ConversionConfig, SlideSize};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"SIZES:
  16:9   254mm x 142.9mm  (widescreen, default)
  4:3    254mm x 190.5mm  (standard)

EXAMPLES:
  slides_to_pdf presentation.html slides.pdf
  slides_to_pdf presentation.html slides.pdf --size 4:3
  slides_to_pdf presentation.html slides.pdf --slides-per-page 2
  slides_to_pdf presentation.html slides.pdf --no-gs

The deck is loaded with the ?print-pdf query so reveal.js switches to its
print layout; the tool waits for the framework to report readiness before
capturing.

REQUIREMENTS:
  A Chrome or Chromium binary, plus Ghostscript unless --no-gs is given:
    Ubuntu/Debian: sudo apt install ghostscript
    macOS:         brew install ghostscript
"#;

/// Render a reveal.js slide deck to a print-ready PDF.
#[derive(Parser, Debug)]
#[command(
    name = "slides_to_pdf",
    version,
    about = "Render a reveal.js slide deck to a print-ready PDF",
    long_about = "Render a reveal.js slide deck to a print-ready PDF using headless Chrome in \
print mode, then normalise it for commercial printing with Ghostscript (PDF 1.3, outlined \
fonts, flattened transparency, no image downsampling).",
    color = clap::ColorChoice::Auto,
    after_help = AFTER_HELP
)]
struct Cli {
    /// Input HTML file (reveal.js deck).
    input: PathBuf,

    /// Output PDF file.
    output: PathBuf,

    /// Aspect ratio: 16:9 or 4:3.
    #[arg(long, default_value = "16:9")]
    size: String,

    /// Slides stacked vertically per PDF page.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    slides_per_page: u32,

    /// Skip Ghostscript post-processing and emit the raw browser PDF.
    #[arg(long = "no-gs")]
    no_gs: bool,

    /// Enable DEBUG-level logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Parse the command line, keeping the documented exit codes: 0 for
/// `--help`/`--version`, 1 for any argument error (clap defaults to 2).
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose, cli.quiet);

    let size = SlideSize::parse(&cli.size)?;
    let config = ConversionConfig::slides(&cli.input, &cli.output, size)
        .slides_per_page(cli.slides_per_page)
        .postprocess(!cli.no_gs)
        .build()?;

    let summary = convert(&config).await.context("Conversion failed")?;

    if !cli.quiet {
        eprintln!(
            "{} PDF generated: {}",
            green("✔"),
            bold(&summary.output.display().to_string())
        );
        if summary.fallback {
            eprintln!(
                "{} post-processing failed; delivered the browser PDF unmodified",
                yellow("⚠")
            );
        } else if !summary.postprocessed {
            eprintln!("   {}", dim("post-processing skipped (--no-gs)"));
        }
        eprintln!(
            "   {}  {}",
            dim(&format!("render {}ms", summary.render_duration_ms)),
            dim(&format!("postprocess {}ms", summary.postprocess_duration_ms)),
        );
    }

    Ok(())
}
