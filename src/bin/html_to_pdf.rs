//! CLI binary for the document pipeline.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints the result.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use prepress::{convert, ConversionConfig, PageSize};
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
  A4            210mm x 297mm  (default)
  A5            148mm x 210mm
  B5            182mm x 257mm
  A4-landscape  297mm x 210mm
  A4-bleed      216mm x 303mm  (A4 + 3mm bleed per side)
  A5-bleed      154mm x 216mm  (A5 + 3mm bleed per side)

EXAMPLES:
  html_to_pdf flyer.html flyer.pdf
  html_to_pdf flyer.html flyer.pdf --size A4-bleed
  html_to_pdf flyer.html flyer.pdf --no-gs

REQUIREMENTS:
  A Chrome or Chromium binary, plus Ghostscript unless --no-gs is given:
    Ubuntu/Debian: sudo apt install ghostscript
    macOS:         brew install ghostscript
"#;

/// Render an HTML document to a print-ready PDF.
#[derive(Parser, Debug)]
#[command(
    name = "html_to_pdf",
    version,
    about = "Render an HTML document to a print-ready PDF",
    long_about = "Render an HTML document to a print-ready PDF using headless Chrome, then \
normalise it for commercial printing with Ghostscript (PDF 1.3, outlined fonts, flattened \
transparency, no image downsampling).",
    color = clap::ColorChoice::Auto,
    after_help = AFTER_HELP
)]
struct Cli {
    /// Input HTML file.
    input: PathBuf,

    /// Output PDF file.
    output: PathBuf,

    /// Page size: A4, A5, B5, A4-landscape, A4-bleed, A5-bleed.
    #[arg(long, default_value = "A4")]
    size: String,

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

    let size = PageSize::parse(&cli.size)?;
    let config = ConversionConfig::document(&cli.input, &cli.output, size)
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
