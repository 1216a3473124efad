//! # prepress
//!
//! Render HTML documents and reveal.js slide decks to print-ready PDF.
//!
//! ## Why this crate?
//!
//! Browsers are the best HTML layout engines available, and headless Chrome
//! will happily print a page to PDF — but the result is not what a print
//! shop wants. Browser PDFs carry transparency groups, subset-embedded
//! fonts, and a modern PDF version that older RIPs reject or mangle. This
//! crate drives the browser for layout, then hands the result to
//! Ghostscript for the unglamorous prepress work: flattening transparency
//! down to PDF 1.3, outlining every glyph, and keeping images at full
//! resolution.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML / slide deck
//!  │
//!  ├─ 1. Input        resolve the file, build its file:// URL
//!  ├─ 2. Render       headless Chrome → raw PDF at exact physical size
//!  └─ 3. Post-process gs: PDF → PostScript → PDF 1.3 (outlined, flattened)
//!                     └─ on stage failure: fall back to the raw PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prepress::{convert, ConversionConfig, PageSize};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::document("flyer.html", "flyer.pdf", PageSize::A4Bleed)
//!         .build()?;
//!     let summary = convert(&config).await?;
//!     eprintln!("wrote {} in {}ms", summary.output.display(), summary.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html_to_pdf` and `slides_to_pdf` binaries (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! prepress = { version = "0.3", default-features = false }
//! ```
//!
//! ## External requirements
//!
//! A Chrome or Chromium binary must be installed for the render stage, and
//! Ghostscript (`gs`) for the post-process stage. Post-processing can be
//! disabled per run, in which case the raw browser PDF is delivered.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, RenderMode};
pub use convert::{convert, convert_sync};
pub use error::PrepressError;
pub use geometry::{PageGeometry, PageSize, SlideSize, Viewport, BLEED_MM};
pub use output::ConversionSummary;
pub use pipeline::postprocess::{Ghostscript, PostScriptEngine};
pub use pipeline::render::{FrameworkReadiness, PdfSnapshotter, SnapshotRequest};
