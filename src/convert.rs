//! Top-level orchestration: input resolution, render, post-process, promote.
//!
//! Control flows strictly forward; the only branch is the post-process
//! fallback. Both heavy stages (the synchronous browser session and the
//! Ghostscript subprocesses) run under `spawn_blocking` so the surrounding
//! async context stays responsive.
//!
//! ## Failure policy
//!
//! Input, configuration, and render failures abort the run with no output
//! file: delivering a wrong PDF to a print shop is the worst outcome this
//! tool can produce. A failing Ghostscript pass, by contrast, degrades to
//! the raw browser PDF — still a correct document, just without the print
//! normalisation — and the run reports success.

use crate::config::{ConversionConfig, RenderMode};
use crate::error::PrepressError;
use crate::output::ConversionSummary;
use crate::pipeline::input;
use crate::pipeline::postprocess::{self, Ghostscript, PostScriptEngine};
use crate::pipeline::render::{ChromeSnapshotter, PdfSnapshotter, SnapshotRequest};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Convert one HTML document or slide deck to a print-ready PDF.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Fatal only: missing input, missing Ghostscript while post-processing is
/// requested, browser launch/navigation/capture failures, or an unwritable
/// output path. A Ghostscript pass that starts and fails is NOT fatal — the
/// raw browser PDF is delivered and `summary.fallback` is set.
pub async fn convert(config: &ConversionConfig) -> Result<ConversionSummary, PrepressError> {
    let total_start = Instant::now();
    info!(
        "Starting conversion: {} → {} ({:.1}mm × {:.1}mm)",
        config.input.display(),
        config.output.display(),
        config.geometry.width_mm,
        config.geometry.height_mm,
    );

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let absolute = input::resolve_input(&config.input)?;
    let url = input::file_url(&absolute, config.mode)?;

    // ── Step 2: Probe the hard external requirement ──────────────────────
    // Checked before the browser launches: if the user asked for print
    // normalisation and the tool is absent, failing fast beats discovering
    // it after a multi-second render.
    let engine: Arc<dyn PostScriptEngine> = config
        .engine
        .clone()
        .unwrap_or_else(|| Arc::new(Ghostscript));
    if config.postprocess && !engine.is_available() {
        return Err(PrepressError::GhostscriptMissing);
    }

    // ── Step 3: Per-run temp workspace ───────────────────────────────────
    // Randomised directory name; concurrent invocations cannot collide.
    // The guard deletes everything on every exit path, including panics.
    let workdir = TempDir::new()
        .map_err(|e| PrepressError::Internal(format!("temp workspace: {e}")))?;
    let raw_pdf = workdir.path().join("render.pdf");

    // ── Step 4: Render ───────────────────────────────────────────────────
    let snapshotter: Arc<dyn PdfSnapshotter> = config
        .snapshotter
        .clone()
        .unwrap_or_else(|| Arc::new(ChromeSnapshotter));
    let request = SnapshotRequest {
        url,
        viewport: config.viewport,
        geometry: config.geometry,
        nav_timeout: Duration::from_secs(config.nav_timeout_secs),
        framework_probe: config.mode == RenderMode::SlideDeck,
        framework_poll_interval: Duration::from_millis(config.framework_poll_interval_ms),
        framework_timeout: Duration::from_secs(config.framework_timeout_secs),
        settle_delay: Duration::from_millis(config.settle_delay_ms),
        raw_output: raw_pdf.clone(),
    };

    let render_start = Instant::now();
    tokio::task::spawn_blocking(move || snapshotter.snapshot(&request))
        .await
        .map_err(|e| PrepressError::Internal(format!("render task panicked: {e}")))??;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Browser render complete in {render_duration_ms}ms");

    // ── Step 5: Post-process or promote ──────────────────────────────────
    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PrepressError::OutputWriteFailed {
                path: config.output.to_path_buf(),
                source: e,
            })?;
    }

    let mut postprocessed = false;
    let mut fallback = false;
    let mut postprocess_duration_ms = 0;

    if config.postprocess {
        let pp_start = Instant::now();
        let engine = Arc::clone(&engine);
        let raw = raw_pdf.clone();
        let out = config.output.clone();
        let result = tokio::task::spawn_blocking(move || {
            postprocess::normalize(engine.as_ref(), &raw, &out)
        })
        .await
        .map_err(|e| PrepressError::Internal(format!("post-process task panicked: {e}")))?;
        postprocess_duration_ms = pp_start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => postprocessed = true,
            Err(e) => {
                warn!("{e}");
                warn!("Falling back to the browser-rendered PDF");
                promote(&raw_pdf, &config.output).await?;
                fallback = true;
            }
        }
    } else {
        debug!("Post-processing disabled; delivering the browser PDF as-is");
        promote(&raw_pdf, &config.output).await?;
    }

    let summary = ConversionSummary {
        output: config.output.clone(),
        postprocessed,
        fallback,
        render_duration_ms,
        postprocess_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "PDF generated: {} ({}ms total)",
        summary.output.display(),
        summary.total_duration_ms
    );
    Ok(summary)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionSummary, PrepressError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PrepressError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(config))
}

/// Move the raw PDF into its final location.
///
/// Rename is atomic but cannot cross filesystems, and the temp workspace
/// frequently lives on one of its own; fall back to copy-and-delete.
async fn promote(raw: &Path, output: &Path) -> Result<(), PrepressError> {
    if tokio::fs::rename(raw, output).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(raw, output)
        .await
        .map_err(|e| PrepressError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        })?;
    let _ = tokio::fs::remove_file(raw).await;
    Ok(())
}
