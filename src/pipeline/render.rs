//! Browser snapshot: render a local HTML document to a raw PDF.
//!
//! ## Why spawn_blocking?
//!
//! The `headless_chrome` crate drives Chrome over a synchronous DevTools
//! connection; every call blocks the current thread on a websocket round
//! trip. The orchestrator therefore runs the whole snapshot inside
//! `tokio::task::spawn_blocking` so the async executor's worker threads are
//! never stalled behind a page load.
//!
//! ## Readiness signals
//!
//! A page is capture-ready only when three independent signals agree:
//! navigation has settled (bounded by a fatal 30 s timeout), web fonts have
//! finished loading (`document.fonts.ready`), and — for slide decks — the
//! slide framework reports itself initialised. The framework signal is
//! polled under a deadline and a timeout there is a warning, not an error:
//! a deck without the framework global still renders something usable.
//! A final fixed settle delay absorbs CSS transitions none of the three
//! signals can observe.

use crate::error::PrepressError;
use crate::geometry::{PageGeometry, Viewport, DEVICE_SCALE_FACTOR};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything the render stage needs to produce one PDF snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotRequest {
    /// Fully resolved `file://` URL, including any print-mode query.
    pub url: String,
    /// Browser window size in CSS pixels.
    pub viewport: Viewport,
    /// Physical page size of the emitted PDF.
    pub geometry: PageGeometry,
    /// Deadline for navigation and in-page waits. Expiry is fatal.
    pub nav_timeout: Duration,
    /// Whether to poll for the slide-framework readiness signal.
    pub framework_probe: bool,
    /// Poll interval for the framework signal.
    pub framework_poll_interval: Duration,
    /// Deadline for the framework signal. Expiry is a warning, not an error.
    pub framework_timeout: Duration,
    /// Fixed delay after all readiness signals, before capture.
    pub settle_delay: Duration,
    /// Where the raw PDF bytes are written.
    pub raw_output: PathBuf,
}

/// Outcome of the bounded framework-readiness poll.
///
/// Evaluation failures (the page is gone, the tab crashed) are a separate,
/// fatal `Err` path; this enum only distinguishes the two survivable states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkReadiness {
    /// The framework reported itself initialised within the deadline.
    Ready,
    /// The deadline passed without a signal; capture proceeds anyway.
    TimedOut,
}

/// Capability interface for producing a PDF snapshot of a document.
///
/// The orchestrator depends on this trait, not on Chrome, so the whole
/// pipeline is testable with an in-process fake.
pub trait PdfSnapshotter: Send + Sync {
    /// Render the document and write the raw PDF to `request.raw_output`.
    fn snapshot(&self, request: &SnapshotRequest) -> Result<(), PrepressError>;
}

/// The real snapshotter: one isolated headless Chrome per run.
///
/// The browser process is owned by a local [`Browser`] value, so Chrome is
/// terminated when it drops — on success, on error, and on panic alike.
pub struct ChromeSnapshotter;

impl PdfSnapshotter for ChromeSnapshotter {
    fn snapshot(&self, request: &SnapshotRequest) -> Result<(), PrepressError> {
        // OS sandboxing is switched off: the target is a local file the user
        // already owns, and container/CI deployments routinely lack the
        // kernel facilities Chrome's sandbox needs.
        let scale_flag = format!("--force-device-scale-factor={DEVICE_SCALE_FACTOR}");
        let launch = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((request.viewport.width, request.viewport.height)))
            .args(vec![OsStr::new(scale_flag.as_str())])
            .idle_browser_timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PrepressError::BrowserLaunch {
                detail: e.to_string(),
            })?;

        let browser = Browser::new(launch).map_err(|e| PrepressError::BrowserLaunch {
            detail: e.to_string(),
        })?;

        let tab = browser.new_tab().map_err(|e| PrepressError::BrowserLaunch {
            detail: e.to_string(),
        })?;
        tab.set_default_timeout(request.nav_timeout);

        info!("Loading: {}", request.url);
        tab.navigate_to(&request.url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| PrepressError::Navigation {
                url: request.url.clone(),
                detail: e.to_string(),
            })?;

        // Fonts load asynchronously after the document itself; capturing
        // before this resolves bakes fallback glyphs into the PDF.
        tab.evaluate("document.fonts.ready", true)
            .map_err(|e| PrepressError::Navigation {
                url: request.url.clone(),
                detail: format!("waiting for fonts: {e}"),
            })?;
        debug!("Fonts ready");

        if request.framework_probe {
            match wait_for_framework(
                &tab,
                request.framework_poll_interval,
                request.framework_timeout,
            )? {
                FrameworkReadiness::Ready => debug!("Slide framework ready"),
                FrameworkReadiness::TimedOut => warn!(
                    "Slide framework did not signal readiness within {:?}; proceeding anyway",
                    request.framework_timeout
                ),
            }
        }

        std::thread::sleep(request.settle_delay);

        let pdf = tab
            .print_to_pdf(Some(print_options(request.geometry)))
            .map_err(|e| PrepressError::Snapshot {
                detail: e.to_string(),
            })?;

        std::fs::write(&request.raw_output, pdf).map_err(|e| PrepressError::OutputWriteFailed {
            path: request.raw_output.clone(),
            source: e,
        })?;

        debug!("Raw PDF written: {}", request.raw_output.display());
        Ok(())
    }
}

/// Expression evaluated in the page to detect reveal.js initialisation.
const FRAMEWORK_READY_JS: &str =
    "typeof Reveal !== 'undefined' && typeof Reveal.isReady === 'function' && Reveal.isReady()";

/// Poll the framework-readiness expression under a deadline.
///
/// Bounded retry loop with a tri-state outcome: `Ok(Ready)`,
/// `Ok(TimedOut)` (survivable), or `Err` when evaluation itself fails.
fn wait_for_framework(
    tab: &Tab,
    interval: Duration,
    timeout: Duration,
) -> Result<FrameworkReadiness, PrepressError> {
    let deadline = Instant::now() + timeout;
    loop {
        let ready = tab
            .evaluate(FRAMEWORK_READY_JS, false)
            .map_err(|e| PrepressError::Snapshot {
                detail: format!("framework readiness probe: {e}"),
            })?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if ready {
            return Ok(FrameworkReadiness::Ready);
        }
        if Instant::now() >= deadline {
            return Ok(FrameworkReadiness::TimedOut);
        }
        std::thread::sleep(interval);
    }
}

/// Capture options for a borderless page at exact physical dimensions.
///
/// The protocol wants inches; presets are kept in millimetres and converted
/// here, at the boundary. `prefer_css_page_size` lets a document's own
/// `@page` rule win over the preset when it declares one.
fn print_options(geometry: PageGeometry) -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        paper_width: Some(geometry.width_in()),
        paper_height: Some(geometry.height_in()),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        ..Default::default()
    }
}
