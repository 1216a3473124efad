//! Error types for the prepress library.
//!
//! The taxonomy mirrors how failures are handled, not where they occur:
//!
//! * Input/config/render errors are **fatal** — the run aborts and no output
//!   file is produced. A wrong PDF is worse than no PDF.
//!
//! * Post-process stage errors ([`PrepressError::PostProcessFailed`]) are
//!   **recoverable** — the orchestrator logs them and falls back to the raw
//!   browser-rendered PDF, so the caller still gets a usable file. They only
//!   surface as `Err` to code between the stage and the fallback handler.
//!
//! * A missing Ghostscript with post-processing requested is deliberately NOT
//!   a stage error: the user asked for print normalisation and silently
//!   skipping it would ship an unprintable file. It fails fast, before the
//!   browser is even launched, with installation guidance in the message.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the prepress library.
#[derive(Debug, Error)]
pub enum PrepressError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the input file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Geometry errors ───────────────────────────────────────────────────
    /// The size token did not match any known preset.
    #[error("Unknown size '{token}'. Supported sizes: {valid}")]
    UnknownSize { token: String, valid: &'static str },

    // ── Render errors ─────────────────────────────────────────────────────
    /// Headless Chrome could not be located or launched.
    #[error(
        "Failed to launch headless Chrome: {detail}\n\
         A Chrome or Chromium binary must be installed and discoverable.\n\
         Ubuntu/Debian: sudo apt install chromium-browser"
    )]
    BrowserLaunch { detail: String },

    /// Navigating to the document failed or did not settle within the timeout.
    #[error("Failed to load '{url}': {detail}")]
    Navigation { url: String, detail: String },

    /// The browser rendered the page but PDF capture failed.
    #[error("PDF capture failed: {detail}")]
    Snapshot { detail: String },

    // ── Post-process errors ───────────────────────────────────────────────
    /// Ghostscript is not on the PATH but post-processing was requested.
    ///
    /// Distinct from [`PrepressError::PostProcessFailed`]: a present-but-failing
    /// tool degrades gracefully, a missing tool aborts the run.
    #[error(
        "Ghostscript not found.\n\
         Ghostscript is required for printer-compatible PDF output.\n\n\
         Install with:\n\
         \x20 Ubuntu/Debian: sudo apt install ghostscript\n\
         \x20 macOS: brew install ghostscript\n\
         \x20 Windows: https://ghostscript.com/releases/gsdnld.html\n\n\
         Or pass --no-gs to skip post-processing (not recommended for printing)."
    )]
    GhostscriptMissing,

    /// One of the two Ghostscript passes exited non-zero.
    ///
    /// Recovered by the orchestrator: the raw browser PDF is delivered instead.
    #[error("Ghostscript {stage} failed: {detail}")]
    PostProcessFailed { stage: &'static str, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the final output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_size_lists_valid_tokens() {
        let e = PrepressError::UnknownSize {
            token: "A7".into(),
            valid: "A4, A5, B5",
        };
        let msg = e.to_string();
        assert!(msg.contains("A7"), "got: {msg}");
        assert!(msg.contains("A4, A5, B5"), "got: {msg}");
    }

    #[test]
    fn ghostscript_missing_carries_install_hint() {
        let msg = PrepressError::GhostscriptMissing.to_string();
        assert!(msg.contains("apt install ghostscript"));
        assert!(msg.contains("--no-gs"));
    }

    #[test]
    fn stage_failure_names_the_stage() {
        let e = PrepressError::PostProcessFailed {
            stage: "stage 1 (PDF to PostScript)",
            detail: "ioerror".into(),
        };
        assert!(e.to_string().contains("stage 1"));
        assert!(e.to_string().contains("ioerror"));
    }
}
