//! Result type returned by a conversion run.

use std::path::PathBuf;

/// What a completed run produced, and how.
///
/// A run can succeed three ways: fully normalised output, raw browser
/// output because post-processing was disabled, or raw browser output
/// because a Ghostscript pass failed (`fallback`). Callers that must have
/// print-normalised output should check `postprocessed` rather than
/// relying on the exit status alone.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Where the final PDF was written.
    pub output: PathBuf,

    /// True when both Ghostscript passes succeeded.
    pub postprocessed: bool,

    /// True when a Ghostscript pass failed and the raw browser PDF was
    /// delivered instead.
    pub fallback: bool,

    /// Wall-clock time spent in the browser render stage.
    pub render_duration_ms: u64,

    /// Wall-clock time spent in the Ghostscript passes (0 when skipped).
    pub postprocess_duration_ms: u64,

    /// Total wall-clock time for the run.
    pub total_duration_ms: u64,
}
