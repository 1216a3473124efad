//! Pipeline stages for HTML-to-print-PDF conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets the
//! orchestrator swap implementations (a fake browser, a fake Ghostscript)
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ postprocess
//! (path/URL) (Chrome)   (gs ×2, with fallback)
//! ```
//!
//! 1. [`input`]  — validate the source file and build its `file://` URL
//! 2. [`render`] — drive headless Chrome to a raw PDF snapshot; runs in
//!    `spawn_blocking` because the DevTools connection is synchronous
//! 3. [`postprocess`] — two Ghostscript passes producing a PDF 1.3 with
//!    outlined fonts and flattened transparency

pub mod input;
pub mod postprocess;
pub mod render;
