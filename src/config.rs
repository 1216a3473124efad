//! Configuration for a single HTML-to-PDF conversion.
//!
//! Every knob lives in [`ConversionConfig`], built through its validating
//! builder. Keeping the whole run description in one struct makes it cheap
//! to log, to share with spawned tasks, and to diff two runs when their
//! outputs differ.
//!
//! The two capability fields (`snapshotter`, `engine`) default to the real
//! browser and the system Ghostscript; tests inject fakes there so the full
//! orchestration path runs without either external program.

use crate::error::PrepressError;
use crate::geometry::{PageGeometry, PageSize, SlideSize, Viewport};
use crate::pipeline::postprocess::PostScriptEngine;
use crate::pipeline::render::PdfSnapshotter;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which of the two structurally identical pipelines is running.
///
/// The mode decides three things: whether the URL carries the print-mode
/// query, whether the framework readiness probe runs, and the default
/// settle delay before capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// An arbitrary HTML document (flyer, poster, report).
    Document,
    /// A reveal.js slide deck, loaded in print mode.
    SlideDeck,
}

impl RenderMode {
    /// Default post-readiness settle delay. Slide decks get longer because
    /// the framework animates its print-layout transition.
    fn default_settle_delay_ms(self) -> u64 {
        match self {
            RenderMode::Document => 1_000,
            RenderMode::SlideDeck => 2_000,
        }
    }
}

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::document`] or [`ConversionConfig::slides`].
///
/// # Example
/// ```rust,no_run
/// use prepress::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::document("flyer.html", "flyer.pdf", PageSize::A4Bleed)
///     .postprocess(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Source HTML document.
    pub input: PathBuf,

    /// Final PDF destination. Parent directories are created on demand.
    pub output: PathBuf,

    /// Document or slide-deck pipeline.
    pub mode: RenderMode,

    /// Physical size of the emitted page, stacking already applied.
    pub geometry: PageGeometry,

    /// Browser window size while rendering.
    pub viewport: Viewport,

    /// Run the two-pass Ghostscript normalisation. Default: true.
    ///
    /// When enabled, a missing `gs` binary aborts the run before the browser
    /// launches; a present-but-failing `gs` falls back to the raw browser
    /// PDF and the run still succeeds.
    pub postprocess: bool,

    /// Deadline for navigation and in-page readiness waits. Default: 30.
    ///
    /// Local files load in milliseconds; the budget exists for documents
    /// pulling webfonts or scripts from the network. Expiry is fatal.
    pub nav_timeout_secs: u64,

    /// Poll interval for the slide-framework readiness signal. Default: 200.
    pub framework_poll_interval_ms: u64,

    /// Deadline for the framework readiness signal. Default: 15.
    ///
    /// Expiry only warns: a deck that never exposes the framework global
    /// (static export, different framework version) still captures fine in
    /// most cases, and aborting would make the tool useless on those files.
    pub framework_timeout_secs: u64,

    /// Fixed delay between the last readiness signal and capture.
    /// Default: 1000 for documents, 2000 for slide decks.
    pub settle_delay_ms: u64,

    /// Override the render stage. Default: one headless Chrome per run.
    pub snapshotter: Option<Arc<dyn PdfSnapshotter>>,

    /// Override the post-process engine. Default: the system `gs`.
    pub engine: Option<Arc<dyn PostScriptEngine>>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("mode", &self.mode)
            .field("geometry", &self.geometry)
            .field("viewport", &self.viewport)
            .field("postprocess", &self.postprocess)
            .field("nav_timeout_secs", &self.nav_timeout_secs)
            .field("framework_timeout_secs", &self.framework_timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("snapshotter", &self.snapshotter.as_ref().map(|_| "<dyn PdfSnapshotter>"))
            .field("engine", &self.engine.as_ref().map(|_| "<dyn PostScriptEngine>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Start a document-pipeline configuration.
    pub fn document(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        size: PageSize,
    ) -> ConversionConfigBuilder {
        let geometry = size.geometry();
        ConversionConfigBuilder::new(
            input.as_ref(),
            output.as_ref(),
            RenderMode::Document,
            geometry,
            geometry.viewport(),
        )
    }

    /// Start a slide-deck-pipeline configuration.
    pub fn slides(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        size: SlideSize,
    ) -> ConversionConfigBuilder {
        ConversionConfigBuilder::new(
            input.as_ref(),
            output.as_ref(),
            RenderMode::SlideDeck,
            size.geometry(),
            size.viewport(),
        )
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    slides_per_page: u32,
}

impl ConversionConfigBuilder {
    fn new(
        input: &Path,
        output: &Path,
        mode: RenderMode,
        geometry: PageGeometry,
        viewport: Viewport,
    ) -> Self {
        Self {
            config: ConversionConfig {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                mode,
                geometry,
                viewport,
                postprocess: true,
                nav_timeout_secs: 30,
                framework_poll_interval_ms: 200,
                framework_timeout_secs: 15,
                settle_delay_ms: mode.default_settle_delay_ms(),
                snapshotter: None,
                engine: None,
            },
            slides_per_page: 1,
        }
    }

    /// Enable or disable the Ghostscript normalisation pass.
    pub fn postprocess(mut self, enabled: bool) -> Self {
        self.config.postprocess = enabled;
        self
    }

    /// Stack this many slides onto each physical page (slide decks only).
    pub fn slides_per_page(mut self, count: u32) -> Self {
        self.slides_per_page = count;
        self
    }

    pub fn nav_timeout_secs(mut self, secs: u64) -> Self {
        self.config.nav_timeout_secs = secs;
        self
    }

    pub fn framework_timeout_secs(mut self, secs: u64) -> Self {
        self.config.framework_timeout_secs = secs;
        self
    }

    pub fn framework_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.framework_poll_interval_ms = ms;
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    /// Substitute the render stage (used by tests).
    pub fn snapshotter(mut self, snapshotter: Arc<dyn PdfSnapshotter>) -> Self {
        self.config.snapshotter = Some(snapshotter);
        self
    }

    /// Substitute the post-process engine (used by tests).
    pub fn engine(mut self, engine: Arc<dyn PostScriptEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    /// Build the configuration, validating constraints and applying
    /// slide stacking to the output geometry.
    pub fn build(mut self) -> Result<ConversionConfig, PrepressError> {
        if self.slides_per_page == 0 {
            return Err(PrepressError::InvalidConfig(
                "slides-per-page must be a positive integer".into(),
            ));
        }
        if self.config.mode == RenderMode::Document && self.slides_per_page != 1 {
            return Err(PrepressError::InvalidConfig(
                "slides-per-page only applies to slide decks".into(),
            ));
        }
        if self.config.nav_timeout_secs == 0 {
            return Err(PrepressError::InvalidConfig(
                "navigation timeout must be at least 1 second".into(),
            ));
        }

        self.config.geometry = self.config.geometry.stacked(self.slides_per_page);
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_defaults() {
        let c = ConversionConfig::document("in.html", "out.pdf", PageSize::A4)
            .build()
            .unwrap();
        assert_eq!(c.mode, RenderMode::Document);
        assert!(c.postprocess);
        assert_eq!(c.nav_timeout_secs, 30);
        assert_eq!(c.settle_delay_ms, 1_000);
        assert_eq!(c.viewport, PageSize::A4.geometry().viewport());
    }

    #[test]
    fn slide_defaults_and_stacking() {
        let c = ConversionConfig::slides("deck.html", "deck.pdf", SlideSize::Standard)
            .slides_per_page(2)
            .build()
            .unwrap();
        assert_eq!(c.mode, RenderMode::SlideDeck);
        assert_eq!(c.settle_delay_ms, 2_000);
        assert_eq!(c.viewport, SlideSize::Standard.viewport());

        let single = SlideSize::Standard.geometry();
        assert_eq!(c.geometry.width_mm, single.width_mm);
        assert_eq!(c.geometry.height_mm, single.height_mm * 2.0);
    }

    #[test]
    fn zero_slides_per_page_is_rejected() {
        let err = ConversionConfig::slides("d.html", "d.pdf", SlideSize::Widescreen)
            .slides_per_page(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PrepressError::InvalidConfig(_)));
    }

    #[test]
    fn stacking_a_document_is_rejected() {
        let err = ConversionConfig::document("in.html", "out.pdf", PageSize::A4)
            .slides_per_page(3)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("slide decks"));
    }
}
