//! Page geometry: size presets, bleed, slide stacking, and viewport math.
//!
//! ## Why millimetres?
//!
//! Print shops think in millimetres, CSS `@page` rules are written in
//! millimetres, and the Chrome DevTools protocol wants inches. Keeping every
//! preset in mm and converting at the protocol boundary means the numbers in
//! this file match the numbers on the printer's spec sheet.
//!
//! ## Bleed
//!
//! Commercial trimming is only accurate to a couple of millimetres, so
//! artwork that runs to the page edge must extend past it. The bleed presets
//! add a fixed 3 mm on every side; the trim happens at the printer.

use crate::error::PrepressError;

/// Bleed margin added to each side of a page, in millimetres.
pub const BLEED_MM: f64 = 3.0;

/// Device scale factor used for rendering. 2× sharpens rasterised content
/// (shadows, canvas, images) in the emitted PDF.
pub const DEVICE_SCALE_FACTOR: u32 = 2;

const CSS_DPI: f64 = 96.0;
const MM_PER_INCH: f64 = 25.4;

/// A physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageGeometry {
    /// Grow the page by [`BLEED_MM`] on every side.
    pub fn with_bleed(self) -> Self {
        Self {
            width_mm: self.width_mm + 2.0 * BLEED_MM,
            height_mm: self.height_mm + 2.0 * BLEED_MM,
        }
    }

    /// Stack `count` copies of this page vertically: height multiplies,
    /// width is unchanged. Used for slides-per-page layouts.
    pub fn stacked(self, count: u32) -> Self {
        Self {
            width_mm: self.width_mm,
            height_mm: self.height_mm * f64::from(count),
        }
    }

    /// Width in inches, as the PDF capture protocol expects.
    pub fn width_in(self) -> f64 {
        self.width_mm / MM_PER_INCH
    }

    /// Height in inches, as the PDF capture protocol expects.
    pub fn height_in(self) -> f64 {
        self.height_mm / MM_PER_INCH
    }

    /// The CSS-pixel viewport matching this page at 96 DPI.
    pub fn viewport(self) -> Viewport {
        Viewport {
            width: (self.width_mm * CSS_DPI / MM_PER_INCH).round() as u32,
            height: (self.height_mm * CSS_DPI / MM_PER_INCH).round() as u32,
        }
    }
}

/// A rendering viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

// ── Document presets ─────────────────────────────────────────────────────

/// Named page sizes for the document pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A4,
    A5,
    B5,
    A4Landscape,
    /// A4 plus 3 mm bleed per side.
    A4Bleed,
    /// A5 plus 3 mm bleed per side.
    A5Bleed,
}

impl PageSize {
    /// The valid tokens, for error messages and help text.
    pub const TOKENS: &'static str = "A4, A5, B5, A4-landscape, A4-bleed, A5-bleed";

    /// Parse a user-supplied size token (case-insensitive).
    ///
    /// Unknown tokens are a hard error in both pipelines; there is no silent
    /// default substitution.
    pub fn parse(token: &str) -> Result<Self, PrepressError> {
        let t = token.trim();
        let is = |name: &str| t.eq_ignore_ascii_case(name);
        if is("A4") {
            Ok(PageSize::A4)
        } else if is("A5") {
            Ok(PageSize::A5)
        } else if is("B5") {
            Ok(PageSize::B5)
        } else if is("A4-landscape") {
            Ok(PageSize::A4Landscape)
        } else if is("A4-bleed") {
            Ok(PageSize::A4Bleed)
        } else if is("A5-bleed") {
            Ok(PageSize::A5Bleed)
        } else {
            Err(PrepressError::UnknownSize {
                token: token.to_string(),
                valid: Self::TOKENS,
            })
        }
    }

    /// Physical dimensions of this preset.
    pub fn geometry(self) -> PageGeometry {
        let base = |w: f64, h: f64| PageGeometry {
            width_mm: w,
            height_mm: h,
        };
        match self {
            PageSize::A4 => base(210.0, 297.0),
            PageSize::A5 => base(148.0, 210.0),
            PageSize::B5 => base(182.0, 257.0),
            PageSize::A4Landscape => base(297.0, 210.0),
            PageSize::A4Bleed => PageSize::A4.geometry().with_bleed(),
            PageSize::A5Bleed => PageSize::A5.geometry().with_bleed(),
        }
    }

    /// The canonical token for this preset.
    pub fn token(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::B5 => "B5",
            PageSize::A4Landscape => "A4-landscape",
            PageSize::A4Bleed => "A4-bleed",
            PageSize::A5Bleed => "A5-bleed",
        }
    }
}

// ── Slide presets ────────────────────────────────────────────────────────

/// Aspect-ratio presets for the slide pipeline.
///
/// Physical sizes follow the standard presentation page: 10 inches wide,
/// 5.625 or 7.5 inches tall. The rendering viewport is a fixed screen
/// resolution rather than a 96-DPI conversion because slide frameworks lay
/// out against the window, not against a printed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideSize {
    /// 16:9 widescreen, 254 × 142.9 mm, rendered at 1920 × 1080.
    Widescreen,
    /// 4:3 standard, 254 × 190.5 mm, rendered at 1920 × 1440.
    Standard,
}

impl SlideSize {
    /// The valid tokens, for error messages and help text.
    pub const TOKENS: &'static str = "16:9, 4:3";

    /// Parse a user-supplied aspect token. Unknown tokens are a hard error.
    pub fn parse(token: &str) -> Result<Self, PrepressError> {
        match token.trim() {
            "16:9" => Ok(SlideSize::Widescreen),
            "4:3" => Ok(SlideSize::Standard),
            _ => Err(PrepressError::UnknownSize {
                token: token.to_string(),
                valid: Self::TOKENS,
            }),
        }
    }

    /// Physical dimensions of a single slide.
    pub fn geometry(self) -> PageGeometry {
        match self {
            SlideSize::Widescreen => PageGeometry {
                width_mm: 254.0,
                height_mm: 142.9,
            },
            SlideSize::Standard => PageGeometry {
                width_mm: 254.0,
                height_mm: 190.5,
            },
        }
    }

    /// Fixed rendering viewport for this aspect ratio.
    pub fn viewport(self) -> Viewport {
        match self {
            SlideSize::Widescreen => Viewport {
                width: 1920,
                height: 1080,
            },
            SlideSize::Standard => Viewport {
                width: 1920,
                height: 1440,
            },
        }
    }

    /// The canonical token for this preset.
    pub fn token(self) -> &'static str {
        match self {
            SlideSize::Widescreen => "16:9",
            SlideSize::Standard => "4:3",
        }
    }
}
