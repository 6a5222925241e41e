//! Font metrics interface.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use serde::{Deserialize, Serialize};

use crate::style::InlineStyle;

/// Vertical metrics of the first available font of a style.
///
/// Offsets are measured from the baseline. Positive values point down for
/// the underline and up for the strikeout, matching how fonts declare them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Distance from the baseline down to the underline.
    pub underline_offset: f32,
    /// Stroke thickness of the underline.
    pub underline_thickness: f32,
    /// Distance from the baseline up to the strikeout line.
    pub strikeout_offset: f32,
    /// Stroke thickness of the strikeout line.
    pub strikeout_thickness: f32,
}

/// Font metrics source for text measurement during layout.
///
/// Implementors back this with real font data. The inline engine asks for
/// vertical metrics when computing box heights and decorations, and for
/// advance widths when a dynamic text value changes.
pub trait FontMetricsProvider {
    /// Vertical metrics for the font selected by `style`.
    fn metrics(&self, style: &InlineStyle) -> FontMetrics;

    /// Measure the total advance width of `text` in the font selected by
    /// `style`.
    fn text_width(&self, text: &str, style: &InlineStyle) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// Without access to font data we use fixed-ratio approximations: the
/// average advance of Latin glyphs in a proportional font is about 0.6× the
/// font size, and the ascent/descent split of the em square is about 80/20.
///
/// This is used as a fallback when no font is available, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const ASCENT_RATIO: f32 = 0.8;
    const DESCENT_RATIO: f32 = 0.2;
}

impl FontMetricsProvider for ApproximateFontMetrics {
    fn metrics(&self, style: &InlineStyle) -> FontMetrics {
        let size = style.font_size;
        let thickness = (size / 16.0).max(1.0);
        FontMetrics {
            ascent: size * Self::ASCENT_RATIO,
            descent: size * Self::DESCENT_RATIO,
            underline_offset: size * 0.1,
            underline_thickness: thickness,
            strikeout_offset: size * 0.3,
            strikeout_thickness: thickness,
        }
    }

    fn text_width(&self, text: &str, style: &InlineStyle) -> f32 {
        text.chars().count() as f32 * style.font_size * Self::CHAR_WIDTH_RATIO
    }
}
