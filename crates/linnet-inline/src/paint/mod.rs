//! Inline painting
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! This module turns a finished inline subtree into drawing calls on an
//! [`OutputDevice`]. Calls are grouped into structural regions so that a
//! tagged output format (accessible PDF, for instance) can tell backgrounds,
//! text and nested boxes apart.
//!
//! # Architecture
//!
//! ```text
//! Layout → Justify → Locate → Paint → OutputDevice
//!                                 ↓
//!                            DisplayList (recording device)
//! ```
//!
//! Each visible inline box is painted in three bracketed passes:
//! 1. Background region: background, owned borders, debug outline,
//!    underline and overline
//! 2. One text region per text run, one empty child-box region per nested
//!    box
//! 3. Background region: line-through

mod display_list;
mod painter;

pub use display_list::{DisplayCommand, DisplayList};
pub use painter::RenderingContext;

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::geometry::{Point, Rect};
use crate::inline_box::TextDecoration;
use crate::style::{Color, InlineStyle};
use crate::text::TextRun;
use crate::tree::BoxId;

/// Kind of a structural region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RegionKind {
    /// Backgrounds, borders and decorations of a box.
    Background,
    /// Glyphs of one text run.
    Text,
    /// Placeholder for a box nested in an inline box.
    InlineChildBox,
}

/// Handle returned by [`OutputDevice::begin_region`], passed back to
/// [`OutputDevice::end_region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegionToken(pub u32);

/// Sink for drawing calls.
///
/// Regions are strictly nested: every `begin_region` is closed by an
/// `end_region` with its token before any enclosing region is closed.
pub trait OutputDevice {
    /// Open a region of `kind` for box `subject`.
    fn begin_region(&mut self, kind: RegionKind, subject: BoxId) -> RegionToken;

    /// Close the region opened with `token`.
    fn end_region(&mut self, token: RegionToken);

    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `run` with its baseline origin at `origin`.
    fn draw_text(&mut self, subject: BoxId, origin: Point, run: &TextRun, style: &InlineStyle);

    /// Draw a decoration line covering `area`.
    fn draw_text_decoration(
        &mut self,
        subject: BoxId,
        decoration: &TextDecoration,
        area: Rect,
        color: Color,
    );

    /// Outline `rect` for debugging.
    fn draw_debug_outline(&mut self, subject: BoxId, rect: Rect, color: Color);

    /// Draw the content of a replaced box into `rect`.
    fn draw_replaced(&mut self, subject: BoxId, rect: Rect);
}
