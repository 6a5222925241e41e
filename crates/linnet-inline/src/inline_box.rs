//! Inline box fragments and their edge geometry.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
//!
//! "An inline box is one that is both inline-level and whose contents
//! participate in its containing inline formatting context."
//!
//! An element that is split across lines produces one [`InlineBox`] per
//! line, each one a fragment of the same element.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "When an inline box is split, margins, borders, and padding have no
//! visual effect where the split occurs"
//!
//! So the left outer edge belongs to the fragment that starts the element
//! and the right outer edge to the one that ends it. Every rectangle in this
//! module honors that ownership rule.

use serde::Serialize;

use crate::font::FontMetrics;
use crate::geometry::{EdgeSizes, Rect};
use crate::location::PaintingInfo;
use crate::style::{DecorationLine, InlineStyle, LengthPercentage};
use crate::text::TextRun;
use crate::tree::{BoxId, ElementRef};

/// One child of an inline box, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineChild {
    /// A nested inline box fragment.
    Inline(BoxId),
    /// A run of text.
    Text(TextRun),
    /// An opaque replaced box.
    Replaced(BoxId),
}

impl InlineChild {
    /// The child's box handle, `None` for text.
    #[must_use]
    pub const fn box_id(&self) -> Option<BoxId> {
        match self {
            Self::Inline(id) | Self::Replaced(id) => Some(*id),
            Self::Text(_) => None,
        }
    }

    /// The child's text run, `None` for boxes.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextRun> {
        match self {
            Self::Text(run) => Some(run),
            Self::Inline(_) | Self::Replaced(_) => None,
        }
    }
}

/// Content handed to [`BoxTree::append_child`](crate::BoxTree::append_child).
///
/// Whether a box handle becomes an inline or a replaced child is decided by
/// the kind of the box it points to.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    /// An inline or replaced box.
    Box(BoxId),
    /// A text run.
    Text(TextRun),
}

impl From<BoxId> for InlineContent {
    fn from(id: BoxId) -> Self {
        Self::Box(id)
    }
}

impl From<TextRun> for InlineContent {
    fn from(run: TextRun) -> Self {
        Self::Text(run)
    }
}

/// [§ 2 Text Decoration Lines](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
///
/// A decoration line placed relative to the box's content top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextDecoration {
    /// Which line this is.
    pub line: DecorationLine,
    /// Vertical offset of the stroke's top from the content top.
    pub offset: f32,
    /// Stroke thickness.
    pub thickness: f32,
}

/// Which border sides a fragment draws.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting):
/// no border where the split occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BorderSides {
    /// Top border, always drawn.
    pub top: bool,
    /// Right border, drawn by the fragment that ends the element.
    pub right: bool,
    /// Bottom border, always drawn.
    pub bottom: bool,
    /// Left border, drawn by the fragment that starts the element.
    pub left: bool,
}

/// One fragment of an inline element.
#[derive(Debug, Clone)]
pub struct InlineBox {
    element: Option<ElementRef>,
    style: InlineStyle,
    children: Vec<InlineChild>,
    /// This fragment carries the element's left margin, border and padding.
    pub starts_here: bool,
    /// This fragment carries the element's right margin, border and padding.
    pub ends_here: bool,
    pending: bool,
    /// Distance from the content top to the baseline.
    pub baseline: f32,
    /// Border-box height.
    pub height: f32,
    /// Margin-box width on the line.
    pub inline_width: f32,
    /// Width of the containing block when the fragment was created.
    pub containing_block_width: f32,
    text_decorations: Vec<TextDecoration>,
    pub(crate) painting_info: Option<PaintingInfo>,
}

impl InlineBox {
    /// A new pending fragment with no content.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The height of the inline box encloses all glyphs and their
    /// half-leading on each side ... margins, borders, and padding above and
    /// below non-replaced elements do not affect the height of the line box."
    ///
    /// Vertical margins are therefore dropped from the stored style.
    #[must_use]
    pub fn new(
        element: Option<ElementRef>,
        mut style: InlineStyle,
        containing_block_width: f32,
    ) -> Self {
        style.margin.top = LengthPercentage::ZERO;
        style.margin.bottom = LengthPercentage::ZERO;
        Self {
            element,
            style,
            children: Vec::new(),
            starts_here: false,
            ends_here: false,
            pending: true,
            baseline: 0.0,
            height: 0.0,
            inline_width: 0.0,
            containing_block_width,
            text_decorations: Vec::new(),
            painting_info: None,
        }
    }

    /// The source element, `None` for an anonymous fragment.
    #[must_use]
    pub const fn element(&self) -> Option<ElementRef> {
        self.element
    }

    /// Whether the fragment has no source element.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.element.is_none()
    }

    /// The resolved style snapshot.
    #[must_use]
    pub const fn style(&self) -> &InlineStyle {
        &self.style
    }

    /// Replace the style. Call [`InlineBox::calculate_height`] afterwards.
    pub fn set_style(&mut self, mut style: InlineStyle) {
        style.margin.top = LengthPercentage::ZERO;
        style.margin.bottom = LengthPercentage::ZERO;
        self.style = style;
    }

    /// Children in source order.
    #[must_use]
    pub fn children(&self) -> &[InlineChild] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<InlineChild> {
        &mut self.children
    }

    /// Whether the fragment is still provisional.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) const fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Decorations computed by [`InlineBox::calculate_text_decorations`].
    #[must_use]
    pub fn text_decorations(&self) -> &[TextDecoration] {
        &self.text_decorations
    }

    /// Cached aggregate bounds, if computed.
    #[must_use]
    pub const fn painting_info(&self) -> Option<&PaintingInfo> {
        self.painting_info.as_ref()
    }

    /// Margins resolved against the containing block width.
    #[must_use]
    pub fn margin(&self) -> EdgeSizes {
        self.style.margin(self.containing_block_width)
    }

    /// Padding resolved against the containing block width.
    #[must_use]
    pub fn padding(&self) -> EdgeSizes {
        self.style.padding(self.containing_block_width)
    }

    /// Border widths.
    #[must_use]
    pub const fn border(&self) -> EdgeSizes {
        self.style.border
    }

    /// Margins this fragment owns: left only if it starts the element,
    /// right only if it ends it, zero otherwise.
    fn owned(&self, edges: EdgeSizes) -> (f32, f32) {
        let left = if self.starts_here { edges.left } else { 0.0 };
        let right = if self.ends_here { edges.right } else { 0.0 };
        (left, right)
    }

    /// [§ 10.6.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-non-replaced)
    ///
    /// "The height of the content area should be based on the font"
    ///
    /// Border-box height: vertical border and padding around the font's
    /// ascent plus descent, rounded up to whole pixels.
    pub fn calculate_height(&mut self, metrics: &FontMetrics) {
        let border = self.border();
        let padding = self.padding();
        let size = metrics.ascent + metrics.descent;
        self.height =
            (border.top + padding.top + size + padding.bottom + border.bottom).ceil();
    }

    /// [§ 3 Line Positioning](https://www.w3.org/TR/css-text-decor-3/#line-decoration)
    ///
    /// One decoration per line kind in the style: underline below the
    /// baseline, overline at the ascent, line-through above the baseline.
    pub fn calculate_text_decorations(&mut self, metrics: &FontMetrics) {
        self.text_decorations = self
            .style
            .text_decoration_lines
            .iter()
            .map(|&line| {
                let (offset, thickness) = match line {
                    DecorationLine::Underline => (
                        self.baseline + metrics.underline_offset,
                        metrics.underline_thickness,
                    ),
                    DecorationLine::Overline => {
                        (self.baseline - metrics.ascent, metrics.underline_thickness)
                    }
                    DecorationLine::LineThrough => (
                        self.baseline - metrics.strikeout_offset,
                        metrics.strikeout_thickness,
                    ),
                };
                TextDecoration {
                    line,
                    offset,
                    thickness,
                }
            })
            .collect();
    }

    /// Owned left margin, border and padding.
    #[must_use]
    pub fn left_margin_border_padding(&self) -> f32 {
        if !self.starts_here {
            return 0.0;
        }
        self.margin().left + self.border().left + self.padding().left
    }

    /// Owned right margin, border and padding.
    #[must_use]
    pub fn right_margin_border_padding(&self) -> f32 {
        if !self.ends_here {
            return 0.0;
        }
        self.margin().right + self.border().right + self.padding().right
    }

    /// Border sides this fragment draws.
    #[must_use]
    pub const fn border_sides(&self) -> BorderSides {
        BorderSides {
            top: true,
            right: self.ends_here,
            bottom: true,
            left: self.starts_here,
        }
    }

    /// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
    ///
    /// Border edge with the content top at `(left, top)`. Only owned margins
    /// are taken off the inline width.
    #[must_use]
    pub fn border_edge(&self, left: f32, top: f32) -> Rect {
        let (margin_left, margin_right) = self.owned(self.margin());
        let border = self.border();
        let padding = self.padding();
        Rect::new(
            left + margin_left,
            top - border.top - padding.top,
            self.inline_width - margin_left - margin_right,
            self.height,
        )
    }

    /// Margin edge, translated by `(tx, ty)`.
    ///
    /// Negative margins pull neighbors in but never shrink the area the
    /// fragment paints into, so only positive owned margins widen it.
    #[must_use]
    pub fn margin_edge(&self, left: f32, top: f32, tx: f32, ty: f32) -> Rect {
        let mut result = self.border_edge(left, top);
        let (margin_left, margin_right) = self.owned(self.margin());
        if margin_left > 0.0 {
            result.x -= margin_left;
            result.width += margin_left;
        }
        if margin_right > 0.0 {
            result.width += margin_right;
        }
        result.translate(tx, ty)
    }

    /// Content area: the border edge with owned border and padding stripped
    /// horizontally. Vertically it spans the full box height.
    #[must_use]
    pub fn content_area_edge(&self, left: f32, top: f32) -> Rect {
        let border = self.border();
        let padding = self.padding();
        let left_edges = self.left_margin_border_padding();
        let right_edges = self.right_margin_border_padding();
        Rect::new(
            left + left_edges,
            top - border.top - padding.top,
            self.inline_width - left_edges - right_edges,
            self.height,
        )
    }
}
