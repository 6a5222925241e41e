//! Resolved style snapshot consumed by inline boxes.
//!
//! The cascade lives outside this crate. What arrives here is the per-box
//! result: edge sizes that may still be percentages of the containing block
//! width, colors, visibility and the few flags the inline engine branches
//! on.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::geometry::EdgeSizes;

/// [§ 4.4 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
///
/// A length in pixels or a percentage of a reference width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPercentage {
    /// An absolute length in CSS pixels.
    Px(f32),
    /// A percentage (0-100) of the reference width.
    Percent(f32),
}

impl LengthPercentage {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Resolve against `basis` (the containing block width).
    ///
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "The percentage is calculated with respect to the width of the
    /// generated box's containing block."
    #[must_use]
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl Default for LengthPercentage {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Margin or padding edges before percentage resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnresolvedEdgeSizes {
    /// Top edge.
    pub top: LengthPercentage,
    /// Right edge.
    pub right: LengthPercentage,
    /// Bottom edge.
    pub bottom: LengthPercentage,
    /// Left edge.
    pub left: LengthPercentage,
}

impl UnresolvedEdgeSizes {
    /// Pixel edges in CSS shorthand order: top, right, bottom, left.
    #[must_use]
    pub const fn px(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: LengthPercentage::Px(top),
            right: LengthPercentage::Px(right),
            bottom: LengthPercentage::Px(bottom),
            left: LengthPercentage::Px(left),
        }
    }

    /// Resolve every edge against the containing block width.
    #[must_use]
    pub fn resolve(&self, containing_block_width: f32) -> EdgeSizes {
        EdgeSizes {
            top: self.top.resolve(containing_block_width),
            right: self.right.resolve(containing_block_width),
            bottom: self.bottom.resolve(containing_block_width),
            left: self.left.resolve(containing_block_width),
        }
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    #[serde(default = "opaque")]
    pub a: u8,
}

const fn opaque() -> u8 {
    255
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque blue, used for debug outlines.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// [§ 11.2 Visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
///
/// "The 'visibility' property specifies whether the boxes generated by an
/// element are rendered."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// "The generated box is visible."
    #[default]
    Visible,
    /// "The generated box is invisible (fully transparent, nothing is
    /// drawn), but still affects layout."
    Hidden,
    /// Treated as `hidden` for inline content.
    Collapse,
}

/// [§ 2 Text Decoration Lines](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DecorationLine {
    /// "Each line of text is underlined."
    Underline,
    /// "Each line of text has a line over it (i.e. on the opposite side
    /// from an underline)."
    Overline,
    /// "Each line of text has a line through the middle."
    LineThrough,
}

/// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// Only the schemes an inline box can take part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
}

/// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// `None` is `auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOffsets {
    /// 'top'
    pub top: Option<LengthPercentage>,
    /// 'right'
    pub right: Option<LengthPercentage>,
    /// 'bottom'
    pub bottom: Option<LengthPercentage>,
    /// 'left'
    pub left: Option<LengthPercentage>,
}

impl BoxOffsets {
    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "If neither 'left' nor 'right' is 'auto', the position is
    /// over-constrained, and one of them has to be ignored. If the 'direction'
    /// property of the containing block is 'ltr', the value of 'left' wins."
    ///
    /// "If neither 'top' nor 'bottom' is 'auto', 'bottom' is ignored."
    ///
    /// Vertical percentages resolve to zero: the containing block height is
    /// not known while inline content is being positioned.
    #[must_use]
    pub fn relative_delta(&self, containing_block_width: f32) -> (f32, f32) {
        let dx = match (self.left, self.right) {
            (Some(left), _) => left.resolve(containing_block_width),
            (None, Some(right)) => -right.resolve(containing_block_width),
            (None, None) => 0.0,
        };
        let vertical = |value: LengthPercentage| match value {
            LengthPercentage::Px(px) => px,
            LengthPercentage::Percent(_) => 0.0,
        };
        let dy = match (self.top, self.bottom) {
            (Some(top), _) => vertical(top),
            (None, Some(bottom)) => -vertical(bottom),
            (None, None) => 0.0,
        };
        (dx, dy)
    }
}

/// The resolved style of one inline box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineStyle {
    /// Margins; horizontal percentages refer to the containing block width.
    pub margin: UnresolvedEdgeSizes,
    /// Padding; percentages refer to the containing block width.
    pub padding: UnresolvedEdgeSizes,
    /// Border widths in pixels.
    pub border: EdgeSizes,
    /// Color used for every border side.
    pub border_color: Color,
    /// Background color, if any.
    pub background_color: Option<Color>,
    /// Foreground (text and decoration) color.
    pub color: Color,
    /// Font size in pixels.
    pub font_size: f32,
    /// 'visibility'
    pub visibility: Visibility,
    /// Whether text in this box takes part in justification.
    pub text_justify: bool,
    /// Whether the style asks for its own compositing layer (opacity,
    /// transforms and the like). Inline boxes cannot provide one.
    pub requires_layer: bool,
    /// 'text-decoration-line'
    pub text_decoration_lines: Vec<DecorationLine>,
    /// 'position'
    pub position: PositionType,
    /// 'top', 'right', 'bottom', 'left'
    pub offsets: BoxOffsets,
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self {
            margin: UnresolvedEdgeSizes::default(),
            padding: UnresolvedEdgeSizes::default(),
            border: EdgeSizes::ZERO,
            border_color: Color::BLACK,
            background_color: None,
            color: Color::BLACK,
            font_size: 16.0,
            visibility: Visibility::Visible,
            text_justify: false,
            requires_layer: false,
            text_decoration_lines: Vec::new(),
            position: PositionType::Static,
            offsets: BoxOffsets::default(),
        }
    }
}

impl InlineStyle {
    /// Whether boxes with this style are rendered.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Margins resolved against the containing block width.
    #[must_use]
    pub fn margin(&self, containing_block_width: f32) -> EdgeSizes {
        self.margin.resolve(containing_block_width)
    }

    /// Padding resolved against the containing block width.
    #[must_use]
    pub fn padding(&self, containing_block_width: f32) -> EdgeSizes {
        self.padding.resolve(containing_block_width)
    }

    /// Whether the style carries the given decoration line.
    #[must_use]
    pub fn has_decoration(&self, line: DecorationLine) -> bool {
        self.text_decoration_lines.contains(&line)
    }
}
