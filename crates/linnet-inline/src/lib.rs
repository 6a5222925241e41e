//! Inline formatting context engine for the Linnet renderer.
//!
//! # Scope
//!
//! This crate implements the part of a laid-out line that belongs to
//! inline-level content:
//! - **Box tree** - an arena of block, line, inline and replaced boxes
//!   addressed by [`BoxId`] handles
//! - **Fragment lifecycle** - pending inline box fragments, confirmation and
//!   tail pruning ([§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes))
//! - **Edge geometry** - border, margin and content-area rectangles that only
//!   carry the outer edges a fragment owns
//! - **Justification** - left-to-right and right-to-left distribution of
//!   extra line width ([§ 7.3 text-align](https://www.w3.org/TR/css-text-3/#text-align-property))
//! - **Painting** - the three-pass structured paint protocol
//! - **Hit testing** - canvas location propagation and `find`
//! - **Relative positioning** - translating every fragment of an element
//!   across anonymous block continuations
//!
//! # Not In Scope
//!
//! Style cascade, glyph shaping, the bidi algorithm, line breaking and the
//! concrete output format are collaborators. They are reached through
//! [`InlineStyle`], [`FontMetricsProvider`], [`OutputDevice`] and
//! [`DynamicContentResolver`].

pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod font;
pub mod geometry;
pub mod inline_box;
pub mod justify;
pub mod lifecycle;
pub mod location;
pub mod paint;
pub mod relative;
pub mod style;
pub mod text;
pub mod tree;

pub use config::{InlineConfig, JustificationConfig};
pub use content::DumpMode;
pub use context::{BoxIdRegistry, LayoutContext};
pub use error::{InlineError, Result};
pub use font::{ApproximateFontMetrics, FontMetrics, FontMetricsProvider};
pub use geometry::{EdgeSizes, Point, Rect};
pub use inline_box::{BorderSides, InlineBox, InlineChild, InlineContent, TextDecoration};
pub use justify::{CharCounts, Direction, JustificationInfo};
pub use location::{HitStats, PaintingInfo};
pub use paint::{
    DisplayCommand, DisplayList, OutputDevice, RegionKind, RegionToken, RenderingContext,
};
pub use relative::ElementContent;
pub use style::{
    BoxOffsets, Color, DecorationLine, InlineStyle, LengthPercentage, PositionType,
    UnresolvedEdgeSizes, Visibility,
};
pub use text::{ContentFunction, DynamicContentResolver, TextRun};
pub use tree::{
    BlockBox, BoxId, BoxTree, ElementRef, LineBox, Node, NodeKind, ReplacedBox, SourceElement,
};
