//! Display List - a recording output device
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! Records every call made on an [`OutputDevice`] in order. Used by the CLI
//! to print what a paint pass produced, and by tests to check the protocol.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::inline_box::TextDecoration;
use crate::style::{Color, DecorationLine, InlineStyle};
use crate::text::TextRun;
use crate::tree::BoxId;

use super::{OutputDevice, RegionKind, RegionToken};

/// A single recorded drawing call.
///
/// [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
///
/// Commands are stored in the order they were issued (back to front).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// A region was opened.
    BeginRegion {
        /// Region kind.
        kind: RegionKind,
        /// Box the region belongs to.
        subject: BoxId,
        /// Token identifying the region.
        token: RegionToken,
    },

    /// A region was closed.
    EndRegion {
        /// Token of the closed region.
        token: RegionToken,
    },

    /// Fill a rectangle with a solid color.
    ///
    /// Used for backgrounds and borders.
    FillRect {
        /// Rectangle to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
    },

    /// Draw text at a baseline origin.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// Step 7: "the element's text"
    DrawText {
        /// Box owning the run.
        subject: BoxId,
        /// X coordinate of the baseline origin.
        x: f32,
        /// Y coordinate of the baseline origin.
        y: f32,
        /// The text content to draw.
        text: String,
        /// Advance width of the run.
        width: f32,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        color: Color,
    },

    /// Draw a decoration line.
    ///
    /// [§ 3 'text-decoration-line'](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
    DrawTextDecoration {
        /// Box owning the decoration.
        subject: BoxId,
        /// Which line.
        line: DecorationLine,
        /// Area covered by the stroke.
        rect: Rect,
        /// Stroke color.
        color: Color,
    },

    /// Outline a box for debugging.
    DrawDebugOutline {
        /// Outlined box.
        subject: BoxId,
        /// Outlined rectangle.
        rect: Rect,
        /// Outline color.
        color: Color,
    },

    /// Draw replaced content.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// Step 5: "the replaced content of replaced inline-level elements"
    DrawReplaced {
        /// The replaced box.
        subject: BoxId,
        /// Where to draw it.
        rect: Rect,
    },
}

/// A list of drawing commands in painting order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
    #[serde(skip)]
    next_token: u32,
}

impl DisplayList {
    /// Create an empty display list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
            next_token: 0,
        }
    }

    /// Get the commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Get the number of commands.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the display list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether every region is closed, innermost first.
    #[must_use]
    pub fn regions_balanced(&self) -> bool {
        let mut open = Vec::new();
        for command in &self.commands {
            match command {
                DisplayCommand::BeginRegion { token, .. } => open.push(*token),
                DisplayCommand::EndRegion { token } => {
                    if open.pop() != Some(*token) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        open.is_empty()
    }
}

impl OutputDevice for DisplayList {
    fn begin_region(&mut self, kind: RegionKind, subject: BoxId) -> RegionToken {
        let token = RegionToken(self.next_token);
        self.next_token += 1;
        self.commands.push(DisplayCommand::BeginRegion {
            kind,
            subject,
            token,
        });
        token
    }

    fn end_region(&mut self, token: RegionToken) {
        self.commands.push(DisplayCommand::EndRegion { token });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DisplayCommand::FillRect { rect, color });
    }

    fn draw_text(&mut self, subject: BoxId, origin: Point, run: &TextRun, style: &InlineStyle) {
        self.commands.push(DisplayCommand::DrawText {
            subject,
            x: origin.x,
            y: origin.y,
            text: run.text().to_string(),
            width: run.width,
            font_size: style.font_size,
            color: style.color,
        });
    }

    fn draw_text_decoration(
        &mut self,
        subject: BoxId,
        decoration: &TextDecoration,
        area: Rect,
        color: Color,
    ) {
        self.commands.push(DisplayCommand::DrawTextDecoration {
            subject,
            line: decoration.line,
            rect: area,
            color,
        });
    }

    fn draw_debug_outline(&mut self, subject: BoxId, rect: Rect, color: Color) {
        self.commands
            .push(DisplayCommand::DrawDebugOutline { subject, rect, color });
    }

    fn draw_replaced(&mut self, subject: BoxId, rect: Rect) {
        self.commands.push(DisplayCommand::DrawReplaced { subject, rect });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_balanced() {
        let mut list = DisplayList::new();
        let outer = list.begin_region(RegionKind::Background, BoxId(0));
        let inner = list.begin_region(RegionKind::Text, BoxId(0));
        assert_ne!(outer, inner);
        list.end_region(inner);
        list.end_region(outer);
        assert!(list.regions_balanced());
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_crossed_regions_are_unbalanced() {
        let mut list = DisplayList::new();
        let outer = list.begin_region(RegionKind::Background, BoxId(0));
        let _inner = list.begin_region(RegionKind::Text, BoxId(0));
        list.end_region(outer);
        assert!(!list.regions_balanced());
    }

    #[test]
    fn test_commands_serialize_tagged() {
        let mut list = DisplayList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["commands"][0]["op"], "fill_rect");
    }
}
