//! Painter - drives an output device over inline boxes
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! "For each inline element ... the background color of the element, the
//! border of the element ... underline ... overline ... the element's text
//! ... line-through"

use crate::config::InlineConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::inline_box::{InlineBox, InlineChild, TextDecoration};
use crate::style::DecorationLine;
use crate::tree::{BoxId, BoxTree, NodeKind};

use super::{OutputDevice, RegionKind};

/// What a paint pass draws into and how.
pub struct RenderingContext<'a> {
    /// Device receiving the drawing calls.
    pub output: &'a mut dyn OutputDevice,
    /// Pass configuration.
    pub config: &'a InlineConfig,
}

impl<'a> RenderingContext<'a> {
    /// Paint into `output` with `config`.
    #[must_use]
    pub fn new(output: &'a mut dyn OutputDevice, config: &'a InlineConfig) -> Self {
        Self { output, config }
    }
}

impl BoxTree {
    /// Paint inline box `id` in three bracketed passes.
    ///
    /// Nested boxes are not descended into; they only get an empty
    /// child-box region so that the output keeps their place in reading
    /// order. An invisible box emits nothing.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `id` is not an inline box.
    pub fn paint_inline(&self, ctx: &mut RenderingContext<'_>, id: BoxId) -> Result<()> {
        let node = self.node(id)?;
        let inline = self.inline(id)?;
        if !inline.style().is_visible() {
            return Ok(());
        }
        let (abs_x, abs_y) = (node.abs_x, node.abs_y);

        // STEP 1: Background, borders, debug outline, underline and overline.
        let token = ctx.output.begin_region(RegionKind::Background, id);
        paint_background(ctx, inline, abs_x, abs_y);
        paint_borders(ctx, inline, abs_x, abs_y);
        if ctx.config.debug_draw_inline_boxes {
            ctx.output.draw_debug_outline(
                id,
                inline.margin_edge(abs_x, abs_y, 0.0, 0.0),
                ctx.config.debug_outline_color,
            );
        }
        paint_decorations(ctx, id, inline, abs_x, abs_y, |line| {
            matches!(line, DecorationLine::Underline | DecorationLine::Overline)
        });
        ctx.output.end_region(token);

        // STEP 2: Content, in source order.
        for child in inline.children() {
            match child {
                InlineChild::Text(run) => {
                    let token = ctx.output.begin_region(RegionKind::Text, id);
                    let origin = Point::new(abs_x + run.x, abs_y + inline.baseline);
                    ctx.output.draw_text(id, origin, run, inline.style());
                    ctx.output.end_region(token);
                }
                InlineChild::Inline(child) | InlineChild::Replaced(child) => {
                    let token = ctx.output.begin_region(RegionKind::InlineChildBox, *child);
                    ctx.output.end_region(token);
                }
            }
        }

        // STEP 3: Line-through goes over the text.
        let token = ctx.output.begin_region(RegionKind::Background, id);
        paint_decorations(ctx, id, inline, abs_x, abs_y, |line| {
            line == DecorationLine::LineThrough
        });
        ctx.output.end_region(token);

        Ok(())
    }

    /// Paint every box on line `line` in pre-order: each inline box before
    /// the boxes nested in it. Replaced boxes are drawn as opaque
    /// rectangles.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`](crate::InlineError::InvalidArgument)
    /// if `line` is not a line box.
    pub fn paint_line(&self, ctx: &mut RenderingContext<'_>, line: BoxId) -> Result<()> {
        let NodeKind::Line(line_box) = &self.node(line)?.kind else {
            return Err(self.wrong_kind(line, "line box"));
        };
        for &child in &line_box.children {
            self.paint_subtree(ctx, child)?;
        }
        Ok(())
    }

    fn paint_subtree(&self, ctx: &mut RenderingContext<'_>, id: BoxId) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Inline(_) => {
                self.paint_inline(ctx, id)?;
                for child in self.child_boxes(id)? {
                    self.paint_subtree(ctx, child)?;
                }
            }
            NodeKind::Replaced(replaced) => {
                if replaced.visible {
                    ctx.output.draw_replaced(
                        id,
                        Rect::new(node.abs_x, node.abs_y, replaced.width, replaced.height),
                    );
                }
            }
            NodeKind::Line(_) | NodeKind::Block(_) => {
                for child in self.child_boxes(id)? {
                    self.paint_subtree(ctx, child)?;
                }
            }
        }
        Ok(())
    }
}

/// [§ 3.7 Background Painting Area](https://www.w3.org/TR/css-backgrounds-3/#background-painting-area)
///
/// "The initial value of 'background-clip' is 'border-box', meaning the
/// background is painted within the border box."
fn paint_background(ctx: &mut RenderingContext<'_>, inline: &InlineBox, abs_x: f32, abs_y: f32) {
    if let Some(color) = inline.style().background_color {
        ctx.output.fill_rect(inline.border_edge(abs_x, abs_y), color);
    }
}

/// Paint the border sides this fragment owns.
///
/// [CSS Backgrounds and Borders § 4](https://www.w3.org/TR/css-backgrounds-3/#borders)
///
/// Every side is a solid rectangle. Top and bottom span the full border
/// edge; left and right sit between them.
fn paint_borders(ctx: &mut RenderingContext<'_>, inline: &InlineBox, abs_x: f32, abs_y: f32) {
    let edge = inline.border_edge(abs_x, abs_y);
    let sides = inline.border_sides();
    let border = inline.border();
    let color = inline.style().border_color;

    let top = if sides.top { border.top } else { 0.0 };
    let bottom = if sides.bottom { border.bottom } else { 0.0 };
    let left = if sides.left { border.left } else { 0.0 };
    let right = if sides.right { border.right } else { 0.0 };
    let inner_height = edge.height - top - bottom;

    if top > 0.0 {
        ctx.output
            .fill_rect(Rect::new(edge.x, edge.y, edge.width, top), color);
    }
    if bottom > 0.0 {
        ctx.output.fill_rect(
            Rect::new(edge.x, edge.bottom() - bottom, edge.width, bottom),
            color,
        );
    }
    if left > 0.0 {
        ctx.output
            .fill_rect(Rect::new(edge.x, edge.y + top, left, inner_height), color);
    }
    if right > 0.0 {
        ctx.output.fill_rect(
            Rect::new(edge.right() - right, edge.y + top, right, inner_height),
            color,
        );
    }
}

/// Draw the decorations of `inline` accepted by `include`, across the
/// content area.
fn paint_decorations(
    ctx: &mut RenderingContext<'_>,
    id: BoxId,
    inline: &InlineBox,
    abs_x: f32,
    abs_y: f32,
    include: impl Fn(DecorationLine) -> bool,
) {
    let content = inline.content_area_edge(abs_x, abs_y);
    let color = inline.style().color;
    for decoration in inline
        .text_decorations()
        .iter()
        .filter(|decoration| include(decoration.line))
    {
        ctx.output.draw_text_decoration(
            id,
            decoration,
            decoration_area(content, abs_y, decoration),
            color,
        );
    }
}

fn decoration_area(content: Rect, abs_y: f32, decoration: &TextDecoration) -> Rect {
    Rect::new(
        content.x,
        abs_y + decoration.offset,
        content.width,
        decoration.thickness,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LayoutContext;
    use crate::font::ApproximateFontMetrics;
    use crate::geometry::EdgeSizes;
    use crate::paint::{DisplayCommand, DisplayList};
    use crate::style::{Color, InlineStyle, Visibility};
    use crate::text::TextRun;

    fn painted(style: InlineStyle, config: &InlineConfig) -> DisplayList {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let line = tree.create_line(0.0, 0.0);
        let id = tree.create_inline_box(&mut ctx, None, style, 100.0);
        tree.append_child(&mut ctx, id, TextRun::new("ab", 19.2), true)
            .unwrap();
        tree.inline_mut(id).unwrap().ends_here = true;
        tree.append_to_line(line, id).unwrap();
        let _ = tree.pack_line(line).unwrap();
        tree.propagate_locations(line).unwrap();

        let mut list = DisplayList::new();
        let mut render = RenderingContext::new(&mut list, config);
        tree.paint_line(&mut render, line).unwrap();
        list
    }

    #[test]
    fn test_invisible_box_emits_nothing() {
        let style = InlineStyle {
            visibility: Visibility::Hidden,
            ..InlineStyle::default()
        };
        assert!(painted(style, &InlineConfig::default()).is_empty());
    }

    #[test]
    fn test_borders_on_single_fragment() {
        let style = InlineStyle {
            border: EdgeSizes::uniform(1.0),
            background_color: Some(Color::rgb(255, 255, 0)),
            ..InlineStyle::default()
        };
        let list = painted(style, &InlineConfig::default());
        let fills = list
            .commands()
            .iter()
            .filter(|command| matches!(command, DisplayCommand::FillRect { .. }))
            .count();
        // Background plus four sides.
        assert_eq!(fills, 5);
        assert!(list.regions_balanced());
    }

    #[test]
    fn test_debug_outline_follows_config() {
        let config = InlineConfig {
            debug_draw_inline_boxes: true,
            ..InlineConfig::default()
        };
        let list = painted(InlineStyle::default(), &config);
        assert!(list.commands().iter().any(|command| matches!(
            command,
            DisplayCommand::DrawDebugOutline { color, .. } if *color == Color::BLUE
        )));
    }
}
