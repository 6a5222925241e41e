//! Relative positioning of split inline elements.
//!
//! [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
//!
//! "Once a box has been laid out according to the normal flow or floated,
//! it may be shifted relative to this position."
//!
//! A relatively positioned inline element may have fragments on several
//! lines, and block-level children that split it into anonymous block
//! continuations:
//!
//! ```text
//! <span style="position: relative; left: 5px">one<div>two</div>three</span>
//!
//! anonymous block   [line: span "one"]
//! block             div "two"
//! anonymous block   [line: span "three"]
//! ```
//!
//! All of it moves together, so the offset is applied to every fragment,
//! everything nested in them, and the block siblings in between.

use linnet_common::DiagnosticKind;
use serde::Serialize;

use crate::context::LayoutContext;
use crate::error::{InlineError, Result};
use crate::inline_box::InlineChild;
use crate::style::PositionType;
use crate::tree::{BoxId, BoxTree, ElementRef, NodeKind};

/// Every box generated by one element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ElementContent {
    /// Fragments with their nested boxes, plus intervening block siblings.
    pub boxes: Vec<BoxId>,
    /// Whether the fragment that ends the element was reached.
    pub found_end: bool,
}

impl BoxTree {
    /// Collect the content of the element inline box `id` belongs to.
    ///
    /// The walk starts at the containing block of `id`'s line. Inside each
    /// container every fragment of the element is added with its nested
    /// boxes. If the container is anonymous and the closing fragment has
    /// not been seen, the block siblings after it are added up to the next
    /// anonymous block, which becomes the next container.
    ///
    /// An anonymous inline box is its own element: it yields its own
    /// content.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box, is
    /// not on a line, or its line has no containing block.
    pub fn element_with_content(&self, id: BoxId) -> Result<ElementContent> {
        let Some(element) = self.inline(id)?.element() else {
            let mut boxes = Vec::new();
            self.add_to_content_list(id, &mut boxes)?;
            return Ok(ElementContent {
                boxes,
                found_end: true,
            });
        };

        let line = self.line_box_of(id)?.ok_or_else(|| {
            InlineError::InvalidArgument(format!("box {id} is not placed on a line"))
        })?;
        let mut container = self.containing_block_of(line)?.ok_or_else(|| {
            InlineError::InvalidArgument(format!("line {line} has no containing block"))
        })?;

        let mut boxes = Vec::new();
        let mut found_end = false;
        for _ in 0..self.len() {
            for fragment in self.element_boxes(container, element)? {
                self.add_to_content_list(fragment, &mut boxes)?;
            }
            found_end = boxes.iter().any(|&b| self.is_ending_box(b, element));

            if found_end || !self.block(container)?.anonymous {
                break;
            }
            match self.add_following_block_boxes(container, &mut boxes)? {
                Some(next) => container = next,
                None => break,
            }
        }

        Ok(ElementContent { boxes, found_end })
    }

    /// Push `id` and, for an inline box, every box nested in it.
    fn add_to_content_list(&self, id: BoxId, list: &mut Vec<BoxId>) -> Result<()> {
        list.push(id);
        if let NodeKind::Inline(inline) = &self.node(id)?.kind {
            for child in inline.children() {
                match child {
                    InlineChild::Inline(nested) => self.add_to_content_list(*nested, list)?,
                    InlineChild::Replaced(replaced) => list.push(*replaced),
                    InlineChild::Text(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Push the siblings after `container` up to the next anonymous block
    /// and return that block.
    fn add_following_block_boxes(
        &self,
        container: BoxId,
        list: &mut Vec<BoxId>,
    ) -> Result<Option<BoxId>> {
        let Some(parent) = self.parent(container)? else {
            return Ok(None);
        };
        let siblings = self.child_boxes(parent)?;
        let following = siblings
            .iter()
            .position(|&sibling| sibling == container)
            .map_or(&[][..], |index| &siblings[index + 1..]);

        for &sibling in following {
            if self.block(sibling).is_ok_and(|block| block.anonymous) {
                return Ok(Some(sibling));
            }
            list.push(sibling);
        }
        Ok(None)
    }

    fn is_ending_box(&self, id: BoxId, element: ElementRef) -> bool {
        self.inline(id)
            .is_ok_and(|inline| inline.element() == Some(element) && inline.ends_here)
    }

    /// Apply the relative offset of inline box `id` to its whole element.
    ///
    /// Every box of [`BoxTree::element_with_content`] is moved by the
    /// offset and its canvas location is re-derived. Returns the offset,
    /// `(0, 0)` for a box that is not relatively positioned.
    ///
    /// When the closing fragment cannot be found the boxes that were found
    /// are still moved and an inconsistency is recorded.
    ///
    /// # Errors
    ///
    /// Same as [`BoxTree::element_with_content`].
    pub fn position_relative(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
    ) -> Result<(f32, f32)> {
        let inline = self.inline(id)?;
        if inline.style().position != PositionType::Relative {
            return Ok((0.0, 0.0));
        }
        let (dx, dy) = inline
            .style()
            .offsets
            .relative_delta(inline.containing_block_width);

        let content = self.element_with_content(id)?;
        if !content.found_end {
            let tag = self
                .inline(id)?
                .element()
                .and_then(|element| self.element(element))
                .map_or("(anonymous)", |source| source.tag_name.as_str());
            let _ = ctx.diagnostics.warn_once(
                "Inline",
                DiagnosticKind::Inconsistency,
                format!(
                    "closing fragment of <{tag}> not found; offset {} boxes only",
                    content.boxes.len()
                ),
            );
        }

        #[cfg(feature = "layout-trace")]
        log::trace!("position_relative {id}: ({dx}, {dy}) over {} boxes", content.boxes.len());

        for &b in &content.boxes {
            self.translate(b, dx, dy)?;
            self.calc_canvas_location(b)?;
            self.calc_child_locations(b)?;
        }
        Ok((dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::ApproximateFontMetrics;
    use crate::style::{BoxOffsets, InlineStyle, LengthPercentage};
    use crate::text::TextRun;

    #[test]
    fn test_static_box_does_not_move() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let inline = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 100.0);
        assert_eq!(tree.position_relative(&mut ctx, inline).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_single_line_element_moves_with_children() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let span = tree.add_element("span", None);
        let em = tree.add_element("em", None);
        let block = tree.create_block(None, false);
        let line = tree.create_line(0.0, 0.0);
        tree.append_to_block(block, line).unwrap();

        let style = InlineStyle {
            position: PositionType::Relative,
            offsets: BoxOffsets {
                left: Some(LengthPercentage::Percent(10.0)),
                top: Some(LengthPercentage::Px(2.0)),
                ..BoxOffsets::default()
            },
            ..InlineStyle::default()
        };
        let outer = tree.create_inline_box(&mut ctx, Some(span), style, 50.0);
        let inner = tree.create_inline_box(&mut ctx, Some(em), InlineStyle::default(), 50.0);
        tree.append_child(&mut ctx, inner, TextRun::new("x", 9.6), true)
            .unwrap();
        tree.append_child(&mut ctx, outer, inner, true).unwrap();
        tree.inline_mut(outer).unwrap().ends_here = true;
        tree.inline_mut(inner).unwrap().ends_here = true;
        tree.append_to_line(line, outer).unwrap();
        let _ = tree.pack_line(line).unwrap();
        tree.propagate_locations(block).unwrap();

        let content = tree.element_with_content(outer).unwrap();
        assert_eq!(content.boxes, vec![outer, inner]);
        assert!(content.found_end);

        let delta = tree.position_relative(&mut ctx, outer).unwrap();
        assert_eq!(delta, (5.0, 2.0));
        let node = tree.node(inner).unwrap();
        assert!((node.abs_x - 5.0).abs() < f32::EPSILON);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_detached_box_is_rejected() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let span = tree.add_element("span", None);
        let inline = tree.create_inline_box(&mut ctx, Some(span), InlineStyle::default(), 100.0);
        let err = tree.element_with_content(inline).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
