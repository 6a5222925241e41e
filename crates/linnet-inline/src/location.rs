//! Canvas locations, aggregate bounds and hit testing.
//!
//! Local positions are authoritative; absolute canvas positions are derived
//! from them top-down. Inline and replaced boxes are positioned relative to
//! their line box, line boxes relative to their containing block.
//!
//! [§ 9.1.2 Containing blocks](https://www.w3.org/TR/CSS2/visuren.html#containing-block)

use serde::Serialize;

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::tree::{BoxId, BoxTree, NodeKind};

/// Cached bounds of everything a box and its descendants paint.
///
/// Hit testing skips a whole subtree when the point is outside
/// `aggregate_bounds`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaintingInfo {
    /// Union of the margin edges of the box and all its descendants.
    pub aggregate_bounds: Rect,
    /// Furthest bottom-right margin corner in the subtree.
    pub outer_margin_corner: Point,
}

/// Counters collected by [`BoxTree::find_with_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitStats {
    /// How many times cached aggregate bounds were consulted.
    pub bounds_checks: usize,
    /// How many boxes the search entered.
    pub boxes_visited: usize,
}

impl BoxTree {
    /// Derive the absolute position of `id` from its local position.
    ///
    /// Inline and replaced boxes add their enclosing line box's absolute
    /// position; lines and nested blocks add their parent's. Roots and
    /// detached boxes use their local position.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn calc_canvas_location(&mut self, id: BoxId) -> Result<()> {
        let node = self.node(id)?;
        let origin = match node.kind {
            NodeKind::Inline(_) | NodeKind::Replaced(_) => self.line_box_of(id)?,
            NodeKind::Line(_) | NodeKind::Block(_) => node.parent,
        };
        let (origin_x, origin_y) = match origin {
            Some(origin) => {
                let origin = self.node(origin)?;
                (origin.abs_x, origin.abs_y)
            }
            None => (0.0, 0.0),
        };
        let node = self.node_mut(id)?;
        node.abs_x = origin_x + node.x;
        node.abs_y = origin_y + node.y;
        Ok(())
    }

    /// Re-derive the absolute position of every descendant of `id`, top
    /// down.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn calc_child_locations(&mut self, id: BoxId) -> Result<()> {
        for child in self.child_boxes(id)? {
            self.calc_canvas_location(child)?;
            self.calc_child_locations(child)?;
        }
        Ok(())
    }

    /// [`BoxTree::calc_canvas_location`] for `id` followed by
    /// [`BoxTree::calc_child_locations`].
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn propagate_locations(&mut self, id: BoxId) -> Result<()> {
        self.calc_canvas_location(id)?;
        self.calc_child_locations(id)
    }

    /// Compute the aggregate bounds of `id`, caching them on every inline
    /// box in the subtree.
    ///
    /// An inline box starts from its margin edge at its absolute position;
    /// lines and blocks start empty. Each child box's bounds are then added.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn calc_painting_info(&mut self, id: BoxId) -> Result<PaintingInfo> {
        let node = self.node(id)?;
        let own = match &node.kind {
            NodeKind::Inline(inline) => inline.margin_edge(node.abs_x, node.abs_y, 0.0, 0.0),
            NodeKind::Replaced(replaced) => {
                Rect::new(node.abs_x, node.abs_y, replaced.width, replaced.height)
            }
            NodeKind::Line(_) | NodeKind::Block(_) => Rect::default(),
        };
        let mut info = PaintingInfo {
            aggregate_bounds: own,
            outer_margin_corner: Point::new(own.right(), own.bottom()),
        };

        for child in self.child_boxes(id)? {
            let child_info = self.calc_painting_info(child)?;
            info.outer_margin_corner.x =
                info.outer_margin_corner.x.max(child_info.outer_margin_corner.x);
            info.outer_margin_corner.y =
                info.outer_margin_corner.y.max(child_info.outer_margin_corner.y);
            info.aggregate_bounds = info.aggregate_bounds.union(&child_info.aggregate_bounds);
        }

        if let NodeKind::Inline(inline) = &mut self.node_mut(id)?.kind {
            inline.painting_info = Some(info);
        }
        Ok(info)
    }

    /// The deepest box under `id` at canvas point `point`.
    ///
    /// Child boxes are tried before the box itself, in paint order. A hit
    /// on an anonymous inline box is reported as its grandparent unless
    /// `find_anonymous` is set: the containing block for a box placed
    /// directly on a line, the line for a nested one.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn find(&self, id: BoxId, point: Point, find_anonymous: bool) -> Result<Option<BoxId>> {
        self.find_with_stats(id, point, find_anonymous, &mut HitStats::default())
    }

    /// [`BoxTree::find`], counting bounds checks and visited boxes into
    /// `stats`.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`](crate::InlineError::UnknownBox) for a
    /// foreign handle.
    pub fn find_with_stats(
        &self,
        id: BoxId,
        point: Point,
        find_anonymous: bool,
        stats: &mut HitStats,
    ) -> Result<Option<BoxId>> {
        stats.boxes_visited += 1;
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Replaced(replaced) => {
                let rect = Rect::new(node.abs_x, node.abs_y, replaced.width, replaced.height);
                Ok((replaced.visible && rect.contains(point)).then_some(id))
            }
            NodeKind::Line(_) | NodeKind::Block(_) => {
                for child in self.child_boxes(id)? {
                    if let Some(hit) = self.find_with_stats(child, point, find_anonymous, stats)? {
                        return Ok(Some(hit));
                    }
                }
                Ok(None)
            }
            NodeKind::Inline(inline) => {
                if let Some(info) = inline.painting_info() {
                    stats.bounds_checks += 1;
                    if !info.aggregate_bounds.contains(point) {
                        return Ok(None);
                    }
                }

                for child in self.child_boxes(id)? {
                    if let Some(hit) = self.find_with_stats(child, point, find_anonymous, stats)? {
                        return Ok(Some(hit));
                    }
                }

                let edge = inline.content_area_edge(node.abs_x, node.abs_y);
                if !(edge.contains(point) && inline.style().is_visible()) {
                    return Ok(None);
                }
                if !find_anonymous && inline.is_anonymous() {
                    return match node.parent {
                        Some(parent) => self.parent(parent),
                        None => Ok(None),
                    };
                }
                Ok(Some(id))
            }
        }
    }
}
