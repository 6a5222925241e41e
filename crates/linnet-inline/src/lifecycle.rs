//! Building inline content on a line.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! Line breaking opens a fragment for every inline element that is active
//! at the start of a line, before it knows whether any of that element's
//! content will fit. Such fragments are *pending*. The first real content
//! appended anywhere below a pending fragment confirms it and all its
//! pending ancestors. When the line closes, pending fragments left at the
//! tail carry nothing and are pruned.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)

use linnet_common::DiagnosticKind;

use crate::context::LayoutContext;
use crate::error::{InlineError, Result};
use crate::inline_box::{InlineBox, InlineChild, InlineContent};
use crate::style::InlineStyle;
use crate::tree::{BoxId, BoxTree, ElementRef, NodeKind};

impl BoxTree {
    /// Create a pending fragment for `element` (or an anonymous one).
    ///
    /// The height is computed from the font metrics of `style`, the
    /// baseline sits at the font's ascent, and the element's `id` attribute
    /// is registered if nothing holds it yet.
    pub fn create_inline_box(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        element: Option<ElementRef>,
        style: InlineStyle,
        containing_block_width: f32,
    ) -> BoxId {
        let metrics = ctx.font_metrics().metrics(&style);
        let mut inline = InlineBox::new(element, style, containing_block_width);
        inline.calculate_height(&metrics);
        inline.baseline = metrics.ascent;
        let id = self.alloc(NodeKind::Inline(inline));

        if let Some(attr) = element
            .and_then(|element| self.element(element))
            .and_then(|source| source.id.as_deref())
            && ctx.box_ids.get(attr).is_none()
        {
            ctx.box_ids.register(attr, id);
        }
        id
    }

    /// Open the next fragment of the element `id` belongs to.
    ///
    /// The continuation shares element, style, height and pending state.
    /// It owns neither outer edge; line breaking decides that afterwards.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn continuation_of(&mut self, id: BoxId) -> Result<BoxId> {
        let source = self.inline(id)?;
        let mut inline = InlineBox::new(
            source.element(),
            source.style().clone(),
            source.containing_block_width,
        );
        inline.height = source.height;
        inline.baseline = source.baseline;
        inline.set_pending(source.is_pending());
        Ok(self.alloc(NodeKind::Inline(inline)))
    }

    /// Append `content` to inline box `parent`.
    ///
    /// With `auto_confirm`, appending to a pending box confirms it.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `parent` is not an inline box,
    /// if a box handle points at a line or block, or if the box is already
    /// attached or would become its own ancestor.
    pub fn append_child(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        parent: BoxId,
        content: impl Into<InlineContent>,
        auto_confirm: bool,
    ) -> Result<()> {
        let _ = self.inline(parent)?;
        let child = match content.into() {
            InlineContent::Text(run) => InlineChild::Text(run),
            InlineContent::Box(id) => {
                let child = match &self.node(id)?.kind {
                    NodeKind::Inline(_) => InlineChild::Inline(id),
                    NodeKind::Replaced(_) => InlineChild::Replaced(id),
                    NodeKind::Block(_) | NodeKind::Line(_) => {
                        return Err(InlineError::InvalidArgument(format!(
                            "a {} cannot be a child of an inline box",
                            self.node(id)?.kind_name()
                        )));
                    }
                };
                self.ensure_detached(parent, id)?;
                self.node_mut(id)?.parent = Some(parent);
                child
            }
        };
        self.inline_mut(parent)?.children_mut().push(child);

        if auto_confirm && self.inline(parent)?.is_pending() {
            self.confirm(ctx, parent)?;
        }
        Ok(())
    }

    /// Mark `id` as holding real content.
    ///
    /// A confirmed fragment is the one that starts its element on this
    /// line. Pending inline ancestors are confirmed too.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn confirm(&mut self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<()> {
        let mut current = id;
        for _ in 0..self.len() {
            let inline = self.inline_mut(current)?;
            inline.set_pending(false);
            inline.starts_here = true;
            let element = inline.element();

            if self.inline(current)?.style().requires_layer {
                let tag = element
                    .and_then(|element| self.element(element))
                    .map_or("(anonymous)", |source| source.tag_name.as_str());
                let _ = ctx.diagnostics.warn_once(
                    "Inline",
                    DiagnosticKind::DegradedRendering,
                    format!(
                        "<{tag}> needs its own layer, which inline boxes cannot have; painting it in place"
                    ),
                );
            }

            match self.node(current)?.parent {
                Some(parent) if self.inline(parent).is_ok_and(InlineBox::is_pending) => {
                    current = parent;
                }
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    /// Remove pending fragments from the tail of `id`, depth first.
    ///
    /// Scanning stops at the first trailing child that is not an inline box
    /// or is no longer pending after its own tail was pruned. Each removed
    /// fragment is detached and gives up its element id registration.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn prune_pending(&mut self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<()> {
        while let Some(&InlineChild::Inline(last)) = self.inline(id)?.children().last() {
            self.prune_pending(ctx, last)?;
            if !self.inline(last)?.is_pending() {
                break;
            }

            if let Some(attr) = self
                .inline(last)?
                .element()
                .and_then(|element| self.element(element))
                .and_then(|source| source.id.as_deref())
            {
                let _ = ctx.box_ids.remove_if_held(attr, last);
            }
            let _ = self.inline_mut(id)?.children_mut().pop();
            self.node_mut(last)?.parent = None;
            log::debug!("pruned pending fragment {last} from {id}");
        }
        Ok(())
    }

    /// Prune every top-level inline box on line box `line`, then drop the
    /// ones still pending from the tail of the line.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `line` is not a line box.
    pub fn prune_line(&mut self, ctx: &mut LayoutContext<'_>, line: BoxId) -> Result<()> {
        let children = match &self.node(line)?.kind {
            NodeKind::Line(line_box) => line_box.children.clone(),
            _ => return Err(self.wrong_kind(line, "line box")),
        };
        for &child in &children {
            if self.inline(child).is_ok() {
                self.prune_pending(ctx, child)?;
            }
        }
        for &child in children.iter().rev() {
            if !self.inline(child).is_ok_and(InlineBox::is_pending) {
                break;
            }
            if let NodeKind::Line(line_box) = &mut self.node_mut(line)?.kind {
                let _ = line_box.children.pop();
            }
            self.node_mut(child)?.parent = None;
            log::debug!("pruned pending fragment {child} from line {line}");
        }
        Ok(())
    }

    /// The child of inline box `parent` at `index`.
    ///
    /// # Errors
    ///
    /// [`InlineError::OutOfBounds`] past the end.
    pub fn child(&self, parent: BoxId, index: usize) -> Result<&InlineChild> {
        let children = self.inline(parent)?.children();
        children.get(index).ok_or(InlineError::OutOfBounds {
            index,
            len: children.len(),
        })
    }

    /// Remove and return the child of `parent` at `index`. A removed box is
    /// detached.
    ///
    /// # Errors
    ///
    /// [`InlineError::OutOfBounds`] past the end.
    pub fn remove_child(&mut self, parent: BoxId, index: usize) -> Result<InlineChild> {
        let children = self.inline_mut(parent)?.children_mut();
        if index >= children.len() {
            return Err(InlineError::OutOfBounds {
                index,
                len: children.len(),
            });
        }
        let removed = children.remove(index);
        if let Some(child) = removed.box_id() {
            self.node_mut(child)?.parent = None;
        }
        Ok(removed)
    }

    /// Width of `id` before justification: owned edges plus every child's
    /// width. Nested inline boxes are measured by their current
    /// `inline_width`.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn natural_inline_width(&self, id: BoxId) -> Result<f32> {
        let inline = self.inline(id)?;
        let mut width = inline.left_margin_border_padding() + inline.right_margin_border_padding();
        for child in inline.children() {
            width += match child {
                InlineChild::Text(run) => run.width,
                InlineChild::Inline(nested) => self.inline(*nested)?.inline_width,
                InlineChild::Replaced(replaced) => self.replaced(*replaced)?.width,
            };
        }
        Ok(width)
    }

    /// Set `inline_width` of `id` and every nested inline box to its
    /// natural width, innermost first.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn seed_inline_widths(&mut self, id: BoxId) -> Result<f32> {
        let nested: Vec<BoxId> = self
            .inline(id)?
            .children()
            .iter()
            .filter_map(|child| match child {
                InlineChild::Inline(nested) => Some(*nested),
                InlineChild::Text(_) | InlineChild::Replaced(_) => None,
            })
            .collect();
        for child in nested {
            let _ = self.seed_inline_widths(child)?;
        }
        let width = self.natural_inline_width(id)?;
        self.inline_mut(id)?.inline_width = width;
        Ok(width)
    }

    /// Place the content of line box `line` left to right on a shared
    /// baseline.
    ///
    /// Inline widths are seeded first. Inline boxes sit with their
    /// baseline on the line's baseline, replaced boxes sit on top of it.
    /// Text run offsets are relative to their box; box positions are
    /// relative to the line.
    ///
    /// Returns the width of the packed content.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `line` is not a line box.
    pub fn pack_line(&mut self, line: BoxId) -> Result<f32> {
        let children = match &self.node(line)?.kind {
            NodeKind::Line(line_box) => line_box.children.clone(),
            _ => return Err(self.wrong_kind(line, "line box")),
        };

        let mut line_baseline: f32 = 0.0;
        for &child in &children {
            if self.inline(child).is_ok() {
                let _ = self.seed_inline_widths(child)?;
            }
            line_baseline = line_baseline.max(self.max_baseline(child)?);
        }

        let mut cursor = 0.0;
        for &child in &children {
            cursor = self.pack_box(child, cursor, line_baseline)?;
        }

        #[cfg(feature = "layout-trace")]
        log::trace!("packed {line}: width={cursor} baseline={line_baseline}");

        Ok(cursor)
    }

    /// Tallest baseline in the subtree rooted at `id`.
    fn max_baseline(&self, id: BoxId) -> Result<f32> {
        match &self.node(id)?.kind {
            NodeKind::Inline(inline) => {
                let mut baseline = inline.baseline;
                for child in inline.children() {
                    if let Some(nested) = child.box_id() {
                        baseline = baseline.max(self.max_baseline(nested)?);
                    }
                }
                Ok(baseline)
            }
            NodeKind::Replaced(replaced) => Ok(replaced.height),
            NodeKind::Block(_) | NodeKind::Line(_) => Ok(0.0),
        }
    }

    /// Place `id` at line offset `cursor` and return the offset after it.
    fn pack_box(&mut self, id: BoxId, cursor: f32, line_baseline: f32) -> Result<f32> {
        match &self.node(id)?.kind {
            NodeKind::Replaced(replaced) => {
                let (width, height) = (replaced.width, replaced.height);
                self.set_position(id, cursor, line_baseline - height)?;
                Ok(cursor + width)
            }
            NodeKind::Inline(inline) => {
                let y = line_baseline - inline.baseline;
                let end = cursor + inline.inline_width;
                let start = cursor + inline.left_margin_border_padding();
                let len = inline.children().len();
                self.set_position(id, cursor, y)?;

                let mut inner = start;
                for index in 0..len {
                    let nested = match &mut self.inline_mut(id)?.children_mut()[index] {
                        InlineChild::Text(run) => {
                            run.x = inner - cursor;
                            inner += run.width;
                            None
                        }
                        InlineChild::Inline(child) | InlineChild::Replaced(child) => Some(*child),
                    };
                    if let Some(child) = nested {
                        inner = self.pack_box(child, inner, line_baseline)?;
                    }
                }
                Ok(end)
            }
            NodeKind::Block(_) | NodeKind::Line(_) => Ok(cursor),
        }
    }
}
