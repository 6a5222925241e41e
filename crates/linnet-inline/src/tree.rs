//! Arena-based box tree.
//!
//! Every box (block, line, inline and replaced) lives in one contiguous
//! vector and is addressed by a [`BoxId`]. Parent links and child lists are
//! indices, so walking up from an inline fragment to its line box and
//! containing block is O(1) per step and never fights the borrow checker.
//!
//! The block and line layers here are a thin skeleton. Block layout owns
//! the real algorithms; the inline engine only needs to ask "which line am I
//! on", "which block holds that line" and "what comes after this block".

use std::fmt;

use serde::Serialize;

use crate::error::{InlineError, Result};
use crate::inline_box::{InlineBox, InlineChild};

/// A type-safe index into the box tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId(pub usize);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A handle to a source element registered with [`BoxTree::add_element`].
///
/// Two fragments belong to the same element iff their handles are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementRef(pub usize);

/// The parts of a source element the inline engine looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceElement {
    /// Element name, e.g. `span`.
    pub tag_name: String,
    /// Value of the `id` attribute, if present.
    pub id: Option<String>,
}

/// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
///
/// A containing block. Its children are line boxes and nested blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockBox {
    /// Source element, `None` for anonymous blocks.
    pub element: Option<ElementRef>,
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "When an inline box contains an in-flow block-level box, the inline
    /// box (and its inline ancestors within the same line box) are broken
    /// around the block-level box ... The line boxes before the break and
    /// after the break are enclosed in anonymous block boxes."
    pub anonymous: bool,
    /// Line boxes and blocks, in document order.
    pub children: Vec<BoxId>,
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
#[derive(Debug, Clone, Default)]
pub struct LineBox {
    /// Top-level inline and replaced boxes on this line.
    pub children: Vec<BoxId>,
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// An opaque box (image, inline-block) placed on a line. The inline engine
/// only positions it, hit-tests its rectangle and asks the output device to
/// draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacedBox {
    /// Source element, if any.
    pub element: Option<ElementRef>,
    /// Used width.
    pub width: f32,
    /// Used height.
    pub height: f32,
    /// Whether the box is rendered.
    pub visible: bool,
}

impl ReplacedBox {
    /// A visible replaced box of the given size.
    #[must_use]
    pub const fn new(element: Option<ElementRef>, width: f32, height: f32) -> Self {
        Self {
            element,
            width,
            height,
            visible: true,
        }
    }
}

/// What a [`Node`] is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A containing block.
    Block(BlockBox),
    /// A line box.
    Line(LineBox),
    /// An inline box fragment.
    Inline(InlineBox),
    /// An opaque replaced box.
    Replaced(ReplacedBox),
}

/// One box in the arena.
///
/// `x`/`y` are local: relative to the containing block for lines and blocks,
/// and relative to the enclosing line box for inline and replaced boxes.
/// `abs_x`/`abs_y` are derived by [`BoxTree::calc_canvas_location`] and are
/// never authoritative.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent box, `None` for roots and detached boxes.
    pub parent: Option<BoxId>,
    /// Local horizontal position.
    pub x: f32,
    /// Local vertical position.
    pub y: f32,
    /// Absolute horizontal position on the canvas.
    pub abs_x: f32,
    /// Absolute vertical position on the canvas.
    pub abs_y: f32,
    /// Kind-specific data.
    pub kind: NodeKind,
}

impl Node {
    const fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            x: 0.0,
            y: 0.0,
            abs_x: 0.0,
            abs_y: 0.0,
            kind,
        }
    }

    /// The source element of a block, inline or replaced box.
    #[must_use]
    pub const fn element(&self) -> Option<ElementRef> {
        match &self.kind {
            NodeKind::Block(block) => block.element,
            NodeKind::Inline(inline) => inline.element(),
            NodeKind::Replaced(replaced) => replaced.element,
            NodeKind::Line(_) => None,
        }
    }

    /// Short kind name, for messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Block(_) => "block box",
            NodeKind::Line(_) => "line box",
            NodeKind::Inline(_) => "inline box",
            NodeKind::Replaced(_) => "replaced box",
        }
    }
}

/// Arena of boxes plus the source elements they reference.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    nodes: Vec<Node>,
    elements: Vec<SourceElement>,
}

impl BoxTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of boxes ever allocated (including detached ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no box has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a source element.
    pub fn add_element(&mut self, tag_name: impl Into<String>, id: Option<&str>) -> ElementRef {
        self.elements.push(SourceElement {
            tag_name: tag_name.into(),
            id: id.map(str::to_string),
        });
        ElementRef(self.elements.len() - 1)
    }

    /// Look up a registered source element.
    #[must_use]
    pub fn element(&self, element: ElementRef) -> Option<&SourceElement> {
        self.elements.get(element.0)
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> BoxId {
        self.nodes.push(Node::new(kind));
        BoxId(self.nodes.len() - 1)
    }

    /// Create a detached block box.
    pub fn create_block(&mut self, element: Option<ElementRef>, anonymous: bool) -> BoxId {
        self.alloc(NodeKind::Block(BlockBox {
            element,
            anonymous,
            children: Vec::new(),
        }))
    }

    /// Create a detached line box at local position `(x, y)`.
    pub fn create_line(&mut self, x: f32, y: f32) -> BoxId {
        let id = self.alloc(NodeKind::Line(LineBox::default()));
        self.nodes[id.0].x = x;
        self.nodes[id.0].y = y;
        id
    }

    /// Create a detached replaced box.
    pub fn create_replaced(&mut self, replaced: ReplacedBox) -> BoxId {
        self.alloc(NodeKind::Replaced(replaced))
    }

    /// Append a line or block to a block.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `parent` is not a block, or
    /// `child` is not a detached line or block.
    pub fn append_to_block(&mut self, parent: BoxId, child: BoxId) -> Result<()> {
        let child_node = self.node(child)?;
        if !matches!(child_node.kind, NodeKind::Block(_) | NodeKind::Line(_)) {
            return Err(InlineError::InvalidArgument(format!(
                "a {} cannot be a child of a block box",
                child_node.kind_name()
            )));
        }
        self.ensure_detached(parent, child)?;
        let NodeKind::Block(block) = &mut self.node_mut(parent)?.kind else {
            return Err(self.wrong_kind(parent, "block box"));
        };
        block.children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Append a top-level inline or replaced box to a line.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `line` is not a line box, or
    /// `child` is not a detached inline or replaced box.
    pub fn append_to_line(&mut self, line: BoxId, child: BoxId) -> Result<()> {
        let child_node = self.node(child)?;
        if !matches!(child_node.kind, NodeKind::Inline(_) | NodeKind::Replaced(_)) {
            return Err(InlineError::InvalidArgument(format!(
                "a {} cannot be placed on a line",
                child_node.kind_name()
            )));
        }
        self.ensure_detached(line, child)?;
        let NodeKind::Line(line_box) = &mut self.node_mut(line)?.kind else {
            return Err(self.wrong_kind(line, "line box"));
        };
        line_box.children.push(child);
        self.nodes[child.0].parent = Some(line);
        Ok(())
    }

    /// Reject `child` if it already has a parent or is an ancestor of
    /// `parent` (including `parent` itself).
    pub(crate) fn ensure_detached(&self, parent: BoxId, child: BoxId) -> Result<()> {
        if self.node(child)?.parent.is_some() {
            return Err(InlineError::InvalidArgument(format!(
                "box {child} is already attached to a parent"
            )));
        }
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(InlineError::InvalidArgument(format!(
                    "box {child} cannot be appended inside itself"
                )));
            }
            current = self.node(id)?.parent;
        }
        Ok(())
    }

    pub(crate) fn wrong_kind(&self, id: BoxId, expected: &str) -> InlineError {
        let found = self.nodes.get(id.0).map_or("unknown box", Node::kind_name);
        InlineError::InvalidArgument(format!("box {id} is a {found}, expected a {expected}"))
    }

    /// Borrow a node.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a handle from another tree.
    pub fn node(&self, id: BoxId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(InlineError::UnknownBox(id))
    }

    /// Mutably borrow a node.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a handle from another tree.
    pub fn node_mut(&mut self, id: BoxId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(InlineError::UnknownBox(id))
    }

    /// Borrow an inline box.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn inline(&self, id: BoxId) -> Result<&InlineBox> {
        match &self.node(id)?.kind {
            NodeKind::Inline(inline) => Ok(inline),
            _ => Err(self.wrong_kind(id, "inline box")),
        }
    }

    /// Mutably borrow an inline box.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn inline_mut(&mut self, id: BoxId) -> Result<&mut InlineBox> {
        if !matches!(self.node(id)?.kind, NodeKind::Inline(_)) {
            return Err(self.wrong_kind(id, "inline box"));
        }
        match &mut self.nodes[id.0].kind {
            NodeKind::Inline(inline) => Ok(inline),
            _ => Err(InlineError::UnknownBox(id)),
        }
    }

    /// Borrow a replaced box.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not a replaced box.
    pub fn replaced(&self, id: BoxId) -> Result<&ReplacedBox> {
        match &self.node(id)?.kind {
            NodeKind::Replaced(replaced) => Ok(replaced),
            _ => Err(self.wrong_kind(id, "replaced box")),
        }
    }

    /// Borrow a block box.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not a block box.
    pub fn block(&self, id: BoxId) -> Result<&BlockBox> {
        match &self.node(id)?.kind {
            NodeKind::Block(block) => Ok(block),
            _ => Err(self.wrong_kind(id, "block box")),
        }
    }

    /// Parent of a box.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn parent(&self, id: BoxId) -> Result<Option<BoxId>> {
        Ok(self.node(id)?.parent)
    }

    /// Child boxes of any node, in order. Text runs are not boxes and are
    /// skipped.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn child_boxes(&self, id: BoxId) -> Result<Vec<BoxId>> {
        Ok(match &self.node(id)?.kind {
            NodeKind::Block(block) => block.children.clone(),
            NodeKind::Line(line) => line.children.clone(),
            NodeKind::Inline(inline) => inline
                .children()
                .iter()
                .filter_map(InlineChild::box_id)
                .collect(),
            NodeKind::Replaced(_) => Vec::new(),
        })
    }

    /// The line box enclosing `id`, found by walking up the parent chain.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn line_box_of(&self, id: BoxId) -> Result<Option<BoxId>> {
        let mut current = self.node(id)?.parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor)?;
            if matches!(node.kind, NodeKind::Line(_)) {
                return Ok(Some(ancestor));
            }
            current = node.parent;
        }
        Ok(None)
    }

    /// The containing block of a line box: its parent block.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `line` is not a line box.
    pub fn containing_block_of(&self, line: BoxId) -> Result<Option<BoxId>> {
        let node = self.node(line)?;
        if !matches!(node.kind, NodeKind::Line(_)) {
            return Err(self.wrong_kind(line, "line box"));
        }
        Ok(node.parent)
    }

    /// Every box inside `container` generated by `element`, in document
    /// order. Each match is followed by the matches nested inside it.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn element_boxes(&self, container: BoxId, element: ElementRef) -> Result<Vec<BoxId>> {
        let mut result = Vec::new();
        for child in self.child_boxes(container)? {
            if self.node(child)?.element() == Some(element) {
                result.push(child);
            }
            result.extend(self.element_boxes(child, element)?);
        }
        Ok(result)
    }

    /// Set the local position of a box.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn set_position(&mut self, id: BoxId, x: f32, y: f32) -> Result<()> {
        let node = self.node_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Move a box by `(dx, dy)` in its local coordinates.
    ///
    /// Absolute positions are not touched; call
    /// [`BoxTree::calc_canvas_location`] afterwards.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn translate(&mut self, id: BoxId, dx: f32, dy: f32) -> Result<()> {
        let node = self.node_mut(id)?;
        node.x += dx;
        node.y += dy;
        Ok(())
    }
}
