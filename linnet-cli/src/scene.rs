//! JSON scene description and tree builder.
//!
//! A scene is what line breaking would hand the inline engine: blocks
//! holding line boxes, each line holding inline and replaced boxes. An
//! element listed on several lines becomes one fragment per line, the later
//! ones built as continuations of the first.
//!
//! ```json
//! {
//!   "elements": { "s": { "tag": "span", "id": "intro" } },
//!   "root": {
//!     "width": 300,
//!     "children": [
//!       { "type": "line", "boxes": [
//!         { "type": "inline", "element": "s", "children": [
//!           { "type": "text", "text": "Hello " }
//!         ] }
//!       ] }
//!     ]
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use linnet_inline::{
    BoxId, BoxTree, ContentFunction, DynamicContentResolver, ElementRef, FontMetricsProvider,
    InlineStyle, LayoutContext, ReplacedBox, TextRun,
};
use serde::Deserialize;

/// A whole scene file.
#[derive(Debug, Deserialize)]
pub struct Scene {
    /// Source elements by key.
    #[serde(default)]
    pub elements: BTreeMap<String, ElementDef>,
    /// Current `counter()` values by counter name.
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
    /// Page numbers of `target-counter()` targets by element id.
    #[serde(default)]
    pub targets: BTreeMap<String, i64>,
    /// The outermost block.
    pub root: BlockDef,
}

/// A source element.
#[derive(Debug, Deserialize)]
pub struct ElementDef {
    /// Element name.
    pub tag: String,
    /// `id` attribute.
    #[serde(default)]
    pub id: Option<String>,
}

/// A block box.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockDef {
    /// Element key; absent for anonymous blocks.
    pub element: Option<String>,
    /// Whether this block is an anonymous continuation block.
    pub anonymous: bool,
    /// Offset from the parent block.
    pub x: f32,
    /// Offset from the parent block.
    pub y: f32,
    /// Width percentages on this block's lines resolve against.
    pub width: f32,
    /// Lines and nested blocks.
    pub children: Vec<BlockChild>,
}

/// A child of a block.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockChild {
    /// A nested block.
    Block(BlockDef),
    /// A line box.
    Line(LineDef),
}

/// A line box.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LineDef {
    /// Offset from the containing block.
    pub x: f32,
    /// Offset from the containing block.
    pub y: f32,
    /// Top-level boxes, left to right.
    pub boxes: Vec<LineItem>,
}

/// A top-level box on a line.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    /// An inline box.
    Inline(InlineDef),
    /// A replaced box.
    Replaced(ReplacedDef),
}

/// One inline box fragment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InlineDef {
    /// Element key; absent for anonymous boxes.
    pub element: Option<String>,
    /// Computed style. Ignored for continuation fragments, which share the
    /// style of the element's first fragment.
    pub style: InlineStyle,
    /// Whether this fragment closes its element.
    pub ends_here: bool,
    /// Content, in source order.
    pub children: Vec<InlineItem>,
}

/// A child of an inline box.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineItem {
    /// A text run.
    Text(TextDef),
    /// A nested inline box.
    Inline(InlineDef),
    /// A replaced box.
    Replaced(ReplacedDef),
}

/// A text run.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextDef {
    /// Characters, or the placeholder of a dynamic run.
    pub text: String,
    /// Advance width; measured with the box's font when absent.
    pub width: Option<f32>,
    /// Content function generating the run.
    pub content: Option<ContentFunction>,
}

/// A replaced box.
#[derive(Debug, Deserialize)]
pub struct ReplacedDef {
    /// Element key.
    #[serde(default)]
    pub element: Option<String>,
    /// Intrinsic width.
    pub width: f32,
    /// Intrinsic height.
    pub height: f32,
    /// Used width, `auto` when absent.
    #[serde(default)]
    pub used_width: Option<f32>,
    /// Used height, `auto` when absent.
    #[serde(default)]
    pub used_height: Option<f32>,
    /// Whether the box is rendered.
    #[serde(default = "visible")]
    pub visible: bool,
}

const fn visible() -> bool {
    true
}

impl ReplacedDef {
    /// Used size from the intrinsic size and the optional used sizes.
    ///
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "If 'height' and 'width' both have computed values of 'auto' and the
    /// element has an intrinsic ratio ... the used value of 'width' is:
    /// (used height) * (intrinsic ratio)"
    fn used_size(&self) -> (f32, f32) {
        match (self.used_width, self.used_height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.width > 0.0 => (w, (self.height * w / self.width).floor()),
            (None, Some(h)) if self.height > 0.0 => ((self.width * h / self.height).floor(), h),
            (Some(w), None) => (w, self.height),
            (None, Some(h)) => (self.width, h),
            (None, None) => (self.width, self.height),
        }
    }
}

impl TextDef {
    fn to_run(&self, style: &InlineStyle, metrics: &dyn FontMetricsProvider) -> TextRun {
        let width = self
            .width
            .unwrap_or_else(|| metrics.text_width(&self.text, style));
        match &self.content {
            Some(function) => TextRun::dynamic(function.clone(), self.text.clone(), width),
            None => TextRun::new(self.text.clone(), width),
        }
    }
}

impl DynamicContentResolver for Scene {
    fn evaluate(&self, function: &ContentFunction) -> Option<String> {
        match function {
            ContentFunction::Counter { name } => self.counters.get(name).map(ToString::to_string),
            ContentFunction::TargetCounter { target, .. } => {
                self.targets.get(target).map(ToString::to_string)
            }
            // Leaders need the finished line width.
            ContentFunction::Leader { .. } => None,
        }
    }
}

/// The tree built from a [`Scene`].
#[derive(Debug)]
pub struct BuiltScene {
    /// The box tree.
    pub tree: BoxTree,
    /// The root block.
    pub root: BoxId,
    /// Every line box, in document order.
    pub lines: Vec<BoxId>,
    /// Every inline box fragment, in document order.
    pub inline_boxes: Vec<BoxId>,
}

/// Build the box tree for `scene`.
///
/// Text confirms the fragments around it as it is appended, so empty
/// fragments stay pending for the prune pass to remove.
pub fn build(scene: &Scene, ctx: &mut LayoutContext<'_>) -> Result<BuiltScene> {
    let mut tree = BoxTree::new();
    let mut elements = HashMap::new();
    for (key, def) in &scene.elements {
        let element = tree.add_element(def.tag.as_str(), def.id.as_deref());
        let _ = elements.insert(key.as_str(), element);
    }

    let mut builder = Builder {
        tree,
        elements,
        fragments: HashMap::new(),
        lines: Vec::new(),
        inline_boxes: Vec::new(),
    };
    let root = builder.block(ctx, &scene.root)?;
    log::info!(
        "built {} boxes: {} lines, {} inline fragments",
        builder.tree.len(),
        builder.lines.len(),
        builder.inline_boxes.len()
    );

    Ok(BuiltScene {
        tree: builder.tree,
        root,
        lines: builder.lines,
        inline_boxes: builder.inline_boxes,
    })
}

struct Builder<'s> {
    tree: BoxTree,
    elements: HashMap<&'s str, ElementRef>,
    /// Latest fragment of each element.
    fragments: HashMap<ElementRef, BoxId>,
    lines: Vec<BoxId>,
    inline_boxes: Vec<BoxId>,
}

impl Builder<'_> {
    fn element(&self, key: Option<&str>) -> Result<Option<ElementRef>> {
        key.map(|key| {
            self.elements
                .get(key)
                .copied()
                .with_context(|| format!("unknown element '{key}'"))
        })
        .transpose()
    }

    fn block(&mut self, ctx: &mut LayoutContext<'_>, def: &BlockDef) -> Result<BoxId> {
        let element = self.element(def.element.as_deref())?;
        let block = self.tree.create_block(element, def.anonymous);
        self.tree.set_position(block, def.x, def.y)?;
        for child in &def.children {
            let id = match child {
                BlockChild::Block(nested) => self.block(ctx, nested)?,
                BlockChild::Line(line) => self.line(ctx, line, def.width)?,
            };
            self.tree.append_to_block(block, id)?;
        }
        Ok(block)
    }

    fn line(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        def: &LineDef,
        containing_block_width: f32,
    ) -> Result<BoxId> {
        let line = self.tree.create_line(def.x, def.y);
        self.lines.push(line);
        for item in &def.boxes {
            let id = match item {
                LineItem::Inline(inline) => self.inline(ctx, inline, containing_block_width)?,
                LineItem::Replaced(replaced) => self.replaced(replaced)?,
            };
            self.tree.append_to_line(line, id)?;
        }
        Ok(line)
    }

    fn inline(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        def: &InlineDef,
        containing_block_width: f32,
    ) -> Result<BoxId> {
        let element = self.element(def.element.as_deref())?;
        let id = match element.and_then(|element| self.fragments.get(&element).copied()) {
            Some(previous) => self.tree.continuation_of(previous)?,
            None => self.tree.create_inline_box(
                ctx,
                element,
                def.style.clone(),
                containing_block_width,
            ),
        };
        if let Some(element) = element {
            let _ = self.fragments.insert(element, id);
        }
        self.inline_boxes.push(id);

        for child in &def.children {
            match child {
                InlineItem::Text(text) => {
                    let run = text.to_run(self.tree.inline(id)?.style(), ctx.font_metrics());
                    let confirm = !run.is_empty();
                    self.tree.append_child(ctx, id, run, confirm)?;
                }
                InlineItem::Inline(nested) => {
                    let child = self.inline(ctx, nested, containing_block_width)?;
                    let confirm = !self.tree.inline(child)?.is_pending();
                    self.tree.append_child(ctx, id, child, confirm)?;
                }
                InlineItem::Replaced(replaced) => {
                    let child = self.replaced(replaced)?;
                    self.tree.append_child(ctx, id, child, true)?;
                }
            }
        }
        self.tree.inline_mut(id)?.ends_here = def.ends_here;
        Ok(id)
    }

    fn replaced(&mut self, def: &ReplacedDef) -> Result<BoxId> {
        let element = self.element(def.element.as_deref())?;
        let (width, height) = def.used_size();
        let mut replaced = ReplacedBox::new(element, width, height);
        replaced.visible = def.visible;
        Ok(self.tree.create_replaced(replaced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linnet_inline::ApproximateFontMetrics;

    const WRAPPED: &str = r#"{
        "elements": { "s": { "tag": "span", "id": "intro" } },
        "counters": { "page": 4 },
        "root": {
            "width": 300,
            "children": [
                { "type": "line", "boxes": [
                    { "type": "inline", "element": "s", "children": [
                        { "type": "text", "text": "one " },
                        { "type": "text", "text": "", "content": { "counter": { "name": "page" } } }
                    ] }
                ] },
                { "type": "line", "y": 20, "boxes": [
                    { "type": "inline", "element": "s", "ends_here": true, "children": [
                        { "type": "text", "text": "two", "width": 30 }
                    ] },
                    { "type": "replaced", "width": 40, "height": 20, "used_height": 10 }
                ] }
            ]
        }
    }"#;

    #[test]
    fn test_later_fragments_are_continuations() {
        let scene: Scene = serde_json::from_str(WRAPPED).unwrap();
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let built = build(&scene, &mut ctx).unwrap();

        assert_eq!(built.lines.len(), 2);
        let [first, second] = built.inline_boxes[..] else {
            panic!("expected two fragments, got {:?}", built.inline_boxes);
        };
        let first = built.tree.inline(first).unwrap();
        let second = built.tree.inline(second).unwrap();
        assert_eq!(first.element(), second.element());
        assert!(first.starts_here && !first.ends_here);
        assert!(!second.starts_here && second.ends_here);
        assert_eq!(ctx.box_ids.get("intro"), Some(built.inline_boxes[0]));
    }

    #[test]
    fn test_replaced_boxes_keep_ratio() {
        let scene: Scene = serde_json::from_str(WRAPPED).unwrap();
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let built = build(&scene, &mut ctx).unwrap();
        let img = built.tree.child_boxes(built.lines[1]).unwrap()[1];
        let img = built.tree.replaced(img).unwrap();
        assert!((img.width - 20.0).abs() < f32::EPSILON);
        assert!((img.height - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_used_size_follows_intrinsic_ratio() {
        let def = |used_width, used_height| ReplacedDef {
            element: None,
            width: 200.0,
            height: 100.0,
            used_width,
            used_height,
            visible: true,
        };
        let close = |(w, h): (f32, f32), (ew, eh): (f32, f32)| {
            (w - ew).abs() < f32::EPSILON && (h - eh).abs() < f32::EPSILON
        };
        assert!(close(def(Some(50.0), None).used_size(), (50.0, 25.0)));
        assert!(close(def(None, Some(10.0)).used_size(), (20.0, 10.0)));
        assert!(close(def(Some(7.0), Some(3.0)).used_size(), (7.0, 3.0)));
        assert!(close(def(None, None).used_size(), (200.0, 100.0)));
    }

    #[test]
    fn test_counters_resolve_from_scene() {
        let scene: Scene = serde_json::from_str(WRAPPED).unwrap();
        let page = ContentFunction::Counter {
            name: "page".to_string(),
        };
        assert_eq!(scene.evaluate(&page).as_deref(), Some("4"));
        let leader = ContentFunction::Leader {
            fill: ".".to_string(),
        };
        assert_eq!(scene.evaluate(&leader), None);
    }

    #[test]
    fn test_unknown_element_is_an_error() {
        let scene: Scene = serde_json::from_str(
            r#"{ "root": { "children": [ { "type": "line", "boxes": [
                { "type": "inline", "element": "missing" }
            ] } ] } }"#,
        )
        .unwrap();
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let err = build(&scene, &mut ctx).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
