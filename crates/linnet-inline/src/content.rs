//! Content queries, dynamic content and debug dumps.
//!
//! Read-mostly walks over an inline subtree: does it hold anything
//! visible, what is its last piece of text, what text would it export.
//! Dynamic runs (counters, leaders) are re-evaluated here too.

use std::fmt;

use strum_macros::{Display, EnumString};

use crate::error::{InlineError, Result};
use crate::font::FontMetricsProvider;
use crate::inline_box::InlineChild;
use crate::text::{ContentFunction, DynamicContentResolver, TextRun};
use crate::tree::{BoxId, BoxTree, ElementRef, NodeKind};

/// Which view of the tree a dump shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DumpMode {
    /// Painted geometry: positions, sizes and text.
    Render,
    /// Layout-time state. Inline boxes do not provide this view.
    Layout,
}

/// Outcome of a tail-first search for trailing text.
enum TrailingText<'a> {
    Run(&'a TextRun),
    /// Only empty runs were passed.
    Empty,
    /// A replaced box, or a box with no children, ends the search.
    Blocked,
}

impl BoxTree {
    /// Whether `id` holds a non-empty text run, a replaced box with a
    /// positive size, or a nested box that does.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn contains_visible_content(&self, id: BoxId) -> Result<bool> {
        for child in self.inline(id)?.children() {
            let visible = match child {
                InlineChild::Text(run) => !run.is_empty(),
                InlineChild::Inline(nested) => self.contains_visible_content(*nested)?,
                InlineChild::Replaced(replaced) => {
                    let replaced = self.replaced(*replaced)?;
                    replaced.width > 0.0 || replaced.height > 0.0
                }
            };
            if visible {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether every child of `id` is a text run.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn is_all_text(&self, id: BoxId) -> Result<bool> {
        Ok(self
            .inline(id)?
            .children()
            .iter()
            .all(|child| matches!(child, InlineChild::Text(_))))
    }

    /// Whether `id` paints anything besides its text: decorations, a
    /// background or a border.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn has_non_text_content(&self, id: BoxId) -> Result<bool> {
        let inline = self.inline(id)?;
        let style = inline.style();
        let border = style.border;
        let has_border = border.top > 0.0
            || border.bottom > 0.0
            || (inline.starts_here && border.left > 0.0)
            || (inline.ends_here && border.right > 0.0);
        Ok(!inline.text_decorations().is_empty()
            || style.background_color.is_some_and(|color| color.a > 0)
            || has_border)
    }

    /// The last non-empty text run under `id`.
    ///
    /// Children are searched from the end. A nested inline box is searched
    /// the same way; the search only moves on past it when it holds nothing
    /// but empty runs. A replaced box ends the search: text before it is
    /// not trailing.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn find_trailing_text(&self, id: BoxId) -> Result<Option<&TextRun>> {
        Ok(match self.trailing_text(id)? {
            TrailingText::Run(run) => Some(run),
            TrailingText::Empty | TrailingText::Blocked => None,
        })
    }

    fn trailing_text(&self, id: BoxId) -> Result<TrailingText<'_>> {
        let children = self.inline(id)?.children();
        if children.is_empty() {
            return Ok(TrailingText::Blocked);
        }
        for child in children.iter().rev() {
            match child {
                InlineChild::Text(run) if !run.is_empty() => return Ok(TrailingText::Run(run)),
                InlineChild::Text(_) => {}
                InlineChild::Inline(nested) => match self.trailing_text(*nested)? {
                    TrailingText::Empty => {}
                    found => return Ok(found),
                },
                InlineChild::Replaced(_) => return Ok(TrailingText::Blocked),
            }
        }
        Ok(TrailingText::Empty)
    }

    /// Append the export text of `id` and its descendants to `buffer`, in
    /// source order.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn collect_text(&self, id: BoxId, buffer: &mut String) -> Result<()> {
        for child in self.inline(id)?.children() {
            match child {
                InlineChild::Text(run) => buffer.push_str(run.export_text()),
                InlineChild::Inline(nested) => self.collect_text(*nested, buffer)?,
                InlineChild::Replaced(_) => {}
            }
        }
        Ok(())
    }

    /// Re-evaluate every dynamic text run under `id`.
    ///
    /// [§ 4 Leaders](https://www.w3.org/TR/css-gcpm-3/#leaders)
    ///
    /// Leaders fill whatever space is left on the line, so two leaders on
    /// one line cannot both be evaluated. With `evaluate_leaders` false they
    /// keep their current text.
    ///
    /// Returns how many runs changed.
    ///
    /// # Errors
    ///
    /// [`InlineError::InvalidArgument`] if `id` is not an inline box.
    pub fn look_for_dynamic_functions(
        &mut self,
        id: BoxId,
        resolver: &dyn DynamicContentResolver,
        metrics: &dyn FontMetricsProvider,
        evaluate_leaders: bool,
    ) -> Result<usize> {
        let mut changed = 0;
        let mut nested = Vec::new();
        {
            let _ = self.inline(id)?;
            let NodeKind::Inline(inline) = &mut self.node_mut(id)?.kind else {
                return Err(InlineError::UnknownBox(id));
            };
            let style = inline.style().clone();
            for child in inline.children_mut() {
                match child {
                    InlineChild::Text(run) => {
                        let skip = !evaluate_leaders
                            && run.dynamic_function().is_some_and(ContentFunction::is_leader);
                        if !skip && run.update_dynamic_value(resolver, &style, metrics) {
                            changed += 1;
                        }
                    }
                    InlineChild::Inline(child) => nested.push(*child),
                    InlineChild::Replaced(_) => {}
                }
            }
        }
        for child in nested {
            changed += self.look_for_dynamic_functions(child, resolver, metrics, evaluate_leaders)?;
        }
        Ok(changed)
    }

    /// Indented text dump of the subtree rooted at inline box `id`.
    ///
    /// One line per box and per text run, children indented two spaces
    /// deeper than their parent. No trailing newline.
    ///
    /// # Errors
    ///
    /// [`InlineError::UnsupportedDumpMode`] for any mode but
    /// [`DumpMode::Render`], [`InlineError::InvalidArgument`] if `id` is
    /// not an inline box.
    pub fn dump(&self, id: BoxId, indent: &str, mode: DumpMode) -> Result<String> {
        if mode != DumpMode::Render {
            return Err(InlineError::UnsupportedDumpMode(mode));
        }
        let inline = self.inline(id)?;
        let mut lines = vec![format!("{indent}{}", self.describe(id)?)];
        let child_indent = format!("{indent}  ");
        for child in inline.children() {
            match child {
                InlineChild::Inline(nested) => {
                    lines.push(self.dump(*nested, &child_indent, mode)?);
                }
                InlineChild::Replaced(replaced) => {
                    lines.push(format!("{child_indent}{}", self.describe(*replaced)?));
                }
                InlineChild::Text(run) => lines.push(format!("{child_indent}{run}")),
            }
        }
        Ok(lines.join("\n"))
    }

    /// One-line description of a box, as used by [`BoxTree::dump`].
    ///
    /// # Errors
    ///
    /// [`InlineError::UnknownBox`] for a foreign handle.
    pub fn describe(&self, id: BoxId) -> Result<String> {
        let node = self.node(id)?;
        let tag = |element: ElementRef| {
            self.element(element).map_or_else(
                || "(anonymous)".to_string(),
                |source| format!("<{}>", source.tag_name),
            )
        };
        Ok(match &node.kind {
            NodeKind::Inline(inline) => {
                let name = inline.element().map_or_else(|| "(anonymous)".to_string(), tag);
                let edges = match (inline.starts_here, inline.ends_here) {
                    (true, true) => " (SE)",
                    (true, false) => " (S)",
                    (false, true) => " (E)",
                    (false, false) => "",
                };
                format!(
                    "InlineBox: {name}{edges} (baseline={}) ({},{})->({} x {})",
                    inline.baseline, node.abs_x, node.abs_y, inline.inline_width, inline.height
                )
            }
            NodeKind::Replaced(replaced) => {
                let name = replaced.element.map_or_else(|| "(anonymous)".to_string(), tag);
                format!(
                    "ReplacedBox: {name} ({},{})->({} x {})",
                    node.abs_x, node.abs_y, replaced.width, replaced.height
                )
            }
            NodeKind::Line(line) => format!(
                "LineBox: ({},{}) {} children",
                node.abs_x,
                node.abs_y,
                line.children.len()
            ),
            NodeKind::Block(block) => {
                let name = if block.anonymous {
                    "(anonymous)".to_string()
                } else {
                    block.element.map_or_else(|| "(anonymous)".to_string(), tag)
                };
                format!("BlockBox: {name} ({},{})", node.abs_x, node.abs_y)
            }
        })
    }

    /// A [`fmt::Display`] adapter that renders [`BoxTree::dump`] in
    /// [`DumpMode::Render`].
    #[must_use]
    pub const fn display(&self, id: BoxId) -> DisplayBox<'_> {
        DisplayBox { tree: self, id }
    }
}

/// Returned by [`BoxTree::display`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayBox<'a> {
    tree: &'a BoxTree,
    id: BoxId,
}

impl fmt::Display for DisplayBox<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.dump(self.id, "", DumpMode::Render) {
            Ok(dump) => f.write_str(&dump),
            Err(err) => write!(f, "<{err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LayoutContext;
    use crate::font::ApproximateFontMetrics;
    use crate::style::InlineStyle;
    use crate::tree::ReplacedBox;

    struct Fixed;

    impl DynamicContentResolver for Fixed {
        fn evaluate(&self, function: &ContentFunction) -> Option<String> {
            Some(match function {
                ContentFunction::Leader { .. } => "....".to_string(),
                _ => "7".to_string(),
            })
        }
    }

    fn span_with(
        tree: &mut BoxTree,
        ctx: &mut LayoutContext<'_>,
        children: Vec<InlineChild>,
    ) -> BoxId {
        let id = tree.create_inline_box(ctx, None, InlineStyle::default(), 100.0);
        for child in children {
            match child {
                InlineChild::Text(run) => tree.append_child(ctx, id, run, true).unwrap(),
                InlineChild::Inline(child) | InlineChild::Replaced(child) => {
                    tree.append_child(ctx, id, child, false).unwrap();
                }
            }
        }
        id
    }

    #[test]
    fn test_trailing_text_skips_empty_runs() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let inner = span_with(&mut tree, &mut ctx, vec![InlineChild::Text(TextRun::new("", 0.0))]);
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![
                InlineChild::Text(TextRun::new("last", 4.0)),
                InlineChild::Inline(inner),
                InlineChild::Text(TextRun::new("", 0.0)),
            ],
        );
        assert_eq!(tree.find_trailing_text(outer).unwrap().unwrap().text(), "last");
    }

    #[test]
    fn test_trailing_text_stops_at_replaced_box() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let img = tree.create_replaced(ReplacedBox::new(None, 0.0, 0.0));
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![InlineChild::Text(TextRun::new("before", 6.0)), InlineChild::Replaced(img)],
        );
        assert!(tree.find_trailing_text(outer).unwrap().is_none());
        assert!(tree.contains_visible_content(img).is_err());
        assert!(tree.contains_visible_content(outer).unwrap());
        assert!(!tree.is_all_text(outer).unwrap());
    }

    #[test]
    fn test_replaced_box_in_nested_span_ends_search() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let img = tree.create_replaced(ReplacedBox::new(None, 5.0, 5.0));
        let inner = span_with(&mut tree, &mut ctx, vec![InlineChild::Replaced(img)]);
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![InlineChild::Text(TextRun::new("before", 6.0)), InlineChild::Inline(inner)],
        );
        assert!(tree.find_trailing_text(outer).unwrap().is_none());
    }

    #[test]
    fn test_empty_box_has_no_visible_content() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let img = tree.create_replaced(ReplacedBox::new(None, 0.0, 0.0));
        let inner = span_with(&mut tree, &mut ctx, vec![InlineChild::Text(TextRun::new("", 0.0))]);
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![InlineChild::Inline(inner), InlineChild::Replaced(img)],
        );
        assert!(!tree.contains_visible_content(outer).unwrap());
        assert!(!tree.has_non_text_content(outer).unwrap());
    }

    #[test]
    fn test_collect_text_in_source_order() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let inner = span_with(&mut tree, &mut ctx, vec![InlineChild::Text(TextRun::new("b", 1.0))]);
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![
                InlineChild::Text(TextRun::new("a", 1.0)),
                InlineChild::Inline(inner),
                InlineChild::Text(TextRun::new("c", 1.0)),
            ],
        );
        let mut text = String::new();
        tree.collect_text(outer, &mut text).unwrap();
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_leaders_skipped_on_request() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let leader = TextRun::dynamic(ContentFunction::Leader { fill: ".".to_string() }, "", 0.0);
        let counter = TextRun::dynamic(
            ContentFunction::Counter {
                name: "page".to_string(),
            },
            "0",
            9.6,
        );
        let inner = span_with(&mut tree, &mut ctx, vec![InlineChild::Text(counter)]);
        let outer = span_with(
            &mut tree,
            &mut ctx,
            vec![InlineChild::Text(leader), InlineChild::Inline(inner)],
        );

        let changed = tree
            .look_for_dynamic_functions(outer, &Fixed, &metrics, false)
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(tree.child(outer, 0).unwrap().as_text().unwrap().text(), "");

        let changed = tree
            .look_for_dynamic_functions(outer, &Fixed, &metrics, true)
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(tree.child(outer, 0).unwrap().as_text().unwrap().text(), "....");
    }

    #[test]
    fn test_dump_format_and_mode() {
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut tree = BoxTree::new();
        let span = tree.add_element("span", None);
        let id = tree.create_inline_box(&mut ctx, Some(span), InlineStyle::default(), 100.0);
        tree.append_child(&mut ctx, id, TextRun::new("hi", 19.2), true)
            .unwrap();
        tree.inline_mut(id).unwrap().ends_here = true;

        let dump = tree.dump(id, "", DumpMode::Render).unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("InlineBox: <span> (SE) (baseline=12.8)"));
        assert!(lines[1].starts_with("  TextRun: \"hi\""));
        assert_eq!(tree.display(id).to_string(), dump);

        let err = tree.dump(id, "", DumpMode::Layout).unwrap_err();
        assert_eq!(err, InlineError::UnsupportedDumpMode(DumpMode::Layout));
        assert!(err.is_invalid_argument());
    }
}
