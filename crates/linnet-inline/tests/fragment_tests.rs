//! Integration tests for inline fragments: edge ownership, the pending
//! lifecycle and pruning.

use linnet_inline::{
    ApproximateFontMetrics, BoxTree, EdgeSizes, InlineChild, InlineStyle, LayoutContext, Rect,
    TextRun, UnresolvedEdgeSizes,
};
use quickcheck_macros::quickcheck;

// ---------------------------------------------------------------------------
// Edge ownership
//
// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//
// "When an inline box is split, margins, borders, and padding have no
// visual effect where the split occurs"
// ---------------------------------------------------------------------------

fn edged_style(margin: (u8, u8), border: (u8, u8), padding: (u8, u8)) -> InlineStyle {
    InlineStyle {
        margin: UnresolvedEdgeSizes::px(0.0, f32::from(margin.1), 0.0, f32::from(margin.0)),
        border: EdgeSizes::new(0.0, f32::from(border.1), 0.0, f32::from(border.0)),
        padding: UnresolvedEdgeSizes::px(0.0, f32::from(padding.1), 0.0, f32::from(padding.0)),
        ..InlineStyle::default()
    }
}

#[quickcheck]
fn prop_owned_edges_sum_to_single_box(
    margin: (u8, u8),
    border: (u8, u8),
    padding: (u8, u8),
    fragments: u8,
) -> bool {
    let count = usize::from(fragments % 5) + 1;
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let span = tree.add_element("span", None);
    let style = edged_style(margin, border, padding);

    let whole = tree.create_inline_box(&mut ctx, Some(span), style.clone(), 300.0);
    {
        let whole = tree.inline_mut(whole).unwrap();
        whole.starts_here = true;
        whole.ends_here = true;
    }
    let whole = tree.inline(whole).unwrap();
    let expected = whole.left_margin_border_padding() + whole.right_margin_border_padding();

    let first = tree.create_inline_box(&mut ctx, Some(span), style, 300.0);
    let mut ids = vec![first];
    for _ in 1..count {
        let previous = *ids.last().unwrap();
        ids.push(tree.continuation_of(previous).unwrap());
    }
    tree.inline_mut(ids[0]).unwrap().starts_here = true;
    tree.inline_mut(ids[count - 1]).unwrap().ends_here = true;

    let mut total = 0.0;
    for (index, &id) in ids.iter().enumerate() {
        let fragment = tree.inline(id).unwrap();
        let owned = fragment.left_margin_border_padding() + fragment.right_margin_border_padding();
        if index != 0 && index != count - 1 && owned.abs() > f32::EPSILON {
            return false;
        }
        total += owned;
    }
    (total - expected).abs() < 1e-3
}

#[quickcheck]
fn prop_edges_nest(
    margin: (u8, u8),
    border: (u8, u8),
    padding: (u8, u8),
    starts: bool,
    ends: bool,
) -> bool {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let id = tree.create_inline_box(&mut ctx, None, edged_style(margin, border, padding), 300.0);
    let inline = tree.inline_mut(id).unwrap();
    inline.starts_here = starts;
    inline.ends_here = ends;
    inline.inline_width = 2000.0;

    let margin_edge = inline.margin_edge(5.0, 40.0, 0.0, 0.0);
    let border_edge = inline.border_edge(5.0, 40.0);
    let content_edge = inline.content_area_edge(5.0, 40.0);
    margin_edge.encloses(&border_edge) && border_edge.encloses(&content_edge)
}

#[test]
fn test_split_element_margins() {
    // A starts the element, A' ends it: margin-left 4, margin-right 6.
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let span = tree.add_element("span", None);
    let style = InlineStyle {
        margin: UnresolvedEdgeSizes::px(0.0, 6.0, 0.0, 4.0),
        ..InlineStyle::default()
    };
    let a = tree.create_inline_box(&mut ctx, Some(span), style, 300.0);
    let a_prime = tree.continuation_of(a).unwrap();
    {
        let a = tree.inline_mut(a).unwrap();
        a.starts_here = true;
        a.inline_width = 50.0;
    }
    {
        let a_prime = tree.inline_mut(a_prime).unwrap();
        a_prime.ends_here = true;
        a_prime.inline_width = 50.0;
    }

    let a_edge = tree.inline(a).unwrap().border_edge(0.0, 0.0);
    let a_prime_edge = tree.inline(a_prime).unwrap().border_edge(0.0, 0.0);

    // Nothing is taken off the right of A.
    assert!((a_edge.right() - 50.0).abs() < f32::EPSILON);
    assert!((a_edge.x - 4.0).abs() < f32::EPSILON);
    // A' loses exactly 6 on the right and nothing on the left.
    assert!(a_prime_edge.x.abs() < f32::EPSILON);
    assert!((a_prime_edge.width - 44.0).abs() < f32::EPSILON);
    assert_eq!(a_prime_edge, Rect::new(0.0, 0.0, 44.0, a_prime_edge.height));
}

// ---------------------------------------------------------------------------
// Pending lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_prune_removes_empty_trailing_fragments() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let b = tree.add_element("b", Some("bold"));

    let outer = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    tree.append_child(&mut ctx, outer, TextRun::new("kept", 38.4), true)
        .unwrap();

    // An empty element box opened at the end of the line, with an empty
    // anonymous box inside it.
    let trailing = tree.create_inline_box(&mut ctx, Some(b), InlineStyle::default(), 300.0);
    let nested = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    tree.append_child(&mut ctx, trailing, nested, false).unwrap();
    tree.append_child(&mut ctx, outer, trailing, false).unwrap();
    assert_eq!(ctx.box_ids.get("bold"), Some(trailing));

    tree.prune_pending(&mut ctx, outer).unwrap();

    let children = tree.inline(outer).unwrap().children();
    assert_eq!(children.len(), 1);
    assert!(matches!(children[0], InlineChild::Text(_)));
    assert_eq!(tree.parent(trailing).unwrap(), None);
    assert!(ctx.box_ids.get("bold").is_none());
}

#[test]
fn test_prune_keeps_confirmed_and_interior_content() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();

    let outer = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    let interior = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    let confirmed = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    tree.append_child(&mut ctx, outer, interior, false).unwrap();
    tree.append_child(&mut ctx, outer, confirmed, false).unwrap();
    tree.append_child(&mut ctx, confirmed, TextRun::new("x", 9.6), true)
        .unwrap();

    tree.prune_pending(&mut ctx, outer).unwrap();

    // The confirmed tail stops the scan, so the pending box before it stays.
    assert_eq!(tree.inline(outer).unwrap().children().len(), 2);
    assert!(tree.inline(interior).unwrap().is_pending());
    assert!(!tree.inline(outer).unwrap().is_pending());
}

#[test]
fn test_prune_line_drops_pending_top_level_boxes() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let line = tree.create_line(0.0, 0.0);
    let kept = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    tree.append_child(&mut ctx, kept, TextRun::new("x", 9.6), true)
        .unwrap();
    let dropped = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    tree.append_to_line(line, kept).unwrap();
    tree.append_to_line(line, dropped).unwrap();

    tree.prune_line(&mut ctx, line).unwrap();

    assert_eq!(tree.child_boxes(line).unwrap(), vec![kept]);
    assert_eq!(tree.parent(dropped).unwrap(), None);
}

#[test]
fn test_confirm_marks_start_of_element() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let id = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 300.0);
    assert!(!tree.inline(id).unwrap().starts_here);
    tree.append_child(&mut ctx, id, TextRun::new("x", 9.6), false)
        .unwrap();
    assert!(tree.inline(id).unwrap().is_pending());
    tree.confirm(&mut ctx, id).unwrap();
    assert!(tree.inline(id).unwrap().starts_here);
    assert!(!tree.inline(id).unwrap().is_pending());
}
