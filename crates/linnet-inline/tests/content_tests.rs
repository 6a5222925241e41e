//! Integration tests for content queries and debug dumps.

use linnet_inline::{
    ApproximateFontMetrics, BoxTree, ContentFunction, DumpMode, DynamicContentResolver,
    InlineError, InlineStyle, LayoutContext, ReplacedBox, TextRun,
};

struct Pages;

impl DynamicContentResolver for Pages {
    fn evaluate(&self, function: &ContentFunction) -> Option<String> {
        match function {
            ContentFunction::Counter { .. } => Some("12".to_string()),
            ContentFunction::TargetCounter { .. } => None,
            ContentFunction::Leader { fill } => Some(fill.repeat(3)),
        }
    }
}

#[test]
fn test_dump_indents_nested_boxes() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let b = tree.add_element("b", None);
    let outer = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 100.0);
    let inner = tree.create_inline_box(&mut ctx, Some(b), InlineStyle::default(), 100.0);
    let img = tree.create_replaced(ReplacedBox::new(None, 4.0, 4.0));
    tree.append_child(&mut ctx, inner, TextRun::new("x", 9.6), true)
        .unwrap();
    tree.append_child(&mut ctx, outer, inner, true).unwrap();
    tree.append_child(&mut ctx, outer, img, true).unwrap();

    let dump = tree.dump(outer, "> ", DumpMode::Render).unwrap();
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("> InlineBox: (anonymous) (S)"));
    assert!(lines[1].starts_with(">   InlineBox: <b> (S)"));
    assert!(lines[2].starts_with(">     TextRun: \"x\""));
    assert!(lines[3].starts_with(">   ReplacedBox: (anonymous)"));
    assert!(!dump.ends_with('\n'));

    // The Display adapter prints the same dump without an indent.
    assert_eq!(
        tree.display(outer).to_string(),
        tree.dump(outer, "", DumpMode::Render).unwrap()
    );
}

#[test]
fn test_layout_dump_is_rejected() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let id = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 100.0);
    let err = tree.dump(id, "", DumpMode::Layout).unwrap_err();
    assert_eq!(err, InlineError::UnsupportedDumpMode(DumpMode::Layout));
    assert!(err.is_invalid_argument());
    assert_eq!("layout".parse::<DumpMode>().unwrap(), DumpMode::Layout);
}

#[test]
fn test_child_access_out_of_bounds() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let id = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 100.0);
    tree.append_child(&mut ctx, id, TextRun::new("x", 9.6), true)
        .unwrap();
    assert_eq!(
        tree.child(id, 3).unwrap_err(),
        InlineError::OutOfBounds { index: 3, len: 1 }
    );
    assert!(tree.remove_child(id, 1).is_err());
    let removed = tree.remove_child(id, 0).unwrap();
    assert_eq!(removed.as_text().unwrap().text(), "x");
}

#[test]
fn test_dynamic_runs_are_remeasured() {
    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut tree = BoxTree::new();
    let id = tree.create_inline_box(&mut ctx, None, InlineStyle::default(), 100.0);
    let counter = TextRun::dynamic(
        ContentFunction::Counter {
            name: "page".to_string(),
        },
        "0",
        9.6,
    );
    let unresolved = TextRun::dynamic(
        ContentFunction::TargetCounter {
            target: "intro".to_string(),
            name: "page".to_string(),
        },
        "?",
        9.6,
    );
    let leader = TextRun::dynamic(
        ContentFunction::Leader {
            fill: ".".to_string(),
        },
        "",
        0.0,
    );
    for run in [counter, unresolved, leader] {
        tree.append_child(&mut ctx, id, run, true).unwrap();
    }

    let changed = tree
        .look_for_dynamic_functions(id, &Pages, &metrics, true)
        .unwrap();
    assert_eq!(changed, 2);

    let texts: Vec<(String, f32)> = tree
        .inline(id)
        .unwrap()
        .children()
        .iter()
        .filter_map(|child| child.as_text())
        .map(|run| (run.text().to_string(), run.width))
        .collect();
    assert_eq!(texts[0].0, "12");
    assert!((texts[0].1 - 19.2).abs() < 1e-4);
    assert_eq!(texts[1].0, "?");
    assert_eq!(texts[2].0, "...");

    // A second pass has nothing left to change.
    assert_eq!(
        tree.look_for_dynamic_functions(id, &Pages, &metrics, true)
            .unwrap(),
        0
    );
}
