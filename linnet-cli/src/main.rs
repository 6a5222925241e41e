//! Linnet CLI
//!
//! Lays out a JSON scene of block, line and inline boxes with the inline
//! engine, then prints what it made of it.

mod scene;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use linnet_common::DiagnosticKind;
use linnet_inline::{
    ApproximateFontMetrics, Direction, DisplayList, DumpMode, InlineConfig,
    LayoutContext, Point, PositionType, RenderingContext,
};
use owo_colors::OwoColorize;

use scene::{BuiltScene, Scene};

/// Linnet - inspect inline layout of a JSON scene
#[derive(Parser, Debug)]
#[command(name = "linnet")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the laid-out box tree
    linnet --dump render scenes/paragraph.json

    # Justify every line to 400px, right to left, and print the display list
    linnet --justify 400 --direction rtl --paint scenes/justify.json

    # Which box is under a point?
    linnet --hit 42,18 scenes/relative.json

    # Verbose tracing of every layout step
    RUST_LOG=debug linnet --dump render scenes/paragraph.json
"#)]
struct Cli {
    /// Path to a JSON scene
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// JSON render configuration (debug outlines, justification shares)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the box tree of every line (render or layout)
    #[arg(long, value_name = "MODE")]
    dump: Option<DumpMode>,

    /// Print the display list as JSON
    #[arg(long)]
    paint: bool,

    /// Print the text content of every line
    #[arg(long)]
    text: bool,

    /// Hit-test a canvas point
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    hit: Option<Point>,

    /// Report anonymous boxes from --hit instead of their ancestors
    #[arg(long)]
    find_anonymous: bool,

    /// Justify every line to this width
    #[arg(long, value_name = "WIDTH")]
    justify: Option<f32>,

    /// Inline base direction used by --justify
    #[arg(long, default_value = "ltr")]
    direction: Direction,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let source = fs::read_to_string(&cli.scene)
        .with_context(|| format!("reading scene {}", cli.scene.display()))?;
    let scene: Scene = serde_json::from_str(&source)
        .with_context(|| format!("parsing scene {}", cli.scene.display()))?;

    let metrics = ApproximateFontMetrics;
    let mut ctx = LayoutContext::new(&metrics);
    let mut built = scene::build(&scene, &mut ctx)?;
    layout(
        &mut built,
        &scene,
        &mut ctx,
        &config,
        cli.justify.map(|width| (width, cli.direction)),
    )?;

    if let Some(mode) = cli.dump {
        print_dump(&built, mode)?;
    }
    if cli.text {
        print_text(&built)?;
    }
    if cli.paint {
        let mut list = DisplayList::new();
        let mut render = RenderingContext::new(&mut list, &config);
        for &line in &built.lines {
            built.tree.paint_line(&mut render, line)?;
        }
        println!("{}", serde_json::to_string_pretty(&list)?);
    }
    if let Some(point) = cli.hit {
        match built.tree.find(built.root, point, cli.find_anonymous)? {
            Some(id) => println!("{} {}", "hit".green(), built.tree.describe(id)?),
            None => println!("{} at ({}, {})", "no hit".yellow(), point.x, point.y),
        }
    }

    if !ctx.diagnostics.is_empty() {
        eprint!("{}", ctx.diagnostics.render_colored());
        let inconsistencies = ctx
            .diagnostics
            .of_kind(DiagnosticKind::Inconsistency)
            .count();
        if inconsistencies > 0 {
            log::error!("{inconsistencies} inconsistencies in the scene tree");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<InlineConfig> {
    let Some(path) = path else {
        return Ok(InlineConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing config {}", path.display()))
}

fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let coordinate = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|err| format!("'{part}': {err}"))
    };
    Ok(Point::new(coordinate(x)?, coordinate(y)?))
}

/// Run the passes that follow line breaking.
fn layout(
    built: &mut BuiltScene,
    scene: &Scene,
    ctx: &mut LayoutContext<'_>,
    config: &InlineConfig,
    justify: Option<(f32, Direction)>,
) -> Result<()> {
    let tree = &mut built.tree;

    // STEP 1: Close every line: drop fragments that never got content.
    for &line in &built.lines {
        tree.prune_line(ctx, line)?;
    }

    // STEP 2: Evaluate counters before anything is measured.
    for &line in &built.lines {
        for id in tree.child_boxes(line)? {
            if tree.inline(id).is_err() {
                continue;
            }
            let changed = tree.look_for_dynamic_functions(id, scene, ctx.font_metrics(), false)?;
            if changed > 0 {
                log::debug!("{changed} dynamic runs changed under {id}");
            }
        }
    }

    // STEP 3: Pack each line, then justify it.
    for &line in &built.lines {
        let width = tree.pack_line(line)?;
        log::debug!("packed {line} to {width}px");
        if let Some((target, direction)) = justify {
            let info = tree.justify_line(line, target, direction, &config.justification)?;
            log::debug!(
                "justified {line}: space +{} other +{}",
                info.space_adjust,
                info.non_space_adjust
            );
        }
    }

    // STEP 4: Canvas locations, then relative offsets per element.
    tree.propagate_locations(built.root)?;
    let mut positioned = HashSet::new();
    for &id in &built.inline_boxes {
        let inline = tree.inline(id)?;
        if inline.style().position != PositionType::Relative || tree.line_box_of(id)?.is_none() {
            continue;
        }
        if let Some(element) = inline.element()
            && !positioned.insert(element)
        {
            continue;
        }
        let (dx, dy) = tree.position_relative(ctx, id)?;
        log::debug!("relative offset ({dx}, {dy}) from {id}");
    }

    // STEP 5: Decorations and cached bounds for painting and hit testing.
    for &id in &built.inline_boxes {
        let font = ctx.font_metrics().metrics(tree.inline(id)?.style());
        tree.inline_mut(id)?.calculate_text_decorations(&font);
    }
    let _ = tree.calc_painting_info(built.root)?;
    Ok(())
}

fn print_dump(built: &BuiltScene, mode: DumpMode) -> Result<()> {
    for &line in &built.lines {
        println!("{}", built.tree.describe(line)?.bold());
        for child in built.tree.child_boxes(line)? {
            if built.tree.inline(child).is_ok() {
                println!("{}", built.tree.dump(child, "  ", mode)?);
            } else {
                println!("  {}", built.tree.describe(child)?);
            }
        }
    }
    Ok(())
}

fn print_text(built: &BuiltScene) -> Result<()> {
    for &line in &built.lines {
        let mut text = String::new();
        for child in built.tree.child_boxes(line)? {
            if built.tree.inline(child).is_ok() {
                built.tree.collect_text(child, &mut text)?;
            }
        }
        println!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, justify: Option<(f32, Direction)>) -> (BuiltScene, Vec<DiagnosticKind>) {
        let scene: Scene = serde_json::from_str(source).unwrap();
        let metrics = ApproximateFontMetrics;
        let mut ctx = LayoutContext::new(&metrics);
        let mut built = scene::build(&scene, &mut ctx).unwrap();
        layout(&mut built, &scene, &mut ctx, &InlineConfig::default(), justify).unwrap();
        let kinds = ctx.diagnostics.entries().iter().map(|entry| entry.kind).collect();
        (built, kinds)
    }

    #[test]
    fn test_paragraph_scene() {
        let (built, diagnostics) = run(include_str!("../scenes/paragraph.json"), None);
        assert_eq!(diagnostics, vec![DiagnosticKind::DegradedRendering]);

        let mut text = String::new();
        for child in built.tree.child_boxes(built.lines[1]).unwrap() {
            if built.tree.inline(child).is_ok() {
                built.tree.collect_text(child, &mut text).unwrap();
            }
        }
        // The page counter was evaluated.
        assert_eq!(text, "lines on page 3 (more)");
    }

    #[test]
    fn test_relative_scene_moves_both_fragments() {
        let (built, diagnostics) = run(include_str!("../scenes/relative.json"), None);
        assert!(diagnostics.is_empty());
        let first = built.tree.node(built.inline_boxes[0]).unwrap();
        let last = built.tree.node(built.inline_boxes[2]).unwrap();
        assert!((first.abs_x - 20.0).abs() < 1e-4);
        assert!((first.abs_y - 4.0).abs() < 1e-4);
        assert!((last.abs_x - 20.0).abs() < 1e-4);
        assert!((last.abs_y - 44.0).abs() < 1e-4);
    }

    #[test]
    fn test_justify_scene_fills_lines() {
        let (built, _) = run(include_str!("../scenes/justify.json"), Some((400.0, Direction::Ltr)));
        for &line in &built.lines {
            let top = built.tree.child_boxes(line).unwrap()[0];
            let width = built.tree.inline(top).unwrap().inline_width;
            assert!((width - 400.0).abs() < 1e-2, "{line} is {width}px wide");
        }
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3, 4.5").unwrap(), Point::new(3.0, 4.5));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "linnet",
            "--dump",
            "render",
            "--justify",
            "300",
            "--direction",
            "rtl",
            "--hit",
            "1,2",
            "scene.json",
        ])
        .unwrap();
        assert_eq!(cli.dump, Some(DumpMode::Render));
        assert_eq!(cli.direction, Direction::Rtl);
        assert_eq!(cli.justify, Some(300.0));
        assert!(Cli::try_parse_from(["linnet", "--dump", "boxes", "scene.json"]).is_err());
    }
}
