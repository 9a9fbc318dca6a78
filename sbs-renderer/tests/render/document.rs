use crate::common::{fixture, parse_html};
use sbs_renderer::renderer::DEFAULT_TITLE;
use sbs_renderer::{RenderEnvironment, RenderError, SbsRenderer, WidgetKind};

fn script_srcs(html: &str) -> Vec<String> {
    let root = parse_html(html);
    root.find_by_name("script")
        .into_iter()
        .filter_map(|script| script.attr("src").map(str::to_string))
        .collect()
}

#[test]
fn plain_document_declares_no_scripts() {
    let html = SbsRenderer::new().render_document(&fixture("plain.md"), "Notes");
    assert!(script_srcs(&html).is_empty());
    assert!(html.contains("<link rel='stylesheet' href='./widgets/sbs-ext.css'>"));
    assert!(html.contains("<link rel='stylesheet' href='./widgets/themes/default.css'>"));
    assert!(html.contains("<title>Notes</title>"));
    assert!(html.starts_with("<!DOCTYPE html>\n<html lang='en'>\n<head>\n"));
}

#[test]
fn bridge_demo_declares_only_bridge_runtime() {
    let html = SbsRenderer::new().render_document(&fixture("bridge-demo.md"), DEFAULT_TITLE);
    assert_eq!(script_srcs(&html), vec!["./widgets/bridge/index.js"]);
}

#[test]
fn script_included_iff_markup_present() {
    let fences = [
        (WidgetKind::Bridge, "```sbs-bridge\n[Board \"1\"]\n```\n"),
        (WidgetKind::Chess, "```sbs-chess\n1. e4\n```\n"),
        (WidgetKind::Go, "```sbs-go\n(;GM[1])\n```\n"),
    ];
    let renderer = SbsRenderer::new();

    for mask in 0u8..8 {
        let source: String = fences
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << *i) != 0)
            .map(|(_, (_, fence))| format!("{fence}\ntext\n\n"))
            .collect();
        let html = renderer.render_document(&source, DEFAULT_TITLE);
        let srcs = script_srcs(&html);

        for (kind, _) in &fences {
            let has_markup = html.contains(&format!("<{} ", kind.tag()));
            let has_script = srcs.contains(&format!("./widgets/{}/index.js", kind.name()));
            assert_eq!(has_markup, has_script, "mask {mask:#05b} kind {kind:?}");
        }
    }
}

#[test]
fn scripts_follow_fixed_kind_order() {
    let source = "```sbs-go\n(;GM[1])\n```\n\n```sbs-chess\n1. e4\n```\n\n```sbs-bridge\n[Board \"1\"]\n```\n";
    let html = SbsRenderer::new().render_document(source, DEFAULT_TITLE);
    assert_eq!(
        script_srcs(&html),
        vec![
            "./widgets/bridge/index.js",
            "./widgets/chess/index.js",
            "./widgets/go/index.js",
        ]
    );
}

#[test]
fn repeated_widgets_declare_one_script() {
    let source = fixture("bridge-sticky-layout.md");
    let html = SbsRenderer::new().render_document(&source, DEFAULT_TITLE);
    assert_eq!(script_srcs(&html), vec!["./widgets/bridge/index.js"]);
}

#[test]
fn title_is_escaped() {
    let html = SbsRenderer::new().render_document("", "<script>alert(1)</script>");
    assert!(html.contains("<title>&lt;script&gt;alert(1)&lt;/script&gt;</title>"));
}

#[test]
fn fragment_usage_is_visible_through_the_environment() {
    let renderer = SbsRenderer::new();
    let mut env = RenderEnvironment::new();
    renderer
        .render_with(&fixture("chess-sticky-layout.md"), &mut env)
        .expect("render");

    assert_eq!(env.used_widgets().collect::<Vec<_>>(), vec![WidgetKind::Chess]);
    assert!(!env.uses_image_scale());
    assert!(env.sticky().is_empty());
}

#[test]
fn reusing_an_environment_is_an_error() {
    let renderer = SbsRenderer::new();
    let mut env = RenderEnvironment::new();
    renderer.render_with("first", &mut env).expect("first render");

    let err = renderer
        .render_with("second", &mut env)
        .expect_err("second render must fail");
    assert!(matches!(err, RenderError::EnvironmentReused));
}
