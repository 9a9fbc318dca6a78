use crate::common::{fixture, parse_html, Element};
use sbs_renderer::SbsRenderer;

fn containers(root: &Element) -> Vec<&Element> {
    root.find_by_class("sbs-sticky-container")
}

fn balanced(html: &str) -> bool {
    html.matches("<div").count() == html.matches("</div>").count()
}

#[test]
fn chess_figure_is_pinned_beside_narration() {
    let html = SbsRenderer::new().render(&fixture("chess-sticky-layout.md"));
    assert!(balanced(&html));

    let root = parse_html(&html);
    let container = containers(&root);
    assert_eq!(container.len(), 1);
    let container = container[0];
    assert_eq!(container.children.len(), 2);

    let figure = &container.children[0];
    assert!(figure.has_class("sbs-sticky-figure"));
    assert_eq!(figure.child_names(), vec!["sbs-chess"]);
    assert_eq!(figure.children[0].attr("title"), Some("Italian Game"));

    let body = &container.children[1];
    assert!(body.has_class("sbs-sticky-body"));
    assert_eq!(body.child_names(), vec!["p", "p"]);
    assert_eq!(body.children[0].text, "White aims at f7 with the bishop.");

    let after = root.find_by_name("p");
    assert_eq!(
        after.last().map(|p| p.text.as_str()),
        Some("After the container the page flows normally.")
    );
    assert!(html.ends_with("</div>\n</div>\n<p>After the container the page flows normally.</p>\n"));
}

#[test]
fn only_the_first_widget_becomes_the_figure() {
    let html = SbsRenderer::new().render(&fixture("bridge-sticky-layout.md"));
    let root = parse_html(&html);

    assert_eq!(root.find_by_class("sbs-sticky-figure").len(), 1);
    let body = root.find_by_class("sbs-sticky-body");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].child_names(), vec!["p", "sbs-bridge", "p"]);
    assert_eq!(root.find_by_name("sbs-bridge").len(), 2);
}

#[test]
fn container_without_widgets_has_no_figure_or_body() {
    let html = SbsRenderer::new().render("::: sbs-sticky\n\njust text\n\n:::\n");
    let root = parse_html(&html);
    let container = containers(&root);
    assert_eq!(container[0].child_names(), vec!["p"]);
    assert!(root.find_by_class("sbs-sticky-figure").is_empty());
    assert!(root.find_by_class("sbs-sticky-body").is_empty());
}

#[test]
fn nested_containers_take_their_own_figures() {
    let source = "::: sbs-sticky\n\n\
                  ```sbs-go\n(;GM[1])\n```\n\n\
                  ::: sbs-sticky\n\n\
                  ```sbs-chess\n1. e4\n```\n\n\
                  inner\n\n\
                  :::\n\n\
                  outer\n\n\
                  :::\n";
    let html = SbsRenderer::new().render(source);
    assert!(balanced(&html));

    let root = parse_html(&html);
    let outer = containers(&root)[0];
    assert_eq!(outer.children[0].child_names(), vec!["sbs-go"]);

    let outer_body = &outer.children[1];
    assert_eq!(outer_body.child_names(), vec!["div", "p"]);

    let inner = &outer_body.children[0];
    assert!(inner.has_class("sbs-sticky-container"));
    assert_eq!(inner.children[0].child_names(), vec!["sbs-chess"]);
    assert_eq!(inner.children[1].child_names(), vec!["p"]);
    assert_eq!(inner.children[1].children[0].text, "inner");
}

#[test]
fn unclosed_container_is_closed_at_end_of_input() {
    let html = SbsRenderer::new().render("::: sbs-sticky\n\n```sbs-chess\n1. e4\n");
    assert!(balanced(&html));
    let root = parse_html(&html);
    assert_eq!(root.find_by_class("sbs-sticky-figure").len(), 1);
    assert_eq!(root.find_by_name("sbs-chess")[0].children[0].text, "1. e4");
}

#[test]
fn widgets_outside_containers_are_not_wrapped() {
    let source = "::: sbs-sticky\n\ntext\n\n:::\n\n```sbs-chess\n1. e4\n```\n";
    let html = SbsRenderer::new().render(source);
    assert!(html.ends_with("</div>\n<sbs-chess lang='zh'><script type='application/x-chess-pgn'>1. e4</script></sbs-chess>\n"));
    assert!(!html.contains("sbs-sticky-figure"));
}

#[test]
fn stray_closing_marker_is_plain_text() {
    assert_eq!(SbsRenderer::new().render(":::\n"), "<p>:::</p>\n");
}

#[test]
fn container_markers_inside_code_are_literal() {
    let html = SbsRenderer::new().render("```markdown\n::: sbs-sticky\n:::\n```\n");
    assert!(html.contains("::: sbs-sticky\n:::\n</code></pre>"));
    assert!(!html.contains("sbs-sticky-container"));
}

#[test]
fn list_item_fence_before_container_keeps_layout() {
    let source = "- ```\n  code\n  ```\n\n\
                  ::: sbs-sticky\n\n\
                  ```sbs-chess\n1. e4\n```\n\n\
                  narration\n\n\
                  :::\n";
    let html = SbsRenderer::new().render(source);
    assert!(balanced(&html));
    assert!(!html.contains(":::"));

    let root = parse_html(&html);
    assert_eq!(root.find_by_name("li")[0].child_names(), vec!["pre"]);
    let container = containers(&root);
    assert_eq!(container.len(), 1);
    assert_eq!(container[0].children[0].child_names(), vec!["sbs-chess"]);
    assert_eq!(container[0].children[1].child_names(), vec!["p"]);
    assert_eq!(container[0].children[1].children[0].text, "narration");
}

#[test]
fn list_item_fence_inside_container_stays_in_the_body() {
    let source = "::: sbs-sticky\n\n\
                  ```sbs-go\n(;GM[1])\n```\n\n\
                  - ```\n  :::\n  ```\n\n\
                  after the list\n\n\
                  :::\n\n\
                  outside\n";
    let html = SbsRenderer::new().render(source);
    assert!(balanced(&html));

    let root = parse_html(&html);
    let container = containers(&root);
    assert_eq!(container.len(), 1);
    let body = &container[0].children[1];
    assert_eq!(body.child_names(), vec!["ul", "p"]);
    assert_eq!(body.find_by_name("code")[0].text, ":::\n");
    assert!(html.ends_with("</div>\n</div>\n<p>outside</p>\n"));
}

#[test]
fn block_quote_fence_does_not_hide_containers() {
    let source = "> ```\n> ::: sbs-sticky\n> ```\n\n\
                  ::: sbs-sticky\n\n\
                  ```sbs-bridge\n[Dealer \"N\"]\n```\n\n\
                  :::\n";
    let html = SbsRenderer::new().render(source);
    assert!(balanced(&html));

    let root = parse_html(&html);
    assert_eq!(root.find_by_name("blockquote")[0].child_names(), vec!["pre"]);
    assert_eq!(containers(&root).len(), 1);
    assert_eq!(root.find_by_class("sbs-sticky-figure").len(), 1);
}

#[test]
fn container_left_open_around_a_list_fence_closes_at_end() {
    let html = SbsRenderer::new().render("::: sbs-sticky\n\n```sbs-chess\n1. d4\n```\n\n- ```\n  x\n");
    assert!(balanced(&html));
    assert!(!html.contains("&lt;!--"));

    let root = parse_html(&html);
    let body = root.find_by_class("sbs-sticky-body");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].child_names(), vec!["ul"]);
}

#[test]
fn authored_comments_do_not_open_containers() {
    let source = "<!-- sbs-container open sbs-sticky -->\n\n\
                  ```sbs-chess\n1. e4\n```\n";
    let html = SbsRenderer::new().render(source);
    assert!(balanced(&html));
    assert!(!html.contains("sbs-sticky-container"));
    assert!(html.starts_with("<!-- sbs-container open sbs-sticky -->\n<sbs-chess"));
}
