use crate::common::{fixture, parse_html};
use insta::assert_snapshot;
use sbs_renderer::SbsRenderer;

#[test]
fn bridge_demo_keeps_pbn_verbatim() {
    let html = SbsRenderer::new().render(&fixture("bridge-demo.md"));

    assert!(html.contains(
        "<sbs-bridge lang='zh' data-format='pbn'><script type='application/pbn'>[Event \"World Bridge Championship\"]\n"
    ));
    assert!(html.contains("[Vulnerable \"All\"]"));
    assert!(!html.contains("&quot;"));
    assert!(html.contains("<p>West led the two of clubs.</p>"));
}

#[test]
fn chess_demo_header_becomes_attributes() {
    let html = SbsRenderer::new().render(&fixture("chess-demo.md"));
    assert!(html.contains(
        "<sbs-chess lang='zh' title='Ruy Lopez' orientation='white' interactive='true' size='400'>\
         <script type='application/x-chess-pgn'>1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7</script>\
         </sbs-chess>"
    ));
}

#[test]
fn go_widget_between_paragraphs() {
    let source = "Intro\n\n```sbs-go\nboard: 9\n---\n(;GM[1]SZ[9])\n```\n\nOutro\n";
    let html = SbsRenderer::new().render(source);
    assert_eq!(
        html,
        "<p>Intro</p>\n\
         <sbs-go lang='zh' board='9'><script type='text/sgf'>(;GM[1]SZ[9])</script></sbs-go>\n\
         <p>Outro</p>\n"
    );
}

#[test]
fn widget_element_carries_one_typed_script() {
    let html = SbsRenderer::new().render("```sbs-go\n(;GM[1];B[pd];W[dp])\n```\n");
    let root = parse_html(&html);

    let widgets = root.find_by_name("sbs-go");
    assert_eq!(widgets.len(), 1);
    assert_eq!(widgets[0].attr("lang"), Some("zh"));
    assert_eq!(widgets[0].child_names(), vec!["script"]);

    let script = &widgets[0].children[0];
    assert_eq!(script.attr("type"), Some("text/sgf"));
    assert_eq!(script.text, "(;GM[1];B[pd];W[dp])");
}

#[test]
fn closing_script_tag_cannot_escape_the_payload() {
    let source = "```sbs-chess\n---\n{ comment </SCRIPT><img src=x> }\n```\n";
    let root = parse_html(&SbsRenderer::new().render(source));

    let chess = root.find_by_name("sbs-chess");
    assert_eq!(chess.len(), 1);
    assert_eq!(chess[0].child_names(), vec!["script"]);
    assert_eq!(chess[0].children[0].text, "{ comment <\\/SCRIPT><img src=x> }");
    assert!(root.find_by_name("img").is_empty());
}

#[test]
fn tilde_fences_and_info_suffixes_are_recognized() {
    let html = SbsRenderer::new().render("~~~ sbs-chess board-only\n1. d4 d5\n~~~\n");
    assert_snapshot!(
        html.trim_end(),
        @"<sbs-chess lang='zh'><script type='application/x-chess-pgn'>1. d4 d5</script></sbs-chess>"
    );
}

#[test]
fn unknown_fence_languages_render_as_code() {
    let html = SbsRenderer::new().render("```sbs-poker\nAs Kd\n```\n");
    assert!(html.contains("<pre><code class=\"language-sbs-poker\">As Kd\n</code></pre>"));
}

#[test]
fn malformed_header_falls_back_to_payload() {
    let source = "```sbs-chess\ntitle: [unterminated\n---\n1. e4\n```\n";
    let root = parse_html(&SbsRenderer::new().render(source));
    let chess = root.find_by_name("sbs-chess");
    assert_eq!(chess[0].attr("title"), None);
    assert_eq!(chess[0].children[0].text, "title: [unterminated\n---\n1. e4");
}

#[test]
fn unknown_header_keys_become_data_attributes() {
    let source = "```sbs-go\ntheme: \"wood\"\nplayer-black: \"Lee Sedol\"\n---\n(;GM[1])\n```\n";
    let html = SbsRenderer::new().render(source);
    assert!(html.starts_with("<sbs-go lang='zh' theme='wood' data-player-black='Lee Sedol'>"));
}
