// Static rendering of saved colors over rendered documents

use colorize_wasm::channels::{Channel, FileColorData};
use colorize_wasm::config::{ColorizeConfig, DEFAULT_OPAQUE_SELECTORS};
use colorize_wasm::ranges::{ColoredRange, Range};
use colorize_wasm::render::{build_decorations, render_static, ElementNode, RenderNode, SelectorList};
use colorize_wasm::text::OffsetUnit;

fn paragraph(text: &str) -> ElementNode {
    ElementNode::new("p").with_text(text)
}

#[test]
fn test_hello_world_highlight() {
    let mut root = paragraph("Hello world");
    let data = FileColorData {
        bg: vec![ColoredRange::new(0, 5, "yellow")],
        ..FileColorData::default()
    };

    let summary = render_static(&mut root, &data, &SelectorList::none(), OffsetUnit::Utf16);

    assert_eq!(summary.leaves, 1);
    assert_eq!(
        root.into_node().to_html(),
        r#"<p><span class="colorize-bg" style="background-color: yellow;">Hello</span> world</p>"#
    );
}

#[test]
fn test_code_blocks_stay_raw_and_offsets_stay_aligned() {
    let mut root = ElementNode::new("div")
        .with_child(paragraph("intro ").into_node())
        .with_child(
            ElementNode::new("pre")
                .with_child(ElementNode::new("code").with_text("let x = 1;").into_node())
                .into_node(),
        )
        .with_child(paragraph(" outro").into_node());
    let data = FileColorData {
        text: vec![ColoredRange::new(3, 19, "red")],
        ..FileColorData::default()
    };
    let opaque = SelectorList::parse(DEFAULT_OPAQUE_SELECTORS);

    let summary = render_static(&mut root, &data, &opaque, OffsetUnit::Utf16);

    assert_eq!(summary.leaves, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.restyled, 2);
    assert_eq!(summary.length, 22);
    let html = root.into_node().to_html();
    assert!(html.contains("<pre><code>let x = 1;</code></pre>"));
    assert!(html.contains(r#"<p>int<span class="colorize-text" style="color: red;">ro </span></p>"#));
    assert!(html.contains(r#"<p><span class="colorize-text" style="color: red;"> ou</span>tro</p>"#));
}

#[test]
fn test_non_canonical_input_is_normalized_first() {
    let mut root = paragraph("abcdef");
    let data = FileColorData {
        text: vec![ColoredRange::new(2, 6, "red"), ColoredRange::new(0, 3, "blue")],
        ..FileColorData::default()
    };
    render_static(&mut root, &data, &SelectorList::none(), OffsetUnit::Utf16);

    let texts: Vec<String> = root.children.iter().map(RenderNode::text_content).collect();
    assert_eq!(texts, vec!["abc", "def"]);
}

#[test]
fn test_live_and_static_agree_on_coverage() {
    let data = FileColorData {
        text: vec![ColoredRange::new(1, 4, "red")],
        bg: vec![ColoredRange::new(3, 6, "yellow")],
        underline: vec![Range::new(0, 2)],
    };
    let decorations = build_decorations(&data, 6);
    assert_eq!(decorations.len(), 3);
    assert_eq!(
        decorations.iter().filter(|d| d.channel == Channel::Text).count(),
        1
    );

    let mut root = paragraph("abcdef");
    let summary = render_static(&mut root, &data, &SelectorList::none(), OffsetUnit::Utf16);
    assert_eq!(summary.restyled, 1);
    // Boundaries at 0,1,2,3,4,6
    assert_eq!(root.children.len(), 5);
}

#[test]
fn test_default_config_selectors_parse() {
    let config = ColorizeConfig::default();
    let selectors = SelectorList::parse(&config.opaque_selectors);
    assert!(selectors.matches(&ElementNode::new("span").with_class("math")));
    assert!(selectors.matches(&ElementNode::new("code")));
    assert!(!selectors.matches(&ElementNode::new("p")));
}
