//! WASM build test
//!
//! Exercises the JavaScript-facing engine and views in a browser.

use colorize_wasm::api::{ColorEngine, ColorView};
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn bound_view(engine: &ColorEngine, len: usize) -> ColorView {
    let mut view = engine.create_view();
    view.bind(Some("note.md".to_string()), true, None, len);
    view
}

#[wasm_bindgen_test]
fn test_engine_creation() {
    let engine = ColorEngine::new(None).unwrap();
    assert_eq!(engine.offset_unit(), "utf16");
    assert!(!engine.is_dirty());
}

#[wasm_bindgen_test]
fn test_config_yaml() {
    let engine = ColorEngine::new(Some("persist_debounce_ms: 50\noffset_unit: codepoint\n".to_string())).unwrap();
    assert_eq!(engine.offset_unit(), "codepoint");
    assert!(ColorEngine::new(Some("persist_debounce_ms: [".to_string())).is_err());
}

#[wasm_bindgen_test]
fn test_commands_schedule_a_save() {
    let engine = ColorEngine::new(None).unwrap();
    let mut view = bound_view(&engine, 20);

    assert!(view.set_text_color(2, 6, Some("red".to_string())));
    assert!(engine.is_dirty());
    let due = engine.due_at().unwrap();
    assert_eq!(engine.take_due_snapshot(due - 1.0).unwrap(), None);

    let json = engine.take_due_snapshot(due).unwrap().unwrap();
    assert!(json.contains("\"note.md\""));
    assert!(!engine.is_dirty());
    assert_eq!(engine.flush().unwrap(), None);
}

#[wasm_bindgen_test]
fn test_apply_edit_moves_colors() {
    let engine = ColorEngine::new(None).unwrap();
    let mut view = bound_view(&engine, 10);
    view.set_bg_color_by_name(2, 5, "Yellow").unwrap();

    let update = js_sys::JSON::parse(r#"{"changes":[{"from":0,"to":0,"insert":3}]}"#).unwrap();
    view.apply_edit(update).unwrap();
    assert_eq!(view.doc_length(), 13);
    assert!(view.bg_color_at(5).is_some());
    assert!(view.bg_color_at(4).is_none());

    let bad = js_sys::JSON::parse(r#"{"changes":[{"from":5,"to":40}]}"#).unwrap();
    assert!(view.apply_edit(bad).is_err());
}

#[wasm_bindgen_test]
fn test_underline_modes_and_decorations() {
    let engine = ColorEngine::new(None).unwrap();
    let mut view = bound_view(&engine, 10);
    assert!(view.set_underline(0, 5, "set").unwrap());
    assert!(view.toggle_underline(3, 8));
    assert!(view.is_underlined(0, 8));
    assert!(view.set_underline(0, 1, "sideways").is_err());

    let decorations = view.decorations().unwrap();
    assert!(js_sys::Array::is_array(&decorations));
    assert_eq!(js_sys::Array::from(&decorations).length(), 1);
}

#[wasm_bindgen_test]
fn test_context_binding_without_role_disables_colors() {
    let engine = ColorEngine::new(None).unwrap();
    let context = js_sys::JSON::parse(r#"{"documentId":"note.md","docLength":10}"#).unwrap();
    let mut view = engine.create_view();
    view.bind_with_context(context);

    assert_eq!(view.document_id().as_deref(), Some("note.md"));
    assert!(!view.is_primary());
    assert!(!view.set_text_color(0, 4, Some("red".to_string())));
    assert!(!engine.is_dirty());
    let decorations = js_sys::Array::from(&view.decorations().unwrap());
    assert_eq!(decorations.length(), 0);
}

#[wasm_bindgen_test]
fn test_render_element_in_place() {
    let engine = ColorEngine::new(None).unwrap();
    let mut view = bound_view(&engine, 11);
    view.set_bg_color(0, 5, Some("yellow".to_string()));

    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    root.set_inner_html("<p>Hello world</p>");

    assert_eq!(engine.render_element("note.md", &root).unwrap(), 1);
    assert_eq!(
        root.inner_html(),
        r#"<p><span class="colorize-bg" style="background-color: yellow;">Hello</span> world</p>"#
    );
}

#[wasm_bindgen_test]
fn test_render_tree_round_trip() {
    let engine = ColorEngine::new(None).unwrap();
    let mut view = bound_view(&engine, 2);
    view.set_text_color(0, 1, Some("red".to_string()));

    let tree = js_sys::JSON::parse(
        r#"{"type":"element","tag":"p","children":[{"type":"text","text":"ab"}]}"#,
    )
    .unwrap();
    let rendered: JsValue = engine.render_tree("note.md", tree).unwrap();
    let html = js_sys::JSON::stringify(&rendered).unwrap().as_string().unwrap();
    assert!(html.contains("color: red;"));
}
