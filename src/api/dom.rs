//! Static rendering over a live DOM subtree
//!
//! Same walk as `render::tree`, against the browser's nodes. Text nodes are
//! collected before any of them is replaced, so the walk never sees its own
//! output.

use crate::channels::FileColorData;
use crate::config::ColorizeConfig;
use crate::render::segments::{Fragment, LeafSegmenter};
use crate::render::tree::WalkSummary;
use crate::wasm_log;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

fn inside(element: &Element, selector: &str) -> Result<bool, JsValue> {
    if selector.trim().is_empty() {
        return Ok(false);
    }
    Ok(element.closest(selector)?.is_some())
}

fn text_nodes(document: &Document, root: &Element) -> Result<Vec<Node>, JsValue> {
    let walker = document.create_tree_walker_with_what_to_show(root, SHOW_TEXT)?;
    let mut nodes = Vec::new();
    while let Some(node) = walker.next_node()? {
        nodes.push(node);
    }
    Ok(nodes)
}

fn fragment_node(document: &Document, fragment: &Fragment) -> Result<Node, JsValue> {
    if fragment.is_plain() {
        return Ok(document.create_text_node(&fragment.text).unchecked_into());
    }
    let span = document.create_element("span")?;
    span.set_attribute("class", &fragment.style.class_names())?;
    span.set_attribute("style", &fragment.style.to_css())?;
    span.append_child(&document.create_text_node(&fragment.text))?;
    Ok(span.unchecked_into())
}

/// Restyle the text under `root` in place
///
/// Text inside opaque regions keeps its raw form but still advances the
/// offset. Text inside a live editor island belongs to another surface and
/// is neither styled nor counted. A `root` that is itself inside a live
/// editor is left alone.
pub fn render_element(
    root: &Element,
    data: &FileColorData,
    config: &ColorizeConfig,
) -> Result<WalkSummary, JsValue> {
    let mut summary = WalkSummary::default();
    if data.is_empty() || inside(root, &config.live_editor_selector)? {
        return Ok(summary);
    }
    let document = root
        .owner_document()
        .ok_or_else(|| JsValue::from_str("Element has no owner document"))?;

    let data = data.canonical();
    let unit = config.offset_unit;
    let mut segmenter = LeafSegmenter::new(&data, unit);
    let mut offset = 0;

    for node in text_nodes(&document, root)? {
        let Some(parent) = node.parent_element() else {
            continue;
        };
        if inside(&parent, &config.live_editor_selector)? {
            continue;
        }
        let text = node.text_content().unwrap_or_default();
        let start = offset;
        let len = unit.len(&text);
        offset += len;
        if len == 0 {
            continue;
        }
        summary.leaves += 1;
        if inside(&parent, &config.opaque_selectors)? {
            summary.skipped += 1;
            continue;
        }

        let Some(fragments) = segmenter.segment(start, &text) else {
            continue;
        };
        for fragment in &fragments {
            parent.insert_before(&fragment_node(&document, fragment)?, Some(&node))?;
        }
        parent.remove_child(&node)?;
        summary.restyled += 1;
    }

    summary.length = offset;
    wasm_log!(
        "renderElement: {} leaves, {} restyled, {} opaque",
        summary.leaves,
        summary.restyled,
        summary.skipped
    );
    Ok(summary)
}
