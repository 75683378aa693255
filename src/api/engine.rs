//! Engine bindings
//!
//! One `ColorEngine` per host plugin instance. It owns the persisted
//! per-document map, the save schedule and the configuration, and hands out
//! a `ColorView` for every editing surface the host opens.

use super::helpers::{deserialize, js_error, now_ms, serialize};
use super::view::ColorView;
use crate::channels::{ColorStore, FileColorData, PersistQueue};
use crate::config::ColorizeConfig;
use crate::render::tree::{render_static, RenderNode, SelectorList};
use crate::{wasm_info, wasm_log, wasm_warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Store plus save schedule, shared by the engine and its views
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub store: ColorStore,
    pub queue: PersistQueue,
}

impl Session {
    fn new(config: &ColorizeConfig) -> Self {
        Self {
            store: ColorStore::new(),
            queue: PersistQueue::new(config.persist_debounce_ms),
        }
    }

    /// Arm the save schedule if the store has unsaved writes
    pub fn note_writes(&mut self) {
        if self.store.is_dirty() && self.queue.note_write(now_ms()) {
            wasm_log!("Save scheduled in {} ms", self.queue.debounce_ms());
        }
    }

    fn take_snapshot(&mut self) -> Result<String, JsValue> {
        let json = self
            .store
            .to_json()
            .map_err(|e| js_error("Failed to serialize color store", e))?;
        self.store.mark_clean();
        self.queue.cancel();
        Ok(json)
    }
}

#[wasm_bindgen]
pub struct ColorEngine {
    session: Rc<RefCell<Session>>,
    config: Rc<ColorizeConfig>,
    opaque: SelectorList,
}

impl ColorEngine {
    fn with_config(config: ColorizeConfig) -> Self {
        wasm_info!(
            "ColorEngine created (unit: {:?}, debounce: {} ms)",
            config.offset_unit,
            config.persist_debounce_ms
        );
        Self {
            session: Rc::new(RefCell::new(Session::new(&config))),
            opaque: SelectorList::parse(&config.opaque_selectors),
            config: Rc::new(config),
        }
    }

    pub fn config(&self) -> &ColorizeConfig {
        &self.config
    }

    /// Colors stored for `id`, in canonical form
    pub fn stored_colors(&self, id: &str) -> FileColorData {
        self.session
            .borrow()
            .store
            .get(id)
            .map(|data| data.canonical().into_owned())
            .unwrap_or_default()
    }
}

#[wasm_bindgen]
impl ColorEngine {
    /// Create an engine from an optional YAML (or JSON) configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<ColorEngine, JsValue> {
        let config = ColorizeConfig::from_yaml(config.as_deref().unwrap_or(""))
            .map_err(|e| js_error("Invalid configuration", e))?;
        Ok(Self::with_config(config))
    }

    /// Create an engine from a configuration object
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<ColorEngine, JsValue> {
        if config.is_undefined() || config.is_null() {
            return Ok(Self::with_config(ColorizeConfig::default()));
        }
        let config: ColorizeConfig = deserialize(config, "Invalid configuration")?;
        Ok(Self::with_config(config))
    }

    /// Replace the document map with persisted JSON; returns the document count
    pub fn load(&self, json: &str) -> Result<usize, JsValue> {
        let store = if json.trim().is_empty() {
            ColorStore::new()
        } else {
            ColorStore::from_json(json).map_err(|e| js_error("Failed to load color store", e))?
        };
        let mut session = self.session.borrow_mut();
        session.store = store;
        session.queue.cancel();
        wasm_info!("Loaded colors for {} document(s)", session.store.len());
        Ok(session.store.len())
    }

    /// Serialize the whole map and clear the pending save
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.session.borrow_mut().take_snapshot()
    }

    /// The map to write if the debounced save is due at `now`
    #[wasm_bindgen(js_name = takeDueSnapshot)]
    pub fn take_due_snapshot(&self, now: f64) -> Result<Option<String>, JsValue> {
        let mut session = self.session.borrow_mut();
        if !session.queue.take_due(now.max(0.0) as u64) {
            return Ok(None);
        }
        session.take_snapshot().map(Some)
    }

    /// The map to write right now if anything is unsaved (view close, unload)
    pub fn flush(&self) -> Result<Option<String>, JsValue> {
        let mut session = self.session.borrow_mut();
        let pending = session.queue.flush();
        if !pending && !session.store.is_dirty() {
            return Ok(None);
        }
        session.take_snapshot().map(Some)
    }

    /// When the pending save becomes due, in host milliseconds
    #[wasm_bindgen(js_name = dueAt)]
    pub fn due_at(&self) -> Option<f64> {
        self.session.borrow().queue.due_at().map(|due| due as f64)
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.session.borrow().store.is_dirty()
    }

    /// Stored colors for a document as `{ text, bg, underline }`
    #[wasm_bindgen(js_name = documentColors)]
    pub fn document_colors(&self, id: &str) -> Result<JsValue, JsValue> {
        serialize(&self.stored_colors(id), "Failed to serialize document colors")
    }

    /// Forget a deleted document
    #[wasm_bindgen(js_name = removeDocument)]
    pub fn remove_document(&self, id: &str) -> bool {
        let mut session = self.session.borrow_mut();
        let removed = session.store.remove(id).is_some();
        session.note_writes();
        removed
    }

    /// Follow a renamed document
    #[wasm_bindgen(js_name = renameDocument)]
    pub fn rename_document(&self, from: &str, to: &str) -> bool {
        let mut session = self.session.borrow_mut();
        let renamed = session.store.rename(from, to);
        if !renamed {
            wasm_warn!("renameDocument: nothing stored for '{}'", from);
        }
        session.note_writes();
        renamed
    }

    /// Open state for a new editing surface
    #[wasm_bindgen(js_name = createView)]
    pub fn create_view(&self) -> ColorView {
        ColorView::new(Rc::clone(&self.session), Rc::clone(&self.config))
    }

    #[wasm_bindgen(js_name = textColorNames)]
    pub fn text_color_names(&self) -> Result<JsValue, JsValue> {
        serialize(&self.config.text_color_names(), "Failed to serialize palette")
    }

    #[wasm_bindgen(js_name = bgColorNames)]
    pub fn bg_color_names(&self) -> Result<JsValue, JsValue> {
        serialize(&self.config.bg_color_names(), "Failed to serialize palette")
    }

    /// Offset unit every stored position is counted in
    #[wasm_bindgen(js_name = offsetUnit)]
    pub fn offset_unit(&self) -> String {
        match self.config.offset_unit {
            crate::text::OffsetUnit::Utf16 => "utf16".to_string(),
            crate::text::OffsetUnit::CodePoint => "codepoint".to_string(),
        }
    }

    /// Apply a document's colors to a serialized render tree
    ///
    /// Takes `{ type: "element", tag, classes, attrs, children }` and returns
    /// the rewritten tree. Text nodes at the root are returned unchanged.
    #[wasm_bindgen(js_name = renderTree)]
    pub fn render_tree(&self, id: &str, tree: JsValue) -> Result<JsValue, JsValue> {
        let mut tree: RenderNode = deserialize(tree, "Invalid render tree")?;
        if let RenderNode::Element(root) = &mut tree {
            let data = self.stored_colors(id);
            let summary = render_static(root, &data, &self.opaque, self.config.offset_unit);
            wasm_log!(
                "renderTree({}): {} of {} leaves restyled",
                id,
                summary.restyled,
                summary.leaves
            );
        }
        serialize(&tree, "Failed to serialize render tree")
    }

    /// Apply a document's colors to a rendered DOM subtree in place
    ///
    /// Returns the number of text nodes that were split into styled spans.
    #[wasm_bindgen(js_name = renderElement)]
    pub fn render_element(&self, id: &str, element: &web_sys::Element) -> Result<usize, JsValue> {
        let data = self.stored_colors(id);
        let summary = super::dom::render_element(element, &data, &self.config)?;
        Ok(summary.restyled)
    }
}

#[cfg(feature = "regex")]
#[wasm_bindgen]
impl ColorEngine {
    /// Strip inline HTML color wrappers from `text`
    ///
    /// Returns `{ text, text_ranges, bg_ranges, changes }`.
    #[wasm_bindgen(js_name = importLegacyMarkup)]
    pub fn import_legacy_markup(&self, text: &str) -> Result<JsValue, JsValue> {
        let import = crate::migrate::import_legacy_markup(text, self.config.offset_unit)
            .map_err(|e| js_error("Legacy markup import failed", e))?;
        serialize(&import, "Failed to serialize legacy import")
    }
}
