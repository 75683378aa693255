//! View bindings
//!
//! A `ColorView` wraps the channel state of one editing surface. The host
//! forwards its transactions and toolbar commands here and reads back the
//! decoration list after each one.

use super::engine::Session;
use super::helpers::{deserialize, js_error, serialize};
use crate::channels::{AttributeCommand, DocumentChannelState, UnderlineCommand, ViewContext, ViewRole};
use crate::config::ColorizeConfig;
use crate::error::{ColorizeError, Result as CoreResult};
use crate::text::{Change, ChangeSet};
use crate::{wasm_error, wasm_log, wasm_warn};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A host transaction as seen from JS
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditUpdate {
    #[serde(default)]
    changes: Vec<Change>,
    #[serde(default = "default_doc_changed")]
    doc_changed: bool,
    /// Length of the document before the transaction
    #[serde(default)]
    old_length: Option<usize>,
}

fn default_doc_changed() -> bool {
    true
}

/// Host lookups backed by a JS object
///
/// Each of `documentId`, `isPrimary`, `origin` and `docLength` may be a
/// plain property or a zero-argument method.
struct JsViewContext {
    object: JsValue,
}

impl JsViewContext {
    fn lookup(&self, name: &str) -> std::result::Result<JsValue, JsValue> {
        let value = js_sys::Reflect::get(&self.object, &JsValue::from_str(name))?;
        match value.dyn_ref::<js_sys::Function>() {
            Some(function) => function.call0(&self.object),
            None => Ok(value),
        }
    }
}

impl ViewContext for JsViewContext {
    fn document_id(&self) -> Option<String> {
        self.lookup("documentId").ok().and_then(|value| value.as_string())
    }

    fn role(&self) -> CoreResult<ViewRole> {
        let primary = self
            .lookup("isPrimary")
            .map_err(|e| ColorizeError::Context(format!("isPrimary threw: {:?}", e)))?;
        match primary.as_bool() {
            Some(true) => Ok(ViewRole::Primary),
            Some(false) => {
                let origin = self
                    .lookup("origin")
                    .ok()
                    .and_then(|value| value.as_f64())
                    .filter(|origin| *origin >= 0.0 && origin.fract() == 0.0)
                    .map(|origin| origin as usize);
                Ok(ViewRole::Secondary { origin })
            }
            None => Err(ColorizeError::Context("isPrimary is not a boolean".to_string())),
        }
    }

    fn doc_len(&self) -> usize {
        self.lookup("docLength")
            .ok()
            .and_then(|value| value.as_f64())
            .filter(|len| *len >= 0.0)
            .map_or(0, |len| len as usize)
    }
}

#[wasm_bindgen]
pub struct ColorView {
    session: Rc<RefCell<Session>>,
    config: Rc<ColorizeConfig>,
    state: DocumentChannelState,
}

impl ColorView {
    pub(crate) fn new(session: Rc<RefCell<Session>>, config: Rc<ColorizeConfig>) -> Self {
        let state = DocumentChannelState::new(config.underline_toggle);
        Self {
            session,
            config,
            state,
        }
    }

    pub fn state(&self) -> &DocumentChannelState {
        &self.state
    }

    fn command(&mut self, from: usize, to: usize, command: AttributeCommand) -> bool {
        let mut session = self.session.borrow_mut();
        let changed = self
            .state
            .on_attribute_command(&mut session.store, from, to, command);
        if changed {
            session.note_writes();
        }
        changed
    }
}

#[wasm_bindgen]
impl ColorView {
    /// Bind to a document; `id = undefined` disables colors for this view
    pub fn bind(&mut self, id: Option<String>, primary: bool, origin: Option<usize>, doc_len: usize) {
        let role = if primary {
            ViewRole::Primary
        } else {
            ViewRole::Secondary { origin }
        };
        let session = self.session.borrow();
        self.state
            .bind_to_document(&session.store, id.as_deref(), role, doc_len);
    }

    /// Bind using a host object that answers the view lookups
    #[wasm_bindgen(js_name = bindWithContext)]
    pub fn bind_with_context(&mut self, context: JsValue) {
        let context = JsViewContext { object: context };
        let session = self.session.borrow();
        self.state.bind_with_context(&session.store, &context);
    }

    /// Carry the channels through a host transaction
    ///
    /// Takes `{ changes: [{ from, to, insert }], docChanged?, oldLength? }`.
    #[wasm_bindgen(js_name = applyEdit)]
    pub fn apply_edit(&mut self, update: JsValue) -> Result<(), JsValue> {
        let update: EditUpdate = deserialize(update, "Invalid edit")?;
        if !update.doc_changed {
            return Ok(());
        }
        let old_len = update.old_length.unwrap_or_else(|| self.state.doc_len());
        let changes = ChangeSet::new(update.changes, old_len).map_err(|e| {
            wasm_error!("applyEdit on {:?} rejected", self.state.document_id());
            js_error("Invalid edit", e)
        })?;

        let mut session = self.session.borrow_mut();
        self.state.on_edit(&mut session.store, &changes);
        session.note_writes();
        Ok(())
    }

    /// Set (`color`) or clear (`undefined`) the text color of `[from, to)`
    #[wasm_bindgen(js_name = setTextColor)]
    pub fn set_text_color(&mut self, from: usize, to: usize, color: Option<String>) -> bool {
        self.command(from, to, AttributeCommand::Text(color))
    }

    /// Set (`color`) or clear (`undefined`) the background color of `[from, to)`
    #[wasm_bindgen(js_name = setBgColor)]
    pub fn set_bg_color(&mut self, from: usize, to: usize, color: Option<String>) -> bool {
        self.command(from, to, AttributeCommand::Bg(color))
    }

    /// Apply a palette entry by name; `"Default"` clears
    #[wasm_bindgen(js_name = setTextColorByName)]
    pub fn set_text_color_by_name(&mut self, from: usize, to: usize, name: &str) -> Result<bool, JsValue> {
        let color = self.config.resolve_text_color(name).ok_or_else(|| {
            wasm_warn!("Unknown text color '{}'", name);
            JsValue::from_str(&format!("Unknown text color '{}'", name))
        })?;
        Ok(self.command(from, to, AttributeCommand::Text(color)))
    }

    #[wasm_bindgen(js_name = setBgColorByName)]
    pub fn set_bg_color_by_name(&mut self, from: usize, to: usize, name: &str) -> Result<bool, JsValue> {
        let color = self.config.resolve_bg_color(name).ok_or_else(|| {
            wasm_warn!("Unknown background color '{}'", name);
            JsValue::from_str(&format!("Unknown background color '{}'", name))
        })?;
        Ok(self.command(from, to, AttributeCommand::Bg(color)))
    }

    /// `mode` is one of `toggle`, `set`, `clear`
    #[wasm_bindgen(js_name = setUnderline)]
    pub fn set_underline(&mut self, from: usize, to: usize, mode: &str) -> Result<bool, JsValue> {
        let command = match mode {
            "toggle" => UnderlineCommand::Toggle,
            "set" => UnderlineCommand::Set,
            "clear" => UnderlineCommand::Clear,
            other => {
                wasm_error!("Unknown underline mode '{}'", other);
                return Err(JsValue::from_str(&format!("Unknown underline mode '{}'", other)));
            }
        };
        Ok(self.command(from, to, AttributeCommand::Underline(command)))
    }

    #[wasm_bindgen(js_name = toggleUnderline)]
    pub fn toggle_underline(&mut self, from: usize, to: usize) -> bool {
        self.command(from, to, AttributeCommand::Underline(UnderlineCommand::Toggle))
    }

    /// Apply `{ channel: "text" | "bg" | "underline", value }`
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, from: usize, to: usize, command: JsValue) -> Result<bool, JsValue> {
        let command: AttributeCommand = deserialize(command, "Invalid command")?;
        Ok(self.command(from, to, command))
    }

    /// Current mark instructions, ordered by `from`
    pub fn decorations(&mut self) -> Result<JsValue, JsValue> {
        let version = self.state.version();
        let decorations = self.state.decorations();
        wasm_log!("decorations v{}: {}", version, decorations.len());
        serialize(&decorations, "Failed to serialize decorations")
    }

    /// Bumped after every change to the channels
    pub fn version(&self) -> f64 {
        self.state.version() as f64
    }

    /// The view's working copy as `{ text, bg, underline }`
    pub fn colors(&self) -> Result<JsValue, JsValue> {
        serialize(self.state.data(), "Failed to serialize colors")
    }

    #[wasm_bindgen(js_name = textColorAt)]
    pub fn text_color_at(&self, pos: usize) -> Option<String> {
        self.state.text_color_at(pos).map(str::to_string)
    }

    #[wasm_bindgen(js_name = bgColorAt)]
    pub fn bg_color_at(&self, pos: usize) -> Option<String> {
        self.state.bg_color_at(pos).map(str::to_string)
    }

    #[wasm_bindgen(js_name = isUnderlined)]
    pub fn is_underlined(&self, from: usize, to: usize) -> bool {
        self.state.is_underlined(from, to)
    }

    #[wasm_bindgen(js_name = documentId)]
    pub fn document_id(&self) -> Option<String> {
        self.state.document_id().map(str::to_string)
    }

    #[wasm_bindgen(js_name = isPrimary)]
    pub fn is_primary(&self) -> bool {
        self.state.is_primary()
    }

    #[wasm_bindgen(js_name = docLength)]
    pub fn doc_length(&self) -> usize {
        self.state.doc_len()
    }
}
