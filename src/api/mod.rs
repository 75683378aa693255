//! Colorize WASM API
//!
//! The JavaScript-facing surface. Everything here converts between JsValue
//! and the core types and forwards to `channels`, `render` and `migrate`.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging macros, serialization and error mapping
//! - `engine`: `ColorEngine`, owner of the persisted map and save schedule
//! - `view`: `ColorView`, the per-surface state machine
//! - `dom`: Static rendering over browser nodes

pub mod helpers;
pub mod dom;
pub mod engine;
pub mod view;

pub use engine::ColorEngine;
pub use view::ColorView;
