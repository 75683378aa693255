//! Colorize WASM Module
//!
//! Non-destructive text color, background color and underline annotations
//! for a mutable text buffer. Colors live beside the text as range lists,
//! follow every edit, and are drawn either as live editor decorations or by
//! restyling an already rendered document.

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
#[cfg(feature = "regex")]
pub mod migrate;
pub mod ranges;
pub mod render;
pub mod text;

// Re-export commonly used types
pub use channels::{Channel, ColorStorage, ColorStore, DocumentChannelState, FileColorData, ViewRole};
pub use config::ColorizeConfig;
pub use error::{ColorizeError, Result};
pub use ranges::{ColoredRange, Range};
pub use text::{ChangeSet, OffsetUnit};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        crate::wasm_warn!("Logger already initialized");
    }

    log::info!("Colorize WASM module initialized");
}
