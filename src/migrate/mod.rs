//! Importers for color data kept in older formats
//!
//! - `legacy_html`: Inline `<span>`/`<mark>` color wrappers written into the text

pub mod legacy_html;

pub use legacy_html::{import_legacy_markup, LegacyImport};
