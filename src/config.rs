//! Configuration
//!
//! Every field has a default, so an empty document (or `{}` from JS) is a
//! valid configuration.
//!
//! Example:
//! ```yaml
//! persist_debounce_ms: 500
//! offset_unit: utf16
//! opaque_selectors: "code, pre, .math"
//! underline_toggle: gap_fill
//! text_palette:
//!   - { name: Red, value: "#E03E3E" }
//! ```

use crate::error::Result;
use crate::text::OffsetUnit;
use serde::{Deserialize, Serialize};

/// Selectors whose text keeps its raw, unstyled form when rendering statically
pub const DEFAULT_OPAQUE_SELECTORS: &str = "code, pre, .math, .cm-inline-code, .cm-codeblock";

/// Containers that belong to a live editor and must not be touched by the
/// static renderer
pub const DEFAULT_LIVE_EDITOR_SELECTOR: &str = ".markdown-source-view";

/// Palette name that clears the color instead of setting one
pub const DEFAULT_COLOR_NAME: &str = "Default";

/// How an undirected underline toggle treats a partially covered selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineToggle {
    /// Clear when fully covered, otherwise fill the uncovered gaps
    #[default]
    GapFill,
    /// Follow the first character: clear if it is underlined, else cover everything
    FollowFirst,
}

/// A named color offered by the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub value: String,
}

impl PaletteEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorizeConfig {
    /// Quiet period before a pending save is due
    pub persist_debounce_ms: u64,
    /// Unit of every stored offset; must match the host buffer
    pub offset_unit: OffsetUnit,
    /// Comma-separated selectors for opaque regions
    pub opaque_selectors: String,
    /// Selector for live editor islands inside a static view
    pub live_editor_selector: String,
    pub underline_toggle: UnderlineToggle,
    pub text_palette: Vec<PaletteEntry>,
    pub bg_palette: Vec<PaletteEntry>,
}

impl Default for ColorizeConfig {
    fn default() -> Self {
        Self {
            persist_debounce_ms: 300,
            offset_unit: OffsetUnit::Utf16,
            opaque_selectors: DEFAULT_OPAQUE_SELECTORS.to_string(),
            live_editor_selector: DEFAULT_LIVE_EDITOR_SELECTOR.to_string(),
            underline_toggle: UnderlineToggle::GapFill,
            text_palette: default_text_palette(),
            bg_palette: default_bg_palette(),
        }
    }
}

impl ColorizeConfig {
    /// Parse a YAML configuration file
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse a JSON configuration object
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Look up a text color by palette name
    ///
    /// Returns `None` for an unknown name, `Some(None)` for the clearing
    /// entry and `Some(Some(token))` otherwise.
    pub fn resolve_text_color(&self, name: &str) -> Option<Option<String>> {
        resolve(&self.text_palette, name)
    }

    /// Look up a background color by palette name
    pub fn resolve_bg_color(&self, name: &str) -> Option<Option<String>> {
        resolve(&self.bg_palette, name)
    }

    /// Names to show in a color menu, clearing entry first
    pub fn text_color_names(&self) -> Vec<String> {
        names(&self.text_palette)
    }

    pub fn bg_color_names(&self) -> Vec<String> {
        names(&self.bg_palette)
    }
}

fn resolve(palette: &[PaletteEntry], name: &str) -> Option<Option<String>> {
    if name == DEFAULT_COLOR_NAME {
        return Some(None);
    }
    palette
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| Some(entry.value.clone()))
}

fn names(palette: &[PaletteEntry]) -> Vec<String> {
    std::iter::once(DEFAULT_COLOR_NAME.to_string())
        .chain(palette.iter().map(|entry| entry.name.clone()))
        .collect()
}

/// Notion-like text colors (approximate hex values)
pub fn default_text_palette() -> Vec<PaletteEntry> {
    [
        ("Gray", "#9B9A97"),
        ("Brown", "#64473A"),
        ("Orange", "#D9730D"),
        ("Yellow", "#DFAB01"),
        ("Green", "#0F7B6C"),
        ("Blue", "#0B6E99"),
        ("Purple", "#6940A5"),
        ("Pink", "#AD1A72"),
        ("Red", "#E03E3E"),
    ]
    .into_iter()
    .map(|(name, value)| PaletteEntry::new(name, value))
    .collect()
}

/// Notion-like background colors (approximate hex values)
pub fn default_bg_palette() -> Vec<PaletteEntry> {
    [
        ("Gray", "#EBECED"),
        ("Brown", "#E9E5E3"),
        ("Orange", "#FAEBDD"),
        ("Yellow", "#FBF3DB"),
        ("Green", "#DDEDEA"),
        ("Blue", "#DDEBF1"),
        ("Purple", "#EAE4F2"),
        ("Pink", "#F4DFEB"),
        ("Red", "#FBE4E4"),
    ]
    .into_iter()
    .map(|(name, value)| PaletteEntry::new(name, value))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sources_give_defaults() {
        assert_eq!(ColorizeConfig::from_yaml("").unwrap(), ColorizeConfig::default());
        assert_eq!(ColorizeConfig::from_json("{}").unwrap(), ColorizeConfig::default());
    }

    #[test]
    fn test_yaml_overrides_selected_fields() {
        let config = ColorizeConfig::from_yaml(
            "persist_debounce_ms: 1000\noffset_unit: codepoint\nunderline_toggle: follow_first\n",
        )
        .unwrap();
        assert_eq!(config.persist_debounce_ms, 1000);
        assert_eq!(config.offset_unit, OffsetUnit::CodePoint);
        assert_eq!(config.underline_toggle, UnderlineToggle::FollowFirst);
        assert_eq!(config.opaque_selectors, DEFAULT_OPAQUE_SELECTORS);
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(ColorizeConfig::from_yaml("persist_debounce_ms: [").is_err());
    }

    #[test]
    fn test_palette_resolution() {
        let config = ColorizeConfig::default();
        assert_eq!(config.resolve_text_color("Red"), Some(Some("#E03E3E".to_string())));
        assert_eq!(config.resolve_text_color("red"), Some(Some("#E03E3E".to_string())));
        assert_eq!(config.resolve_bg_color("Default"), Some(None));
        assert_eq!(config.resolve_bg_color("Chartreuse"), None);
        assert_eq!(config.text_color_names()[0], "Default");
        assert_eq!(config.bg_color_names().len(), 10);
    }
}
