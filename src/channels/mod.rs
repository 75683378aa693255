//! Annotation channels
//!
//! Three independent layers of styling over one document: text color,
//! background color and underline. Each layer is a canonical range list.
//!
//! ## Modules
//!
//! - `state`: Per-view state machine (bind, edit, command, persist)
//! - `store`: Storage collaborator trait and the in-memory per-document store
//! - `persist`: Debounced save scheduling with explicit flush

pub mod persist;
pub mod state;
pub mod store;

pub use persist::PersistQueue;
pub use state::{AttributeCommand, DocumentChannelState, UnderlineCommand, ViewContext, ViewRole};
pub use store::{ColorStorage, ColorStore};

use crate::ranges::{self, ColoredRange, Range};
use crate::text::ChangeSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::borrow::Cow;

/// One independently tracked style attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Channel {
    Text = 0,
    Bg = 1,
    Underline = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Text, Channel::Bg, Channel::Underline];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Text => "text",
            Channel::Bg => "bg",
            Channel::Underline => "underline",
        }
    }
}

/// The three channel lists of one document; the unit of persistence
///
/// Serializes as `{ text: [...], bg: [...], underline: [...] }`. Missing
/// arrays read back as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileColorData {
    pub text: Vec<ColoredRange>,
    pub bg: Vec<ColoredRange>,
    pub underline: Vec<Range>,
}

impl FileColorData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.bg.is_empty() && self.underline.is_empty()
    }

    /// Read persisted data without trusting it
    ///
    /// Entries with missing or non-integer offsets, `from >= to`, or a
    /// missing color are dropped. What survives is brought into canonical
    /// form, so a hand-edited file cannot break editing.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                log::warn!("Ignoring color data that is not an object");
            }
            return Self::default();
        };

        let (text, dropped_text) = colored_entries(object.get("text"));
        let (bg, dropped_bg) = colored_entries(object.get("bg"));
        let (underline, dropped_underline) = plain_entries(object.get("underline"));

        let dropped = dropped_text + dropped_bg + dropped_underline;
        if dropped > 0 {
            log::warn!("Dropped {} malformed color range(s)", dropped);
        }

        Self {
            text: ranges::canonicalize(text),
            bg: ranges::canonicalize(bg),
            underline: ranges::merge_adjacent(underline),
        }
    }

    /// Clip every channel to a buffer of `len` units
    pub fn clamped(&self, len: usize) -> Self {
        Self {
            text: ranges::clamp(&self.text, len),
            bg: ranges::clamp(&self.bg, len),
            underline: ranges::clamp(&self.underline, len),
        }
    }

    /// Carry every channel through an edit
    pub fn mapped(&self, changes: &ChangeSet) -> Self {
        Self {
            text: ranges::map_through_edit(&self.text, changes),
            bg: ranges::map_through_edit(&self.bg, changes),
            underline: ranges::map_through_edit(&self.underline, changes),
        }
    }

    /// Move every channel into a fragment starting at `origin`
    pub fn rebased(&self, origin: usize) -> Self {
        Self {
            text: ranges::rebase(&self.text, origin),
            bg: ranges::rebase(&self.bg, origin),
            underline: ranges::rebase(&self.underline, origin),
        }
    }

    /// Whether every channel is in canonical form
    pub fn is_canonical(&self) -> bool {
        ranges::is_canonical(&self.text)
            && ranges::is_canonical(&self.bg)
            && ranges::is_canonical(&self.underline)
    }

    /// Borrow as is when canonical, otherwise normalize a copy
    pub fn canonical(&self) -> Cow<'_, Self> {
        if self.is_canonical() {
            return Cow::Borrowed(self);
        }
        log::debug!("Normalizing non-canonical color data");
        Cow::Owned(Self {
            text: ranges::canonicalize(self.text.clone()),
            bg: ranges::canonicalize(self.bg.clone()),
            underline: ranges::merge_adjacent(self.underline.clone()),
        })
    }
}

fn offset(value: Option<&Value>) -> Option<usize> {
    let value = value?;
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    // JS numbers may arrive as floats
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= usize::MAX as f64)
        .map(|f| f as usize)
}

fn bounds(item: &Value) -> Option<(usize, usize)> {
    let from = offset(item.get("from"))?;
    let to = offset(item.get("to"))?;
    (from < to).then_some((from, to))
}

fn colored_entries(list: Option<&Value>) -> (Vec<ColoredRange>, usize) {
    let Some(items) = list.and_then(Value::as_array) else {
        return (Vec::new(), 0);
    };
    let parsed: Vec<ColoredRange> = items
        .iter()
        .filter_map(|item| {
            let (from, to) = bounds(item)?;
            let color = item.get("color")?.as_str()?.trim();
            (!color.is_empty()).then(|| ColoredRange::new(from, to, color))
        })
        .collect();
    let dropped = items.len() - parsed.len();
    (parsed, dropped)
}

fn plain_entries(list: Option<&Value>) -> (Vec<Range>, usize) {
    let Some(items) = list.and_then(Value::as_array) else {
        return (Vec::new(), 0);
    };
    let parsed: Vec<Range> = items
        .iter()
        .filter_map(|item| bounds(item).map(|(from, to)| Range::new(from, to)))
        .collect();
    let dropped = items.len() - parsed.len();
    (parsed, dropped)
}
