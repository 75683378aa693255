//! Inline HTML color markup
//!
//! Older notes carry colors as literal wrappers in the text:
//! `<span style="color: X">…</span>` for text color and
//! `<mark style="background-color: X">…</mark>` (or a `span` with the same
//! style) for highlights. Importing removes the wrappers from the text and
//! returns the equivalent ranges. Wrappers with any other attributes, and
//! tags that never close, are left in place.

use crate::error::Result;
use crate::ranges::{self, ColoredRange};
use crate::text::{Assoc, Change, ChangeSet, OffsetUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(/?)(span|mark)(\s[^<>]*)?>").unwrap_or_else(|e| panic!("tag pattern: {}", e))
});

static COLOR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*style\s*=\s*(?:"\s*(color|background-color)\s*:\s*([^";]+?)\s*;?\s*"|'\s*(color|background-color)\s*:\s*([^';]+?)\s*;?\s*')\s*$"#,
    )
    .unwrap_or_else(|e| panic!("style pattern: {}", e))
});

/// Result of stripping legacy markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyImport {
    /// Text with the recognized wrappers removed
    pub text: String,
    /// Text colors in coordinates of the stripped text
    pub text_ranges: Vec<ColoredRange>,
    /// Background colors in coordinates of the stripped text
    pub bg_ranges: Vec<ColoredRange>,
    /// Deletions turning the original text into the stripped one
    pub changes: ChangeSet,
}

impl LegacyImport {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WrapperKind {
    Text,
    Bg,
}

#[derive(Debug)]
struct OpenTag {
    name: String,
    /// `None` for wrappers we do not understand
    wrapper: Option<(WrapperKind, String)>,
    start: usize,
    end: usize,
}

#[derive(Debug)]
struct Wrapper {
    kind: WrapperKind,
    color: String,
    open: (usize, usize),
    close: (usize, usize),
}

fn classify(name: &str, attributes: &str) -> Option<(WrapperKind, String)> {
    let captures = COLOR_STYLE.captures(attributes)?;
    let property = captures.get(1).or_else(|| captures.get(3))?.as_str();
    let color = captures.get(2).or_else(|| captures.get(4))?.as_str().trim();
    if color.is_empty() {
        return None;
    }
    let kind = if property.eq_ignore_ascii_case("background-color") {
        WrapperKind::Bg
    } else if name.eq_ignore_ascii_case("span") {
        WrapperKind::Text
    } else {
        return None;
    };
    Some((kind, color.to_string()))
}

/// Find matched wrapper pairs, positions in bytes
fn find_wrappers(text: &str) -> Vec<Wrapper> {
    let mut stack: Vec<OpenTag> = Vec::new();
    let mut wrappers = Vec::new();

    for captures in TAG.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let closing = captures.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = captures.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase();

        if !closing {
            let attributes = captures.get(3).map_or("", |m| m.as_str());
            stack.push(OpenTag {
                wrapper: classify(&name, attributes),
                name,
                start: whole.start(),
                end: whole.end(),
            });
            continue;
        }

        // A close tag that does not match the innermost open one is stray
        if stack.last().map_or(true, |open| open.name != name) {
            log::debug!("Stray </{}> at byte {} left in place", name, whole.start());
            continue;
        }
        let Some(open) = stack.pop() else {
            continue;
        };
        if let Some((kind, color)) = open.wrapper {
            wrappers.push(Wrapper {
                kind,
                color,
                open: (open.start, open.end),
                close: (whole.start(), whole.end()),
            });
        }
    }

    if !stack.is_empty() {
        log::debug!("{} unclosed tag(s) left in place", stack.len());
    }
    wrappers.sort_by_key(|w| w.open.0);
    wrappers
}

/// Converts increasing byte positions into offset units
struct OffsetCounter<'a> {
    text: &'a str,
    unit: OffsetUnit,
    byte: usize,
    offset: usize,
}

impl OffsetCounter<'_> {
    fn at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.offset = 0;
        }
        self.offset += self.unit.len(&self.text[self.byte..byte]);
        self.byte = byte;
        self.offset
    }
}

/// Strip color wrappers from `text` and return them as ranges
///
/// Nested wrappers of the same channel resolve to the innermost color.
pub fn import_legacy_markup(text: &str, unit: OffsetUnit) -> Result<LegacyImport> {
    let wrappers = find_wrappers(text);
    let old_len = unit.len(text);
    if wrappers.is_empty() {
        return Ok(LegacyImport {
            text: text.to_string(),
            text_ranges: Vec::new(),
            bg_ranges: Vec::new(),
            changes: ChangeSet::empty(old_len),
        });
    }

    let mut cuts: Vec<(usize, usize)> = wrappers
        .iter()
        .flat_map(|w| [w.open, w.close])
        .collect();
    cuts.sort_unstable();

    let mut stripped = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in &cuts {
        stripped.push_str(&text[cursor..start]);
        cursor = end;
    }
    stripped.push_str(&text[cursor..]);

    let mut counter = OffsetCounter {
        text,
        unit,
        byte: 0,
        offset: 0,
    };
    let deletions = cuts
        .iter()
        .map(|&(start, end)| {
            let from = counter.at(start);
            let to = counter.at(end);
            Change::new(from, to, 0)
        })
        .collect();
    let changes = ChangeSet::new(deletions, old_len)?;

    let mut text_ranges = Vec::new();
    let mut bg_ranges = Vec::new();
    for wrapper in &wrappers {
        let from = changes.map_pos(counter.at(wrapper.open.1), Assoc::After);
        let to = changes.map_pos(counter.at(wrapper.close.0), Assoc::Before);
        let range = ColoredRange::new(from, to, wrapper.color.clone());
        match wrapper.kind {
            WrapperKind::Text => text_ranges.push(range),
            WrapperKind::Bg => bg_ranges.push(range),
        }
    }

    log::info!(
        "Imported {} text and {} background wrapper(s)",
        text_ranges.len(),
        bg_ranges.len()
    );

    Ok(LegacyImport {
        text: stripped,
        text_ranges: ranges::canonicalize(text_ranges),
        bg_ranges: ranges::canonicalize(bg_ranges),
        changes,
    })
}
