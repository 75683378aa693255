//! Edit descriptions and position mapping
//!
//! The host buffer owns the text. What reaches us is a description of each
//! transaction: which spans of the old document were replaced and how long
//! the replacement was. That is enough to carry every stored position from
//! the old document into the new one.

use super::units::OffsetUnit;
use crate::error::{ColorizeError, Result};
use serde::{Deserialize, Serialize};

/// A single replacement in old-document coordinates
///
/// `[from, to)` is removed and `insert` units of new text take its place.
/// A pure insertion has `from == to`, a pure deletion has `insert == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    #[serde(default)]
    pub insert: usize,
}

impl Change {
    pub fn new(from: usize, to: usize, insert: usize) -> Self {
        Self { from, to, insert }
    }

    fn deleted(&self) -> usize {
        self.to - self.from
    }

    fn is_noop(&self) -> bool {
        self.from == self.to && self.insert == 0
    }
}

/// A replacement carrying its new text, for hosts that let us apply edits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub text: String,
}

impl TextEdit {
    pub fn new(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
        }
    }
}

/// Which side of an insertion a mapped position sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before text inserted at this position
    Before,
    /// Move past text inserted at this position
    After,
}

/// All changes of one transaction, sorted and non-overlapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    changes: Vec<Change>,
    old_len: usize,
}

impl ChangeSet {
    /// Build a change set against a document of `old_len` units
    ///
    /// Changes may arrive in any order. Overlapping changes, inverted
    /// spans and spans past the end of the document are rejected.
    pub fn new(mut changes: Vec<Change>, old_len: usize) -> Result<Self> {
        changes.retain(|c| !c.is_noop());
        changes.sort_by_key(|c| (c.from, c.to));

        let mut prev_end = 0;
        for change in &changes {
            if change.from > change.to {
                return Err(ColorizeError::InvalidChange(format!(
                    "inverted span {}..{}",
                    change.from, change.to
                )));
            }
            if change.to > old_len {
                return Err(ColorizeError::InvalidChange(format!(
                    "span {}..{} past document end {}",
                    change.from, change.to, old_len
                )));
            }
            if change.from < prev_end {
                return Err(ColorizeError::InvalidChange(format!(
                    "span {}..{} overlaps a previous change ending at {}",
                    change.from, change.to, prev_end
                )));
            }
            prev_end = change.to;
        }

        Ok(Self { changes, old_len })
    }

    /// A transaction that changes nothing
    pub fn empty(len: usize) -> Self {
        Self {
            changes: Vec::new(),
            old_len: len,
        }
    }

    /// Insert `len` units at `at`
    pub fn insert(at: usize, len: usize, old_len: usize) -> Result<Self> {
        Self::new(vec![Change::new(at, at, len)], old_len)
    }

    /// Delete `[from, to)`
    pub fn delete(from: usize, to: usize, old_len: usize) -> Result<Self> {
        Self::new(vec![Change::new(from, to, 0)], old_len)
    }

    /// Replace `[from, to)` with `len` units
    pub fn replace(from: usize, to: usize, len: usize, old_len: usize) -> Result<Self> {
        Self::new(vec![Change::new(from, to, len)], old_len)
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn old_len(&self) -> usize {
        self.old_len
    }

    /// Document length after the transaction
    pub fn new_len(&self) -> usize {
        self.changes
            .iter()
            .fold(self.old_len, |len, c| len + c.insert - c.deleted())
    }

    /// Map a position in the old document into the new one
    ///
    /// Positions touching or inside a replaced span land at the start of the
    /// replacement (`Before`) or just past the inserted text (`After`).
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta: isize = 0;
        for (i, change) in self.changes.iter().enumerate() {
            if pos < change.from {
                break;
            }
            let start = (change.from as isize + delta) as usize;
            // With After, a change touching the next one hands the position on
            let handed_on = assoc == Assoc::After
                && pos == change.to
                && self.changes.get(i + 1).is_some_and(|next| next.from == pos);
            if pos <= change.to && !handed_on {
                return match assoc {
                    Assoc::Before => start,
                    Assoc::After => start + change.insert,
                };
            }
            delta += change.insert as isize - change.deleted() as isize;
        }
        (pos as isize + delta).max(0) as usize
    }

    /// Apply replacements to `text`, returning the new text and the change set
    /// describing them
    pub fn splice(text: &str, edits: &[TextEdit], unit: OffsetUnit) -> Result<(String, Self)> {
        let old_len = unit.len(text);
        let changes = edits
            .iter()
            .map(|e| Change::new(e.from, e.to, unit.len(&e.text)))
            .collect();
        let set = Self::new(changes, old_len)?;

        let mut sorted: Vec<&TextEdit> = edits.iter().collect();
        sorted.sort_by_key(|e| (e.from, e.to));

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for edit in sorted {
            out.push_str(unit.slice(text, cursor, edit.from));
            out.push_str(&edit.text);
            cursor = edit.to;
        }
        out.push_str(unit.slice(text, cursor, old_len));

        Ok((out, set))
    }
}
