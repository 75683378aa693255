//! Per-document color storage
//!
//! The core never touches the filesystem. It hands finished channel data to
//! a [`ColorStorage`] keyed by document identity; how and when that reaches
//! disk is the host's business.

use super::FileColorData;
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Storage collaborator
pub trait ColorStorage {
    /// Stored data for a document, if any
    fn load(&self, id: &str) -> Option<FileColorData>;

    /// Replace the stored data for a document
    fn save(&mut self, id: &str, data: FileColorData);
}

/// In-memory store of every document's color data
///
/// Entries are created on the first save that carries any range and are
/// never dropped implicitly. Serializes as `{ "<document id>": FileColorData }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorStore {
    documents: BTreeMap<String, FileColorData>,
    dirty: bool,
}

impl ColorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted map, dropping whatever is malformed
    pub fn from_value(value: &Value) -> Self {
        let documents = match value.as_object() {
            Some(object) => object
                .iter()
                .map(|(id, data)| (id.clone(), FileColorData::from_value(data)))
                .collect(),
            None => {
                if !value.is_null() {
                    log::warn!("Persisted color map is not an object, starting empty");
                }
                BTreeMap::new()
            }
        };
        Self {
            documents,
            dirty: false,
        }
    }

    /// Parse a persisted JSON map
    pub fn from_json(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.documents)?)
    }

    pub fn get(&self, id: &str) -> Option<&FileColorData> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether anything changed since the last [`ColorStore::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Forget a document
    pub fn remove(&mut self, id: &str) -> Option<FileColorData> {
        let removed = self.documents.remove(id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Re-key a document that was moved or renamed
    ///
    /// Returns false when there is nothing stored under `from`. An entry
    /// already stored under `to` is replaced.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains(from);
        }
        match self.documents.remove(from) {
            Some(data) => {
                self.documents.insert(to.to_string(), data);
                self.dirty = true;
                true
            }
            None => false,
        }
    }
}

impl ColorStorage for ColorStore {
    fn load(&self, id: &str) -> Option<FileColorData> {
        self.documents.get(id).cloned()
    }

    fn save(&mut self, id: &str, data: FileColorData) {
        match self.documents.get(id) {
            Some(existing) if *existing == data => return,
            // Nothing to remember for a document that never had a range
            None if data.is_empty() => return,
            _ => {}
        }
        log::debug!(
            "Saving colors for {}: {} text, {} bg, {} underline",
            id,
            data.text.len(),
            data.bg.len(),
            data.underline.len()
        );
        self.documents.insert(id.to_string(), data);
        self.dirty = true;
    }
}
