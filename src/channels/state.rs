//! Per-view channel state
//!
//! One [`DocumentChannelState`] per open editing surface. It is the working
//! copy: edits and commands are applied to it one at a time, and after every
//! mutation the primary view hands the result to the storage collaborator.

use super::store::ColorStorage;
use super::{Channel, FileColorData};
use crate::config::UnderlineToggle;
use crate::error::Result;
use crate::ranges::{self, ColoredRange, Range};
use crate::render::decorations::{build_decorations, Decoration};
use crate::text::ChangeSet;
use serde::{Deserialize, Serialize};

/// How a view relates to the document it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ViewRole {
    /// The full-document surface; the only one allowed to save
    Primary,
    /// An embedded surface showing a slice of the document
    ///
    /// `origin` is where the slice starts in the full document. Without it
    /// the coordinate spaces cannot be reconciled and nothing is shown.
    Secondary { origin: Option<usize> },
}

impl ViewRole {
    pub fn is_primary(self) -> bool {
        matches!(self, ViewRole::Primary)
    }
}

/// Host-side lookups made when a view binds
pub trait ViewContext {
    /// Stable document key (e.g. file path), if the view shows a document
    fn document_id(&self) -> Option<String>;

    /// Whether this view is the primary surface for its document
    fn role(&self) -> Result<ViewRole>;

    /// Current buffer length in offset units
    fn doc_len(&self) -> usize;
}

/// Explicit underline command shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineCommand {
    Toggle,
    Set,
    Clear,
}

/// A styling command over a half-open selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "channel", content = "value")]
pub enum AttributeCommand {
    /// Set the text color, or clear it with `None`
    Text(Option<String>),
    /// Set the background color, or clear it with `None`
    Bg(Option<String>),
    Underline(UnderlineCommand),
}

impl AttributeCommand {
    pub fn channel(&self) -> Channel {
        match self {
            AttributeCommand::Text(_) => Channel::Text,
            AttributeCommand::Bg(_) => Channel::Bg,
            AttributeCommand::Underline(_) => Channel::Underline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    id: String,
    role: ViewRole,
}

/// Working copy of one view's channels
#[derive(Debug, Clone, Default)]
pub struct DocumentChannelState {
    data: FileColorData,
    doc_len: usize,
    binding: Option<Binding>,
    underline_toggle: UnderlineToggle,
    version: u64,
    decorations: Option<Vec<Decoration>>,
}

impl DocumentChannelState {
    pub fn new(underline_toggle: UnderlineToggle) -> Self {
        Self {
            underline_toggle,
            ..Self::default()
        }
    }

    /// Bind this view to a document and load its channels
    ///
    /// `id = None` leaves the view unbound: it shows nothing and ignores
    /// commands. Loaded ranges are clamped to `doc_len`, since stored data
    /// may belong to a differently sized buffer.
    pub fn bind_to_document(
        &mut self,
        storage: &dyn ColorStorage,
        id: Option<&str>,
        role: ViewRole,
        doc_len: usize,
    ) {
        self.doc_len = doc_len;
        match id {
            None => {
                log::debug!("View has no document, colors disabled");
                self.binding = None;
                self.data = FileColorData::default();
            }
            Some(id) => {
                let stored = storage.load(id).unwrap_or_default();
                self.data = match role {
                    ViewRole::Primary => stored.clamped(doc_len),
                    ViewRole::Secondary { origin: Some(origin) } => {
                        stored.rebased(origin).clamped(doc_len)
                    }
                    ViewRole::Secondary { origin: None } => FileColorData::default(),
                };
                log::debug!("Bound view to {} as {:?}", id, role);
                self.binding = Some(Binding {
                    id: id.to_string(),
                    role,
                });
            }
        }
        self.touch();
    }

    /// Bind using the host's lookups
    ///
    /// If the host cannot say whether the view is primary, bind as a
    /// secondary view that shows nothing and never saves.
    pub fn bind_with_context(&mut self, storage: &dyn ColorStorage, context: &dyn ViewContext) {
        let id = context.document_id();
        let role = context.role().unwrap_or_else(|err| {
            log::warn!("Cannot determine view role ({}), disabling colors for this view", err);
            ViewRole::Secondary { origin: None }
        });
        self.bind_to_document(storage, id.as_deref(), role, context.doc_len());
    }

    /// Carry every channel through a document change
    pub fn on_edit(&mut self, storage: &mut dyn ColorStorage, changes: &ChangeSet) {
        if changes.old_len() != self.doc_len {
            log::warn!(
                "Edit expects a {}-unit document, view has {}",
                changes.old_len(),
                self.doc_len
            );
        }
        let new_len = changes.new_len();
        if changes.is_empty() && new_len == self.doc_len {
            return;
        }

        self.data = self.data.mapped(changes).clamped(new_len);
        self.doc_len = new_len;
        self.persist(storage);
        self.touch();
    }

    /// Apply a styling command over `[from, to)`
    ///
    /// Returns whether anything changed. Empty or inverted selections and
    /// commands on an unbound or disabled view are dropped.
    pub fn on_attribute_command(
        &mut self,
        storage: &mut dyn ColorStorage,
        from: usize,
        to: usize,
        command: AttributeCommand,
    ) -> bool {
        if !self.is_enabled() {
            log::debug!("Ignoring {} command on a view with colors disabled", command.channel().name());
            return false;
        }
        let to = to.min(self.doc_len);
        if from >= to {
            return false;
        }

        let next = match command {
            AttributeCommand::Text(color) => FileColorData {
                text: ranges::apply_attribute_change(&self.data.text, from, to, color),
                ..self.data.clone()
            },
            AttributeCommand::Bg(color) => FileColorData {
                bg: ranges::apply_attribute_change(&self.data.bg, from, to, color),
                ..self.data.clone()
            },
            AttributeCommand::Underline(underline) => FileColorData {
                underline: self.apply_underline(from, to, underline),
                ..self.data.clone()
            },
        };

        if next == self.data {
            return false;
        }
        self.data = next;
        self.persist(storage);
        self.touch();
        true
    }

    pub fn set_text_color(
        &mut self,
        storage: &mut dyn ColorStorage,
        from: usize,
        to: usize,
        color: Option<String>,
    ) -> bool {
        self.on_attribute_command(storage, from, to, AttributeCommand::Text(color))
    }

    pub fn set_bg_color(
        &mut self,
        storage: &mut dyn ColorStorage,
        from: usize,
        to: usize,
        color: Option<String>,
    ) -> bool {
        self.on_attribute_command(storage, from, to, AttributeCommand::Bg(color))
    }

    pub fn set_underline(
        &mut self,
        storage: &mut dyn ColorStorage,
        from: usize,
        to: usize,
        command: UnderlineCommand,
    ) -> bool {
        self.on_attribute_command(storage, from, to, AttributeCommand::Underline(command))
    }

    fn apply_underline(&self, from: usize, to: usize, command: UnderlineCommand) -> Vec<Range> {
        let current = &self.data.underline;
        match command {
            UnderlineCommand::Set => ranges::apply_attribute_change(current, from, to, Some(())),
            UnderlineCommand::Clear => ranges::subtract(current, from, to),
            UnderlineCommand::Toggle => match self.underline_toggle {
                UnderlineToggle::GapFill => ranges::toggle(current, from, to),
                UnderlineToggle::FollowFirst => {
                    if ranges::value_at(current, from).is_some() {
                        ranges::subtract(current, from, to)
                    } else {
                        ranges::apply_attribute_change(current, from, to, Some(()))
                    }
                }
            },
        }
    }

    fn persist(&self, storage: &mut dyn ColorStorage) {
        if let Some(binding) = &self.binding {
            if binding.role.is_primary() {
                storage.save(&binding.id, self.data.clone());
            }
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.decorations = None;
    }

    /// Whether this view shows and accepts colors
    ///
    /// False when unbound, or when a secondary view has no known origin.
    pub fn is_enabled(&self) -> bool {
        match self.role() {
            None | Some(ViewRole::Secondary { origin: None }) => false,
            Some(_) => true,
        }
    }

    /// Decorations for the live view, rebuilt lazily after each mutation
    pub fn decorations(&mut self) -> &[Decoration] {
        if !self.is_enabled() {
            return &[];
        }
        let (data, doc_len) = (&self.data, self.doc_len);
        self.decorations
            .get_or_insert_with(|| build_decorations(data, doc_len))
    }

    pub fn data(&self) -> &FileColorData {
        &self.data
    }

    pub fn text(&self) -> &[ColoredRange] {
        &self.data.text
    }

    pub fn bg(&self) -> &[ColoredRange] {
        &self.data.bg
    }

    pub fn underline(&self) -> &[Range] {
        &self.data.underline
    }

    pub fn doc_len(&self) -> usize {
        self.doc_len
    }

    /// Bumped on every bind, edit and effective command
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn document_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.id.as_str())
    }

    pub fn role(&self) -> Option<ViewRole> {
        self.binding.as_ref().map(|b| b.role)
    }

    pub fn is_primary(&self) -> bool {
        self.role().is_some_and(ViewRole::is_primary)
    }

    pub fn text_color_at(&self, pos: usize) -> Option<&str> {
        ranges::value_at(&self.data.text, pos).map(|r| r.color.as_str())
    }

    pub fn bg_color_at(&self, pos: usize) -> Option<&str> {
        ranges::value_at(&self.data.bg, pos).map(|r| r.color.as_str())
    }

    /// Whether `[from, to)` is underlined throughout (toolbar active state)
    pub fn is_underlined(&self, from: usize, to: usize) -> bool {
        ranges::is_covered(&self.data.underline, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ColorStore;
    use crate::error::ColorizeError;

    fn primary(store: &ColorStore, len: usize) -> DocumentChannelState {
        let mut state = DocumentChannelState::default();
        state.bind_to_document(store, Some("doc.md"), ViewRole::Primary, len);
        state
    }

    struct BrokenContext;

    impl ViewContext for BrokenContext {
        fn document_id(&self) -> Option<String> {
            Some("doc.md".to_string())
        }

        fn role(&self) -> Result<ViewRole> {
            Err(ColorizeError::Context("no markdown view".to_string()))
        }

        fn doc_len(&self) -> usize {
            20
        }
    }

    #[test]
    fn test_command_persists_from_primary() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        assert!(state.set_text_color(&mut store, 5, 10, Some("red".to_string())));
        assert_eq!(store.get("doc.md").unwrap().text, vec![ColoredRange::new(5, 10, "red")]);
    }

    #[test]
    fn test_scenario_overwrite_tail() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        state.set_text_color(&mut store, 5, 10, Some("red".to_string()));
        state.set_text_color(&mut store, 7, 12, Some("blue".to_string()));
        assert_eq!(
            state.text(),
            &[ColoredRange::new(5, 7, "red"), ColoredRange::new(7, 12, "blue")]
        );
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        let version = state.version();
        assert!(!state.set_bg_color(&mut store, 4, 4, Some("yellow".to_string())));
        assert!(!state.set_bg_color(&mut store, 25, 30, Some("yellow".to_string())));
        assert_eq!(state.version(), version);
        assert!(store.is_empty());
    }

    #[test]
    fn test_selection_is_clamped_to_buffer() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 10);
        state.set_bg_color(&mut store, 6, 40, Some("yellow".to_string()));
        assert_eq!(state.bg(), &[ColoredRange::new(6, 10, "yellow")]);
    }

    #[test]
    fn test_unbound_view_drops_writes() {
        let mut store = ColorStore::new();
        let mut state = DocumentChannelState::default();
        state.bind_to_document(&store, None, ViewRole::Primary, 20);
        assert!(!state.set_text_color(&mut store, 0, 5, Some("red".to_string())));
        assert!(state.text().is_empty());
        assert!(state.decorations().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_bind_clamps_stale_data() {
        let mut store = ColorStore::new();
        store.save(
            "doc.md",
            FileColorData {
                text: vec![ColoredRange::new(2, 50, "red")],
                ..FileColorData::default()
            },
        );
        let state = primary(&store, 10);
        assert_eq!(state.text(), &[ColoredRange::new(2, 10, "red")]);
        // Binding alone never writes back
        assert_eq!(store.get("doc.md").unwrap().text[0].to, 50);
    }

    #[test]
    fn test_edit_maps_and_persists() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        state.set_text_color(&mut store, 5, 10, Some("red".to_string()));
        state.on_edit(&mut store, &ChangeSet::insert(0, 3, 20).unwrap());
        assert_eq!(state.text(), &[ColoredRange::new(8, 13, "red")]);
        assert_eq!(state.doc_len(), 23);
        assert_eq!(store.get("doc.md").unwrap().text, vec![ColoredRange::new(8, 13, "red")]);
    }

    #[test]
    fn test_edit_deleting_everything_clears_channels() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        state.set_underline(&mut store, 2, 8, UnderlineCommand::Set);
        state.on_edit(&mut store, &ChangeSet::delete(0, 20, 20).unwrap());
        assert!(state.underline().is_empty());
        assert!(store.get("doc.md").unwrap().is_empty());
    }

    #[test]
    fn test_secondary_never_saves() {
        let mut store = ColorStore::new();
        let mut main = primary(&store, 20);
        main.set_text_color(&mut store, 0, 10, Some("red".to_string()));
        store.mark_clean();

        let mut cell = DocumentChannelState::default();
        cell.bind_to_document(&store, Some("doc.md"), ViewRole::Secondary { origin: Some(4) }, 3);
        assert_eq!(cell.text(), &[ColoredRange::new(0, 3, "red")]);

        assert!(cell.set_text_color(&mut store, 0, 3, Some("blue".to_string())));
        cell.on_edit(&mut store, &ChangeSet::delete(0, 3, 3).unwrap());
        assert!(!store.is_dirty());
        assert_eq!(store.get("doc.md").unwrap().text, vec![ColoredRange::new(0, 10, "red")]);
    }

    #[test]
    fn test_unreconciled_secondary_shows_nothing() {
        let mut store = ColorStore::new();
        let mut main = primary(&store, 20);
        main.set_text_color(&mut store, 0, 10, Some("red".to_string()));

        let mut fragment = DocumentChannelState::default();
        fragment.bind_to_document(&store, Some("doc.md"), ViewRole::Secondary { origin: None }, 20);
        assert!(fragment.text().is_empty());
        assert!(fragment.decorations().is_empty());

        assert!(!fragment.set_bg_color(&mut store, 2, 6, Some("yellow".to_string())));
        assert!(fragment.decorations().is_empty());
    }

    #[test]
    fn test_failed_role_lookup_degrades_to_nothing() {
        let mut store = ColorStore::new();
        let mut main = primary(&store, 20);
        main.set_text_color(&mut store, 0, 10, Some("red".to_string()));
        store.mark_clean();

        let mut state = DocumentChannelState::default();
        state.bind_with_context(&store, &BrokenContext);
        assert_eq!(state.role(), Some(ViewRole::Secondary { origin: None }));
        assert!(!state.is_enabled());
        assert!(state.decorations().is_empty());

        assert!(!state.set_text_color(&mut store, 0, 5, Some("red".to_string())));
        assert!(!state.set_underline(&mut store, 0, 5, UnderlineCommand::Set));
        assert!(state.text().is_empty());
        assert!(state.decorations().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_underline_toggle_gap_fill() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        state.set_underline(&mut store, 0, 5, UnderlineCommand::Set);
        state.set_underline(&mut store, 3, 8, UnderlineCommand::Toggle);
        assert_eq!(state.underline(), &[Range::new(0, 8)]);
        assert!(state.is_underlined(3, 8));
        state.set_underline(&mut store, 3, 8, UnderlineCommand::Toggle);
        assert_eq!(state.underline(), &[Range::new(0, 3)]);
    }

    #[test]
    fn test_underline_toggle_follow_first() {
        let mut store = ColorStore::new();
        let mut state = DocumentChannelState::new(UnderlineToggle::FollowFirst);
        state.bind_to_document(&store, Some("doc.md"), ViewRole::Primary, 20);
        state.set_underline(&mut store, 0, 5, UnderlineCommand::Set);
        state.set_underline(&mut store, 3, 8, UnderlineCommand::Toggle);
        assert_eq!(state.underline(), &[Range::new(0, 3)]);
        state.set_underline(&mut store, 3, 8, UnderlineCommand::Toggle);
        assert_eq!(state.underline(), &[Range::new(0, 8)]);
    }

    #[test]
    fn test_decorations_cache_invalidates() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        assert!(state.decorations().is_empty());
        state.set_bg_color(&mut store, 0, 4, Some("yellow".to_string()));
        assert_eq!(state.decorations().len(), 1);
        state.set_bg_color(&mut store, 0, 4, None);
        assert!(state.decorations().is_empty());
    }

    #[test]
    fn test_queries() {
        let mut store = ColorStore::new();
        let mut state = primary(&store, 20);
        state.set_text_color(&mut store, 0, 4, Some("red".to_string()));
        state.set_bg_color(&mut store, 2, 6, Some("yellow".to_string()));
        assert_eq!(state.text_color_at(3), Some("red"));
        assert_eq!(state.text_color_at(4), None);
        assert_eq!(state.bg_color_at(5), Some("yellow"));
        assert_eq!(state.document_id(), Some("doc.md"));
        assert!(state.is_primary());
    }
}
