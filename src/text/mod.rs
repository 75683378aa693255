//! Layer 0: Text positions and edits
//!
//! The host buffer is the source of truth for document content. This layer
//! only knows how positions are counted and how an edit moves them.
//!
//! ## Modules
//!
//! - `units`: Offset units (UTF-16 code units or code points)
//! - `edit`: Change descriptions and old → new position mapping

pub mod edit;
pub mod units;

// Re-exports for convenience
pub use edit::{Assoc, Change, ChangeSet, TextEdit};
pub use units::OffsetUnit;
