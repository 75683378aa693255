//! Styled ranges and the algebra over them
//!
//! Ranges are stored separately from the text and linked by position. They
//! track edits by being mapped through each change set, and every mutation
//! leaves a channel's list in canonical form.

pub mod algebra;
pub mod span;

pub use algebra::{
    apply_attribute_change, canonicalize, clamp, gaps, is_canonical, is_covered,
    map_through_edit, merge_adjacent, normalize, rebase, subtract, toggle, value_at,
};
pub use span::{ColoredRange, Interval, Range};
