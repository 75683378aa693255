//! Rendering adapters
//!
//! Two consumers of the same channel data:
//!
//! - `decorations`: Layered mark instructions for an incrementally updated view
//! - `tree`: In-place rewrite of an already rendered node tree
//! - `segments`: Leaf splitting shared by the static walkers
//! - `style`: Inline CSS and class names per channel

pub mod decorations;
pub mod segments;
pub mod style;
pub mod tree;

pub use decorations::{build_decorations, Decoration};
pub use segments::{Fragment, LeafSegmenter, RangeCursor};
pub use style::{StyleSet, BG_CLASS, TEXT_CLASS, UNDERLINE_CLASS};
pub use tree::{render_static, ElementNode, OpaqueRegion, RenderNode, SelectorList, WalkSummary};
