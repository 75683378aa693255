//! Static rendering over an already rendered node tree
//!
//! The tree's text content must match the document buffer at the time the
//! colors were last saved. Text leaves are walked in document order and each
//! styled leaf is replaced in place by plain text nodes and `span` wrappers.

use super::segments::{Fragment, LeafSegmenter};
use crate::channels::FileColorData;
use crate::text::OffsetUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of a rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderNode {
    Text { text: String },
    Element(ElementNode),
}

impl RenderNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text { text: text.into() }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text { text } => out.push_str(text),
            RenderNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serialize as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderNode::Text { text } => escape_into(out, text, false),
            RenderNode::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if !element.classes.is_empty() {
                    out.push_str(" class=\"");
                    escape_into(out, &element.classes.join(" "), true);
                    out.push('"');
                }
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, value, true);
                    out.push('"');
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// An element with its classes, other attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<RenderNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: RenderNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(RenderNode::text(text))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn into_node(self) -> RenderNode {
        RenderNode::Element(self)
    }
}

/// Decides which elements hold text that must never be restyled
pub trait OpaqueRegion {
    fn is_opaque(&self, element: &ElementNode) -> bool;
}

impl<F> OpaqueRegion for F
where
    F: Fn(&ElementNode) -> bool,
{
    fn is_opaque(&self, element: &ElementNode) -> bool {
        self(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SimpleSelector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(source: &str) -> Option<Self> {
        if source.is_empty()
            || source
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '#' | '[' | ':' | '>' | '+' | '~'))
        {
            return None;
        }
        let mut parts = source.split('.');
        let tag = parts
            .next()
            .filter(|tag| !tag.is_empty() && *tag != "*")
            .map(str::to_ascii_lowercase);
        let classes: Vec<String> = parts.map(str::to_string).collect();
        if classes.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { tag, classes })
    }

    fn matches(&self, element: &ElementNode) -> bool {
        self.tag
            .as_deref()
            .map_or(true, |tag| element.tag.eq_ignore_ascii_case(tag))
            && self.classes.iter().all(|class| element.has_class(class))
    }
}

/// Comma-separated list of simple selectors (`tag`, `.class`, `tag.class`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<SimpleSelector>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Self {
        let selectors = source
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| {
                let parsed = SimpleSelector::parse(s);
                if parsed.is_none() {
                    log::warn!("Unsupported opaque selector '{}' ignored", s);
                }
                parsed
            })
            .collect();
        Self { selectors }
    }

    /// A list matching nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn matches(&self, element: &ElementNode) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }
}

impl OpaqueRegion for SelectorList {
    fn is_opaque(&self, element: &ElementNode) -> bool {
        self.matches(element)
    }
}

/// What a static walk did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Non-empty text leaves visited
    pub leaves: usize,
    /// Leaves replaced by styled fragments
    pub restyled: usize,
    /// Leaves left raw because they sit in an opaque region
    pub skipped: usize,
    /// Total text length seen, in offset units
    pub length: usize,
}

impl Fragment {
    fn into_node(self) -> RenderNode {
        if self.is_plain() {
            return RenderNode::text(self.text);
        }
        let mut span = ElementNode::new("span").with_attr("style", self.style.to_css());
        span.classes = self
            .style
            .class_names()
            .split(' ')
            .map(str::to_string)
            .collect();
        span.with_text(self.text).into_node()
    }
}

struct Walker<'a> {
    segmenter: LeafSegmenter<'a>,
    opaque: &'a dyn OpaqueRegion,
    unit: OffsetUnit,
    offset: usize,
    summary: WalkSummary,
}

impl Walker<'_> {
    fn walk(&mut self, element: &mut ElementNode, inside_opaque: bool) {
        let inside_opaque = inside_opaque || self.opaque.is_opaque(element);
        let children = std::mem::take(&mut element.children);
        let mut out = Vec::with_capacity(children.len());

        for child in children {
            match child {
                RenderNode::Text { text } => {
                    let start = self.offset;
                    let len = self.unit.len(&text);
                    self.offset += len;
                    if len == 0 {
                        out.push(RenderNode::Text { text });
                        continue;
                    }
                    self.summary.leaves += 1;
                    if inside_opaque {
                        self.summary.skipped += 1;
                        out.push(RenderNode::Text { text });
                        continue;
                    }
                    match self.segmenter.segment(start, &text) {
                        Some(fragments) => {
                            self.summary.restyled += 1;
                            out.extend(fragments.into_iter().map(Fragment::into_node));
                        }
                        None => out.push(RenderNode::Text { text }),
                    }
                }
                RenderNode::Element(mut child) => {
                    self.walk(&mut child, inside_opaque);
                    out.push(RenderNode::Element(child));
                }
            }
        }

        element.children = out;
    }
}

/// Apply saved colors to a rendered tree in place
///
/// Offsets count every text leaf, opaque ones included, so positions stay
/// aligned with the buffer even though opaque text is never restyled.
pub fn render_static(
    root: &mut ElementNode,
    data: &FileColorData,
    opaque: &dyn OpaqueRegion,
    unit: OffsetUnit,
) -> WalkSummary {
    if data.is_empty() {
        return WalkSummary::default();
    }

    let data = data.canonical();

    let mut walker = Walker {
        segmenter: LeafSegmenter::new(&data, unit),
        opaque,
        unit,
        offset: 0,
        summary: WalkSummary::default(),
    };
    walker.walk(root, false);
    walker.summary.length = walker.offset;

    log::debug!(
        "Static render: {} leaves, {} restyled, {} opaque",
        walker.summary.leaves,
        walker.summary.restyled,
        walker.summary.skipped
    );
    walker.summary
}
