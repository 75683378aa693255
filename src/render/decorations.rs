//! Live view decorations
//!
//! Turns the three channels into mark instructions for an incrementally
//! updated editor view. Instructions are layered, one per range, never
//! merged into combined style strings.

use super::style::{StyleSet, BG_CLASS, TEXT_CLASS, UNDERLINE_CLASS};
use crate::channels::{Channel, FileColorData};
use crate::ranges;
use serde::{Deserialize, Serialize};

/// One mark over `[from, to)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub channel: Channel,
    /// Inline style, e.g. `color: #E03E3E;`
    pub style: String,
    pub class: String,
}

impl Decoration {
    fn new(from: usize, to: usize, channel: Channel, style: StyleSet) -> Self {
        let class = match channel {
            Channel::Text => TEXT_CLASS,
            Channel::Bg => BG_CLASS,
            Channel::Underline => UNDERLINE_CLASS,
        };
        Self {
            from,
            to,
            channel,
            style: style.to_css(),
            class: class.to_string(),
        }
    }
}

/// Nesting rank at a shared start: backgrounds outermost, text color innermost
fn rank(channel: Channel) -> u8 {
    match channel {
        Channel::Bg => 0,
        Channel::Underline => 1,
        Channel::Text => 2,
    }
}

/// Build the decoration list for the current channels
///
/// Ranges are clamped to `doc_len` first, so stale entries past the end of
/// the buffer never reach the view. The result is ordered by `from`.
pub fn build_decorations(data: &FileColorData, doc_len: usize) -> Vec<Decoration> {
    let text = ranges::clamp(&data.text, doc_len);
    let bg = ranges::clamp(&data.bg, doc_len);
    let underline = ranges::clamp(&data.underline, doc_len);

    if text.is_empty() && bg.is_empty() && underline.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(text.len() + bg.len() + underline.len());
    out.extend(
        text.into_iter()
            .map(|r| Decoration::new(r.from, r.to, Channel::Text, StyleSet::text(r.color))),
    );
    out.extend(
        bg.into_iter()
            .map(|r| Decoration::new(r.from, r.to, Channel::Bg, StyleSet::background(r.color))),
    );
    out.extend(
        underline
            .into_iter()
            .map(|r| Decoration::new(r.from, r.to, Channel::Underline, StyleSet::underline())),
    );

    out.sort_by_key(|d| (d.from, rank(d.channel)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::{ColoredRange, Range};

    #[test]
    fn test_no_ranges_no_decorations() {
        assert!(build_decorations(&FileColorData::default(), 100).is_empty());
    }

    #[test]
    fn test_one_instruction_per_range() {
        let data = FileColorData {
            text: vec![ColoredRange::new(2, 6, "red")],
            bg: vec![ColoredRange::new(0, 10, "yellow")],
            underline: vec![Range::new(4, 8)],
        };
        let decorations = build_decorations(&data, 20);
        assert_eq!(decorations.len(), 3);
        assert_eq!(decorations[0].channel, Channel::Bg);
        assert_eq!(decorations[0].style, "background-color: yellow;");
        assert_eq!(decorations[1].channel, Channel::Text);
        assert_eq!(decorations[1].style, "color: red;");
        assert_eq!(decorations[2].channel, Channel::Underline);
        assert_eq!(decorations[2].style, "text-decoration: underline;");
    }

    #[test]
    fn test_only_text_decorations_set_color() {
        let data = FileColorData {
            text: vec![ColoredRange::new(0, 4, "red")],
            bg: vec![ColoredRange::new(0, 4, "black")],
            underline: vec![Range::new(0, 4)],
        };
        for decoration in build_decorations(&data, 4) {
            let sets_color = decoration.style.starts_with("color:");
            assert_eq!(sets_color, decoration.channel == Channel::Text);
        }
    }

    #[test]
    fn test_shared_start_puts_text_innermost() {
        let data = FileColorData {
            text: vec![ColoredRange::new(0, 4, "red")],
            bg: vec![ColoredRange::new(0, 4, "yellow")],
            underline: Vec::new(),
        };
        let channels: Vec<Channel> = build_decorations(&data, 4).iter().map(|d| d.channel).collect();
        assert_eq!(channels, vec![Channel::Bg, Channel::Text]);
    }

    #[test]
    fn test_stale_ranges_are_clamped() {
        let data = FileColorData {
            text: vec![ColoredRange::new(3, 50, "red"), ColoredRange::new(60, 70, "blue")],
            ..FileColorData::default()
        };
        let decorations = build_decorations(&data, 10);
        assert_eq!(decorations.len(), 1);
        assert_eq!((decorations[0].from, decorations[0].to), (3, 10));
    }
}
