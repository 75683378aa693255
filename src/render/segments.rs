//! Segmentation of text leaves
//!
//! Leaves are visited in document order, so each channel is read through a
//! cursor that only moves forward. A whole walk is a single merge over the
//! leaves and the three range lists.

use super::style::StyleSet;
use crate::channels::FileColorData;
use crate::ranges::{ColoredRange, Interval, Range};
use crate::text::OffsetUnit;

/// Forward-only reader over a canonical range list
#[derive(Debug, Clone)]
pub struct RangeCursor<'a, T> {
    ranges: &'a [T],
    index: usize,
}

impl<'a, T: Interval> RangeCursor<'a, T> {
    pub fn new(ranges: &'a [T]) -> Self {
        Self { ranges, index: 0 }
    }

    /// Skip ranges that end at or before `pos`
    ///
    /// Positions passed to a cursor must never decrease.
    pub fn advance_to(&mut self, pos: usize) {
        while self
            .ranges
            .get(self.index)
            .is_some_and(|r| r.end() <= pos)
        {
            self.index += 1;
        }
    }

    /// Push the boundaries of every range meeting `[start, end)`, clipped to it
    pub fn add_boundaries(&self, out: &mut Vec<usize>, start: usize, end: usize) {
        for r in &self.ranges[self.index..] {
            if r.start() >= end {
                break;
            }
            if r.end() > start {
                out.push(r.start().max(start));
                out.push(r.end().min(end));
            }
        }
    }

    /// The range covering `pos`, advancing the cursor to it
    pub fn range_at(&mut self, pos: usize) -> Option<&'a T> {
        self.advance_to(pos);
        let ranges = self.ranges;
        ranges.get(self.index).filter(|r| r.start() <= pos)
    }
}

/// A piece of a leaf with constant styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub style: StyleSet,
}

impl Fragment {
    pub fn is_plain(&self) -> bool {
        self.style.is_empty()
    }
}

/// Splits consecutive text leaves into styled fragments
#[derive(Debug, Clone)]
pub struct LeafSegmenter<'a> {
    text: RangeCursor<'a, ColoredRange>,
    bg: RangeCursor<'a, ColoredRange>,
    underline: RangeCursor<'a, Range>,
    unit: OffsetUnit,
}

impl<'a> LeafSegmenter<'a> {
    /// `data` must be in canonical form
    pub fn new(data: &'a FileColorData, unit: OffsetUnit) -> Self {
        Self {
            text: RangeCursor::new(&data.text),
            bg: RangeCursor::new(&data.bg),
            underline: RangeCursor::new(&data.underline),
            unit,
        }
    }

    /// Split the leaf `text` that starts at buffer offset `start`
    ///
    /// Returns `None` when no channel touches the leaf, so the caller can
    /// keep the original node.
    pub fn segment(&mut self, start: usize, text: &str) -> Option<Vec<Fragment>> {
        let len = self.unit.len(text);
        if len == 0 {
            return None;
        }
        let end = start + len;

        self.text.advance_to(start);
        self.bg.advance_to(start);
        self.underline.advance_to(start);

        let mut boundaries = vec![start, end];
        self.text.add_boundaries(&mut boundaries, start, end);
        self.bg.add_boundaries(&mut boundaries, start, end);
        self.underline.add_boundaries(&mut boundaries, start, end);
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut fragments = Vec::with_capacity(boundaries.len() - 1);
        for pair in boundaries.windows(2) {
            let (seg_from, seg_to) = (pair[0], pair[1]);
            let slice = self.unit.slice(text, seg_from - start, seg_to - start);
            if slice.is_empty() {
                continue;
            }
            let style = StyleSet {
                color: self.text.range_at(seg_from).map(|r| r.color.clone()),
                background: self.bg.range_at(seg_from).map(|r| r.color.clone()),
                underline: self.underline.range_at(seg_from).is_some(),
            };
            fragments.push(Fragment {
                text: slice.to_string(),
                style,
            });
        }

        if fragments.iter().all(Fragment::is_plain) {
            return None;
        }
        Some(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> FileColorData {
        FileColorData {
            text: vec![ColoredRange::new(2, 4, "red")],
            bg: vec![ColoredRange::new(0, 5, "yellow")],
            underline: vec![Range::new(8, 12)],
        }
    }

    #[test]
    fn test_cursor_only_moves_forward() {
        let ranges = vec![Range::new(0, 2), Range::new(4, 6), Range::new(8, 9)];
        let mut cursor = RangeCursor::new(&ranges);
        assert_eq!(cursor.range_at(1), Some(&Range::new(0, 2)));
        assert_eq!(cursor.range_at(3), None);
        assert_eq!(cursor.range_at(5), Some(&Range::new(4, 6)));
        assert_eq!(cursor.range_at(8), Some(&Range::new(8, 9)));
        assert_eq!(cursor.range_at(20), None);
    }

    #[test]
    fn test_segment_splits_at_every_boundary() {
        let data = data();
        let mut segmenter = LeafSegmenter::new(&data, OffsetUnit::Utf16);
        let fragments = segmenter.segment(0, "Hello world").unwrap();
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["He", "ll", "o", " wo", "rld"]);
        assert_eq!(fragments[1].style.color.as_deref(), Some("red"));
        assert_eq!(fragments[1].style.background.as_deref(), Some("yellow"));
        assert!(fragments[3].is_plain());
        assert!(fragments[4].style.underline);
    }

    #[test]
    fn test_leaf_fully_inside_range_is_styled() {
        let data = data();
        let mut segmenter = LeafSegmenter::new(&data, OffsetUnit::Utf16);
        let fragments = segmenter.segment(2, "ll").unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].style.color.as_deref(), Some("red"));
    }

    #[test]
    fn test_untouched_leaf_returns_none() {
        let data = data();
        let mut segmenter = LeafSegmenter::new(&data, OffsetUnit::Utf16);
        assert!(segmenter.segment(5, "abc").is_none());
        assert!(segmenter.segment(20, "").is_none());
    }

    #[test]
    fn test_consecutive_leaves_share_cursors() {
        let data = data();
        let mut segmenter = LeafSegmenter::new(&data, OffsetUnit::Utf16);
        let first = segmenter.segment(0, "Hel").unwrap();
        let second = segmenter.segment(3, "lo wo").unwrap();
        let third = segmenter.segment(8, "rld").unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second[0].text, "l");
        assert_eq!(second[0].style.color.as_deref(), Some("red"));
        assert_eq!(third.len(), 1);
        assert!(third[0].style.underline);
    }

    #[test]
    fn test_utf16_offsets_with_astral_chars() {
        let data = FileColorData {
            text: vec![ColoredRange::new(1, 3, "red")],
            ..FileColorData::default()
        };
        let mut segmenter = LeafSegmenter::new(&data, OffsetUnit::Utf16);
        let fragments = segmenter.segment(0, "a😀b").unwrap();
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "😀", "b"]);
        assert_eq!(fragments[1].style.color.as_deref(), Some("red"));
    }
}
