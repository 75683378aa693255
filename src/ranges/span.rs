//! Styled range types
//!
//! Ranges are half-open `[from, to)` over the host buffer's offset space.
//! Zero-width ranges are never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open interval carrying a (possibly empty) style value
///
/// The algebra in [`super::algebra`] is written once against this trait and
/// serves both the colored channels and the valueless underline channel.
pub trait Interval: Clone + fmt::Debug {
    type Value: Clone + PartialEq + fmt::Debug;

    fn start(&self) -> usize;
    fn end(&self) -> usize;
    fn value(&self) -> &Self::Value;
    fn from_parts(start: usize, end: usize, value: Self::Value) -> Self;

    /// Same value, new bounds
    fn with_bounds(&self, start: usize, end: usize) -> Self {
        Self::from_parts(start, end, self.value().clone())
    }

    /// Check if this range is empty (start >= end)
    fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }

    /// Check if a position is covered by this range
    fn contains(&self, pos: usize) -> bool {
        self.start() <= pos && pos < self.end()
    }
}

/// A plain range (the underline channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub from: usize,
    pub to: usize,
}

impl Range {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }
}

impl Interval for Range {
    type Value = ();

    fn start(&self) -> usize {
        self.from
    }

    fn end(&self) -> usize {
        self.to
    }

    fn value(&self) -> &() {
        &()
    }

    fn from_parts(start: usize, end: usize, _value: ()) -> Self {
        Self::new(start, end)
    }
}

/// A range carrying an opaque style token (hex, `var(--x)`, theme token)
///
/// The token is only ever compared for equality, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColoredRange {
    pub from: usize,
    pub to: usize,
    pub color: String,
}

impl ColoredRange {
    pub fn new(from: usize, to: usize, color: impl Into<String>) -> Self {
        Self {
            from,
            to,
            color: color.into(),
        }
    }

    /// The same span without its color
    pub fn range(&self) -> Range {
        Range::new(self.from, self.to)
    }
}

impl Interval for ColoredRange {
    type Value = String;

    fn start(&self) -> usize {
        self.from
    }

    fn end(&self) -> usize {
        self.to
    }

    fn value(&self) -> &String {
        &self.color
    }

    fn from_parts(start: usize, end: usize, value: String) -> Self {
        Self {
            from: start,
            to: end,
            color: value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_is_half_open() {
        let r = Range::new(2, 5);
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_with_bounds_keeps_color() {
        let r = ColoredRange::new(0, 10, "#E03E3E");
        let cut = r.with_bounds(3, 4);
        assert_eq!(cut, ColoredRange::new(3, 4, "#E03E3E"));
        assert!(ColoredRange::new(4, 4, "red").is_empty());
    }

    #[test]
    fn test_persisted_shape() {
        let json = serde_json::to_string(&ColoredRange::new(1, 3, "var(--text-accent)")).unwrap();
        assert_eq!(json, r#"{"from":1,"to":3,"color":"var(--text-accent)"}"#);
        let json = serde_json::to_string(&Range::new(0, 2)).unwrap();
        assert_eq!(json, r#"{"from":0,"to":2}"#);
    }
}
