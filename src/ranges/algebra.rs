//! Interval algebra over channel range lists
//!
//! Every function here is pure. Given lists in canonical form (sorted by
//! `from`, non-overlapping, no two touching entries with an equal value) they
//! return lists in canonical form.

use super::span::{Interval, Range};
use crate::text::{Assoc, ChangeSet};

/// Clip every range to `[0, len)`, dropping ranges that become empty
pub fn clamp<T: Interval>(ranges: &[T], len: usize) -> Vec<T> {
    ranges
        .iter()
        .filter_map(|r| {
            let start = r.start().min(len);
            let end = r.end().min(len);
            (start < end).then(|| r.with_bounds(start, end))
        })
        .collect()
}

/// Carry ranges through an edit
///
/// `from` sticks after text inserted at it and `to` sticks before, so an
/// insertion at either boundary never extends the styled run. Ranges that
/// collapse to nothing are dropped.
pub fn map_through_edit<T: Interval>(ranges: &[T], changes: &ChangeSet) -> Vec<T> {
    if ranges.is_empty() || changes.is_empty() {
        return ranges.to_vec();
    }

    let mapped = ranges
        .iter()
        .filter_map(|r| {
            let from = changes.map_pos(r.start(), Assoc::After);
            let to = changes.map_pos(r.end(), Assoc::Before);
            (from < to).then(|| r.with_bounds(from, to))
        })
        .collect();

    // A deleted gap can leave two equal neighbours touching
    normalize(mapped)
}

/// Set `[from, to)` to `value`, or clear it when `value` is `None`
///
/// Ranges overlapping the target are cut at its boundaries and keep their
/// value outside it. Inside the target the new value wins.
pub fn apply_attribute_change<T: Interval>(
    ranges: &[T],
    from: usize,
    to: usize,
    value: Option<T::Value>,
) -> Vec<T> {
    if from >= to {
        return ranges.to_vec();
    }

    let mut next = Vec::with_capacity(ranges.len() + 2);
    for r in ranges {
        if r.end() <= from || r.start() >= to {
            next.push(r.clone());
            continue;
        }
        // Left remainder
        if r.start() < from {
            next.push(r.with_bounds(r.start(), from));
        }
        // Right remainder
        if r.end() > to {
            next.push(r.with_bounds(to, r.end()));
        }
    }

    if let Some(value) = value {
        next.push(T::from_parts(from, to, value));
    }

    normalize(next)
}

/// Remove all coverage inside `[from, to)`, whatever its value
pub fn subtract<T: Interval>(ranges: &[T], from: usize, to: usize) -> Vec<T> {
    apply_attribute_change(ranges, from, to, None)
}

/// Uncovered sub-spans of `[from, to)`
pub fn gaps<T: Interval>(ranges: &[T], from: usize, to: usize) -> Vec<Range> {
    let mut out = Vec::new();
    if from >= to {
        return out;
    }

    let first = ranges.partition_point(|r| r.end() <= from);
    let mut cursor = from;
    for r in &ranges[first..] {
        if r.start() >= to {
            break;
        }
        if r.start() > cursor {
            out.push(Range::new(cursor, r.start()));
        }
        cursor = cursor.max(r.end());
    }
    if cursor < to {
        out.push(Range::new(cursor, to));
    }
    out
}

/// Whether every position of `[from, to)` is covered
pub fn is_covered<T: Interval>(ranges: &[T], from: usize, to: usize) -> bool {
    from < to && gaps(ranges, from, to).is_empty()
}

/// Toggle coverage over `[from, to)`
///
/// A fully covered selection is cleared. Otherwise only the gaps are filled,
/// which leaves the whole selection covered.
pub fn toggle(ranges: &[Range], from: usize, to: usize) -> Vec<Range> {
    if from >= to {
        return ranges.to_vec();
    }

    let holes = gaps(ranges, from, to);
    if holes.is_empty() {
        return subtract(ranges, from, to);
    }

    let mut next = ranges.to_vec();
    next.extend(holes);
    merge_adjacent(next)
}

/// Sort and coalesce touching or overlapping ranges regardless of value
///
/// The merged range keeps the value of its first piece, so this is only
/// meaningful where the value carries no information.
pub fn merge_adjacent<T: Interval>(mut ranges: Vec<T>) -> Vec<T> {
    ranges.retain(|r| !r.is_empty());
    ranges.sort_by_key(|r| (r.start(), r.end()));

    let mut merged: Vec<T> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if last.end() >= r.start() => {
                let end = last.end().max(r.end());
                *last = last.with_bounds(last.start(), end);
            }
            _ => merged.push(r),
        }
    }
    merged
}

/// Sort, drop empties, and merge touching or overlapping ranges that share a value
pub fn normalize<T: Interval>(mut ranges: Vec<T>) -> Vec<T> {
    ranges.retain(|r| !r.is_empty());
    ranges.sort_by_key(|r| (r.start(), r.end()));

    let mut merged: Vec<T> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if last.value() == r.value() && last.end() >= r.start() => {
                let end = last.end().max(r.end());
                *last = last.with_bounds(last.start(), end);
            }
            _ => merged.push(r),
        }
    }
    merged
}

/// Bring an arbitrary list into canonical form
///
/// Entries are applied in order, so where two of them overlap the later one
/// wins. Used on data that did not come out of this module.
pub fn canonicalize<T: Interval>(entries: Vec<T>) -> Vec<T> {
    entries.into_iter().fold(Vec::new(), |acc, r| {
        let value = r.value().clone();
        apply_attribute_change(&acc, r.start(), r.end(), Some(value))
    })
}

/// The range covering `pos`, if any
pub fn value_at<T: Interval>(ranges: &[T], pos: usize) -> Option<&T> {
    let idx = ranges.partition_point(|r| r.end() <= pos);
    ranges.get(idx).filter(|r| r.start() <= pos)
}

/// Move ranges into a fragment's coordinate space starting at `origin`
pub fn rebase<T: Interval>(ranges: &[T], origin: usize) -> Vec<T> {
    ranges
        .iter()
        .filter_map(|r| {
            let start = r.start().saturating_sub(origin);
            let end = r.end().saturating_sub(origin);
            (start < end).then(|| r.with_bounds(start, end))
        })
        .collect()
}

/// Check the canonical form invariant
pub fn is_canonical<T: Interval>(ranges: &[T]) -> bool {
    ranges.iter().all(|r| !r.is_empty())
        && ranges.windows(2).all(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            a.end() <= b.start() && !(a.end() == b.start() && a.value() == b.value())
        })
}
