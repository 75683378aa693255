//! Offset units
//!
//! Ranges are stored in the host buffer's native addressing unit. A
//! JavaScript host indexes strings by UTF-16 code unit, so that is the
//! default; hosts that count Unicode scalar values use `CodePoint`.

use serde::{Deserialize, Serialize};

/// Unit in which every stored position is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// UTF-16 code units (JavaScript `String.length`)
    #[default]
    Utf16,
    /// Unicode scalar values (Rust `chars()`)
    #[serde(alias = "code_point")]
    CodePoint,
}

impl OffsetUnit {
    /// Width of a single character in this unit
    pub fn char_len(self, ch: char) -> usize {
        match self {
            OffsetUnit::Utf16 => ch.len_utf16(),
            OffsetUnit::CodePoint => 1,
        }
    }

    /// Length of a string in this unit
    pub fn len(self, text: &str) -> usize {
        match self {
            OffsetUnit::Utf16 => text.encode_utf16().count(),
            OffsetUnit::CodePoint => text.chars().count(),
        }
    }

    /// Convert an offset in this unit into a byte index into `text`
    ///
    /// Offsets past the end clamp to `text.len()`. An offset that lands in
    /// the middle of a surrogate pair snaps down to the start of that char.
    pub fn byte_index(self, text: &str, offset: usize) -> usize {
        let mut units = 0;
        for (byte, ch) in text.char_indices() {
            let next = units + self.char_len(ch);
            if next > offset {
                return byte;
            }
            units = next;
        }
        text.len()
    }

    /// Slice `text` between two offsets in this unit
    pub fn slice(self, text: &str, from: usize, to: usize) -> &str {
        let start = self.byte_index(text, from);
        let end = self.byte_index(text, to).max(start);
        &text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_lengths_agree() {
        assert_eq!(OffsetUnit::Utf16.len("hello"), 5);
        assert_eq!(OffsetUnit::CodePoint.len("hello"), 5);
    }

    #[test]
    fn test_astral_char_counts_two_utf16_units() {
        let text = "a😀b";
        assert_eq!(OffsetUnit::Utf16.len(text), 4);
        assert_eq!(OffsetUnit::CodePoint.len(text), 3);
        assert_eq!(OffsetUnit::Utf16.slice(text, 3, 4), "b");
        assert_eq!(OffsetUnit::CodePoint.slice(text, 2, 3), "b");
    }

    #[test]
    fn test_offset_inside_surrogate_pair_snaps_down() {
        let text = "a😀b";
        // 2 is the low surrogate of the emoji
        assert_eq!(OffsetUnit::Utf16.byte_index(text, 2), 1);
        assert_eq!(OffsetUnit::Utf16.byte_index(text, 99), text.len());
    }
}
