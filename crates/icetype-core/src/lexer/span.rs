//! Byte spans into field-definition strings.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a definition string.
///
/// Definitions are single lines, so a span is an offset pair rather
/// than a line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered fragment of `source`. Empty when the span falls
    /// outside the string or off a char boundary.
    #[must_use]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_empty() {
        assert_eq!(Span::new(5, 10).len(), 5);
        assert!(Span::new(5, 5).is_empty());
        assert!(!Span::new(5, 10).is_empty());
    }

    #[test]
    fn test_slice() {
        let source = "decimal(10,2)";
        assert_eq!(Span::new(0, 7).slice(source), "decimal");
        assert_eq!(Span::new(8, 10).slice(source), "10");
        // Out-of-range spans degrade to empty instead of panicking.
        assert_eq!(Span::new(8, 99).slice(source), "");
    }

    #[test]
    fn test_merge_covers_both() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
        // Disjoint spans merge to the covering range too.
        let merged = Span::new(12, 15).merge(Span::new(0, 3));
        assert_eq!(merged, Span::new(0, 15));
    }

    #[test]
    fn test_display_is_a_range() {
        assert_eq!(Span::new(3, 9).to_string(), "3..9");
    }
}
