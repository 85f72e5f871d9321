//! Source code location types

use serde::{Deserialize, Serialize};

/// A position in the translation unit's offset space.
///
/// The raw value 0 is the invalid location. File-level locations occupy
/// contiguous ascending ranges, one per file in inclusion order, so comparing
/// raw values of two file-level locations compares translation-unit order.
/// Values past the end of file space identify macro-internal spellings and
/// must be resolved through [`crate::SourceMap::file_loc`] before any
/// comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SourceLocation(pub u32);

impl SourceLocation {
    /// The invalid location
    pub const INVALID: SourceLocation = SourceLocation(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }
}

/// A source range over tokens.
///
/// `end` is the location of the last token in the range, not one past it.
/// A range with either endpoint invalid is an invalid range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        Self { begin, end }
    }

    /// The invalid range
    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.begin.is_valid() && self.end.is_valid()
    }

    /// Whether `loc` falls inside this range, endpoints included.
    ///
    /// Only meaningful when all three locations are file-level.
    pub fn contains(&self, loc: SourceLocation) -> bool {
        self.is_valid() && loc.is_valid() && self.begin.0 <= loc.0 && loc.0 <= self.end.0
    }
}

/// Line and column, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_location() {
        assert!(SourceLocation::INVALID.is_invalid());
        assert!(SourceLocation(1).is_valid());
        assert!(!SourceRange::invalid().is_valid());
    }

    #[test]
    fn test_range_contains() {
        let r = SourceRange::new(SourceLocation(10), SourceLocation(20));
        assert!(r.contains(SourceLocation(10)));
        assert!(r.contains(SourceLocation(20)));
        assert!(!r.contains(SourceLocation(21)));
        assert!(!r.contains(SourceLocation::INVALID));
    }

    #[test]
    fn test_line_col_display() {
        let lc = LineCol { line: 3, col: 14 };
        assert_eq!(lc.to_string(), "3:14");
    }
}
