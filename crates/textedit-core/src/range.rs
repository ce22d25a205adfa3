//! UTF-16 text ranges.
//!
//! All public offsets in `textedit-core` are **UTF-16 code unit** offsets, matching the
//! addressing of host text storages (`NSTextStorage`, JavaScript strings, LSP positions).
//! A [`TextRange`] is a half-open interval `[location, location + length)`.

use std::ops::Range;

use crate::text::utf16_len;

/// A half-open range of UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextRange {
    /// Start offset.
    pub location: usize,
    /// Number of code units covered.
    pub length: usize,
}

impl TextRange {
    /// Sentinel denoting "no range". Distinct from any caret at a real location.
    pub const NOT_FOUND: Self = Self {
        location: usize::MAX,
        length: 0,
    };

    /// Create a range from a location and a length.
    pub const fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// Create a zero-length range (a caret) at `location`.
    pub const fn caret(location: usize) -> Self {
        Self::new(location, 0)
    }

    /// Create a range from its bounds. `upper` is clamped to be at least `lower`.
    pub fn from_bounds(lower: usize, upper: usize) -> Self {
        Self::new(lower, upper.saturating_sub(lower))
    }

    /// The first offset in the range.
    pub fn lower_bound(&self) -> usize {
        self.location
    }

    /// The offset just past the range.
    pub fn upper_bound(&self) -> usize {
        self.location.saturating_add(self.length)
    }

    /// Returns `true` for a zero-length range.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` for [`TextRange::NOT_FOUND`].
    pub fn is_not_found(&self) -> bool {
        self.location == usize::MAX
    }

    /// Returns `true` if `index` lies in `[lower, upper)`.
    pub fn contains(&self, index: usize) -> bool {
        self.lower_bound() <= index && index < self.upper_bound()
    }

    /// Returns `true` if `index` lies in `[lower, upper]`.
    pub fn touches_index(&self, index: usize) -> bool {
        self.lower_bound() <= index && index <= self.upper_bound()
    }

    /// Returns `true` if the ranges overlap or are adjacent.
    ///
    /// Always `false` when either range is [`TextRange::NOT_FOUND`].
    pub fn touches(&self, other: TextRange) -> bool {
        if self.is_not_found() || other.is_not_found() {
            return false;
        }
        self.lower_bound() <= other.upper_bound() && other.lower_bound() <= self.upper_bound()
    }

    /// The overlapping part of the two ranges, or `None` if they share no code unit.
    pub fn intersection(&self, other: TextRange) -> Option<TextRange> {
        let lower = self.lower_bound().max(other.lower_bound());
        let upper = self.upper_bound().min(other.upper_bound());

        (lower < upper).then(|| Self::from_bounds(lower, upper))
    }

    /// Returns `true` if the ranges share at least one code unit.
    pub fn intersects(&self, other: TextRange) -> bool {
        self.intersection(other).is_some()
    }

    /// The smallest range covering both ranges.
    pub fn union(&self, other: TextRange) -> TextRange {
        Self::from_bounds(
            self.lower_bound().min(other.lower_bound()),
            self.upper_bound().max(other.upper_bound()),
        )
    }

    /// The range moved by `offset` code units. Saturates at zero.
    pub fn shifted(&self, offset: isize) -> TextRange {
        Self::new(self.location.saturating_add_signed(offset), self.length)
    }

    /// The range after the given strings were inserted into the text.
    ///
    /// Items are expressed in the coordinates of the text before insertion. A forward item at
    /// the same location as a caret pushes the caret right, a backward one leaves it in place.
    /// For a non-empty range, a forward item at the lower bound and a backward item at the upper
    /// bound both end up inside the range, while a backward item at the lower bound stays before
    /// it.
    pub fn inserted(&self, items: &[InsertionItem]) -> TextRange {
        let lower = self.lower_bound();
        let upper = self.upper_bound();
        let empty = self.is_empty();

        let location_shift: usize = items
            .iter()
            .filter(|item| {
                if empty {
                    item.location < lower || (item.forward && item.location == lower)
                } else {
                    // a backward item at the lower bound closes whatever precedes the range
                    item.location < lower || (!item.forward && item.location == lower)
                }
            })
            .map(InsertionItem::len)
            .sum();

        let length_diff: usize = items
            .iter()
            .filter(|item| {
                let after_lower = if empty || !item.forward {
                    lower < item.location
                } else {
                    lower <= item.location
                };
                let before_upper = if empty || item.forward {
                    item.location < upper
                } else {
                    item.location <= upper
                };
                after_lower && before_upper
            })
            .map(InsertionItem::len)
            .sum();

        Self::new(self.location + location_shift, self.length + length_diff)
    }

    /// The range after the given ranges were deleted from the text.
    ///
    /// Deleted ranges may overlap; every code unit is counted once.
    pub fn removed(&self, ranges: &[TextRange]) -> TextRange {
        let deleted = crate::selection_set::merged(
            ranges.iter().copied().filter(|range| !range.is_not_found()),
        );
        let lower = self.lower_bound();

        let before: usize = deleted
            .iter()
            .map(|range| range.upper_bound().min(lower).saturating_sub(range.lower_bound()))
            .sum();
        let inside: usize = deleted
            .iter()
            .filter_map(|range| self.intersection(*range))
            .map(|range| range.length)
            .sum();

        Self::new(
            self.location.saturating_sub(before),
            self.length.saturating_sub(inside),
        )
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::from_bounds(range.start, range.end)
    }
}

impl From<TextRange> for Range<usize> {
    fn from(range: TextRange) -> Self {
        range.lower_bound()..range.upper_bound()
    }
}

/// A pending string insertion used to compute shifted selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionItem {
    /// The inserted string.
    pub string: String,
    /// Insertion offset in the original text.
    pub location: usize,
    /// Whether a caret at `location` should end up after the insertion.
    pub forward: bool,
}

impl InsertionItem {
    /// Create a new insertion item.
    pub fn new(string: impl Into<String>, location: usize, forward: bool) -> Self {
        Self {
            string: string.into(),
            location,
            forward,
        }
    }

    /// Length of the inserted string in UTF-16 code units.
    pub fn len(&self) -> usize {
        utf16_len(&self.string)
    }

    /// Returns `true` if nothing is inserted.
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(location: usize, forward: bool) -> InsertionItem {
        InsertionItem::new("abc", location, forward)
    }

    #[test]
    fn test_touches() {
        let range = TextRange::new(2, 2);

        assert!(range.touches(TextRange::new(0, 2)));
        assert!(range.touches(TextRange::caret(4)));
        assert!(!range.touches(TextRange::caret(5)));
        assert!(!range.touches(TextRange::NOT_FOUND));
        assert!(!TextRange::NOT_FOUND.touches(TextRange::NOT_FOUND));

        assert!(range.touches_index(2));
        assert!(range.touches_index(4));
        assert!(!range.touches_index(1));
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }

    #[test]
    fn test_intersection_is_none_for_adjacent_ranges() {
        let range = TextRange::new(2, 3);

        assert_eq!(range.intersection(TextRange::new(4, 5)), Some(TextRange::new(4, 1)));
        assert_eq!(range.intersection(TextRange::new(5, 1)), None);
        assert_eq!(range.intersection(TextRange::caret(3)), None);
        assert_eq!(range.union(TextRange::new(7, 1)), TextRange::new(2, 6));
    }

    #[test]
    fn test_inserted_caret() {
        let caret = TextRange::caret(0);
        assert_eq!(caret.inserted(&[item(0, true)]), TextRange::caret(3));
        assert_eq!(caret.inserted(&[item(0, false)]), TextRange::caret(0));

        let range = TextRange::new(1, 1);
        assert_eq!(range.inserted(&[item(0, false)]), TextRange::new(4, 1));

        let caret = TextRange::caret(2);
        assert_eq!(
            caret.inserted(&[item(2, true), item(2, false)]),
            TextRange::caret(5)
        );
    }

    #[test]
    fn test_inserted_range() {
        assert_eq!(
            TextRange::from(0..5).inserted(&[item(2, true)]),
            TextRange::from(0..8)
        );
        assert_eq!(
            TextRange::from(2..3).inserted(&[item(2, false), item(2, true)]),
            TextRange::from(5..9)
        );
        assert_eq!(
            TextRange::from(2..3).inserted(&[item(3, true), item(3, false)]),
            TextRange::from(2..6)
        );
    }

    #[test]
    fn test_removed() {
        let range = TextRange::from(1..10);

        assert_eq!(
            range.removed(&[TextRange::from(2..4), TextRange::from(3..5)]),
            TextRange::from(1..7)
        );
        assert_eq!(
            range.removed(&[
                TextRange::from(0..2),
                TextRange::from(3..5),
                TextRange::from(9..20),
            ]),
            TextRange::from(0..5)
        );
        assert_eq!(
            TextRange::caret(3).removed(&[TextRange::from(2..5)]),
            TextRange::caret(2)
        );
    }

    #[test]
    fn test_shifted_saturates() {
        assert_eq!(TextRange::new(3, 2).shifted(-5), TextRange::new(0, 2));
        assert_eq!(TextRange::new(3, 2).shifted(4), TextRange::new(7, 2));
    }
}
