//! Edit descriptions.
//!
//! Every transformation in this crate returns an [`EditingContext`] instead of mutating text.
//! Hosts apply the replacements to their live storage as one atomic multi-replacement and then
//! install `selected_ranges`.

use crate::range::TextRange;
use crate::text::Utf16Text;

/// A set of replacements plus the selection to install afterwards.
///
/// Semantics:
/// - `strings[i]` replaces `ranges[i]`.
/// - Ranges are in **original** text coordinates and never overlap. Several zero-length ranges
///   at the same location are inserted in list order.
/// - `selected_ranges` is expressed in coordinates of the text **after** the replacements.
///   `None` leaves the selection to the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditingContext {
    /// Replacement strings.
    pub strings: Vec<String>,
    /// Replaced ranges (UTF-16 offsets in the original text).
    pub ranges: Vec<TextRange>,
    /// Selection after the edit.
    pub selected_ranges: Option<Vec<TextRange>>,
}

impl EditingContext {
    /// Create a new edit description.
    pub fn new(
        strings: Vec<String>,
        ranges: Vec<TextRange>,
        selected_ranges: Option<Vec<TextRange>>,
    ) -> Self {
        debug_assert_eq!(strings.len(), ranges.len());
        Self {
            strings,
            ranges,
            selected_ranges,
        }
    }

    /// Returns `true` if the context contains no replacement.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over `(range, string)` pairs.
    pub fn replacements(&self) -> impl Iterator<Item = (TextRange, &str)> {
        self.ranges
            .iter()
            .copied()
            .zip(self.strings.iter().map(String::as_str))
    }

    /// Apply the replacements to `text` and return the edited text.
    ///
    /// This is what a host does with its text storage; it is provided for tests and for hosts
    /// that keep plain strings.
    pub fn apply(&self, text: &str) -> String {
        let snapshot = Utf16Text::new(text);

        let mut replacements: Vec<(TextRange, &str)> = self.replacements().collect();
        replacements.sort_by_key(|(range, _)| range.location);

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for (range, string) in replacements {
            let bytes = snapshot.byte_range(range);
            let start = bytes.start.max(cursor);
            out.push_str(&text[cursor..start]);
            out.push_str(string);
            cursor = bytes.end.max(start);
        }
        out.push_str(&text[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_insertion_order_at_same_location() {
        let context = EditingContext::new(
            vec!["<".into(), ">".into(), "X".into()],
            vec![TextRange::caret(1), TextRange::caret(1), TextRange::new(2, 1)],
            None,
        );

        assert_eq!(context.apply("abc"), "a<>bX");
    }

    #[test]
    fn test_apply_uses_utf16_offsets() {
        let context = EditingContext::new(
            vec![String::new()],
            vec![TextRange::new(1, 2)],
            Some(vec![TextRange::caret(1)]),
        );

        assert_eq!(context.apply("a🐈b"), "ab");
        assert!(EditingContext::default().is_empty());
    }
}
