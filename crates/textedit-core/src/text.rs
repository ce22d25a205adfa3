//! Immutable text snapshot addressed by UTF-16 offsets.
//!
//! [`Utf16Text`] wraps a `&str` and answers the questions every editing operation asks:
//! where does a line start and end, what does a UTF-16 range look like as a `&str`, where is the
//! next grapheme boundary. Offset conversion goes through a [`ropey::Rope`], which keeps UTF-16
//! metrics in its tree nodes so each conversion is `O(log n)`.
//!
//! Line breaks are `\n`, `\r`, `\r\n`, U+0085, U+2028 and U+2029. `\r\n` is always a single
//! terminator: an offset between `\r` and `\n` belongs to the line the pair terminates.

use std::ops::Range;

use ropey::Rope;
use unicode_segmentation::GraphemeCursor;

use crate::line_ending::LineEnding;
use crate::range::TextRange;
use crate::selection_set::merged;

/// Returns `true` for characters that terminate a line.
pub fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Split `s` into lines, keeping each line's terminator attached.
pub(crate) fn split_lines_inclusive(s: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = s.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_newline(ch) {
            continue;
        }
        let mut end = idx + ch.len_utf8();
        if ch == '\r' && chars.peek().is_some_and(|(_, next)| *next == '\n') {
            chars.next();
            end += 1;
        }
        lines.push(&s[start..end]);
        start = end;
    }
    if start < s.len() {
        lines.push(&s[start..]);
    }
    lines
}

/// Split `s` on line terminators, dropping them. A trailing terminator yields a final empty line.
pub(crate) fn split_lines(s: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = split_lines_inclusive(s)
        .into_iter()
        .map(trim_line_ending)
        .collect();
    if s.is_empty() || s.ends_with(is_newline) {
        lines.push("");
    }
    lines
}

/// `line` without its trailing terminator.
pub(crate) fn trim_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix(is_newline))
        .unwrap_or(line)
}

/// A text snapshot with UTF-16 addressing.
#[derive(Debug, Clone)]
pub struct Utf16Text<'a> {
    string: &'a str,
    rope: Rope,
    len: usize,
}

impl<'a> Utf16Text<'a> {
    /// Create a snapshot of `string`.
    pub fn new(string: &'a str) -> Self {
        let rope = Rope::from_str(string);
        let len = rope.len_utf16_cu();
        Self { string, rope, len }
    }

    /// The underlying string.
    pub fn as_str(&self) -> &'a str {
        self.string
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The range covering the whole text.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(0, self.len)
    }

    /// Byte offset for a UTF-16 offset.
    ///
    /// Offsets past the end clamp to the end; an offset inside a surrogate pair maps to the
    /// start of that character.
    pub fn byte_offset(&self, location: usize) -> usize {
        if location >= self.len {
            return self.string.len();
        }
        self.rope.char_to_byte(self.rope.utf16_cu_to_char(location))
    }

    /// UTF-16 offset for a byte offset.
    pub fn location(&self, byte: usize) -> usize {
        let byte = byte.min(self.string.len());
        self.rope.char_to_utf16_cu(self.rope.byte_to_char(byte))
    }

    /// Byte range for a UTF-16 range.
    pub fn byte_range(&self, range: TextRange) -> Range<usize> {
        let start = self.byte_offset(range.lower_bound());
        let end = self.byte_offset(range.upper_bound()).max(start);
        start..end
    }

    /// UTF-16 range for a byte range.
    pub fn range_of_bytes(&self, bytes: Range<usize>) -> TextRange {
        TextRange::from_bounds(self.location(bytes.start), self.location(bytes.end))
    }

    /// The substring covered by `range`.
    pub fn substring(&self, range: TextRange) -> &'a str {
        &self.string[self.byte_range(range)]
    }

    /// The character starting at `location`.
    pub fn char_at(&self, location: usize) -> Option<char> {
        self.string[self.byte_offset(location)..].chars().next()
    }

    /// The character just before `location`.
    pub fn char_before(&self, location: usize) -> Option<char> {
        self.string[..self.byte_offset(location)].chars().next_back()
    }

    /// Returns `true` if the text ends with a line break.
    pub fn ends_with_newline(&self) -> bool {
        self.string.ends_with(is_newline)
    }

    // MARK: lines (byte based)

    /// `true` if `byte` sits between the `\r` and `\n` of a CRLF.
    fn is_inside_crlf(&self, byte: usize) -> bool {
        self.string[byte..].starts_with('\n') && self.string[..byte].ends_with('\r')
    }

    fn line_start_byte(&self, byte: usize) -> usize {
        let end = if self.is_inside_crlf(byte) { byte - 1 } else { byte };

        self.string[..end]
            .char_indices()
            .rev()
            .find(|(_, ch)| is_newline(*ch))
            .map_or(0, |(idx, ch)| idx + ch.len_utf8())
    }

    /// Returns `(contents_end, end)` of the line containing `byte`.
    fn line_end_bytes(&self, byte: usize) -> (usize, usize) {
        let s = self.string;
        if self.is_inside_crlf(byte) {
            return (byte - 1, byte + 1);
        }

        match s[byte..].char_indices().find(|(_, ch)| is_newline(*ch)) {
            Some((offset, ch)) => {
                let contents_end = byte + offset;
                let mut end = contents_end + ch.len_utf8();
                if ch == '\r' && s[end..].starts_with('\n') {
                    end += 1;
                }
                (contents_end, end)
            }
            None => (s.len(), s.len()),
        }
    }

    /// Returns `(start, contents_end, end)` bytes of the lines covering `range`.
    fn line_bounds(&self, range: TextRange) -> (usize, usize, usize) {
        let start = self.line_start_byte(self.byte_offset(range.location));
        let last = if range.is_empty() {
            range.location
        } else {
            range.upper_bound() - 1
        };
        let (contents_end, end) = self.line_end_bytes(self.byte_offset(last));

        (start, contents_end.max(start), end.max(start))
    }

    /// Byte triples `(start, contents_end, end)` of every line starting inside `scope`.
    fn lines_in(&self, scope: TextRange) -> Vec<(usize, usize, usize)> {
        let bytes = self.byte_range(scope);
        let mut lines = Vec::new();
        let mut position = bytes.start;

        while position < bytes.end {
            let (contents_end, end) = self.line_end_bytes(position);
            let end = end.min(bytes.end);
            lines.push((position, contents_end.min(end), end));
            position = end;
        }
        lines
    }

    // MARK: lines (public)

    /// Offset of the first character of the line containing `location`.
    pub fn line_start_index(&self, location: usize) -> usize {
        self.location(self.line_start_byte(self.byte_offset(location)))
    }

    /// Offset just past the content (before the terminator) of the line containing `location`.
    pub fn line_contents_end_index(&self, location: usize) -> usize {
        self.location(self.line_end_bytes(self.byte_offset(location)).0)
    }

    /// The full lines (terminators included) covering `range`.
    pub fn line_range(&self, range: TextRange) -> TextRange {
        let (start, _, end) = self.line_bounds(range);
        TextRange::from_bounds(self.location(start), self.location(end))
    }

    /// The full line containing `location`.
    pub fn line_range_at(&self, location: usize) -> TextRange {
        self.line_range(TextRange::caret(location))
    }

    /// The lines covering `range` without the final terminator.
    pub fn line_contents_range(&self, range: TextRange) -> TextRange {
        let (start, contents_end, _) = self.line_bounds(range);
        TextRange::from_bounds(self.location(start), self.location(contents_end))
    }

    /// The content of the line containing `location`.
    pub fn line_contents_range_at(&self, location: usize) -> TextRange {
        self.line_contents_range(TextRange::caret(location))
    }

    /// Every full line touched by `ranges`, sorted and without duplicates.
    ///
    /// When `including_last_empty_line` is set and the only range is a caret at the very end of a
    /// text that is empty or ends with a line break, that empty last line is returned as-is.
    pub fn line_ranges(
        &self,
        ranges: &[TextRange],
        including_last_empty_line: bool,
    ) -> Vec<TextRange> {
        if ranges.is_empty() {
            return Vec::new();
        }

        if including_last_empty_line
            && ranges == [TextRange::caret(self.len)]
            && (self.is_empty() || self.ends_with_newline())
        {
            return ranges.to_vec();
        }

        merged(ranges.iter().map(|range| self.line_range(*range)))
            .into_iter()
            .flat_map(|scope| self.lines_in(scope))
            .map(|(start, _, end)| TextRange::from_bounds(self.location(start), self.location(end)))
            .collect()
    }

    /// The content range of every line covered by `range`.
    pub fn line_contents_ranges(&self, range: TextRange) -> Vec<TextRange> {
        self.lines_in(self.line_range(range))
            .into_iter()
            .map(|(start, contents_end, _)| {
                TextRange::from_bounds(self.location(start), self.location(contents_end))
            })
            .collect()
    }

    /// Offsets where a line begins inside `range`: its lower bound plus every position right
    /// after a terminator strictly before the upper bound.
    pub fn line_starts_in(&self, range: TextRange) -> Vec<usize> {
        let bytes = self.byte_range(range);
        let sub = &self.string[bytes.clone()];
        let mut starts = vec![range.lower_bound()];

        for (start, line) in split_lines_inclusive(sub)
            .into_iter()
            .scan(bytes.start, |offset, line| {
                let start = *offset;
                *offset += line.len();
                Some((start, line))
            })
        {
            let next = start + line.len();
            if next < bytes.end && line.ends_with(is_newline) {
                starts.push(self.location(next));
            }
        }
        starts
    }

    /// 1-based line number of `location`.
    pub fn line_number(&self, location: usize) -> usize {
        let prefix = &self.string[..self.byte_offset(location)];
        let mut count = 1;
        let mut previous = None;
        for ch in prefix.chars() {
            if is_newline(ch) && !(ch == '\n' && previous == Some('\r')) {
                count += 1;
            }
            previous = Some(ch);
        }
        count
    }

    /// The line terminator that ends right at `location`, if any.
    pub fn line_ending_before(&self, location: usize) -> Option<LineEnding> {
        let prefix = &self.string[..self.byte_offset(location)];
        if prefix.ends_with("\r\n") {
            return Some(LineEnding::Crlf);
        }
        prefix.chars().next_back().and_then(LineEnding::from_char)
    }

    // MARK: graphemes

    /// The grapheme boundary before `location`. A CRLF counts as one step.
    pub fn index_before(&self, location: usize) -> usize {
        if location == 0 {
            return 0;
        }
        let byte = self.byte_offset(location);
        let mut cursor = GraphemeCursor::new(byte, self.string.len(), true);
        match cursor.prev_boundary(self.string, 0) {
            Ok(Some(previous)) => self.location(previous),
            _ => 0,
        }
    }

    /// The grapheme boundary after `location`. A CRLF counts as one step.
    pub fn index_after(&self, location: usize) -> usize {
        if location >= self.len {
            return self.len;
        }
        let byte = self.byte_offset(location);
        let mut cursor = GraphemeCursor::new(byte, self.string.len(), true);
        match cursor.next_boundary(self.string, 0) {
            Ok(Some(next)) => self.location(next),
            _ => self.len,
        }
    }

    /// Returns `true` if `location` does not split a grapheme cluster.
    pub fn is_grapheme_boundary(&self, location: usize) -> bool {
        if location == 0 || location >= self.len {
            return true;
        }
        let byte = self.byte_offset(location);
        if self.location(byte) != location {
            // inside a surrogate pair
            return false;
        }
        let mut cursor = GraphemeCursor::new(byte, self.string.len(), true);
        cursor.is_boundary(self.string, 0).unwrap_or(true)
    }

    /// `range` with its upper bound moved back so it never ends inside a grapheme cluster
    /// (e.g. between the `\r` and `\n` of a CRLF).
    pub fn safe_ending_range(&self, range: TextRange) -> TextRange {
        if range.is_not_found() || range.upper_bound() >= self.len {
            return range;
        }
        let upper = range.upper_bound();
        if self.is_grapheme_boundary(upper) {
            return range;
        }

        let safe_upper = self.index_before(upper);
        if range.is_empty() {
            TextRange::caret(safe_upper)
        } else {
            TextRange::from_bounds(range.location, safe_upper.max(range.location))
        }
    }

    // MARK: columns

    /// Visual column of `location` within its line, counting a tab as `tab_width`.
    pub fn column(&self, location: usize, tab_width: usize) -> usize {
        let start = self.line_start_index(location);
        self.substring(TextRange::from_bounds(start, location))
            .chars()
            .map(|ch| if ch == '\t' { tab_width } else { ch.len_utf16() })
            .sum()
    }

    /// Spaces inserted by a soft tab at `location`: up to the next tab stop.
    pub fn soft_tab(&self, location: usize, tab_width: usize) -> String {
        let tab_width = tab_width.max(1);
        let column = self.column(location, tab_width);
        " ".repeat(tab_width - column % tab_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_range_handles_all_terminators() {
        let text = Utf16Text::new("a\r\nb\rc\u{2028}d\u{85}e\u{2029}f\ng");

        assert_eq!(text.line_range_at(0), TextRange::new(0, 3));
        assert_eq!(text.line_range_at(3), TextRange::new(3, 2));
        assert_eq!(text.line_range_at(5), TextRange::new(5, 2));
        assert_eq!(text.line_range_at(7), TextRange::new(7, 2));
        assert_eq!(text.line_range_at(9), TextRange::new(9, 2));
        assert_eq!(text.line_range_at(11), TextRange::new(11, 2));
        assert_eq!(text.line_range_at(13), TextRange::new(13, 1));
        assert_eq!(text.line_contents_range_at(0), TextRange::new(0, 1));
    }

    #[test]
    fn test_offset_inside_crlf_belongs_to_terminated_line() {
        let text = Utf16Text::new("ab\r\ncd");

        assert_eq!(text.line_range_at(3), TextRange::new(0, 4));
        assert_eq!(text.line_contents_range_at(3), TextRange::new(0, 2));
        assert_eq!(text.line_start_index(3), 0);
        assert_eq!(text.line_range_at(4), TextRange::new(4, 2));
    }

    #[test]
    fn test_line_range_of_range_uses_last_character() {
        let text = Utf16Text::new("foo\nbar\nbaz");

        assert_eq!(text.line_range(TextRange::new(0, 4)), TextRange::new(0, 4));
        assert_eq!(text.line_range(TextRange::new(0, 5)), TextRange::new(0, 8));
        assert_eq!(text.line_contents_range(TextRange::new(0, 5)), TextRange::new(0, 7));
        assert_eq!(text.line_range_at(11), TextRange::new(8, 3));
    }

    #[test]
    fn test_line_ranges() {
        let text = Utf16Text::new("foo\nbar\nbaz\n");

        assert_eq!(
            text.line_ranges(&[TextRange::new(1, 4), TextRange::caret(2)], false),
            vec![TextRange::new(0, 4), TextRange::new(4, 4)]
        );
        assert_eq!(text.line_ranges(&[TextRange::caret(12)], false), vec![]);
        assert_eq!(
            text.line_ranges(&[TextRange::caret(12)], true),
            vec![TextRange::caret(12)]
        );
        assert_eq!(
            Utf16Text::new("").line_ranges(&[TextRange::caret(0)], true),
            vec![TextRange::caret(0)]
        );
    }

    #[test]
    fn test_line_starts_in() {
        let text = Utf16Text::new("foo\nbar\r\nbaz\n");

        assert_eq!(text.line_starts_in(TextRange::new(1, 2)), vec![1]);
        assert_eq!(text.line_starts_in(TextRange::new(0, 13)), vec![0, 4, 9]);
        assert_eq!(text.line_starts_in(TextRange::new(2, 8)), vec![2, 4, 9]);
        assert_eq!(text.line_starts_in(TextRange::caret(4)), vec![4]);
    }

    #[test]
    fn test_utf16_offsets_with_astral_characters() {
        let text = Utf16Text::new("a🐈‍⬛b\nc");

        // "🐈" (2) + ZWJ (1) + "⬛" (1)
        assert_eq!(text.len(), 8);
        assert_eq!(text.substring(TextRange::new(1, 4)), "🐈‍⬛");
        assert_eq!(text.byte_offset(5), "a🐈‍⬛".len());
        assert_eq!(text.location("a🐈‍⬛".len()), 5);
        assert_eq!(text.index_after(1), 5);
        assert_eq!(text.index_before(5), 1);
        assert!(!text.is_grapheme_boundary(2));
        assert!(!text.is_grapheme_boundary(3));
        assert!(text.is_grapheme_boundary(5));
    }

    #[test]
    fn test_index_before_and_after() {
        let flags = Utf16Text::new("0🇦🇦00");
        assert_eq!(flags.index_before(0), 0);
        assert_eq!(flags.index_before(1), 0);
        assert_eq!(flags.index_before(5), 1);
        assert_eq!(flags.index_before(6), 5);
        assert_eq!(flags.index_after(1), 5);

        let crlf = Utf16Text::new("0\r\n0");
        assert_eq!(crlf.index_before(3), 1);
        assert_eq!(crlf.index_before(2), 1);
        assert_eq!(crlf.index_after(1), 3);
        assert_eq!(crlf.index_after(2), 3);
        assert_eq!(crlf.index_after(3), 4);
        assert_eq!(crlf.index_after(4), 4);
    }

    #[test]
    fn test_safe_ending_range() {
        let crlf = Utf16Text::new("ba\r\n");

        assert_eq!(crlf.safe_ending_range(TextRange::caret(2)), TextRange::caret(2));
        assert_eq!(crlf.safe_ending_range(TextRange::caret(3)), TextRange::caret(2));
        assert_eq!(crlf.safe_ending_range(TextRange::from(1..2)), TextRange::from(1..2));
        assert_eq!(crlf.safe_ending_range(TextRange::from(1..3)), TextRange::from(1..2));
        assert_eq!(crlf.safe_ending_range(TextRange::from(1..4)), TextRange::from(1..4));
        assert_eq!(crlf.safe_ending_range(TextRange::from(1..5)), TextRange::from(1..5));
        assert_eq!(crlf.safe_ending_range(TextRange::from(2..3)), TextRange::caret(2));
        assert_eq!(
            crlf.safe_ending_range(TextRange::NOT_FOUND),
            TextRange::NOT_FOUND
        );
    }

    #[test]
    fn test_line_number() {
        let text = Utf16Text::new("a\nb\r\nc\rd");

        assert_eq!(text.line_number(0), 1);
        assert_eq!(text.line_number(1), 1);
        assert_eq!(text.line_number(2), 2);
        assert_eq!(text.line_number(5), 3);
        assert_eq!(text.line_number(7), 4);
    }

    #[test]
    fn test_soft_tab_and_column() {
        assert_eq!(Utf16Text::new("abc").soft_tab(0, 4), "    ");
        assert_eq!(Utf16Text::new("abc").soft_tab(2, 4), "  ");
        assert_eq!(Utf16Text::new("\t").soft_tab(1, 4), "    ");
        assert_eq!(Utf16Text::new("x\n\t a").column(4, 4), 5);
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines_inclusive("a\r\nb\rc"), vec!["a\r\n", "b\r", "c"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(trim_line_ending("x\r\n"), "x");
        assert_eq!(trim_line_ending("x\u{2028}"), "x");
    }
}
