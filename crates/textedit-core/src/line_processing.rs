//! Line-oriented edits: move, duplicate, delete, join, sort and trim.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

use crate::editing::EditingContext;
use crate::line_ending::LineEnding;
use crate::range::TextRange;
use crate::selection_set::{normalize_selections, uniqued};
use crate::text::{Utf16Text, split_lines, utf16_len};

/// Whitespace around a single line break (any terminator kind).
static LINE_BREAK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:\r\n|[\n\r\x{85}\x{2028}\x{2029}])\s*")
        .expect("valid line break regex")
});

/// Move the lines touched by `ranges` up by one line.
///
/// Returns `None` if a touched line is already the first line.
pub fn move_line_up(text: &str, ranges: &[TextRange]) -> Option<EditingContext> {
    let snapshot = Utf16Text::new(text);
    let line_ranges = snapshot.line_ranges(ranges, true);

    if line_ranges.first().is_none_or(|first| first.location == 0) {
        return None;
    }

    let mut buffer = SwapBuffer::new(text);
    let mut shifts = Vec::with_capacity(line_ranges.len());

    for &line_range in &line_ranges {
        let upper_range = buffer.line_range_at(line_range.location - 1);
        let mut line = buffer.string(line_range);
        let mut upper = buffer.string(upper_range);

        // the last line borrows the line ending of the upper line
        if !ends_with_newline(&line)
            && let Some(ending) = pop_line_ending(&mut upper)
        {
            line.push_str(ending);
        }

        buffer.replace(line_range.union(upper_range), &format!("{line}{upper}"));
        shifts.push(-(upper_range.length as isize));
    }

    buffer.into_context(moved_selections(ranges, &line_ranges, &shifts))
}

/// Move the lines touched by `ranges` down by one line.
///
/// Returns `None` if a touched line is already the last line.
pub fn move_line_down(text: &str, ranges: &[TextRange]) -> Option<EditingContext> {
    let snapshot = Utf16Text::new(text);
    let line_ranges = snapshot.line_ranges(ranges, false);

    let last = line_ranges.last()?;
    if last.upper_bound() == snapshot.len() && !snapshot.ends_with_newline() {
        return None;
    }

    let mut buffer = SwapBuffer::new(text);
    let mut shifts = vec![0; line_ranges.len()];

    for (index, &line_range) in line_ranges.iter().enumerate().rev() {
        let lower_range = buffer.line_range_at(line_range.upper_bound());
        let mut line = buffer.string(line_range);
        let mut lower = buffer.string(lower_range);

        // the lower line was the last one and takes over the line ending
        if !ends_with_newline(&lower)
            && let Some(ending) = pop_line_ending(&mut line)
        {
            lower.push_str(ending);
        }

        buffer.replace(line_range.union(lower_range), &format!("{lower}{line}"));

        // the moved line travels by the lower line plus any borrowed line ending
        let distance = if ends_with_newline(&line) {
            lower_range.length
        } else {
            lower_range.length + last_char_len(&lower)
        };
        shifts[index] = distance as isize;
    }

    buffer.into_context(moved_selections(ranges, &line_ranges, &shifts))
}

/// Shift every range by the distance its first line travelled.
///
/// A selection spanning several moved lines stays in one piece.
fn moved_selections(
    ranges: &[TextRange],
    line_ranges: &[TextRange],
    shifts: &[isize],
) -> Vec<TextRange> {
    let selected = ranges
        .iter()
        .map(|range| {
            let index = line_ranges
                .iter()
                .position(|line| line.contains(range.location))
                .or_else(|| {
                    line_ranges
                        .iter()
                        .position(|line| line.touches_index(range.location))
                });
            index.map_or(*range, |index| range.shifted(shifts[index]))
        })
        .collect();

    normalize_selections(selected)
}

/// Delete every repeated line among the lines touched by `ranges`.
///
/// The first occurrence wins; comparison is exact. When the final line of the text is removed,
/// the line break before it goes too.
pub fn delete_duplicate_line(text: &str, ranges: &[TextRange]) -> Option<EditingContext> {
    let text = Utf16Text::new(text);

    let mut line_contents_ranges: Vec<TextRange> = uniqued(
        ranges
            .iter()
            .map(|range| text.line_range(*range))
            .flat_map(|range| text.line_contents_ranges(range)),
    );
    line_contents_ranges.sort();

    let mut unique_lines = HashSet::new();
    let mut replacement_ranges: Vec<TextRange> = Vec::new();
    for range in line_contents_ranges {
        if !unique_lines.insert(text.substring(range)) {
            replacement_ranges.push(text.line_range(range));
        }
    }

    let last = replacement_ranges.last_mut()?;
    if last.upper_bound() == text.len()
        && !text.ends_with_newline()
        && let Some(ending) = text.line_ending_before(last.location)
    {
        *last = TextRange::from_bounds(last.location - ending.len_utf16(), last.upper_bound());

        // the widened range may now overlap the one before it
        if let [.., previous, last] = replacement_ranges.as_slice()
            && previous.upper_bound() > last.location
        {
            let union = previous.union(*last);
            replacement_ranges.pop();
            if let Some(previous) = replacement_ranges.last_mut() {
                *previous = union;
            }
        }
    }

    Some(EditingContext::new(
        vec![String::new(); replacement_ranges.len()],
        replacement_ranges,
        None,
    ))
}

/// Duplicate the lines touched by `ranges`.
///
/// Selections sharing lines form one group duplicated once. The copy is inserted above the
/// original block and each selection moves into the lower copy. A block without a trailing line
/// break gets `line_ending`.
pub fn duplicate_line(
    text: &str,
    ranges: &[TextRange],
    line_ending: LineEnding,
) -> Option<EditingContext> {
    if ranges.is_empty() {
        return None;
    }

    let text = Utf16Text::new(text);
    let mut sorted = ranges.to_vec();
    sorted.sort();

    let mut groups: Vec<Vec<TextRange>> = Vec::new();
    for range in sorted {
        match groups.last_mut() {
            Some(group)
                if group.last().is_some_and(|last| {
                    text.line_range(*last).intersects(text.line_range(range))
                }) =>
            {
                group.push(range);
            }
            _ => groups.push(vec![range]),
        }
    }

    let mut strings = Vec::new();
    let mut replacement_ranges = Vec::new();
    let mut selected = Vec::new();
    let mut offset = 0;
    for group in groups {
        let union = group
            .iter()
            .fold(group[0], |union, range| union.union(*range));
        let line_range = text.line_range(union);

        let mut line = text.substring(line_range).to_string();
        if !ends_with_newline(&line) {
            line.push_str(line_ending.as_str());
        }

        offset += utf16_len(&line);
        selected.extend(group.iter().map(|range| range.shifted(offset as isize)));
        replacement_ranges.push(TextRange::caret(line_range.location));
        strings.push(line);
    }

    Some(EditingContext::new(
        strings,
        replacement_ranges,
        Some(selected),
    ))
}

/// Delete the lines touched by `ranges`.
///
/// Every caret ends up at the start of its deleted line.
pub fn delete_line(text: &str, ranges: &[TextRange]) -> Option<EditingContext> {
    if ranges.is_empty() {
        return None;
    }

    let text = Utf16Text::new(text);
    let line_ranges = text.line_ranges(ranges, false);
    if line_ranges.is_empty() {
        return None;
    }

    let mut selected = Vec::with_capacity(line_ranges.len());
    let mut offset = 0;
    for range in &line_ranges {
        selected.push(TextRange::caret(range.location - offset));
        offset += range.length;
    }

    Some(EditingContext::new(
        vec![String::new(); line_ranges.len()],
        line_ranges,
        Some(normalize_selections(selected)),
    ))
}

/// Join the lines inside each of `ranges`, collapsing each line break and the whitespace around
/// it into a single space.
pub fn join_lines_in(text: &str, ranges: &[TextRange]) -> EditingContext {
    let text = Utf16Text::new(text);

    let strings: Vec<String> = ranges
        .iter()
        .map(|range| {
            LINE_BREAK_RUN
                .replace_all(text.substring(*range), " ")
                .into_owned()
        })
        .collect();

    let mut selected = Vec::with_capacity(ranges.len());
    let mut offset: isize = 0;
    for (range, string) in ranges.iter().zip(&strings) {
        let length = utf16_len(string);
        selected.push(TextRange::new(
            range.location.saturating_add_signed(offset),
            length,
        ));
        offset += length as isize - range.length as isize;
    }

    EditingContext::new(strings, ranges.to_vec(), Some(selected))
}

/// Join each line touched by `ranges` with the line after it.
///
/// Lines without a successor are skipped.
pub fn join_lines_after(text: &str, ranges: &[TextRange]) -> EditingContext {
    let snapshot = Utf16Text::new(text);

    let mut replacement_ranges: Vec<TextRange> = Vec::new();
    for line_range in snapshot.line_ranges(ranges, false) {
        let start = snapshot.byte_offset(line_range.location);
        let Some(found) = LINE_BREAK_RUN.find_at(text, start) else {
            continue;
        };
        let range = snapshot.range_of_bytes(found.start()..found.end());

        // the whitespace after a blank line may already be claimed by the previous line
        if replacement_ranges
            .last()
            .is_some_and(|last| last.upper_bound() > range.location)
        {
            continue;
        }
        replacement_ranges.push(range);
    }

    EditingContext::new(
        vec![" ".to_string(); replacement_ranges.len()],
        replacement_ranges,
        None,
    )
}

/// Sort the lines covered by `range` in ascending order.
pub fn sort_lines_ascending(text: &str, range: TextRange) -> Option<EditingContext> {
    reorder_lines(text, range, |mut lines| {
        lines.sort_by(|lhs, rhs| localized_compare(lhs, rhs));
        lines
    })
}

/// Reverse the lines covered by `range`.
pub fn reverse_lines(text: &str, range: TextRange) -> Option<EditingContext> {
    reorder_lines(text, range, |mut lines| {
        lines.reverse();
        lines
    })
}

/// Shuffle the lines covered by `range`.
pub fn shuffle_lines(text: &str, range: TextRange) -> Option<EditingContext> {
    shuffle_lines_with(text, range, &mut rand::thread_rng())
}

/// Shuffle the lines covered by `range` with the given random source.
pub fn shuffle_lines_with<R: Rng + ?Sized>(
    text: &str,
    range: TextRange,
    rng: &mut R,
) -> Option<EditingContext> {
    reorder_lines(text, range, |mut lines| {
        lines.shuffle(rng);
        lines
    })
}

/// Replace the lines covered by `range` with a permutation computed by `transform`.
///
/// Returns `None` if `range` contains no line break. Lines are split on any terminator and
/// joined again with the first terminator found in `range`.
pub fn reorder_lines<'a>(
    text: &'a str,
    range: TextRange,
    transform: impl FnOnce(Vec<&'a str>) -> Vec<&'a str>,
) -> Option<EditingContext> {
    let snapshot = Utf16Text::new(text);

    let line_ending = LineEnding::detect_in_text(snapshot.substring(range))?;
    let line_range = snapshot.line_contents_range(range);
    let lines = split_lines(snapshot.substring(line_range));

    let new_string = transform(lines).join(line_ending.as_str());
    let selected = TextRange::new(line_range.location, utf16_len(&new_string));

    Some(EditingContext::new(
        vec![new_string],
        vec![line_range],
        Some(vec![selected]),
    ))
}

/// Remove trailing spaces and tabs at line ends.
///
/// With `keeping_editing_point`, runs touching any of `editing_ranges` are kept. Returns `None`
/// if nothing is left to trim.
pub fn trim_trailing_whitespace(
    text: &str,
    ignoring_empty_lines: bool,
    keeping_editing_point: bool,
    editing_ranges: &[TextRange],
) -> Option<EditingContext> {
    let whitespace_ranges = ranges_of_trailing_whitespace(text, ignoring_empty_lines);

    let trimming_ranges: Vec<TextRange> = if keeping_editing_point {
        whitespace_ranges
            .into_iter()
            .filter(|range| editing_ranges.iter().all(|editing| !editing.touches(*range)))
            .collect()
    } else {
        whitespace_ranges
    };

    if trimming_ranges.is_empty() {
        return None;
    }

    let selected = editing_ranges
        .iter()
        .map(|range| range.removed(&trimming_ranges))
        .collect();

    Some(EditingContext::new(
        vec![String::new(); trimming_ranges.len()],
        trimming_ranges,
        Some(selected),
    ))
}

/// Ranges of trailing space/tab runs at every line end.
///
/// With `ignoring_empty_lines`, lines consisting only of whitespace are skipped.
pub fn ranges_of_trailing_whitespace(text: &str, ignoring_empty_lines: bool) -> Vec<TextRange> {
    let text = Utf16Text::new(text);

    text.line_contents_ranges(text.full_range())
        .into_iter()
        .filter_map(|line| {
            let content = text.substring(line);
            let trimmed = content.trim_end_matches([' ', '\t']);
            let trailing = content.len() - trimmed.len();

            if trailing == 0 || (ignoring_empty_lines && trimmed.is_empty()) {
                return None;
            }
            Some(TextRange::new(line.upper_bound() - trailing, trailing))
        })
        .collect()
}

/// Case-insensitive ordering with a case-sensitive tie-break.
fn localized_compare(lhs: &str, rhs: &str) -> Ordering {
    let folded = lhs
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(rhs.chars().flat_map(char::to_lowercase));

    folded.then_with(|| rhs.cmp(lhs))
}

fn ends_with_newline(line: &str) -> bool {
    line.ends_with(crate::text::is_newline)
}

fn last_char_len(line: &str) -> usize {
    if line.ends_with("\r\n") {
        2
    } else {
        line.chars().next_back().map_or(0, char::len_utf16)
    }
}

/// Remove the trailing line ending of `line` (CRLF as a whole).
fn pop_line_ending(line: &mut String) -> Option<&'static str> {
    if line.ends_with("\r\n") {
        line.truncate(line.len() - 2);
        return Some(LineEnding::Crlf.as_str());
    }

    let ending = line.chars().next_back().and_then(LineEnding::from_char)?;
    line.pop();
    Some(ending.as_str())
}

/// UTF-16 working copy for length-preserving line swaps.
struct SwapBuffer {
    units: Vec<u16>,
    region: Option<TextRange>,
}

impl SwapBuffer {
    fn new(text: &str) -> Self {
        Self {
            units: text.encode_utf16().collect(),
            region: None,
        }
    }

    fn string(&self, range: TextRange) -> String {
        String::from_utf16_lossy(&self.units[range.lower_bound()..range.upper_bound()])
    }

    fn replace(&mut self, range: TextRange, string: &str) {
        let replacement: Vec<u16> = string.encode_utf16().collect();
        debug_assert_eq!(replacement.len(), range.length);

        self.units
            .splice(range.lower_bound()..range.upper_bound(), replacement);
        self.region = Some(self.region.map_or(range, |region| region.union(range)));
    }

    /// The line containing `location` in the current state of the buffer.
    fn line_range_at(&self, location: usize) -> TextRange {
        let units = &self.units;
        let location = location.min(units.len());
        let inside_crlf = location > 0
            && units.get(location) == Some(&LF)
            && units[location - 1] == CR;

        let search_end = if inside_crlf { location - 1 } else { location };
        let start = units[..search_end]
            .iter()
            .rposition(|unit| is_newline_unit(*unit))
            .map_or(0, |idx| idx + 1);

        let end = if inside_crlf {
            location + 1
        } else {
            match units[location..]
                .iter()
                .position(|unit| is_newline_unit(*unit))
            {
                Some(idx) => {
                    let idx = location + idx;
                    if units[idx] == CR && units.get(idx + 1) == Some(&LF) {
                        idx + 2
                    } else {
                        idx + 1
                    }
                }
                None => units.len(),
            }
        };

        TextRange::from_bounds(start, end)
    }

    fn into_context(self, selected: Vec<TextRange>) -> Option<EditingContext> {
        let region = self.region?;
        let string = String::from_utf16_lossy(&self.units[region.lower_bound()..region.upper_bound()]);

        Some(EditingContext::new(
            vec![string],
            vec![region],
            Some(selected),
        ))
    }
}

const LF: u16 = 0x0A;
const CR: u16 = 0x0D;

fn is_newline_unit(unit: u16) -> bool {
    matches!(unit, 0x0A | 0x0D | 0x85 | 0x2028 | 0x2029)
}
