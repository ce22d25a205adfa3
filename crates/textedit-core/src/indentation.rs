//! Indentation operations: indent/outdent, style conversion and detection, soft tabs.

use crate::editing::EditingContext;
use crate::range::TextRange;
use crate::text::{Utf16Text, split_lines_inclusive, utf16_len};
use textedit_core_lang::IndentStyle;

/// Lines needed before [`detected_indent_style`] commits to a style.
const DETECTION_MIN_LINES: usize = 3;
/// Lines sampled at most by [`detected_indent_style`].
const DETECTION_MAX_LINES: usize = 100;

/// Guess the indentation style of `text`.
///
/// Samples up to 100 lines, counting lines that start with a tab versus lines that start with
/// at least two spaces. A style is returned only when at least 3 lines qualify and one count is
/// more than twice the other.
pub fn detected_indent_style(text: &str) -> Option<IndentStyle> {
    let mut tab_count = 0;
    let mut space_count = 0;

    for line in split_lines_inclusive(text).into_iter().take(DETECTION_MAX_LINES) {
        if line.starts_with('\t') {
            tab_count += 1;
        } else if line.starts_with("  ") {
            space_count += 1;
        }
    }

    if tab_count.max(space_count) < DETECTION_MIN_LINES {
        return None;
    }

    if tab_count > space_count * 2 {
        Some(IndentStyle::Tab)
    } else if space_count > tab_count * 2 {
        Some(IndentStyle::Space)
    } else {
        None
    }
}

/// Rewrite the leading indentation of every line in `string` to `style`.
///
/// Only whole units anchored at the line start are converted: a tab becomes `tab_width` spaces,
/// and every run of `tab_width` spaces becomes a tab. Leftover spaces stay as they are.
pub fn standardizing_indent(string: &str, style: IndentStyle, tab_width: usize) -> String {
    if tab_width == 0 {
        return string.to_string();
    }

    let spaces = " ".repeat(tab_width);
    let (before, after) = match style {
        IndentStyle::Space => ("\t", spaces.as_str()),
        IndentStyle::Tab => (spaces.as_str(), "\t"),
    };

    let mut out = String::with_capacity(string.len());
    for line in split_lines_inclusive(string) {
        let mut rest = line;
        while let Some(stripped) = rest.strip_prefix(before) {
            out.push_str(after);
            rest = stripped;
        }
        out.push_str(rest);
    }
    out
}

/// Prepend one indent unit to every line touched by `selected_ranges`.
///
/// A caret at the very end of a text ending with a line break indents that empty last line.
pub fn indent(
    text: &str,
    style: IndentStyle,
    indent_width: usize,
    selected_ranges: &[TextRange],
) -> EditingContext {
    let text = Utf16Text::new(text);
    let unit = style.unit(indent_width);
    let unit_len = utf16_len(&unit);

    let line_ranges = text.line_ranges(selected_ranges, true);
    let new_lines: Vec<String> = line_ranges
        .iter()
        .map(|range| format!("{unit}{}", text.substring(*range)))
        .collect();

    let new_selected = selected_ranges
        .iter()
        .map(|selected| {
            let shift = line_ranges
                .iter()
                .filter(|line| line.location <= selected.location)
                .count();
            let line_count = line_ranges
                .iter()
                .filter(|line| selected.intersects(**line))
                .count();

            TextRange::new(
                selected.location + shift * unit_len,
                selected.length + line_count.saturating_sub(1) * unit_len,
            )
        })
        .collect();

    EditingContext::new(new_lines, line_ranges, Some(new_selected))
}

/// Remove up to one indent unit from every line touched by `selected_ranges`.
///
/// A leading tab counts as a full unit; otherwise up to `indent_width` leading spaces are
/// removed. Returns `None` if no line has removable indentation.
pub fn outdent(
    text: &str,
    indent_width: usize,
    selected_ranges: &[TextRange],
) -> Option<EditingContext> {
    let text = Utf16Text::new(text);
    let line_ranges = text.line_ranges(selected_ranges, false);

    let drop_counts: Vec<usize> = line_ranges
        .iter()
        .map(|range| {
            let line = text.substring(*range);
            if line.starts_with('\t') {
                1
            } else {
                line.chars()
                    .take(indent_width)
                    .take_while(|ch| *ch == ' ')
                    .count()
            }
        })
        .collect();

    if drop_counts.iter().all(|count| *count == 0) {
        return None;
    }

    let new_lines: Vec<String> = line_ranges
        .iter()
        .zip(&drop_counts)
        .map(|(range, count)| text.substring(*range)[*count..].to_string())
        .collect();

    let dropped_ranges: Vec<TextRange> = line_ranges
        .iter()
        .zip(&drop_counts)
        .filter(|(_, count)| **count > 0)
        .map(|(range, count)| TextRange::new(range.location, *count))
        .collect();

    let new_selected = selected_ranges
        .iter()
        .map(|selected| selected.removed(&dropped_ranges))
        .collect();

    Some(EditingContext::new(new_lines, line_ranges, Some(new_selected)))
}

/// Convert the indentation inside the selected ranges to `style`.
///
/// If no selection has a length, the whole text is converted. Returns `None` if nothing changed.
pub fn convert_indentation(
    text: &str,
    style: IndentStyle,
    indent_width: usize,
    selected_ranges: &[TextRange],
) -> Option<EditingContext> {
    if text.is_empty() {
        return None;
    }

    let text = Utf16Text::new(text);
    let target_ranges: Vec<TextRange> = if selected_ranges.iter().any(|range| !range.is_empty()) {
        selected_ranges
            .iter()
            .copied()
            .filter(|range| !range.is_empty())
            .collect()
    } else {
        vec![text.full_range()]
    };

    let mut strings = Vec::new();
    let mut ranges = Vec::new();
    for range in target_ranges {
        let original = text.substring(range);
        let converted = standardizing_indent(original, style, indent_width);

        if converted != original {
            strings.push(converted);
            ranges.push(range);
        }
    }

    if ranges.is_empty() {
        return None;
    }

    Some(EditingContext::new(strings, ranges, None))
}

/// The leading `[ \t]+` run of the line containing `location`.
pub fn range_of_indent(text: &str, location: usize) -> Option<TextRange> {
    indent_range_in(&Utf16Text::new(text), location)
}

pub(crate) fn indent_range_in(text: &Utf16Text, location: usize) -> Option<TextRange> {
    let line = text.line_range_at(location);
    let indent_len = text
        .substring(line)
        .chars()
        .take_while(|ch| matches!(ch, ' ' | '\t'))
        .count();

    (indent_len > 0).then(|| TextRange::new(line.location, indent_len))
}

/// Indent level of the line containing `location`: tabs plus other indent characters divided
/// by `tab_width`.
pub fn indent_level(text: &str, location: usize, tab_width: usize) -> usize {
    indent_level_in(&Utf16Text::new(text), location, tab_width)
}

pub(crate) fn indent_level_in(text: &Utf16Text, location: usize, tab_width: usize) -> usize {
    let Some(range) = indent_range_in(text, location) else {
        return 0;
    };
    let indent = text.substring(range);
    let tabs = indent.chars().filter(|ch| *ch == '\t').count();
    let others = range.length - tabs;

    tabs + others / tab_width.max(1)
}

/// Visual column of `location` in its line, counting a tab as `tab_width`.
pub fn column(text: &str, location: usize, tab_width: usize) -> usize {
    Utf16Text::new(text).column(location, tab_width)
}

/// Spaces a soft tab inserts at `location` (up to the next tab stop).
pub fn soft_tab(text: &str, location: usize, tab_width: usize) -> String {
    Utf16Text::new(text).soft_tab(location, tab_width)
}

/// Range a backspace should delete to remove one soft tab before the caret.
///
/// Applies only to a caret preceded by at least two spaces and nothing else on its line. The
/// deletion reaches back to the previous tab stop.
pub fn range_for_soft_tab_deletion(
    text: &str,
    range: TextRange,
    tab_width: usize,
) -> Option<TextRange> {
    if !range.is_empty() || tab_width == 0 {
        return None;
    }

    let text = Utf16Text::new(text);
    let line_start = text.line_start_index(range.location);
    let forward = text.substring(TextRange::from_bounds(line_start, range.location));

    if forward.len() < 2 || !forward.bytes().all(|byte| byte == b' ') {
        return None;
    }

    let column = text.column(range.location, tab_width);
    let target_length = tab_width - column % tab_width;
    let location = range.location.checked_sub(target_length)?;
    let target_range = TextRange::new(location, target_length);

    text.substring(target_range)
        .bytes()
        .all(|byte| byte == b' ')
        .then_some(target_range)
}
