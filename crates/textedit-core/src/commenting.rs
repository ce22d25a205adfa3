//! Commenting out and uncommenting.
//!
//! Delimiters come from [`CommentDelimiters`]. Matching is literal and anchored: an inline
//! delimiter must follow only spaces/tabs from a line start, and a block pair must frame the
//! target range exactly (surrounding spaces/tabs allowed).

use bitflags::bitflags;
use textedit_core_lang::{CommentDelimiters, Pair};

use crate::editing::EditingContext;
use crate::range::{InsertionItem, TextRange};
use crate::selection_set::{merged, uniqued};
use crate::text::{Utf16Text, is_newline, trim_line_ending};

bitflags! {
    /// Kinds of comment delimiters an operation may use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommentTypes: u8 {
        /// Line-prefix delimiters such as `//`.
        const INLINE = 0b01;
        /// Begin/end pairs such as `/*` `*/`.
        const BLOCK = 0b10;
        /// Either kind; inline wins when both are available.
        const BOTH = Self::INLINE.bits() | Self::BLOCK.bits();
    }
}

/// Where comment delimiters are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommentOutLocation {
    /// Inline: after the indentation of each line touched by the selection. Block: around the
    /// selection, or around the line content for a caret.
    #[default]
    Selection,
    /// At the start of the lines touched by the selection.
    Line,
    /// After the indentation shared by all touched lines.
    AfterIndent,
}

/// Comment out the selected text.
///
/// Inline delimiters are preferred when `types` allows both kinds and both are configured.
/// Returns `None` if no usable delimiter is configured or nothing would be inserted.
pub fn comment_out(
    text: &str,
    types: CommentTypes,
    delimiters: &CommentDelimiters,
    spacer: &str,
    location: CommentOutLocation,
    tab_width: usize,
    selected_ranges: &[TextRange],
) -> Option<EditingContext> {
    if selected_ranges.is_empty() {
        return None;
    }

    let text = Utf16Text::new(text);
    let items = if types.contains(CommentTypes::INLINE)
        && let Some(delimiter) = delimiters.inline_delimiter()
    {
        let positions = inline_positions(&text, location, tab_width, selected_ranges);
        inline_comment_items(delimiter, spacer, &positions)
    } else if types.contains(CommentTypes::BLOCK)
        && let Some(pair) = delimiters.block_delimiters()
    {
        let targets = block_targets(&text, location, selected_ranges);
        block_comment_items(pair, spacer, &targets)
    } else {
        log::debug!("comment out requested for {types:?} without matching delimiters");
        return None;
    };

    if items.is_empty() {
        return None;
    }

    let new_selected = selected_ranges
        .iter()
        .map(|range| range.inserted(&items))
        .collect();

    Some(EditingContext::new(
        items.iter().map(|item| item.string.clone()).collect(),
        items.iter().map(|item| TextRange::caret(item.location)).collect(),
        Some(new_selected),
    ))
}

/// Remove comment delimiters from the selected text.
///
/// Block pairs are tried first, in order, on each selection (or the content of its line for a
/// caret). Otherwise the inline delimiter is removed from each touched line. Returns `None` if
/// nothing matches.
pub fn uncomment(
    text: &str,
    delimiters: &CommentDelimiters,
    spacer: &str,
    selected_ranges: &[TextRange],
) -> Option<EditingContext> {
    if delimiters.is_empty() || selected_ranges.is_empty() {
        return None;
    }

    let text = Utf16Text::new(text);
    let deletions = block_deletions(&text, delimiters, spacer, selected_ranges)
        .or_else(|| inline_deletions(&text, delimiters, spacer, selected_ranges))?;

    let new_selected = selected_ranges
        .iter()
        .map(|range| range.removed(&deletions))
        .collect();

    Some(EditingContext::new(
        vec![String::new(); deletions.len()],
        deletions,
        Some(new_selected),
    ))
}

/// Whether the selection can be uncommented.
///
/// With `partly` set, any match counts. Otherwise every targeted block range (or every line for
/// inline delimiters, empty lines included) must carry a delimiter.
pub fn can_uncomment(
    text: &str,
    partly: bool,
    delimiters: &CommentDelimiters,
    spacer: &str,
    selected_ranges: &[TextRange],
) -> bool {
    if delimiters.is_empty() {
        return false;
    }

    let text = Utf16Text::new(text);
    let targets: Vec<TextRange> = uniqued(
        selected_ranges
            .iter()
            .map(|range| text.line_contents_range(*range))
            .filter(|range| !range.is_empty()),
    );
    if targets.is_empty() {
        return false;
    }

    for pair in delimiters.block_pairs() {
        if let Some(ranges) = block_delimiter_ranges(&text, pair, spacer, &targets) {
            return partly || ranges.len() == 2 * targets.len();
        }
    }

    if let Some(delimiter) = delimiters.inline_delimiter()
        && let Some(ranges) = inline_delimiter_ranges(&text, delimiter, spacer, &targets)
    {
        let line_count = uniqued(
            targets
                .iter()
                .flat_map(|range| text.line_contents_ranges(*range)),
        )
        .len();
        return partly || ranges.len() == line_count;
    }

    false
}

/// Ranges of inline delimiters (plus spacer, if present) at the line starts inside `ranges`.
///
/// Returns `Some(vec![])` when there is nothing to search and `None` when nothing matched.
pub fn ranges_of_inline_delimiter(
    text: &str,
    delimiter: &str,
    spacer: &str,
    ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    inline_delimiter_ranges(&Utf16Text::new(text), delimiter, spacer, ranges)
}

/// Ranges of a block pair framing each of `ranges` exactly: `[begin+spacer, spacer+end]` per
/// matching range.
///
/// Returns `Some(vec![])` when there is nothing to search and `None` when nothing matched.
pub fn ranges_of_block_delimiters(
    text: &str,
    pair: &Pair<String>,
    spacer: &str,
    ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    block_delimiter_ranges(&Utf16Text::new(text), pair, spacer, ranges)
}

// MARK: comment out

fn inline_positions(
    text: &Utf16Text,
    location: CommentOutLocation,
    tab_width: usize,
    selected_ranges: &[TextRange],
) -> Vec<usize> {
    match location {
        CommentOutLocation::Selection => uniqued(
            selected_ranges
                .iter()
                .flat_map(|range| text.line_starts_in(*range))
                .map(|start| {
                    let line = text.line_contents_range_at(start);
                    line.location + indent_length(text.substring(line))
                }),
        ),
        CommentOutLocation::Line => uniqued(
            uniqued(
                selected_ranges
                    .iter()
                    .map(|range| text.line_contents_range(*range)),
            )
            .into_iter()
            .flat_map(|range| text.line_starts_in(range)),
        ),
        CommentOutLocation::AfterIndent => {
            let lines: Vec<TextRange> = uniqued(selected_ranges.iter().flat_map(|range| {
                let lines = text.line_contents_ranges(*range);
                if lines.is_empty() {
                    // the empty last line of a text ending with a line break
                    vec![text.line_contents_range(*range)]
                } else {
                    lines
                }
            }));
            let column = lines
                .iter()
                .filter_map(|line| indent_column(text.substring(*line), tab_width))
                .min()
                .unwrap_or(0);

            lines
                .iter()
                .map(|line| {
                    line.location + offset_for_column(text.substring(*line), column, tab_width)
                })
                .collect()
        }
    }
}

/// Length of the leading spaces/tabs of `line` in UTF-16 units.
fn indent_length(line: &str) -> usize {
    line.chars().take_while(|ch| matches!(ch, ' ' | '\t')).count()
}

/// Visual width of the leading whitespace of `line`, or `None` for a blank line.
fn indent_column(line: &str, tab_width: usize) -> Option<usize> {
    let content = line.trim_start_matches([' ', '\t']);
    if content.is_empty() {
        return None;
    }
    let indent = &line[..line.len() - content.len()];
    Some(indent.chars().map(|ch| char_width(ch, tab_width)).sum())
}

/// Offset into `line`'s leading whitespace where `column` is reached without passing it.
fn offset_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut width = 0;
    let mut offset = 0;
    for ch in line.chars().take_while(|ch| matches!(ch, ' ' | '\t')) {
        let next = width + char_width(ch, tab_width);
        if next > column {
            break;
        }
        width = next;
        offset += 1;
    }
    offset
}

fn char_width(ch: char, tab_width: usize) -> usize {
    if ch == '\t' { tab_width } else { 1 }
}

fn inline_comment_items(delimiter: &str, spacer: &str, positions: &[usize]) -> Vec<InsertionItem> {
    let string = format!("{delimiter}{spacer}");
    positions
        .iter()
        .map(|location| InsertionItem::new(string.clone(), *location, true))
        .collect()
}

fn block_targets(
    text: &Utf16Text,
    location: CommentOutLocation,
    selected_ranges: &[TextRange],
) -> Vec<TextRange> {
    let mut targets = match location {
        CommentOutLocation::Selection => uniqued(selected_ranges.iter().map(|range| {
            if range.is_empty() {
                text.line_contents_range(*range)
            } else {
                *range
            }
        })),
        CommentOutLocation::Line => merged(
            selected_ranges
                .iter()
                .map(|range| text.line_contents_range(*range)),
        ),
        CommentOutLocation::AfterIndent => merged(selected_ranges.iter().map(|range| {
            let line = text.line_contents_range(*range);
            let indent = indent_length(text.substring(line));
            TextRange::from_bounds(line.location + indent, line.upper_bound())
        })),
    };
    // nothing to wrap on blank lines
    targets.retain(|range| !range.is_empty());
    targets.sort();
    targets
}

fn block_comment_items(
    pair: &Pair<String>,
    spacer: &str,
    targets: &[TextRange],
) -> Vec<InsertionItem> {
    let begin = format!("{}{spacer}", pair.begin);
    let end = format!("{spacer}{}", pair.end);

    targets
        .iter()
        .flat_map(|range| {
            [
                InsertionItem::new(begin.clone(), range.lower_bound(), true),
                InsertionItem::new(end.clone(), range.upper_bound(), false),
            ]
        })
        .collect()
}

// MARK: uncomment

fn block_deletions(
    text: &Utf16Text,
    delimiters: &CommentDelimiters,
    spacer: &str,
    selected_ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    delimiters
        .block_pairs()
        .find_map(|pair| {
            // a selection not framed itself may still sit inside a framed line
            let targets: Vec<TextRange> = uniqued(selected_ranges.iter().map(|range| {
                if range.is_empty() || block_frame(text, *range, pair, spacer).is_none() {
                    text.line_contents_range(*range)
                } else {
                    *range
                }
            }));
            block_delimiter_ranges(text, pair, spacer, &targets)
        })
        .map(uniqued)
        .filter(|ranges| !ranges.is_empty())
}

fn inline_deletions(
    text: &Utf16Text,
    delimiters: &CommentDelimiters,
    spacer: &str,
    selected_ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    let delimiter = delimiters.inline_delimiter()?;
    let targets: Vec<TextRange> = uniqued(
        selected_ranges
            .iter()
            .map(|range| text.line_contents_range(*range)),
    );

    inline_delimiter_ranges(text, delimiter, spacer, &targets).filter(|ranges| !ranges.is_empty())
}

pub(crate) fn inline_delimiter_ranges(
    text: &Utf16Text,
    delimiter: &str,
    spacer: &str,
    ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    let targets: Vec<TextRange> = ranges
        .iter()
        .copied()
        .filter(|range| !range.is_empty())
        .collect();
    if targets.is_empty() || text.is_empty() || delimiter.is_empty() {
        return Some(Vec::new());
    }

    let s = text.as_str();
    let mut found = Vec::new();
    for range in targets {
        let end = text.byte_range(range).end;
        for start in text.line_starts_in(range) {
            let start = text.byte_offset(start);
            let line = &s[start..end.max(start)];
            let line = &line[..line.find(is_newline).unwrap_or(line.len())];

            let content = line.trim_start_matches([' ', '\t']);
            if !content.starts_with(delimiter) {
                continue;
            }
            let mut length = delimiter.len();
            if !spacer.is_empty() && content[length..].starts_with(spacer) {
                length += spacer.len();
            }
            let lower = start + (line.len() - content.len());
            found.push(text.range_of_bytes(lower..lower + length));
        }
    }

    let found = uniqued(found);
    (!found.is_empty()).then_some(found)
}

pub(crate) fn block_delimiter_ranges(
    text: &Utf16Text,
    pair: &Pair<String>,
    spacer: &str,
    ranges: &[TextRange],
) -> Option<Vec<TextRange>> {
    let targets: Vec<TextRange> = ranges
        .iter()
        .copied()
        .filter(|range| !range.is_empty())
        .collect();
    if targets.is_empty() || text.is_empty() {
        return Some(Vec::new());
    }

    let found: Vec<TextRange> = targets
        .iter()
        .filter_map(|range| block_frame(text, *range, pair, spacer))
        .flat_map(|(begin, end)| [begin, end])
        .collect();

    (!found.is_empty()).then_some(found)
}

/// The begin and end delimiter ranges when `pair` frames `range` exactly.
fn block_frame(
    text: &Utf16Text,
    range: TextRange,
    pair: &Pair<String>,
    spacer: &str,
) -> Option<(TextRange, TextRange)> {
    let bytes = text.byte_range(range);
    let sub = &text.as_str()[bytes.clone()];

    let body = sub.trim_start_matches([' ', '\t']);
    let offset = bytes.start + (sub.len() - body.len());
    // a single trailing line break may follow the closing delimiter
    let core = trim_line_ending(body).trim_end_matches([' ', '\t']);

    if core.len() < pair.begin.len() + pair.end.len()
        || !core.starts_with(pair.begin.as_str())
        || !core.ends_with(pair.end.as_str())
    {
        return None;
    }

    let mut begin_end = pair.begin.len();
    let mut end_start = core.len() - pair.end.len();
    if !spacer.is_empty() {
        if core[begin_end..end_start].starts_with(spacer) {
            begin_end += spacer.len();
        }
        if core[begin_end..end_start].ends_with(spacer) {
            end_start -= spacer.len();
        }
    }

    Some((
        text.range_of_bytes(offset..offset + begin_end),
        text.range_of_bytes(offset + end_start..offset + core.len()),
    ))
}
