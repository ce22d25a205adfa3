//! Brace and quote pair matching.
//!
//! Scanning walks grapheme clusters, so a delimiter followed by a combining mark is not a
//! delimiter. Which occurrences count is governed by a [`DelimiterEscapeRule`]:
//!
//! - [`DelimiterEscapeRule::Backslash`]: an odd run of `\` before a delimiter escapes it.
//! - [`DelimiterEscapeRule::DoubleDelimiter`]: for pairs whose begin and end are the same
//!   character (quotes), a run of that character is read as escaped doubles; only the last
//!   delimiter of an odd run is real.
//! - [`DelimiterEscapeRule::None`]: every occurrence is real.

use textedit_core_lang::{DelimiterEscapeRule, Pair};
use unicode_segmentation::UnicodeSegmentation;

use crate::range::TextRange;
use crate::text::Utf16Text;

/// A pair of single-character delimiters.
pub type BracePair = Pair<char>;

/// `()`, `{}` and `[]`.
pub const BRACES: [BracePair; 3] = [
    BracePair::new('(', ')'),
    BracePair::new('{', '}'),
    BracePair::new('[', ']'),
];

/// Double quote, single quote and backtick.
pub const QUOTES: [BracePair; 3] = [
    BracePair::new('"', '"'),
    BracePair::new('\'', '\''),
    BracePair::new('`', '`'),
];

/// `<>`.
pub const LT_GT: BracePair = BracePair::new('<', '>');

/// Location of the mate found by [`index_of_brace_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairIndex {
    /// The mate is the opening delimiter at this offset.
    Begin(usize),
    /// The mate is the closing delimiter at this offset.
    End(usize),
}

/// Options that control pair scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairScanOptions {
    /// Which delimiter occurrences are escaped.
    pub escape: DelimiterEscapeRule,
    /// Delimiters enclosed by this pair are skipped while scanning.
    pub ignoring: Option<BracePair>,
}

impl PairScanOptions {
    /// Options with the given escape rule and no ignored pair.
    pub fn new(escape: DelimiterEscapeRule) -> Self {
        Self {
            escape,
            ignoring: None,
        }
    }

    /// Skip everything enclosed by `pair`.
    pub fn ignoring(mut self, pair: BracePair) -> Self {
        self.ignoring = Some(pair);
        self
    }
}

/// Find the opening delimiter matching a closing one at `end_index`.
///
/// Scans backwards from `end_index` (exclusive) down to `until` (default: text start).
pub fn index_of_brace_pair_before(
    text: &str,
    end_index: usize,
    pair: BracePair,
    until: Option<usize>,
    options: PairScanOptions,
) -> Option<usize> {
    begin_index_in(&Utf16Text::new(text), end_index, pair, until, options)
}

/// Find the closing delimiter matching the opening one at `begin_index`.
///
/// Scans forwards from just after `begin_index` up to `until` (default: text end, exclusive).
pub fn index_of_brace_pair_after(
    text: &str,
    begin_index: usize,
    pair: BracePair,
    until: Option<usize>,
    options: PairScanOptions,
) -> Option<usize> {
    end_index_in(&Utf16Text::new(text), begin_index, pair, until, options)
}

/// Find the mate of the delimiter at `index`.
///
/// Returns `None` if the character at `index` is escaped, is not a delimiter of any
/// `candidates`, or has no mate within `range` (default: the whole text).
pub fn index_of_brace_pair(
    text: &str,
    index: usize,
    candidates: &[BracePair],
    range: Option<TextRange>,
    options: PairScanOptions,
) -> Option<PairIndex> {
    pair_index_in(&Utf16Text::new(text), index, candidates, range, options)
}

/// The range from the delimiter at `index` to its mate, both delimiters included.
pub fn range_of_brace_pair(
    text: &str,
    index: usize,
    candidates: &[BracePair],
    options: PairScanOptions,
) -> Option<TextRange> {
    let text = Utf16Text::new(text);

    match pair_index_in(&text, index, candidates, None, options)? {
        PairIndex::Begin(begin) => Some(TextRange::from_bounds(begin, text.index_after(index))),
        PairIndex::End(end) => Some(TextRange::from_bounds(index, text.index_after(end))),
    }
}

/// The smallest range enclosed by one of `candidates` around `range`, delimiters included.
///
/// Only asymmetric pairs take part; quotes cannot be told apart from their mates without
/// parsing.
pub fn range_of_enclosing_brace_pair(
    text: &str,
    range: TextRange,
    candidates: &[BracePair],
    escape: DelimiterEscapeRule,
) -> Option<TextRange> {
    enclosing_range_in(&Utf16Text::new(text), range, candidates, escape)
}

pub(crate) fn pair_index_in(
    text: &Utf16Text,
    index: usize,
    candidates: &[BracePair],
    range: Option<TextRange>,
    options: PairScanOptions,
) -> Option<PairIndex> {
    let s = text.as_str();
    let byte = text.byte_offset(index);
    let grapheme = s[byte..].graphemes(true).next()?;
    let ch = single_char(grapheme)?;
    let pair = candidates
        .iter()
        .copied()
        .find(|pair| pair.begin == ch || pair.end == ch)?;

    if is_escaped(s, byte, ch, pair.is_symmetric(), options.escape) {
        return None;
    }

    if ch == pair.begin {
        end_index_in(text, index, pair, range.map(|r| r.upper_bound()), options).map(PairIndex::End)
    } else {
        begin_index_in(text, index, pair, range.map(|r| r.lower_bound()), options)
            .map(PairIndex::Begin)
    }
}

pub(crate) fn begin_index_in(
    text: &Utf16Text,
    end_index: usize,
    pair: BracePair,
    until: Option<usize>,
    options: PairScanOptions,
) -> Option<usize> {
    let s = text.as_str();
    let lower = text.byte_offset(until.unwrap_or(0));
    let upper = text.byte_offset(end_index);
    if lower >= upper {
        return None;
    }

    let mut depth = 0usize;
    let mut ignored_depth = 0usize;
    let escaped = |byte, ch| is_escaped(s, byte, ch, pair.is_symmetric(), options.escape);

    for (byte, grapheme) in s[..upper].grapheme_indices(true).rev() {
        if byte < lower {
            break;
        }
        let Some(ch) = single_char(grapheme) else {
            continue;
        };

        if ignored_depth == 0 && ch == pair.begin {
            if escaped(byte, ch) {
                continue;
            }
            if depth == 0 {
                return Some(text.location(byte));
            }
            depth -= 1;
        } else if ignored_depth == 0 && ch == pair.end {
            if !escaped(byte, ch) {
                depth += 1;
            }
        } else if let Some(ignoring) = options.ignoring {
            ignored_depth = ignored_depth_after(s, byte, ch, ignoring, ignored_depth, false, options);
        }
    }

    None
}

pub(crate) fn end_index_in(
    text: &Utf16Text,
    begin_index: usize,
    pair: BracePair,
    until: Option<usize>,
    options: PairScanOptions,
) -> Option<usize> {
    let s = text.as_str();
    let start = text.byte_offset(begin_index);
    let upper = until.map_or(s.len(), |until| text.byte_offset(until));
    if start >= upper {
        return None;
    }

    let mut depth = 0usize;
    let mut ignored_depth = 0usize;
    let escaped = |byte, ch| is_escaped(s, byte, ch, pair.is_symmetric(), options.escape);

    for (offset, grapheme) in s[start..].grapheme_indices(true).skip(1) {
        let byte = start + offset;
        if byte >= upper {
            break;
        }
        let Some(ch) = single_char(grapheme) else {
            continue;
        };

        if ignored_depth == 0 && ch == pair.end {
            if escaped(byte, ch) {
                continue;
            }
            if depth == 0 {
                return Some(text.location(byte));
            }
            depth -= 1;
        } else if ignored_depth == 0 && ch == pair.begin {
            if !escaped(byte, ch) {
                depth += 1;
            }
        } else if let Some(ignoring) = options.ignoring {
            ignored_depth = ignored_depth_after(s, byte, ch, ignoring, ignored_depth, true, options);
        }
    }

    None
}

/// Depth inside the ignored pair after seeing `ch` while scanning in the given direction.
fn ignored_depth_after(
    s: &str,
    byte: usize,
    ch: char,
    ignoring: BracePair,
    depth: usize,
    forward: bool,
    options: PairScanOptions,
) -> usize {
    let symmetric = ignoring.is_symmetric();
    if (ch != ignoring.begin && ch != ignoring.end)
        || is_escaped(s, byte, ch, symmetric, options.escape)
    {
        return depth;
    }

    // quotes toggle
    if symmetric {
        return if depth == 0 { 1 } else { 0 };
    }

    let opening = if forward { ignoring.begin } else { ignoring.end };
    if ch == opening {
        depth + 1
    } else {
        depth.saturating_sub(1)
    }
}

pub(crate) fn enclosing_range_in(
    text: &Utf16Text,
    range: TextRange,
    candidates: &[BracePair],
    escape: DelimiterEscapeRule,
) -> Option<TextRange> {
    let candidates: Vec<BracePair> = candidates
        .iter()
        .copied()
        .filter(|pair| !pair.is_symmetric())
        .collect();
    let s = text.as_str();
    let upper = text.byte_offset(range.upper_bound());

    // unbalanced closers after the range, nearest first; a stray closer without an opener
    // before the range is skipped
    let mut depths = vec![0usize; candidates.len()];
    for (offset, grapheme) in s[upper..].grapheme_indices(true) {
        let byte = upper + offset;
        let Some(ch) = single_char(grapheme) else {
            continue;
        };
        if !candidates.iter().any(|pair| pair.begin == ch || pair.end == ch)
            || is_escaped(s, byte, ch, false, escape)
        {
            continue;
        }

        if let Some(i) = candidates.iter().position(|pair| pair.begin == ch) {
            depths[i] += 1;
        } else if let Some(i) = candidates.iter().position(|pair| pair.end == ch) {
            if depths[i] > 0 {
                depths[i] -= 1;
                continue;
            }
            if let Some(begin) = begin_index_in(
                text,
                range.lower_bound(),
                candidates[i],
                None,
                PairScanOptions::new(escape),
            ) {
                return Some(TextRange::from_bounds(
                    begin,
                    text.location(byte + grapheme.len()),
                ));
            }
        }
    }

    None
}

/// Returns `true` if the delimiter `ch` at `byte` does not count under `rule`.
pub(crate) fn is_escaped(
    s: &str,
    byte: usize,
    ch: char,
    symmetric: bool,
    rule: DelimiterEscapeRule,
) -> bool {
    match rule {
        DelimiterEscapeRule::None => false,
        DelimiterEscapeRule::Backslash => {
            s[..byte].chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
        }
        DelimiterEscapeRule::DoubleDelimiter => {
            if !symmetric {
                return false;
            }
            let before = s[..byte].chars().rev().take_while(|c| *c == ch).count();
            let from = s[byte..].chars().take_while(|c| *c == ch).count();
            (before + from) % 2 == 0 || from > 1
        }
    }
}

fn single_char(grapheme: &str) -> Option<char> {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslash_escape_counts_run() {
        let s = r#"a\"b\\"c"#;
        assert!(is_escaped(s, 2, '"', true, DelimiterEscapeRule::Backslash));
        assert!(!is_escaped(s, 6, '"', true, DelimiterEscapeRule::Backslash));
        assert!(!is_escaped(s, 2, '"', true, DelimiterEscapeRule::None));
    }

    #[test]
    fn test_double_delimiter_escape() {
        // 'it''s'
        let s = "'it''s'";
        let rule = DelimiterEscapeRule::DoubleDelimiter;
        assert!(!is_escaped(s, 0, '\'', true, rule));
        assert!(is_escaped(s, 3, '\'', true, rule));
        assert!(is_escaped(s, 4, '\'', true, rule));
        assert!(!is_escaped(s, 6, '\'', true, rule));
        // asymmetric pairs never double-escape
        assert!(!is_escaped("((", 0, '(', false, rule));
    }
}
