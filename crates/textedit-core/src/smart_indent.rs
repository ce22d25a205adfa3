//! Auto-indentation on newline insertion and outdent on typing a closing brace.

use textedit_core_lang::{DelimiterEscapeRule, IndentStyle, Pair};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::brace_pair::{BracePair, PairScanOptions, begin_index_in};
use crate::editing::EditingContext;
use crate::indentation::{indent_level_in, indent_range_in};
use crate::range::TextRange;
use crate::text::{Utf16Text, utf16_len};

/// A token that raises the indent level of the following line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndentToken {
    /// A begin/end pair of arbitrary strings, e.g. `then`/`end`.
    TokenPair {
        /// The begin and end tokens.
        pair: Pair<String>,
        /// Match the tokens case-insensitively.
        ignore_case: bool,
    },
    /// A pair of single punctuation characters, e.g. `{`/`}`.
    SymbolPair(BracePair),
    /// A begin token with no end token, e.g. `:`.
    BeginToken {
        /// The begin token.
        token: String,
        /// Match the token case-insensitively.
        ignore_case: bool,
    },
}

impl IndentToken {
    /// Build a token from a begin/end definition.
    ///
    /// Surrounding whitespace is trimmed. An empty `begin` is rejected, an empty `end` makes a
    /// begin-only token, and two single punctuation characters make a symbol pair.
    pub fn new(begin: &str, end: &str, ignore_case: bool) -> Option<Self> {
        let begin = begin.trim();
        let end = end.trim();

        if begin.is_empty() {
            return None;
        }
        if end.is_empty() {
            return Some(Self::BeginToken {
                token: begin.to_string(),
                ignore_case,
            });
        }

        match (single_char(begin), single_char(end)) {
            (Some(begin), Some(end)) if is_punctuation(begin) && is_punctuation(end) => {
                Some(Self::SymbolPair(BracePair::new(begin, end)))
            }
            _ => Some(Self::TokenPair {
                pair: Pair::new(begin.to_string(), end.to_string()),
                ignore_case,
            }),
        }
    }

    /// The brace pair of a symbol pair token.
    pub fn characters(&self) -> Option<BracePair> {
        match self {
            Self::SymbolPair(pair) => Some(*pair),
            _ => None,
        }
    }

    /// The begin token.
    pub fn begin(&self) -> String {
        match self {
            Self::TokenPair { pair, .. } => pair.begin.clone(),
            Self::SymbolPair(pair) => pair.begin.to_string(),
            Self::BeginToken { token, .. } => token.clone(),
        }
    }

    /// The end token, if any.
    pub fn end(&self) -> Option<String> {
        match self {
            Self::TokenPair { pair, .. } => Some(pair.end.clone()),
            Self::SymbolPair(pair) => Some(pair.end.to_string()),
            Self::BeginToken { .. } => None,
        }
    }

    /// Returns `true` if the token is matched case-insensitively.
    pub fn ignore_case(&self) -> bool {
        match self {
            Self::TokenPair { ignore_case, .. } | Self::BeginToken { ignore_case, .. } => {
                *ignore_case
            }
            Self::SymbolPair(_) => false,
        }
    }
}

/// Compute the indentation inserted after a newline.
///
/// `text` already contains the newline; each selection sits right after it. The new line copies
/// the indentation of the line above. If a begin token ends that line, one more `style` unit is
/// added, and if its end token follows the selection the closing token is pushed to a further
/// line at the base indentation. Selections without a line break before them are left in place.
///
/// Returns `None` if nothing needs to be inserted.
pub fn smart_indent(
    text: &str,
    style: IndentStyle,
    indent_width: usize,
    tokens: &[IndentToken],
    selected_ranges: &[TextRange],
) -> Option<EditingContext> {
    debug_assert!(indent_width > 0);

    let text = Utf16Text::new(text);
    let mut indents = Vec::new();
    let mut replacement_ranges = Vec::new();
    let mut new_selected = Vec::with_capacity(selected_ranges.len());
    let mut offset = 0;

    for selected in selected_ranges {
        let Some(line_ending) = text.line_ending_before(selected.location) else {
            log::debug!(
                "smart indent: no line break before offset {}, selection kept",
                selected.location
            );
            new_selected.push(TextRange::caret(selected.lower_bound() + offset));
            continue;
        };

        let last_location = selected.location - line_ending.len_utf16();
        let base_indent =
            indent_range_in(&text, last_location).map_or("", |range| text.substring(range));
        let mut indent = base_indent.to_string();
        let mut cursor_move = utf16_len(base_indent);

        let candidates: Vec<&IndentToken> = tokens
            .iter()
            .filter(|token| matches_before(&text, &token.begin(), last_location, token.ignore_case()))
            .collect();

        if !candidates.is_empty() {
            let unit = style.unit(indent_width);
            let sandwiched = candidates.iter().any(|token| {
                token.end().is_some_and(|end| {
                    matches_after(&text, &end, selected.upper_bound(), token.ignore_case())
                })
            });

            indent.push_str(&unit);
            cursor_move += utf16_len(&unit);
            if sandwiched {
                indent.push_str(line_ending.as_str());
                indent.push_str(base_indent);
            }
        }

        let range = TextRange::caret(selected.lower_bound());
        new_selected.push(range.shifted((cursor_move + offset) as isize));
        offset += utf16_len(&indent);

        if !indent.is_empty() {
            indents.push(indent);
            replacement_ranges.push(range);
        }
    }

    if indents.is_empty() {
        return None;
    }

    Some(EditingContext::new(
        indents,
        replacement_ranges,
        Some(new_selected),
    ))
}

/// Number of indent levels to drop when `string` is typed at `range`.
///
/// Non-zero only if `string` closes a symbol pair token, the line holds nothing but spaces and
/// tabs up to the insertion point, and the opening brace can be found before it. The result is
/// the difference between the current indent level and that of the opening brace's line.
pub fn smart_outdent_level(
    text: &str,
    string: &str,
    indent_width: usize,
    tokens: &[IndentToken],
    range: TextRange,
    escape: DelimiterEscapeRule,
) -> usize {
    debug_assert!(indent_width > 0);

    let Some(pair) = tokens
        .iter()
        .filter_map(IndentToken::characters)
        .find(|pair| single_char(string) == Some(pair.end))
    else {
        return 0;
    };

    let text = Utf16Text::new(text);
    let insertion = range.upper_bound();
    let line_start = text.line_start_index(insertion);
    let leading = text.substring(TextRange::from_bounds(line_start, insertion));

    if leading.is_empty() || !leading.chars().all(|ch| matches!(ch, ' ' | '\t')) {
        return 0;
    }

    let Some(preceding) = begin_index_in(&text, insertion, pair, None, PairScanOptions::new(escape))
    else {
        return 0;
    };

    let desired = indent_level_in(&text, preceding, indent_width);
    let current = indent_level_in(&text, insertion, indent_width);

    current.saturating_sub(desired)
}

/// Returns `true` if `token` ends right at `location`.
///
/// A token starting with a letter must not continue an identifier.
pub(crate) fn matches_before(
    text: &Utf16Text,
    token: &str,
    location: usize,
    ignore_case: bool,
) -> bool {
    if location == 0 || token.is_empty() {
        return false;
    }

    let prefix = &text.as_str()[..text.byte_offset(location)];
    let count = token.chars().count();
    let Some((start, _)) = prefix.char_indices().rev().nth(count - 1) else {
        return false;
    };

    if !same_token(&prefix[start..], token, ignore_case) {
        return false;
    }

    let starts_with_letter = token.chars().next().is_some_and(char::is_alphabetic);
    !starts_with_letter || !prefix[..start].chars().next_back().is_some_and(is_word_char)
}

/// Returns `true` if `token` starts right at `location`.
///
/// A token ending with a letter must not be followed by an identifier character.
pub(crate) fn matches_after(
    text: &Utf16Text,
    token: &str,
    location: usize,
    ignore_case: bool,
) -> bool {
    if location >= text.len() || token.is_empty() {
        return false;
    }

    let suffix = &text.as_str()[text.byte_offset(location)..];
    let count = token.chars().count();
    let end = suffix
        .char_indices()
        .nth(count)
        .map_or(suffix.len(), |(idx, _)| idx);
    if suffix[..end].chars().count() < count || !same_token(&suffix[..end], token, ignore_case) {
        return false;
    }

    let ends_with_letter = token.chars().next_back().is_some_and(char::is_alphabetic);
    !ends_with_letter || !suffix[end..].chars().next().is_some_and(is_word_char)
}

fn same_token(candidate: &str, token: &str, ignore_case: bool) -> bool {
    if ignore_case {
        candidate.to_lowercase() == token.to_lowercase()
    } else {
        candidate == token
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_punctuation(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_token_before() {
        assert!(matches_before(&Utf16Text::new("then\n"), "then", 4, false));
        assert!(!matches_before(&Utf16Text::new("thens\n"), "then", 5, false));
        assert!(!matches_before(&Utf16Text::new("xthen\n"), "then", 5, false));
        assert!(matches_before(&Utf16Text::new("{"), "{", 1, false));
        assert!(!matches_before(&Utf16Text::new("{"), "{", 0, false));
    }

    #[test]
    fn test_matches_token_after() {
        assert!(matches_after(&Utf16Text::new("then"), "then", 0, false));
        assert!(!matches_after(&Utf16Text::new("thens"), "then", 0, false));
        assert!(matches_after(&Utf16Text::new("}"), "}", 0, false));
        assert!(!matches_after(&Utf16Text::new("}"), "}", 1, false));
        assert!(!matches_after(&Utf16Text::new("en"), "end", 0, false));
    }

    #[test]
    fn test_matches_token_ignore_case() {
        assert!(matches_before(&Utf16Text::new("THEN\n"), "then", 4, true));
        assert!(matches_after(&Utf16Text::new("End"), "end", 0, true));
        assert!(!matches_before(&Utf16Text::new("THEN\n"), "then", 4, false));
    }
}
