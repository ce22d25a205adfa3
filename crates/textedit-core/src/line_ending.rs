//! Line ending helpers.
//!
//! Texts handed to `textedit-core` are never normalized: every terminator kind can appear, even
//! mixed in one document. [`LineEnding`] names them and is used as configuration where a
//! terminator has to be produced (e.g. duplicating a last line that has none).

use crate::text::is_newline;

/// A line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Classic Mac OS CR (`'\r'`).
    Cr,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
    /// Next line, U+0085.
    Nel,
    /// Line separator, U+2028.
    LineSeparator,
    /// Paragraph separator, U+2029.
    ParagraphSeparator,
}

impl LineEnding {
    /// The terminator string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::Crlf => "\r\n",
            Self::Nel => "\u{85}",
            Self::LineSeparator => "\u{2028}",
            Self::ParagraphSeparator => "\u{2029}",
        }
    }

    /// Length in UTF-16 code units.
    pub fn len_utf16(self) -> usize {
        match self {
            Self::Crlf => 2,
            _ => 1,
        }
    }

    /// The single-character terminator `ch`, if it is one.
    ///
    /// `'\r'` maps to [`LineEnding::Cr`]; callers that need CRLF detection look at the
    /// surrounding text.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '\n' => Some(Self::Lf),
            '\r' => Some(Self::Cr),
            '\u{85}' => Some(Self::Nel),
            '\u{2028}' => Some(Self::LineSeparator),
            '\u{2029}' => Some(Self::ParagraphSeparator),
            _ => None,
        }
    }

    /// Parse a full terminator string.
    pub fn from_terminator(s: &str) -> Option<Self> {
        if s == "\r\n" {
            return Some(Self::Crlf);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::from_char(ch),
            _ => None,
        }
    }

    /// Detect the first line ending used in `text`.
    ///
    /// Returns `None` if the text has no line break.
    pub fn detect_in_text(text: &str) -> Option<Self> {
        let (idx, ch) = text.char_indices().find(|(_, ch)| is_newline(*ch))?;
        if ch == '\r' && text[idx + 1..].starts_with('\n') {
            return Some(Self::Crlf);
        }
        Self::from_char(ch)
    }
}
