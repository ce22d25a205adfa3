#![warn(missing_docs)]
//! `textedit-core-lang` - data-driven language configuration for `textedit-core`.
//!
//! This crate intentionally stays lightweight and has no dependencies. It provides the small
//! value types a host passes into the editing engine to describe the current language:
//! comment delimiters, the indentation unit, and how delimiters are escaped.

/// An ordered begin/end pair.
///
/// Used for block comment delimiters (`Pair<String>`) and brace pairs (`Pair<char>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pair<T> {
    /// The opening element.
    pub begin: T,
    /// The closing element.
    pub end: T,
}

impl<T> Pair<T> {
    /// Create a new pair.
    pub const fn new(begin: T, end: T) -> Self {
        Self { begin, end }
    }
}

impl<T: PartialEq> Pair<T> {
    /// Returns `true` if `begin` and `end` are the same element (e.g. a quote pair).
    pub fn is_symmetric(&self) -> bool {
        self.begin == self.end
    }
}

/// Comment delimiters for a given language.
///
/// The first entry of `blocks` is the authoritative pair for commenting out; all entries are
/// tried in order when uncommenting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentDelimiters {
    /// Inline (line-prefix) delimiter, e.g. `//` or `#`.
    pub inline: Option<String>,
    /// Block delimiter pairs, e.g. `/*` `*/`.
    pub blocks: Vec<Pair<String>>,
}

impl CommentDelimiters {
    /// Delimiters with only an inline token.
    pub fn inline(token: impl Into<String>) -> Self {
        Self {
            inline: Some(token.into()),
            blocks: Vec::new(),
        }
    }

    /// Delimiters with only a block pair.
    pub fn block(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            inline: None,
            blocks: vec![Pair::new(begin.into(), end.into())],
        }
    }

    /// Delimiters with both an inline token and a block pair.
    pub fn inline_and_block(
        inline: impl Into<String>,
        begin: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            inline: Some(inline.into()),
            blocks: vec![Pair::new(begin.into(), end.into())],
        }
    }

    /// Append another block pair (lower priority than the existing ones).
    pub fn with_block(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.blocks.push(Pair::new(begin.into(), end.into()));
        self
    }

    /// The inline delimiter, if configured and non-empty.
    pub fn inline_delimiter(&self) -> Option<&str> {
        self.inline.as_deref().filter(|token| !token.is_empty())
    }

    /// The authoritative block pair (the first non-empty one).
    pub fn block_delimiters(&self) -> Option<&Pair<String>> {
        self.block_pairs().next()
    }

    /// All usable block pairs in priority order.
    pub fn block_pairs(&self) -> impl Iterator<Item = &Pair<String>> {
        self.blocks
            .iter()
            .filter(|pair| !pair.begin.is_empty() && !pair.end.is_empty())
    }

    /// Returns `true` if neither inline nor block delimiters are usable.
    pub fn is_empty(&self) -> bool {
        self.inline_delimiter().is_none() && self.block_delimiters().is_none()
    }
}

/// How delimiter characters are escaped inside strings and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DelimiterEscapeRule {
    /// A delimiter preceded by an odd number of backslashes is escaped.
    #[default]
    Backslash,
    /// Two consecutive identical delimiters form one escaped literal.
    DoubleDelimiter,
    /// No escaping; every occurrence counts.
    None,
}

/// The literal unit inserted or removed by indentation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndentStyle {
    /// One tab character per level.
    Tab,
    /// `width` spaces per level.
    #[default]
    Space,
}

impl IndentStyle {
    /// The string for one indent level.
    ///
    /// `width` is only used for [`IndentStyle::Space`].
    pub fn unit(self, width: usize) -> String {
        match self {
            Self::Tab => "\t".to_string(),
            Self::Space => " ".repeat(width),
        }
    }
}
