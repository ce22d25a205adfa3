#![warn(missing_docs)]
//! Textedit Core - Headless Text-Editing Transformation Engine
//!
//! # Overview
//!
//! `textedit-core` computes the edits behind an editor's text commands: indent and outdent,
//! comment toggling, line moves and reordering, auto-indent on newline, brace matching. It never
//! owns or mutates a buffer. Every operation takes an immutable text snapshot plus the current
//! selections and returns an [`EditingContext`]: the replacements to apply, in original-text
//! coordinates, and the selections to install once they are applied.
//!
//! # Core Features
//!
//! - **UTF-16 addressing**: offsets and ranges match the host's native text storage
//! - **Multi-selection**: every operation handles any number of carets and selections at once
//! - **Grapheme safety**: ranges never split a surrogate pair or an extended grapheme cluster
//! - **All line endings**: `\n`, `\r`, `\r\n`, U+0085, U+2028 and U+2029, even mixed
//! - **"No edit" is not an error**: operations return `Option`, `None` means nothing to do
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Engines (indentation, commenting, lines,   │  ← Public API
//! │  smart indent, brace pairs, outline)        │
//! ├─────────────────────────────────────────────┤
//! │  EditingContext                             │  ← Edit Description
//! ├─────────────────────────────────────────────┤
//! │  TextRange + InsertionItem arithmetic       │  ← Range Algebra
//! ├─────────────────────────────────────────────┤
//! │  Utf16Text (Rope-backed snapshot)           │  ← Offsets & Lines
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use textedit_core::{IndentStyle, TextRange, indentation};
//!
//! let text = "foo\nbar";
//! let context = indentation::indent(text, IndentStyle::Space, 2, &[TextRange::new(0, 3)]);
//!
//! assert_eq!(context.apply(text), "  foo\nbar");
//! assert_eq!(context.selected_ranges, Some(vec![TextRange::new(2, 3)]));
//! ```
//!
//! ```rust
//! use textedit_core::{CommentDelimiters, CommentOutLocation, CommentTypes, TextRange, commenting};
//!
//! let text = "x = 1";
//! let delimiters = CommentDelimiters::block("/*", "*/");
//! let context = commenting::comment_out(
//!     text,
//!     CommentTypes::BLOCK,
//!     &delimiters,
//!     " ",
//!     CommentOutLocation::Selection,
//!     4,
//!     &[TextRange::new(0, 5)],
//! )
//! .unwrap();
//!
//! assert_eq!(context.apply(text), "/* x = 1 */");
//! ```
//!
//! # Module Description
//!
//! - [`range`] - `TextRange` and insertion/deletion arithmetic
//! - [`text`] - `Utf16Text` snapshot: offsets, lines, graphemes, columns
//! - [`editing`] - `EditingContext`, the universal result type
//! - [`indentation`] - indent/outdent, style detection and conversion, soft tabs
//! - [`commenting`] - comment out, uncomment, uncomment detection
//! - [`line_processing`] - move, duplicate, delete, join, sort, trim
//! - [`smart_indent`] - auto-indent on newline, outdent on closing brace
//! - [`brace_pair`] - brace/quote matching with escape rules
//! - [`outline`] - outline depth normalization
//! - [`incompatible`] - cancellable scan for characters an encoding cannot represent
//!
//! # Threading
//!
//! Engine operations are synchronous and pure; call them from any thread. Only
//! [`incompatible::incompatible_characters`] is meant for a background task and honors a
//! [`CancellationToken`].

pub mod brace_pair;
pub mod cancel;
pub mod commenting;
pub mod editing;
pub mod incompatible;
pub mod indentation;
pub mod line_ending;
pub mod line_processing;
pub mod outline;
pub mod range;
mod selection_set;
pub mod smart_indent;
pub mod text;

pub use brace_pair::{BRACES, BracePair, LT_GT, PairIndex, PairScanOptions, QUOTES};
pub use cancel::{CancellationToken, Cancelled};
pub use commenting::{CommentOutLocation, CommentTypes};
pub use editing::EditingContext;
pub use incompatible::IncompatibleCharacter;
pub use line_ending::LineEnding;
pub use outline::{
    Normalization, OutlineIndent, OutlineItem, OutlineKind, OutlinePolicy, normalized_levels,
};
pub use range::{InsertionItem, TextRange};
pub use smart_indent::IndentToken;
pub use text::Utf16Text;
pub use textedit_core_lang::{CommentDelimiters, DelimiterEscapeRule, IndentStyle, Pair};
