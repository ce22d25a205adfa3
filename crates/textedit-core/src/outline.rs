//! Outline items and depth normalization.
//!
//! Outline extraction (regex or tree-sitter captures) happens outside this crate. It produces a
//! flat list of [`OutlineItem`]s with raw depths, e.g. the number of enclosing syntax nodes or a
//! heading level. [`normalized_levels`] compacts those raw depths into a 0-based hierarchy with
//! no skipped levels.

use std::collections::HashSet;

use crate::range::TextRange;

/// Title used for separator items.
pub const SEPARATOR_TITLE: &str = "-";

/// Kind of an outline item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlineKind {
    /// A type-like container (class, struct, module).
    Container,
    /// A function or method.
    Function,
    /// A value (constant, variable, property).
    Value,
    /// A document heading.
    Heading,
    /// A `MARK:`-style comment.
    Mark,
    /// A reference to another location.
    Reference,
    /// A divider.
    Separator,
}

/// Indentation of an outline item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutlineIndent {
    /// A nesting depth.
    Level(usize),
    /// A literal prefix; the item takes no part in the hierarchy.
    Literal(String),
}

impl OutlineIndent {
    /// The nesting depth, if any.
    pub fn level(&self) -> Option<usize> {
        match self {
            Self::Level(level) => Some(*level),
            Self::Literal(_) => None,
        }
    }
}

impl Default for OutlineIndent {
    fn default() -> Self {
        Self::Level(0)
    }
}

/// An entry of a document outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutlineItem {
    /// Display title.
    pub title: String,
    /// Range of the item in the document (UTF-16).
    pub range: TextRange,
    /// Kind of the item.
    pub kind: Option<OutlineKind>,
    /// Indentation.
    pub indent: OutlineIndent,
}

impl OutlineItem {
    /// Create an item without a kind.
    pub fn new(title: impl Into<String>, range: TextRange, indent: OutlineIndent) -> Self {
        Self {
            title: title.into(),
            range,
            kind: None,
            indent,
        }
    }

    /// Set the kind.
    pub fn with_kind(mut self, kind: OutlineKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// A separator item.
    pub fn separator(range: TextRange, indent: OutlineIndent) -> Self {
        Self::new(SEPARATOR_TITLE, range, indent).with_kind(OutlineKind::Separator)
    }

    /// Returns `true` for separator items.
    pub fn is_separator(&self) -> bool {
        self.kind == Some(OutlineKind::Separator)
    }
}

/// How raw depths are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalization {
    /// Kinds treated as section markers. Markers never change the active nesting.
    pub section_marker_kinds: HashSet<OutlineKind>,
    /// Pull a marker's depth up to the surrounding context.
    pub adjust_section_marker_depth: bool,
    /// Put every leveled item at level 0.
    pub flatten_levels: bool,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            section_marker_kinds: HashSet::from([OutlineKind::Separator]),
            adjust_section_marker_depth: false,
            flatten_levels: false,
        }
    }
}

impl Normalization {
    /// Returns `true` if `kind` is configured as a section marker.
    pub fn is_section_marker(&self, kind: Option<OutlineKind>) -> bool {
        kind.is_some_and(|kind| self.section_marker_kinds.contains(&kind))
    }
}

/// Per-syntax outline settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlinePolicy {
    /// Depth normalization.
    pub normalization: Normalization,
    /// Ancestor node types that do not add depth.
    pub ignored_depth_node_types: HashSet<String>,
}

impl OutlinePolicy {
    /// Raw depth of a capture.
    ///
    /// `components` are the dot-separated parts of the capture name (e.g. `outline.heading.h2`);
    /// heading captures use their heading level. Otherwise the depth is the number of
    /// `node_types` (the capture node and its ancestors) not listed as ignored.
    pub fn depth(&self, components: &[&str], node_types: &[&str]) -> usize {
        if components.len() > 2 && components[1] == "heading" {
            return heading_level(components[2]);
        }

        node_types
            .iter()
            .filter(|node_type| !self.ignored_depth_node_types.contains(**node_type))
            .count()
    }

    /// Normalize item levels with this policy.
    pub fn normalize(&self, items: &[OutlineItem]) -> Vec<OutlineItem> {
        normalized_levels(items, &self.normalization)
    }
}

fn heading_level(component: &str) -> usize {
    match component {
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        "h6" => 6,
        _ => 1,
    }
}

/// Normalize raw depths to a stepwise hierarchy without skipped levels.
///
/// Items with a literal indent pass through untouched. Runs in `O(n)`.
pub fn normalized_levels(items: &[OutlineItem], policy: &Normalization) -> Vec<OutlineItem> {
    if policy.flatten_levels {
        return items
            .iter()
            .map(|item| match item.indent {
                OutlineIndent::Level(_) => OutlineItem {
                    indent: OutlineIndent::Level(0),
                    ..item.clone()
                },
                OutlineIndent::Literal(_) => item.clone(),
            })
            .collect();
    }

    // depth of the next item that is not a marker, for each position
    let mut next_depths: Vec<Option<usize>> = vec![None; items.len()];
    if policy.adjust_section_marker_depth {
        let mut nearest = None;
        for (index, item) in items.iter().enumerate().rev() {
            next_depths[index] = nearest;
            if !policy.is_section_marker(item.kind) {
                nearest = item.indent.level();
            }
        }
    }

    let mut stack: Vec<usize> = Vec::new();
    let mut normalized = Vec::with_capacity(items.len());

    for (item, next_depth) in items.iter().zip(next_depths) {
        let Some(depth) = item.indent.level() else {
            normalized.push(item.clone());
            continue;
        };

        let is_marker = policy.is_section_marker(item.kind);
        let effective_depth = if is_marker && policy.adjust_section_marker_depth {
            stack
                .last()
                .copied()
                .unwrap_or(depth)
                .max(depth)
                .max(next_depth.unwrap_or(depth))
        } else {
            depth
        };

        let level = if is_marker {
            let mut scratch = stack.clone();
            normalize_depth(effective_depth, &mut scratch)
        } else {
            normalize_depth(effective_depth, &mut stack)
        };

        normalized.push(OutlineItem {
            indent: OutlineIndent::Level(level),
            ..item.clone()
        });
    }

    normalized
}

fn normalize_depth(depth: usize, stack: &mut Vec<usize>) -> usize {
    match stack.last().copied() {
        None => stack.push(depth),
        Some(last) if depth > last => stack.push(depth),
        Some(last) if depth < last => {
            while stack.last().is_some_and(|top| *top > depth) {
                stack.pop();
            }
            match stack.last_mut() {
                Some(top) => *top = depth,
                None => stack.push(depth),
            }
        }
        Some(_) => {}
    }

    stack.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_depth_replaces_top() {
        let mut stack = vec![1, 2, 5];
        assert_eq!(normalize_depth(3, &mut stack), 1);
        assert_eq!(stack, vec![1, 3]);
        assert_eq!(normalize_depth(3, &mut stack), 1);
        assert_eq!(stack, vec![1, 3]);
        assert_eq!(normalize_depth(2, &mut stack), 0);
        assert_eq!(stack, vec![2]);
        assert_eq!(normalize_depth(6, &mut stack), 1);
        assert_eq!(stack, vec![2, 6]);
        assert_eq!(normalize_depth(0, &mut stack), 0);
        assert_eq!(stack, vec![0]);
    }

    #[test]
    fn test_heading_depth() {
        let policy = OutlinePolicy {
            ignored_depth_node_types: HashSet::from(["block".to_string()]),
            ..Default::default()
        };

        assert_eq!(policy.depth(&["outline", "heading", "h3"], &["a", "b"]), 3);
        assert_eq!(policy.depth(&["outline", "heading", "title"], &[]), 1);
        assert_eq!(policy.depth(&["outline", "function"], &["fn", "block", "impl"]), 2);
    }
}
