use std::collections::HashSet;
use std::hash::Hash;

use crate::range::TextRange;

/// Sort ranges and merge the ones that overlap or touch.
pub(crate) fn merged(ranges: impl IntoIterator<Item = TextRange>) -> Vec<TextRange> {
    let mut ranges: Vec<TextRange> = ranges.into_iter().collect();
    ranges.sort();

    let mut out: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match out.last_mut() {
            Some(last) if range.lower_bound() <= last.upper_bound() => {
                *last = last.union(range);
            }
            _ => out.push(range),
        }
    }
    out
}

/// Drop repeated values, keeping the first occurrence and the original order.
pub(crate) fn uniqued<T: Clone + Eq + Hash>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Deduplicate and sort a selection set by position.
pub(crate) fn normalize_selections(mut selections: Vec<TextRange>) -> Vec<TextRange> {
    selections.sort();
    selections.dedup();
    selections
}
