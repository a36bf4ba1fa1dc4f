//! Generic row (label → value) operations.
//!
//! Rows are the common substrate of record/variant types and of evaluated
//! record values. A `BTreeMap` keeps enumeration sorted by label.

use std::collections::BTreeMap;

/// A mapping from field labels to values, enumerated in label order.
pub type Row<A> = BTreeMap<String, A>;

/// Build a row from label/value pairs. Later pairs win on duplicate labels.
pub fn row_of<A>(pairs: impl IntoIterator<Item = (impl Into<String>, A)>) -> Row<A> {
    pairs.into_iter().map(|(l, a)| (l.into(), a)).collect()
}

/// Map a function over every value of a row, keeping labels.
pub fn row_map<A, B>(row: &Row<A>, mut f: impl FnMut(&A) -> B) -> Row<B> {
    row.iter().map(|(l, a)| (l.clone(), f(a))).collect()
}

/// The fields of `left` whose labels do not appear in `right`.
pub fn row_difference<A: Clone, B>(left: &Row<A>, right: &Row<B>) -> Row<A> {
    left.iter()
        .filter(|(l, _)| !right.contains_key(*l))
        .map(|(l, a)| (l.clone(), a.clone()))
        .collect()
}

/// Combine the values of labels common to both rows.
pub fn row_intersect_with<A, B>(
    mut f: impl FnMut(&A, &A) -> B,
    left: &Row<A>,
    right: &Row<A>,
) -> Row<B> {
    left.iter()
        .filter_map(|(l, a)| right.get(l).map(|b| (l.clone(), f(a, b))))
        .collect()
}
