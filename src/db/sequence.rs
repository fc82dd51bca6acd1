// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Order-preserving row storage with stable references.
//!
//! A [`Sequence`] behaves like an ordered list whose elements are addressed by
//! a [`SeqRef`] that survives insertions, deletions and reordering of other
//! rows. References are never reused, so a reference to a removed row stays
//! detectably dead forever.
//!
//! The [`SequenceHandle`] trait is the read-only surface the view-model stores
//! consume. It is implemented here for [`Sequence`] and, through the lock, by
//! each store's row source.

use indexmap::IndexMap;

/// An opaque, stable reference to one row of a [`Sequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeqRef(u64);

impl SeqRef {
    /// The raw identifier, useful for logging.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Read access to an ordered collection, as required by the list stores.
///
/// All lookups are position-independent: positions are always answered from
/// the live collection, never from a cache.
pub trait SequenceHandle {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self) -> Option<SeqRef>;

    fn at(&self, position: usize) -> Option<SeqRef>;

    fn next(&self, row: SeqRef) -> Option<SeqRef>;

    fn prev(&self, row: SeqRef) -> Option<SeqRef>;

    /// The current position of `row`, or `None` if the row has been removed.
    fn position_of(&self, row: SeqRef) -> Option<usize>;

    /// Whether `row` no longer refers to a live element.
    fn is_end(&self, row: SeqRef) -> bool;
}

#[derive(Debug, Clone)]
pub struct Sequence<T> {
    items: IndexMap<SeqRef, T>,
    next_id: u64,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, row: SeqRef) -> Option<&T> {
        self.items.get(&row)
    }

    pub fn get_mut(&mut self, row: SeqRef) -> Option<&mut T> {
        self.items.get_mut(&row)
    }

    /// The reference and value stored at `position`.
    pub fn get_index(&self, position: usize) -> Option<(SeqRef, &T)> {
        self.items.get_index(position).map(|(row, value)| (*row, value))
    }

    /// Inserts `value` at `position`, clamped to the current length.
    pub fn insert(&mut self, position: usize, value: T) -> SeqRef {
        let row = self.allocate();
        let position = position.min(self.items.len());
        self.items.shift_insert(position, row, value);
        row
    }

    pub fn push(&mut self, value: T) -> SeqRef {
        let row = self.allocate();
        self.items.insert(row, value);
        row
    }

    /// Removes `row`, returning the position it occupied and its value.
    pub fn remove(&mut self, row: SeqRef) -> Option<(usize, T)> {
        self.items
            .shift_remove_full(&row)
            .map(|(position, _, value)| (position, value))
    }

    /// Reorders the rows so that the row previously at `new_order[i]` ends up
    /// at position `i`.
    ///
    /// Returns `false` and leaves the sequence untouched if `new_order` is not
    /// a permutation of `0..len`.
    pub fn reorder(&mut self, new_order: &[usize]) -> bool {
        if !is_permutation(new_order, self.items.len()) {
            return false;
        }

        let mut slots: Vec<Option<(SeqRef, T)>> =
            std::mem::take(&mut self.items).into_iter().map(Some).collect();

        for &old_position in new_order {
            if let Some((row, value)) = slots[old_position].take() {
                self.items.insert(row, value);
            }
        }

        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (SeqRef, &T)> {
        self.items.iter().map(|(row, value)| (*row, value))
    }

    fn allocate(&mut self) -> SeqRef {
        let row = SeqRef(self.next_id);
        self.next_id += 1;
        row
    }
}

impl<T> SequenceHandle for Sequence<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn begin(&self) -> Option<SeqRef> {
        self.at(0)
    }

    fn at(&self, position: usize) -> Option<SeqRef> {
        self.items.get_index(position).map(|(row, _)| *row)
    }

    fn next(&self, row: SeqRef) -> Option<SeqRef> {
        let position = self.items.get_index_of(&row)?;
        self.at(position + 1)
    }

    fn prev(&self, row: SeqRef) -> Option<SeqRef> {
        let position = self.items.get_index_of(&row)?;
        position.checked_sub(1).and_then(|p| self.at(p))
    }

    fn position_of(&self, row: SeqRef) -> Option<usize> {
        self.items.get_index_of(&row)
    }

    fn is_end(&self, row: SeqRef) -> bool {
        !self.items.contains_key(&row)
    }
}

/// Checks that `order` contains every index in `0..len` exactly once.
pub(crate) fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }

    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(seq: &Sequence<&'static str>) -> Vec<&'static str> {
        seq.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn references_survive_insertions_before_them() {
        let mut seq = Sequence::new();
        let b = seq.push("b");
        let c = seq.push("c");
        let a = seq.insert(0, "a");

        assert_eq!(letters(&seq), vec!["a", "b", "c"]);
        assert_eq!(seq.position_of(a), Some(0));
        assert_eq!(seq.position_of(b), Some(1));
        assert_eq!(seq.position_of(c), Some(2));
    }

    #[test]
    fn removed_reference_is_end_and_never_reused() {
        let mut seq = Sequence::new();
        let a = seq.push("a");
        let b = seq.push("b");

        assert_eq!(seq.remove(a), Some((0, "a")));
        assert!(seq.is_end(a));
        assert_eq!(seq.position_of(a), None);
        assert_eq!(seq.next(a), None);

        let c = seq.push("c");
        assert_ne!(c, a);
        assert_eq!(seq.position_of(b), Some(0));
    }

    #[test]
    fn next_and_prev_stop_at_the_edges() {
        let mut seq = Sequence::new();
        let a = seq.push("a");
        let b = seq.push("b");

        assert_eq!(seq.begin(), Some(a));
        assert_eq!(seq.next(a), Some(b));
        assert_eq!(seq.next(b), None);
        assert_eq!(seq.prev(b), Some(a));
        assert_eq!(seq.prev(a), None);
    }

    #[test]
    fn insert_clamps_past_the_end() {
        let mut seq = Sequence::new();
        seq.push("a");
        let z = seq.insert(42, "z");
        assert_eq!(seq.position_of(z), Some(1));
    }

    #[test]
    fn reorder_applies_new_order_and_keeps_references() {
        let mut seq = Sequence::new();
        let a = seq.push("a");
        let b = seq.push("b");
        let c = seq.push("c");

        assert!(seq.reorder(&[2, 0, 1]));
        assert_eq!(letters(&seq), vec!["c", "a", "b"]);
        assert_eq!(seq.position_of(c), Some(0));
        assert_eq!(seq.position_of(a), Some(1));
        assert_eq!(seq.position_of(b), Some(2));
    }

    #[test]
    fn reorder_rejects_non_permutations() {
        let mut seq = Sequence::new();
        seq.push("a");
        seq.push("b");

        assert!(!seq.reorder(&[0, 0]));
        assert!(!seq.reorder(&[0]));
        assert!(!seq.reorder(&[0, 2]));
        assert_eq!(letters(&seq), vec!["a", "b"]);
    }
}
