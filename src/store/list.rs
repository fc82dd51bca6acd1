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

use crate::{
    db::sequence::{SeqRef, SequenceHandle},
    store::{
        Column, ColumnType, ModelEvent, Signal, Slot, SubscriptionId, TreeIter, TreeModel, Value,
        new_stamp,
    },
};

/// A backend sequence a [`ListStore`] can present.
pub trait RowSource: SequenceHandle {
    type Column: Column;

    /// The value of `column` for `row`, or `None` if the row is gone.
    fn value(&self, row: SeqRef, column: Self::Column) -> Option<Value>;
}

/// A flat list over one backend sequence.
pub struct ListStore<S> {
    stamp: u32,
    source: S,
    signal: Signal,
}

impl<S: RowSource> ListStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            stamp: new_stamp(),
            source,
            signal: Signal::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// A handle to `row` stamped by this store.
    pub fn iter_of(&self, row: SeqRef) -> TreeIter {
        TreeIter::new(self.stamp, Slot::Concrete(row))
    }

    /// The backend row behind `iter`, if the handle belongs to this store.
    fn resolve(&self, iter: &TreeIter) -> Option<SeqRef> {
        if iter.stamp() != self.stamp {
            return None;
        }
        iter.row()
    }

    pub(crate) fn emit(&self, event: &ModelEvent) {
        self.signal.emit(event);
    }
}

impl<S: RowSource> TreeModel for ListStore<S> {
    fn stamp(&self) -> u32 {
        self.stamp
    }

    fn n_columns(&self) -> usize {
        S::Column::ALL.len()
    }

    fn column_type(&self, column: usize) -> Option<ColumnType> {
        S::Column::from_index(column).map(Column::column_type)
    }

    fn len(&self) -> usize {
        self.source.len()
    }

    fn iterator_at(&self, position: usize) -> Option<TreeIter> {
        self.source.at(position).map(|row| self.iter_of(row))
    }

    fn path_of(&self, iter: &TreeIter) -> Option<usize> {
        let row = self.resolve(iter)?;
        if self.source.is_end(row) {
            return None;
        }
        self.source.position_of(row)
    }

    fn value_at(&self, iter: &TreeIter, column: usize) -> Option<Value> {
        let column = S::Column::from_index(column)?;
        let value = self
            .resolve(iter)
            .and_then(|row| self.source.value(row, column));
        Some(value.unwrap_or_else(|| Value::zero(column.column_type())))
    }

    fn next(&self, iter: &TreeIter) -> Option<TreeIter> {
        let row = self.resolve(iter)?;
        self.source.next(row).map(|row| self.iter_of(row))
    }

    fn prev(&self, iter: &TreeIter) -> Option<TreeIter> {
        let row = self.resolve(iter)?;
        self.source.prev(row).map(|row| self.iter_of(row))
    }

    fn subscribe(&self, handler: Box<dyn FnMut(&ModelEvent)>) -> SubscriptionId {
        self.signal.connect(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.signal.disconnect(id);
    }

    fn refresh(&self) {
        self.signal.emit(&ModelEvent::Refresh);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{db::sequence::Sequence, store::ModelFlags};

    #[derive(Clone, Copy, PartialEq)]
    enum Letter {
        Text,
    }

    impl Column for Letter {
        const ALL: &'static [Self] = &[Letter::Text];

        fn column_type(self) -> ColumnType {
            ColumnType::Text
        }
    }

    struct Letters(Rc<RefCell<Sequence<&'static str>>>);

    impl SequenceHandle for Letters {
        fn len(&self) -> usize {
            self.0.borrow().len()
        }
        fn begin(&self) -> Option<SeqRef> {
            self.0.borrow().begin()
        }
        fn at(&self, position: usize) -> Option<SeqRef> {
            self.0.borrow().at(position)
        }
        fn next(&self, row: SeqRef) -> Option<SeqRef> {
            self.0.borrow().next(row)
        }
        fn prev(&self, row: SeqRef) -> Option<SeqRef> {
            self.0.borrow().prev(row)
        }
        fn position_of(&self, row: SeqRef) -> Option<usize> {
            self.0.borrow().position_of(row)
        }
        fn is_end(&self, row: SeqRef) -> bool {
            self.0.borrow().is_end(row)
        }
    }

    impl RowSource for Letters {
        type Column = Letter;

        fn value(&self, row: SeqRef, _column: Letter) -> Option<Value> {
            self.0.borrow().get(row).map(|s| Value::Text(s.to_string()))
        }
    }

    fn store(items: &[&'static str]) -> (ListStore<Letters>, Rc<RefCell<Sequence<&'static str>>>) {
        let seq = Rc::new(RefCell::new(Sequence::new()));
        for item in items {
            seq.borrow_mut().push(*item);
        }
        (ListStore::new(Letters(seq.clone())), seq)
    }

    fn text(store: &ListStore<Letters>, iter: &TreeIter) -> String {
        store.value_at(iter, 0).unwrap().to_string()
    }

    #[test]
    fn out_of_range_positions_yield_nothing() {
        let (store, _) = store(&["a"]);
        assert!(store.iterator_at(1).is_none());
        assert!(store.value_at(&store.iterator_at(0).unwrap(), 1).is_none());
    }

    #[test]
    fn handles_from_another_store_are_stale() {
        let (a, _) = store(&["a"]);
        let (b, _) = store(&["b"]);
        let foreign = b.iterator_at(0).unwrap();

        assert_ne!(a.stamp(), b.stamp());
        assert_eq!(a.path_of(&foreign), None);
        assert_eq!(a.next(&foreign), None);
        assert_eq!(text(&a, &foreign), "");
    }

    #[test]
    fn path_follows_reordering() {
        let (store, seq) = store(&["a", "b", "c"]);
        let c = store.iterator_at(2).unwrap();

        seq.borrow_mut().reorder(&[2, 0, 1]);

        assert_eq!(store.path_of(&c), Some(0));
        assert_eq!(text(&store, &c), "c");
    }

    #[test]
    fn deleted_rows_read_as_empty() {
        let (store, seq) = store(&["a", "b"]);
        let a = store.iterator_at(0).unwrap();
        let row = a.row().unwrap();

        seq.borrow_mut().remove(row);

        assert_eq!(store.path_of(&a), None);
        assert_eq!(store.value_at(&a, 0), Some(Value::Text(String::new())));
    }

    #[test]
    fn stepping_past_the_edges_invalidates() {
        let (store, _) = store(&["a", "b"]);
        let mut iter = store.children_of(None).unwrap();

        assert!(!store.iter_prev(&mut iter));
        assert_eq!(iter.stamp(), 0);

        let mut iter = store.iterator_at(0).unwrap();
        assert!(store.iter_next(&mut iter));
        assert_eq!(text(&store, &iter), "b");
        assert!(!store.iter_next(&mut iter));
        assert_eq!(store.path_of(&iter), None);
    }

    #[test]
    fn flat_list_protocol() {
        let (store, _) = store(&["a", "b"]);
        let first = store.iterator_at(0).unwrap();

        assert_eq!(store.child_count(None), 2);
        assert_eq!(store.child_count(Some(&first)), 0);
        assert!(!store.has_child(&first));
        assert_eq!(store.parent(&first), None);
        assert_eq!(store.nth_child(None, 1), store.iterator_at(1));
        assert_eq!(store.nth_child(Some(&first), 0), None);
        assert!(store.flags().contains(ModelFlags::LIST_ONLY | ModelFlags::ITERS_PERSIST));
    }

    #[test]
    fn empty_store_has_no_children() {
        let (store, _) = store(&[]);
        assert_eq!(store.children_of(None), None);
    }

    #[test]
    fn refresh_reaches_subscribers() {
        let (store, _) = store(&[]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let id = store.subscribe(Box::new(move |e: &ModelEvent| log.borrow_mut().push(e.clone())));

        store.refresh();
        store.unsubscribe(id);
        store.refresh();

        assert_eq!(*seen.borrow(), vec![ModelEvent::Refresh]);
    }
}
