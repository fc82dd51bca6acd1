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

//! Grouped property stores.
//!
//! A property store lists the distinct values of one [`PropKind`] across a
//! query result, each with its member count, preceded by a synthetic "All"
//! row at position 0. The synthetic row has no backend entry; positions
//! `1..=N` map to backend entries `0..N`.

use std::sync::Arc;

use crate::{
    db::{query::PropertySource, sequence::SeqRef},
    model::PropKind,
    projection::{ALL_LABEL, property_label},
    store::{
        Column, ColumnType, ModelEvent, Signal, Slot, SubscriptionId, TreeIter, TreeModel, Value,
        new_stamp,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropColumn {
    Name,
    Count,
    /// True only on the synthetic row.
    Flag,
}

impl Column for PropColumn {
    const ALL: &'static [Self] = &[PropColumn::Name, PropColumn::Count, PropColumn::Flag];

    fn column_type(self) -> ColumnType {
        match self {
            PropColumn::Name => ColumnType::Text,
            PropColumn::Count => ColumnType::Int,
            PropColumn::Flag => ColumnType::Bool,
        }
    }
}

pub struct PropertyStore<P> {
    stamp: u32,
    base: Arc<P>,
    kind: PropKind,
    signal: Signal,
}

impl<P: PropertySource> PropertyStore<P> {
    pub fn new(base: Arc<P>, kind: PropKind) -> Self {
        Self {
            stamp: new_stamp(),
            base,
            kind,
            signal: Signal::default(),
        }
    }

    pub fn base(&self) -> &Arc<P> {
        &self.base
    }

    pub fn kind(&self) -> PropKind {
        self.kind
    }

    pub fn iter_of(&self, row: SeqRef) -> TreeIter {
        TreeIter::new(self.stamp, Slot::Concrete(row))
    }

    pub fn synthetic_iter(&self) -> TreeIter {
        TreeIter::new(self.stamp, Slot::Synthetic)
    }

    /// The property value behind `iter`, or `None` for the synthetic row and
    /// dead handles.
    pub fn name_of(&self, iter: &TreeIter) -> Option<String> {
        let Slot::Concrete(row) = self.resolve(iter)? else {
            return None;
        };
        self.base.prop_entry(self.kind, row).map(|e| e.name)
    }

    fn resolve(&self, iter: &TreeIter) -> Option<Slot> {
        (iter.stamp() == self.stamp).then_some(iter.slot())
    }

    pub(crate) fn emit(&self, event: &ModelEvent) {
        self.signal.emit(event);
    }

    fn concrete(&self, row: Option<SeqRef>) -> Option<TreeIter> {
        row.map(|row| self.iter_of(row))
    }
}

impl<P: PropertySource> TreeModel for PropertyStore<P> {
    fn stamp(&self) -> u32 {
        self.stamp
    }

    fn n_columns(&self) -> usize {
        PropColumn::ALL.len()
    }

    fn column_type(&self, column: usize) -> Option<ColumnType> {
        PropColumn::from_index(column).map(Column::column_type)
    }

    fn len(&self) -> usize {
        self.base.prop_len(self.kind) + 1
    }

    fn iterator_at(&self, position: usize) -> Option<TreeIter> {
        match position {
            0 => Some(self.synthetic_iter()),
            n => self.concrete(self.base.prop_at(self.kind, n - 1)),
        }
    }

    fn path_of(&self, iter: &TreeIter) -> Option<usize> {
        match self.resolve(iter)? {
            Slot::Synthetic => Some(0),
            Slot::Concrete(row) => {
                if self.base.prop_is_end(self.kind, row) {
                    return None;
                }
                self.base.prop_position_of(self.kind, row).map(|p| p + 1)
            }
        }
    }

    fn value_at(&self, iter: &TreeIter, column: usize) -> Option<Value> {
        let column = PropColumn::from_index(column)?;

        let value = match self.resolve(iter) {
            Some(Slot::Synthetic) => Some(match column {
                PropColumn::Name => Value::Text(ALL_LABEL.to_string()),
                PropColumn::Count => Value::Int(self.base.prop_total_count(self.kind) as i64),
                PropColumn::Flag => Value::Bool(true),
            }),
            Some(Slot::Concrete(row)) => {
                self.base
                    .prop_entry(self.kind, row)
                    .map(|entry| match column {
                        PropColumn::Name => Value::Text(property_label(&entry.name).to_string()),
                        PropColumn::Count => Value::Int(entry.count as i64),
                        PropColumn::Flag => Value::Bool(false),
                    })
            }
            None => None,
        };
        Some(value.unwrap_or_else(|| Value::zero(column.column_type())))
    }

    fn next(&self, iter: &TreeIter) -> Option<TreeIter> {
        match self.resolve(iter)? {
            Slot::Synthetic => self.concrete(self.base.prop_begin(self.kind)),
            Slot::Concrete(row) => self.concrete(self.base.prop_next(self.kind, row)),
        }
    }

    fn prev(&self, iter: &TreeIter) -> Option<TreeIter> {
        match self.resolve(iter)? {
            Slot::Synthetic => None,
            Slot::Concrete(row) => match self.base.prop_prev(self.kind, row) {
                Some(prev) => Some(self.iter_of(prev)),
                None if self.base.prop_position_of(self.kind, row) == Some(0) => {
                    Some(self.synthetic_iter())
                }
                None => None,
            },
        }
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
