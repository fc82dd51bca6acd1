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

//! View-model stores.
//!
//! Stores present backend sequences to views through the [`TreeModel`]
//! protocol. They own no row data: every position, lookup and value is
//! answered from the live backend at call time, so a store can never show a
//! stale position after the backend has been edited.
//!
//! # Handles
//!
//! A [`TreeIter`] carries the generation stamp of the store that issued it.
//! The stamp is drawn once when the store is created and never changes; a
//! handle whose stamp does not match (one from another store, or one that was
//! invalidated by a failed step) is treated as dead by every operation.
//!
//! # Store kinds
//!
//! * [`ListStore`] - a flat list over one sequence; the catalog, playlist
//!   and library track stores are all list stores over different sources.
//! * [`PropertyStore`] - a grouped property list with a synthetic "All" row
//!   at position 0.

mod catalog;
mod library;
mod list;
mod playlist;
mod property;
mod registry;

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt, mem,
};

use bitflags::bitflags;

use crate::db::sequence::SeqRef;

pub use catalog::{CatalogColumn, CatalogSource, CatalogStore};
pub use library::{LibraryColumn, LibraryListStore, LibraryPropStore, LibrarySource};
pub use list::{ListStore, RowSource};
pub use playlist::{PlaylistColumn, PlaylistSource, PlaylistStore};
pub use property::{PropColumn, PropertyStore};
pub use registry::StoreRegistry;

bitflags! {
    /// Structural guarantees a model makes to its views.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModelFlags: u8 {
        /// No row has children.
        const LIST_ONLY = 1 << 0;
        /// Handles stay usable across unrelated edits.
        const ITERS_PERSIST = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
}

/// A typed cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// The empty value of a column type, used for rows that are gone.
    pub fn zero(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Int => Value::Int(0),
            ColumnType::Float => Value::Float(0.0),
            ColumnType::Bool => Value::Bool(false),
            ColumnType::Text => Value::Text(String::new()),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Bool(_) => ColumnType::Bool,
            Value::Text(_) => ColumnType::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.1}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// A closed set of columns exposed by a store.
pub trait Column: Copy + PartialEq + 'static {
    /// Every column, in column-index order.
    const ALL: &'static [Self];

    fn column_type(self) -> ColumnType;

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|column| *column == self)
            .unwrap_or_default()
    }
}

/// What a [`TreeIter`] points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Concrete(SeqRef),
    /// The aggregate row of a property store.
    Synthetic,
}

/// A stamped handle to one row of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeIter {
    stamp: u32,
    slot: Slot,
}

impl TreeIter {
    pub(crate) fn new(stamp: u32, slot: Slot) -> Self {
        Self { stamp, slot }
    }

    pub fn stamp(&self) -> u32 {
        self.stamp
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn is_synthetic(&self) -> bool {
        self.slot == Slot::Synthetic
    }

    /// The backend row, unless this is the synthetic row.
    pub fn row(&self) -> Option<SeqRef> {
        match self.slot {
            Slot::Concrete(row) => Some(row),
            Slot::Synthetic => None,
        }
    }

    /// Marks the handle dead. No store will accept it again.
    pub fn invalidate(&mut self) {
        self.stamp = 0;
    }
}

/// A view-model notification.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelEvent {
    Inserted { position: usize, iter: TreeIter },
    Changed { position: usize, iter: TreeIter },
    Deleted { position: usize },
    /// `new_order[new_position] = old_position`.
    Reordered { new_order: Vec<usize> },
    /// Redraw without any change to the rows.
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&ModelEvent)>;

/// Subscriber list for [`ModelEvent`]s.
///
/// Handlers may subscribe, unsubscribe and trigger further emissions while
/// being called. An event emitted from inside a handler is queued and
/// delivered to every subscriber once the current event has reached them
/// all, so each subscriber sees events in emission order.
#[derive(Default)]
pub struct Signal {
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    removed: RefCell<Vec<SubscriptionId>>,
    pending: RefCell<VecDeque<ModelEvent>>,
    next_id: Cell<u64>,
    emitting: Cell<bool>,
}

impl Signal {
    pub fn connect(&self, handler: impl FnMut(&ModelEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Box::new(handler)));
        id
    }

    pub fn disconnect(&self, id: SubscriptionId) {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        if handlers.len() == before && self.emitting.get() {
            // Currently being called; dropped once emission finishes.
            self.removed.borrow_mut().push(id);
        }
    }

    pub fn emit(&self, event: &ModelEvent) {
        self.pending.borrow_mut().push_back(event.clone());
        if self.emitting.replace(true) {
            return;
        }

        loop {
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            let mut running = mem::take(&mut *self.handlers.borrow_mut());
            for (id, handler) in running.iter_mut() {
                if !self.removed.borrow().contains(id) {
                    handler(&event);
                }
            }

            let mut handlers = self.handlers.borrow_mut();
            running.append(&mut handlers);
            *handlers = running;
        }

        let removed = mem::take(&mut *self.removed.borrow_mut());
        self.handlers
            .borrow_mut()
            .retain(|(id, _)| !removed.contains(id));
        self.emitting.set(false);
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Draws a fresh generation stamp. Zero is reserved for dead handles.
pub(crate) fn new_stamp() -> u32 {
    loop {
        let stamp = rand::random::<u32>();
        if stamp != 0 {
            return stamp;
        }
    }
}

/// The view-model protocol shared by every store.
///
/// All stores are flat lists. Operations never fail loudly: stale handles,
/// out-of-range positions and deleted rows degrade to `None`, `false` or an
/// empty value.
pub trait TreeModel {
    fn flags(&self) -> ModelFlags {
        ModelFlags::LIST_ONLY | ModelFlags::ITERS_PERSIST
    }

    /// The generation stamp carried by every handle this store issues.
    fn stamp(&self) -> u32;

    fn n_columns(&self) -> usize;

    fn column_type(&self, column: usize) -> Option<ColumnType>;

    /// Number of rows, including any synthetic row.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iterator_at(&self, position: usize) -> Option<TreeIter>;

    /// The live position of the row `iter` points at.
    fn path_of(&self, iter: &TreeIter) -> Option<usize>;

    /// The value of `column` for the row `iter` points at.
    ///
    /// Returns `None` only for a column this store does not have; dead rows
    /// yield the column's zero value.
    fn value_at(&self, iter: &TreeIter, column: usize) -> Option<Value>;

    fn next(&self, iter: &TreeIter) -> Option<TreeIter>;

    fn prev(&self, iter: &TreeIter) -> Option<TreeIter>;

    /// Steps `iter` forward in place, invalidating it when there is no next
    /// row.
    fn iter_next(&self, iter: &mut TreeIter) -> bool {
        step(iter, self.next(iter))
    }

    /// Steps `iter` backward in place, invalidating it when there is no
    /// previous row.
    fn iter_prev(&self, iter: &mut TreeIter) -> bool {
        step(iter, self.prev(iter))
    }

    fn children_of(&self, parent: Option<&TreeIter>) -> Option<TreeIter> {
        match parent {
            None => self.iterator_at(0),
            Some(_) => None,
        }
    }

    fn has_child(&self, _iter: &TreeIter) -> bool {
        false
    }

    fn child_count(&self, parent: Option<&TreeIter>) -> usize {
        match parent {
            None => self.len(),
            Some(_) => 0,
        }
    }

    fn nth_child(&self, parent: Option<&TreeIter>, n: usize) -> Option<TreeIter> {
        match parent {
            None => self.iterator_at(n),
            Some(_) => None,
        }
    }

    fn parent(&self, _child: &TreeIter) -> Option<TreeIter> {
        None
    }

    fn subscribe(&self, handler: Box<dyn FnMut(&ModelEvent)>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    /// Asks views to redraw; nothing in the model changes.
    fn refresh(&self);
}

fn step(iter: &mut TreeIter, next: Option<TreeIter>) -> bool {
    match next {
        Some(next) => {
            *iter = next;
            true
        }
        None => {
            iter.invalidate();
            false
        }
    }
}
