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

//! Live library query results and their property aggregations.
//!
//! A [`QueryResult`] holds the library tracks matching a [`Query`], in library
//! order, together with one sorted aggregation per [`PropKind`] listing each
//! distinct value and how many matching tracks carry it. The owning
//! [`Db`](crate::db::Db) keeps every live result up to date and reports each
//! change through its notifier.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{
    db::{
        DbEvent, RowEvent,
        sequence::{SeqRef, Sequence, SequenceHandle},
    },
    model::{PropKind, TrackData},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryId(pub(crate) u64);

/// A conjunction of "property is one of" constraints.
///
/// A query without constraints matches every track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    constraints: Vec<(PropKind, Vec<String>)>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the constraint for `kind`.
    ///
    /// An empty `values` list removes the constraint, so "no constraint"
    /// and "everything" are the same query.
    pub fn with(mut self, kind: PropKind, values: Vec<String>) -> Self {
        self.constraints.retain(|(k, _)| *k != kind);
        if !values.is_empty() {
            self.constraints.push((kind, values));
        }
        self
    }

    pub fn constraint(&self, kind: PropKind) -> Option<&[String]> {
        self.constraints
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, values)| values.as_slice())
    }

    pub fn matches(&self, track: &TrackData) -> bool {
        self.constraints.iter().all(|(kind, values)| {
            let value = track.property(*kind);
            values.iter().any(|v| v == value)
        })
    }
}

/// One distinct property value and the number of tracks carrying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropEntry {
    pub name: String,
    pub count: usize,
}

/// Read access to the property-grouped view of a query result.
///
/// This is the collaborator surface consumed by the grouped property stores;
/// it mirrors [`SequenceHandle`] with an extra property-kind key.
pub trait PropertySource {
    fn prop_len(&self, kind: PropKind) -> usize;

    fn prop_begin(&self, kind: PropKind) -> Option<SeqRef>;

    fn prop_at(&self, kind: PropKind, position: usize) -> Option<SeqRef>;

    fn prop_next(&self, kind: PropKind, row: SeqRef) -> Option<SeqRef>;

    fn prop_prev(&self, kind: PropKind, row: SeqRef) -> Option<SeqRef>;

    fn prop_position_of(&self, kind: PropKind, row: SeqRef) -> Option<usize>;

    fn prop_is_end(&self, kind: PropKind, row: SeqRef) -> bool;

    fn prop_entry(&self, kind: PropKind, row: SeqRef) -> Option<PropEntry>;

    /// The number of tracks covered by all entries of `kind` together.
    fn prop_total_count(&self, kind: PropKind) -> usize;
}

#[derive(Default)]
struct PropIndex {
    entries: Sequence<PropEntry>,
    by_name: HashMap<String, SeqRef>,
}

impl PropIndex {
    fn sorted_position(&self, name: &str) -> usize {
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = (lo + hi) / 2;
            match self.entries.get_index(mid) {
                Some((_, entry)) if entry.name.as_str() < name => lo = mid + 1,
                _ => hi = mid,
            }
        }
        lo
    }

    fn increment(&mut self, name: &str) -> RowEvent {
        if let Some(&row) = self.by_name.get(name) {
            if let Some(entry) = self.entries.get_mut(row) {
                entry.count += 1;
            }
            return RowEvent::Changed(row);
        }

        let position = self.sorted_position(name);
        let row = self.entries.insert(
            position,
            PropEntry {
                name: name.to_string(),
                count: 1,
            },
        );
        self.by_name.insert(name.to_string(), row);
        RowEvent::Added(row)
    }

    fn decrement(&mut self, name: &str) -> Option<RowEvent> {
        let row = *self.by_name.get(name)?;
        let remaining = {
            let entry = self.entries.get_mut(row)?;
            entry.count = entry.count.saturating_sub(1);
            entry.count
        };

        if remaining > 0 {
            return Some(RowEvent::Changed(row));
        }

        self.by_name.remove(name);
        self.entries
            .remove(row)
            .map(|(position, _)| RowEvent::Deleted { row, position })
    }
}

#[derive(Default)]
struct QueryState {
    rows: Sequence<TrackData>,
    by_uri: HashMap<String, SeqRef>,
    props: HashMap<PropKind, PropIndex>,
}

impl QueryState {
    fn index(&self, kind: PropKind) -> Option<&PropIndex> {
        self.props.get(&kind)
    }

    fn index_mut(&mut self, kind: PropKind) -> &mut PropIndex {
        self.props.entry(kind).or_default()
    }
}

/// The live result of a library [`Query`].
pub struct QueryResult {
    id: QueryId,
    query: Query,
    state: RwLock<QueryState>,
}

impl QueryResult {
    pub(crate) fn new<'a>(
        id: QueryId,
        query: Query,
        tracks: impl Iterator<Item = &'a TrackData>,
    ) -> Self {
        let mut state = QueryState::default();
        for track in tracks.filter(|t| query.matches(t)) {
            let row = state.rows.push(track.clone());
            state.by_uri.insert(track.uri.clone(), row);
            for kind in PropKind::ALL {
                state.index_mut(kind).increment(track.property(kind));
            }
        }

        Self {
            id,
            query,
            state: RwLock::new(state),
        }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// A copy of the track stored at `row`, if it is still part of the result.
    pub fn row(&self, row: SeqRef) -> Option<TrackData> {
        self.state.read().rows.get(row).cloned()
    }

    /// Brings the result in line with the new state of one library track.
    ///
    /// `track` is `None` when the track with `uri` was removed from the
    /// library.
    pub(crate) fn apply(&self, uri: &str, track: Option<&TrackData>, notify: &dyn Fn(DbEvent)) {
        let mut state = self.state.write();
        let existing = state.by_uri.get(uri).copied();
        let wanted = track.filter(|t| self.query.matches(t));

        match (existing, wanted) {
            (None, Some(track)) => self.insert(&mut state, track, notify),
            (Some(row), Some(track)) => self.update(&mut state, row, track, notify),
            (Some(row), None) => self.remove(&mut state, row, notify),
            (None, None) => {}
        }
    }

    fn insert(&self, state: &mut QueryState, track: &TrackData, notify: &dyn Fn(DbEvent)) {
        let row = state.rows.push(track.clone());
        state.by_uri.insert(track.uri.clone(), row);
        notify(self.rows_event(RowEvent::Added(row)));

        for kind in PropKind::ALL {
            let event = state.index_mut(kind).increment(track.property(kind));
            notify(self.props_event(kind, event));
        }
    }

    fn update(
        &self,
        state: &mut QueryState,
        row: SeqRef,
        track: &TrackData,
        notify: &dyn Fn(DbEvent),
    ) {
        let Some(previous) = state.rows.get_mut(row).map(|slot| std::mem::replace(slot, track.clone()))
        else {
            return;
        };
        notify(self.rows_event(RowEvent::Changed(row)));

        for kind in PropKind::ALL {
            let (old, new) = (previous.property(kind), track.property(kind));
            if old == new {
                continue;
            }
            if let Some(event) = state.index_mut(kind).decrement(old) {
                notify(self.props_event(kind, event));
            }
            let event = state.index_mut(kind).increment(new);
            notify(self.props_event(kind, event));
        }
    }

    fn remove(&self, state: &mut QueryState, row: SeqRef, notify: &dyn Fn(DbEvent)) {
        let Some((position, track)) = state.rows.remove(row) else {
            return;
        };
        state.by_uri.remove(&track.uri);
        notify(self.rows_event(RowEvent::Deleted { row, position }));

        for kind in PropKind::ALL {
            if let Some(event) = state.index_mut(kind).decrement(track.property(kind)) {
                notify(self.props_event(kind, event));
            }
        }
    }

    fn rows_event(&self, event: RowEvent) -> DbEvent {
        DbEvent::QueryRows {
            query: self.id,
            event,
        }
    }

    fn props_event(&self, kind: PropKind, event: RowEvent) -> DbEvent {
        DbEvent::QueryProps {
            query: self.id,
            kind,
            event,
        }
    }
}

impl SequenceHandle for QueryResult {
    fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    fn begin(&self) -> Option<SeqRef> {
        self.state.read().rows.begin()
    }

    fn at(&self, position: usize) -> Option<SeqRef> {
        self.state.read().rows.at(position)
    }

    fn next(&self, row: SeqRef) -> Option<SeqRef> {
        self.state.read().rows.next(row)
    }

    fn prev(&self, row: SeqRef) -> Option<SeqRef> {
        self.state.read().rows.prev(row)
    }

    fn position_of(&self, row: SeqRef) -> Option<usize> {
        self.state.read().rows.position_of(row)
    }

    fn is_end(&self, row: SeqRef) -> bool {
        self.state.read().rows.is_end(row)
    }
}

impl PropertySource for QueryResult {
    fn prop_len(&self, kind: PropKind) -> usize {
        self.state.read().index(kind).map_or(0, |i| i.entries.len())
    }

    fn prop_begin(&self, kind: PropKind) -> Option<SeqRef> {
        self.state.read().index(kind)?.entries.begin()
    }

    fn prop_at(&self, kind: PropKind, position: usize) -> Option<SeqRef> {
        self.state.read().index(kind)?.entries.at(position)
    }

    fn prop_next(&self, kind: PropKind, row: SeqRef) -> Option<SeqRef> {
        self.state.read().index(kind)?.entries.next(row)
    }

    fn prop_prev(&self, kind: PropKind, row: SeqRef) -> Option<SeqRef> {
        self.state.read().index(kind)?.entries.prev(row)
    }

    fn prop_position_of(&self, kind: PropKind, row: SeqRef) -> Option<usize> {
        self.state.read().index(kind)?.entries.position_of(row)
    }

    fn prop_is_end(&self, kind: PropKind, row: SeqRef) -> bool {
        self.state
            .read()
            .index(kind)
            .is_none_or(|i| i.entries.is_end(row))
    }

    fn prop_entry(&self, kind: PropKind, row: SeqRef) -> Option<PropEntry> {
        self.state.read().index(kind)?.entries.get(row).cloned()
    }

    fn prop_total_count(&self, _kind: PropKind) -> usize {
        self.state.read().rows.len()
    }
}
