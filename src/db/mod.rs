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

//! In-memory media database.
//!
//! The database owns three kinds of ordered data:
//!
//! * the **catalog** - the list of named playlists,
//! * one **playlist** sequence of tracks per catalog entry,
//! * the **library** - every known track keyed by URI, exposed to views
//!   through live [`QueryResult`]s.
//!
//! Every mutation is reported to the notifier given to [`Db::new`] as a
//! [`DbEvent`]. Events are delivered synchronously while the write lock is
//! held, so the notifier must never call back into the database; the
//! application forwards them over a channel instead.
//!
//! # Row references
//!
//! Rows are addressed by [`SeqRef`], which stays valid until the row itself is
//! removed regardless of how the surrounding sequence is edited.

pub mod query;
pub mod sequence;

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use log::debug;
use parking_lot::RwLock;
use thiserror::Error;

use crate::{
    db::{
        query::{Query, QueryId, QueryResult},
        sequence::{SeqRef, Sequence, SequenceHandle, is_permutation},
    },
    model::{CatalogData, CatalogKind, PropKind, TrackData},
};

/// The callback receiving database change notifications.
pub type Notify = dyn Fn(DbEvent) + Send + Sync;

/// A change to one ordered sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowEvent {
    Added(SeqRef),
    Changed(SeqRef),
    /// The row is already gone; `position` is where it was.
    Deleted { row: SeqRef, position: usize },
    /// `new_order[new_position] = old_position`.
    Reordered(Vec<usize>),
}

/// A change notification from the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DbEvent {
    Catalog(RowEvent),
    Playlist { catalog: SeqRef, event: RowEvent },
    QueryRows { query: QueryId, event: RowEvent },
    QueryProps {
        query: QueryId,
        kind: PropKind,
        event: RowEvent,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbError {
    #[error("catalog entry {0:?} does not exist")]
    NoSuchCatalog(SeqRef),

    #[error("row {row:?} does not exist in playlist {catalog:?}")]
    NoSuchRow { catalog: SeqRef, row: SeqRef },

    #[error("{order:?} is not a permutation of {len} rows")]
    InvalidPermutation { order: Vec<usize>, len: usize },
}

/// A catalog entry together with its playlist.
#[derive(Debug, Default)]
pub struct CatalogEntry {
    pub data: CatalogData,
    pub tracks: Sequence<TrackData>,
}

#[derive(Default)]
struct DbState {
    catalog: Sequence<CatalogEntry>,
    library: IndexMap<String, TrackData>,
    queries: Vec<Weak<QueryResult>>,
    next_query: u64,
}

impl DbState {
    fn entry_mut(&mut self, catalog: SeqRef) -> Result<&mut CatalogEntry, DbError> {
        self.catalog
            .get_mut(catalog)
            .ok_or(DbError::NoSuchCatalog(catalog))
    }

    fn live_queries(&mut self) -> Vec<Arc<QueryResult>> {
        self.queries.retain(|q| q.strong_count() > 0);
        self.queries.iter().filter_map(Weak::upgrade).collect()
    }
}

pub struct Db {
    state: RwLock<DbState>,
    notify: Box<Notify>,
}

impl Db {
    /// Creates an empty database reporting changes to `notify`.
    pub fn new(notify: impl Fn(DbEvent) + Send + Sync + 'static) -> Self {
        Self {
            state: RwLock::new(DbState::default()),
            notify: Box::new(notify),
        }
    }

    /// Runs `f` with read access to the catalog.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Sequence<CatalogEntry>) -> R) -> R {
        f(&self.state.read().catalog)
    }

    /// Runs `f` with read access to the tracks of one playlist.
    ///
    /// Returns `None` if the catalog entry no longer exists.
    pub fn with_playlist<R>(
        &self,
        catalog: SeqRef,
        f: impl FnOnce(&Sequence<TrackData>) -> R,
    ) -> Option<R> {
        let state = self.state.read();
        state.catalog.get(catalog).map(|entry| f(&entry.tracks))
    }

    pub fn catalog_len(&self) -> usize {
        self.state.read().catalog.len()
    }

    /// Looks up a catalog entry by name.
    pub fn catalog_find(&self, name: &str) -> Option<SeqRef> {
        self.state
            .read()
            .catalog
            .iter()
            .find(|(_, entry)| entry.data.name == name)
            .map(|(row, _)| row)
    }

    /// Appends a new, empty playlist to the catalog.
    pub fn catalog_add(&self, name: &str) -> SeqRef {
        let mut state = self.state.write();
        let row = state.catalog.push(CatalogEntry {
            data: CatalogData {
                name: name.to_string(),
                kind: CatalogKind::Playlist,
            },
            tracks: Sequence::new(),
        });
        debug!("catalog entry {row:?} added: {name}");
        (self.notify)(DbEvent::Catalog(RowEvent::Added(row)));
        row
    }

    /// Renames a playlist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoSuchCatalog`] if the entry has been deleted.
    pub fn catalog_rename(&self, catalog: SeqRef, name: &str) -> Result<(), DbError> {
        let mut state = self.state.write();
        state.entry_mut(catalog)?.data.name = name.to_string();
        (self.notify)(DbEvent::Catalog(RowEvent::Changed(catalog)));
        Ok(())
    }

    /// Removes a playlist and all of its tracks.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoSuchCatalog`] if the entry has already been
    /// deleted.
    pub fn catalog_delete(&self, catalog: SeqRef) -> Result<CatalogData, DbError> {
        let mut state = self.state.write();
        let (position, entry) = state
            .catalog
            .remove(catalog)
            .ok_or(DbError::NoSuchCatalog(catalog))?;
        debug!("catalog entry {catalog:?} deleted from position {position}");
        (self.notify)(DbEvent::Catalog(RowEvent::Deleted {
            row: catalog,
            position,
        }));
        Ok(entry.data)
    }

    /// Reorders the catalog; `new_order[new_position] = old_position`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidPermutation`] if `new_order` is not a
    /// permutation of the current positions.
    pub fn catalog_reorder(&self, new_order: &[usize]) -> Result<(), DbError> {
        let mut state = self.state.write();
        if !state.catalog.reorder(new_order) {
            return Err(DbError::InvalidPermutation {
                order: new_order.to_vec(),
                len: state.catalog.len(),
            });
        }
        (self.notify)(DbEvent::Catalog(RowEvent::Reordered(new_order.to_vec())));
        Ok(())
    }

    /// Inserts tracks into a playlist, starting at `position` (appending when
    /// `None` or past the end).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NoSuchCatalog`] if the playlist has been deleted.
    pub fn playlist_insert(
        &self,
        catalog: SeqRef,
        position: Option<usize>,
        tracks: Vec<TrackData>,
    ) -> Result<Vec<SeqRef>, DbError> {
        let mut state = self.state.write();
        let entry = state.entry_mut(catalog)?;
        let mut at = position.unwrap_or(usize::MAX).min(entry.tracks.len());

        let mut rows = Vec::with_capacity(tracks.len());
        for track in tracks {
            let row = entry.tracks.insert(at, track);
            at += 1;
            rows.push(row);
            (self.notify)(DbEvent::Playlist {
                catalog,
                event: RowEvent::Added(row),
            });
        }
        Ok(rows)
    }

    /// Replaces the metadata stored for one playlist row.
    ///
    /// # Errors
    ///
    /// Returns an error if either the playlist or the row no longer exists.
    pub fn playlist_update(
        &self,
        catalog: SeqRef,
        row: SeqRef,
        track: TrackData,
    ) -> Result<(), DbError> {
        let mut state = self.state.write();
        let slot = state
            .entry_mut(catalog)?
            .tracks
            .get_mut(row)
            .ok_or(DbError::NoSuchRow { catalog, row })?;
        *slot = track;
        (self.notify)(DbEvent::Playlist {
            catalog,
            event: RowEvent::Changed(row),
        });
        Ok(())
    }

    /// Removes one row from a playlist, returning its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if either the playlist or the row no longer exists.
    pub fn playlist_delete(&self, catalog: SeqRef, row: SeqRef) -> Result<TrackData, DbError> {
        let mut state = self.state.write();
        let (position, track) = state
            .entry_mut(catalog)?
            .tracks
            .remove(row)
            .ok_or(DbError::NoSuchRow { catalog, row })?;
        (self.notify)(DbEvent::Playlist {
            catalog,
            event: RowEvent::Deleted { row, position },
        });
        Ok(track)
    }

    /// Reorders a playlist; `new_order[new_position] = old_position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist no longer exists or `new_order` is
    /// not a permutation of its positions.
    pub fn playlist_reorder(&self, catalog: SeqRef, new_order: &[usize]) -> Result<(), DbError> {
        let mut state = self.state.write();
        self.reorder_tracks(&mut state, catalog, new_order.to_vec())
    }

    /// Moves one playlist row to `to`, expressed as a reorder.
    ///
    /// The row's position is looked up under the same lock that applies the
    /// reorder.
    ///
    /// # Errors
    ///
    /// Returns an error if either the playlist or the row no longer exists.
    pub fn playlist_move(&self, catalog: SeqRef, row: SeqRef, to: usize) -> Result<(), DbError> {
        let mut state = self.state.write();
        let tracks = &state.entry_mut(catalog)?.tracks;
        let from = tracks
            .position_of(row)
            .ok_or(DbError::NoSuchRow { catalog, row })?;
        let order = move_order(tracks.len(), from, to);
        self.reorder_tracks(&mut state, catalog, order)
    }

    fn reorder_tracks(
        &self,
        state: &mut DbState,
        catalog: SeqRef,
        new_order: Vec<usize>,
    ) -> Result<(), DbError> {
        let tracks = &mut state.entry_mut(catalog)?.tracks;
        if !is_permutation(&new_order, tracks.len()) {
            return Err(DbError::InvalidPermutation {
                len: tracks.len(),
                order: new_order,
            });
        }
        tracks.reorder(&new_order);
        (self.notify)(DbEvent::Playlist {
            catalog,
            event: RowEvent::Reordered(new_order),
        });
        Ok(())
    }

    pub fn library_len(&self) -> usize {
        self.state.read().library.len()
    }

    /// Adds a track to the library, replacing any track with the same URI.
    ///
    /// Returns `true` if the URI was not known before.
    pub fn library_add(&self, track: TrackData) -> bool {
        let mut state = self.state.write();
        let uri = track.uri.clone();
        let added = state.library.insert(uri.clone(), track).is_none();

        let queries = state.live_queries();
        let track = state.library.get(&uri);
        for query in queries {
            query.apply(&uri, track, &*self.notify);
        }
        added
    }

    /// Removes the track with `uri` from the library.
    ///
    /// Returns `false` if no such track existed.
    pub fn library_remove(&self, uri: &str) -> bool {
        let mut state = self.state.write();
        if state.library.shift_remove(uri).is_none() {
            return false;
        }
        for query in state.live_queries() {
            query.apply(uri, None, &*self.notify);
        }
        true
    }

    pub fn library_track(&self, uri: &str) -> Option<TrackData> {
        self.state.read().library.get(uri).cloned()
    }

    /// Opens a live query over the library.
    ///
    /// The result tracks library changes for as long as the returned handle
    /// is alive.
    pub fn query(&self, query: Query) -> Arc<QueryResult> {
        let mut state = self.state.write();
        state.next_query += 1;
        let id = QueryId(state.next_query);
        let result = Arc::new(QueryResult::new(id, query, state.library.values()));
        state.live_queries();
        state.queries.push(Arc::downgrade(&result));
        debug!("query {id:?} opened with {} rows", result.len());
        result
    }
}

/// The permutation moving the item at `from` to `to` in a sequence of `len`.
pub fn move_order(len: usize, from: usize, to: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if from < len {
        let item = order.remove(from);
        order.insert(to.min(len - 1), item);
    }
    order
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recording_db() -> (Db, Arc<Mutex<Vec<DbEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let db = Db::new(move |e| sink.lock().unwrap().push(e));
        (db, events)
    }

    fn titles(db: &Db, catalog: SeqRef) -> Vec<String> {
        db.with_playlist(catalog, |tracks| {
            tracks
                .iter()
                .map(|(_, t)| t.title.clone().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
    }

    #[test]
    fn catalog_mutations_emit_events() {
        let (db, events) = recording_db();
        let a = db.catalog_add("A");
        let b = db.catalog_add("B");
        db.catalog_rename(a, "Renamed").unwrap();
        db.catalog_reorder(&[1, 0]).unwrap();
        db.catalog_delete(a).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                DbEvent::Catalog(RowEvent::Added(a)),
                DbEvent::Catalog(RowEvent::Added(b)),
                DbEvent::Catalog(RowEvent::Changed(a)),
                DbEvent::Catalog(RowEvent::Reordered(vec![1, 0])),
                DbEvent::Catalog(RowEvent::Deleted {
                    row: a,
                    position: 1
                }),
            ]
        );
    }

    #[test]
    fn deleted_catalog_rejects_further_edits() {
        let (db, _) = recording_db();
        let a = db.catalog_add("A");
        db.catalog_delete(a).unwrap();

        assert_eq!(db.catalog_rename(a, "x"), Err(DbError::NoSuchCatalog(a)));
        assert_eq!(
            db.playlist_insert(a, None, vec![TrackData::new("u")]),
            Err(DbError::NoSuchCatalog(a))
        );
    }

    #[test]
    fn playlist_insert_keeps_given_order() {
        let (db, _) = recording_db();
        let p = db.catalog_add("P");
        db.playlist_insert(p, None, vec![TrackData::new("1").with_title("A")])
            .unwrap();
        db.playlist_insert(
            p,
            Some(0),
            vec![
                TrackData::new("2").with_title("B"),
                TrackData::new("3").with_title("C"),
            ],
        )
        .unwrap();

        assert_eq!(titles(&db, p), ["B", "C", "A"]);
    }

    #[test]
    fn playlist_reorder_validates_permutation() {
        let (db, _) = recording_db();
        let p = db.catalog_add("P");
        db.playlist_insert(p, None, vec![TrackData::new("1"), TrackData::new("2")])
            .unwrap();

        assert!(matches!(
            db.playlist_reorder(p, &[0, 0]),
            Err(DbError::InvalidPermutation { len: 2, .. })
        ));
    }

    #[test]
    fn playlist_move_reorders_rows() {
        let (db, events) = recording_db();
        let p = db.catalog_add("P");
        let rows = db
            .playlist_insert(
                p,
                None,
                ["A", "B", "C"]
                    .iter()
                    .map(|t| TrackData::new(*t).with_title(*t))
                    .collect(),
            )
            .unwrap();
        db.playlist_move(p, rows[2], 0).unwrap();

        assert_eq!(titles(&db, p), ["C", "A", "B"]);
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&DbEvent::Playlist {
                catalog: p,
                event: RowEvent::Reordered(vec![2, 0, 1]),
            })
        );
    }

    #[test]
    fn playlist_move_targets_its_row_while_others_edit() {
        let db = Db::new(|_| {});
        let p = db.catalog_add("P");
        let rows = db
            .playlist_insert(p, None, (0..8).map(|i| TrackData::new(i.to_string())).collect())
            .unwrap();
        let last = rows[7];

        let is_last = || {
            db.with_playlist(p, |t| t.position_of(last) == Some(t.len() - 1))
                .unwrap()
        };

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..500 {
                    db.playlist_insert(p, Some(0), vec![TrackData::new(format!("n{i}"))])
                        .unwrap();
                    let second = db.with_playlist(p, |t| t.at(1)).flatten().unwrap();
                    db.playlist_delete(p, second).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..500 {
                    db.playlist_move(p, last, usize::MAX).unwrap();
                    assert!(is_last());
                }
            });
        });

        assert_eq!(db.with_playlist(p, |t| t.len()), Some(8));
        assert!(is_last());
    }

    #[test]
    fn library_changes_reach_live_queries_only() {
        let (db, events) = recording_db();
        let query = db.query(Query::all());
        let dropped = db.query(Query::all());
        let dropped_id = dropped.id();
        drop(dropped);

        assert!(db.library_add(TrackData::new("a").with_genre("Rock")));
        assert!(!db.library_add(TrackData::new("a").with_genre("Jazz")));

        assert_eq!(query.len(), 1);
        let events = events.lock().unwrap();
        assert!(events.iter().all(|e| match e {
            DbEvent::QueryRows { query, .. } | DbEvent::QueryProps { query, .. } =>
                *query != dropped_id,
            _ => true,
        }));
    }

    #[test]
    fn library_remove_unknown_uri_is_noop() {
        let (db, events) = recording_db();
        let _query = db.query(Query::all());
        assert!(!db.library_remove("missing"));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn move_order_builds_permutation() {
        assert_eq!(move_order(4, 0, 2), vec![1, 2, 0, 3]);
        assert_eq!(move_order(3, 2, 0), vec![2, 0, 1]);
        assert_eq!(move_order(3, 1, 9), vec![0, 2, 1]);
    }
}
