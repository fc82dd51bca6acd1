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

//! The catalog store: one row per playlist.

use std::sync::Arc;

use crate::{
    db::{
        Db,
        sequence::{SeqRef, SequenceHandle},
    },
    player::{Playback, PlayerState},
    projection::player_glyph,
    store::{Column, ColumnType, ListStore, RowSource, Value},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogColumn {
    Type,
    State,
    Name,
    PlayingFlag,
}

impl Column for CatalogColumn {
    const ALL: &'static [Self] = &[
        CatalogColumn::Type,
        CatalogColumn::State,
        CatalogColumn::Name,
        CatalogColumn::PlayingFlag,
    ];

    fn column_type(self) -> ColumnType {
        match self {
            CatalogColumn::Type => ColumnType::Int,
            CatalogColumn::State | CatalogColumn::Name => ColumnType::Text,
            CatalogColumn::PlayingFlag => ColumnType::Bool,
        }
    }
}

pub struct CatalogSource {
    db: Arc<Db>,
    playback: Playback,
}

impl CatalogSource {
    pub fn new(db: Arc<Db>, playback: Playback) -> Self {
        Self { db, playback }
    }

    /// The player state as seen by a playlist: the current state if playback
    /// refers to one of its rows.
    fn state_of(&self, catalog: SeqRef) -> PlayerState {
        self.playback.state_of_playlist(catalog)
    }
}

impl SequenceHandle for CatalogSource {
    fn len(&self) -> usize {
        self.db.with_catalog(|c| c.len())
    }

    fn begin(&self) -> Option<SeqRef> {
        self.db.with_catalog(|c| c.begin())
    }

    fn at(&self, position: usize) -> Option<SeqRef> {
        self.db.with_catalog(|c| c.at(position))
    }

    fn next(&self, row: SeqRef) -> Option<SeqRef> {
        self.db.with_catalog(|c| c.next(row))
    }

    fn prev(&self, row: SeqRef) -> Option<SeqRef> {
        self.db.with_catalog(|c| c.prev(row))
    }

    fn position_of(&self, row: SeqRef) -> Option<usize> {
        self.db.with_catalog(|c| c.position_of(row))
    }

    fn is_end(&self, row: SeqRef) -> bool {
        self.db.with_catalog(|c| c.is_end(row))
    }
}

impl RowSource for CatalogSource {
    type Column = CatalogColumn;

    fn value(&self, row: SeqRef, column: CatalogColumn) -> Option<Value> {
        let (kind, name) = self.db.with_catalog(|c| {
            c.get(row)
                .map(|entry| (entry.data.kind, entry.data.name.clone()))
        })?;

        Some(match column {
            CatalogColumn::Type => Value::Int(kind.code()),
            CatalogColumn::State => Value::Text(player_glyph(self.state_of(row)).to_string()),
            CatalogColumn::Name => Value::Text(name),
            CatalogColumn::PlayingFlag => Value::Bool(self.state_of(row) != PlayerState::Stopped),
        })
    }
}

pub type CatalogStore = ListStore<CatalogSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::TrackData,
        player::PlayReference,
        projection::ICON_PAUSE,
        store::TreeModel,
    };

    #[test]
    fn playlist_holding_the_playback_reference_shows_state() {
        let db = Arc::new(Db::new(|_| {}));
        let playback = Playback::new();
        let a = db.catalog_add("A");
        let b = db.catalog_add("B");
        let rows = db.playlist_insert(b, None, vec![TrackData::new("x")]).unwrap();
        let store = CatalogStore::new(CatalogSource::new(db.clone(), playback.clone()));

        playback.play(PlayReference::Playlist {
            catalog: b,
            row: rows[0],
        });
        playback.toggle_pause();

        let a_iter = store.iter_of(a);
        let b_iter = store.iter_of(b);
        assert_eq!(
            store.value_at(&b_iter, 1),
            Some(Value::Text(ICON_PAUSE.to_string()))
        );
        assert_eq!(store.value_at(&b_iter, 3), Some(Value::Bool(true)));
        assert_eq!(store.value_at(&a_iter, 3), Some(Value::Bool(false)));
        assert_eq!(store.value_at(&a_iter, 2), Some(Value::Text("A".into())));
        assert_eq!(store.value_at(&a_iter, 0), Some(Value::Int(1)));
    }
}
