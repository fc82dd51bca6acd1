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

//! Library stores over a live [`QueryResult`].

use std::sync::Arc;

use crate::{
    db::{
        query::QueryResult,
        sequence::{SeqRef, SequenceHandle},
    },
    player::{PlayReference, Playback},
    projection::display_title,
    store::{
        Column, ColumnType, ListStore, PropertyStore, RowSource, Value,
        playlist::{PlaylistColumn, track_value},
    },
};

/// The playlist columns plus the genre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryColumn {
    Type,
    State,
    FormattedTitle,
    Title,
    Artist,
    Album,
    FileType,
    Length,
    Track,
    Rating,
    Year,
    PlayingFlag,
    Genre,
}

impl LibraryColumn {
    fn track_column(self) -> Option<PlaylistColumn> {
        Some(match self {
            LibraryColumn::Type => PlaylistColumn::Type,
            LibraryColumn::State => PlaylistColumn::State,
            LibraryColumn::FormattedTitle => PlaylistColumn::FormattedTitle,
            LibraryColumn::Title => PlaylistColumn::Title,
            LibraryColumn::Artist => PlaylistColumn::Artist,
            LibraryColumn::Album => PlaylistColumn::Album,
            LibraryColumn::FileType => PlaylistColumn::FileType,
            LibraryColumn::Length => PlaylistColumn::Length,
            LibraryColumn::Track => PlaylistColumn::Track,
            LibraryColumn::Rating => PlaylistColumn::Rating,
            LibraryColumn::Year => PlaylistColumn::Year,
            LibraryColumn::PlayingFlag => PlaylistColumn::PlayingFlag,
            LibraryColumn::Genre => return None,
        })
    }
}

impl Column for LibraryColumn {
    const ALL: &'static [Self] = &[
        LibraryColumn::Type,
        LibraryColumn::State,
        LibraryColumn::FormattedTitle,
        LibraryColumn::Title,
        LibraryColumn::Artist,
        LibraryColumn::Album,
        LibraryColumn::FileType,
        LibraryColumn::Length,
        LibraryColumn::Track,
        LibraryColumn::Rating,
        LibraryColumn::Year,
        LibraryColumn::PlayingFlag,
        LibraryColumn::Genre,
    ];

    fn column_type(self) -> ColumnType {
        self.track_column()
            .map_or(ColumnType::Text, Column::column_type)
    }
}

pub struct LibrarySource {
    result: Arc<QueryResult>,
    playback: Playback,
}

impl LibrarySource {
    pub fn new(result: Arc<QueryResult>, playback: Playback) -> Self {
        Self { result, playback }
    }

    pub fn result(&self) -> &Arc<QueryResult> {
        &self.result
    }
}

impl SequenceHandle for LibrarySource {
    fn len(&self) -> usize {
        self.result.len()
    }

    fn begin(&self) -> Option<SeqRef> {
        self.result.begin()
    }

    fn at(&self, position: usize) -> Option<SeqRef> {
        self.result.at(position)
    }

    fn next(&self, row: SeqRef) -> Option<SeqRef> {
        self.result.next(row)
    }

    fn prev(&self, row: SeqRef) -> Option<SeqRef> {
        self.result.prev(row)
    }

    fn position_of(&self, row: SeqRef) -> Option<usize> {
        self.result.position_of(row)
    }

    fn is_end(&self, row: SeqRef) -> bool {
        self.result.is_end(row)
    }
}

impl RowSource for LibrarySource {
    type Column = LibraryColumn;

    fn value(&self, row: SeqRef, column: LibraryColumn) -> Option<Value> {
        let track = self.result.row(row)?;
        let Some(column) = column.track_column() else {
            return Some(Value::Text(track.genre.unwrap_or_default()));
        };

        let state = self.playback.state_of(&PlayReference::Library {
            uri: track.uri.clone(),
        });
        Some(track_value(&track, column, state, display_title))
    }
}

pub type LibraryListStore = ListStore<LibrarySource>;

pub type LibraryPropStore = PropertyStore<QueryResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{Db, query::Query},
        model::{PropKind, TrackData},
        store::TreeModel,
    };

    #[test]
    fn library_rows_follow_the_query() {
        let db = Arc::new(Db::new(|_| {}));
        db.library_add(TrackData::new("file:///a.ogg").with_genre("Rock"));
        db.library_add(TrackData::new("file:///b.ogg").with_genre("Jazz"));
        let query = Query::all().with(PropKind::Genre, vec!["Jazz".into()]);
        let store = LibraryListStore::new(LibrarySource::new(db.query(query), Playback::new()));

        assert_eq!(store.len(), 1);
        assert_eq!(store.n_columns(), 13);

        let iter = store.iterator_at(0).unwrap();
        assert_eq!(store.value_at(&iter, 12), Some(Value::Text("Jazz".into())));
        assert_eq!(store.value_at(&iter, 2), Some(Value::Text("b".into())));

        db.library_add(TrackData::new("file:///c.ogg").with_genre("Jazz"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn library_playing_flag_follows_uri() {
        let db = Arc::new(Db::new(|_| {}));
        db.library_add(TrackData::new("a"));
        let playback = Playback::new();
        let store =
            LibraryListStore::new(LibrarySource::new(db.query(Query::all()), playback.clone()));
        let iter = store.iterator_at(0).unwrap();

        playback.play(PlayReference::Library { uri: "a".into() });

        assert_eq!(store.value_at(&iter, 11), Some(Value::Bool(true)));
    }
}
