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

//! Playlist stores: one row per track of a single playlist.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use crate::{
    db::{
        Db,
        sequence::{SeqRef, Sequence, SequenceHandle},
    },
    model::TrackData,
    player::{Playback, PlayerState},
    projection::{TitleTemplate, playing_flag, state_glyph},
    store::{Column, ColumnType, ListStore, RowSource, Value},
    util::format::format_time,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaylistColumn {
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
}

impl Column for PlaylistColumn {
    const ALL: &'static [Self] = &[
        PlaylistColumn::Type,
        PlaylistColumn::State,
        PlaylistColumn::FormattedTitle,
        PlaylistColumn::Title,
        PlaylistColumn::Artist,
        PlaylistColumn::Album,
        PlaylistColumn::FileType,
        PlaylistColumn::Length,
        PlaylistColumn::Track,
        PlaylistColumn::Rating,
        PlaylistColumn::Year,
        PlaylistColumn::PlayingFlag,
    ];

    fn column_type(self) -> ColumnType {
        match self {
            PlaylistColumn::Type | PlaylistColumn::Track | PlaylistColumn::Year => ColumnType::Int,
            PlaylistColumn::Rating => ColumnType::Float,
            PlaylistColumn::PlayingFlag => ColumnType::Bool,
            _ => ColumnType::Text,
        }
    }
}

/// Projects one track column. `formatted` renders the formatted title and
/// `state` is the player state as seen by this row.
pub(crate) fn track_value(
    track: &TrackData,
    column: PlaylistColumn,
    state: PlayerState,
    formatted: impl FnOnce(&TrackData) -> String,
) -> Value {
    let text = |value: &Option<String>| Value::Text(value.clone().unwrap_or_default());

    match column {
        PlaylistColumn::Type => Value::Int(track.kind.code()),
        PlaylistColumn::State => Value::Text(state_glyph(track.kind, state).to_string()),
        PlaylistColumn::FormattedTitle => Value::Text(formatted(track)),
        PlaylistColumn::Title => text(&track.title),
        PlaylistColumn::Artist => text(&track.artist),
        PlaylistColumn::Album => text(&track.album),
        PlaylistColumn::FileType => text(&track.file_type),
        PlaylistColumn::Length => Value::Text(format_time(track.length)),
        PlaylistColumn::Track => Value::Int(track.track_number.map_or(0, i64::from)),
        PlaylistColumn::Rating => Value::Float(f64::from(track.rating)),
        PlaylistColumn::Year => Value::Int(track.year.map_or(0, i64::from)),
        PlaylistColumn::PlayingFlag => Value::Bool(playing_flag(track.kind, state)),
    }
}

pub struct PlaylistSource {
    db: Arc<Db>,
    catalog: SeqRef,
    template: Rc<RefCell<TitleTemplate>>,
    playback: Playback,
}

impl PlaylistSource {
    pub fn new(
        db: Arc<Db>,
        catalog: SeqRef,
        template: Rc<RefCell<TitleTemplate>>,
        playback: Playback,
    ) -> Self {
        Self {
            db,
            catalog,
            template,
            playback,
        }
    }

    /// The catalog entry this playlist belongs to.
    pub fn catalog(&self) -> SeqRef {
        self.catalog
    }

    fn read<R>(&self, f: impl FnOnce(&Sequence<TrackData>) -> R) -> Option<R> {
        self.db.with_playlist(self.catalog, f)
    }

    /// A copy of the track stored at `row`.
    pub fn track(&self, row: SeqRef) -> Option<TrackData> {
        self.read(|tracks| tracks.get(row).cloned()).flatten()
    }
}

// A deleted playlist reads as an empty one.
impl SequenceHandle for PlaylistSource {
    fn len(&self) -> usize {
        self.read(|t| t.len()).unwrap_or(0)
    }

    fn begin(&self) -> Option<SeqRef> {
        self.read(|t| t.begin()).flatten()
    }

    fn at(&self, position: usize) -> Option<SeqRef> {
        self.read(|t| t.at(position)).flatten()
    }

    fn next(&self, row: SeqRef) -> Option<SeqRef> {
        self.read(|t| t.next(row)).flatten()
    }

    fn prev(&self, row: SeqRef) -> Option<SeqRef> {
        self.read(|t| t.prev(row)).flatten()
    }

    fn position_of(&self, row: SeqRef) -> Option<usize> {
        self.read(|t| t.position_of(row)).flatten()
    }

    fn is_end(&self, row: SeqRef) -> bool {
        self.read(|t| t.is_end(row)).unwrap_or(true)
    }
}

impl RowSource for PlaylistSource {
    type Column = PlaylistColumn;

    fn value(&self, row: SeqRef, column: PlaylistColumn) -> Option<Value> {
        let track = self.track(row)?;
        let state = self.playback.state_of_playlist_row(self.catalog, row);
        Some(track_value(&track, column, state, |t| {
            self.template.borrow().render(t)
        }))
    }
}

pub type PlaylistStore = ListStore<PlaylistSource>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::TrackKind,
        player::PlayReference,
        projection::{ICON_MISSING, ICON_PLAY},
        store::TreeModel,
    };

    struct Fixture {
        db: Arc<Db>,
        playback: Playback,
        template: Rc<RefCell<TitleTemplate>>,
        catalog: SeqRef,
        store: PlaylistStore,
    }

    fn fixture(tracks: Vec<TrackData>) -> Fixture {
        let db = Arc::new(Db::new(|_| {}));
        let playback = Playback::new();
        let template = Rc::new(RefCell::new(TitleTemplate::default()));
        let catalog = db.catalog_add("P");
        db.playlist_insert(catalog, None, tracks).unwrap();
        let store = PlaylistStore::new(PlaylistSource::new(
            db.clone(),
            catalog,
            template.clone(),
            playback.clone(),
        ));
        Fixture {
            db,
            playback,
            template,
            catalog,
            store,
        }
    }

    #[test]
    fn formatted_title_uses_shared_template() {
        let f = fixture(vec![TrackData::new("u").with_title("Y").with_artist("X")]);
        let iter = f.store.iterator_at(0).unwrap();

        *f.template.borrow_mut() = TitleTemplate::new("%ARTIST% - %TITLE%").unwrap();

        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::FormattedTitle.index()),
            Some(Value::Text("X - Y".into()))
        );
    }

    #[test]
    fn untagged_track_falls_back_to_file_name() {
        let f = fixture(vec![TrackData::new("file:///music/Intro.ogg")]);
        let iter = f.store.iterator_at(0).unwrap();
        let formatted = PlaylistColumn::FormattedTitle.index();

        for _ in 0..2 {
            assert_eq!(
                f.store.value_at(&iter, formatted),
                Some(Value::Text("Intro".into()))
            );
        }
        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Title.index()),
            Some(Value::Text(String::new()))
        );
    }

    #[test]
    fn numeric_columns_render() {
        let mut track = TrackData::new("u");
        track.length = 125_000_000_000;
        track.track_number = Some(7);
        track.year = Some(1999);
        track.rating = 4.0;
        let f = fixture(vec![track]);
        let iter = f.store.iterator_at(0).unwrap();

        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Length.index()),
            Some(Value::Text("02:05".into()))
        );
        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Track.index()),
            Some(Value::Int(7))
        );
        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Year.index()),
            Some(Value::Int(1999))
        );
        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Rating.index()),
            Some(Value::Float(4.0))
        );
        assert_eq!(f.store.n_columns(), 12);
        assert_eq!(
            f.store.column_type(PlaylistColumn::Rating.index()),
            Some(ColumnType::Float)
        );
    }

    #[test]
    fn playing_row_shows_glyph_and_flag() {
        let mut missing = TrackData::new("gone");
        missing.kind = TrackKind::Missing;
        let f = fixture(vec![TrackData::new("a"), missing]);
        let first = f.store.iterator_at(0).unwrap();
        let second = f.store.iterator_at(1).unwrap();
        let flag = PlaylistColumn::PlayingFlag.index();
        let state = PlaylistColumn::State.index();

        f.playback.play(PlayReference::Playlist {
            catalog: f.catalog,
            row: first.row().unwrap(),
        });

        assert_eq!(f.store.value_at(&first, flag), Some(Value::Bool(true)));
        assert_eq!(
            f.store.value_at(&first, state),
            Some(Value::Text(ICON_PLAY.into()))
        );
        assert_eq!(f.store.value_at(&second, flag), Some(Value::Bool(false)));
        assert_eq!(
            f.store.value_at(&second, state),
            Some(Value::Text(ICON_MISSING.into()))
        );

        f.playback.stop();
        assert_eq!(f.store.value_at(&first, flag), Some(Value::Bool(false)));
    }

    #[test]
    fn deleted_playlist_reads_as_empty() {
        let f = fixture(vec![TrackData::new("a")]);
        let iter = f.store.iterator_at(0).unwrap();

        f.db.catalog_delete(f.catalog).unwrap();

        assert_eq!(f.store.len(), 0);
        assert_eq!(f.store.path_of(&iter), None);
        assert_eq!(
            f.store.value_at(&iter, PlaylistColumn::Track.index()),
            Some(Value::Int(0))
        );
    }
}
