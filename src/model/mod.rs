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

//! Domain models and core data structures.
//!
//! This module defines the row records held by the backend: catalog entries
//! (named playlists) and the track metadata shared by playlists and the
//! library. Metadata is a typed record; an absent tag is `None`, never an
//! empty placeholder.

/// The kind of a catalog entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatalogKind {
    #[default]
    Playlist,
}

impl CatalogKind {
    pub fn code(self) -> i64 {
        match self {
            CatalogKind::Playlist => 1,
        }
    }
}

/// The kind of a playlist or library row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackKind {
    /// The underlying file could not be found.
    Missing,
    #[default]
    Music,
    /// A track cut from a CUE sheet.
    Cue,
}

impl TrackKind {
    pub fn code(self) -> i64 {
        match self {
            TrackKind::Missing => 0,
            TrackKind::Music => 1,
            TrackKind::Cue => 2,
        }
    }
}

/// Per-track metadata.
///
/// `length` is measured in nanoseconds, matching what the media framework
/// reports for stream durations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackData {
    pub kind: TrackKind,
    pub uri: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub file_type: Option<String>,
    pub length: i64,
    pub track_number: Option<u32>,
    pub year: Option<i32>,
    pub rating: f32,
}

impl TrackData {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// The grouping value of this track for `kind`; untagged tracks group
    /// under the empty string.
    pub fn property(&self, kind: PropKind) -> &str {
        let value = match kind {
            PropKind::Genre => &self.genre,
            PropKind::Artist => &self.artist,
            PropKind::Album => &self.album,
        };
        value.as_deref().unwrap_or_default()
    }
}

/// A catalog entry: a named playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogData {
    pub name: String,
    pub kind: CatalogKind,
}

/// The metadata fields the library can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropKind {
    Genre,
    Artist,
    Album,
}

impl PropKind {
    pub const ALL: [PropKind; 3] = [PropKind::Genre, PropKind::Artist, PropKind::Album];

    pub fn label(self) -> &'static str {
        match self {
            PropKind::Genre => "Genre",
            PropKind::Artist => "Artist",
            PropKind::Album => "Album",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_properties_group_under_empty_string() {
        let track = TrackData::new("file:///a.ogg").with_artist("X");
        assert_eq!(track.property(PropKind::Artist), "X");
        assert_eq!(track.property(PropKind::Genre), "");
        assert_eq!(track.property(PropKind::Album), "");
    }
}
