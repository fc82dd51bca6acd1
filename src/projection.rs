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

//! Row projection: turning stored track metadata into display values.
//!
//! Everything here is a pure function of the row data, the title template
//! and the playback state. Stores call into this module from `value_at`.

use thiserror::Error;

use crate::{
    model::{TrackData, TrackKind},
    player::PlayerState,
    util::format::name_from_uri,
};

pub const ICON_PLAY: &str = "\u{25B6}";
pub const ICON_PAUSE: &str = "\u{23F8}";
// Shown for rows whose file could not be found.
pub const ICON_MISSING: &str = "\u{2717}";

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_PROPERTY: &str = "(Unknown)";
pub const ALL_LABEL: &str = "All";

pub const DEFAULT_TITLE_FORMAT: &str = "%TITLE%";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("title format {0:?} does not contain %TITLE%")]
    MissingTitleToken(String),
}

/// The title shown for a track: its title tag, else the file name without
/// extension, else a fixed fallback.
pub fn display_title(track: &TrackData) -> String {
    non_empty(track.title.as_deref())
        .map(str::to_string)
        .or_else(|| name_from_uri(&track.uri))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A display template for the formatted title column.
///
/// `%TITLE%`, `%ARTIST%` and `%ALBUM%` are replaced by the track's values
/// (with fallbacks for missing tags); any other text, including unknown
/// `%...%` sequences, is copied verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleTemplate {
    format: String,
}

impl Default for TitleTemplate {
    fn default() -> Self {
        Self {
            format: DEFAULT_TITLE_FORMAT.to_string(),
        }
    }
}

impl TitleTemplate {
    /// Parses a template, rejecting one that would never show the title.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingTitleToken`] if `format` does not
    /// contain `%TITLE%`.
    pub fn new(format: &str) -> Result<Self, TemplateError> {
        if !format.contains("%TITLE%") {
            return Err(TemplateError::MissingTitleToken(format.to_string()));
        }
        Ok(Self {
            format: format.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    pub fn render(&self, track: &TrackData) -> String {
        let mut out = String::with_capacity(self.format.len() + 32);
        let mut rest = self.format.as_str();

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('%') else {
                out.push_str(&rest[start..]);
                return out;
            };

            match &after[..end] {
                "TITLE" => out.push_str(&display_title(track)),
                "ARTIST" => {
                    out.push_str(non_empty(track.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST))
                }
                "ALBUM" => {
                    out.push_str(non_empty(track.album.as_deref()).unwrap_or(UNKNOWN_ALBUM))
                }
                _ => {
                    // Not a token: keep the text and let the closing '%'
                    // start the next candidate.
                    out.push('%');
                    out.push_str(&after[..end]);
                    rest = &after[end..];
                    continue;
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

/// The state column glyph for a row.
///
/// `state` is the player state as seen by this row: anything other than
/// stopped means the row is the current playback reference.
pub fn state_glyph(kind: TrackKind, state: PlayerState) -> &'static str {
    if kind == TrackKind::Missing {
        return ICON_MISSING;
    }
    player_glyph(state)
}

pub fn player_glyph(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Playing => ICON_PLAY,
        PlayerState::Paused => ICON_PAUSE,
        PlayerState::Stopped => "",
    }
}

pub fn playing_flag(kind: TrackKind, state: PlayerState) -> bool {
    kind != TrackKind::Missing && state != PlayerState::Stopped
}

/// The name shown for a property entry.
pub fn property_label(name: &str) -> &str {
    if name.is_empty() {
        UNKNOWN_PROPERTY
    } else {
        name
    }
}
