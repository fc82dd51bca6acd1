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

//! Playback state shared with the views.
//!
//! There is no audio engine here; [`Playback`] only records which row is the
//! current playback reference and whether it is playing, so that the stores
//! can render the state glyph and playing flag for that row.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::db::sequence::SeqRef;

/// Represents the current playback status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

/// The row playback currently refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayReference {
    Playlist { catalog: SeqRef, row: SeqRef },
    Library { uri: String },
}

/// A cheaply cloneable handle to the shared playback state.
#[derive(Clone, Default)]
pub struct Playback {
    inner: Arc<RwLock<(Option<PlayReference>, PlayerState)>>,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.inner.read().1
    }

    pub fn reference(&self) -> Option<PlayReference> {
        self.inner.read().0.clone()
    }

    /// Makes `reference` current and starts playing it.
    pub fn play(&self, reference: PlayReference) {
        *self.inner.write() = (Some(reference), PlayerState::Playing);
    }

    /// Toggles between playing and paused; does nothing when stopped.
    pub fn toggle_pause(&self) -> PlayerState {
        let mut inner = self.inner.write();
        inner.1 = match inner.1 {
            PlayerState::Playing => PlayerState::Paused,
            PlayerState::Paused => PlayerState::Playing,
            PlayerState::Stopped => PlayerState::Stopped,
        };
        inner.1
    }

    pub fn stop(&self) {
        *self.inner.write() = (None, PlayerState::Stopped);
    }

    /// The state to show for `reference`: the player state if it is the
    /// current playback reference, otherwise [`PlayerState::Stopped`].
    pub fn state_of(&self, reference: &PlayReference) -> PlayerState {
        let inner = self.inner.read();
        match &inner.0 {
            Some(current) if current == reference => inner.1,
            _ => PlayerState::Stopped,
        }
    }

    pub(crate) fn state_of_playlist_row(&self, catalog: SeqRef, row: SeqRef) -> PlayerState {
        let inner = self.inner.read();
        match &inner.0 {
            Some(PlayReference::Playlist { catalog: c, row: r }) if *c == catalog && *r == row => {
                inner.1
            }
            _ => PlayerState::Stopped,
        }
    }

    /// The state to show for a whole playlist: the player state if the
    /// playback reference is one of its rows, otherwise
    /// [`PlayerState::Stopped`].
    pub fn state_of_playlist(&self, catalog: SeqRef) -> PlayerState {
        let inner = self.inner.read();
        match &inner.0 {
            Some(PlayReference::Playlist { catalog: c, .. }) if *c == catalog => inner.1,
            _ => PlayerState::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::db::sequence::Sequence;

    use super::*;

    #[test]
    fn only_the_reference_row_reports_state() {
        let playback = Playback::new();
        let a = PlayReference::Library { uri: "a".into() };
        let b = PlayReference::Library { uri: "b".into() };

        playback.play(a.clone());
        assert_eq!(playback.state_of(&a), PlayerState::Playing);
        assert_eq!(playback.state_of(&b), PlayerState::Stopped);

        assert_eq!(playback.toggle_pause(), PlayerState::Paused);
        assert_eq!(playback.state_of(&a), PlayerState::Paused);

        playback.stop();
        assert_eq!(playback.state_of(&a), PlayerState::Stopped);
        assert_eq!(playback.toggle_pause(), PlayerState::Stopped);
    }

    #[test]
    fn playlist_state_reads_reference_and_state_together() {
        let playback = Playback::new();
        let mut rows = Sequence::new();
        let (catalog, row, other) = (rows.push(()), rows.push(()), rows.push(()));
        let library = PlayReference::Library { uri: "a".into() };

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..2000 {
                    playback.play(PlayReference::Playlist { catalog, row });
                    playback.toggle_pause();
                    playback.play(library.clone());
                }
            });
            s.spawn(|| {
                for _ in 0..2000 {
                    assert_ne!(playback.state_of_playlist(catalog), PlayerState::Playing);
                }
            });
        });

        playback.play(PlayReference::Playlist { catalog, row });
        assert_eq!(playback.state_of_playlist(catalog), PlayerState::Playing);
        assert_eq!(playback.state_of_playlist(other), PlayerState::Stopped);
    }
}
