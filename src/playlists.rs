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

//! Playlists view state: the catalog list beside the selected playlist.

use std::rc::Rc;

use trackview::{
    db::sequence::SeqRef,
    store::{CatalogStore, PlaylistStore, StoreRegistry, TreeModel},
};

use crate::cursor::Cursor;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum PlaylistsPane {
    #[default]
    Catalog,
    Tracks,
}

#[derive(Default)]
pub(crate) struct PlaylistsView {
    pub(crate) active_pane: PlaylistsPane,
    pub(crate) catalog_cursor: Cursor,
    pub(crate) track_cursor: Cursor,
    // The playlist the track cursor belongs to.
    shown: Option<SeqRef>,
}

impl PlaylistsView {
    pub(crate) fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            PlaylistsPane::Catalog => PlaylistsPane::Tracks,
            PlaylistsPane::Tracks => PlaylistsPane::Catalog,
        };
    }

    pub(crate) fn selected_catalog(&mut self, catalog: &CatalogStore) -> Option<SeqRef> {
        self.catalog_cursor.iter(catalog)?.row()
    }

    /// The playlist store of the selected catalog entry.
    pub(crate) fn playlist(&mut self, registry: &StoreRegistry) -> Option<Rc<PlaylistStore>> {
        let catalog = registry.catalog_store()?;
        let selected = self.selected_catalog(&catalog)?;
        if self.shown != Some(selected) {
            self.shown = Some(selected);
            self.track_cursor.reset();
        }
        registry.playlist_store(selected)
    }

    /// The selected track as `(catalog, row, position)`.
    pub(crate) fn selected_track(
        &mut self,
        registry: &StoreRegistry,
    ) -> Option<(SeqRef, SeqRef, usize)> {
        let store = self.playlist(registry)?;
        let position = self.track_cursor.position(&*store)?;
        let row = self.track_cursor.iter(&*store)?.row()?;
        Some((registry.catalog_of(&store), row, position))
    }

    pub(crate) fn next(&mut self, registry: &StoreRegistry) {
        match self.active_pane {
            PlaylistsPane::Catalog => {
                if let Some(catalog) = registry.catalog_store() {
                    self.catalog_cursor.next(&*catalog);
                }
            }
            PlaylistsPane::Tracks => {
                if let Some(store) = self.playlist(registry) {
                    self.track_cursor.next(&*store);
                }
            }
        }
    }

    pub(crate) fn previous(&mut self, registry: &StoreRegistry) {
        match self.active_pane {
            PlaylistsPane::Catalog => {
                if let Some(catalog) = registry.catalog_store() {
                    self.catalog_cursor.previous(&*catalog);
                }
            }
            PlaylistsPane::Tracks => {
                if let Some(store) = self.playlist(registry) {
                    self.track_cursor.previous(&*store);
                }
            }
        }
    }

    /// Number of rows in the active pane.
    pub(crate) fn active_len(&mut self, registry: &StoreRegistry) -> usize {
        match self.active_pane {
            PlaylistsPane::Catalog => registry.catalog_store().map_or(0, |c| c.len()),
            PlaylistsPane::Tracks => self.playlist(registry).map_or(0, |p| p.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trackview::{db::Db, model::TrackData, player::Playback};

    use super::*;

    #[test]
    fn track_selection_resets_when_the_playlist_changes() {
        let db = Arc::new(Db::new(|_| {}));
        let a = db.catalog_add("A");
        let b = db.catalog_add("B");
        db.playlist_insert(a, None, vec![TrackData::new("1"), TrackData::new("2")])
            .unwrap();
        db.playlist_insert(b, None, vec![TrackData::new("3")]).unwrap();
        let registry = StoreRegistry::new(db, Playback::new());
        let mut view = PlaylistsView::default();

        view.active_pane = PlaylistsPane::Tracks;
        view.next(&registry);
        assert_eq!(view.selected_track(&registry).map(|t| t.2), Some(1));

        view.toggle_pane();
        view.next(&registry);
        let (catalog, _, position) = view.selected_track(&registry).unwrap();
        assert_eq!(catalog, b);
        assert_eq!(position, 0);
    }
}
