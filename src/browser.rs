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

//! Library browser state management.
//!
//! The browser narrows the library through three property panes (genre,
//! artist, album) feeding a track list. Each pane lists the values found in
//! the tracks selected by the panes before it, so changing a selection
//! rebuilds every pane after it over a fresh query.

use std::rc::Rc;

use trackview::{
    db::query::Query,
    model::{PropKind, TrackData},
    store::{LibraryListStore, LibraryPropStore, StoreRegistry, TreeIter, TreeModel},
};

use crate::cursor::Cursor;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum BrowserPane {
    #[default]
    Genre,
    Artist,
    Album,
    Track,
}

impl BrowserPane {
    fn kind(self) -> Option<PropKind> {
        match self {
            BrowserPane::Genre => Some(PropKind::Genre),
            BrowserPane::Artist => Some(PropKind::Artist),
            BrowserPane::Album => Some(PropKind::Album),
            BrowserPane::Track => None,
        }
    }
}

/// Collapses a selection containing the aggregate row to that row alone; an
/// empty selection means the aggregate row too.
pub(crate) fn reduce_selection(selection: Vec<TreeIter>, all: TreeIter) -> Vec<TreeIter> {
    if selection.is_empty() || selection.iter().any(TreeIter::is_synthetic) {
        vec![all]
    } else {
        selection
    }
}

pub(crate) struct PropPane {
    pub(crate) store: Rc<LibraryPropStore>,
    pub(crate) cursor: Cursor,
    selection: Vec<TreeIter>,
}

impl PropPane {
    fn new(store: Rc<LibraryPropStore>) -> Self {
        let selection = vec![store.synthetic_iter()];
        Self {
            store,
            cursor: Cursor::default(),
            selection,
        }
    }

    pub(crate) fn is_selected(&self, iter: &TreeIter) -> bool {
        self.selection.contains(iter)
    }

    /// Makes the row under the cursor the only selected row.
    fn select_only(&mut self) {
        if let Some(iter) = self.cursor.iter(&*self.store) {
            self.set_selection(vec![iter]);
        }
    }

    /// Adds or removes the row under the cursor.
    fn toggle(&mut self) {
        let Some(iter) = self.cursor.iter(&*self.store) else {
            return;
        };
        let mut selection = self.selection.clone();
        match selection.iter().position(|s| *s == iter) {
            Some(index) => {
                selection.remove(index);
            }
            None => selection.push(iter),
        }
        self.set_selection(selection);
    }

    /// Drops selected rows whose property entry is gone, falling back to the
    /// aggregate row when none are left. Returns whether anything was
    /// dropped.
    fn prune(&mut self) -> bool {
        let live: Vec<TreeIter> = self
            .selection
            .iter()
            .copied()
            .filter(|iter| self.store.path_of(iter).is_some())
            .collect();
        if live.len() == self.selection.len() {
            return false;
        }
        self.set_selection(live);
        true
    }

    fn set_selection(&mut self, selection: Vec<TreeIter>) {
        let all = self.store.synthetic_iter();
        self.selection = reduce_selection(selection, all);
    }

    /// The values selected in this pane; empty when the aggregate row is
    /// selected, meaning no constraint.
    fn constraint(&self) -> Vec<String> {
        self.selection
            .iter()
            .filter_map(|iter| self.store.name_of(iter))
            .collect()
    }
}

pub(crate) struct LibraryBrowser {
    pub(crate) active_pane: BrowserPane,

    pub(crate) genres: PropPane,
    pub(crate) artists: PropPane,
    pub(crate) albums: PropPane,

    pub(crate) tracks: Rc<LibraryListStore>,
    pub(crate) track_cursor: Cursor,
}

impl LibraryBrowser {
    pub(crate) fn new(registry: &StoreRegistry) -> Self {
        let db = registry.db();
        let prop = |kind| PropPane::new(registry.library_prop_store(db.query(Query::all()), kind));

        Self {
            active_pane: BrowserPane::default(),
            genres: prop(PropKind::Genre),
            artists: prop(PropKind::Artist),
            albums: prop(PropKind::Album),
            tracks: registry.library_list_store(db.query(Query::all())),
            track_cursor: Cursor::default(),
        }
    }

    pub(crate) fn next_pane(&mut self) {
        self.active_pane = match self.active_pane {
            BrowserPane::Genre => BrowserPane::Artist,
            BrowserPane::Artist => BrowserPane::Album,
            BrowserPane::Album => BrowserPane::Track,
            BrowserPane::Track => BrowserPane::Genre,
        };
    }

    pub(crate) fn previous_pane(&mut self) {
        self.active_pane = match self.active_pane {
            BrowserPane::Genre => BrowserPane::Track,
            BrowserPane::Artist => BrowserPane::Genre,
            BrowserPane::Album => BrowserPane::Artist,
            BrowserPane::Track => BrowserPane::Album,
        };
    }

    fn pane_mut(&mut self, pane: BrowserPane) -> Option<&mut PropPane> {
        match pane {
            BrowserPane::Genre => Some(&mut self.genres),
            BrowserPane::Artist => Some(&mut self.artists),
            BrowserPane::Album => Some(&mut self.albums),
            BrowserPane::Track => None,
        }
    }

    pub(crate) fn next(&mut self) {
        match self.active_pane {
            BrowserPane::Track => self.track_cursor.next(&*self.tracks),
            pane => {
                if let Some(p) = self.pane_mut(pane) {
                    p.cursor.next(&*p.store);
                }
            }
        }
    }

    pub(crate) fn previous(&mut self) {
        match self.active_pane {
            BrowserPane::Track => self.track_cursor.previous(&*self.tracks),
            pane => {
                if let Some(p) = self.pane_mut(pane) {
                    p.cursor.previous(&*p.store);
                }
            }
        }
    }

    /// Selects only the row under the cursor of the active property pane.
    pub(crate) fn select_only(&mut self, registry: &StoreRegistry) {
        let pane = self.active_pane;
        if let Some(p) = self.pane_mut(pane) {
            p.select_only();
            self.rebuild_after(pane, registry);
        }
    }

    /// Adds or removes the row under the cursor of the active property pane.
    pub(crate) fn toggle_selection(&mut self, registry: &StoreRegistry) {
        let pane = self.active_pane;
        if let Some(p) = self.pane_mut(pane) {
            p.toggle();
            self.rebuild_after(pane, registry);
        }
    }

    /// Brings every pane's selection in line with the library after it
    /// changed, rebuilding the panes after one that lost selected entries.
    pub(crate) fn prune_selection(&mut self, registry: &StoreRegistry) {
        for pane in [BrowserPane::Genre, BrowserPane::Artist, BrowserPane::Album] {
            if self.pane_mut(pane).is_some_and(|p| p.prune()) {
                self.rebuild_after(pane, registry);
            }
        }
    }

    /// The library query selected by every property pane before `pane`.
    fn query_before(&self, pane: BrowserPane) -> Query {
        [&self.genres, &self.artists, &self.albums]
            .into_iter()
            .zip([BrowserPane::Genre, BrowserPane::Artist, BrowserPane::Album])
            .take_while(|(_, p)| *p != pane)
            .fold(Query::all(), |query, (prop, p)| match p.kind() {
                Some(kind) => query.with(kind, prop.constraint()),
                None => query,
            })
    }

    fn rebuild_after(&mut self, pane: BrowserPane, registry: &StoreRegistry) {
        let db = registry.db();

        if pane == BrowserPane::Genre {
            let query = self.query_before(BrowserPane::Artist);
            self.artists = PropPane::new(registry.library_prop_store(db.query(query), PropKind::Artist));
        }
        if matches!(pane, BrowserPane::Genre | BrowserPane::Artist) {
            let query = self.query_before(BrowserPane::Album);
            self.albums = PropPane::new(registry.library_prop_store(db.query(query), PropKind::Album));
        }

        let query = self.query_before(BrowserPane::Track);
        self.tracks = registry.library_list_store(db.query(query));
        self.track_cursor.reset();
    }

    pub(crate) fn selected_track(&mut self) -> Option<TrackData> {
        let iter = self.track_cursor.iter(&*self.tracks)?;
        self.tracks.source().result().row(iter.row()?)
    }
}
