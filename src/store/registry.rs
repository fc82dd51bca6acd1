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

//! The store registry.
//!
//! The registry owns the catalog store and one playlist store per catalog
//! entry, and keeps weak attachments to the library stores views create
//! through it. It is built once at startup and torn down once at shutdown;
//! the [`MutationBridge`](crate::bridge::MutationBridge) keeps it in step
//! with the backend.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
    sync::Arc,
};

use log::debug;

use crate::{
    db::{
        Db,
        query::{QueryId, QueryResult},
        sequence::{SeqRef, SequenceHandle},
    },
    model::PropKind,
    player::Playback,
    projection::{TemplateError, TitleTemplate},
    store::{
        CatalogSource, CatalogStore, LibraryListStore, LibraryPropStore, LibrarySource,
        PlaylistSource, PlaylistStore, TreeModel,
    },
};

pub struct StoreRegistry {
    db: Arc<Db>,
    playback: Playback,
    template: Rc<RefCell<TitleTemplate>>,
    catalog: RefCell<Option<Rc<CatalogStore>>>,
    playlists: RefCell<HashMap<SeqRef, Rc<PlaylistStore>>>,
    library_lists: RefCell<Vec<Weak<LibraryListStore>>>,
    library_props: RefCell<Vec<Weak<LibraryPropStore>>>,
}

impl StoreRegistry {
    /// Builds the catalog store and a playlist store for every catalog entry
    /// already in `db`.
    pub fn new(db: Arc<Db>, playback: Playback) -> Self {
        let catalog = Rc::new(CatalogStore::new(CatalogSource::new(
            db.clone(),
            playback.clone(),
        )));
        let registry = Self {
            db,
            playback,
            template: Rc::new(RefCell::new(TitleTemplate::default())),
            catalog: RefCell::new(Some(catalog.clone())),
            playlists: RefCell::new(HashMap::new()),
            library_lists: RefCell::new(Vec::new()),
            library_props: RefCell::new(Vec::new()),
        };

        let mut row = catalog.source().begin();
        while let Some(current) = row {
            registry.provision(current);
            row = catalog.source().next(current);
        }
        registry
    }

    pub fn db(&self) -> &Arc<Db> {
        &self.db
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// The catalog store, or `None` after [`teardown`](Self::teardown).
    pub fn catalog_store(&self) -> Option<Rc<CatalogStore>> {
        self.catalog.borrow().clone()
    }

    pub fn playlist_store(&self, catalog: SeqRef) -> Option<Rc<PlaylistStore>> {
        self.playlists.borrow().get(&catalog).cloned()
    }

    /// The catalog entry a playlist store belongs to.
    pub fn catalog_of(&self, store: &PlaylistStore) -> SeqRef {
        store.source().catalog()
    }

    pub fn playlist_count(&self) -> usize {
        self.playlists.borrow().len()
    }

    /// Creates the playlist store for `catalog` unless one exists already.
    pub(crate) fn provision(&self, catalog: SeqRef) -> Rc<PlaylistStore> {
        if let Some(store) = self.playlist_store(catalog) {
            return store;
        }
        let store = Rc::new(PlaylistStore::new(PlaylistSource::new(
            self.db.clone(),
            catalog,
            self.template.clone(),
            self.playback.clone(),
        )));
        self.playlists.borrow_mut().insert(catalog, store.clone());
        debug!("playlist store provisioned for catalog entry {}", catalog.id());
        store
    }

    /// Drops the registry's reference to the playlist store of `catalog`.
    pub(crate) fn release(&self, catalog: SeqRef) -> bool {
        let released = self.playlists.borrow_mut().remove(&catalog).is_some();
        if released {
            debug!("playlist store released for catalog entry {}", catalog.id());
        }
        released
    }

    /// Creates a track list over `result` and attaches it for notifications.
    pub fn library_list_store(&self, result: Arc<QueryResult>) -> Rc<LibraryListStore> {
        let store = Rc::new(LibraryListStore::new(LibrarySource::new(
            result,
            self.playback.clone(),
        )));
        let mut lists = self.library_lists.borrow_mut();
        lists.retain(|s| s.strong_count() > 0);
        lists.push(Rc::downgrade(&store));
        store
    }

    /// Creates a property list over `result` and attaches it for
    /// notifications.
    pub fn library_prop_store(
        &self,
        result: Arc<QueryResult>,
        kind: PropKind,
    ) -> Rc<LibraryPropStore> {
        let store = Rc::new(LibraryPropStore::new(result, kind));
        let mut props = self.library_props.borrow_mut();
        props.retain(|s| s.strong_count() > 0);
        props.push(Rc::downgrade(&store));
        store
    }

    pub(crate) fn library_lists_for(&self, query: QueryId) -> Vec<Rc<LibraryListStore>> {
        self.library_lists
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.source().result().id() == query)
            .collect()
    }

    pub(crate) fn library_props_for(
        &self,
        query: QueryId,
        kind: PropKind,
    ) -> Vec<Rc<LibraryPropStore>> {
        self.library_props
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.base().id() == query && s.kind() == kind)
            .collect()
    }

    pub fn title_format(&self) -> String {
        self.template.borrow().as_str().to_string()
    }

    /// Replaces the formatted-title template of every playlist store.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingTitleToken`] if `format` lacks
    /// `%TITLE%`; the current template stays active.
    pub fn set_title_format(&self, format: &str) -> Result<(), TemplateError> {
        let template = TitleTemplate::new(format)?;
        *self.template.borrow_mut() = template;
        for store in self.playlist_stores() {
            store.refresh();
        }
        Ok(())
    }

    /// Asks every store to redraw, e.g. after the playback state changed.
    pub fn refresh_all(&self) {
        if let Some(catalog) = self.catalog_store() {
            catalog.refresh();
        }
        for store in self.playlist_stores() {
            store.refresh();
        }
        let lists: Vec<_> = self
            .library_lists
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for store in lists {
            store.refresh();
        }
        let props: Vec<_> = self
            .library_props
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for store in props {
            store.refresh();
        }
    }

    /// Releases every store. Safe to call more than once.
    pub fn teardown(&self) {
        let catalog = self.catalog.borrow_mut().take();
        let playlists = std::mem::take(&mut *self.playlists.borrow_mut());
        self.library_lists.borrow_mut().clear();
        self.library_props.borrow_mut().clear();
        if catalog.is_some() {
            debug!("store registry torn down, {} playlist stores released", playlists.len());
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.catalog.borrow().is_none()
    }

    // Collected first so that handlers may call back into the registry.
    fn playlist_stores(&self) -> Vec<Rc<PlaylistStore>> {
        self.playlists.borrow().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::Query;

    #[test]
    fn existing_catalog_entries_get_stores() {
        let db = Arc::new(Db::new(|_| {}));
        let a = db.catalog_add("A");
        let b = db.catalog_add("B");
        let registry = StoreRegistry::new(db, Playback::new());

        assert_eq!(registry.playlist_count(), 2);
        let store = registry.playlist_store(b).unwrap();
        assert_eq!(registry.catalog_of(&store), b);
        assert!(registry.playlist_store(a).is_some());
    }

    #[test]
    fn provisioning_twice_returns_the_same_store() {
        let db = Arc::new(Db::new(|_| {}));
        let a = db.catalog_add("A");
        let registry = StoreRegistry::new(db, Playback::new());

        let first = registry.provision(a);
        let second = registry.provision(a);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(registry.playlist_count(), 1);
    }

    #[test]
    fn rejected_title_format_keeps_the_previous_one() {
        let registry = StoreRegistry::new(Arc::new(Db::new(|_| {})), Playback::new());

        registry.set_title_format("%ARTIST% - %TITLE%").unwrap();
        assert!(registry.set_title_format("%ARTIST%").is_err());
        assert_eq!(registry.title_format(), "%ARTIST% - %TITLE%");
    }

    #[test]
    fn library_stores_are_held_weakly() {
        let db = Arc::new(Db::new(|_| {}));
        let registry = StoreRegistry::new(db.clone(), Playback::new());
        let result = db.query(Query::all());
        let id = result.id();

        let list = registry.library_list_store(result.clone());
        let props = registry.library_prop_store(result, PropKind::Artist);
        assert_eq!(registry.library_lists_for(id).len(), 1);
        assert_eq!(registry.library_props_for(id, PropKind::Artist).len(), 1);
        assert!(registry.library_props_for(id, PropKind::Genre).is_empty());

        drop(list);
        drop(props);
        assert!(registry.library_lists_for(id).is_empty());
        assert!(registry.library_props_for(id, PropKind::Artist).is_empty());
    }

    #[test]
    fn teardown_is_idempotent() {
        let db = Arc::new(Db::new(|_| {}));
        db.catalog_add("A");
        let registry = StoreRegistry::new(db, Playback::new());

        registry.teardown();
        registry.teardown();

        assert!(registry.is_torn_down());
        assert!(registry.catalog_store().is_none());
        assert_eq!(registry.playlist_count(), 0);
    }
}
