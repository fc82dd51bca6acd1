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

//! Selection cursors over view models.
//!
//! A cursor remembers the selected row by handle rather than by position, so
//! the selection follows its row when rows are inserted, deleted or moved
//! around it. When the selected row itself disappears the cursor falls back
//! to the position it was last seen at.

use trackview::store::{TreeIter, TreeModel};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Cursor {
    iter: Option<TreeIter>,
    last: usize,
}

impl Cursor {
    /// The live position of the selected row, reselecting if it is gone.
    pub(crate) fn position(&mut self, model: &dyn TreeModel) -> Option<usize> {
        if let Some(position) = self.iter.and_then(|iter| model.path_of(&iter)) {
            self.last = position;
            return Some(position);
        }

        let len = model.len();
        if len == 0 {
            self.iter = None;
            return None;
        }
        let position = self.last.min(len - 1);
        self.iter = model.iterator_at(position);
        self.last = position;
        self.iter.map(|_| position)
    }

    pub(crate) fn iter(&mut self, model: &dyn TreeModel) -> Option<TreeIter> {
        self.position(model)?;
        self.iter
    }

    pub(crate) fn next(&mut self, model: &dyn TreeModel) {
        let Some(mut iter) = self.iter(model) else {
            return;
        };
        if !model.iter_next(&mut iter) {
            iter = match model.iterator_at(0) {
                Some(first) => first,
                None => return,
            };
        }
        self.select(model, iter);
    }

    pub(crate) fn previous(&mut self, model: &dyn TreeModel) {
        let Some(mut iter) = self.iter(model) else {
            return;
        };
        if !model.iter_prev(&mut iter) {
            iter = match model.iterator_at(model.len().saturating_sub(1)) {
                Some(last) => last,
                None => return,
            };
        }
        self.select(model, iter);
    }

    pub(crate) fn select(&mut self, model: &dyn TreeModel, iter: TreeIter) {
        self.iter = Some(iter);
        if let Some(position) = model.path_of(&iter) {
            self.last = position;
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trackview::{
        db::Db,
        player::Playback,
        store::{CatalogSource, CatalogStore},
    };

    use super::*;

    fn catalog(names: &[&str]) -> (Arc<Db>, CatalogStore) {
        let db = Arc::new(Db::new(|_| {}));
        for name in names {
            db.catalog_add(name);
        }
        let store = CatalogStore::new(CatalogSource::new(db.clone(), Playback::new()));
        (db, store)
    }

    #[test]
    fn selection_follows_its_row() {
        let (db, store) = catalog(&["a", "b", "c"]);
        let mut cursor = Cursor::default();
        cursor.next(&store);
        assert_eq!(cursor.position(&store), Some(1));

        db.catalog_reorder(&[1, 2, 0]).unwrap();

        assert_eq!(cursor.position(&store), Some(0));
    }

    #[test]
    fn deleted_selection_falls_back_to_its_position() {
        let (db, store) = catalog(&["a", "b", "c"]);
        let mut cursor = Cursor::default();
        cursor.previous(&store);
        assert_eq!(cursor.position(&store), Some(2));

        let row = cursor.iter(&store).and_then(|i| i.row()).unwrap();
        db.catalog_delete(row).unwrap();

        assert_eq!(cursor.position(&store), Some(1));
    }

    #[test]
    fn movement_wraps_around() {
        let (_db, store) = catalog(&["a", "b"]);
        let mut cursor = Cursor::default();
        cursor.next(&store);
        cursor.next(&store);
        assert_eq!(cursor.position(&store), Some(0));
    }

    #[test]
    fn empty_model_has_no_selection() {
        let (_db, store) = catalog(&[]);
        let mut cursor = Cursor::default();
        cursor.next(&store);
        assert_eq!(cursor.position(&store), None);
    }
}
