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

//! Translation of backend change notifications into view-model events.
//!
//! The bridge runs on the UI thread. Backend notifications reach it through
//! a FIFO hand-off from whichever thread mutated the backend, and are
//! dispatched in arrival order to the stores of the [`StoreRegistry`].
//!
//! Positions are resolved from the backend at dispatch time. Catalog
//! additions provision the playlist store before the insertion is announced,
//! and catalog deletions release it before the deletion is announced, so a
//! handler reacting to either event always sees a registry that agrees with
//! it.

use std::rc::Rc;

use log::{debug, warn};

use crate::{
    db::{
        DbEvent, RowEvent,
        query::PropertySource,
        sequence::{SeqRef, SequenceHandle},
    },
    store::{ListStore, ModelEvent, PropertyStore, RowSource, StoreRegistry},
};

pub struct MutationBridge {
    registry: Rc<StoreRegistry>,
}

impl MutationBridge {
    pub fn new(registry: Rc<StoreRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Rc<StoreRegistry> {
        &self.registry
    }

    pub fn dispatch(&self, event: &DbEvent) {
        match event {
            DbEvent::Catalog(event) => self.catalog_event(event),
            DbEvent::Playlist { catalog, event } => {
                let Some(store) = self.registry.playlist_store(*catalog) else {
                    warn!(
                        "dropping {event:?} for catalog entry {} without a playlist store",
                        catalog.id()
                    );
                    return;
                };
                translate_rows(&store, event);
            }
            DbEvent::QueryRows { query, event } => {
                for store in self.registry.library_lists_for(*query) {
                    translate_rows(&store, event);
                }
            }
            DbEvent::QueryProps { query, kind, event } => {
                for store in self.registry.library_props_for(*query, *kind) {
                    translate_props(&store, event);
                }
            }
        }
    }

    fn catalog_event(&self, event: &RowEvent) {
        let Some(catalog) = self.registry.catalog_store() else {
            debug!("registry torn down, ignoring catalog {event:?}");
            return;
        };

        match event {
            RowEvent::Added(row) => {
                self.registry.provision(*row);
            }
            RowEvent::Deleted { row, .. } => {
                self.registry.release(*row);
            }
            RowEvent::Changed(_) | RowEvent::Reordered(_) => {}
        }
        translate_rows(&catalog, event);
    }
}

fn live_position<S: SequenceHandle>(source: &S, row: SeqRef, event: &RowEvent) -> Option<usize> {
    let position = source.position_of(row);
    if position.is_none() {
        warn!("row {} already gone when {event:?} arrived", row.id());
    }
    position
}

fn translate_rows<S: RowSource>(store: &ListStore<S>, event: &RowEvent) {
    let model_event = match event {
        RowEvent::Added(row) => {
            let Some(position) = live_position(store.source(), *row, event) else {
                return;
            };
            ModelEvent::Inserted {
                position,
                iter: store.iter_of(*row),
            }
        }
        RowEvent::Changed(row) => {
            let Some(position) = live_position(store.source(), *row, event) else {
                return;
            };
            ModelEvent::Changed {
                position,
                iter: store.iter_of(*row),
            }
        }
        RowEvent::Deleted { position, .. } => ModelEvent::Deleted {
            position: *position,
        },
        RowEvent::Reordered(new_order) => ModelEvent::Reordered {
            new_order: new_order.clone(),
        },
    };
    store.emit(&model_event);
}

// Concrete entries sit one below their backend position, and every change to
// them alters the aggregate row's total.
fn translate_props<P: PropertySource>(store: &PropertyStore<P>, event: &RowEvent) {
    let kind = store.kind();
    let position_of = |row: SeqRef| {
        let position = store.base().prop_position_of(kind, row);
        if position.is_none() {
            warn!("{kind:?} entry {} already gone when {event:?} arrived", row.id());
        }
        position.map(|p| p + 1)
    };

    let model_event = match event {
        RowEvent::Added(row) => {
            let Some(position) = position_of(*row) else {
                return;
            };
            ModelEvent::Inserted {
                position,
                iter: store.iter_of(*row),
            }
        }
        RowEvent::Changed(row) => {
            let Some(position) = position_of(*row) else {
                return;
            };
            ModelEvent::Changed {
                position,
                iter: store.iter_of(*row),
            }
        }
        RowEvent::Deleted { position, .. } => ModelEvent::Deleted {
            position: position + 1,
        },
        RowEvent::Reordered(new_order) => {
            let new_order = std::iter::once(0)
                .chain(new_order.iter().map(|p| p + 1))
                .collect();
            store.emit(&ModelEvent::Reordered { new_order });
            return;
        }
    };

    store.emit(&model_event);
    store.emit(&ModelEvent::Changed {
        position: 0,
        iter: store.synthetic_iter(),
    });
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        db::{Db, query::Query},
        model::{PropKind, TrackData},
        player::Playback,
        store::TreeModel,
    };

    type Queue = Arc<Mutex<Vec<DbEvent>>>;

    fn setup() -> (Arc<Db>, Queue, MutationBridge) {
        let queue: Queue = Arc::default();
        let sink = queue.clone();
        let db = Arc::new(Db::new(move |e| sink.lock().unwrap().push(e)));
        let registry = Rc::new(StoreRegistry::new(db.clone(), Playback::new()));
        (db, queue, MutationBridge::new(registry))
    }

    fn pump(queue: &Queue, bridge: &MutationBridge) {
        let events = std::mem::take(&mut *queue.lock().unwrap());
        for event in &events {
            bridge.dispatch(event);
        }
    }

    fn record(model: &dyn TreeModel) -> Rc<RefCell<Vec<ModelEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        model.subscribe(Box::new(move |e: &ModelEvent| log.borrow_mut().push(e.clone())));
        seen
    }

    #[test]
    fn added_catalog_entry_is_resolvable_from_the_insert_handler() {
        let (db, queue, bridge) = setup();
        let catalog = bridge.registry().catalog_store().unwrap();
        let registry = bridge.registry().clone();
        let resolved = Rc::new(RefCell::new(None));

        let found = resolved.clone();
        catalog.subscribe(Box::new(move |e: &ModelEvent| {
            if let ModelEvent::Inserted { iter, .. } = e {
                let row = iter.row().unwrap();
                *found.borrow_mut() = Some(registry.playlist_store(row).is_some());
            }
        }));

        db.catalog_add("New");
        pump(&queue, &bridge);

        assert_eq!(*resolved.borrow(), Some(true));
    }

    #[test]
    fn playlist_events_carry_live_positions() {
        let (db, queue, bridge) = setup();
        let p = db.catalog_add("P");
        pump(&queue, &bridge);
        let store = bridge.registry().playlist_store(p).unwrap();
        let seen = record(&*store);

        let rows = db
            .playlist_insert(p, None, vec![TrackData::new("a"), TrackData::new("b")])
            .unwrap();
        pump(&queue, &bridge);
        db.playlist_update(p, rows[1], TrackData::new("b2")).unwrap();
        pump(&queue, &bridge);
        db.playlist_reorder(p, &[1, 0]).unwrap();
        pump(&queue, &bridge);
        db.playlist_delete(p, rows[0]).unwrap();
        pump(&queue, &bridge);

        assert_eq!(
            *seen.borrow(),
            vec![
                ModelEvent::Inserted {
                    position: 0,
                    iter: store.iter_of(rows[0])
                },
                ModelEvent::Inserted {
                    position: 1,
                    iter: store.iter_of(rows[1])
                },
                ModelEvent::Changed {
                    position: 1,
                    iter: store.iter_of(rows[1])
                },
                ModelEvent::Reordered {
                    new_order: vec![1, 0]
                },
                ModelEvent::Deleted { position: 1 },
            ]
        );
    }

    #[test]
    fn events_for_dead_rows_are_skipped() {
        let (db, queue, bridge) = setup();
        let p = db.catalog_add("P");
        pump(&queue, &bridge);
        let store = bridge.registry().playlist_store(p).unwrap();
        let seen = record(&*store);

        let rows = db.playlist_insert(p, None, vec![TrackData::new("a")]).unwrap();
        db.playlist_delete(p, rows[0]).unwrap();
        pump(&queue, &bridge);

        assert_eq!(*seen.borrow(), vec![ModelEvent::Deleted { position: 0 }]);
    }

    #[test]
    fn property_events_are_offset_and_touch_the_aggregate() {
        let (db, queue, bridge) = setup();
        let result = db.query(Query::all());
        let props = bridge
            .registry()
            .library_prop_store(result.clone(), PropKind::Genre);
        let seen = record(&*props);

        db.library_add(TrackData::new("a").with_genre("Rock"));
        pump(&queue, &bridge);
        db.library_add(TrackData::new("b").with_genre("Jazz"));
        pump(&queue, &bridge);
        db.library_remove("a");
        pump(&queue, &bridge);

        let all = props.synthetic_iter();
        let jazz = props.iterator_at(1).unwrap();
        let events = seen.borrow();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[2..],
            [
                ModelEvent::Inserted {
                    position: 1,
                    iter: jazz
                },
                ModelEvent::Changed {
                    position: 0,
                    iter: all
                },
                ModelEvent::Deleted { position: 2 },
                ModelEvent::Changed {
                    position: 0,
                    iter: all
                },
            ]
        );
    }

    #[test]
    fn property_reorder_keeps_the_aggregate_first() {
        let (db, _queue, bridge) = setup();
        let result = db.query(Query::all());
        let props = bridge.registry().library_prop_store(result, PropKind::Album);
        let seen = record(&*props);

        translate_props(&props, &RowEvent::Reordered(vec![1, 0]));

        assert_eq!(
            *seen.borrow(),
            vec![ModelEvent::Reordered {
                new_order: vec![0, 2, 1]
            }]
        );
    }
}
