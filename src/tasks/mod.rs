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

//! Background application task processing.
//!
//! This module offloads backend mutations from the UI thread. A dedicated
//! worker loop applies each [`AppTask`] to the [`Db`]; the database reports
//! the resulting changes through its notifier, which feeds them back to the
//! UI thread's event queue in order.
//!
//! Only actions that mutate the backend, or may take more than a trivial
//! amount of time to process, should be implemented as tasks.

pub(crate) mod scan;

use std::{
    path::Path,
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    thread,
};

use anyhow::{Context, Result};
use log::info;
use trackview::db::{Db, sequence::SeqRef};

use crate::{config::AppConfig, events::AppEvent};

#[derive(Debug)]
pub(crate) enum AppTask {
    /// Scan the configured media directories into the library and the
    /// import playlist.
    ImportLibrary,
    CreatePlaylist(String),
    DeleteCatalog(SeqRef),
    DeleteTrack { catalog: SeqRef, row: SeqRef },
    MoveTrack { catalog: SeqRef, row: SeqRef, to: usize },
}

/// Spawns a background thread to process application tasks.
///
/// # Arguments
///
/// * `config` - The application configuration.
/// * `db` - The database the tasks mutate.
/// * `task_rx` - The receiving end of the task channel.
/// * `event_tx` - The sending end of the channel for reporting results.
pub(crate) fn spawn_task_worker(
    config: &AppConfig,
    db: Arc<Db>,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) {
    let config = config.clone();

    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let ctx = TaskContext {
                config: &config,
                db: &db,
                event_tx: &event_tx,
            };

            if let Err(e) = handle_task(task, &ctx) {
                let _ = event_tx.send(AppEvent::Error(format!("{e:#}")));
            }
        }
    });
}

/// Bundles shared resources required by task handlers.
struct TaskContext<'a> {
    config: &'a AppConfig,
    db: &'a Db,
    event_tx: &'a Sender<AppEvent>,
}

fn handle_task(task: AppTask, ctx: &TaskContext) -> Result<()> {
    match task {
        AppTask::ImportLibrary => import_library(ctx),
        AppTask::CreatePlaylist(name) => {
            ctx.db.catalog_add(&name);
            Ok(())
        }
        AppTask::DeleteCatalog(catalog) => {
            let data = ctx.db.catalog_delete(catalog)?;
            ctx.event_tx
                .send(AppEvent::Status(format!("Deleted playlist {}", data.name)))?;
            Ok(())
        }
        AppTask::DeleteTrack { catalog, row } => {
            ctx.db
                .playlist_delete(catalog, row)
                .context("Failed to delete track")?;
            Ok(())
        }
        AppTask::MoveTrack { catalog, row, to } => ctx
            .db
            .playlist_move(catalog, row, to)
            .context("Failed to move track"),
    }
}

fn import_library(ctx: &TaskContext) -> Result<()> {
    let name = &ctx.config.import_playlist_name;
    let playlist = match ctx.db.catalog_find(name) {
        Some(playlist) => playlist,
        None => ctx.db.catalog_add(name),
    };

    let mut imported = 0;
    for dir in &ctx.config.media_dirs {
        ctx.event_tx
            .send(AppEvent::Status(format!("Importing {dir}")))?;

        let mut tracks = Vec::new();
        for path in scan::collect_media(Path::new(dir), ctx.config) {
            let Some(track) = scan::read_track(&path) else {
                continue;
            };
            if ctx.db.library_add(track.clone()) {
                tracks.push(track);
            }
        }

        imported += tracks.len();
        ctx.db
            .playlist_insert(playlist, None, tracks)
            .with_context(|| format!("Failed to fill playlist {name}"))?;
    }

    info!("import finished, {imported} new tracks");
    ctx.event_tx
        .send(AppEvent::Status(format!("Imported {imported} new tracks")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::mpsc};

    use trackview::db::sequence::SequenceHandle;

    use super::*;

    #[test]
    fn import_fills_library_and_playlist_once() {
        let root = std::env::temp_dir().join(format!("trackview-import-{}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("one.ogg"), b"").unwrap();
        fs::write(root.join("two.ogg"), b"").unwrap();

        let config = AppConfig {
            media_dirs: vec![root.display().to_string()],
            ..AppConfig::default()
        };
        let db = Db::new(|_| {});
        let (event_tx, _event_rx) = mpsc::channel();
        let ctx = TaskContext {
            config: &config,
            db: &db,
            event_tx: &event_tx,
        };

        handle_task(AppTask::ImportLibrary, &ctx).unwrap();
        handle_task(AppTask::ImportLibrary, &ctx).unwrap();
        fs::remove_dir_all(&root).unwrap();

        let playlist = db.catalog_find("Imported").unwrap();
        assert_eq!(db.library_len(), 2);
        assert_eq!(db.with_playlist(playlist, |t| t.len()), Some(2));
    }

    #[test]
    fn failing_task_reports_an_error() {
        let config = AppConfig::default();
        let db = Db::new(|_| {});
        let playlist = db.catalog_add("P");
        db.catalog_delete(playlist).unwrap();
        let (event_tx, _event_rx) = mpsc::channel();
        let ctx = TaskContext {
            config: &config,
            db: &db,
            event_tx: &event_tx,
        };

        assert!(handle_task(AppTask::DeleteCatalog(playlist), &ctx).is_err());
    }
}
