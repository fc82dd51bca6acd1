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

//! Keyboard input routing.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use trackview::player::PlayReference;

use crate::{
    App, MainView, browser::BrowserPane, events::AppEvent, playlists::PlaylistsPane,
    tasks::AppTask,
};

/// Maps keyboard input to view navigation, playback and backend tasks.
///
/// Navigation and selection act on the stores directly. Anything that
/// mutates the backend is sent to the task worker, and the stores catch up
/// when the resulting [`AppEvent::Db`] notifications arrive.
///
/// # Errors
///
/// Returns an error if a task or event fails to send.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,

        KeyCode::Char('1') => app.main_view = MainView::Playlists,
        KeyCode::Char('2') => app.main_view = MainView::Library,

        KeyCode::Char('i') => app.task_tx.send(AppTask::ImportLibrary)?,
        KeyCode::Char('n') => {
            app.playlist_counter += 1;
            let name = format!("Playlist {}", app.playlist_counter);
            app.task_tx.send(AppTask::CreatePlaylist(name))?;
        }

        KeyCode::Char('p') => {
            app.registry.playback().toggle_pause();
            app.registry.refresh_all();
        }

        _ => match app.main_view {
            MainView::Playlists => process_playlists_key(app, key)?,
            MainView::Library => process_library_key(app, key),
        },
    }

    Ok(())
}

fn process_playlists_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let registry = &app.registry;
    let view = &mut app.playlists;

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => view.next(registry),
        KeyCode::Char('k') | KeyCode::Up => view.previous(registry),
        KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            view.toggle_pane()
        }

        KeyCode::Enter => match view.active_pane {
            PlaylistsPane::Catalog => view.toggle_pane(),
            PlaylistsPane::Tracks => {
                if let Some((catalog, row, _)) = view.selected_track(registry) {
                    registry.playback().play(PlayReference::Playlist { catalog, row });
                    registry.refresh_all();
                }
            }
        },

        KeyCode::Char('d') => match view.active_pane {
            PlaylistsPane::Catalog => {
                if let Some(catalog) = registry
                    .catalog_store()
                    .and_then(|store| view.selected_catalog(&store))
                {
                    app.task_tx.send(AppTask::DeleteCatalog(catalog))?;
                }
            }
            PlaylistsPane::Tracks => {
                if let Some((catalog, row, _)) = view.selected_track(registry) {
                    app.task_tx.send(AppTask::DeleteTrack { catalog, row })?;
                }
            }
        },

        KeyCode::Char('J') | KeyCode::Char('K') if view.active_pane == PlaylistsPane::Tracks => {
            let last = view.active_len(registry).saturating_sub(1);
            if let Some((catalog, row, position)) = view.selected_track(registry) {
                let to = if key.code == KeyCode::Char('J') {
                    (position + 1).min(last)
                } else {
                    position.saturating_sub(1)
                };
                if to != position {
                    app.task_tx.send(AppTask::MoveTrack { catalog, row, to })?;
                }
            }
        }

        _ => {}
    }

    Ok(())
}

fn process_library_key(app: &mut App, key: KeyEvent) {
    let registry = &app.registry;
    let browser = &mut app.library;

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => browser.next(),
        KeyCode::Char('k') | KeyCode::Up => browser.previous(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => browser.previous_pane(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => browser.next_pane(),

        KeyCode::Char(' ') => browser.toggle_selection(registry),

        KeyCode::Enter => match browser.active_pane {
            BrowserPane::Track => {
                if let Some(track) = browser.selected_track() {
                    registry.playback().play(PlayReference::Library { uri: track.uri });
                    registry.refresh_all();
                }
            }
            _ => browser.select_only(registry),
        },

        _ => {}
    }
}
