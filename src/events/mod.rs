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

//! Application events and the main event loop.
//!
//! Every input reaches the UI thread as an [`AppEvent`] on a single channel:
//! key presses, ticks, task results and the backend change notifications
//! raised by the [`Db`](trackview::db::Db) notifier. Backend notifications
//! are handed to the [`MutationBridge`](trackview::bridge::MutationBridge)
//! in the order they were raised.

mod key_handlers;
use key_handlers::process_key_event;

use std::io::Stdout;

use anyhow::Result;
use crossterm::event::KeyEvent;
use log::error;
use ratatui::{Terminal, prelude::CrosstermBackend};
use trackview::db::DbEvent;

use crate::{App, render::draw};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    /// A backend change, raised on whichever thread made the mutation.
    Db(DbEvent),

    Tick,

    Status(String),
    Error(String),

    ExitApplication,
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::Key(key) => process_key_event(app, key)?,
            AppEvent::Db(db_event) => {
                app.bridge.dispatch(&db_event);
                app.library.prune_selection(&app.registry);
            }
            AppEvent::Status(status) => app.status = Some(status),
            AppEvent::Error(message) => {
                error!("{message}");
                app.status = Some(format!("Error: {message}"));
            }
            AppEvent::Tick => {}
        }

        terminal.draw(|f| draw(f, app))?;
    }
    Ok(())
}
