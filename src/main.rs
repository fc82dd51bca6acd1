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

//! # Track View TUI.
//!
//! A terminal playlist manager and library browser over the `trackview`
//! view models.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns every store, manages the terminal lifecycle and
//!   renders the UI.
//! * A **Task Worker** applies backend mutations off the UI thread. The
//!   backend reports each change through its notifier, which posts it back
//!   to the main thread's event queue.
//! * **Event Loops** capture user input and system ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.

mod browser;
mod config;
mod cursor;
mod events;
mod playlists;
mod render;
mod tasks;
mod theme;

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{LevelFilter, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self},
    rc::Rc,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};
use trackview::{bridge::MutationBridge, db::Db, player::Playback, store::StoreRegistry};

use crate::{
    browser::LibraryBrowser,
    config::AppConfig,
    events::{AppEvent, process_events},
    playlists::PlaylistsView,
    tasks::AppTask,
    theme::Theme,
};

#[derive(Clone, Copy, Debug, PartialEq)]
enum MainView {
    Playlists,
    Library,
}

/// Application state.
struct App {
    pub config: AppConfig,

    pub theme: Theme,
    pub main_view: MainView,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub task_tx: Sender<AppTask>,

    pub registry: Rc<StoreRegistry>,
    pub bridge: MutationBridge,

    pub playlists: PlaylistsView,
    pub library: LibraryBrowser,

    pub status: Option<String>,
    pub playlist_counter: usize,
}

impl App {
    /// Create a new instance of application state.
    ///
    /// Every backend notification is posted to the event queue, so the
    /// stores only ever change on the thread that runs [`process_events`].
    pub fn new(config: AppConfig, task_tx: Sender<AppTask>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let db_event_tx = event_tx.clone();
        let db = Arc::new(Db::new(move |e| {
            let _ = db_event_tx.send(AppEvent::Db(e));
        }));

        let registry = Rc::new(StoreRegistry::new(db, Playback::new()));
        if let Err(e) = registry.set_title_format(&config.title_format) {
            warn!("Ignoring title format {:?}: {e}", config.title_format);
        }

        let library = LibraryBrowser::new(&registry);

        Self {
            config,
            theme: Theme::default(),
            main_view: MainView::Playlists,
            event_tx,
            event_rx,
            task_tx,
            bridge: MutationBridge::new(registry.clone()),
            registry,
            playlists: PlaylistsView::default(),
            library,
            status: None,
            playlist_counter: 0,
        }
    }
}

/// The entry point of the application.
///
/// Sets up the communication channels, initializes the application state,
/// manages the terminal lifecycle, and returns an error if any part of the
/// execution fails.
fn main() -> Result<()> {
    let mut clog = colog::default_builder();
    clog.filter(None, LevelFilter::Warn);
    clog.parse_default_env();
    clog.init();

    let config = config::load_config();

    let (task_tx, task_rx) = mpsc::channel();

    let mut app = App::new(config, task_tx);

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut app, task_rx);
    restore_terminal(&mut terminal);

    app.registry.teardown();
    info!("Stores torn down");

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This function is best-effort and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
}

/// Starts the application's background workers and enters the main event loop.
///
/// This function spawns several long-running background threads:
/// * A task worker to apply [`AppTask`]s to the backend.
/// * An input thread to poll for system keyboard events.
/// * A tick thread to trigger periodic UI refreshes.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: Receiver<AppTask>,
) -> Result<()> {
    tasks::spawn_task_worker(
        &app.config,
        app.registry.db().clone(),
        task_rx,
        app.event_tx.clone(),
    );

    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read() {
                tx_keys.send(AppEvent::Key(key)).ok();
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this is
    // effectively the minimum "frame rate" for rendering the TUI application.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            let _ = tx_tick.send(AppEvent::Tick);
            thread::sleep(Duration::from_millis(250));
        }
    });

    if !app.config.media_dirs.is_empty() {
        app.task_tx.send(AppTask::ImportLibrary)?;
    }

    process_events(terminal, app)
}
