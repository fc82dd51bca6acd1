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

//! Render the playlists view: the catalog beside the selected playlist.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{List, ListItem, ListState},
};
use trackview::store::{CatalogColumn, Column, PlaylistColumn};

use crate::{
    App,
    playlists::PlaylistsPane,
    render::{draw_track_table, pane_block, rows, text},
};

pub(crate) fn draw_playlists(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(area);

    let theme = app.theme;
    let view = &mut app.playlists;

    if let Some(catalog) = app.registry.catalog_store() {
        let items: Vec<ListItem> = rows(&*catalog, |iter| {
            let state = text(&*catalog, iter, CatalogColumn::State);
            let name = text(&*catalog, iter, CatalogColumn::Name);
            ListItem::new(format!("{state:1} {name}"))
        });

        let list = List::new(items)
            .block(pane_block(
                " Playlists ",
                view.active_pane == PlaylistsPane::Catalog,
                &theme,
            ))
            .highlight_style(Style::default().bg(theme.highlight_bg).fg(Color::White))
            .highlight_symbol(">> ");

        let mut state = ListState::default().with_selected(view.catalog_cursor.position(&*catalog));
        f.render_stateful_widget(list, chunks[0], &mut state);
    }

    let block = pane_block(" Tracks ", view.active_pane == PlaylistsPane::Tracks, &theme);
    match view.playlist(&app.registry) {
        Some(store) => {
            let selected = view.track_cursor.position(&*store);
            draw_track_table(f, chunks[1], &*store, PlaylistColumn::index, selected, block, &theme);
        }
        None => f.render_widget(block, chunks[1]),
    }
}
