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

//! Render the library browser: genre, artist and album panes over the
//! matching tracks.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};
use trackview::store::{Column, LibraryColumn, PlaylistColumn, PropColumn};

use crate::{
    App,
    browser::{BrowserPane, PropPane},
    render::{draw_track_table, pane_block, rows, text},
    theme::Theme,
};

pub(crate) fn draw_browser(f: &mut Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(columns[0]);

    let theme = app.theme;
    let browser = &mut app.library;
    let active = browser.active_pane;

    draw_prop_pane(f, panes[0], " Genres ", &mut browser.genres, active == BrowserPane::Genre, &theme);
    draw_prop_pane(f, panes[1], " Artists ", &mut browser.artists, active == BrowserPane::Artist, &theme);
    draw_prop_pane(f, panes[2], " Albums ", &mut browser.albums, active == BrowserPane::Album, &theme);

    let tracks = browser.tracks.clone();
    let selected = browser.track_cursor.position(&*tracks);
    let block = pane_block(" Tracks ", active == BrowserPane::Track, &theme);
    draw_track_table(f, columns[1], &*tracks, library_column, selected, block, &theme);
}

// Library columns repeat the playlist columns in the same order.
fn library_column(column: PlaylistColumn) -> usize {
    LibraryColumn::ALL
        .get(column.index())
        .copied()
        .unwrap_or(LibraryColumn::Title)
        .index()
}

fn draw_prop_pane(
    f: &mut Frame,
    area: Rect,
    title: &str,
    pane: &mut PropPane,
    is_active: bool,
    theme: &Theme,
) {
    let store = pane.store.clone();
    let items: Vec<ListItem> = rows(&*store, |iter| {
        let name = text(&*store, iter, PropColumn::Name);
        let count = text(&*store, iter, PropColumn::Count);
        let mut name_style = Style::default();
        if pane.is_selected(iter) {
            name_style = name_style.fg(theme.accent_colour).add_modifier(Modifier::BOLD);
        }
        ListItem::new(Line::from(vec![
            Span::styled(name, name_style),
            Span::styled(format!(" ({count})"), Style::default().fg(theme.count_fg)),
        ]))
    });

    let list = List::new(items)
        .block(pane_block(title, is_active, theme))
        .highlight_style(Style::default().bg(theme.highlight_bg).fg(Color::White))
        .highlight_symbol(">> ");

    let mut state = ListState::default().with_selected(pane.cursor.position(&*store));
    f.render_stateful_widget(list, area, &mut state);
}
