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

//! User interface rendering logic.
//!
//! Everything drawn here is read through the view-model protocol: rows are
//! walked with [`TreeModel::children_of`] and [`TreeModel::iter_next`], and
//! cells come from [`TreeModel::value_at`].

mod browser;
mod playlists;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use trackview::store::{Column, PlaylistColumn, TreeIter, TreeModel, Value};

use crate::{App, MainView, theme::Theme};

const HELP: &str = "q quit  1/2 view  j/k move  h/l pane  \u{23CE} play/select  space add  p pause  \
                    d delete  J/K move track  n new  i import";

/// Renders the user interface to the terminal frame.
pub(crate) fn draw(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_colour)),
        f.area(),
    );

    match app.main_view {
        MainView::Playlists => playlists::draw_playlists(f, outer[0], app),
        MainView::Library => browser::draw_browser(f, outer[0], app),
    }

    let status = app.status.as_deref().unwrap_or_default();
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(app.theme.status_colour)),
        outer[1],
    );
    f.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(app.theme.border_colour)),
        outer[2],
    );
}

/// Walks every row of `model`, handing each handle to `f`.
pub(crate) fn rows<T>(model: &dyn TreeModel, mut f: impl FnMut(&TreeIter) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(model.len());
    let Some(mut iter) = model.children_of(None) else {
        return out;
    };
    loop {
        out.push(f(&iter));
        if !model.iter_next(&mut iter) {
            return out;
        }
    }
}

pub(crate) fn text(model: &dyn TreeModel, iter: &TreeIter, column: impl Column) -> String {
    model
        .value_at(iter, column.index())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn pane_block(title: &str, is_active: bool, theme: &Theme) -> Block<'static> {
    let style = if is_active {
        Style::default().fg(theme.accent_colour).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.border_colour)
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(style)
}

/// Renders a track table over any store exposing the playlist columns.
///
/// `column` maps a playlist column to the store's own column index.
pub(crate) fn draw_track_table(
    f: &mut Frame,
    area: Rect,
    model: &dyn TreeModel,
    column: impl Fn(PlaylistColumn) -> usize,
    selected: Option<usize>,
    block: Block,
    theme: &Theme,
) {
    let cell = |iter: &TreeIter, c: PlaylistColumn| {
        model
            .value_at(iter, column(c))
            .map(|v| match v {
                Value::Int(0) => String::new(),
                Value::Int(n) => format!("{n:02}"),
                other => other.to_string(),
            })
            .unwrap_or_default()
    };

    let rows = rows(model, |iter| {
        Row::new(vec![
            Cell::from(Line::from(cell(iter, PlaylistColumn::State)).style(Style::default().fg(theme.table_state_fg))),
            Cell::from(Line::from(cell(iter, PlaylistColumn::Length)).style(Style::default().fg(theme.table_time_fg)).alignment(Alignment::Right)),
            Cell::from(""),
            Cell::from(Line::from(cell(iter, PlaylistColumn::Artist)).style(Style::default().fg(theme.table_artist_fg))),
            Cell::from(Line::from(cell(iter, PlaylistColumn::Album)).style(Style::default().fg(theme.table_album_fg))),
            Cell::from(Line::from(cell(iter, PlaylistColumn::Track)).style(Style::default().fg(theme.table_track_number_fg)).alignment(Alignment::Right)),
            Cell::from(Line::from(cell(iter, PlaylistColumn::FormattedTitle)).style(Style::default().fg(theme.table_track_fg))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Length(5),
            Constraint::Percentage(55),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from(""),
            Cell::from(Line::from("Time").alignment(Alignment::Right)),
            Cell::from(""),
            Cell::from("Artist"),
            Cell::from("Album"),
            Cell::from(Line::from("Track").alignment(Alignment::Right)),
            Cell::from("Title"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD).fg(theme.accent_colour))
        .bottom_margin(1),
    )
    .row_highlight_style(Style::default().bg(theme.highlight_bg).fg(Color::White))
    .block(block);

    let mut state = TableState::default().with_selected(selected);
    f.render_stateful_widget(table, area, &mut state);
}
