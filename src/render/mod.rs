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
//! This module handles the translation of the [`App`] state into visual
//! widgets using the `ratatui` framework.
//!
//! # Layout
//!
//! * A header with the active context path and any pending sequence.
//! * The bindings in effect on the left, either just the active contexts or,
//!   with help shown, the whole context tree.
//! * Command history on the right, above the editor buffer when editing.
//! * The command line, which doubles as a status line.

mod commander;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use keystack::context::ContextNode;

use crate::{App, render::commander::draw_commander, theme::Theme};

/// Renders the user interface to the terminal frame.
pub(crate) fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Outer layout: header, main, footer
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    // Main layout: bindings, activity
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer[1]);

    draw_header(f, outer[0], app);
    draw_bindings(f, main[0], app);
    draw_activity(f, main[1], app);
    draw_commander(f, outer[2], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let path = app.stack.active_path();
    let context = if path.is_empty() { "(root)".to_string() } else { path.join(" > ") };

    let mut spans = vec![
        Span::styled(" keystack ", Style::default().fg(theme.accent_colour).add_modifier(Modifier::BOLD)),
        Span::styled(context, Style::default().fg(theme.context_fg)),
    ];

    if let Some(action) = app.stack.keyboard().expected_action() {
        spans.push(Span::styled(
            format!("  sequence pending ({action})"),
            Style::default().fg(theme.keys_fg),
        ));
    }

    if let Some(surface) = &app.surface {
        if !surface.reports_releases() {
            spans.push(Span::styled("  no key releases", Style::default().fg(theme.muted_colour)));
        }
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_bindings(f: &mut Frame, area: Rect, app: &App) {
    let root = app.stack.tree();
    let mut items = vec![];

    if app.show_help {
        collect_tree(root, "", &app.theme, &mut items);
    } else {
        push_node(root, "", &app.theme, &mut items);

        let mut node = Some(root);
        let mut path = String::new();
        for name in app.stack.active_path() {
            node = node.and_then(|n| n.child(name));
            let Some(child) = node else { break };
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(name);
            push_node(child, &path, &app.theme, &mut items);
        }
    }

    let title = if app.show_help { " All bindings " } else { " Active bindings " };
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_colour)),
    );

    f.render_widget(list, area);
}

fn collect_tree(node: &ContextNode, path: &str, theme: &Theme, items: &mut Vec<ListItem<'static>>) {
    push_node(node, path, theme, items);
    for (name, child) in &node.children {
        let child_path = if path.is_empty() { name.clone() } else { format!("{path}.{name}") };
        collect_tree(child, &child_path, theme, items);
    }
}

fn push_node(node: &ContextNode, path: &str, theme: &Theme, items: &mut Vec<ListItem<'static>>) {
    if node.commands.is_empty() {
        return;
    }

    let heading = if path.is_empty() { "(root)" } else { path };
    items.push(ListItem::new(Line::from(Span::styled(
        heading.to_string(),
        Style::default().fg(theme.context_fg).add_modifier(Modifier::BOLD),
    ))));

    for spec in &node.commands {
        let mut spans = vec![
            Span::styled(format!("  {:<18}", spec.keys.join(", ")), Style::default().fg(theme.keys_fg)),
            Span::styled(spec.command.clone(), Style::default().fg(theme.command_fg)),
        ];
        if let Some(scope) = &spec.scope {
            spans.push(Span::styled(format!(" [{scope}]"), Style::default().fg(theme.muted_colour)));
        }
        items.push(ListItem::new(Line::from(spans)));
    }
}

fn draw_activity(f: &mut Frame, area: Rect, app: &App) {
    let areas = if app.main.editing() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0)])
            .split(area)
    };

    // Most recent first
    let history: Vec<ListItem> = app
        .history
        .iter()
        .rev()
        .map(|entry| ListItem::new(entry.as_str()))
        .collect();

    let list = List::new(history).block(
        Block::default()
            .title(" History ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_colour)),
    );
    f.render_widget(list, areas[0]);

    if app.main.editing() {
        let editor = Paragraph::new(app.buffer.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Editor ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.accent_colour)),
            );
        f.render_widget(editor, areas[1]);
    }
}
