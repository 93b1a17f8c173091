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
//! Terminal input, periodic ticks and the effects of bound commands all
//! arrive on one channel as [`AppEvent`]s. Key events are routed through the
//! command line when it is active, otherwise through the context stack.

mod handlers;
use handlers::*;

use std::io::Stdout;

use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::{Terminal, prelude::CrosstermBackend};

use keystack::surface;

use crate::{App, render::draw};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    Tick,

    /// A command ran, with a description for the history.
    CommandFired(String),
    /// A key nothing was bound to.
    Unbound(String),
    ShowHelp,

    ActivateCommander,
    OpenEditor,
    CloseEditor,
    ExitContext(String),
    Trigger(String),
    ReloadBindings,

    Insert(String),
    DeleteBackward,
    ClearBuffer,
    Save,

    Error(String),
    ExitApplication,
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a quit event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        if matches!(event, AppEvent::ExitApplication) {
            break;
        }

        match event {
            AppEvent::Key(key) => process_key_event(app, key)?,
            AppEvent::Tick => handle_tick(app),
            AppEvent::CommandFired(description) => handle_command_fired(app, description),
            AppEvent::Unbound(key) => handle_unbound(app, key),
            AppEvent::ShowHelp => handle_show_help(app),
            AppEvent::ActivateCommander => app.commander.activate(),
            AppEvent::OpenEditor => handle_set_editing(app, true),
            AppEvent::CloseEditor => handle_set_editing(app, false),
            AppEvent::ExitContext(name) => handle_exit_context(app, &name),
            AppEvent::Trigger(keys) => handle_trigger(app, &keys),
            AppEvent::ReloadBindings => handle_reload_bindings(app),
            AppEvent::Insert(text) => app.buffer.push_str(&text),
            AppEvent::DeleteBackward => {
                app.buffer.pop();
            }
            AppEvent::ClearBuffer => app.buffer.clear(),
            AppEvent::Save => handle_save(app),
            AppEvent::Error(message) => app.status = Some(message),
            AppEvent::ExitApplication => {}
        }

        terminal.draw(|f| draw(f, app))?;
    }
    Ok(())
}

/// Routes a terminal key event.
///
/// The command line takes every key while it is active. Anything else is
/// translated into raw key events and dispatched through the context stack,
/// tagged with the focused element. Binding failures are shown in the status
/// line rather than ending the application.
///
/// # Errors
///
/// Returns an error if the command line cannot send its command.
fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let event = Event::Key(key);
    if app.commander.handle_event(&event, &app.event_tx)? {
        return Ok(());
    }

    let target = app.focus_target();
    for mut raw in surface::translate(&key) {
        raw.target = target.clone();
        let result = app.stack.handle_event(&mut raw).map(|_| ());
        report(app, result);
    }
    Ok(())
}
