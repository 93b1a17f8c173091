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

use keystack::config::load_bindings;

use crate::{App, HISTORY_LIMIT};

/// Shows a failed binding operation in the status line.
pub(super) fn report(app: &mut App, result: keystack::Result<()>) {
    if let Err(err) = result {
        let err = anyhow::Error::from(err);
        tracing::error!(error = %format!("{err:#}"), "Key handling failed");
        app.status = Some(format!("{err:#}"));
    }
}

pub(super) fn push_history(app: &mut App, entry: String) {
    if app.history.len() == HISTORY_LIMIT {
        app.history.pop_front();
    }
    app.history.push_back(entry);
}

pub(super) fn handle_tick(app: &mut App) {
    let result = app.stack.tick();
    report(app, result);
}

pub(super) fn handle_command_fired(app: &mut App, description: String) {
    app.status = None;
    push_history(app, description);
}

pub(super) fn handle_unbound(app: &mut App, key: String) {
    app.status = Some(format!("{key} is not bound"));
}

pub(super) fn handle_show_help(app: &mut App) {
    app.show_help = !app.show_help;
}

pub(super) fn handle_set_editing(app: &mut App, editing: bool) {
    app.main.set_editing(editing);
    let result = app.stack.state_changed();
    report(app, result);
    push_history(app, if editing { "open editor" } else { "close editor" }.to_string());
}

pub(super) fn handle_exit_context(app: &mut App, name: &str) {
    let result = app.stack.exit(name);
    report(app, result);
}

/// Fires a combination as if it had been typed, then applies any context
/// changes its command asked for.
pub(super) fn handle_trigger(app: &mut App, keys: &str) {
    match app.stack.keyboard_mut().trigger(keys, None) {
        Ok(true) => {
            let result = app.stack.tick();
            report(app, result);
        }
        Ok(false) => app.status = Some(format!("Nothing bound to {keys}")),
        Err(err) => report(app, Err(err)),
    }
}

/// Merges the bindings file from the configuration into the tree and
/// rebinds the active contexts.
pub(super) fn handle_reload_bindings(app: &mut App) {
    let Some(path) = app.config.bindings_file.clone() else {
        let result = app.stack.rebuild();
        report(app, result);
        return;
    };

    let result = load_bindings(&path).and_then(|definitions| {
        app.stack.register_bindings(&definitions);
        app.stack.rebuild()
    });
    if result.is_ok() {
        tracing::info!(bindings_file = %path, "Bindings reloaded");
        push_history(app, format!("reloaded {path}"));
    }
    report(app, result);
}

pub(super) fn handle_save(app: &mut App) {
    let lines = app.buffer.lines().count();
    tracing::info!(lines, "Buffer saved");
    push_history(app, format!("saved {lines} line(s)"));
}
