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

//! Command implementations for each context of the application.
//!
//! Commands never touch application state directly, they send an
//! [`AppEvent`] that the event loop processes once the key event has been
//! dispatched. Moving between the editor and its selection mode goes through
//! a [`Navigator`].

use std::{
    cell::{Cell, OnceCell},
    rc::Rc,
    sync::mpsc::Sender,
};

use serde_json::{Value, json};

use keystack::{
    Flow,
    context::{CommandCall, CommandTable, Controller, ControllerRef, Navigator},
    keyboard::event::{CanonicalKeyEvent, KeyAction, RawKeyEvent},
};

use crate::events::AppEvent;

/// A command handler that sends the event built from its arguments.
fn emit<F>(event_tx: &Sender<AppEvent>, event: F) -> impl Fn(&[Value]) -> anyhow::Result<Flow> + 'static
where
    F: Fn(&[Value]) -> AppEvent + 'static,
{
    let event_tx = event_tx.clone();
    move |args| {
        event_tx.send(event(args))?;
        Ok(Flow::Continue)
    }
}

/// First argument as text, or nothing.
fn text_arg(args: &[Value]) -> String {
    match args.first() {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Human readable form of a key, e.g. `ctrl+alt+x`.
pub(crate) fn describe_key(key: &CanonicalKeyEvent) -> String {
    if key.modifiers.is_empty() {
        key.character.clone()
    } else {
        format!("{}+{}", key.modifiers, key.character)
    }
}

/// Owns the root bindings and decides which context is active.
pub(crate) struct MainController {
    commands: CommandTable,
    editing: Cell<bool>,
    browse: ControllerRef,
    editor: OnceCell<ControllerRef>,
}

impl MainController {
    pub(crate) fn new(event_tx: &Sender<AppEvent>) -> Self {
        let commands = CommandTable::new()
            .with("quit", emit(event_tx, |_| AppEvent::ExitApplication))
            .with("command_line", emit(event_tx, |_| AppEvent::ActivateCommander))
            .with("help", emit(event_tx, |_| AppEvent::ShowHelp))
            .with("unbound", emit(event_tx, |args| AppEvent::Unbound(text_arg(args))));

        Self {
            commands,
            editing: Cell::new(false),
            browse: Rc::new(BrowseController::new(event_tx)),
            editor: OnceCell::new(),
        }
    }

    /// The editor needs a navigator, which only exists once the context
    /// stack holding this controller has been created.
    pub(crate) fn install_editor(&self, editor: ControllerRef) {
        if self.editor.set(editor).is_err() {
            tracing::warn!("Editor controller already installed");
        }
    }

    pub(crate) fn editing(&self) -> bool {
        self.editing.get()
    }

    pub(crate) fn set_editing(&self, editing: bool) {
        self.editing.set(editing);
    }
}

impl Controller for MainController {
    fn commands(&self) -> &CommandTable {
        &self.commands
    }

    fn active_contexts(&self) -> Vec<(String, ControllerRef)> {
        match self.editor.get() {
            Some(editor) if self.editing.get() => vec![("editor".to_string(), editor.clone())],
            _ => vec![("browse".to_string(), self.browse.clone())],
        }
    }

    fn default_command(&self, key: &CanonicalKeyEvent, _raw: &RawKeyEvent) -> Option<CommandCall> {
        // Plain keydowns of character keys always miss, their character
        // event follows
        let modified = key.modifiers.ctrl || key.modifiers.alt || key.modifiers.meta;
        let reportable = match key.action {
            KeyAction::Press => true,
            KeyAction::Down => modified || key.character.chars().count() > 1,
            KeyAction::Up => false,
        };

        reportable.then(|| CommandCall::new("unbound").with_args(vec![json!(describe_key(key))]))
    }
}

struct BrowseController {
    commands: CommandTable,
}

impl BrowseController {
    fn new(event_tx: &Sender<AppEvent>) -> Self {
        let commands = CommandTable::new()
            .with("quit", emit(event_tx, |_| AppEvent::ExitApplication))
            .with("command_line", emit(event_tx, |_| AppEvent::ActivateCommander))
            .with("help", emit(event_tx, |_| AppEvent::ShowHelp))
            .with("open_editor", emit(event_tx, |_| AppEvent::OpenEditor))
            .with("echo", emit(event_tx, |args| AppEvent::CommandFired(text_arg(args))));
        Self { commands }
    }
}

impl Controller for BrowseController {
    fn commands(&self) -> &CommandTable {
        &self.commands
    }
}

pub(crate) struct EditorController {
    commands: CommandTable,
}

impl EditorController {
    pub(crate) fn new(event_tx: &Sender<AppEvent>, navigator: Navigator) -> Self {
        let selection_tx = event_tx.clone();
        let selection_navigator = navigator.clone();

        let commands = CommandTable::new()
            .with("close", emit(event_tx, |_| AppEvent::CloseEditor))
            .with("save", emit(event_tx, |_| AppEvent::Save))
            .with("delete", emit(event_tx, |_| AppEvent::DeleteBackward))
            .with("newline", emit(event_tx, |_| AppEvent::Insert("\n".to_string())))
            .with("insert", emit(event_tx, |args| AppEvent::Insert(text_arg(args))))
            .with("select", move |_| {
                let selection = SelectionController::new(&selection_tx, selection_navigator.clone());
                selection_navigator.enter("selection", Rc::new(selection));
                selection_tx.send(AppEvent::CommandFired("select all".to_string()))?;
                Ok(Flow::Continue)
            });

        Self { commands }
    }
}

impl Controller for EditorController {
    fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Unbound characters are typed into the buffer.
    fn default_command(&self, key: &CanonicalKeyEvent, _raw: &RawKeyEvent) -> Option<CommandCall> {
        let typed = key.action == KeyAction::Press
            && !key.modifiers.ctrl
            && !key.modifiers.alt
            && !key.modifiers.meta;
        typed.then(|| CommandCall::new("insert").with_args(vec![json!(key.character)]))
    }
}

struct SelectionController {
    commands: CommandTable,
}

impl SelectionController {
    fn new(event_tx: &Sender<AppEvent>, navigator: Navigator) -> Self {
        let cancel_navigator = navigator.clone();
        let cut_tx = event_tx.clone();

        let commands = CommandTable::new()
            .with("copy", emit(event_tx, |_| AppEvent::CommandFired("copy".to_string())))
            .with("cut", move |_| {
                cut_tx.send(AppEvent::ClearBuffer)?;
                navigator.exit("selection");
                Ok(Flow::Continue)
            })
            .with("cancel", move |_| {
                cancel_navigator.exit("selection");
                Ok(Flow::Continue)
            });

        Self { commands }
    }
}

impl Controller for SelectionController {
    fn commands(&self) -> &CommandTable {
        &self.commands
    }
}
