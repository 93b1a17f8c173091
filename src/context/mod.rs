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

//! Layered key bindings that follow the application's focus.
//!
//! Binding definitions are merged into a tree of contexts addressed by dot
//! separated paths. The [`ContextStack`] keeps a path of active contexts,
//! each paired with the controller its commands run against, and rebuilds
//! the [`Keyboard`] whenever the path changes: first the root commands
//! against the main controller, then each active context in order.
//!
//! Callbacks cannot reach the stack while it is dispatching. They navigate
//! through a [`Navigator`] instead, and the requests are applied once the
//! dispatch has finished.

pub mod controller;
pub mod tree;


use std::{
    iter,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
};

use tracing::{debug, error, trace};

pub use controller::{CommandCall, CommandHandler, CommandTable, Controller, ControllerRef};
pub use tree::{BindingDefinition, CommandSpec, ContextNode};

use crate::{
    config::KeyboardConfig,
    error::{KeyboardError, Result},
    keyboard::{
        Callback, Flow, Keyboard, Outcome,
        event::{CanonicalKeyEvent, RawKeyEvent},
    },
};

/// A navigation request queued by a callback.
enum Navigation {
    Enter(String, ControllerRef),
    Exit(String),
    StateChanged,
}

/// Queues navigation for the [`ContextStack`] that handed it out.
#[derive(Clone)]
pub struct Navigator {
    tx: Sender<Navigation>,
}

impl Navigator {
    pub fn enter(&self, name: &str, controller: ControllerRef) {
        self.send(Navigation::Enter(name.to_string(), controller));
    }

    pub fn exit(&self, name: &str) {
        self.send(Navigation::Exit(name.to_string()));
    }

    pub fn state_changed(&self) {
        self.send(Navigation::StateChanged);
    }

    fn send(&self, request: Navigation) {
        // Only fails once the stack is gone, leaving nothing to navigate
        self.tx.send(request).ok();
    }
}

pub struct ContextStack {
    keyboard: Keyboard,
    root: ContextNode,
    main: ControllerRef,
    path: Vec<(String, ControllerRef)>,
    navigation_tx: Sender<Navigation>,
    navigation_rx: Receiver<Navigation>,
}

impl ContextStack {
    pub fn new(config: KeyboardConfig, main: ControllerRef) -> Self {
        Self::with_keyboard(Keyboard::new(config), main)
    }

    pub fn with_keyboard(keyboard: Keyboard, main: ControllerRef) -> Self {
        let (navigation_tx, navigation_rx) = mpsc::channel();
        Self {
            keyboard,
            root: ContextNode::default(),
            main,
            path: vec![],
            navigation_tx,
            navigation_rx,
        }
    }

    pub fn navigator(&self) -> Navigator {
        Navigator {
            tx: self.navigation_tx.clone(),
        }
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn tree(&self) -> &ContextNode {
        &self.root
    }

    /// Names of the active contexts, outermost first.
    pub fn active_path(&self) -> Vec<&str> {
        self.path.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Merges definitions into the context tree.
    ///
    /// The active bindings are left alone until the next rebuild.
    pub fn register_bindings(&mut self, definitions: &[BindingDefinition]) {
        for definition in definitions {
            self.root.merge(definition);
        }
        debug!(definitions = definitions.len(), "Registered binding definitions");
    }

    pub fn enter(&mut self, name: &str, controller: ControllerRef) -> Result<()> {
        debug!(context = name, "Entering context");
        let mut path = self.path.clone();
        path.push((name.to_string(), controller));
        self.change_path(path)
    }

    /// Leaves the most recently entered context called `name`, and every
    /// context entered after it.
    ///
    /// # Errors
    ///
    /// Returns [`KeyboardError::UnknownContext`] if `name` is not active. The
    /// active bindings are unchanged in that case.
    pub fn exit(&mut self, name: &str) -> Result<()> {
        let index = self
            .path
            .iter()
            .rposition(|(entry, _)| entry == name)
            .ok_or_else(|| KeyboardError::UnknownContext(name.to_string()))?;

        debug!(context = name, "Exiting context");
        let path = self.path[..index].to_vec();
        self.change_path(path)
    }

    /// Replaces the path with the contexts the main controller reports as
    /// active.
    pub fn state_changed(&mut self) -> Result<()> {
        let path = self.main.active_contexts();
        self.change_path(path)
    }

    /// Rebinds the current path, picking up newly registered definitions.
    pub fn rebuild(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.change_path(path)
    }

    /// Dispatches an event, falling back to the controllers' default
    /// commands when no binding matches. Navigation requested during the
    /// dispatch is applied before returning.
    ///
    /// A key handled by a default command is reported as matched.
    pub fn handle_event(&mut self, event: &mut RawKeyEvent) -> Result<Outcome> {
        let outcome = match self.keyboard.handle_event(event) {
            Ok(Outcome::Missed(key)) => self.run_default(&key, event).map(|handled| {
                if handled {
                    Outcome::Matched
                } else {
                    Outcome::Missed(key)
                }
            }),
            other => other,
        };

        let navigation = self.apply_navigation();
        let outcome = outcome?;
        navigation?;
        Ok(outcome)
    }

    /// Expires sequence progress. Also applies navigation queued outside a
    /// dispatch.
    pub fn tick(&mut self) -> Result<()> {
        self.keyboard.tick();
        self.apply_navigation()
    }

    fn apply_navigation(&mut self) -> Result<()> {
        let requests: Vec<Navigation> = self.navigation_rx.try_iter().collect();
        for request in requests {
            match request {
                Navigation::Enter(name, controller) => self.enter(&name, controller)?,
                Navigation::Exit(name) => self.exit(&name)?,
                Navigation::StateChanged => self.state_changed()?,
            }
        }
        Ok(())
    }

    /// Asks the controllers, innermost first, for a command to run.
    fn run_default(&self, key: &CanonicalKeyEvent, event: &mut RawKeyEvent) -> Result<bool> {
        let controllers = self
            .path
            .iter()
            .rev()
            .map(|(name, controller)| (name.as_str(), controller))
            .chain(iter::once(("", &self.main)));

        for (context, controller) in controllers {
            let Some(call) = controller.default_command(key, event) else {
                continue;
            };

            let handler = controller.commands().resolve(&call.command).ok_or_else(|| {
                KeyboardError::UnknownCommand {
                    context: context.to_string(),
                    command: call.command.clone(),
                }
            })?;

            trace!(context, command = %call.command, "Running default command");
            match handler(&call.args) {
                Ok(Flow::Stop) => event.suppress(),
                Ok(Flow::Continue) => {}
                Err(source) => {
                    event.suppress();
                    error!(context, command = %call.command, error = ?source, "Default command failed");
                    return Err(KeyboardError::Callback {
                        combination: key.character.clone(),
                        source,
                    });
                }
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Switches to `path`, restoring the previous path if it cannot be bound.
    fn change_path(&mut self, path: Vec<(String, ControllerRef)>) -> Result<()> {
        let previous = std::mem::replace(&mut self.path, path);
        if let Err(err) = self.bind_active() {
            self.path = previous;
            if let Err(restore) = self.bind_active() {
                error!(error = %restore, "Failed to restore previous key bindings");
            }
            return Err(err);
        }
        Ok(())
    }

    fn bind_active(&mut self) -> Result<()> {
        self.keyboard.reset();
        bind_node(&mut self.keyboard, &self.root, "", &self.main)?;

        let mut node = &self.root;
        let mut context = String::new();
        for (name, controller) in &self.path {
            let Some(child) = node.child(name) else {
                break;
            };
            if !context.is_empty() {
                context.push('.');
            }
            context.push_str(name);

            bind_node(&mut self.keyboard, child, &context, controller)?;
            node = child;
        }

        debug!(
            path = %self.active_path().join("."),
            bindings = self.keyboard.binding_count(),
            "Rebuilt key bindings"
        );
        Ok(())
    }
}

fn bind_node(
    keyboard: &mut Keyboard,
    node: &ContextNode,
    context: &str,
    controller: &ControllerRef,
) -> Result<()> {
    for spec in &node.commands {
        let handler = controller.commands().resolve(&spec.command).ok_or_else(|| {
            KeyboardError::UnknownCommand {
                context: context.to_string(),
                command: spec.command.clone(),
            }
        })?;
        keyboard.bind(&spec.keys, None, command_callback(spec, handler))?;
    }
    Ok(())
}

fn command_callback(spec: &CommandSpec, handler: CommandHandler) -> Callback {
    let command = spec.command.clone();
    let args = spec.args.clone();
    let scope = spec.scope.clone();
    let prevent_default = spec.prevent_default;

    Rc::new(move |event, _| {
        if let Some(scope) = &scope {
            if !event.target.has_class(scope) {
                trace!(command = %command, scope = %scope, "Command out of scope");
                return Ok(Flow::Continue);
            }
        }

        trace!(command = %command, "Running command");
        let flow = handler(&args)?;
        Ok(if prevent_default { Flow::Stop } else { flow })
    })
}
