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

//! Controllers own the commands that bindings are dispatched to.

use std::{collections::HashMap, fmt, rc::Rc};

use serde_json::Value;

use crate::keyboard::{
    Flow,
    event::{CanonicalKeyEvent, RawKeyEvent},
};

/// A command implementation, called with the arguments of its binding.
pub type CommandHandler = Rc<dyn Fn(&[Value]) -> anyhow::Result<Flow>>;

pub type ControllerRef = Rc<dyn Controller>;

/// Command names mapped to their handlers.
#[derive(Clone, Default)]
pub struct CommandTable {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, builder style.
    pub fn with<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Flow> + 'static,
    {
        self.insert(name, handler);
        self
    }

    pub fn insert<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&[Value]) -> anyhow::Result<Flow> + 'static,
    {
        self.handlers.insert(name.to_string(), Rc::new(handler));
    }

    pub fn resolve(&self, name: &str) -> Option<CommandHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("CommandTable").field("commands", &names).finish()
    }
}

/// A command chosen at runtime by a default handler.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandCall {
    pub command: String,
    pub args: Vec<Value>,
}

impl CommandCall {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

pub trait Controller {
    /// The commands the bindings of this controller's context may name.
    fn commands(&self) -> &CommandTable;

    /// The sub-contexts that should be active, outermost first. Consulted by
    /// [`super::ContextStack::state_changed`] on the main controller.
    fn active_contexts(&self) -> Vec<(String, ControllerRef)> {
        vec![]
    }

    /// Picks a command for a key no binding matched. Returning `None` passes
    /// the key on to the next controller down the path.
    fn default_command(&self, _key: &CanonicalKeyEvent, _raw: &RawKeyEvent) -> Option<CommandCall> {
        None
    }
}
