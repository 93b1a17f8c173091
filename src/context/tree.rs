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

//! Binding definitions and the context tree they are merged into.
//!
//! Definitions are authored as JSON:
//!
//! ```json
//! [
//!   { "context": "editor.selection",
//!     "commands": [
//!       { "command": "copy", "keys": ["ctrl+c", "meta+c"] },
//!       { "command": "move", "keys": "g g", "args": ["top"], "preventDefault": false }
//!     ] }
//! ]
//! ```
//!
//! A definition without a context belongs to the root.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BindingDefinition {
    /// Dot separated path, empty for the root.
    #[serde(default)]
    pub context: String,
    pub commands: Vec<CommandSpec>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub command: String,
    #[serde(deserialize_with = "one_or_many")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// Target class the event must come from for the command to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "preventDefault", default = "prevent_default")]
    pub prevent_default: bool,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(command: &str, keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            command: command.to_string(),
            keys: keys.into_iter().map(Into::into).collect(),
            args: vec![],
            scope: None,
            prevent_default: true,
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn allow_default(mut self) -> Self {
        self.prevent_default = false;
        self
    }
}

fn prevent_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(keys) => vec![keys],
        OneOrMany::Many(keys) => keys,
    })
}

/// One context: its commands and its named sub-contexts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextNode {
    pub commands: Vec<CommandSpec>,
    pub children: BTreeMap<String, ContextNode>,
}

impl ContextNode {
    /// Merges a definition into the node at its path, creating nodes along
    /// the way. Commands already present are not added again.
    pub fn merge(&mut self, definition: &BindingDefinition) {
        let node = path_segments(&definition.context).fold(self, |node, name| {
            node.children.entry(name.to_string()).or_default()
        });

        for command in &definition.commands {
            if !node.commands.contains(command) {
                node.commands.push(command.clone());
            }
        }
    }

    pub fn child(&self, name: &str) -> Option<&ContextNode> {
        self.children.get(name)
    }

    /// Finds the node at a dot separated path.
    pub fn resolve(&self, path: &str) -> Option<&ContextNode> {
        path_segments(path).try_fold(self, |node, name| node.child(name))
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn definitions() -> Vec<BindingDefinition> {
        serde_json::from_value(json!([
            { "commands": [{ "command": "quit", "keys": "q" }] },
            { "context": "editor.selection", "commands": [
                { "command": "copy", "keys": ["ctrl+c", "meta+c"], "scope": "text" },
                { "command": "move", "keys": "g g", "args": ["top"], "preventDefault": false }
            ] }
        ]))
        .unwrap()
    }

    #[test]
    fn parses_definitions() {
        let definitions = definitions();
        assert_eq!(definitions[0].context, "");

        let copy = &definitions[1].commands[0];
        assert_eq!(copy.keys, vec!["ctrl+c", "meta+c"]);
        assert_eq!(copy.scope.as_deref(), Some("text"));
        assert!(copy.prevent_default);

        let movement = &definitions[1].commands[1];
        assert_eq!(movement.keys, vec!["g g"]);
        assert_eq!(movement.args, vec![json!("top")]);
        assert!(!movement.prevent_default);
    }

    #[test]
    fn merge_creates_intermediate_nodes() {
        let mut root = ContextNode::default();
        for definition in &definitions() {
            root.merge(definition);
        }

        assert_eq!(root.commands.len(), 1);
        let editor = root.child("editor").unwrap();
        assert!(editor.commands.is_empty());
        assert_eq!(root.resolve("editor.selection").unwrap().commands.len(), 2);
        assert!(root.resolve("editor.missing").is_none());
        assert_eq!(root.resolve(""), Some(&root));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let mut root = ContextNode::default();
        for definition in definitions().iter().chain(&definitions()) {
            root.merge(definition);
        }
        assert_eq!(root.commands.len(), 1);
        assert_eq!(root.resolve("editor.selection").unwrap().commands.len(), 2);
    }
}
