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

//! Keyboard configuration.
//!
//! This module manages the configuration file and reads binding definition
//! files.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{context::BindingDefinition, error::Result};

const CONFIG_NAME: &str = "keystack";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct KeyboardConfig {
    pub version: u32,
    /// Fire plain combinations even when they also start a sequence that
    /// matched.
    pub trigger_prefix_combos: bool,
    /// Keep key events that originate from editable targets away from the
    /// bindings.
    pub not_in_editables: bool,
    pub sequence_timeout_ms: u64,
    /// Delay before all progress is dropped after a sequence completes.
    pub settle_delay_ms: u64,
    pub bindings_file: Option<String>,
    pub log_file: Option<String>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            trigger_prefix_combos: false,
            not_in_editables: false,
            sequence_timeout_ms: 1000,
            settle_delay_ms: 10,
            bindings_file: None,
            log_file: None,
        }
    }
}

impl KeyboardConfig {
    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

pub fn load_config() -> KeyboardConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &KeyboardConfig) -> std::result::Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

/// Reads binding definitions from a JSON file.
pub fn load_bindings(path: impl AsRef<Path>) -> Result<Vec<BindingDefinition>> {
    let json = fs::read_to_string(path)?;
    parse_bindings(&json)
}

pub fn parse_bindings(json: &str) -> Result<Vec<BindingDefinition>> {
    Ok(serde_json::from_str(json)?)
}
