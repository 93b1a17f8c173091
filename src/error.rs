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

//! Error types.
//!
//! Authoring mistakes in binding definitions (bad modifier names, unknown
//! keys, exiting a context that was never entered) are reported
//! synchronously to the caller. Failures raised by bound callbacks are
//! wrapped in [`KeyboardError::Callback`] after the triggering event has been
//! suppressed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyboardError>;

#[derive(Error, Debug)]
pub enum KeyboardError {
    #[error("unknown modifier '{modifier}' in combination '{combination}'")]
    UnknownModifier {
        modifier: String,
        combination: String,
    },

    #[error("unknown key '{key}' in combination '{combination}'")]
    UnknownKey { key: String, combination: String },

    #[error("malformed key combination '{0}'")]
    MalformedCombination(String),

    #[error("no keymap entry for alias '{0}'")]
    UnknownAlias(String),

    #[error("context '{0}' is not on the active context path")]
    UnknownContext(String),

    #[error("controller for context '{context}' has no command '{command}'")]
    UnknownCommand { context: String, command: String },

    #[error("callback bound to '{combination}' failed")]
    Callback {
        combination: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid binding definitions")]
    Bindings(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
