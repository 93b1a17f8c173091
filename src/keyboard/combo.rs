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

//! Parsing of combination strings such as `"ctrl+shift+r"` or `"g i"`.

use crate::{
    error::{KeyboardError, Result},
    keyboard::{
        event::{KeyAction, Modifier, Modifiers},
        keytable,
    },
};

/// What a single combination binds to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KeyInfo {
    pub(crate) key: String,
    pub(crate) modifiers: Modifiers,
    pub(crate) action: KeyAction,
}

/// Splits a binding string into the combinations of its sequence. A plain
/// combination yields a single element.
pub(crate) fn split_sequence(keys: &str) -> Vec<&str> {
    keys.split_whitespace().collect()
}

fn keys_from_string(combination: &str) -> Vec<&str> {
    if combination == "+" {
        return vec!["+"];
    }
    if let Some(modifiers) = combination.strip_suffix("++") {
        let mut keys: Vec<&str> = modifiers.split('+').collect();
        keys.push("+");
        return keys;
    }
    combination.split('+').collect()
}

/// Parses one combination (no spaces) into its key, modifiers and the action
/// it should be bound to.
pub(crate) fn key_info(combination: &str, action: Option<KeyAction>) -> Result<KeyInfo> {
    let tokens = keys_from_string(combination);
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(KeyboardError::MalformedCombination(combination.to_string()));
    }

    let mut modifiers = Modifiers::none();
    let mut key = "";

    for (i, &token) in tokens.iter().enumerate() {
        let is_last = i + 1 == tokens.len();
        let mut name: &str = keytable::alias(token).unwrap_or(token);

        // Keyup and keydown report the unshifted key, so a shifted character
        // becomes shift plus its unshifted key (US layout only)
        if action.is_some_and(|a| a != KeyAction::Press) {
            if let Some(plain) = keytable::unshifted(name) {
                name = plain;
                modifiers.insert(Modifier::Shift);
            }
        }

        match Modifier::from_name(name) {
            Some(modifier) => modifiers.insert(modifier),
            None if !is_last => {
                return Err(KeyboardError::UnknownModifier {
                    modifier: token.to_string(),
                    combination: combination.to_string(),
                });
            }
            None if !keytable::is_known_key(name) => {
                return Err(KeyboardError::UnknownKey {
                    key: token.to_string(),
                    combination: combination.to_string(),
                });
            }
            None => {}
        }

        key = name;
    }

    Ok(KeyInfo {
        key: key.to_string(),
        action: pick_best_action(key, &modifiers, action),
        modifiers,
    })
}

/// Picks the phase a key is best observed in when the caller did not ask for
/// one. Modified keys never reliably produce a character phase.
fn pick_best_action(key: &str, modifiers: &Modifiers, action: Option<KeyAction>) -> KeyAction {
    let action = action.unwrap_or(if keytable::requires_keydown(key) {
        KeyAction::Down
    } else {
        KeyAction::Press
    });

    if action == KeyAction::Press && !modifiers.is_empty() {
        KeyAction::Down
    } else {
        action
    }
}
