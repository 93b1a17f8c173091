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

//! Key binding and dispatch.
//!
//! [`Keyboard`] owns the binding registry and the sequence tracker. Each
//! incoming [`RawKeyEvent`] is normalized, matched against the registry and
//! the matching callbacks are fired according to these rules:
//!
//! * Sequence records are preferred over plain combinations. Of the
//!   sequence records that match, only those at the deepest level fire, so
//!   `"a option+b"` does not also fire a separate `"option+b"` sequence.
//! * A plain combination fires only when no sequence record fired, unless
//!   [`KeyboardConfig::trigger_prefix_combos`] is set.
//! * A key of the phase an armed sequence expects, that is not a modifier,
//!   resets every sequence it did not continue.
//!
//! The outcome tells the caller whether anything matched, so a default
//! action can run on a total miss.

mod combo;
pub mod event;
pub mod keytable;
mod registry;
mod sequence;
pub mod timer;

#[cfg(test)]
#[path = "keyboard_tests.rs"]
mod keyboard_tests;

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::{debug, error, trace};

use crate::{
    config::KeyboardConfig,
    error::{KeyboardError, Result},
    keyboard::{
        combo::{key_info, split_sequence},
        event::{CanonicalKeyEvent, KeyAction, Modifiers, OPT_IN_CLASS, RawKeyEvent, Target},
        registry::{BindingRecord, BindingRegistry, Handler, SequenceSlot},
        sequence::SequenceTracker,
        timer::{Clock, SystemClock},
    },
};

/// What a callback asks the dispatcher to do with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Prevent the default action and stop propagation.
    Stop,
}

/// A bound callback. Receives the event and the combination it was bound
/// with.
pub type Callback = Rc<dyn Fn(&mut RawKeyEvent, &str) -> anyhow::Result<Flow>>;

/// Decides whether an event should be kept away from the bindings, given
/// its origin and the combination about to fire.
pub type StopCallback = Rc<dyn Fn(&RawKeyEvent, &Target, &str) -> bool>;

/// Result of dispatching one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event carried no usable key, or was a swallowed keyup.
    Ignored,
    Matched,
    /// Nothing was bound to the key.
    Missed(CanonicalKeyEvent),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// Stops events from editable targets unless they opted in.
pub fn default_stop_callback(_event: &RawKeyEvent, target: &Target, _combination: &str) -> bool {
    if target.has_class(OPT_IN_CLASS) {
        return false;
    }
    target.editable
}

pub struct Keyboard {
    config: KeyboardConfig,
    clock: Rc<dyn Clock>,
    registry: BindingRegistry,
    sequences: SequenceTracker,
    direct: HashMap<(String, Option<KeyAction>), Callback>,
    keymap: HashMap<String, Vec<String>>,
    stop_callback: StopCallback,
}

impl Keyboard {
    pub fn new(config: KeyboardConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    pub fn with_clock(config: KeyboardConfig, clock: Rc<dyn Clock>) -> Self {
        let sequences = SequenceTracker::new(config.sequence_timeout(), config.settle_delay());
        Self {
            config,
            clock,
            registry: BindingRegistry::default(),
            sequences,
            direct: HashMap::new(),
            keymap: HashMap::new(),
            stop_callback: Rc::new(default_stop_callback),
        }
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    /// Replaces the guard consulted when `not_in_editables` is set.
    pub fn set_stop_callback(&mut self, stop_callback: StopCallback) {
        self.stop_callback = stop_callback;
    }

    /// Sets the named combinations available to [`Keyboard::bind_mapped`].
    pub fn set_keymap(&mut self, keymap: HashMap<String, Vec<String>>) {
        self.keymap = keymap;
    }

    /// Binds a callback to one or more combinations or sequences.
    ///
    /// Without an explicit action each key picks the phase it is best
    /// observed in. Binding the same combination and action again replaces
    /// the previous callback.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown modifiers, unknown keys or malformed
    /// combinations. Nothing is bound for the offending combination.
    pub fn bind<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        action: Option<KeyAction>,
        callback: Callback,
    ) -> Result<&mut Self> {
        for keys in keys {
            self.bind_keys(keys.as_ref(), action, callback.clone())?;
        }
        Ok(self)
    }

    /// Binds a callback to the combinations registered under `alias` in the
    /// keymap.
    pub fn bind_mapped(
        &mut self,
        alias: &str,
        action: Option<KeyAction>,
        callback: Callback,
    ) -> Result<&mut Self> {
        let keys = self
            .keymap
            .get(alias)
            .cloned()
            .ok_or_else(|| KeyboardError::UnknownAlias(alias.to_string()))?;
        self.bind(&keys, action, callback)
    }

    fn bind_keys(&mut self, keys: &str, action: Option<KeyAction>, callback: Callback) -> Result<()> {
        let parts = split_sequence(keys);
        if parts.is_empty() {
            return Err(KeyboardError::MalformedCombination(keys.to_string()));
        }
        let combination = parts.join(" ");

        if parts.len() > 1 {
            self.bind_sequence(&combination, &parts, action, callback.clone())?;
        } else {
            let info = key_info(&combination, action)?;
            self.registry.register(BindingRecord {
                character: info.key,
                modifiers: info.modifiers,
                action: info.action,
                slot: None,
                combination: combination.clone(),
                handler: Handler::Fire(callback.clone()),
            });
        }

        debug!(combination = %combination, ?action, "Bound key combination");
        self.direct.insert((combination, action), callback);
        Ok(())
    }

    /// Compiles a sequence into one record per key. Every key but the last
    /// advances the sequence; the last one fires `callback`.
    fn bind_sequence(
        &mut self,
        combination: &str,
        parts: &[&str],
        action: Option<KeyAction>,
        callback: Callback,
    ) -> Result<()> {
        // Parse every key first so a bad key leaves nothing half bound
        let infos = parts
            .iter()
            .map(|part| key_info(part, action))
            .collect::<Result<Vec<_>>>()?;
        let next_actions = parts
            .iter()
            .skip(1)
            .map(|part| Ok(action.unwrap_or(key_info(part, None)?.action)))
            .collect::<Result<Vec<_>>>()?;

        self.sequences.register(combination, parts.len());

        for (position, (info, part)) in infos.into_iter().zip(parts).enumerate() {
            let handler = match next_actions.get(position) {
                Some(&next) => Handler::Advance { next },
                None => Handler::Complete {
                    callback: callback.clone(),
                    action,
                },
            };

            self.registry.register(BindingRecord {
                character: info.key,
                modifiers: info.modifiers,
                action: info.action,
                slot: Some(SequenceSlot {
                    sequence: combination.to_string(),
                    position,
                }),
                combination: part.to_string(),
                handler,
            });
        }

        Ok(())
    }

    /// Fires the callback bound to exactly `combination` and `action`,
    /// bypassing normalization and sequence tracking.
    ///
    /// Returns whether such a binding exists.
    pub fn trigger(&mut self, combination: &str, action: Option<KeyAction>) -> Result<bool> {
        let key = (split_sequence(combination).join(" "), action);
        let Some(callback) = self.direct.get(&key).cloned() else {
            return Ok(false);
        };

        let mut event = RawKeyEvent::synthetic(action.unwrap_or(KeyAction::Press));
        invoke(&callback, &mut event, &key.0)?;
        Ok(true)
    }

    /// Removes every binding and all sequence progress.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.direct.clear();
        self.sequences.clear();
    }

    /// Runs any sequence reset whose time has come. Hosts call this
    /// periodically so progress expires even when no keys arrive.
    pub fn tick(&mut self) {
        self.sequences.poll(self.clock.now());
    }

    /// Dispatches a raw event from a surface.
    ///
    /// # Errors
    ///
    /// Returns [`KeyboardError::Callback`] if a callback fails. The event is
    /// suppressed before the error is returned.
    pub fn handle_event(&mut self, event: &mut RawKeyEvent) -> Result<Outcome> {
        self.tick();

        let Some(key) = event::normalize(event) else {
            return Ok(Outcome::Ignored);
        };

        if key.action == KeyAction::Up && self.sequences.take_ignored_keyup(&key.character) {
            trace!(character = %key.character, "Ignoring keyup that completed a sequence");
            return Ok(Outcome::Ignored);
        }

        let matched = self.handle_key(&key.character, key.modifiers, event)?;
        Ok(if matched {
            Outcome::Matched
        } else {
            Outcome::Missed(key)
        })
    }

    /// Matches and fires the bindings for an already normalized key.
    ///
    /// Returns whether any binding matched.
    pub fn handle_key(
        &mut self,
        character: &str,
        modifiers: Modifiers,
        event: &mut RawKeyEvent,
    ) -> Result<bool> {
        let action = event.action;
        let matches = self
            .registry
            .matches(character, modifiers, action, &self.sequences);
        trace!(character, %modifiers, %action, matches = matches.len(), "Dispatching key");

        let max_level = matches
            .iter()
            .filter_map(|record| record.slot.as_ref().map(|slot| slot.position))
            .max()
            .unwrap_or(0);

        let mut do_not_reset = HashSet::new();
        let mut fired_sequence = false;
        let mut fired_plain = false;

        // A failing callback stops further firing, the sequence bookkeeping
        // below still runs before the error is returned
        let mut failure = None;
        for record in &matches {
            let fired = match &record.slot {
                Some(slot) => {
                    if slot.position != max_level {
                        continue;
                    }
                    fired_sequence = true;
                    do_not_reset.insert(slot.sequence.clone());
                    self.fire(record, event)
                }
                None if self.config.trigger_prefix_combos => self.fire(record, event),
                None => {
                    if fired_sequence || fired_plain {
                        continue;
                    }
                    fired_plain = true;
                    self.fire(record, event)
                }
            };
            if let Err(err) = fired {
                failure = Some(err);
                break;
            }
        }

        // Follow-up keypress of a key whose keydown already moved a sequence
        let ignore_this_keypress = action == KeyAction::Press && self.sequences.ignore_next_keypress();
        if self.sequences.expected_action() == Some(action)
            && !keytable::is_modifier(character)
            && !ignore_this_keypress
        {
            self.sequences.reset_except(&do_not_reset);
        }

        self.sequences
            .set_ignore_next_keypress(fired_sequence && action == KeyAction::Down);

        match failure {
            Some(err) => Err(err),
            None => Ok(!matches.is_empty()),
        }
    }

    fn fire(&mut self, record: &BindingRecord, event: &mut RawKeyEvent) -> Result<()> {
        if self.config.not_in_editables
            && (self.stop_callback)(event, &event.target, &record.combination)
        {
            trace!(combination = %record.combination, "Binding stopped for editable target");
            return Ok(());
        }

        match &record.handler {
            Handler::Fire(callback) => invoke(callback, event, &record.combination),
            Handler::Advance { next } => {
                if let Some(slot) = &record.slot {
                    self.sequences
                        .advance(&slot.sequence, *next, self.clock.now());
                }
                Ok(())
            }
            Handler::Complete { callback, action } => {
                let sequence = record
                    .slot
                    .as_ref()
                    .map_or(record.combination.as_str(), |slot| slot.sequence.as_str());
                let result = invoke(callback, event, sequence);

                // Releasing the final key must not start matching again
                let character = match action {
                    Some(KeyAction::Up) => None,
                    _ => event::character_from_event(event),
                };
                self.sequences.complete(character, self.clock.now());
                result
            }
        }
    }

    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    /// How many keys of `sequence` have been matched so far.
    pub fn sequence_level(&self, sequence: &str) -> usize {
        self.sequences.level(sequence)
    }

    /// The phase the next key of an in-progress sequence is expected in.
    pub fn expected_action(&self) -> Option<KeyAction> {
        self.sequences.expected_action()
    }
}

/// Calls a callback, applying its [`Flow`] to the event.
fn invoke(callback: &Callback, event: &mut RawKeyEvent, combination: &str) -> Result<()> {
    match callback(event, combination) {
        Ok(Flow::Stop) => {
            event.suppress();
            Ok(())
        }
        Ok(Flow::Continue) => Ok(()),
        Err(source) => {
            event.suppress();
            error!(combination, error = ?source, "Key binding callback failed");
            Err(KeyboardError::Callback {
                combination: combination.to_string(),
                source,
            })
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new(KeyboardConfig::default())
    }
}
