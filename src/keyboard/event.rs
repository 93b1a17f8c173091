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

//! Key events and their normalization.
//!
//! A [`RawKeyEvent`] is what a surface delivers: a numeric code, the phase of
//! the key press and the modifier flags. [`normalize`] turns it into a
//! [`CanonicalKeyEvent`], the `(character, modifiers, action)` triple that
//! bindings are matched against.

use std::fmt;

use super::keytable;

/// Class name that opts an editable target back in to key handling.
pub const OPT_IN_CLASS: &str = "keystack";

/// The phase of a physical key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Character-producing phase.
    Press,
    Down,
    Up,
}

impl KeyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Press => "keypress",
            Self::Down => "keydown",
            Self::Up => "keyup",
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

impl Modifier {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shift" => Some(Self::Shift),
            "ctrl" => Some(Self::Ctrl),
            "alt" => Some(Self::Alt),
            "meta" => Some(Self::Meta),
            _ => None,
        }
    }
}

/// A set of held modifier keys. Two sets are equal when they hold the same
/// modifiers, whatever order they were written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn only(modifier: Modifier) -> Self {
        let mut modifiers = Self::default();
        modifiers.insert(modifier);
        modifiers
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Shift => self.shift = true,
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Meta => self.meta = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.shift, "shift"),
            (self.ctrl, "ctrl"),
            (self.alt, "alt"),
            (self.meta, "meta"),
        ];
        let held: Vec<&str> = names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&held.join("+"))
    }
}

/// The element a key event originated from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Target {
    pub editable: bool,
    pub classes: Vec<String>,
}

impl Target {
    pub fn editable() -> Self {
        Self {
            editable: true,
            classes: vec![],
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A key event as delivered by a surface.
#[derive(Clone, Debug)]
pub struct RawKeyEvent {
    pub action: KeyAction,
    /// Character code for [`KeyAction::Press`], key code otherwise.
    pub which: u32,
    pub modifiers: Modifiers,
    pub target: Target,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl RawKeyEvent {
    pub fn new(action: KeyAction, which: u32) -> Self {
        Self {
            action,
            which,
            modifiers: Modifiers::none(),
            target: Target::default(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A character-phase event for `c`.
    pub fn press(c: char) -> Self {
        Self::new(KeyAction::Press, c as u32)
    }

    /// An event with no key information, used when firing bindings directly.
    pub fn synthetic(action: KeyAction) -> Self {
        Self::new(action, 0)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Prevents the default action and stops propagation.
    pub fn suppress(&mut self) {
        self.prevent_default();
        self.stop_propagation();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// A normalized key event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalKeyEvent {
    pub character: String,
    pub modifiers: Modifiers,
    pub action: KeyAction,
}

/// Derives the key character of an event.
///
/// The character phase reports the produced character. Unless shift is held
/// it is lower-cased, so bindings keep working with caps lock on. The other
/// phases report key codes, which are looked up in the special key and
/// punctuation tables before falling back to the code's own character.
pub fn character_from_event(event: &RawKeyEvent) -> Option<String> {
    if event.action == KeyAction::Press {
        let c = char::from_u32(event.which).filter(|c| *c != '\0')?;
        return Some(if event.modifiers.shift {
            c.to_string()
        } else {
            c.to_lowercase().to_string()
        });
    }

    if let Some(name) = keytable::special_key(event.which) {
        return Some(name.to_string());
    }
    if let Some(name) = keytable::punctuation(event.which) {
        return Some(name.to_string());
    }

    // Keydown and keyup always report the upper-case code
    char::from_u32(event.which)
        .filter(|c| *c != '\0')
        .map(|c| c.to_lowercase().to_string())
}

pub fn normalize(event: &RawKeyEvent) -> Option<CanonicalKeyEvent> {
    let character = character_from_event(event)?;
    Some(CanonicalKeyEvent {
        character,
        modifiers: event.modifiers,
        action: event.action,
    })
}
