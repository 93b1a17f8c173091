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

//! Terminal key input.
//!
//! A terminal reports one event per key press, and key releases only when the
//! keyboard enhancement protocol is enabled. This module turns those into the
//! three phases the [`Keyboard`](crate::keyboard::Keyboard) works with:
//!
//! * a press becomes a keydown carrying the virtual key code, followed by a
//!   character event when the key produces a character,
//! * a release becomes a keyup.
//!
//! # Compatibility
//!
//! Release events need a terminal implementing the kitty keyboard protocol
//! (Kitty, WezTerm, foot, Ghostty and others). Elsewhere bindings on the
//! keyup phase never fire, everything else behaves the same.

use std::io::{self, Write};

use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use tracing::debug;

use crate::keyboard::{
    event::{KeyAction, Modifier, Modifiers, RawKeyEvent},
    keytable,
};

/// Key release reporting for the lifetime of a terminal session.
#[derive(Debug)]
pub struct TerminalSurface {
    enhanced: bool,
}

impl TerminalSurface {
    /// Enables key release reporting on `out` if the terminal supports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the enhancement flags cannot be written.
    pub fn connect<W: Write>(out: &mut W) -> io::Result<Self> {
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                )
            )?;
        }
        debug!(enhanced, "Connected terminal surface");
        Ok(Self { enhanced })
    }

    /// Whether the terminal reports key releases.
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }

    /// Restores the terminal's original key reporting.
    pub fn disconnect<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.enhanced {
            execute!(out, PopKeyboardEnhancementFlags)?;
            self.enhanced = false;
        }
        Ok(())
    }
}

/// Translates a terminal key event into raw key events, in the order they
/// should be dispatched.
pub fn translate(key: &KeyEvent) -> Vec<RawKeyEvent> {
    let mut modifiers = modifiers(key.modifiers);
    if key.code == KeyCode::BackTab {
        modifiers.insert(Modifier::Shift);
    }

    let raw = |action, which| RawKeyEvent::new(action, which).with_modifiers(modifiers);
    let code = key_code(key.code);

    match key.kind {
        KeyEventKind::Release => code.map(|code| raw(KeyAction::Up, code)).into_iter().collect(),
        KeyEventKind::Press | KeyEventKind::Repeat => {
            let mut events: Vec<RawKeyEvent> =
                code.map(|code| raw(KeyAction::Down, code)).into_iter().collect();
            if let Some(c) = character(key.code, &modifiers) {
                events.push(raw(KeyAction::Press, c as u32));
            }
            events
        }
    }
}

fn modifiers(flags: KeyModifiers) -> Modifiers {
    let mut modifiers = Modifiers::none();
    if flags.contains(KeyModifiers::SHIFT) {
        modifiers.insert(Modifier::Shift);
    }
    if flags.contains(KeyModifiers::CONTROL) {
        modifiers.insert(Modifier::Ctrl);
    }
    if flags.contains(KeyModifiers::ALT) {
        modifiers.insert(Modifier::Alt);
    }
    if flags.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        modifiers.insert(Modifier::Meta);
    }
    modifiers
}

/// The virtual key code a browser would report for the key.
fn key_code(code: KeyCode) -> Option<u32> {
    let name = match code {
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => return keytable::keydown_code(c.encode_utf8(&mut [0; 4])),
        KeyCode::Backspace => "backspace",
        KeyCode::Tab | KeyCode::BackTab => "tab",
        KeyCode::Enter => "enter",
        KeyCode::Esc => "esc",
        KeyCode::CapsLock => "capslock",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::End => "end",
        KeyCode::Home => "home",
        KeyCode::Left => "left",
        KeyCode::Up => "up",
        KeyCode::Right => "right",
        KeyCode::Down => "down",
        KeyCode::Insert => "ins",
        KeyCode::Delete => "del",
        KeyCode::F(n) if (1..=19).contains(&n) => return Some(111 + u32::from(n)),
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "shift",
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "ctrl",
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "alt",
            ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta => "meta",
            _ => return None,
        },
        _ => return None,
    };
    keytable::keydown_code(name)
}

/// The character a key produces. Held ctrl, alt or meta suppress it.
fn character(code: KeyCode, modifiers: &Modifiers) -> Option<char> {
    match code {
        KeyCode::Char(c) if !modifiers.ctrl && !modifiers.alt && !modifiers.meta => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        config::KeyboardConfig,
        keyboard::{Flow, Keyboard, event::normalize},
    };

    fn release(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Release)
    }

    fn phases(events: &[RawKeyEvent]) -> Vec<(KeyAction, u32)> {
        events.iter().map(|e| (e.action, e.which)).collect()
    }

    #[test]
    fn character_keys_yield_keydown_then_press() {
        let events = translate(&KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE));
        assert_eq!(
            phases(&events),
            vec![(KeyAction::Down, 71), (KeyAction::Press, 'g' as u32)]
        );

        let events = translate(&KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT));
        let canonical: Vec<_> = events.iter().filter_map(normalize).collect();
        assert_eq!(canonical[0].character, "/");
        assert!(canonical[0].modifiers.shift);
        assert_eq!(canonical[1].character, "?");
    }

    #[test]
    fn modified_keys_have_no_character() {
        let events = translate(&KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert_eq!(phases(&events), vec![(KeyAction::Down, 75)]);
        assert!(events[0].modifiers.ctrl);
    }

    #[test]
    fn releases_yield_keyup() {
        let events = translate(&release(KeyCode::Char('g'), KeyModifiers::NONE));
        assert_eq!(phases(&events), vec![(KeyAction::Up, 71)]);

        let events = translate(&release(
            KeyCode::Modifier(ModifierKeyCode::LeftShift),
            KeyModifiers::NONE,
        ));
        assert_eq!(phases(&events), vec![(KeyAction::Up, 16)]);
    }

    #[test]
    fn special_keys() {
        let code = |code| phases(&translate(&KeyEvent::new(code, KeyModifiers::NONE)));
        assert_eq!(code(KeyCode::Esc), vec![(KeyAction::Down, 27)]);
        assert_eq!(code(KeyCode::F(5)), vec![(KeyAction::Down, 116)]);
        assert_eq!(code(KeyCode::Left), vec![(KeyAction::Down, 37)]);
        assert!(code(KeyCode::F(24)).is_empty());
        assert_eq!(
            code(KeyCode::Char(' ')),
            vec![(KeyAction::Down, 32), (KeyAction::Press, 32)]
        );

        let events = translate(&KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE));
        assert_eq!(phases(&events), vec![(KeyAction::Down, 9)]);
        assert!(events[0].modifiers.shift);
    }

    #[test]
    fn characters_without_key_codes_still_press() {
        let events = translate(&KeyEvent::new(KeyCode::Char('é'), KeyModifiers::NONE));
        assert_eq!(phases(&events), vec![(KeyAction::Press, 'é' as u32)]);
    }

    #[test]
    fn translated_events_drive_bindings() {
        let fired = Rc::new(RefCell::new(vec![]));
        let mut keyboard = Keyboard::new(KeyboardConfig::default());
        for keys in ["g i", "ctrl+k", "esc"] {
            let fired = fired.clone();
            keyboard
                .bind(
                    &[keys],
                    None,
                    Rc::new(move |_, combination| {
                        fired.borrow_mut().push(combination.to_string());
                        Ok(Flow::Continue)
                    }),
                )
                .unwrap();
        }

        let presses = [
            KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE),
            release(KeyCode::Char('g'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE),
            release(KeyCode::Char('i'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL),
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        ];
        for key in &presses {
            for mut event in translate(key) {
                keyboard.handle_event(&mut event).unwrap();
            }
        }

        assert_eq!(*fired.borrow(), vec!["g i", "ctrl+k", "esc"]);
    }
}
