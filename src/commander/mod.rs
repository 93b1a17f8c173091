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

//! Command-line input logic and state management.
//!
//! While active, the command line takes every key event away from the
//! bindings. Submitting a line sends the matching application event.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::events::AppEvent;

pub(crate) struct Commander {
    active: bool,
    pub(crate) input: Input,
}

impl Commander {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            input: Input::default(),
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
        self.input.reset();
    }

    /// Returns `true` if the event was consumed by the command line.
    pub(crate) fn handle_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<bool> {
        if !self.active {
            return Ok(false);
        }

        let Event::Key(key_event) = event else {
            return Ok(false);
        };

        if key_event.kind == KeyEventKind::Release {
            return Ok(true);
        }

        match key_event.code {
            KeyCode::Esc => {
                self.active = false;
                self.input.reset();
            }

            KeyCode::Enter => {
                let buffer = self.input.value().trim();
                if !buffer.is_empty() {
                    event_tx.send(parse_command(buffer))?;
                }
                self.active = false;
                self.input.reset();
            }

            _ => {
                self.input.handle_event(event);
            }
        }

        Ok(true)
    }
}

/// Maps a command line to the event it requests.
pub(crate) fn parse_command(buffer: &str) -> AppEvent {
    let parts: Vec<&str> = buffer.split_whitespace().collect();

    match parts.as_slice() {
        ["q"] | ["quit"] => AppEvent::ExitApplication,
        ["edit"] => AppEvent::OpenEditor,
        ["home"] => AppEvent::CloseEditor,
        ["reload"] => AppEvent::ReloadBindings,
        ["help"] => AppEvent::ShowHelp,
        ["exit", name] => AppEvent::ExitContext(name.to_string()),
        ["trigger", keys @ ..] if !keys.is_empty() => AppEvent::Trigger(keys.join(" ")),
        _ => AppEvent::Error(format!("Unknown command: {buffer}")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn commands_are_parsed() {
        assert_eq!(parse_command("q"), AppEvent::ExitApplication);
        assert_eq!(parse_command("exit selection"), AppEvent::ExitContext("selection".to_string()));
        assert_eq!(parse_command("trigger g   i"), AppEvent::Trigger("g i".to_string()));
        assert_eq!(parse_command("reload"), AppEvent::ReloadBindings);
    }

    #[test]
    fn incomplete_commands_are_errors() {
        assert_eq!(parse_command("trigger"), AppEvent::Error("Unknown command: trigger".to_string()));
        assert!(matches!(parse_command("exit a b"), AppEvent::Error(_)));
    }

    #[test]
    fn inactive_commander_passes_events_through() {
        let (event_tx, _event_rx) = mpsc::channel();
        let mut commander = Commander::new();
        assert!(!commander.handle_event(&key(KeyCode::Char('q')), &event_tx).unwrap());
    }

    #[test]
    fn submitting_sends_the_command_and_deactivates() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut commander = Commander::new();
        commander.activate();

        for c in "edit".chars() {
            assert!(commander.handle_event(&key(KeyCode::Char(c)), &event_tx).unwrap());
        }
        assert_eq!(commander.input.value(), "edit");

        commander.handle_event(&key(KeyCode::Enter), &event_tx).unwrap();
        assert_eq!(event_rx.try_recv().unwrap(), AppEvent::OpenEditor);
        assert!(!commander.active());
        assert_eq!(commander.input.value(), "");
    }

    #[test]
    fn escape_cancels_without_sending() {
        let (event_tx, event_rx) = mpsc::channel();
        let mut commander = Commander::new();
        commander.activate();
        commander.handle_event(&key(KeyCode::Char('q')), &event_tx).unwrap();

        assert!(commander.handle_event(&key(KeyCode::Esc), &event_tx).unwrap());
        assert!(!commander.active());
        assert!(event_rx.try_recv().is_err());
    }
}
