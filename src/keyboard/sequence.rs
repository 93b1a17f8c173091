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

//! Progress tracking for multi-key sequences.
//!
//! Several sequences can share a prefix (`"g i"` and `"g t"`), so every
//! sequence keeps its own level: the number of its keys matched so far.
//! Progress is abandoned when the user pauses for longer than the
//! inactivity window, when a sequence completes, or when a key of the
//! expected phase fails to continue it.

use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use tracing::trace;

use crate::keyboard::{event::KeyAction, timer::Timer};

#[derive(Debug)]
pub(crate) struct SequenceTracker {
    levels: HashMap<String, usize>,
    lengths: HashMap<String, usize>,
    expected_action: Option<KeyAction>,
    ignore_next_keyup: Option<String>,
    ignore_next_keypress: bool,
    reset_timer: Timer,
    settle_timer: Timer,
    timeout: Duration,
    settle_delay: Duration,
}

impl SequenceTracker {
    pub(crate) fn new(timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            levels: HashMap::new(),
            lengths: HashMap::new(),
            expected_action: None,
            ignore_next_keyup: None,
            ignore_next_keypress: false,
            reset_timer: Timer::default(),
            settle_timer: Timer::default(),
            timeout,
            settle_delay,
        }
    }

    /// Starts tracking a sequence of `length` keys at level 0.
    pub(crate) fn register(&mut self, sequence: &str, length: usize) {
        self.levels.insert(sequence.to_string(), 0);
        self.lengths.insert(sequence.to_string(), length);
    }

    pub(crate) fn level(&self, sequence: &str) -> usize {
        self.levels.get(sequence).copied().unwrap_or(0)
    }

    pub(crate) fn expected_action(&self) -> Option<KeyAction> {
        self.expected_action
    }

    /// Records a matched intermediate key and restarts the inactivity window.
    pub(crate) fn advance(&mut self, sequence: &str, next: KeyAction, now: Instant) {
        self.expected_action = Some(next);
        let max = self.lengths.get(sequence).copied().unwrap_or(0);
        if let Some(level) = self.levels.get_mut(sequence) {
            *level = (*level + 1).min(max);
            trace!(sequence, level = *level, "Sequence advanced");
        }
        self.reset_timer.arm(now, self.timeout);
    }

    /// Records a completed sequence. The keyup of `character` is swallowed,
    /// and all progress is dropped once the settle delay has passed.
    pub(crate) fn complete(&mut self, character: Option<String>, now: Instant) {
        if character.is_some() {
            self.ignore_next_keyup = character;
        }
        self.settle_timer.arm(now, self.settle_delay);
    }

    /// Resets every sequence not in `keep`. The expected action is cleared
    /// when nothing is kept.
    pub(crate) fn reset_except(&mut self, keep: &HashSet<String>) {
        let mut active = false;
        for (sequence, level) in self.levels.iter_mut() {
            if keep.contains(sequence) {
                active = true;
                continue;
            }
            *level = 0;
        }

        if !active {
            self.expected_action = None;
        }
    }

    pub(crate) fn reset_all(&mut self) {
        self.reset_except(&HashSet::new());
    }

    /// Runs the reset for each timer whose deadline has passed.
    pub(crate) fn poll(&mut self, now: Instant) {
        if self.reset_timer.fire(now) {
            trace!("Sequence inactivity window elapsed");
            self.reset_all();
        }
        if self.settle_timer.fire(now) {
            self.reset_all();
        }
    }

    /// Consumes the ignore-next-keyup flag if it was set for `character`.
    pub(crate) fn take_ignored_keyup(&mut self, character: &str) -> bool {
        if self.ignore_next_keyup.as_deref() == Some(character) {
            self.ignore_next_keyup = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn ignore_next_keypress(&self) -> bool {
        self.ignore_next_keypress
    }

    pub(crate) fn set_ignore_next_keypress(&mut self, ignore: bool) {
        self.ignore_next_keypress = ignore;
    }

    /// Forgets all sequences and cancels pending timers.
    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.lengths.clear();
        self.expected_action = None;
        self.ignore_next_keyup = None;
        self.ignore_next_keypress = false;
        self.reset_timer.cancel();
        self.settle_timer.cancel();
    }
}
