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

//! Binding records, keyed by the character they react to.

use std::collections::HashMap;

use crate::keyboard::{
    Callback,
    event::{KeyAction, Modifier, Modifiers},
    sequence::SequenceTracker,
};

/// Position of a record within a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SequenceSlot {
    pub(crate) sequence: String,
    pub(crate) position: usize,
}

/// What happens when a record matches.
#[derive(Clone)]
pub(crate) enum Handler {
    /// A plain combination.
    Fire(Callback),
    /// An intermediate sequence key; `next` is the phase the following key
    /// is expected in.
    Advance { next: KeyAction },
    /// The last key of a sequence.
    Complete {
        callback: Callback,
        action: Option<KeyAction>,
    },
}

#[derive(Clone)]
pub(crate) struct BindingRecord {
    pub(crate) character: String,
    pub(crate) modifiers: Modifiers,
    pub(crate) action: KeyAction,
    pub(crate) slot: Option<SequenceSlot>,
    pub(crate) combination: String,
    pub(crate) handler: Handler,
}

impl BindingRecord {
    fn same_identity(&self, other: &BindingRecord) -> bool {
        self.combination == other.combination
            && self.action == other.action
            && self.slot == other.slot
    }
}

#[derive(Default)]
pub(crate) struct BindingRegistry {
    records: HashMap<String, Vec<BindingRecord>>,
}

impl BindingRegistry {
    /// Adds a record, replacing any record with the same identity.
    ///
    /// Sequence records go to the front of their character's list, since
    /// dispatch must see them before plain combinations on the same key.
    pub(crate) fn register(&mut self, record: BindingRecord) {
        let records = self.records.entry(record.character.clone()).or_default();
        records.retain(|existing| !existing.same_identity(&record));

        if record.slot.is_some() {
            records.insert(0, record);
        } else {
            records.push(record);
        }
    }

    /// Returns owned copies of every record matching the event, in
    /// registration order.
    pub(crate) fn matches(
        &self,
        character: &str,
        modifiers: Modifiers,
        action: KeyAction,
        sequences: &SequenceTracker,
    ) -> Vec<BindingRecord> {
        let Some(records) = self.records.get(character) else {
            return vec![];
        };

        // A modifier released on its own carries only itself
        let compare_with = match Modifier::from_name(character) {
            Some(modifier) if action == KeyAction::Up => Modifiers::only(modifier),
            _ => modifiers,
        };

        // The character phase cannot report modifiers reliably on every
        // platform, so it is matched on the character alone unless ctrl or
        // meta is held
        let character_only = action == KeyAction::Press && !modifiers.ctrl && !modifiers.meta;

        records
            .iter()
            .filter(|record| match &record.slot {
                Some(slot) => sequences.level(&slot.sequence) == slot.position,
                None => true,
            })
            .filter(|record| record.action == action)
            .filter(|record| character_only || record.modifiers == compare_with)
            .cloned()
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}
