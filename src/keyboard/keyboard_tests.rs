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

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use super::*;
use crate::keyboard::{
    event::{Modifier, Target},
    timer::ManualClock,
};

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, name: &str) -> Callback {
    let log = log.clone();
    let name = name.to_string();
    Rc::new(move |_, _| {
        log.borrow_mut().push(name.clone());
        Ok(Flow::Continue)
    })
}

fn keyboard(config: KeyboardConfig) -> (Keyboard, ManualClock) {
    let clock = ManualClock::new();
    let keyboard = Keyboard::with_clock(config, Rc::new(clock.clone()));
    (keyboard, clock)
}

fn press(keyboard: &mut Keyboard, c: char) -> Outcome {
    keyboard.handle_event(&mut RawKeyEvent::press(c)).unwrap()
}

fn down(keyboard: &mut Keyboard, code: u32, modifiers: Modifiers) -> Outcome {
    let mut event = RawKeyEvent::new(KeyAction::Down, code).with_modifiers(modifiers);
    keyboard.handle_event(&mut event).unwrap()
}

fn up(keyboard: &mut Keyboard, code: u32, modifiers: Modifiers) -> Outcome {
    let mut event = RawKeyEvent::new(KeyAction::Up, code).with_modifiers(modifiers);
    keyboard.handle_event(&mut event).unwrap()
}

fn ctrl_shift() -> Modifiers {
    Modifiers::only(Modifier::Ctrl).with(Modifier::Shift)
}

#[test]
fn modifier_order_does_not_matter() {
    for combination in ["ctrl+shift+r", "shift+ctrl+r"] {
        let log = Log::default();
        let (mut keyboard, _) = keyboard(KeyboardConfig::default());
        keyboard
            .bind(&[combination], None, record(&log, "reload"))
            .unwrap();
        keyboard.bind(&["r"], None, record(&log, "plain")).unwrap();

        assert!(down(&mut keyboard, 'R' as u32, ctrl_shift()).is_match());
        assert_eq!(*log.borrow(), vec!["reload"]);
    }
}

#[test]
fn missing_modifier_does_not_fire() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["ctrl+shift+r"], None, record(&log, "reload")).unwrap();

    let outcome = down(&mut keyboard, 'R' as u32, Modifiers::only(Modifier::Ctrl));
    assert!(matches!(outcome, Outcome::Missed(key) if key.character == "r"));
    assert!(log.borrow().is_empty());
}

#[test]
fn rebinding_replaces_the_callback() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["a"], None, record(&log, "old")).unwrap();
    keyboard.bind(&["a"], None, record(&log, "new")).unwrap();

    press(&mut keyboard, 'a');
    press(&mut keyboard, 'a');
    assert_eq!(*log.borrow(), vec!["new", "new"]);
    assert_eq!(keyboard.binding_count(), 1);
}

#[test]
fn shared_prefix_sequences() {
    let log = Log::default();
    let (mut keyboard, clock) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();
    keyboard.bind(&["g t"], None, record(&log, "tasks")).unwrap();

    assert!(press(&mut keyboard, 'g').is_match());
    assert_eq!(keyboard.sequence_level("g i"), 1);
    assert_eq!(keyboard.sequence_level("g t"), 1);
    assert_eq!(keyboard.expected_action(), Some(KeyAction::Press));

    assert!(press(&mut keyboard, 'i').is_match());
    assert_eq!(*log.borrow(), vec!["inbox"]);
    assert_eq!(keyboard.sequence_level("g t"), 0);

    clock.advance(Duration::from_millis(10));
    keyboard.tick();
    assert_eq!(keyboard.sequence_level("g i"), 0);
    assert_eq!(keyboard.expected_action(), None);
}

#[test]
fn non_continuing_key_resets_sequences() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();
    keyboard.bind(&["g t"], None, record(&log, "tasks")).unwrap();

    press(&mut keyboard, 'g');
    assert!(matches!(press(&mut keyboard, 'e'), Outcome::Missed(_)));
    assert_eq!(keyboard.sequence_level("g i"), 0);
    assert_eq!(keyboard.sequence_level("g t"), 0);

    // The second key alone is no longer a continuation
    press(&mut keyboard, 'i');
    assert!(log.borrow().is_empty());
}

#[test]
fn sequence_expires_after_inactivity() {
    let log = Log::default();
    let (mut keyboard, clock) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();

    press(&mut keyboard, 'g');
    clock.advance(Duration::from_millis(999));
    keyboard.tick();
    assert_eq!(keyboard.sequence_level("g i"), 1);

    clock.advance(Duration::from_millis(1));
    keyboard.tick();
    assert_eq!(keyboard.sequence_level("g i"), 0);

    press(&mut keyboard, 'i');
    assert!(log.borrow().is_empty());
}

#[test]
fn each_key_restarts_the_inactivity_window() {
    let log = Log::default();
    let (mut keyboard, clock) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["a b c"], None, record(&log, "abc")).unwrap();

    press(&mut keyboard, 'a');
    clock.advance(Duration::from_millis(800));
    press(&mut keyboard, 'b');
    clock.advance(Duration::from_millis(800));
    press(&mut keyboard, 'c');
    assert_eq!(*log.borrow(), vec!["abc"]);
}

#[test]
fn modifier_keys_mid_sequence_keep_progress() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    let ctrl = Modifiers::only(Modifier::Ctrl);
    keyboard
        .bind(&["ctrl+k ctrl+c"], None, record(&log, "comment"))
        .unwrap();

    down(&mut keyboard, 17, ctrl);
    down(&mut keyboard, 'K' as u32, ctrl);
    assert_eq!(keyboard.sequence_level("ctrl+k ctrl+c"), 1);
    assert_eq!(keyboard.expected_action(), Some(KeyAction::Down));

    up(&mut keyboard, 'K' as u32, ctrl);
    up(&mut keyboard, 17, Modifiers::none());
    down(&mut keyboard, 17, ctrl);
    assert_eq!(keyboard.sequence_level("ctrl+k ctrl+c"), 1);

    down(&mut keyboard, 'C' as u32, ctrl);
    assert_eq!(*log.borrow(), vec!["comment"]);
}

#[test]
fn keyup_of_completing_key_is_swallowed_once() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();
    keyboard
        .bind(&["i"], Some(KeyAction::Up), record(&log, "release"))
        .unwrap();

    press(&mut keyboard, 'g');
    press(&mut keyboard, 'i');
    assert_eq!(up(&mut keyboard, 'I' as u32, Modifiers::none()), Outcome::Ignored);
    assert!(up(&mut keyboard, 'I' as u32, Modifiers::none()).is_match());
    assert_eq!(*log.borrow(), vec!["inbox", "release"]);
}

#[test]
fn sequences_win_over_prefix_combinations() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g"], None, record(&log, "plain")).unwrap();
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();

    press(&mut keyboard, 'g');
    assert!(log.borrow().is_empty());
    press(&mut keyboard, 'i');
    assert_eq!(*log.borrow(), vec!["inbox"]);
}

#[test]
fn prefix_combinations_fire_when_configured() {
    let log = Log::default();
    let config = KeyboardConfig {
        trigger_prefix_combos: true,
        ..KeyboardConfig::default()
    };
    let (mut keyboard, _) = keyboard(config);
    keyboard.bind(&["g"], None, record(&log, "plain")).unwrap();
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();

    press(&mut keyboard, 'g');
    press(&mut keyboard, 'i');
    assert_eq!(*log.borrow(), vec!["plain", "inbox"]);
}

#[test]
fn only_deepest_sequence_fires() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["a b"], None, record(&log, "ab")).unwrap();
    keyboard.bind(&["b"], None, record(&log, "b")).unwrap();
    keyboard.bind(&["b c"], None, record(&log, "bc")).unwrap();

    press(&mut keyboard, 'a');
    press(&mut keyboard, 'b');
    assert_eq!(*log.borrow(), vec!["ab"]);
    assert_eq!(keyboard.sequence_level("b c"), 0);
}

#[test]
fn failing_callback_suppresses_and_propagates() {
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard
        .bind(&["x"], None, Rc::new(|_, _| Err(anyhow::anyhow!("boom"))))
        .unwrap();

    let mut event = RawKeyEvent::press('x');
    let err = keyboard.handle_event(&mut event).unwrap_err();
    assert!(matches!(err, KeyboardError::Callback { ref combination, .. } if combination == "x"));
    assert!(event.is_default_prevented());
    assert!(event.is_propagation_stopped());
}

#[test]
fn failing_callback_still_resets_sequences() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["g i"], None, record(&log, "inbox")).unwrap();
    keyboard
        .bind(&["e"], None, Rc::new(|_, _| Err(anyhow::anyhow!("boom"))))
        .unwrap();

    press(&mut keyboard, 'g');
    assert_eq!(keyboard.sequence_level("g i"), 1);

    assert!(keyboard.handle_event(&mut RawKeyEvent::press('e')).is_err());
    assert_eq!(keyboard.sequence_level("g i"), 0);

    assert!(!press(&mut keyboard, 'i').is_match());
    assert!(log.borrow().is_empty());
}

#[test]
fn failing_sequence_callback_still_completes() {
    let log = Log::default();
    let (mut keyboard, clock) = keyboard(KeyboardConfig::default());
    keyboard
        .bind(&["g i"], None, Rc::new(|_, _| Err(anyhow::anyhow!("boom"))))
        .unwrap();
    keyboard.bind(&["g t"], None, record(&log, "tasks")).unwrap();

    press(&mut keyboard, 'g');
    let err = keyboard.handle_event(&mut RawKeyEvent::press('i')).unwrap_err();
    assert!(matches!(err, KeyboardError::Callback { ref combination, .. } if combination == "g i"));
    assert_eq!(keyboard.sequence_level("g t"), 0);

    // The release of the final key is swallowed as after a successful match
    assert_eq!(up(&mut keyboard, 'I' as u32, Modifiers::none()), Outcome::Ignored);

    clock.advance(Duration::from_millis(10));
    assert!(!press(&mut keyboard, 't').is_match());
    assert_eq!(keyboard.sequence_level("g i"), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn stop_flow_suppresses_the_event() {
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard
        .bind(&["s"], None, Rc::new(|_, _| Ok(Flow::Stop)))
        .unwrap();
    keyboard
        .bind(&["c"], None, Rc::new(|_, _| Ok(Flow::Continue)))
        .unwrap();

    let mut event = RawKeyEvent::press('s');
    keyboard.handle_event(&mut event).unwrap();
    assert!(event.is_default_prevented());

    let mut event = RawKeyEvent::press('c');
    keyboard.handle_event(&mut event).unwrap();
    assert!(!event.is_default_prevented());
}

#[test]
fn callback_receives_the_bound_combination() {
    let seen = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    let sink = seen.clone();
    keyboard
        .bind(
            &["g  i", "?"],
            None,
            Rc::new(move |_, combination| {
                sink.borrow_mut().push(combination.to_string());
                Ok(Flow::Continue)
            }),
        )
        .unwrap();

    press(&mut keyboard, 'g');
    press(&mut keyboard, 'i');
    let mut event = RawKeyEvent::press('?').with_modifiers(Modifiers::only(Modifier::Shift));
    keyboard.handle_event(&mut event).unwrap();
    assert_eq!(*seen.borrow(), vec!["g i", "?"]);
}

#[test]
fn editable_targets_are_skipped_when_configured() {
    let log = Log::default();
    let config = KeyboardConfig {
        not_in_editables: true,
        ..KeyboardConfig::default()
    };
    let (mut keyboard, _) = keyboard(config);
    keyboard.bind(&["a"], None, record(&log, "a")).unwrap();

    let mut event = RawKeyEvent::press('a').with_target(Target::editable());
    keyboard.handle_event(&mut event).unwrap();
    assert!(log.borrow().is_empty());

    let target = Target::editable().with_class(OPT_IN_CLASS);
    let mut event = RawKeyEvent::press('a').with_target(target);
    keyboard.handle_event(&mut event).unwrap();
    assert_eq!(*log.borrow(), vec!["a"]);
}

#[test]
fn custom_stop_callback() {
    let log = Log::default();
    let config = KeyboardConfig {
        not_in_editables: true,
        ..KeyboardConfig::default()
    };
    let (mut keyboard, _) = keyboard(config);
    keyboard.set_stop_callback(Rc::new(|_, _, combination| combination == "b"));
    keyboard.bind(&["a", "b"], None, record(&log, "hit")).unwrap();

    press(&mut keyboard, 'a');
    press(&mut keyboard, 'b');
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn trigger_fires_the_literal_binding() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["ctrl+k"], None, record(&log, "k")).unwrap();
    keyboard
        .bind(&["g i"], Some(KeyAction::Up), record(&log, "gi"))
        .unwrap();

    assert!(keyboard.trigger("ctrl+k", None).unwrap());
    assert!(keyboard.trigger("g i", Some(KeyAction::Up)).unwrap());
    assert!(!keyboard.trigger("g i", None).unwrap());
    assert!(!keyboard.trigger("ctrl+j", None).unwrap());
    assert_eq!(*log.borrow(), vec!["k", "gi"]);
}

#[test]
fn bind_mapped_uses_the_keymap() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.set_keymap(HashMap::from([(
        "save".to_string(),
        vec!["ctrl+s".to_string(), "meta+s".to_string()],
    )]));

    keyboard.bind_mapped("save", None, record(&log, "save")).unwrap();
    down(&mut keyboard, 'S' as u32, Modifiers::only(Modifier::Meta));
    assert_eq!(*log.borrow(), vec!["save"]);

    let err = keyboard
        .bind_mapped("open", None, record(&log, "open"))
        .err()
        .unwrap();
    assert!(matches!(err, KeyboardError::UnknownAlias(alias) if alias == "open"));
}

#[test]
fn bad_sequences_bind_nothing() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    let err = keyboard
        .bind(&["g hyper+i"], None, record(&log, "bad"))
        .err()
        .unwrap();
    assert!(matches!(err, KeyboardError::UnknownModifier { .. }));
    assert_eq!(keyboard.binding_count(), 0);

    assert!(matches!(
        keyboard.bind(&["   "], None, record(&log, "bad")),
        Err(KeyboardError::MalformedCombination(_))
    ));
}

#[test]
fn reset_forgets_everything() {
    let log = Log::default();
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    keyboard.bind(&["a", "g i"], None, record(&log, "x")).unwrap();
    press(&mut keyboard, 'g');

    keyboard.reset();
    assert_eq!(keyboard.binding_count(), 0);
    assert_eq!(keyboard.expected_action(), None);
    assert!(!keyboard.trigger("a", None).unwrap());
    assert!(matches!(press(&mut keyboard, 'a'), Outcome::Missed(_)));
}

#[test]
fn keyless_events_are_ignored() {
    let (mut keyboard, _) = keyboard(KeyboardConfig::default());
    let mut event = RawKeyEvent::synthetic(KeyAction::Down);
    assert_eq!(keyboard.handle_event(&mut event).unwrap(), Outcome::Ignored);
}

#[test]
fn instances_do_not_share_state() {
    let log = Log::default();
    let (mut first, _) = keyboard(KeyboardConfig::default());
    let (mut second, _) = keyboard(KeyboardConfig::default());
    first.bind(&["g i"], None, record(&log, "first")).unwrap();
    second.bind(&["g i"], None, record(&log, "second")).unwrap();

    press(&mut first, 'g');
    assert_eq!(second.sequence_level("g i"), 0);
    press(&mut second, 'i');
    assert!(log.borrow().is_empty());
}
