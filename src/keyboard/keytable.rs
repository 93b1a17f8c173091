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

//! Static key tables for the US reference layout.
//!
//! Key codes follow the conventional virtual key numbering used by
//! keydown/keyup events. Nothing in here can be reached by the character
//! phase, which reports the produced character directly.

/// Non-printable, navigation and modifier keys.
const NAMED_KEYS: &[(u32, &str)] = &[
    (8, "backspace"),
    (9, "tab"),
    (13, "enter"),
    (16, "shift"),
    (17, "ctrl"),
    (18, "alt"),
    (20, "capslock"),
    (27, "esc"),
    (32, "space"),
    (33, "pageup"),
    (34, "pagedown"),
    (35, "end"),
    (36, "home"),
    (37, "left"),
    (38, "up"),
    (39, "right"),
    (40, "down"),
    (45, "ins"),
    (46, "del"),
    (91, "meta"),
    (93, "meta"),
    (224, "meta"),
];

/// Punctuation reported by keydown/keyup. Main keyboard codes come before
/// their numeric keypad twins so reverse lookups prefer the main keyboard.
const PUNCTUATION: &[(u32, &str)] = &[
    (186, ";"),
    (187, "="),
    (188, ","),
    (189, "-"),
    (190, "."),
    (191, "/"),
    (192, "`"),
    (219, "["),
    (220, "\\"),
    (221, "]"),
    (222, "'"),
    (106, "*"),
    (107, "+"),
    (109, "-"),
    (110, "."),
    (111, "/"),
];

/// Characters that need shift on a US keyboard, with their unshifted key.
const SHIFTED: &[(&str, &str)] = &[
    ("~", "`"),
    ("!", "1"),
    ("@", "2"),
    ("#", "3"),
    ("$", "4"),
    ("%", "5"),
    ("^", "6"),
    ("&", "7"),
    ("*", "8"),
    ("(", "9"),
    (")", "0"),
    ("_", "-"),
    ("+", "="),
    (":", ";"),
    ("\"", "'"),
    ("<", ","),
    (">", "."),
    ("?", "/"),
    ("|", "\\"),
];

const NUMPAD_DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const FUNCTION_KEYS: [&str; 19] = [
    "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "f13", "f14",
    "f15", "f16", "f17", "f18", "f19",
];

const NUMPAD_CODES: std::ops::RangeInclusive<u32> = 96..=105;
const FUNCTION_CODES: std::ops::RangeInclusive<u32> = 112..=130;

/// Looks up the name of a special key from its key code.
pub fn special_key(code: u32) -> Option<&'static str> {
    if NUMPAD_CODES.contains(&code) {
        return Some(NUMPAD_DIGITS[(code - 96) as usize]);
    }
    if FUNCTION_CODES.contains(&code) {
        return Some(FUNCTION_KEYS[(code - 112) as usize]);
    }
    NAMED_KEYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Looks up a punctuation character from its key code.
pub fn punctuation(code: u32) -> Option<&'static str> {
    PUNCTUATION
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Returns the unshifted key for a character that requires shift.
pub fn unshifted(key: &str) -> Option<&'static str> {
    SHIFTED
        .iter()
        .find(|(shifted, _)| *shifted == key)
        .map(|(_, plain)| *plain)
}

/// Resolves the alternative spellings accepted in combination strings.
pub fn alias(key: &str) -> Option<&'static str> {
    match key {
        "option" => Some("alt"),
        "command" => Some("meta"),
        "return" => Some("enter"),
        "escape" => Some("esc"),
        "mod" if cfg!(target_os = "macos") => Some("meta"),
        "mod" => Some("ctrl"),
        _ => None,
    }
}

/// Whether the key can only be observed on keydown/keyup.
///
/// Numeric keypad digits are excluded: the character phase reports them
/// like any other digit.
pub fn requires_keydown(key: &str) -> bool {
    NAMED_KEYS.iter().any(|(_, name)| *name == key) || FUNCTION_KEYS.contains(&key)
}

pub fn is_modifier(key: &str) -> bool {
    matches!(key, "shift" | "ctrl" | "alt" | "meta")
}

/// Whether `key` names something a binding can refer to.
pub fn is_known_key(key: &str) -> bool {
    key.chars().count() == 1
        || requires_keydown(key)
        || PUNCTUATION.iter().any(|(_, name)| *name == key)
}

/// Key code reported on keydown/keyup for a named key or single character.
///
/// Letters report their upper-case code and shifted characters report the
/// code of their unshifted key, as a physical keyboard would.
pub fn keydown_code(key: &str) -> Option<u32> {
    if let Some(&(code, _)) = NAMED_KEYS.iter().find(|(_, name)| *name == key) {
        return Some(code);
    }
    if let Some(index) = FUNCTION_KEYS.iter().position(|name| *name == key) {
        return Some(112 + index as u32);
    }
    if let Some(&(code, _)) = PUNCTUATION.iter().find(|(_, name)| *name == key) {
        return Some(code);
    }
    if let Some(plain) = unshifted(key) {
        return keydown_code(plain);
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_uppercase() as u32),
        _ => None,
    }
}
