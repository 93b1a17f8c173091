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

//! # Keyboard bindings with sequences and contexts.
//!
//! Raw key events are normalized into a character, a modifier set and a
//! phase (keydown, character, keyup), then matched against bound
//! combinations such as `"ctrl+shift+r"` and sequences such as `"g i"`.
//!
//! ## Layers
//!
//! * [`keyboard::Keyboard`] binds callbacks to combinations and dispatches
//!   events to them, tracking sequence progress.
//! * [`context::ContextStack`] layers named contexts over a root binding
//!   set. Bindings are authored as JSON definitions naming commands, and
//!   each context's commands run against the controller that entered it.
//! * [`surface`] translates terminal key events.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use keystack::{
//!     config::KeyboardConfig,
//!     keyboard::{Flow, Keyboard, Outcome, event::RawKeyEvent},
//! };
//!
//! let mut keyboard = Keyboard::new(KeyboardConfig::default());
//! keyboard
//!     .bind(&["g i"], None, Rc::new(|_, keys| {
//!         println!("{keys}");
//!         Ok(Flow::Stop)
//!     }))
//!     .unwrap();
//!
//! keyboard.handle_event(&mut RawKeyEvent::press('g')).unwrap();
//! let outcome = keyboard.handle_event(&mut RawKeyEvent::press('i')).unwrap();
//! assert_eq!(outcome, Outcome::Matched);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod keyboard;
pub mod surface;

pub use context::ContextStack;
pub use error::{KeyboardError, Result};
pub use keyboard::{Flow, Keyboard, Outcome};
