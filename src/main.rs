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

//! # Key binding playground.
//!
//! A terminal application driven entirely by `keystack` bindings. It starts
//! in a `browse` context full of single keys and sequences, and `e` opens an
//! editor context where unbound characters are typed into a buffer.
//!
//! ## Architecture
//!
//! * The **Main Thread** owns the terminal, the context stack and rendering.
//! * An **Input Thread** forwards terminal key events.
//! * A **Tick Thread** drives sequence timeouts and queued context changes.
//!
//! Everything arrives on one `std::sync::mpsc` channel as an [`AppEvent`].
//! The terminal is always restored on exit, including after an error.

mod commander;
mod controllers;
mod events;
mod logging;
mod render;
mod theme;

use std::{
    collections::VecDeque,
    io::{self},
    path::PathBuf,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use keystack::{
    ContextStack,
    config::{self, KeyboardConfig},
    context::BindingDefinition,
    keyboard::event::{OPT_IN_CLASS, Target},
    surface::TerminalSurface,
};

use crate::{
    commander::Commander,
    controllers::{EditorController, MainController},
    events::{AppEvent, process_events},
    theme::Theme,
};

const DEFAULT_BINDINGS: &str = include_str!("../bindings/default.json");

/// Number of history entries kept.
pub(crate) const HISTORY_LIMIT: usize = 200;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Application state.
struct App {
    pub config: KeyboardConfig,

    pub theme: Theme,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub stack: ContextStack,
    pub main: Rc<MainController>,

    pub commander: Commander,

    pub buffer: String,
    pub history: VecDeque<String>,
    pub status: Option<String>,
    pub show_help: bool,

    pub surface: Option<TerminalSurface>,
}

impl App {
    /// Create a new instance of application state with the given binding
    /// definitions registered.
    pub fn new(config: KeyboardConfig, definitions: &[BindingDefinition]) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();

        let main = Rc::new(MainController::new(&event_tx));
        let mut stack = ContextStack::new(config.clone(), main.clone());
        main.install_editor(Rc::new(EditorController::new(&event_tx, stack.navigator())));

        stack.register_bindings(definitions);
        stack.state_changed().context("Failed to bind the initial contexts")?;

        Ok(Self {
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            stack,
            main,
            commander: Commander::new(),
            buffer: String::new(),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            status: None,
            show_help: false,
            surface: None,
        })
    }

    /// The element keys are currently typed into.
    ///
    /// The editor is editable but opts in to bindings, so its commands still
    /// fire while unbound characters fall through to typing.
    pub fn focus_target(&self) -> Target {
        if self.main.editing() {
            Target::editable().with_class(OPT_IN_CLASS).with_class("editor")
        } else {
            Target::default()
        }
    }
}

/// The built-in bindings followed by those from the configured bindings file.
fn load_definitions(config: &KeyboardConfig) -> Result<Vec<BindingDefinition>> {
    let mut definitions =
        config::parse_bindings(DEFAULT_BINDINGS).context("Failed to parse default bindings")?;

    if let Some(path) = &config.bindings_file {
        let extra = config::load_bindings(path)
            .with_context(|| format!("Failed to load bindings from {path}"))?;
        definitions.extend(extra);
    }

    Ok(definitions)
}

/// The entry point of the application.
///
/// Loads configuration and bindings, manages the terminal lifecycle, and
/// returns an error if any part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    let log_path = config
        .log_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let definitions = load_definitions(&config)?;
    let mut app = App::new(config, &definitions).context("Failed to initalise application")?;

    let mut terminal = setup_terminal(&mut app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal, &mut app);

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
/// * Asks the terminal to report key releases, where supported.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &mut App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    match TerminalSurface::connect(&mut stdout) {
        Ok(surface) => app.surface = Some(surface),
        Err(err) => tracing::warn!(error = %err, "Keyboard enhancement unavailable"),
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`]. It is best-effort
/// and does not return a result, as it runs during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) {
    if let Some(mut surface) = app.surface.take() {
        surface.disconnect(terminal.backend_mut()).ok();
    }
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to translate terminal key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read() {
                if tx_keys.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
        }
    });

    // Spawn a thread to send a periodic tick, this bounds how late a sequence
    // timeout can be noticed.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
