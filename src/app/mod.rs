use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::{Config, ConnectPolicy};
use crate::engine::Session;
use crate::remote::ListService;

mod input;
mod list;
mod picker;
mod popup;
mod repl;
mod runtime;
#[cfg(test)]
mod tests;
mod types;
mod ui;

use list::ListView;
use picker::{Picker, PickerEvent};
use popup::{Popup, CONNECT_QUESTION};
use repl::Repl;
pub(crate) use runtime::run_app;
pub(crate) use types::{Focus, Mode, Route, ThemePalette};

pub(crate) const CONNECT_FAILED: &str = "Could not connect to server.";
pub(crate) const CONNECT_SKIPPED: &str = "Server contact skipped.";

pub(crate) struct App {
    mode: Mode,
    connected: bool,
    focus: Focus,
    popup_choice: bool,
    connect_policy: ConnectPolicy,
    connect_attempts: usize,
    should_quit: bool,
    popup: Popup,
    picker: Picker,
    list: ListView,
    repl: Repl,
    service: Box<dyn ListService>,
    theme: ThemePalette,
}

impl App {
    pub(crate) fn new(session: Session, service: Box<dyn ListService>, config: &Config) -> Self {
        let popup_choice = true;
        Self {
            mode: Mode::AwaitingConnectionChoice,
            connected: false,
            focus: Focus::Repl,
            popup_choice,
            connect_policy: config.connect_policy,
            connect_attempts: 0,
            should_quit: false,
            popup: Popup::new(CONNECT_QUESTION, popup_choice),
            picker: Picker::new(&config.config_dir, config.config_exts.clone()),
            list: ListView::new(),
            repl: Repl::new(session),
            service,
            theme: ThemePalette::default(),
        }
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn theme_palette(&self) -> ThemePalette {
        self.theme
    }

    /// Moves to `next` if it lies ahead of the current mode; never moves back.
    fn advance(&mut self, next: Mode) {
        if next <= self.mode {
            return;
        }
        tracing::info!(from = self.mode.as_str(), to = next.as_str(), "mode change");
        self.mode = next;
    }
}
