use ratatui::style::{Color, Modifier, Style};

/// Router phase. Only ever advances, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Mode {
    AwaitingConnectionChoice,
    PickingConfig,
    Interacting,
}

impl Mode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Mode::AwaitingConnectionChoice => "connection-choice",
            Mode::PickingConfig => "picking-config",
            Mode::Interacting => "interacting",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    List,
    Repl,
}

impl Focus {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Focus::List => Focus::Repl,
            Focus::Repl => Focus::List,
        }
    }
}

/// Destination of a routed terminal event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Popup,
    Picker,
    List,
    Repl,
}

impl Route {
    pub(crate) fn all() -> [Route; 4] {
        [Route::Popup, Route::Picker, Route::List, Route::Repl]
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ThemePalette {
    pub(crate) prompt: Color,
    pub(crate) input_text: Color,
    pub(crate) muted_text: Color,
    pub(crate) highlight_fg: Color,
    pub(crate) highlight_bg: Color,
    pub(crate) title: Color,
    pub(crate) panel_bg: Color,
    pub(crate) panel_fg: Color,
    pub(crate) border: Color,
    pub(crate) focus_border: Color,
    pub(crate) accepted: Color,
    pub(crate) rejected: Color,
    pub(crate) directory: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        ThemePalette {
            prompt: Color::Rgb(192, 192, 192),
            input_text: Color::Rgb(224, 224, 224),
            muted_text: Color::Rgb(128, 128, 128),
            highlight_fg: Color::Rgb(255, 255, 255),
            highlight_bg: Color::Rgb(64, 64, 64),
            title: Color::Rgb(200, 200, 200),
            panel_bg: Color::Rgb(10, 10, 10),
            panel_fg: Color::Rgb(210, 210, 210),
            border: Color::Rgb(80, 80, 80),
            focus_border: Color::Rgb(100, 150, 200),
            accepted: Color::Rgb(120, 180, 120),
            rejected: Color::Rgb(220, 100, 100),
            directory: Color::Rgb(110, 160, 210),
        }
    }
}

impl ThemePalette {
    pub(crate) fn prompt_style(self) -> Style {
        Style::default()
            .fg(self.prompt)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn title_style(self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn body_style(self) -> Style {
        Style::default().fg(self.panel_fg)
    }

    pub(crate) fn muted_style(self) -> Style {
        Style::default().fg(self.muted_text)
    }

    pub(crate) fn input_style(self) -> Style {
        Style::default().fg(self.input_text)
    }

    pub(crate) fn panel_surface_style(self) -> Style {
        Style::default().bg(self.panel_bg).fg(self.panel_fg)
    }

    pub(crate) fn border_style(self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Border colour for the last REPL outcome; `None` before anything ran.
    pub(crate) fn outcome_style(self, last: Option<bool>) -> Style {
        match last {
            Some(true) => Style::default().fg(self.accepted),
            Some(false) => Style::default().fg(self.rejected),
            None => Style::default().fg(self.border),
        }
    }

    pub(crate) fn error_style(self) -> Style {
        Style::default().fg(self.rejected)
    }

    pub(crate) fn directory_style(self) -> Style {
        Style::default()
            .fg(self.directory)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn selected_style(self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }
}
