use super::*;

impl App {
    /// Applies one terminal event. Quit is checked before anything mode-specific.
    pub(super) fn handle_event(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            if is_quit(key) {
                tracing::info!("quit requested");
                self.should_quit = true;
                return;
            }
            if self.mode == Mode::Interacting && is_focus_toggle(key) {
                self.focus = self.focus.toggled();
                tracing::debug!(focus = ?self.focus, "focus toggled");
                return;
            }
        }

        for route in self.routes(event) {
            self.dispatch(route, event);
        }
    }

    /// Sub-models that should receive `event` in the current state.
    pub(super) fn routes(&self, event: &Event) -> Vec<Route> {
        match event {
            Event::Resize(_, _) => Route::all().to_vec(),
            Event::Key(key) if is_quit(key) => Vec::new(),
            Event::Key(key) => match self.mode {
                Mode::AwaitingConnectionChoice => vec![Route::Popup],
                Mode::PickingConfig => vec![Route::Picker],
                Mode::Interacting if is_focus_toggle(key) => Vec::new(),
                Mode::Interacting => self.focused_route().into_iter().collect(),
            },
            Event::Paste(_) if self.mode == Mode::Interacting => {
                self.focused_route().filter(|r| *r == Route::Repl).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    fn focused_route(&self) -> Option<Route> {
        match self.focus {
            Focus::Repl => Some(Route::Repl),
            Focus::List if self.connected => Some(Route::List),
            Focus::List => None,
        }
    }

    pub(super) fn dispatch(&mut self, route: Route, event: &Event) {
        match *event {
            Event::Resize(width, height) => match route {
                Route::Popup => self.popup.resize(width, height),
                Route::Picker => self.picker.resize(width, height),
                Route::List => self.list.resize(width, height),
                Route::Repl => self.repl.resize(width, height),
            },
            Event::Key(key) => match route {
                Route::Popup => self.handle_popup_key(key),
                Route::Picker => {
                    if let Some(PickerEvent::Selected(path)) = self.picker.handle_key(key) {
                        self.repl.session_mut().configure(path);
                        self.advance(Mode::Interacting);
                    }
                }
                Route::List => self.list.handle_key(key),
                Route::Repl => self.repl.handle_key(key),
            },
            Event::Paste(ref text) => {
                if route == Route::Repl {
                    self.repl.insert_str(text);
                }
            }
            _ => {}
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('h')
            | KeyCode::Char('l')
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab => {
                self.popup_choice = !self.popup_choice;
                self.popup.highlight(self.popup_choice);
                return;
            }
            KeyCode::Char('y') => true,
            KeyCode::Char('n') => false,
            KeyCode::Enter => self.popup_choice,
            _ => return,
        };
        self.popup_choice = answer;
        self.popup.highlight(answer);
        self.advance(Mode::PickingConfig);

        if self.connect_policy == ConnectPolicy::OnYes && !answer {
            tracing::info!("server contact declined");
            self.connected = false;
            self.list.set_error(CONNECT_SKIPPED);
            return;
        }
        self.connect();
    }

    /// Handshake then list fetch. A failure only marks the app disconnected.
    fn connect(&mut self) {
        self.connect_attempts += 1;
        let result = self
            .service
            .handshake()
            .and_then(|()| self.service.fetch_items());
        match result {
            Ok(items) => {
                tracing::info!(
                    attempt = self.connect_attempts,
                    items = items.len(),
                    "connected to list server"
                );
                self.connected = true;
                self.list.set_items(items);
            }
            Err(err) => {
                tracing::warn!(
                    attempt = self.connect_attempts,
                    error = %err,
                    "list server unreachable"
                );
                self.connected = false;
                self.list.set_error(format!("{CONNECT_FAILED} {err}"));
            }
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn is_focus_toggle(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('n')
}
