use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::engine::{CommandRecord, Session};

/// Terminal rows around the history text: status bar, statement panel and the history borders.
const HISTORY_CHROME: usize = 6;

/// Statement editor in front of the engine session.
pub(crate) struct Repl {
    session: Session,
    pub(crate) input: String,
    pub(crate) cursor: usize,
    recall_pos: Option<usize>,
    pub(crate) status: String,
    pub(crate) last_ok: Option<bool>,
    pub(crate) error: Option<String>,
    /// History lines scrolled back from the bottom.
    pub(crate) scroll_back: usize,
    pub(crate) size: (u16, u16),
}

impl Repl {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            input: String::new(),
            cursor: 0,
            recall_pos: None,
            status: String::new(),
            last_ok: None,
            error: None,
            scroll_back: 0,
            size: (0, 0),
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn records(&self) -> &[CommandRecord] {
        self.session.history().records()
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => self.reset(),
                KeyCode::Char('a') => self.cursor = 0,
                KeyCode::Char('e') => self.cursor = self.input.len(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_current_line(),
            KeyCode::PageUp => {
                self.scroll_back = (self.scroll_back + self.page()).min(self.max_scroll_back());
            }
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(self.page()),
            KeyCode::Up => self.recall_prev(),
            KeyCode::Down => self.recall_next(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            KeyCode::Char(c) => self.insert_char(c),
            _ => {}
        }
    }

    fn page(&self) -> usize {
        (self.size.1 / 2).max(1) as usize
    }

    /// Rows the history pane draws: each statement, its output lines, then any fault.
    pub(crate) fn history_rows(&self) -> usize {
        let records: usize = self
            .records()
            .iter()
            .map(|record| 1 + record.output.lines().count())
            .sum();
        records + usize::from(self.error.is_some())
    }

    fn max_scroll_back(&self) -> usize {
        let visible = (self.size.1 as usize).saturating_sub(HISTORY_CHROME);
        self.history_rows().saturating_sub(visible)
    }

    fn submit_current_line(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        let statement = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.recall_pos = None;
        self.scroll_back = 0;

        match self.session.submit(&statement) {
            Ok(outcome) => {
                self.error = None;
                self.last_ok = Some(outcome.success);
                self.status = if outcome.success {
                    "accepted".to_string()
                } else {
                    "rejected, rolled back".to_string()
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "submit failed");
                self.last_ok = Some(false);
                self.error = Some(err.to_string());
                self.status = "engine fault, rolled back".to_string();
            }
        }
    }

    fn reset(&mut self) {
        self.recall_pos = None;
        self.scroll_back = 0;
        match self.session.reset() {
            Ok(()) => {
                self.error = None;
                self.last_ok = None;
                self.status = "Cleared buffer".to_string();
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.status = "reset failed".to_string();
            }
        }
    }

    fn recall_prev(&mut self) {
        let len = self.session.history().len();
        if len == 0 {
            return;
        }
        let next = match self.recall_pos {
            None => len - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.recall(Some(next));
    }

    fn recall_next(&mut self) {
        let Some(i) = self.recall_pos else {
            return;
        };
        if i + 1 >= self.session.history().len() {
            self.recall(None);
        } else {
            self.recall(Some(i + 1));
        }
    }

    fn recall(&mut self, pos: Option<usize>) {
        self.recall_pos = pos;
        self.input = pos
            .and_then(|i| self.session.history().inputs().nth(i))
            .unwrap_or_default()
            .to_string();
        self.cursor = self.input.len();
    }

    /// Pasted text lands on the single input line; line breaks become spaces.
    pub(crate) fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(if c == '\n' { ' ' } else { c });
        }
    }

    fn insert_char(&mut self, c: char) {
        if self.cursor >= self.input.len() {
            self.input.push(c);
        } else {
            self.input.insert(self.cursor, c);
        }
        self.cursor += c.len_utf8();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if let Some((prev_idx, _)) = self.input[..self.cursor].char_indices().last() {
            self.input.drain(prev_idx..self.cursor);
            self.cursor = prev_idx;
        }
    }

    fn delete(&mut self) {
        let Some(ch) = self.input[self.cursor..].chars().next() else {
            return;
        };
        let end = self.cursor + ch.len_utf8();
        self.input.drain(self.cursor..end);
    }

    fn move_left(&mut self) {
        if let Some((prev_idx, _)) = self.input[..self.cursor].char_indices().last() {
            self.cursor = prev_idx;
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.input[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }
}
