use crossterm::event::{KeyCode, KeyEvent};

use crate::remote::ListItem;

#[derive(Debug, Default)]
pub(crate) struct ListView {
    pub(crate) items: Vec<ListItem>,
    pub(crate) selected: usize,
    pub(crate) error: Option<String>,
    pub(crate) size: (u16, u16),
}

impl ListView {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_items(&mut self, items: Vec<ListItem>) {
        self.items = items;
        self.selected = 0;
        self.error = None;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.items.clear();
        self.selected = 0;
        self.error = Some(message.into());
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    pub(crate) fn selected_item(&self) -> Option<&ListItem> {
        self.items.get(self.selected)
    }

    /// Rows visible inside the pane border.
    fn page(&self) -> usize {
        (self.size.1.saturating_sub(2) as usize).max(1)
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        let last = self.items.len().saturating_sub(1);
        match key.code {
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(self.page()),
            KeyCode::PageDown => self.selected = (self.selected + self.page()).min(last),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = last,
            _ => {}
        }
    }
}
