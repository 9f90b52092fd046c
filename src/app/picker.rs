use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PickerEvent {
    Selected(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PickerEntry {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) is_dir: bool,
}

/// Directory browser that only surfaces files with an allowed extension.
#[derive(Debug)]
pub(crate) struct Picker {
    pub(crate) dir: PathBuf,
    pub(crate) entries: Vec<PickerEntry>,
    pub(crate) selected: usize,
    pub(crate) error: Option<String>,
    pub(crate) size: (u16, u16),
    allowed: Vec<String>,
}

impl Picker {
    pub(crate) fn new(start: &Path, allowed: Vec<String>) -> Self {
        let dir = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        let mut picker = Self {
            dir,
            entries: Vec::new(),
            selected: 0,
            error: None,
            size: (0, 0),
            allowed,
        };
        picker.refresh();
        picker
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Option<PickerEvent> {
        let last = self.entries.len().saturating_sub(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(self.page()),
            KeyCode::PageDown => self.selected = (self.selected + self.page()).min(last),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.ascend(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let entry = self.entries.get(self.selected)?.clone();
                if entry.is_dir {
                    self.enter(entry.path);
                } else if key.code == KeyCode::Enter {
                    tracing::info!(path = %entry.path.display(), "configuration picked");
                    return Some(PickerEvent::Selected(entry.path));
                }
            }
            _ => {}
        }
        None
    }

    fn page(&self) -> usize {
        (self.size.1.saturating_sub(3) as usize).max(1)
    }

    fn ascend(&mut self) {
        if let Some(parent) = self.dir.parent() {
            let parent = parent.to_path_buf();
            self.enter(parent);
        }
    }

    fn enter(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.selected = 0;
        self.refresh();
    }

    fn refresh(&mut self) {
        match read_entries(&self.dir, &self.allowed) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(dir = %self.dir.display(), error = %err, "cannot list directory");
                self.entries.clear();
                self.error = Some(format!("cannot read {}: {err}", self.dir.display()));
            }
        }
    }
}

fn read_entries(dir: &Path, allowed: &[String]) -> std::io::Result<Vec<PickerEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Follows symlinks so a linked directory can still be entered.
        let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
        if is_dir {
            dirs.push(PickerEntry { name, path, is_dir });
        } else if has_allowed_ext(&path, allowed) {
            files.push(PickerEntry { name, path, is_dir });
        }
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    Ok(dirs)
}

fn has_allowed_ext(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
