pub(crate) const CONNECT_QUESTION: &str = "Connect to the list server?";

/// Rendering state of the connection question. The router owns the actual answer.
#[derive(Debug)]
pub(crate) struct Popup {
    pub(crate) question: String,
    pub(crate) highlighted: bool,
    pub(crate) size: (u16, u16),
}

impl Popup {
    pub(crate) fn new(question: impl Into<String>, initial: bool) -> Self {
        Self {
            question: question.into(),
            highlighted: initial,
            size: (0, 0),
        }
    }

    pub(crate) fn highlight(&mut self, choice: bool) {
        self.highlighted = choice;
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }
}
