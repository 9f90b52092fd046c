#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommandRecord {
    pub(crate) input: String,
    pub(crate) output: String,
    pub(crate) success: bool,
}

#[derive(Debug, Default)]
pub(crate) struct CommandHistory {
    records: Vec<CommandRecord>,
}

impl CommandHistory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, input: &str, output: impl Into<String>, success: bool) {
        self.records.push(CommandRecord {
            input: input.to_string(),
            output: output.into(),
            success,
        });
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn records(&self) -> &[CommandRecord] {
        &self.records
    }

    pub(crate) fn last(&self) -> Option<&CommandRecord> {
        self.records.last()
    }

    /// Inputs newest-last, used for Up/Down recall in the REPL.
    pub(crate) fn inputs(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.records.iter().map(|r| r.input.as_str())
    }
}
