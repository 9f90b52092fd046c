use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

mod history;
mod runner;
mod store;

pub(crate) use history::{CommandHistory, CommandRecord};
pub(crate) use runner::{EngineRunner, Invocation, ProcessRunner};
#[cfg(test)]
pub(crate) use store::MemoryBufferStore;
pub(crate) use store::{BufferStore, FileBufferStore, Slot, StoreError};

/// Leading output byte an engine uses to reject a statement.
pub(crate) const REJECTION_SENTINEL: u8 = b'|';

#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("could not launch engine {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("engine did not finish within {}s", .after.as_secs_f32())]
    Timeout { after: Duration },
    #[error("reading engine output: {0}")]
    Output(#[source] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) output: String,
    pub(crate) success: bool,
}

pub(crate) fn classify(output: &[u8]) -> bool {
    output.first() != Some(&REJECTION_SENTINEL)
}

/// Runs statements against the engine so that a rejected statement leaves no trace in the
/// working buffer.
pub(crate) struct Session {
    store: Box<dyn BufferStore>,
    runner: Box<dyn EngineRunner>,
    config_path: Option<PathBuf>,
    history: CommandHistory,
}

impl Session {
    pub(crate) fn new(store: Box<dyn BufferStore>, runner: Box<dyn EngineRunner>) -> Self {
        Self {
            store,
            runner,
            config_path: None,
            history: CommandHistory::new(),
        }
    }

    pub(crate) fn submit(&mut self, statement: &str) -> Result<Outcome, EngineError> {
        let result = self.run_transaction(statement);
        match &result {
            Ok(outcome) => {
                self.history
                    .push(statement, outcome.output.clone(), outcome.success);
            }
            Err(err) => {
                self.history.push(statement, err.to_string(), false);
            }
        }
        result
    }

    fn run_transaction(&mut self, statement: &str) -> Result<Outcome, EngineError> {
        let snapshot = self.store.read(Slot::Checkpoint)?;
        let mut line = Vec::with_capacity(statement.len() + 1);
        line.extend_from_slice(statement.as_bytes());
        line.push(b'\n');
        if let Err(err) = self.store.append(Slot::Working, &line) {
            // A partial append may have landed; restore before reporting.
            self.rollback(&snapshot);
            return Err(err.into());
        }

        let program = self.store.locate(Slot::Working);
        let invocation = Invocation {
            program: &program,
            config: self.config_path.as_deref(),
        };
        let raw = match self.runner.run(&invocation) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "engine fault, rolling back");
                self.rollback(&snapshot);
                return Err(err);
            }
        };

        let success = classify(&raw);
        let output = String::from_utf8_lossy(&raw).into_owned();
        let settled = if success {
            self.commit()
        } else {
            self.store.overwrite(Slot::Working, &snapshot)
        };
        if let Err(err) = settled {
            self.rollback(&snapshot);
            return Err(err.into());
        }
        if success {
            tracing::info!("statement committed");
        } else {
            tracing::info!("statement rejected, working buffer rolled back");
        }
        Ok(Outcome { output, success })
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let committed = self.store.read(Slot::Working)?;
        self.store.overwrite(Slot::Checkpoint, &committed)
    }

    fn rollback(&mut self, snapshot: &[u8]) {
        if let Err(err) = self.store.overwrite(Slot::Working, snapshot) {
            tracing::error!(error = %err, "rollback of working buffer failed");
        }
    }

    /// Empties both buffers, then the history. Nothing is forgotten unless both clears land.
    pub(crate) fn reset(&mut self) -> Result<(), EngineError> {
        let snapshot = self.store.read(Slot::Working)?;
        self.store.clear(Slot::Working)?;
        if let Err(err) = self.store.clear(Slot::Checkpoint) {
            tracing::warn!(error = %err, "reset failed, restoring working buffer");
            self.rollback(&snapshot);
            return Err(err.into());
        }
        self.history.clear();
        tracing::info!("session reset");
        Ok(())
    }

    pub(crate) fn configure(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::info!(config = %path.display(), "engine configuration selected");
        self.config_path = Some(path);
    }

    pub(crate) fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub(crate) fn engine_path(&self) -> &Path {
        self.runner.binary()
    }

    pub(crate) fn history(&self) -> &CommandHistory {
        &self.history
    }

    #[cfg(test)]
    pub(crate) fn working_text(&self) -> Result<String, EngineError> {
        let raw = self.store.read(Slot::Working)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    #[cfg(test)]
    pub(crate) fn checkpoint_text(&self) -> Result<String, EngineError> {
        let raw = self.store.read(Slot::Checkpoint)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
