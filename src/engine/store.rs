use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

const WORKING_FILE: &str = "working.rw";
const CHECKPOINT_FILE: &str = "checkpoint.rw";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Working,
    Checkpoint,
}

impl Slot {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Slot::Working => "working",
            Slot::Checkpoint => "checkpoint",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("{action} {slot_name} buffer {shown}: {source}", slot_name = .slot.as_str(), shown = .path.display())]
    Io {
        action: &'static str,
        slot: Slot,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("working and checkpoint buffers must be distinct, both resolve to {0}")]
    SharedPath(PathBuf),
}

/// Two named byte slots backing the commit/rollback protocol. Contents are opaque bytes;
/// decoding is left to whoever displays them.
pub(crate) trait BufferStore {
    fn append(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError>;
    fn overwrite(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError>;
    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError>;
    fn clear(&mut self, slot: Slot) -> Result<(), StoreError>;
    /// Location handed to the engine process.
    fn locate(&self, slot: Slot) -> PathBuf;
}

pub(crate) struct FileBufferStore {
    working: PathBuf,
    checkpoint: PathBuf,
}

impl FileBufferStore {
    /// Creates both slots under `dir`, truncated to empty.
    pub(crate) fn create(dir: &Path) -> Result<Self, StoreError> {
        Self::with_paths(dir.join(WORKING_FILE), dir.join(CHECKPOINT_FILE))
    }

    pub(crate) fn with_paths(working: PathBuf, checkpoint: PathBuf) -> Result<Self, StoreError> {
        if working == checkpoint {
            return Err(StoreError::SharedPath(working));
        }
        if let Some(parent) = working.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                action: "create dir for",
                slot: Slot::Working,
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if let Some(parent) = checkpoint.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                action: "create dir for",
                slot: Slot::Checkpoint,
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut store = Self {
            working,
            checkpoint,
        };
        store.clear(Slot::Working)?;
        store.clear(Slot::Checkpoint)?;
        Ok(store)
    }

    fn path(&self, slot: Slot) -> &Path {
        match slot {
            Slot::Working => &self.working,
            Slot::Checkpoint => &self.checkpoint,
        }
    }

    fn io_err(&self, action: &'static str, slot: Slot) -> impl FnOnce(std::io::Error) -> StoreError {
        let path = self.path(slot).to_path_buf();
        move |source| StoreError::Io {
            action,
            slot,
            path,
            source,
        }
    }
}

impl BufferStore for FileBufferStore {
    fn append(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(slot))
            .map_err(self.io_err("open", slot))?;
        file.write_all(data)
            .map_err(self.io_err("append to", slot))?;
        file.sync_data().map_err(self.io_err("sync", slot))
    }

    fn overwrite(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        // Write a sibling file and rename it into place so the slot never holds a partial body.
        let target = self.path(slot).to_path_buf();
        let mut staged = target.clone().into_os_string();
        staged.push(".tmp");
        let staged = PathBuf::from(staged);

        let mut file = File::create(&staged).map_err(self.io_err("stage", slot))?;
        file.write_all(data)
            .map_err(self.io_err("write staged", slot))?;
        file.sync_data().map_err(self.io_err("sync staged", slot))?;
        drop(file);
        fs::rename(&staged, &target).map_err(self.io_err("replace", slot))
    }

    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(self.path(slot))
            .map_err(self.io_err("open", slot))?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(self.io_err("read", slot))?;
        Ok(raw)
    }

    fn clear(&mut self, slot: Slot) -> Result<(), StoreError> {
        // Truncate in place: the slot exists before, during and after the call.
        File::create(self.path(slot))
            .map(|_| ())
            .map_err(self.io_err("clear", slot))
    }

    fn locate(&self, slot: Slot) -> PathBuf {
        self.path(slot).to_path_buf()
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryBufferStore {
    working: Vec<u8>,
    checkpoint: Vec<u8>,
}

#[cfg(test)]
impl MemoryBufferStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Vec<u8> {
        match slot {
            Slot::Working => &mut self.working,
            Slot::Checkpoint => &mut self.checkpoint,
        }
    }
}

#[cfg(test)]
impl BufferStore for MemoryBufferStore {
    fn append(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        self.slot_mut(slot).extend_from_slice(data);
        Ok(())
    }

    fn overwrite(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        let buf = self.slot_mut(slot);
        buf.clear();
        buf.extend_from_slice(data);
        Ok(())
    }

    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError> {
        Ok(match slot {
            Slot::Working => self.working.clone(),
            Slot::Checkpoint => self.checkpoint.clone(),
        })
    }

    fn clear(&mut self, slot: Slot) -> Result<(), StoreError> {
        self.slot_mut(slot).clear();
        Ok(())
    }

    fn locate(&self, slot: Slot) -> PathBuf {
        PathBuf::from(format!(":memory:{}", slot.as_str()))
    }
}
