use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};

use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Turns the payload currently in a slot (if any) into the payload to store.
pub type SlotUpdate<'a> = dyn FnMut(Option<String>) -> Result<String> + 'a;

/// A single named slot holding the serialized history.
///
/// Reads return `None` when nothing has been stored yet. Every update replaces
/// the whole payload, and runs its read and write under one lock that also
/// excludes other processes sharing the slot.
pub trait HistoryStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    /// Read the slot, hand it to `apply`, store what `apply` returns. If `apply`
    /// fails nothing is written.
    fn update(&self, apply: &mut SlotUpdate<'_>) -> Result<()>;
    fn describe(&self) -> String;
}

/// History slot backed by one JSON file.
///
/// Updates hold an exclusive OS lock on a sidecar `<file>.lock` so separate
/// processes writing the same history take turns.
pub struct JsonFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create history directory {}", parent.display())
            })?;
        }
        let lock_path = path.with_extension("json.lock");
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("failed to open lock file {}", self.lock_path.display()))?;
        file.lock()
            .with_context(|| format!("failed to lock {}", self.lock_path.display()))?;
        Ok(file)
    }

    fn write(&self, payload: &str) -> Result<()> {
        // Write beside the target then rename so a crash never leaves half a file.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, payload)
            .with_context(|| format!("failed to write history to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("failed to move history into place at {}", self.path.display())
        })?;

        log_debug!("Persisted {} bytes of history to {}", payload.len(), self.path.display());
        Ok(())
    }
}

impl HistoryStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("failed to read history from {}", self.path.display()))),
        }
    }

    fn update(&self, apply: &mut SlotUpdate<'_>) -> Result<()> {
        // Released when the handle drops.
        let _lock = self.lock()?;
        let payload = apply(self.read()?)?;
        self.write(&payload)
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// In-process slot, for harnesses and tests.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(payload.into())),
        }
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| anyhow!("memory history slot poisoned"))?;
        Ok(guard.clone())
    }

    fn update(&self, apply: &mut SlotUpdate<'_>) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| anyhow!("memory history slot poisoned"))?;
        *guard = Some(apply(guard.clone())?);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory slot".into()
    }
}
