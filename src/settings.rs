use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::sampling::SamplingDensity;

/// Where the calculation history is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Json,
    Sqlite,
}

impl HistoryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryBackend::Json => "json",
            HistoryBackend::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for HistoryBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(HistoryBackend::Json),
            "sqlite" => Ok(HistoryBackend::Sqlite),
            other => Err(format!("unknown history backend '{other}' (expected json or sqlite)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub sampling_density: SamplingDensity,
    pub history_backend: HistoryBackend,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring unreadable settings in {} ({err}); using defaults",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> UserSettings {
        self.data.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    pub fn sampling_density(&self) -> SamplingDensity {
        self.snapshot().sampling_density
    }

    pub fn history_backend(&self) -> HistoryBackend {
        self.snapshot().history_backend
    }

    pub fn update_sampling_density(&self, density: SamplingDensity) -> Result<()> {
        self.update(|settings| settings.sampling_density = density)
    }

    pub fn update_history_backend(&self, backend: HistoryBackend) -> Result<()> {
        self.update(|settings| settings.history_backend = backend)
    }

    fn update(&self, apply: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        let mut next = guard.clone();
        apply(&mut next);
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
