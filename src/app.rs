//! Wires settings, history and the calculation pipeline together.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rand::Rng;

use crate::db::SqliteStorage;
use crate::estimation::{self, Calculation};
use crate::history::{HistoryStorage, HistoryStore, JsonFileStorage};
use crate::pixels::PixelBuffer;
use crate::sampling::SamplingDensity;
use crate::settings::{HistoryBackend, SettingsStore};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

pub const DATA_DIR_ENV: &str = "STAIN_AREA_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.json";
const DATABASE_FILE: &str = "stain-area.sqlite3";

/// `STAIN_AREA_DATA_DIR` if set, otherwise the platform data directory.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("stain-area"))
        .ok_or_else(|| anyhow!("no data directory available; pass --data-dir or set {DATA_DIR_ENV}"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalculateOptions {
    /// Overrides the configured sampling density for this run only.
    pub density: Option<SamplingDensity>,
    /// Skip appending the result to the history.
    pub dry_run: bool,
}

pub struct StainApp {
    settings: SettingsStore,
    history: HistoryStore,
}

impl StainApp {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let storage = open_storage(data_dir, settings.history_backend())?;
        let history = HistoryStore::open(storage)?;

        if let Some(recovery) = history.recovery() {
            log_warn!("{recovery}");
        }

        Ok(Self::from_parts(settings, history))
    }

    pub fn from_parts(settings: SettingsStore, history: HistoryStore) -> Self {
        Self { settings, history }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn calculate<B: PixelBuffer + ?Sized>(
        &self,
        buffer: &B,
        label: &str,
        options: CalculateOptions,
    ) -> Result<Calculation> {
        self.calculate_with(&mut rand::thread_rng(), buffer, label, options)
    }

    /// Sample, classify and estimate in one pass, then record the result
    /// unless this is a dry run.
    pub fn calculate_with<R: Rng + ?Sized, B: PixelBuffer + ?Sized>(
        &self,
        rng: &mut R,
        buffer: &B,
        label: &str,
        options: CalculateOptions,
    ) -> Result<Calculation> {
        let density = options
            .density
            .unwrap_or_else(|| self.settings.sampling_density());

        let calculation = estimation::calculate_with(rng, buffer, density, label)
            .with_context(|| format!("failed to estimate stain area for {label}"))?;

        log_info!(
            "{label}: estimated {:.2} px² ({:.2}%) from {} points",
            calculation.result.estimated_area,
            calculation.result.area_percentage,
            calculation.result.total_points
        );

        if !options.dry_run {
            self.history.append(calculation.result.clone())?;
        }

        Ok(calculation)
    }
}

fn open_storage(data_dir: &Path, backend: HistoryBackend) -> Result<Box<dyn HistoryStorage>> {
    let storage: Box<dyn HistoryStorage> = match backend {
        HistoryBackend::Json => Box::new(JsonFileStorage::new(data_dir.join(HISTORY_FILE))?),
        HistoryBackend::Sqlite => Box::new(SqliteStorage::new(data_dir.join(DATABASE_FILE))?),
    };
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStorage;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn memory_app(dir: &Path) -> StainApp {
        let settings = SettingsStore::new(dir.join(SETTINGS_FILE)).unwrap();
        let history = HistoryStore::open(Box::new(MemoryStorage::new())).unwrap();
        StainApp::from_parts(settings, history)
    }

    #[test]
    fn uses_configured_density_and_records() {
        let dir = tempdir().unwrap();
        let app = memory_app(dir.path());
        app.settings()
            .update_sampling_density(SamplingDensity::new(250).unwrap())
            .unwrap();

        let image = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let calculation = app
            .calculate(&image, "white.png", CalculateOptions::default())
            .unwrap();

        assert_eq!(calculation.result.total_points, 250);
        assert_eq!(app.history().latest(), Some(calculation.result));
    }

    #[test]
    fn override_density_and_dry_run() {
        let dir = tempdir().unwrap();
        let app = memory_app(dir.path());
        let image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));

        let options = CalculateOptions {
            density: Some(SamplingDensity::new(100).unwrap()),
            dry_run: true,
        };
        let mut rng = StdRng::seed_from_u64(11);
        let calculation = app.calculate_with(&mut rng, &image, "dark.png", options).unwrap();

        assert_eq!(calculation.result.total_points, 100);
        assert!(app.history().is_empty());
    }

    #[test]
    fn backend_setting_selects_storage() {
        let dir = tempdir().unwrap();
        {
            let settings = SettingsStore::new(dir.path().join(SETTINGS_FILE)).unwrap();
            settings.update_history_backend(HistoryBackend::Sqlite).unwrap();
        }

        let app = StainApp::open(dir.path()).unwrap();
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        app.calculate(&image, "db.png", CalculateOptions::default())
            .unwrap();

        assert!(dir.path().join(DATABASE_FILE).exists());
        assert!(!dir.path().join(HISTORY_FILE).exists());
    }
}
