pub mod acquisition;
pub mod app;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod estimation;
pub mod history;
pub mod models;
pub mod overlay;
pub mod pixels;
pub mod sampling;
pub mod settings;
pub mod utils;

use std::io;

use anyhow::Result;
use clap::Parser;

pub use app::{CalculateOptions, StainApp};
pub use error::{EstimationError, HistoryDecodeError};
pub use estimation::{calculate, calculate_with, estimate, Calculation};
pub use history::{HistoryRecovery, HistoryStorage, HistoryStore};
pub use models::{CalculationResult, Point};
pub use pixels::{classify, PixelBuffer, RawPixelBuffer};
pub use sampling::{generate, generate_with, SamplingDensity};

use cli::{Cli, Commands, SettingsAction};

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (reads RUST_LOG env var)
    utils::init_logging(cli.verbose);

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => app::default_data_dir()?,
    };
    log::debug!("Using data directory {}", data_dir.display());

    let app = StainApp::open(&data_dir)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Calculate {
            image,
            points,
            seed,
            label,
            overlay,
            no_record,
            json,
        } => commands::calculate(
            &app,
            commands::CalculateArgs {
                image: &image,
                density: points,
                seed,
                label,
                overlay: overlay.as_deref(),
                dry_run: no_record,
                json,
            },
            &mut out,
        ),
        Commands::History { limit, json } => commands::history(&app, limit, json, &mut out),
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::show_settings(&app, &mut out),
            SettingsAction::SetDensity { points } => commands::set_density(&app, points, &mut out),
            SettingsAction::SetBackend { backend } => commands::set_backend(&app, backend, &mut out),
        },
    }
}
