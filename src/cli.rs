use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::sampling::SamplingDensity;
use crate::settings::HistoryBackend;

#[derive(Parser)]
#[command(name = "stain-area")]
#[command(version, about = "Estimate the area of a white stain in a binary mask by random sampling", long_about = None)]
pub struct Cli {
    /// Directory holding settings and calculation history
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the stain area of an image and record it in the history
    Calculate {
        /// Binary mask: pure white pixels are stain, everything else background
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Random points to draw (100-10000); defaults to the saved setting
        #[arg(short = 'n', long, value_name = "N", value_parser = parse_density)]
        points: Option<SamplingDensity>,

        /// Seed the sampler for a reproducible run
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Name recorded in the history (defaults to the file name)
        #[arg(long, value_name = "NAME")]
        label: Option<String>,

        /// Write a PNG with the sampled points drawn over the image
        #[arg(long, value_name = "FILE")]
        overlay: Option<PathBuf>,

        /// Do not record the result in the history
        #[arg(long)]
        no_record: bool,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show previous calculations, newest first
    History {
        /// Show at most N results
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,

        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings
    Show,

    /// Set the default number of random points per calculation
    SetDensity {
        #[arg(value_name = "N", value_parser = parse_density)]
        points: SamplingDensity,
    },

    /// Choose where history is stored: json or sqlite
    SetBackend {
        #[arg(value_name = "BACKEND")]
        backend: HistoryBackend,
    },
}

fn parse_density(value: &str) -> Result<SamplingDensity, String> {
    let points: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    SamplingDensity::new(points).map_err(|err| err.to_string())
}
