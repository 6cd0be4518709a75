//! Command handlers behind the CLI.
//!
//! Each handler takes the opened [`StainApp`] and writes human-readable (or
//! JSON) output to the given writer.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{presets::UTF8_FULL_CONDENSED, CellAlignment, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::acquisition::load_image;
use crate::app::{CalculateOptions, StainApp};
use crate::models::CalculationResult;
use crate::overlay::save_overlay;
use crate::sampling::SamplingDensity;
use crate::settings::HistoryBackend;

pub struct CalculateArgs<'a> {
    pub image: &'a Path,
    pub density: Option<SamplingDensity>,
    pub seed: Option<u64>,
    pub label: Option<String>,
    pub overlay: Option<&'a Path>,
    pub dry_run: bool,
    pub json: bool,
}

pub fn calculate(app: &StainApp, args: CalculateArgs<'_>, out: &mut impl Write) -> Result<()> {
    let loaded = load_image(args.image)?;
    let label = args.label.unwrap_or_else(|| loaded.file_name.clone());

    let options = CalculateOptions {
        density: args.density,
        dry_run: args.dry_run,
    };
    let calculation = match args.seed {
        Some(seed) => app.calculate_with(&mut StdRng::seed_from_u64(seed), &loaded.pixels, &label, options)?,
        None => app.calculate(&loaded.pixels, &label, options)?,
    };

    if let Some(path) = args.overlay {
        save_overlay(&loaded.pixels, &calculation.points, path)?;
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &calculation.result)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", format_result_panel(&calculation.result))?;
        if let Some(path) = args.overlay {
            writeln!(out, "Overlay written to {}", path.display())?;
        }
        if args.dry_run {
            writeln!(out, "(not recorded in history)")?;
        }
    }
    Ok(())
}

pub fn history(app: &StainApp, limit: Option<usize>, json: bool, out: &mut impl Write) -> Result<()> {
    let results = app.history().current();
    let shown = &results[..limit.unwrap_or(results.len()).min(results.len())];

    if json {
        serde_json::to_writer_pretty(&mut *out, shown)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(recovery) = app.history().recovery() {
        writeln!(out, "warning: {recovery}")?;
    }
    write!(out, "{}", format_history_table(shown, results.len()))?;
    Ok(())
}

pub fn show_settings(app: &StainApp, out: &mut impl Write) -> Result<()> {
    let settings = app.settings().snapshot();
    writeln!(out, "sampling density: {} points", settings.sampling_density)?;
    writeln!(out, "history backend:  {}", settings.history_backend.as_str())?;
    Ok(())
}

pub fn set_density(app: &StainApp, density: SamplingDensity, out: &mut impl Write) -> Result<()> {
    app.settings()
        .update_sampling_density(density)
        .context("failed to save sampling density")?;
    writeln!(out, "sampling density set to {density} points")?;
    Ok(())
}

pub fn set_backend(app: &StainApp, backend: HistoryBackend, out: &mut impl Write) -> Result<()> {
    app.settings()
        .update_history_backend(backend)
        .context("failed to save history backend")?;
    writeln!(
        out,
        "history backend set to {} (takes effect on the next run)",
        backend.as_str()
    )?;
    Ok(())
}

pub fn format_result_panel(result: &CalculationResult) -> String {
    format!(
        "Calculation results for {}\n\
         \x20 Total points:          {}\n\
         \x20 Points in stain:       {}\n\
         \x20 Total image area:      {} px²\n\
         \x20 Estimated stain area:  {:.2} px²\n\
         \x20 Area percentage:       {:.2}%\n",
        result.image_file_name,
        result.total_points,
        result.points_in_stain,
        result.total_area(),
        result.estimated_area,
        result.area_percentage,
    )
}

pub fn format_history_table(results: &[CalculationResult], total: usize) -> String {
    if results.is_empty() {
        return "No previous calculations to show.\n".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
        "Date",
        "Image",
        "Total points",
        "Stain points",
        "Dimensions (px)",
        "Est. area (px²)",
        "Percentage",
    ]);
    for r in results {
        table.add_row(vec![
            r.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            r.image_file_name.clone(),
            r.total_points.to_string(),
            r.points_in_stain.to_string(),
            format!("{} × {}", r.image_width, r.image_height),
            format!("{:.2}", r.estimated_area),
            format!("{:.2}%", r.area_percentage),
        ]);
    }
    for index in [2, 3, 5, 6] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    format!("{table}\nTotal: {total} calculations\n")
}
