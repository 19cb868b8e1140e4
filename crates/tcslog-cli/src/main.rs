use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcslog_core::{
    attach_image_paths, build_frames, print_frames, run_night, save_frames, PipelineConfig,
    TemplateSet,
};

mod fits;

/// Reconstructs force-distribution, image and active-optics correction
/// tables from one night of telescope control logs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Night date of the log file (YYYY-MM-DD)
    date: String,

    /// Telescope unit whose log is analyzed
    #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
    ut: u8,

    /// Raw log file (default: wt{ut}tcs.{date}.log)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Observation metadata CSV (default: {date}.csv)
    #[arg(long)]
    obs: Option<PathBuf>,

    /// TOML file with extraction templates (default: built-in templates)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Folder of FITS files used to resolve image paths
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Folder to store the four result tables as CSV
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Print the result tables on the console
    #[arg(short, long)]
    console: bool,

    /// Write the plain-text run report to this path
    #[arg(short, long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let night = NaiveDate::parse_from_str(&cli.date, "%Y-%m-%d")
        .with_context(|| format!("invalid night date '{}'", cli.date))?;

    let log_path = cli
        .log
        .unwrap_or_else(|| PathBuf::from(format!("wt{}tcs.{}.log", cli.ut, cli.date)));
    let obs_path = cli
        .obs
        .unwrap_or_else(|| PathBuf::from(format!("{}.csv", cli.date)));

    let log_content = fs::read_to_string(&log_path)
        .with_context(|| format!("failed to read log file {}", log_path.display()))?;
    let obs_content = fs::read_to_string(&obs_path)
        .with_context(|| format!("failed to read observation table {}", obs_path.display()))?;

    let templates = match &cli.templates {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read template file {}", path.display()))?;
            TemplateSet::from_toml(&content)
                .with_context(|| format!("invalid template file {}", path.display()))?
        }
        None => TemplateSet::builtin(),
    };

    let config = PipelineConfig::default();
    let mut run = run_night(&log_content, &obs_content, night, &templates, &config)
        .context("pipeline run failed")?;

    if let Some(dir) = &cli.images {
        let headers = fits::scan_image_folder(dir)?;
        attach_image_paths(&mut run.entities.images, &headers);
    }

    let frames = build_frames(&run.entities).context("failed to build result tables")?;

    if let Some(dir) = &cli.save {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output folder {}", dir.display()))?;
        save_frames(&frames, dir)
            .with_context(|| format!("failed to save tables into {}", dir.display()))?;
    }

    if cli.console {
        print_frames(&frames);
    }

    if let Some(path) = &cli.report {
        fs::write(path, run.telemetry.report())
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    info!(
        corrections = run.entities.corrections.len(),
        force_distributions = run.entities.force_distributions.len(),
        images = run.entities.images.len(),
        additional = run.entities.additional.len(),
        "night reconstructed"
    );

    Ok(())
}
