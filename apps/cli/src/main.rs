// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! shedkit - build a timber garden building from a parameters file
//!
//! Loads a BuildingParameters JSON document, runs a full rebuild and writes
//! the scene as Wavefront OBJ plus an optional JSON build report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shedkit_core::{BuildingParameters, EngineConfig};
use shedkit_processing::{write_obj, BuildReport, Configurator};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "shedkit")]
#[command(about = "Parametric timber garden building generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a parameters file and export the scene
    Build {
        /// BuildingParameters JSON file
        params: PathBuf,
        /// OBJ output file (overrides SHEDKIT_OUTPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON build report (overrides SHEDKIT_REPORT)
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Engine constants JSON (overrides SHEDKIT_ENGINE_CONFIG)
        #[arg(short, long)]
        engine_config: Option<PathBuf>,
    },
    /// Print the default parameters and engine constants as JSON
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            params,
            output,
            report,
            engine_config,
        } => {
            if let Some(output) = output {
                config.output = output;
            }
            if report.is_some() {
                config.report = report;
            }
            if engine_config.is_some() {
                config.engine_config = engine_config;
            }
            build(&params, &config)?;
        }
        Commands::Defaults => {
            println!("{}", BuildingParameters::default().to_json()?);
            println!("{}", serde_json::to_string_pretty(&EngineConfig::default())?);
        }
    }

    Ok(())
}

fn build(params_path: &Path, config: &Config) -> Result<()> {
    tracing::info!(
        params = %params_path.display(),
        output = %config.output.display(),
        "Starting shedkit build"
    );

    let json = std::fs::read_to_string(params_path)
        .with_context(|| format!("reading parameters {}", params_path.display()))?;
    let params = BuildingParameters::from_json(&json)
        .with_context(|| format!("parsing parameters {}", params_path.display()))?;
    let engine = config.load_engine_config()?;

    let mut configurator = Configurator::new(params, engine)?;
    let report = configurator.rebuild_all()?;

    let file = File::create(&config.output)
        .with_context(|| format!("creating {}", config.output.display()))?;
    let stats = write_obj(configurator.scene(), BufWriter::new(file))?;
    tracing::info!(
        objects = stats.objects,
        triangles = stats.triangles,
        output = %config.output.display(),
        "OBJ exported"
    );

    match &config.report {
        Some(path) => {
            std::fs::write(path, report.to_json()?)
                .with_context(|| format!("writing report {}", path.display()))?;
            tracing::info!(report = %path.display(), "Build report written");
        }
        None => log_summary(&report),
    }
    Ok(())
}

fn log_summary(report: &BuildReport) {
    if let Some(roof) = &report.roof {
        tracing::info!(
            style = ?roof.style,
            rise_mm = roof.rise_mm,
            angle_deg = roof.angle_deg,
            trusses = roof.trusses,
            "Roof"
        );
    }
    for clamp in &report.clamps {
        tracing::info!(
            section = ?clamp.section,
            field = clamp.field,
            requested = ?clamp.requested,
            value = clamp.value,
            "Clamped"
        );
    }
    for fallback in &report.csg_fallbacks {
        tracing::warn!(
            section = ?fallback.section,
            wall = %fallback.wall,
            pass = fallback.pass,
            "Cladding kept unclipped"
        );
    }
    tracing::info!(
        nodes = report.nodes_built,
        walls = report.walls.len(),
        attachments = report.attachments.len(),
        "Build complete"
    );
}
