// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SOSI importer CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use sosi_import::cli::Reporter;
use sosi_import::logging::{self, LogLevel};
use sosi_import::{scene_for, ImportConfig, Importer};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sosi-import")]
#[command(about = "Import SOSI survey geometry into named mesh objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to sosi.toml in the working directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import SOSI features
    Import {
        /// Input files or directories for the vector reader
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Native SOSI library
        #[arg(short, long, value_name = "PATH")]
        library: Option<PathBuf>,

        /// Segments per arc
        #[arg(short, long)]
        segments: Option<usize>,

        /// Log level (DEBUG, INFO, WARNING, ERROR)
        #[arg(long)]
        log_level: Option<LogLevel>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            files,
            library,
            segments,
            log_level,
        } => {
            let mut config = load_config(cli.config)?;
            if !files.is_empty() {
                config.input_files = files;
            }
            if library.is_some() {
                config.library_path = library;
            }
            if let Some(segments) = segments {
                config.arc_segments = segments;
            }
            if let Some(level) = log_level {
                config.log_level = level;
            }
            import_command(config);
        }
        Commands::Config => {
            let config = load_config(cli.config)?;
            print!("{}", config.to_toml()?);
        }
        Commands::Version => {
            println!("sosi-import v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<ImportConfig> {
    match path {
        Some(path) => {
            let mut config = ImportConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var_os(key));
            Ok(config)
        }
        None => ImportConfig::load(),
    }
}

fn import_command(config: ImportConfig) {
    logging::init(config.log_level);

    let mut scene = scene_for(&config);
    let mut importer = Importer::new(config);

    let start = Instant::now();
    match importer.run(&mut scene) {
        Ok(report) => {
            Reporter::report_import(&report, &scene, start.elapsed());
            Reporter::success(&format!("Import {}", importer.state()));
        }
        Err(err) => {
            Reporter::report_error(&err.to_string());
            std::process::exit(1);
        }
    }
}
