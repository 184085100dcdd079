// ABOUTME: Pierre Motion CLI - inspect exercise profiles and replay recorded pose frames
// ABOUTME: Lists the catalog, validates profile documents, and runs sessions over JSON-lines frame files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # List built-in exercises
//! pierre-motion list
//!
//! # Print a built-in profile as YAML, as a starting point for a custom one
//! pierre-motion show squat
//!
//! # Validate a custom profile document
//! pierre-motion validate ./my_profiles/goblet_squat.yaml
//!
//! # Replay recorded frames through a session, printing one JSON event per frame
//! pierre-motion replay --exercise squat --frames ./recordings/squat.jsonl
//!
//! # Replay with a custom profile and print speech triggers
//! pierre-motion replay --profile ./goblet_squat.yaml --frames - --speak < frames.jsonl
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pierre_motion::logging::LoggingConfig;
use pierre_motion::ProfileCatalog;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pierre-motion",
    about = "Pierre Motion exercise engine CLI",
    long_about = "Inspect exercise profiles and replay recorded pose frames through the rep and \
                  form engine."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Extra directory of profile documents added to the built-in catalog
    #[arg(long, global = true)]
    profiles_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// List exercises in the catalog
    List,

    /// Print a catalog profile as YAML
    Show {
        /// Exercise id
        exercise: String,
    },

    /// Validate a profile document (.yaml, .yml or .json)
    Validate {
        /// Profile file
        file: PathBuf,
    },

    /// Run a session over a JSON-lines frame recording
    Replay {
        /// Catalog exercise id
        #[arg(long, conflicts_with = "profile", required_unless_present = "profile")]
        exercise: Option<String>,

        /// Profile document to use instead of a catalog exercise
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Frame recording, one JSON frame per line (`-` for stdin)
        #[arg(long)]
        frames: PathBuf,

        /// Print speech triggers alongside events
        #[arg(long)]
        speak: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env().with_stderr();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut catalog = ProfileCatalog::builtin()?;
    if let Some(dir) = &cli.profiles_dir {
        catalog.extend_from_dir(dir)?;
    }

    match cli.command {
        Command::List => commands::profile::list(&catalog),
        Command::Show { exercise } => commands::profile::show(&catalog, &exercise)?,
        Command::Validate { file } => commands::profile::validate(&file)?,
        Command::Replay {
            exercise,
            profile,
            frames,
            speak,
        } => commands::replay::run(
            &catalog,
            exercise.as_deref(),
            profile.as_deref(),
            &frames,
            speak,
        )?,
    }

    Ok(())
}
