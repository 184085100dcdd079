// ABOUTME: Frame replay command for pierre-motion
// ABOUTME: Streams a JSON-lines recording through a session and prints events and the final summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Context, Result};
use pierre_motion::{EngineConfig, ExerciseProfile, Frame, ProfileCatalog, Session, SpeechSink};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Prints speech triggers on stdout, one per line
struct PrintSpeech;

impl SpeechSink for PrintSpeech {
    fn speak(&mut self, text: &str) {
        println!("speak: {text}");
    }
}

/// Replay a recording through a session
pub fn run(
    catalog: &ProfileCatalog,
    exercise: Option<&str>,
    profile: Option<&Path>,
    frames: &Path,
    speak: bool,
) -> Result<()> {
    let profile: Arc<ExerciseProfile> = match (exercise, profile) {
        (_, Some(path)) => Arc::new(ExerciseProfile::from_path(path)?),
        (Some(id), None) => catalog.get(id)?,
        (None, None) => bail!("either --exercise or --profile is required"),
    };
    let mut session = Session::new(profile, &EngineConfig::try_from_env()?)?;

    let reader: Box<dyn BufRead> = if frames.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(frames)
            .with_context(|| format!("failed to open frame recording {}", frames.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut speech = PrintSpeech;
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = serde_json::from_str(&line)
            .with_context(|| format!("invalid frame on line {}", number + 1))?;
        let event = if speak {
            session.process_frame_and_speak(&frame, &mut speech)
        } else {
            session.process_frame(&frame)
        };
        if event.low_confidence {
            debug!(line = number + 1, "Low-confidence frame");
        }
        println!("{}", serde_json::to_string(&event)?);
    }

    let summary = session.stop();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
