// ABOUTME: Profile inspection commands for pierre-motion
// ABOUTME: Handles list, show and validate operations on exercise profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Result};
use pierre_motion::{ExerciseProfile, ProfileCatalog, ProfileError};
use std::path::Path;
use tracing::info;

/// Print every catalog exercise
pub fn list(catalog: &ProfileCatalog) {
    println!("{:<16} {:<22} {:>7} {:>6} {:>5}", "ID", "NAME", "METRICS", "PHASES", "RULES");
    for profile in catalog.iter() {
        println!(
            "{:<16} {:<22} {:>7} {:>6} {:>5}",
            profile.id,
            profile.name,
            profile.metrics.len(),
            profile.phases.phases.len(),
            profile.safety.rules.len()
        );
    }
}

/// Print a catalog exercise as YAML
pub fn show(catalog: &ProfileCatalog, exercise: &str) -> Result<()> {
    let profile = catalog.get(exercise)?;
    print!("{}", profile.to_yaml()?);
    Ok(())
}

/// Validate a profile document and report every issue
pub fn validate(file: &Path) -> Result<()> {
    match ExerciseProfile::from_path(file) {
        Ok(profile) => {
            info!(profile.id = %profile.id, "Profile is valid");
            println!("ok: {} ({})", profile.id, profile.name);
            Ok(())
        }
        Err(ProfileError::Validation { profile, issues }) => {
            println!("invalid: {profile}");
            for issue in &issues {
                println!("  - {issue}");
            }
            bail!("{} has {} validation issue(s)", file.display(), issues.len())
        }
        Err(e) => Err(e.into()),
    }
}
