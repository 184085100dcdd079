// ABOUTME: Registry of validated exercise profiles keyed by id
// ABOUTME: Ships built-in profiles embedded at compile time and loads user profile folders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ExerciseProfile;
use pierre_motion_core::ProfileError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Built-in profile documents, embedded from `profiles/`
const BUILTIN_PROFILES: [(&str, &str); 6] = [
    ("squat.yaml", include_str!("../../profiles/squat.yaml")),
    ("bicep_curl.yaml", include_str!("../../profiles/bicep_curl.yaml")),
    ("push_up.yaml", include_str!("../../profiles/push_up.yaml")),
    ("plank.yaml", include_str!("../../profiles/plank.yaml")),
    ("lateral_raise.yaml", include_str!("../../profiles/lateral_raise.yaml")),
    ("side_bend.yaml", include_str!("../../profiles/side_bend.yaml")),
];

const PROFILE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Validated profiles keyed by exercise id
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, Arc<ExerciseProfile>>,
}

impl ProfileCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of every built-in exercise
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded document fails to parse or validate
    pub fn builtin() -> Result<Self, ProfileError> {
        let mut catalog = Self::new();
        for (source, document) in BUILTIN_PROFILES {
            debug!(profile.source = source, "Loading built-in exercise profile");
            catalog.insert(ExerciseProfile::from_yaml_str(document)?)?;
        }
        Ok(catalog)
    }

    /// Catalog of every profile document in `dir` (`.yaml`, `.yml`, `.json`)
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a document is
    /// invalid, or two documents share an id
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let mut catalog = Self::new();
        catalog.extend_from_dir(dir)?;
        Ok(catalog)
    }

    /// Add every profile document in `dir`, in file name order
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a document is
    /// invalid, or an id is already present
    pub fn extend_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ProfileError> {
        let dir = dir.as_ref();
        let io_error = |source| ProfileError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(io_error)?
            .map(|entry| entry.map(|entry| entry.path()).map_err(io_error))
            .collect::<Result<_, _>>()?;
        paths.retain(|path| path.is_file() && has_profile_extension(path));
        paths.sort();

        for path in &paths {
            self.insert(ExerciseProfile::from_path(path)?)?;
        }
        info!(
            profile.dir = %dir.display(),
            profile.count = paths.len(),
            "Loaded exercise profiles"
        );
        Ok(paths.len())
    }

    /// Add a profile after validating it
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or its id is taken
    pub fn insert(&mut self, profile: ExerciseProfile) -> Result<(), ProfileError> {
        profile.validate()?;
        if self.profiles.contains_key(&profile.id) {
            return Err(ProfileError::DuplicateExercise(profile.id));
        }
        self.profiles.insert(profile.id.clone(), Arc::new(profile));
        Ok(())
    }

    /// Profile by id
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::UnknownExercise` if no profile has that id
    pub fn get(&self, id: &str) -> Result<Arc<ExerciseProfile>, ProfileError> {
        self.profiles
            .get(id)
            .cloned()
            .ok_or_else(|| ProfileError::UnknownExercise(id.to_owned()))
    }

    /// Exercise ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Profiles in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ExerciseProfile>> {
        self.profiles.values()
    }

    /// Number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn has_profile_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PROFILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
