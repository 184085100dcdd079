// ABOUTME: Integration tests for the built-in exercise catalog and profile folder loading
// ABOUTME: Checks every shipped profile validates, runs, and that user folders load from disk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{at, elbow_profile, elbow_profile_yaml, ElbowProfileOptions};
use pierre_motion::{
    EngineConfig, ExerciseProfile, Frame, Landmark, ProfileCatalog, ProfileError, Session,
};
use pierre_motion_core::constants::joints::{
    LANDMARK_COUNT, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, RIGHT_ANKLE, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER,
};
use std::fs;
use tempfile::TempDir;

const BUILTIN_IDS: [&str; 6] = [
    "bicep_curl",
    "lateral_raise",
    "plank",
    "push_up",
    "side_bend",
    "squat",
];

/// Side-on squat pose with both knees at `knee_angle` degrees and an upright torso
fn squat_frame(knee_angle: f64, ms: i64) -> Frame {
    let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
    let radians = knee_angle.to_radians();
    for (shoulder, hip, knee, ankle) in [
        (LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
        (RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
    ] {
        landmarks[shoulder] = Landmark::visible(0.5, 0.15);
        landmarks[hip] = Landmark::visible(0.5, 0.4);
        landmarks[knee] = Landmark::visible(0.5, 0.6);
        landmarks[ankle] = Landmark::visible(
            0.2f64.mul_add(radians.sin(), 0.5),
            (-0.2f64).mul_add(radians.cos(), 0.6),
        );
    }
    Frame::new(at(ms), landmarks)
}

#[test]
fn test_builtin_catalog_lists_every_exercise() {
    common::init_test_logging();
    let catalog = ProfileCatalog::builtin().unwrap();
    assert_eq!(catalog.len(), BUILTIN_IDS.len());
    assert_eq!(catalog.ids().collect::<Vec<_>>(), BUILTIN_IDS);
}

#[test]
fn test_every_builtin_profile_starts_a_session() {
    let catalog = ProfileCatalog::builtin().unwrap();
    for profile in catalog.iter() {
        let session = Session::new(profile.clone(), &EngineConfig::default()).unwrap();
        assert_eq!(session.phase(), profile.phases.initial);
        assert_eq!(session.rep_count(), 0);
    }
}

#[test]
fn test_builtin_profiles_survive_json_round_trip() {
    let catalog = ProfileCatalog::builtin().unwrap();
    for profile in catalog.iter() {
        let json = serde_json::to_string(profile.as_ref()).unwrap();
        let reloaded = ExerciseProfile::from_json_str(&json).unwrap();
        assert_eq!(&reloaded, profile.as_ref());
    }
}

#[test]
fn test_builtin_profiles_survive_yaml_export() {
    let catalog = ProfileCatalog::builtin().unwrap();
    for profile in catalog.iter() {
        let yaml = profile.to_yaml().unwrap();
        assert!(!yaml.contains('!'), "tagged enum in export of {}", profile.id);
        let reloaded = ExerciseProfile::from_yaml_str(&yaml).unwrap();
        assert_eq!(&reloaded, profile.as_ref());
    }
}

#[test]
fn test_unknown_exercise_lookup_fails() {
    let catalog = ProfileCatalog::builtin().unwrap();
    assert!(matches!(
        catalog.get("burpee"),
        Err(ProfileError::UnknownExercise(id)) if id == "burpee"
    ));
}

#[test]
fn test_squat_counts_one_rep() {
    common::init_test_logging();
    let catalog = ProfileCatalog::builtin().unwrap();
    let mut session =
        Session::new(catalog.get("squat").unwrap(), &EngineConfig::default()).unwrap();

    let mut ms = 0;
    for angle in [175.0, 80.0, 175.0] {
        for _ in 0..10 {
            session.process_frame(&squat_frame(angle, ms));
            ms += 100;
        }
    }
    assert_eq!(session.rep_count(), 1);
    assert_eq!(session.phase(), "standing");
    assert!(!session.is_violating());
}

#[test]
fn test_catalog_loads_profile_folder() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("elbow.yaml"), elbow_profile_yaml()).unwrap();
    let mut json_profile = elbow_profile(ElbowProfileOptions::default());
    json_profile.id = "elbow_json".to_owned();
    fs::write(
        dir.path().join("elbow.json"),
        serde_json::to_string_pretty(&json_profile).unwrap(),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();

    let catalog = ProfileCatalog::from_dir(dir.path()).unwrap();
    assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["elbow_json", "elbow_test"]);
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.yaml"), elbow_profile_yaml()).unwrap();
    fs::write(dir.path().join("b.yml"), elbow_profile_yaml()).unwrap();

    assert!(matches!(
        ProfileCatalog::from_dir(dir.path()),
        Err(ProfileError::DuplicateExercise(id)) if id == "elbow_test"
    ));
}

#[test]
fn test_builtin_catalog_can_be_extended() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("elbow.yaml"), elbow_profile_yaml()).unwrap();

    let mut catalog = ProfileCatalog::builtin().unwrap();
    assert_eq!(catalog.extend_from_dir(dir.path()).unwrap(), 1);
    assert!(catalog.get("elbow_test").is_ok());
    assert_eq!(catalog.len(), BUILTIN_IDS.len() + 1);
}

#[test]
fn test_missing_folder_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    assert!(matches!(
        ProfileCatalog::from_dir(&missing),
        Err(ProfileError::Io { .. })
    ));
}
