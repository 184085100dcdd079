// ABOUTME: Integration tests for exercise profile validation
// ABOUTME: Verifies that malformed profiles fail at load time with every defect reported
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{elbow_profile, elbow_profile_yaml, ElbowProfileOptions};
use pierre_motion::{EngineConfig, ExerciseProfile, ProfileError, Session, ValidationIssue};

fn issues_for(document: &str) -> Vec<ValidationIssue> {
    match ExerciseProfile::from_yaml_str(document) {
        Err(ProfileError::Validation { issues, .. }) => issues,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

fn mutated(from: &str, to: &str) -> String {
    let document = elbow_profile_yaml();
    assert!(document.contains(from), "fixture does not contain `{from}`");
    document.replacen(from, to, 1)
}

#[test]
fn test_fixture_is_valid() {
    assert!(ExerciseProfile::from_yaml_str(&elbow_profile_yaml()).is_ok());
}

#[test]
fn test_overlapping_bands_are_rejected() {
    let issues = issues_for(&mutated("{ zone: moving, lower: 101", "{ zone: moving, lower: 95"));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::ZoneOverlap { lower, upper, .. } if lower == "flexed" && upper == "moving")));
}

#[test]
fn test_band_gap_is_rejected() {
    let issues = issues_for(&mutated("{ zone: moving, lower: 101", "{ zone: moving, lower: 110"));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::ZoneGap { .. })));
}

#[test]
fn test_dangling_phase_reference_is_rejected() {
    let issues = issues_for(&mutated("to: flexed", "to: bent"));
    assert!(issues.contains(&ValidationIssue::UnknownPhase {
        context: "transition `extended` -> `bent`".to_owned(),
        phase: "bent".to_owned(),
    }));
}

#[test]
fn test_unknown_initial_phase_is_rejected() {
    let issues = issues_for(&mutated("initial: extended", "initial: start"));
    assert!(issues.contains(&ValidationIssue::UnknownInitialPhase("start".to_owned())));
}

#[test]
fn test_unreachable_rep_transition_is_rejected() {
    let issues = issues_for(&mutated("completes_rep: true", "completes_rep: false"));
    assert_eq!(
        issues,
        vec![ValidationIssue::NoReachableRepTransition("extended".to_owned())]
    );
}

#[test]
fn test_rep_completing_self_loop_is_rejected() {
    let issues = issues_for(&mutated("to: extended", "to: flexed"));
    assert!(issues.contains(&ValidationIssue::RepCompletingSelfLoop("flexed".to_owned())));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::NoReachableRepTransition(_))));
}

#[test]
fn test_unknown_zone_in_condition_is_rejected() {
    let issues = issues_for(&mutated("in: [flexed]", "in: [bent]"));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::UnknownZone { zone, .. } if zone == "bent")));
}

#[test]
fn test_joint_index_out_of_range_is_rejected() {
    let issues = issues_for(&mutated(
        "joints: [left_shoulder, left_elbow, left_wrist]",
        "joints: [11, 13, 40]",
    ));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::JointOutOfRange { joint: 40, .. })));
}

#[test]
fn test_unknown_joint_name_is_a_parse_error() {
    let result = ExerciseProfile::from_yaml_str(&mutated("left_wrist", "left_hand"));
    assert!(matches!(result, Err(ProfileError::Parse { format: "yaml", .. })));
}

#[test]
fn test_coincident_joints_are_rejected() {
    let issues = issues_for(&mutated(
        "joints: [left_shoulder, left_elbow, left_wrist]",
        "joints: [left_elbow, left_elbow, left_wrist]",
    ));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::CoincidentJoints { .. })));
}

#[test]
fn test_smoothing_window_out_of_range_is_rejected() {
    let issues = issues_for(&mutated(
        "{ method: passthrough }",
        "{ method: moving_average, window: 0 }",
    ));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::InvalidSmoothingWindow { window: 0, .. })));
}

#[test]
fn test_visibility_out_of_range_is_rejected() {
    let issues = issues_for(&mutated("  min_silence_ms: 3000", "  min_silence_ms: 3000\n  min_visibility: 1.5"));
    assert!(issues
        .iter()
        .any(|issue| matches!(issue, ValidationIssue::InvalidVisibility(_))));
}

#[test]
fn test_symmetry_rule_requires_bilateral_metric() {
    let issues = issues_for(&mutated(
        "      message: Do not lock the elbow\n",
        "      message: Do not lock the elbow\n    - name: even_arms\n      check: symmetry\n      metric: elbow\n      max_difference: 10\n      message: Even out your arms\n",
    ));
    assert!(issues.contains(&ValidationIssue::SymmetryRequiresBilateral {
        rule: "even_arms".to_owned(),
        metric: "elbow".to_owned(),
    }));
}

#[test]
fn test_every_issue_is_collected() {
    let document = mutated("{ zone: moving, lower: 101", "{ zone: moving, lower: 95")
        .replacen("completes_rep: true", "completes_rep: false", 1)
        .replacen("initial: extended", "initial: extended\n  # unchanged", 1);
    let issues = issues_for(&document);
    assert!(issues.len() >= 2);
    let error = ExerciseProfile::from_yaml_str(&document).unwrap_err();
    assert!(error.to_string().contains("elbow_test"));
}

#[test]
fn test_session_rejects_invalid_profile() {
    let mut profile = elbow_profile(ElbowProfileOptions::default());
    profile.phases.initial = "nowhere".to_owned();
    let result = Session::new(profile, &EngineConfig::default());
    assert!(matches!(result, Err(ProfileError::Validation { .. })));
}

#[test]
fn test_malformed_document_is_a_parse_error() {
    let result = ExerciseProfile::from_yaml_str("id: [unterminated");
    assert!(matches!(result, Err(ProfileError::Parse { .. })));
    let result = ExerciseProfile::from_json_str("{\"id\": 3}");
    assert!(matches!(result, Err(ProfileError::Parse { format: "json", .. })));
}
