// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, synthetic elbow-angle frames, and a configurable test profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `pierre_motion`

use chrono::{DateTime, Duration, TimeZone, Utc};
use pierre_motion::{ExerciseProfile, Frame, Landmark};
use pierre_motion_core::constants::joints::{LANDMARK_COUNT, LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST};
use std::env;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; tests are quiet by default
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fixed session start used by every synthetic trace
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// Timestamp `ms` milliseconds after [`t0`]
pub fn at(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

/// Frame whose left elbow forms `angle` degrees, captured `ms` after [`t0`]
pub fn elbow_frame(angle: f64, ms: i64) -> Frame {
    let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
    let (ex, ey) = (0.5, 0.5);
    let radians = angle.to_radians();
    landmarks[LEFT_SHOULDER] = Landmark::visible(ex, ey - 0.2);
    landmarks[LEFT_ELBOW] = Landmark::visible(ex, ey);
    landmarks[LEFT_WRIST] = Landmark::visible(
        0.2f64.mul_add(radians.sin(), ex),
        (-0.2f64).mul_add(radians.cos(), ey),
    );
    Frame::new(at(ms), landmarks)
}

/// Frame where the person is out of view
pub fn empty_frame(ms: i64) -> Frame {
    Frame::new(at(ms), vec![Landmark::default(); LANDMARK_COUNT])
}

/// Frame with a valid shoulder and elbow but an occluded wrist
pub fn occluded_wrist_frame(ms: i64) -> Frame {
    let mut frame = elbow_frame(120.0, ms);
    frame.landmarks[LEFT_WRIST].visibility = 0.1;
    frame
}

/// Options for [`elbow_profile`]
#[derive(Debug, Clone, Copy)]
pub struct ElbowProfileOptions {
    pub policy: &'static str,
    pub debounce_ms: u64,
    pub hold_ms: u64,
}

impl Default for ElbowProfileOptions {
    fn default() -> Self {
        Self {
            policy: "withhold_reps",
            debounce_ms: 500,
            hold_ms: 0,
        }
    }
}

const ELBOW_PROFILE: &str = r"
id: elbow_test
name: Elbow Test
metrics:
  - name: elbow
    source:
      single: { kind: angle, joints: [left_shoulder, left_elbow, left_wrist] }
    zones:
      - { zone: flexed, upper: 101 }
      - { zone: moving, lower: 101, upper: 165 }
      - { zone: extended, lower: 165, upper: 175 }
      - { zone: hyper, lower: 175, valid: false }
phases:
  initial: extended
  phases:
    - name: extended
      guidance: Bend the elbow
    - name: flexed
      guidance: Straighten the arm
  transitions:
    - from: extended
      to: flexed
      when:
        - { metric: elbow, in: [flexed] }
      hold_ms: HOLD_MS
    - from: flexed
      to: extended
      when:
        - { metric: elbow, in: [extended, hyper] }
      completes_rep: true
safety:
  policy: POLICY
  rules:
    - name: locked_elbow
      check: forbidden_zones
      metric: elbow
      zones: [hyper]
      message: Do not lock the elbow
messages:
  rep_completed: Rep {reps}
  hold_broken: Hold the bend for {hold_s} seconds
tuning:
  smoothing: { method: passthrough }
  debounce_ms: DEBOUNCE_MS
  min_silence_ms: 3000
";

/// Two-phase elbow profile: extended (initial) and flexed, rep on return to extended
pub fn elbow_profile(options: ElbowProfileOptions) -> ExerciseProfile {
    let document = ELBOW_PROFILE
        .replace("POLICY", options.policy)
        .replace("DEBOUNCE_MS", &options.debounce_ms.to_string())
        .replace("HOLD_MS", &options.hold_ms.to_string());
    ExerciseProfile::from_yaml_str(&document).unwrap()
}

/// YAML of the default elbow profile, for tests that mutate documents
pub fn elbow_profile_yaml() -> String {
    ELBOW_PROFILE
        .replace("POLICY", "withhold_reps")
        .replace("DEBOUNCE_MS", "500")
        .replace("HOLD_MS", "0")
}
