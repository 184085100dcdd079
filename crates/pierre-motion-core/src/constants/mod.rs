// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Joint indices of the 33-point body scheme, engine defaults, and stock feedback messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Landmark indices of the standard 33-point body scheme
pub mod joints;

/// Engine defaults applied when neither the profile nor the environment overrides them
pub mod defaults {
    /// Landmarks below this visibility are treated as degenerate
    pub const MIN_VISIBILITY: f64 = 0.5;
    /// Moving-average window length in frames
    pub const SMOOTHING_WINDOW: usize = 5;
    /// Largest moving-average window a profile may request
    pub const MAX_SMOOTHING_WINDOW: usize = 64;
    /// Minimum time between two counted reps
    pub const DEBOUNCE_MS: u64 = 800;
    /// Minimum time before identical feedback is spoken again
    pub const MIN_SILENCE_MS: u64 = 3_000;
    /// Value reported for a metric that has never had a valid sample
    pub const NEUTRAL_METRIC_VALUE: f64 = 0.0;
    /// Vector magnitudes below this are considered zero-length
    pub const DEGENERATE_EPSILON: f64 = 1e-6;
}

/// Stock feedback messages used when a profile leaves a template empty
pub mod messages {
    /// Rendered when no more specific template applies
    pub const IDLE: &str = "Keep going";
    /// Rendered while metrics are still warming up
    pub const INSUFFICIENT_DATA: &str = "Step into view so your whole body is visible";
    /// Rendered when a counted rep is committed
    pub const REP_COMPLETED: &str = "{reps}";
    /// Rendered on the frame a safety violation clears
    pub const SAFETY_CLEARED: &str = "Good, form is back under control";
    /// Rendered when a held position is released too early
    pub const HOLD_BROKEN: &str = "Hold the position a little longer";
}
