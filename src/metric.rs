// ABOUTME: Per-session runtime state of one tracked metric
// ABOUTME: Extracts, substitutes degenerate samples, smooths, and classifies into a zone each frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::classifier::{classify, ZoneBand};
use crate::geometry::MetricSource;
use crate::profile::MetricSpec;
use crate::smoothing::{SmoothingSpec, Smoother};
use pierre_motion_core::constants::defaults::NEUTRAL_METRIC_VALUE;
use pierre_motion_core::{Frame, Side};
use serde::{Deserialize, Serialize};

/// Overlay view of one metric after the latest frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    /// Metric name
    pub metric: String,
    /// Joint indices the value was computed from (active side)
    pub joints: Vec<usize>,
    /// Latest valid raw value, or the neutral default
    pub raw: f64,
    /// Smoothed value, absent until the first valid sample
    pub smoothed: Option<f64>,
    /// Current zone, absent until the first valid sample
    pub zone: Option<String>,
    /// Whether the current zone counts as acceptable form
    pub valid: bool,
    /// Active side of a bilateral metric
    pub side: Option<Side>,
    /// The latest frame was degenerate for this metric
    pub low_confidence: bool,
}

/// Runtime state of one metric, owned by one session
#[derive(Debug, Clone)]
pub struct MetricTracker {
    name: String,
    source: MetricSource,
    bands: Vec<ZoneBand>,
    smoother: Smoother,
    left: Smoother,
    right: Smoother,
    last_raw: Option<f64>,
    neutral: f64,
    zone: Option<usize>,
    side: Option<Side>,
    sides_valid: bool,
    substituted: bool,
}

impl MetricTracker {
    /// Create the tracker for `spec`, using `default_smoothing` when the metric declares none
    #[must_use]
    pub fn new(spec: &MetricSpec, default_smoothing: SmoothingSpec) -> Self {
        let smoothing = spec.smoothing.unwrap_or(default_smoothing);
        Self {
            name: spec.name.clone(),
            source: spec.source.clone(),
            bands: spec.zones.clone(),
            smoother: Smoother::new(smoothing),
            left: Smoother::new(smoothing),
            right: Smoother::new(smoothing),
            last_raw: None,
            neutral: spec.neutral.unwrap_or(NEUTRAL_METRIC_VALUE),
            zone: None,
            side: None,
            sides_valid: false,
            substituted: false,
        }
    }

    /// Consume one frame. Degenerate frames leave the smoother and zone untouched.
    pub fn update(&mut self, frame: &Frame, min_visibility: f64) {
        let extraction = self
            .source
            .extract(frame, min_visibility)
            .filter(|extraction| extraction.value.is_finite());

        let Some(extraction) = extraction else {
            self.substituted = true;
            self.sides_valid = false;
            return;
        };

        self.substituted = false;
        self.last_raw = Some(extraction.value);
        self.side = extraction.side;
        let smoothed = self.smoother.update(extraction.value);
        self.zone = Some(classify(&self.bands, smoothed));

        if let (Some(left), Some(right)) = (extraction.left, extraction.right) {
            if left.is_finite() && right.is_finite() {
                self.left.update(left);
                self.right.update(right);
                self.sides_valid = true;
                return;
            }
        }
        self.sides_valid = false;
    }

    /// Metric name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the metric has produced at least one valid sample
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.zone.is_some()
    }

    /// Whether the latest frame was substituted
    #[must_use]
    pub const fn is_substituted(&self) -> bool {
        self.substituted
    }

    /// Index of the current zone band
    #[must_use]
    pub const fn zone_index(&self) -> Option<usize> {
        self.zone
    }

    /// Name of the current zone
    #[must_use]
    pub fn zone(&self) -> Option<&str> {
        self.zone
            .and_then(|index| self.bands.get(index))
            .map(|band| band.zone.as_str())
    }

    /// Index of a zone by name
    #[must_use]
    pub fn zone_position(&self, zone: &str) -> Option<usize> {
        self.bands.iter().position(|band| band.zone == zone)
    }

    /// Latest valid raw value, or the neutral default before any
    #[must_use]
    pub fn raw(&self) -> f64 {
        self.last_raw.unwrap_or(self.neutral)
    }

    /// Current smoothed value
    #[must_use]
    pub const fn smoothed(&self) -> Option<f64> {
        self.smoother.value()
    }

    /// Smoothed left/right difference when both sides were valid this frame
    #[must_use]
    pub fn side_difference(&self) -> Option<f64> {
        if !self.sides_valid {
            return None;
        }
        Some((self.left.value()? - self.right.value()?).abs())
    }

    /// Overlay snapshot
    #[must_use]
    pub fn reading(&self) -> MetricReading {
        MetricReading {
            metric: self.name.clone(),
            joints: self.source.rule_for(self.side).joints(),
            raw: self.raw(),
            smoothed: self.smoothed(),
            zone: self.zone().map(str::to_owned),
            valid: self
                .zone
                .and_then(|index| self.bands.get(index))
                .is_some_and(|band| band.valid),
            side: self.side,
            low_confidence: self.substituted,
        }
    }
}
