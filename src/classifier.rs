// ABOUTME: Stateless threshold classification of smoothed metric values into named zones
// ABOUTME: Bands are half-open intervals that must partition the real line, checked at profile load
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Threshold Classifier
//!
//! Bands are declared in ascending order. Each band covers `[lower, upper)`;
//! the first band has no lower bound and the last has no upper bound, so a
//! validated band list assigns every value to exactly one zone. Hysteresis is
//! the state machine's concern; this module only reports the instantaneous zone.

use pierre_motion_core::ValidationIssue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const fn default_valid() -> bool {
    true
}

/// One threshold band of a metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneBand {
    /// Zone name reported for values inside the band
    pub zone: String,
    /// Inclusive lower bound; open for the first band
    #[serde(default)]
    pub lower: Option<f64>,
    /// Exclusive upper bound; open for the last band
    #[serde(default)]
    pub upper: Option<f64>,
    /// Whether values in this zone count as acceptable form for overlays
    #[serde(default = "default_valid")]
    pub valid: bool,
}

impl ZoneBand {
    /// Create a band
    #[must_use]
    pub fn new(zone: impl Into<String>, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            zone: zone.into(),
            lower,
            upper,
            valid: true,
        }
    }

    /// Mark the band as poor form
    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    fn contains(&self, value: f64) -> bool {
        self.lower.is_none_or(|lower| value >= lower)
            && self.upper.is_none_or(|upper| value < upper)
    }
}

/// Index of the band containing `value`.
///
/// Precondition: `bands` passed [`check_partition`]. Values outside every band
/// (only possible for NaN) fall into the last band.
#[must_use]
pub fn classify(bands: &[ZoneBand], value: f64) -> usize {
    bands
        .iter()
        .position(|band| band.contains(value))
        .unwrap_or_else(|| bands.len().saturating_sub(1))
}

/// Check that `bands` partition the real line with no gaps or overlaps
#[must_use]
pub fn check_partition(metric: &str, bands: &[ZoneBand]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
        issues.push(ValidationIssue::NoZones {
            metric: metric.to_owned(),
        });
        return issues;
    };

    let mut names = HashSet::new();
    for band in bands {
        if !names.insert(band.zone.as_str()) {
            issues.push(ValidationIssue::DuplicateZone {
                metric: metric.to_owned(),
                zone: band.zone.clone(),
            });
        }
    }

    for outer in [(first, first.lower), (last, last.upper)] {
        if outer.1.is_some() {
            issues.push(ValidationIssue::BoundedOuterZone {
                metric: metric.to_owned(),
                zone: outer.0.zone.clone(),
            });
        }
    }

    let count = bands.len();
    for (position, band) in bands.iter().enumerate() {
        let needs_lower = position > 0;
        let needs_upper = position + 1 < count;
        let lower_ok = !needs_lower || band.lower.is_some_and(f64::is_finite);
        let upper_ok = !needs_upper || band.upper.is_some_and(f64::is_finite);
        let ordered = match (band.lower, band.upper) {
            (Some(lower), Some(upper)) => lower < upper,
            _ => true,
        };
        if !(lower_ok && upper_ok && ordered) {
            issues.push(ValidationIssue::InvalidZoneBound {
                metric: metric.to_owned(),
                zone: band.zone.clone(),
            });
        }
    }

    for pair in bands.windows(2) {
        let (below, above) = (&pair[0], &pair[1]);
        if let (Some(upper), Some(lower)) = (below.upper, above.lower) {
            if upper < lower {
                issues.push(ValidationIssue::ZoneGap {
                    metric: metric.to_owned(),
                    lower: below.zone.clone(),
                    upper: above.zone.clone(),
                });
            } else if upper > lower {
                issues.push(ValidationIssue::ZoneOverlap {
                    metric: metric.to_owned(),
                    lower: below.zone.clone(),
                    upper: above.zone.clone(),
                });
            }
        }
    }

    issues
}
