// ABOUTME: Landmark and Frame models produced by the pose-estimation collaborator
// ABOUTME: Frames carry a capture timestamp and an index-addressed list of body keypoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const fn full_visibility() -> f64 {
    1.0
}

/// A single body keypoint in normalized frame space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0.0 (left edge) to 1.0 (right edge)
    pub x: f64,
    /// Vertical position, 0.0 (top edge) to 1.0 (bottom edge)
    pub y: f64,
    /// Relative depth offset; ignored by planar geometry
    #[serde(default)]
    pub z: f64,
    /// Detection confidence, 0.0 to 1.0
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark with explicit depth and visibility
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    /// Create a fully visible planar landmark
    #[must_use]
    pub const fn visible(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Whether the landmark is usable for geometry at the given visibility floor
    #[must_use]
    pub fn is_usable(&self, min_visibility: f64) -> bool {
        self.visibility >= min_visibility && self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// One complete snapshot of all landmarks at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Wall-clock capture time, serialized as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    /// Landmarks addressed by joint index
    pub landmarks: Vec<Landmark>,
}

impl Frame {
    /// Create a frame captured at `captured_at`
    #[must_use]
    pub fn new(captured_at: DateTime<Utc>, landmarks: Vec<Landmark>) -> Self {
        Self {
            captured_at,
            landmarks,
        }
    }

    /// Create a frame stamped with the current wall-clock time
    #[must_use]
    pub fn now(landmarks: Vec<Landmark>) -> Self {
        Self::new(Utc::now(), landmarks)
    }

    /// Landmark at `index`, or `None` when the frame is shorter than the scheme
    #[must_use]
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Landmark at `index` if it clears the visibility floor
    #[must_use]
    pub fn usable_landmark(&self, index: usize, min_visibility: f64) -> Option<&Landmark> {
        self.landmark(index)
            .filter(|landmark| landmark.is_usable(min_visibility))
    }
}

/// Body side of a bilateral joint pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Subject's left side
    Left,
    /// Subject's right side
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}
