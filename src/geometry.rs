// ABOUTME: Geometry extraction of raw scalar metrics from a landmark frame
// ABOUTME: Included angles, vertical tilt and normalized distances with bilateral side selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Geometry Extractor
//!
//! Every rule is evaluated on the planar (x, y) coordinates of a [`Frame`].
//! Image space has y growing downwards, so "up" is the `(0, -1)` direction.
//!
//! Extraction never fails loudly: a missing joint, a joint below the
//! visibility floor, or a zero-length vector yields `None`, and the caller
//! substitutes the metric's last valid value.

use pierre_motion_core::constants::{defaults::DEGENERATE_EPSILON, joints};
use pierre_motion_core::{Frame, Side};
use serde::{Deserialize, Serialize};

/// A joint reference in a profile document, written as an index or a joint name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "JointRef", into = "usize")]
pub struct Joint(usize);

impl Joint {
    /// Wrap a raw landmark index
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Landmark index in the frame
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<Joint> for usize {
    fn from(joint: Joint) -> Self {
        joint.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JointRef {
    Index(usize),
    Name(String),
}

impl TryFrom<JointRef> for Joint {
    type Error = String;

    fn try_from(value: JointRef) -> Result<Self, Self::Error> {
        match value {
            JointRef::Index(index) => Ok(Self(index)),
            JointRef::Name(name) => joints::index_of(&name)
                .map(Self)
                .ok_or_else(|| format!("unknown joint name `{name}`")),
        }
    }
}

/// Formula turning two or three joints into one scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryRule {
    /// Angle at the middle joint between the vectors to the outer joints.
    /// Unsigned values lie in [0, 180]; signed values in (-180, 180], positive
    /// when the second vector is clockwise from the first on screen.
    Angle {
        /// Outer, vertex, outer
        joints: [Joint; 3],
        /// Report direction as well as magnitude
        #[serde(default)]
        signed: bool,
    },
    /// Lean of the segment from the first joint to the second, in degrees from
    /// vertical-up; positive leans towards increasing x
    Tilt {
        /// Base joint, tip joint
        joints: [Joint; 2],
    },
    /// Planar distance between two joints, optionally divided by a reference
    /// segment so thresholds do not depend on camera distance
    Distance {
        /// Measured pair
        joints: [Joint; 2],
        /// Reference pair whose length becomes 1.0
        #[serde(default)]
        normalize_by: Option<[Joint; 2]>,
    },
}

impl GeometryRule {
    /// Joints the value is computed from, in rule order
    #[must_use]
    pub fn joints(&self) -> Vec<usize> {
        match self {
            Self::Angle { joints, .. } => joints.iter().map(|j| j.index()).collect(),
            Self::Tilt { joints } | Self::Distance { joints, .. } => {
                joints.iter().map(|j| j.index()).collect()
            }
        }
    }

    /// Every joint the rule reads, including normalization references
    #[must_use]
    pub fn referenced_joints(&self) -> Vec<usize> {
        let mut all = self.joints();
        if let Self::Distance {
            normalize_by: Some(reference),
            ..
        } = self
        {
            all.extend(reference.iter().map(|j| j.index()));
        }
        all
    }

    /// Whether any single vector of the rule uses the same joint at both ends
    #[must_use]
    pub fn has_coincident_joints(&self) -> bool {
        match self {
            Self::Angle { joints, .. } => joints[0] == joints[1] || joints[1] == joints[2],
            Self::Tilt { joints } => joints[0] == joints[1],
            Self::Distance {
                joints,
                normalize_by,
            } => joints[0] == joints[1] || normalize_by.is_some_and(|r| r[0] == r[1]),
        }
    }

    /// Evaluate the rule, or `None` when the input is degenerate
    #[must_use]
    pub fn evaluate(&self, frame: &Frame, min_visibility: f64) -> Option<f64> {
        let point = |joint: Joint| {
            frame
                .usable_landmark(joint.index(), min_visibility)
                .map(|landmark| (landmark.x, landmark.y))
        };

        match self {
            Self::Angle { joints, signed } => {
                let a = point(joints[0])?;
                let b = point(joints[1])?;
                let c = point(joints[2])?;
                included_angle(a, b, c, *signed)
            }
            Self::Tilt { joints } => {
                let base = point(joints[0])?;
                let tip = point(joints[1])?;
                vertical_tilt(base, tip)
            }
            Self::Distance {
                joints,
                normalize_by,
            } => {
                let length = planar_distance(point(joints[0])?, point(joints[1])?);
                match normalize_by {
                    None => Some(length),
                    Some(reference) => {
                        let scale = planar_distance(point(reference[0])?, point(reference[1])?);
                        (scale > DEGENERATE_EPSILON).then(|| length / scale)
                    }
                }
            }
        }
    }
}

/// Angle at `vertex` between `vertex -> a` and `vertex -> c`, in degrees
#[must_use]
pub fn included_angle(
    a: (f64, f64),
    vertex: (f64, f64),
    c: (f64, f64),
    signed: bool,
) -> Option<f64> {
    let v1 = (a.0 - vertex.0, a.1 - vertex.1);
    let v2 = (c.0 - vertex.0, c.1 - vertex.1);

    if v1.0.hypot(v1.1) < DEGENERATE_EPSILON || v2.0.hypot(v2.1) < DEGENERATE_EPSILON {
        return None;
    }

    let dot = v1.0.mul_add(v2.0, v1.1 * v2.1);
    let cross = v1.0.mul_add(v2.1, -(v1.1 * v2.0));

    // atan2 stays accurate near 0 and 180 where acos loses precision
    let angle = if signed {
        cross.atan2(dot)
    } else {
        cross.abs().atan2(dot)
    };
    Some(angle.to_degrees())
}

/// Lean of `base -> tip` away from vertical-up, in degrees within (-180, 180]
#[must_use]
pub fn vertical_tilt(base: (f64, f64), tip: (f64, f64)) -> Option<f64> {
    let dx = tip.0 - base.0;
    let dy = tip.1 - base.1;
    if dx.hypot(dy) < DEGENERATE_EPSILON {
        return None;
    }
    Some(dx.atan2(-dy).to_degrees())
}

/// Euclidean distance in the image plane
#[must_use]
pub fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// Comparator choosing the active side of a bilateral metric each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SideSelection {
    /// Side with the smaller value (e.g. the more flexed elbow)
    #[default]
    Smaller,
    /// Side with the larger value
    Larger,
    /// Side whose value is further from a neutral reference
    FurthestFrom(f64),
    /// Side whose joints have the higher mean visibility
    MoreVisible,
    /// Always the given side
    Pinned(Side),
}

/// A left/right pair of rules for one bilateral metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BilateralRule {
    /// Rule evaluated on the subject's left side
    pub left: GeometryRule,
    /// Rule evaluated on the subject's right side
    pub right: GeometryRule,
    /// How the active side is chosen
    #[serde(default)]
    pub select: SideSelection,
}

/// Where a metric's raw value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// One rule, no side selection
    Single(GeometryRule),
    /// Two mirrored rules with an active-side comparator
    Bilateral(BilateralRule),
}

/// Raw values read from one frame for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extraction {
    /// Value of the active side (or the single rule)
    pub value: f64,
    /// Active side for bilateral metrics
    pub side: Option<Side>,
    /// Left-side value when it was computable
    pub left: Option<f64>,
    /// Right-side value when it was computable
    pub right: Option<f64>,
}

impl MetricSource {
    /// Whether this source tracks a left/right pair
    #[must_use]
    pub const fn is_bilateral(&self) -> bool {
        matches!(self, Self::Bilateral(_))
    }

    /// All rules of this source
    #[must_use]
    pub fn rules(&self) -> Vec<&GeometryRule> {
        match self {
            Self::Single(rule) => vec![rule],
            Self::Bilateral(pair) => vec![&pair.left, &pair.right],
        }
    }

    /// Rule for the given active side (`None` for single-rule sources)
    #[must_use]
    pub fn rule_for(&self, side: Option<Side>) -> &GeometryRule {
        match (self, side) {
            (Self::Single(rule), _) => rule,
            (Self::Bilateral(pair), Some(Side::Right)) => &pair.right,
            (Self::Bilateral(pair), _) => &pair.left,
        }
    }

    /// Extract the raw value, choosing the active side for bilateral sources
    #[must_use]
    pub fn extract(&self, frame: &Frame, min_visibility: f64) -> Option<Extraction> {
        match self {
            Self::Single(rule) => rule.evaluate(frame, min_visibility).map(|value| Extraction {
                value,
                side: None,
                left: None,
                right: None,
            }),
            Self::Bilateral(pair) => {
                let left = pair.left.evaluate(frame, min_visibility);
                let right = pair.right.evaluate(frame, min_visibility);
                let side = match (left, right) {
                    (None, None) => return None,
                    (Some(_), None) => Side::Left,
                    (None, Some(_)) => Side::Right,
                    (Some(l), Some(r)) => choose_side(pair, frame, l, r),
                };
                if let SideSelection::Pinned(pinned) = pair.select {
                    if pinned != side {
                        return None;
                    }
                }
                let value = match side {
                    Side::Left => left,
                    Side::Right => right,
                }?;
                Some(Extraction {
                    value,
                    side: Some(side),
                    left,
                    right,
                })
            }
        }
    }
}

fn choose_side(pair: &BilateralRule, frame: &Frame, left: f64, right: f64) -> Side {
    match pair.select {
        SideSelection::Smaller => {
            if right < left {
                Side::Right
            } else {
                Side::Left
            }
        }
        SideSelection::Larger => {
            if right > left {
                Side::Right
            } else {
                Side::Left
            }
        }
        SideSelection::FurthestFrom(neutral) => {
            if (right - neutral).abs() > (left - neutral).abs() {
                Side::Right
            } else {
                Side::Left
            }
        }
        SideSelection::MoreVisible => {
            if mean_visibility(&pair.right, frame) > mean_visibility(&pair.left, frame) {
                Side::Right
            } else {
                Side::Left
            }
        }
        SideSelection::Pinned(side) => side,
    }
}

fn mean_visibility(rule: &GeometryRule, frame: &Frame) -> f64 {
    let joints = rule.joints();
    let total: f64 = joints
        .iter()
        .filter_map(|&index| frame.landmark(index))
        .map(|landmark| landmark.visibility)
        .sum();
    total / joints.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pierre_motion_core::constants::joints::{
        LANDMARK_COUNT, LEFT_ELBOW, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ELBOW, RIGHT_SHOULDER,
        RIGHT_WRIST,
    };
    use pierre_motion_core::Landmark;

    fn frame_with(points: &[(usize, f64, f64)]) -> Frame {
        let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
        for &(index, x, y) in points {
            landmarks[index] = Landmark::visible(x, y);
        }
        Frame::now(landmarks)
    }

    fn left_elbow_rule() -> GeometryRule {
        GeometryRule::Angle {
            joints: [
                Joint::new(LEFT_SHOULDER),
                Joint::new(LEFT_ELBOW),
                Joint::new(LEFT_WRIST),
            ],
            signed: false,
        }
    }

    #[test]
    fn test_collinear_joints_give_straight_angle() {
        let angle = included_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0), false).unwrap();
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let angle = included_angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5), false).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_signed_angle_reports_direction() {
        let clockwise = included_angle((1.0, 0.5), (0.5, 0.5), (0.5, 1.0), true).unwrap();
        let counter = included_angle((1.0, 0.5), (0.5, 0.5), (0.5, 0.0), true).unwrap();
        assert!((clockwise - 90.0).abs() < 1e-9);
        assert!((counter + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_joints_are_degenerate() {
        assert!(included_angle((0.5, 0.5), (0.5, 0.5), (1.0, 1.0), false).is_none());
        assert!(vertical_tilt((0.2, 0.2), (0.2, 0.2)).is_none());
    }

    #[test]
    fn test_tilt_is_zero_upright_and_signed_by_direction() {
        assert!(vertical_tilt((0.5, 0.8), (0.5, 0.2)).unwrap().abs() < 1e-9);
        let right = vertical_tilt((0.5, 0.8), (0.8, 0.5)).unwrap();
        let left = vertical_tilt((0.5, 0.8), (0.2, 0.5)).unwrap();
        assert!((right - 45.0).abs() < 1e-9);
        assert!((left + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_distance_is_scale_invariant() {
        let rule = GeometryRule::Distance {
            joints: [Joint::new(0), Joint::new(1)],
            normalize_by: Some([Joint::new(2), Joint::new(3)]),
        };
        let near = frame_with(&[(0, 0.0, 0.0), (1, 0.2, 0.0), (2, 0.0, 0.0), (3, 0.0, 0.4)]);
        let far = frame_with(&[(0, 0.0, 0.0), (1, 0.1, 0.0), (2, 0.0, 0.0), (3, 0.0, 0.2)]);
        let a = rule.evaluate(&near, 0.5).unwrap();
        let b = rule.evaluate(&far, 0.5).unwrap();
        assert!((a - 0.5).abs() < 1e-9);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_low_visibility_joint_is_degenerate() {
        let mut frame = frame_with(&[
            (LEFT_SHOULDER, 0.5, 0.2),
            (LEFT_ELBOW, 0.5, 0.4),
            (LEFT_WRIST, 0.5, 0.6),
        ]);
        frame.landmarks[LEFT_WRIST].visibility = 0.2;
        assert!(left_elbow_rule().evaluate(&frame, 0.5).is_none());
        assert!(left_elbow_rule().evaluate(&frame, 0.1).is_some());
    }

    #[test]
    fn test_short_frame_is_degenerate_not_a_panic() {
        let frame = Frame::now(vec![Landmark::visible(0.1, 0.1)]);
        assert!(left_elbow_rule().evaluate(&frame, 0.5).is_none());
    }

    fn elbows(select: SideSelection) -> MetricSource {
        MetricSource::Bilateral(BilateralRule {
            left: left_elbow_rule(),
            right: GeometryRule::Angle {
                joints: [
                    Joint::new(RIGHT_SHOULDER),
                    Joint::new(RIGHT_ELBOW),
                    Joint::new(RIGHT_WRIST),
                ],
                signed: false,
            },
            select,
        })
    }

    /// Left arm straight (180), right arm bent square (90)
    fn straight_left_bent_right() -> Frame {
        frame_with(&[
            (LEFT_SHOULDER, 0.4, 0.2),
            (LEFT_ELBOW, 0.4, 0.4),
            (LEFT_WRIST, 0.4, 0.6),
            (RIGHT_SHOULDER, 0.6, 0.2),
            (RIGHT_ELBOW, 0.6, 0.4),
            (RIGHT_WRIST, 0.8, 0.4),
        ])
    }

    #[test]
    fn test_bilateral_selects_more_flexed_side() {
        let source = elbows(SideSelection::Smaller);
        let frame = straight_left_bent_right();
        let extraction = source.extract(&frame, 0.5).unwrap();
        assert_eq!(extraction.side, Some(Side::Right));
        assert!((extraction.value - 90.0).abs() < 1e-9);
        assert!((extraction.left.unwrap() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_larger_and_furthest_from_pick_by_value() {
        let frame = straight_left_bent_right();
        let larger = elbows(SideSelection::Larger).extract(&frame, 0.5).unwrap();
        assert_eq!(larger.side, Some(Side::Left));

        let from_straight = elbows(SideSelection::FurthestFrom(180.0))
            .extract(&frame, 0.5)
            .unwrap();
        assert_eq!(from_straight.side, Some(Side::Right));
        let from_square = elbows(SideSelection::FurthestFrom(90.0))
            .extract(&frame, 0.5)
            .unwrap();
        assert_eq!(from_square.side, Some(Side::Left));
    }

    #[test]
    fn test_more_visible_side_wins() {
        let mut frame = straight_left_bent_right();
        frame.landmarks[RIGHT_WRIST].visibility = 0.6;
        let extraction = elbows(SideSelection::MoreVisible)
            .extract(&frame, 0.5)
            .unwrap();
        assert_eq!(extraction.side, Some(Side::Left));

        frame.landmarks[RIGHT_WRIST].visibility = 1.0;
        frame.landmarks[LEFT_ELBOW].visibility = 0.55;
        let extraction = elbows(SideSelection::MoreVisible)
            .extract(&frame, 0.5)
            .unwrap();
        assert_eq!(extraction.side, Some(Side::Right));
    }

    #[test]
    fn test_pinned_side_never_falls_back() {
        let source = elbows(SideSelection::Pinned(Side::Right));
        let mut frame = straight_left_bent_right();
        let extraction = source.extract(&frame, 0.5).unwrap();
        assert_eq!(extraction.side, Some(Side::Right));
        assert!((extraction.value - 90.0).abs() < 1e-9);

        frame.landmarks[RIGHT_WRIST].visibility = 0.1;
        assert!(source.extract(&frame, 0.5).is_none());
    }

    #[test]
    fn test_joint_names_deserialize_to_indices() {
        let rule: GeometryRule =
            serde_json::from_str(r#"{"kind":"tilt","joints":["left_hip","left_shoulder"]}"#)
                .unwrap();
        assert_eq!(rule.joints(), vec![23, 11]);
        let bad = serde_json::from_str::<GeometryRule>(r#"{"kind":"tilt","joints":["hip",1]}"#);
        assert!(bad.is_err());
    }
}
