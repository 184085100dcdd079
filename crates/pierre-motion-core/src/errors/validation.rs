// ABOUTME: Individual defects reported by exercise profile validation
// ABOUTME: Covers metric geometry, zone partitions, phase graph integrity and tuning ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// One defect found while validating an exercise profile
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    /// Profile id or display name is blank
    #[error("profile id and name must not be empty")]
    EmptyIdentity,

    /// No metrics are declared
    #[error("profile declares no metrics")]
    NoMetrics,

    /// Two metrics share a name
    #[error("metric `{0}` is declared more than once")]
    DuplicateMetric(String),

    /// A metric has no zone bands
    #[error("metric `{metric}` declares no zones")]
    NoZones {
        /// Offending metric
        metric: String,
    },

    /// Two bands of one metric share a zone name
    #[error("metric `{metric}` declares zone `{zone}` more than once")]
    DuplicateZone {
        /// Offending metric
        metric: String,
        /// Repeated zone name
        zone: String,
    },

    /// The first band has a lower bound or the last band has an upper bound
    #[error("metric `{metric}` zone `{zone}` must be open-ended so the bands cover every value")]
    BoundedOuterZone {
        /// Offending metric
        metric: String,
        /// Outer zone that is bounded
        zone: String,
    },

    /// An inner band edge is missing, non-finite, or not strictly increasing
    #[error("metric `{metric}` zone `{zone}` has an invalid bound")]
    InvalidZoneBound {
        /// Offending metric
        metric: String,
        /// Zone with the bad bound
        zone: String,
    },

    /// Adjacent bands leave values unclassified
    #[error("metric `{metric}` has a gap between zones `{lower}` and `{upper}`")]
    ZoneGap {
        /// Offending metric
        metric: String,
        /// Band below the gap
        lower: String,
        /// Band above the gap
        upper: String,
    },

    /// Adjacent bands classify some values twice
    #[error("metric `{metric}` zones `{lower}` and `{upper}` overlap")]
    ZoneOverlap {
        /// Offending metric
        metric: String,
        /// Lower of the overlapping bands
        lower: String,
        /// Upper of the overlapping bands
        upper: String,
    },

    /// A rule references a joint outside the 33-point scheme
    #[error("metric `{metric}` references joint {joint} outside the body scheme")]
    JointOutOfRange {
        /// Offending metric
        metric: String,
        /// Out-of-range joint index
        joint: usize,
    },

    /// A rule uses the same joint twice, so its vectors are always zero-length
    #[error("metric `{metric}` uses the same joint twice in one rule")]
    CoincidentJoints {
        /// Offending metric
        metric: String,
    },

    /// A bilateral metric uses the same rule for both sides
    #[error("metric `{metric}` uses identical joints for both sides")]
    MirroredSidesIdentical {
        /// Offending metric
        metric: String,
    },

    /// Moving-average window is zero or above the engine maximum
    #[error("smoothing window {window} is outside 1..={max}")]
    InvalidSmoothingWindow {
        /// Requested window
        window: usize,
        /// Engine maximum
        max: usize,
    },

    /// EMA weight is not in (0, 1]
    #[error("smoothing weight {weight} is outside (0, 1]")]
    InvalidSmoothingWeight {
        /// Requested weight
        weight: f64,
    },

    /// Visibility floor is not in [0, 1]
    #[error("minimum visibility {0} is outside [0, 1]")]
    InvalidVisibility(f64),

    /// No phases are declared
    #[error("phase graph declares no phases")]
    NoPhases,

    /// Two phases share a name
    #[error("phase `{0}` is declared more than once")]
    DuplicatePhase(String),

    /// Initial phase is not a declared phase
    #[error("initial phase `{0}` is not declared")]
    UnknownInitialPhase(String),

    /// A transition, hint or rule names a phase that does not exist
    #[error("{context} references undeclared phase `{phase}`")]
    UnknownPhase {
        /// Where the reference appears
        context: String,
        /// Dangling phase name
        phase: String,
    },

    /// A condition, hint or rule names a metric that does not exist
    #[error("{context} references undeclared metric `{metric}`")]
    UnknownMetric {
        /// Where the reference appears
        context: String,
        /// Dangling metric name
        metric: String,
    },

    /// A condition, hint or rule names a zone the metric does not have
    #[error("{context} references zone `{zone}` which metric `{metric}` does not declare")]
    UnknownZone {
        /// Where the reference appears
        context: String,
        /// Metric whose zones were searched
        metric: String,
        /// Dangling zone name
        zone: String,
    },

    /// A transition has no conditions and would fire on every frame
    #[error("transition `{from}` -> `{to}` has no conditions")]
    EmptyCondition {
        /// Source phase
        from: String,
        /// Destination phase
        to: String,
    },

    /// A zone condition lists no zones
    #[error("{context} lists no zones for metric `{metric}`")]
    EmptyZoneSet {
        /// Where the condition appears
        context: String,
        /// Metric being tested
        metric: String,
    },

    /// A self-loop is flagged as rep-completing
    #[error("self-loop on phase `{0}` cannot complete a rep")]
    RepCompletingSelfLoop(String),

    /// No rep-completing transition can be reached from the initial phase
    #[error("no rep-completing transition is reachable from initial phase `{0}`")]
    NoReachableRepTransition(String),

    /// A symmetry rule points at a single-sided metric
    #[error("safety rule `{rule}` needs a bilateral metric but `{metric}` is single-sided")]
    SymmetryRequiresBilateral {
        /// Offending rule
        rule: String,
        /// Single-sided metric
        metric: String,
    },

    /// A symmetry limit is not a positive finite number
    #[error("safety rule `{0}` has a non-positive symmetry limit")]
    InvalidSymmetryLimit(String),

    /// A safety rule name is blank or repeated
    #[error("safety rule name `{0}` is blank or repeated")]
    InvalidSafetyRuleName(String),
}
