// ABOUTME: Declarative exercise profile schema and document loading
// ABOUTME: Metrics, zone bands, phase graph, safety rules, message templates and tuning overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise Profiles
//!
//! An [`ExerciseProfile`] is the whole definition of one exercise as data: the
//! metrics to extract, their zone thresholds, the phase graph the session
//! interprets, the safety rules, and the feedback templates. Adding an
//! exercise is a matter of authoring a YAML or JSON document.
//!
//! Every loader validates before returning, so a profile obtained from
//! [`ExerciseProfile::from_yaml_str`], [`ExerciseProfile::from_json_str`] or
//! [`ExerciseProfile::from_path`] is safe to start a session with.

/// Built-in exercise catalog
pub mod catalog;

/// Load-time validation of profile documents
pub mod validation;

pub use catalog::ProfileCatalog;

use crate::classifier::ZoneBand;
use crate::feedback::FeedbackKind;
use crate::geometry::MetricSource;
use crate::smoothing::SmoothingSpec;
use pierre_motion_core::constants::messages;
use pierre_motion_core::ProfileError;
use serde::{Deserialize, Serialize};
use serde_yaml::with::singleton_map_recursive;
use serde_yaml::{Deserializer as YamlDeserializer, Serializer as YamlSerializer};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Complete, immutable definition of one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    /// Stable identifier, e.g. `squat`
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Metrics tracked every frame
    pub metrics: Vec<MetricSpec>,
    /// Phase state machine
    pub phases: PhaseGraph,
    /// Safety rules and violation policy
    #[serde(default)]
    pub safety: SafetyConfig,
    /// Feedback templates
    #[serde(default)]
    pub messages: MessageTemplates,
    /// Per-profile overrides of engine tuning
    #[serde(default)]
    pub tuning: TuningOverrides,
}

/// One tracked metric: where it comes from and how it is classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Name used by conditions, rules and templates
    pub name: String,
    /// Geometry rule or bilateral rule pair
    pub source: MetricSource,
    /// Ordered threshold bands
    pub zones: Vec<ZoneBand>,
    /// Smoothing override for this metric
    #[serde(default)]
    pub smoothing: Option<SmoothingSpec>,
    /// Reported value before the first valid sample
    #[serde(default)]
    pub neutral: Option<f64>,
}

/// Phase graph interpreted by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseGraph {
    /// Phase the session starts in
    pub initial: String,
    /// Declared phases
    pub phases: Vec<PhaseSpec>,
    /// Directed edges, evaluated in declaration order
    pub transitions: Vec<TransitionSpec>,
}

/// A node of the phase graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Phase name
    pub name: String,
    /// Guidance rendered while in this phase
    #[serde(default)]
    pub guidance: Option<String>,
    /// Default hold for outgoing edges that declare none
    #[serde(default)]
    pub hold_ms: Option<u64>,
}

/// A directed, conditional, optionally hold-gated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Source phase
    pub from: String,
    /// Destination phase
    pub to: String,
    /// Conjunction of zone conditions
    pub when: Vec<ZoneCondition>,
    /// Continuous time the condition must hold before the edge commits
    #[serde(default)]
    pub hold_ms: Option<u64>,
    /// Committing this edge completes a repetition
    #[serde(default)]
    pub completes_rep: bool,
    /// Rendered when a hold on this edge breaks before it elapses
    #[serde(default)]
    pub broken_hold_message: Option<String>,
}

/// Zone membership test on one metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCondition {
    /// Metric tested
    pub metric: String,
    /// Zone must be one of these (ignored when empty)
    #[serde(default, rename = "in", skip_serializing_if = "Vec::is_empty")]
    pub within: Vec<String>,
    /// Zone must be none of these
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_in: Vec<String>,
}

impl ZoneCondition {
    /// Condition satisfied when the metric is in `zone`
    #[must_use]
    pub fn is(metric: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            within: vec![zone.into()],
            not_in: Vec::new(),
        }
    }

    /// Condition satisfied when the metric is anywhere but `zone`
    #[must_use]
    pub fn is_not(metric: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            within: Vec::new(),
            not_in: vec![zone.into()],
        }
    }

    /// Zone names this condition mentions
    pub fn zones(&self) -> impl Iterator<Item = &String> {
        self.within.iter().chain(&self.not_in)
    }
}

/// What a safety violation does to phase progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// No transitions while the violation persists
    FreezeTransitions,
    /// Transitions continue but completed reps are not counted
    #[default]
    WithholdReps,
    /// Transitions and reps continue; a violation still resets pending hold timers
    WarnOnly,
}

/// Safety rules and the policy applied while any is violated
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Effect of a violation on progress
    #[serde(default)]
    pub policy: ViolationPolicy,
    /// Rules evaluated every frame, before transitions
    #[serde(default)]
    pub rules: Vec<SafetyRule>,
}

/// A named safety rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRule {
    /// Rule name, unique within the profile
    pub name: String,
    /// Danger message rendered while violated
    pub message: String,
    /// What is checked
    #[serde(flatten)]
    pub check: SafetyCheck,
}

/// Predicate of a safety rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum SafetyCheck {
    /// Violated while the metric is in any of the zones
    ForbiddenZones {
        /// Metric tested
        metric: String,
        /// Dangerous zones
        zones: Vec<String>,
    },
    /// Violated while both sides are visible and differ by more than the limit
    Symmetry {
        /// Bilateral metric compared across sides
        metric: String,
        /// Largest acceptable left/right difference
        max_difference: f64,
    },
}

impl SafetyCheck {
    /// Metric the check reads
    #[must_use]
    pub fn metric(&self) -> &str {
        match self {
            Self::ForbiddenZones { metric, .. } | Self::Symmetry { metric, .. } => metric,
        }
    }
}

fn default_idle() -> String {
    messages::IDLE.to_owned()
}

fn default_insufficient_data() -> String {
    messages::INSUFFICIENT_DATA.to_owned()
}

fn default_rep_completed() -> String {
    messages::REP_COMPLETED.to_owned()
}

fn default_safety_cleared() -> String {
    messages::SAFETY_CLEARED.to_owned()
}

fn default_hold_broken() -> String {
    messages::HOLD_BROKEN.to_owned()
}

/// Feedback templates. Placeholders: `{reps}`, `{phase}`, `{exercise}`, `{hold_s}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplates {
    /// Fallback when nothing more specific applies
    #[serde(default = "default_idle")]
    pub idle: String,
    /// Rendered while metrics are warming up
    #[serde(default = "default_insufficient_data")]
    pub insufficient_data: String,
    /// Rendered on a counted rep
    #[serde(default = "default_rep_completed")]
    pub rep_completed: String,
    /// Rendered on the frame all safety violations clear
    #[serde(default = "default_safety_cleared")]
    pub safety_cleared: String,
    /// Rendered when a hold breaks early and the edge has no message of its own
    #[serde(default = "default_hold_broken")]
    pub hold_broken: String,
    /// Phase and zone specific guidance
    #[serde(default)]
    pub hints: Vec<ZoneHint>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            idle: default_idle(),
            insufficient_data: default_insufficient_data(),
            rep_completed: default_rep_completed(),
            safety_cleared: default_safety_cleared(),
            hold_broken: default_hold_broken(),
            hints: Vec::new(),
        }
    }
}

const fn default_hint_kind() -> FeedbackKind {
    FeedbackKind::Warning
}

/// Guidance keyed by a metric zone, optionally restricted to one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneHint {
    /// Only applies in this phase when set
    #[serde(default)]
    pub phase: Option<String>,
    /// Metric inspected
    pub metric: String,
    /// Zone that triggers the hint
    pub zone: String,
    /// Message template
    pub message: String,
    /// Severity of the hint
    #[serde(default = "default_hint_kind")]
    pub kind: FeedbackKind,
}

/// Per-profile overrides of engine tuning; unset fields use the engine config
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TuningOverrides {
    /// Landmark visibility floor
    #[serde(default)]
    pub min_visibility: Option<f64>,
    /// Default smoothing for metrics without their own
    #[serde(default)]
    pub smoothing: Option<SmoothingSpec>,
    /// Minimum time between counted reps
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    /// Minimum time before identical feedback is spoken again
    #[serde(default)]
    pub min_silence_ms: Option<u64>,
}

impl ExerciseProfile {
    /// Metric by name
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|metric| metric.name == name)
    }

    /// Validate the profile, collecting every defect
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` listing every issue found
    pub fn validate(&self) -> Result<(), ProfileError> {
        let issues = validation::validate(self);
        if issues.is_empty() {
            Ok(())
        } else {
            warn!(
                profile.id = %self.id,
                issue.count = issues.len(),
                "Rejected invalid exercise profile"
            );
            Err(ProfileError::Validation {
                profile: self.id.clone(),
                issues,
            })
        }
    }

    /// Parse and validate a YAML profile document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation
    pub fn from_yaml_str(document: &str) -> Result<Self, ProfileError> {
        // enum variants are authored as single-key maps (`single: {...}`), not `!tags`
        let profile: Self =
            singleton_map_recursive::deserialize(YamlDeserializer::from_str(document)).map_err(
                |e| ProfileError::Parse {
                    format: "yaml",
                    message: e.to_string(),
                },
            )?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse and validate a JSON profile document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation
    pub fn from_json_str(document: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(document).map_err(|e| ProfileError::Parse {
            format: "json",
            message: e.to_string(),
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file, choosing the parser by extension (`yaml`, `yml`, `json`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// is malformed, or fails validation
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let document = || {
            fs::read_to_string(path).map_err(|source| ProfileError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&document()?),
            Some("json") => Self::from_json_str(&document()?),
            _ => Err(ProfileError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Serialize the profile as YAML in the same form [`Self::from_yaml_str`] reads
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_yaml(&self) -> Result<String, ProfileError> {
        let to_error = |message: String| ProfileError::Parse {
            format: "yaml",
            message,
        };
        let mut buffer = Vec::new();
        singleton_map_recursive::serialize(self, &mut YamlSerializer::new(&mut buffer))
            .map_err(|e| to_error(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| to_error(e.to_string()))
    }
}
