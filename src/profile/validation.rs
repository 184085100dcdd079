// ABOUTME: Eager validation of exercise profiles before any session runs
// ABOUTME: Checks geometry, zone partitions, graph references, rep reachability, safety rules and tuning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Profile validation collects every defect instead of stopping at the first,
//! so an author sees the whole list in one pass.

use super::{ExerciseProfile, MetricSpec, SafetyCheck, TransitionSpec, TuningOverrides, ZoneCondition};
use crate::classifier::check_partition;
use crate::geometry::MetricSource;
use crate::smoothing::SmoothingSpec;
use pierre_motion_core::constants::defaults::MAX_SMOOTHING_WINDOW;
use pierre_motion_core::constants::joints::LANDMARK_COUNT;
use pierre_motion_core::ValidationIssue;
use std::collections::{HashMap, HashSet, VecDeque};

/// Validate a profile and return every issue found
#[must_use]
pub fn validate(profile: &ExerciseProfile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if profile.id.trim().is_empty() || profile.name.trim().is_empty() {
        issues.push(ValidationIssue::EmptyIdentity);
    }

    let zones_by_metric = validate_metrics(&profile.metrics, &mut issues);
    let phases = validate_phases(profile, &mut issues);
    validate_transitions(profile, &phases, &zones_by_metric, &mut issues);
    validate_safety(profile, &zones_by_metric, &mut issues);
    validate_hints(profile, &phases, &zones_by_metric, &mut issues);
    validate_tuning(&profile.tuning, &mut issues);

    issues
}

fn validate_metrics<'a>(
    metrics: &'a [MetricSpec],
    issues: &mut Vec<ValidationIssue>,
) -> HashMap<&'a str, HashSet<&'a str>> {
    if metrics.is_empty() {
        issues.push(ValidationIssue::NoMetrics);
    }

    let mut zones_by_metric = HashMap::new();
    for metric in metrics {
        let zones: HashSet<&str> = metric.zones.iter().map(|band| band.zone.as_str()).collect();
        if zones_by_metric.insert(metric.name.as_str(), zones).is_some() {
            issues.push(ValidationIssue::DuplicateMetric(metric.name.clone()));
        }

        issues.extend(check_partition(&metric.name, &metric.zones));

        for rule in metric.source.rules() {
            for joint in rule.referenced_joints() {
                if joint >= LANDMARK_COUNT {
                    issues.push(ValidationIssue::JointOutOfRange {
                        metric: metric.name.clone(),
                        joint,
                    });
                }
            }
            if rule.has_coincident_joints() {
                issues.push(ValidationIssue::CoincidentJoints {
                    metric: metric.name.clone(),
                });
            }
        }
        if let MetricSource::Bilateral(pair) = &metric.source {
            if pair.left == pair.right {
                issues.push(ValidationIssue::MirroredSidesIdentical {
                    metric: metric.name.clone(),
                });
            }
        }
        if let Some(spec) = metric.smoothing {
            validate_smoothing(spec, issues);
        }
    }
    zones_by_metric
}

fn validate_phases<'a>(
    profile: &'a ExerciseProfile,
    issues: &mut Vec<ValidationIssue>,
) -> HashSet<&'a str> {
    let graph = &profile.phases;
    if graph.phases.is_empty() {
        issues.push(ValidationIssue::NoPhases);
    }
    let mut names = HashSet::new();
    for phase in &graph.phases {
        if !names.insert(phase.name.as_str()) {
            issues.push(ValidationIssue::DuplicatePhase(phase.name.clone()));
        }
    }
    if !names.contains(graph.initial.as_str()) {
        issues.push(ValidationIssue::UnknownInitialPhase(graph.initial.clone()));
    }
    names
}

fn validate_transitions(
    profile: &ExerciseProfile,
    phases: &HashSet<&str>,
    zones_by_metric: &HashMap<&str, HashSet<&str>>,
    issues: &mut Vec<ValidationIssue>,
) {
    for transition in &profile.phases.transitions {
        let context = format!("transition `{}` -> `{}`", transition.from, transition.to);
        for phase in [&transition.from, &transition.to] {
            if !phases.contains(phase.as_str()) {
                issues.push(ValidationIssue::UnknownPhase {
                    context: context.clone(),
                    phase: phase.clone(),
                });
            }
        }
        if transition.when.is_empty() {
            issues.push(ValidationIssue::EmptyCondition {
                from: transition.from.clone(),
                to: transition.to.clone(),
            });
        }
        for condition in &transition.when {
            validate_condition(condition, &context, zones_by_metric, issues);
        }
        if transition.completes_rep && transition.from == transition.to {
            issues.push(ValidationIssue::RepCompletingSelfLoop(transition.from.clone()));
        }
    }

    if phases.contains(profile.phases.initial.as_str())
        && !rep_transition_reachable(&profile.phases.initial, &profile.phases.transitions)
    {
        issues.push(ValidationIssue::NoReachableRepTransition(
            profile.phases.initial.clone(),
        ));
    }
}

fn validate_condition(
    condition: &ZoneCondition,
    context: &str,
    zones_by_metric: &HashMap<&str, HashSet<&str>>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(zones) = zones_by_metric.get(condition.metric.as_str()) else {
        issues.push(ValidationIssue::UnknownMetric {
            context: context.to_owned(),
            metric: condition.metric.clone(),
        });
        return;
    };
    if condition.within.is_empty() && condition.not_in.is_empty() {
        issues.push(ValidationIssue::EmptyZoneSet {
            context: context.to_owned(),
            metric: condition.metric.clone(),
        });
    }
    for zone in condition.zones() {
        if !zones.contains(zone.as_str()) {
            issues.push(ValidationIssue::UnknownZone {
                context: context.to_owned(),
                metric: condition.metric.clone(),
                zone: zone.clone(),
            });
        }
    }
}

/// Breadth-first search from `initial` for a non-self-loop rep-completing edge
fn rep_transition_reachable(initial: &str, transitions: &[TransitionSpec]) -> bool {
    let mut visited = HashSet::from([initial]);
    let mut queue = VecDeque::from([initial]);
    while let Some(phase) = queue.pop_front() {
        for transition in transitions.iter().filter(|t| t.from == phase) {
            if transition.completes_rep && transition.from != transition.to {
                return true;
            }
            if visited.insert(transition.to.as_str()) {
                queue.push_back(transition.to.as_str());
            }
        }
    }
    false
}

fn validate_safety(
    profile: &ExerciseProfile,
    zones_by_metric: &HashMap<&str, HashSet<&str>>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut names = HashSet::new();
    for rule in &profile.safety.rules {
        if rule.name.trim().is_empty() || !names.insert(rule.name.as_str()) {
            issues.push(ValidationIssue::InvalidSafetyRuleName(rule.name.clone()));
        }
        let context = format!("safety rule `{}`", rule.name);
        match &rule.check {
            SafetyCheck::ForbiddenZones { metric, zones } => {
                let condition = ZoneCondition {
                    metric: metric.clone(),
                    within: zones.clone(),
                    not_in: Vec::new(),
                };
                validate_condition(&condition, &context, zones_by_metric, issues);
            }
            SafetyCheck::Symmetry {
                metric,
                max_difference,
            } => {
                match profile.metric(metric) {
                    None => issues.push(ValidationIssue::UnknownMetric {
                        context,
                        metric: metric.clone(),
                    }),
                    Some(spec) if !spec.source.is_bilateral() => {
                        issues.push(ValidationIssue::SymmetryRequiresBilateral {
                            rule: rule.name.clone(),
                            metric: metric.clone(),
                        });
                    }
                    Some(_) => {}
                }
                if !(max_difference.is_finite() && *max_difference > 0.0) {
                    issues.push(ValidationIssue::InvalidSymmetryLimit(rule.name.clone()));
                }
            }
        }
    }
}

fn validate_hints(
    profile: &ExerciseProfile,
    phases: &HashSet<&str>,
    zones_by_metric: &HashMap<&str, HashSet<&str>>,
    issues: &mut Vec<ValidationIssue>,
) {
    for hint in &profile.messages.hints {
        let context = format!("hint `{}`", hint.message);
        if let Some(phase) = &hint.phase {
            if !phases.contains(phase.as_str()) {
                issues.push(ValidationIssue::UnknownPhase {
                    context: context.clone(),
                    phase: phase.clone(),
                });
            }
        }
        let condition = ZoneCondition::is(hint.metric.clone(), hint.zone.clone());
        validate_condition(&condition, &context, zones_by_metric, issues);
    }
}

fn validate_tuning(tuning: &TuningOverrides, issues: &mut Vec<ValidationIssue>) {
    if let Some(visibility) = tuning.min_visibility {
        if !(0.0..=1.0).contains(&visibility) {
            issues.push(ValidationIssue::InvalidVisibility(visibility));
        }
    }
    if let Some(spec) = tuning.smoothing {
        validate_smoothing(spec, issues);
    }
}

/// Check a smoothing spec against engine limits
pub fn validate_smoothing(spec: SmoothingSpec, issues: &mut Vec<ValidationIssue>) {
    match spec {
        SmoothingSpec::MovingAverage { window } => {
            if window == 0 || window > MAX_SMOOTHING_WINDOW {
                issues.push(ValidationIssue::InvalidSmoothingWindow {
                    window,
                    max: MAX_SMOOTHING_WINDOW,
                });
            }
        }
        SmoothingSpec::Exponential { weight } => {
            if !(weight > 0.0 && weight <= 1.0) {
                issues.push(ValidationIssue::InvalidSmoothingWeight { weight });
            }
        }
        SmoothingSpec::Passthrough => {}
    }
}
