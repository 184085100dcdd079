// ABOUTME: Index-based compiled form of a validated profile's phase graph and safety rules
// ABOUTME: Names are resolved once at session creation so frame processing does no string lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::metric::MetricTracker;
use crate::profile::{ExerciseProfile, SafetyCheck, ZoneCondition};
use pierre_motion_core::{ProfileError, ValidationIssue};

/// Zone test on one metric, by index
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    metric: usize,
    within: Vec<usize>,
    not_in: Vec<usize>,
}

impl CompiledCondition {
    /// Whether the condition holds for the current zones; a metric with no zone fails
    pub fn holds(&self, zones: &[Option<usize>]) -> bool {
        let Some(zone) = zones.get(self.metric).copied().flatten() else {
            return false;
        };
        (self.within.is_empty() || self.within.contains(&zone)) && !self.not_in.contains(&zone)
    }
}

/// A phase graph edge, by index
#[derive(Debug, Clone)]
pub struct CompiledEdge {
    pub from: usize,
    pub to: usize,
    pub when: Vec<CompiledCondition>,
    /// Effective hold, after applying the source phase's default
    pub hold_ms: Option<u64>,
    pub completes_rep: bool,
    pub broken_hold_message: Option<String>,
}

impl CompiledEdge {
    /// Conjunction of every condition
    pub fn holds(&self, zones: &[Option<usize>]) -> bool {
        self.when.iter().all(|condition| condition.holds(zones))
    }

    pub const fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone)]
pub enum CompiledCheck {
    ForbiddenZones { metric: usize, zones: Vec<usize> },
    Symmetry { metric: usize, max_difference: f64 },
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub message: String,
    pub check: CompiledCheck,
}

impl CompiledRule {
    /// Whether the rule is violated on the current frame
    pub fn is_violated(&self, zones: &[Option<usize>], metrics: &[MetricTracker]) -> bool {
        match &self.check {
            CompiledCheck::ForbiddenZones { metric, zones: forbidden } => zones
                .get(*metric)
                .copied()
                .flatten()
                .is_some_and(|zone| forbidden.contains(&zone)),
            CompiledCheck::Symmetry {
                metric,
                max_difference,
            } => metrics
                .get(*metric)
                .and_then(MetricTracker::side_difference)
                .is_some_and(|difference| difference > *max_difference),
        }
    }
}

/// Phase graph with names resolved to indices
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    pub phases: Vec<String>,
    pub guidance: Vec<Option<String>>,
    pub initial: usize,
    pub edges: Vec<CompiledEdge>,
    /// Outgoing edge indices per phase, in declaration order
    pub outgoing: Vec<Vec<usize>>,
    pub rules: Vec<CompiledRule>,
}

impl CompiledGraph {
    /// Compile a profile that already passed validation against `metrics`
    ///
    /// # Errors
    ///
    /// Returns a validation error for any reference that does not resolve
    pub fn compile(
        profile: &ExerciseProfile,
        metrics: &[MetricTracker],
    ) -> Result<Self, ProfileError> {
        let resolver = Resolver { profile, metrics };
        let phases: Vec<String> = profile
            .phases
            .phases
            .iter()
            .map(|phase| phase.name.clone())
            .collect();
        let guidance = profile
            .phases
            .phases
            .iter()
            .map(|phase| phase.guidance.clone())
            .collect();
        let initial = resolver.phase(&profile.phases.initial, "initial phase")?;

        let mut edges = Vec::with_capacity(profile.phases.transitions.len());
        let mut outgoing = vec![Vec::new(); phases.len()];
        for transition in &profile.phases.transitions {
            let context = format!("transition `{}` -> `{}`", transition.from, transition.to);
            let from = resolver.phase(&transition.from, &context)?;
            let to = resolver.phase(&transition.to, &context)?;
            let when = transition
                .when
                .iter()
                .map(|condition| resolver.condition(condition, &context))
                .collect::<Result<Vec<_>, _>>()?;
            let hold_ms = transition
                .hold_ms
                .or_else(|| profile.phases.phases.get(from).and_then(|phase| phase.hold_ms))
                .filter(|ms| *ms > 0);
            if let Some(list) = outgoing.get_mut(from) {
                list.push(edges.len());
            }
            edges.push(CompiledEdge {
                from,
                to,
                when,
                hold_ms,
                completes_rep: transition.completes_rep,
                broken_hold_message: transition.broken_hold_message.clone(),
            });
        }

        let rules = profile
            .safety
            .rules
            .iter()
            .map(|rule| -> Result<CompiledRule, ProfileError> {
                let context = format!("safety rule `{}`", rule.name);
                let check = match &rule.check {
                    SafetyCheck::ForbiddenZones { metric, zones } => {
                        let condition = ZoneCondition {
                            metric: metric.clone(),
                            within: zones.clone(),
                            not_in: Vec::new(),
                        };
                        let compiled = resolver.condition(&condition, &context)?;
                        CompiledCheck::ForbiddenZones {
                            metric: compiled.metric,
                            zones: compiled.within,
                        }
                    }
                    SafetyCheck::Symmetry {
                        metric,
                        max_difference,
                    } => CompiledCheck::Symmetry {
                        metric: resolver.metric(metric, &context)?,
                        max_difference: *max_difference,
                    },
                };
                Ok(CompiledRule {
                    name: rule.name.clone(),
                    message: rule.message.clone(),
                    check,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            phases,
            guidance,
            initial,
            edges,
            outgoing,
            rules,
        })
    }

    /// Name of a phase index
    pub fn phase_name(&self, phase: usize) -> &str {
        self.phases.get(phase).map_or("", String::as_str)
    }

    /// Outgoing edges of `phase` in declaration order
    pub fn outgoing(&self, phase: usize) -> impl Iterator<Item = (usize, &CompiledEdge)> {
        self.outgoing
            .get(phase)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.edges.get(index).map(|edge| (index, edge)))
    }
}

struct Resolver<'a> {
    profile: &'a ExerciseProfile,
    metrics: &'a [MetricTracker],
}

impl Resolver<'_> {
    fn fail(&self, issue: ValidationIssue) -> ProfileError {
        ProfileError::Validation {
            profile: self.profile.id.clone(),
            issues: vec![issue],
        }
    }

    fn phase(&self, name: &str, context: &str) -> Result<usize, ProfileError> {
        self.profile
            .phases
            .phases
            .iter()
            .position(|phase| phase.name == name)
            .ok_or_else(|| {
                self.fail(ValidationIssue::UnknownPhase {
                    context: context.to_owned(),
                    phase: name.to_owned(),
                })
            })
    }

    fn metric(&self, name: &str, context: &str) -> Result<usize, ProfileError> {
        self.metrics
            .iter()
            .position(|metric| metric.name() == name)
            .ok_or_else(|| {
                self.fail(ValidationIssue::UnknownMetric {
                    context: context.to_owned(),
                    metric: name.to_owned(),
                })
            })
    }

    fn zones(
        &self,
        metric: usize,
        names: &[String],
        context: &str,
    ) -> Result<Vec<usize>, ProfileError> {
        let tracker = self.metrics.get(metric);
        names
            .iter()
            .map(|zone| {
                tracker
                    .and_then(|tracker| tracker.zone_position(zone))
                    .ok_or_else(|| {
                        self.fail(ValidationIssue::UnknownZone {
                            context: context.to_owned(),
                            metric: tracker.map_or_else(String::new, |t| t.name().to_owned()),
                            zone: zone.clone(),
                        })
                    })
            })
            .collect()
    }

    fn condition(
        &self,
        condition: &ZoneCondition,
        context: &str,
    ) -> Result<CompiledCondition, ProfileError> {
        let metric = self.metric(&condition.metric, context)?;
        Ok(CompiledCondition {
            metric,
            within: self.zones(metric, &condition.within, context)?,
            not_in: self.zones(metric, &condition.not_in, context)?,
        })
    }
}
