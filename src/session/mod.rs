// ABOUTME: Phase state machine interpreting an exercise profile frame by frame
// ABOUTME: Runs safety rules, hold-gated transitions, debounced rep counting and feedback dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Exercise Session
//!
//! A [`Session`] owns all mutable state of one exercise attempt. It has no
//! threads and no timers of its own: every time-dependent decision compares
//! the current frame's capture time with timestamps stored on earlier frames,
//! and a negative difference counts as zero.
//!
//! Per frame, after metrics are updated:
//!
//! 1. While any metric has never produced a valid sample, nothing else runs
//!    and the event carries the insufficient-data message.
//! 2. Safety rules are evaluated. A violation resets any pending hold and,
//!    depending on [`ViolationPolicy`], freezes transitions or withholds reps.
//! 3. The first outgoing edge of the current phase whose conditions hold is
//!    the candidate. Hold-gated candidates start a timer and commit only once
//!    the hold elapses while they remain the candidate.
//! 4. Committing a rep-completing edge counts a rep unless it falls inside
//!    the debounce window of the previous counted rep.

mod graph;

/// Final session report
pub mod summary;

pub use summary::SessionSummary;

use crate::config::{EngineConfig, EngineTuning};
use crate::feedback::{
    FeedbackDispatcher, FeedbackEvent, FrameOutcome, SafetyStatus, SpeechSink, ZoneReading,
};
use crate::metric::{MetricReading, MetricTracker};
use crate::profile::{ExerciseProfile, ViolationPolicy};
use chrono::{DateTime, Utc};
use graph::CompiledGraph;
use pierre_motion_core::{Frame, ProfileError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct PendingHold {
    edge: usize,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
struct StepResult {
    rep_counted: bool,
    hold_broken: Option<usize>,
    hold_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    frames: u64,
    violations: u32,
    withheld: u32,
    debounced: u32,
    holds_broken: u32,
}

/// Runtime state of one exercise attempt
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    profile: Arc<ExerciseProfile>,
    tuning: EngineTuning,
    graph: CompiledGraph,
    metrics: Vec<MetricTracker>,
    dispatcher: FeedbackDispatcher,
    phase: usize,
    phase_entered_at: Option<DateTime<Utc>>,
    pending_hold: Option<PendingHold>,
    reps: u32,
    last_rep_at: Option<DateTime<Utc>>,
    violating: bool,
    counters: Counters,
    started_at: Option<DateTime<Utc>>,
    latest_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Start a session for `profile`
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the profile is invalid
    pub fn new(
        profile: impl Into<Arc<ExerciseProfile>>,
        config: &EngineConfig,
    ) -> Result<Self, ProfileError> {
        let profile = profile.into();
        profile.validate()?;

        let tuning = config.resolve(&profile.tuning);
        let metrics: Vec<MetricTracker> = profile
            .metrics
            .iter()
            .map(|spec| MetricTracker::new(spec, tuning.smoothing))
            .collect();
        let graph = CompiledGraph::compile(&profile, &metrics)?;
        let dispatcher = FeedbackDispatcher::new(
            profile.name.clone(),
            profile.messages.clone(),
            tuning.min_silence_ms,
        );
        let id = Uuid::new_v4();

        info!(
            session.id = %id,
            exercise.id = %profile.id,
            tuning.debounce_ms = tuning.debounce_ms,
            tuning.min_visibility = tuning.min_visibility,
            "Exercise session started"
        );

        Ok(Self {
            id,
            phase: graph.initial,
            profile,
            tuning,
            graph,
            metrics,
            dispatcher,
            phase_entered_at: None,
            pending_hold: None,
            reps: 0,
            last_rep_at: None,
            violating: false,
            counters: Counters::default(),
            started_at: None,
            latest_at: None,
        })
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Profile driving this session
    #[must_use]
    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    /// Tuning in effect after profile overrides
    #[must_use]
    pub const fn tuning(&self) -> &EngineTuning {
        &self.tuning
    }

    /// Reps counted so far
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.reps
    }

    /// Current phase name
    #[must_use]
    pub fn phase(&self) -> &str {
        self.graph.phase_name(self.phase)
    }

    /// Whether a safety rule is currently violated
    #[must_use]
    pub const fn is_violating(&self) -> bool {
        self.violating
    }

    /// Time spent in the current phase, up to the latest frame
    #[must_use]
    pub fn time_in_phase_ms(&self) -> u64 {
        match (self.phase_entered_at.or(self.started_at), self.latest_at) {
            (Some(entered), Some(latest)) => elapsed_ms(entered, latest),
            _ => 0,
        }
    }

    /// Per-metric readings for a skeleton overlay
    #[must_use]
    pub fn overlay(&self) -> Vec<MetricReading> {
        self.metrics.iter().map(MetricTracker::reading).collect()
    }

    /// Process one frame and return its feedback event
    pub fn process_frame(&mut self, frame: &Frame) -> FeedbackEvent {
        let now = frame.captured_at;
        self.record_time(now);

        for metric in &mut self.metrics {
            metric.update(frame, self.tuning.min_visibility);
        }
        let low_confidence = self.metrics.iter().any(MetricTracker::is_substituted);
        let warm = self.metrics.iter().all(MetricTracker::is_ready);
        let zones: Vec<Option<usize>> =
            self.metrics.iter().map(MetricTracker::zone_index).collect();

        let was_violating = self.violating;
        let mut violated_rule = None;
        let mut step = StepResult::default();
        if warm {
            violated_rule = self
                .graph
                .rules
                .iter()
                .position(|rule| rule.is_violated(&zones, &self.metrics));
            self.update_safety(violated_rule);
            let frozen = violated_rule.is_some()
                && self.profile.safety.policy == ViolationPolicy::FreezeTransitions;
            if !frozen {
                step = self.step(&zones, now, violated_rule.is_some());
            }
        }

        let safety = match (was_violating, violated_rule.and_then(|i| self.graph.rules.get(i))) {
            (false, Some(rule)) => SafetyStatus::Entered(&rule.message),
            (true, Some(rule)) => SafetyStatus::Sustained(&rule.message),
            (true, None) => SafetyStatus::Cleared,
            (false, None) => SafetyStatus::Clear,
        };
        let hold_broken = step
            .hold_broken
            .and_then(|index| self.graph.edges.get(index))
            .map(|edge| {
                edge.broken_hold_message
                    .as_deref()
                    .unwrap_or(&self.profile.messages.hold_broken)
            });
        let readings: Vec<ZoneReading<'_>> = self
            .metrics
            .iter()
            .filter_map(|metric| {
                metric.zone().map(|zone| ZoneReading {
                    metric: metric.name(),
                    zone,
                })
            })
            .collect();

        let outcome = FrameOutcome {
            captured_at: now,
            phase: self.graph.phase_name(self.phase),
            phase_guidance: self.graph.guidance.get(self.phase).and_then(Option::as_deref),
            rep_count: self.reps,
            rep_counted: step.rep_counted,
            safety,
            hold_broken,
            hold_ms: step.hold_ms,
            zones: &readings,
            insufficient_data: !warm,
            low_confidence,
        };
        self.dispatcher.dispatch(&outcome)
    }

    /// Process one frame and voice the event through `sink` when it should be spoken
    pub fn process_frame_and_speak<S: SpeechSink + ?Sized>(
        &mut self,
        frame: &Frame,
        sink: &mut S,
    ) -> FeedbackEvent {
        let event = self.process_frame(frame);
        if event.should_speak {
            sink.speak(&event.message);
        }
        event
    }

    /// End the session and report its counters
    #[must_use]
    pub fn stop(self) -> SessionSummary {
        let summary = SessionSummary {
            session_id: self.id,
            exercise_id: self.profile.id.clone(),
            reps: self.reps,
            frames_processed: self.counters.frames,
            elapsed_ms: match (self.started_at, self.latest_at) {
                (Some(start), Some(end)) => elapsed_ms(start, end),
                _ => 0,
            },
            safety_violations: self.counters.violations,
            reps_withheld: self.counters.withheld,
            reps_debounced: self.counters.debounced,
            holds_broken: self.counters.holds_broken,
            final_phase: self.phase().to_owned(),
            final_phase_ms: self.time_in_phase_ms(),
            started_at: self.started_at,
            ended_at: self.latest_at,
        };
        info!(
            session.id = %self.id,
            exercise.id = %summary.exercise_id,
            reps = summary.reps,
            frames = summary.frames_processed,
            elapsed_ms = summary.elapsed_ms,
            "Exercise session stopped"
        );
        summary
    }

    fn record_time(&mut self, now: DateTime<Utc>) {
        self.counters.frames += 1;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.latest_at = Some(self.latest_at.map_or(now, |latest| latest.max(now)));
    }

    fn update_safety(&mut self, violated_rule: Option<usize>) {
        let rule = violated_rule.and_then(|index| self.graph.rules.get(index));
        match (self.violating, rule) {
            (false, Some(rule)) => {
                self.counters.violations += 1;
                warn!(
                    session.id = %self.id,
                    safety.rule = %rule.name,
                    policy = ?self.profile.safety.policy,
                    "Safety violation entered"
                );
            }
            (true, None) => info!(session.id = %self.id, "Safety violation cleared"),
            _ => {}
        }
        if rule.is_some() && self.pending_hold.take().is_some() {
            debug!(session.id = %self.id, "Hold timer reset by safety violation");
        }
        self.violating = rule.is_some();
    }

    /// Evaluate outgoing edges of the current phase and commit at most one
    fn step(&mut self, zones: &[Option<usize>], now: DateTime<Utc>, violated: bool) -> StepResult {
        let mut result = StepResult::default();
        let candidate = self
            .graph
            .outgoing(self.phase)
            .find(|(_, edge)| edge.holds(zones))
            .map(|(index, edge)| (index, edge.hold_ms));

        if let Some(pending) = self.pending_hold {
            if candidate.map(|(index, _)| index) != Some(pending.edge) {
                self.pending_hold = None;
                self.cancel_hold(pending, zones, &mut result);
            }
        }

        match candidate {
            None => {}
            Some((index, None)) => self.commit(index, now, violated, &mut result),
            Some((index, Some(hold_ms))) => match self.pending_hold {
                Some(pending) if pending.edge == index => {
                    if elapsed_ms(pending.started_at, now) >= hold_ms {
                        self.commit(index, now, violated, &mut result);
                    } else {
                        result.hold_ms = Some(hold_ms);
                    }
                }
                _ => {
                    debug!(session.id = %self.id, edge = index, hold_ms, "Hold timer started");
                    self.pending_hold = Some(PendingHold {
                        edge: index,
                        started_at: now,
                    });
                    result.hold_ms = Some(hold_ms);
                }
            },
        }
        result
    }

    /// A pending hold lost its candidacy. It broke only if its own condition failed.
    fn cancel_hold(
        &mut self,
        pending: PendingHold,
        zones: &[Option<usize>],
        result: &mut StepResult,
    ) {
        let Some(edge) = self.graph.edges.get(pending.edge) else {
            return;
        };
        if edge.holds(zones) {
            debug!(session.id = %self.id, edge = pending.edge, "Hold superseded by earlier edge");
            return;
        }
        self.counters.holds_broken += 1;
        result.hold_broken = Some(pending.edge);
        result.hold_ms = edge.hold_ms;
        debug!(
            session.id = %self.id,
            from = %self.graph.phase_name(edge.from),
            to = %self.graph.phase_name(edge.to),
            "Hold broken before it elapsed"
        );
    }

    fn commit(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
        violated: bool,
        result: &mut StepResult,
    ) {
        let Some(edge) = self.graph.edges.get(index) else {
            return;
        };
        let (from, to, completes_rep, self_loop) =
            (edge.from, edge.to, edge.completes_rep, edge.is_self_loop());

        self.pending_hold = None;
        self.phase_entered_at = Some(now);
        if self_loop {
            debug!(
                session.id = %self.id,
                phase = %self.graph.phase_name(from),
                "Self-loop reset phase timers"
            );
            return;
        }

        self.phase = to;
        debug!(
            session.id = %self.id,
            from = %self.graph.phase_name(from),
            to = %self.graph.phase_name(to),
            "Phase transition"
        );
        if completes_rep {
            self.complete_rep(now, violated, result);
        }
    }

    fn complete_rep(&mut self, now: DateTime<Utc>, violated: bool, result: &mut StepResult) {
        if violated && self.profile.safety.policy == ViolationPolicy::WithholdReps {
            self.counters.withheld += 1;
            debug!(session.id = %self.id, "Rep withheld during safety violation");
            return;
        }
        if let Some(last) = self.last_rep_at {
            let since = elapsed_ms(last, now);
            if since < self.tuning.debounce_ms {
                self.counters.debounced += 1;
                debug!(session.id = %self.id, since_ms = since, "Rep suppressed by debounce");
                return;
            }
        }
        self.reps += 1;
        self.last_rep_at = Some(now);
        result.rep_counted = true;
        info!(session.id = %self.id, reps = self.reps, "Rep counted");
    }
}

/// Milliseconds from `from` to `to`, clamped at zero
fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_milliseconds().max(0).unsigned_abs()
}
