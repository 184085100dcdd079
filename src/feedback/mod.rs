// ABOUTME: Feedback dispatcher turning per-frame session outcomes into user-facing events
// ABOUTME: Applies message precedence, renders template placeholders, and rate-limits speech triggers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Feedback Dispatcher
//!
//! Exactly one [`FeedbackEvent`] is produced per processed frame. Message
//! precedence, highest first:
//!
//! 1. insufficient data (metrics still warming up)
//! 2. safety edge or sustained violation
//! 3. a hold released before it elapsed
//! 4. a counted rep
//! 5. zone hints, phase-specific before generic
//! 6. phase guidance
//! 7. idle
//!
//! Speech is triggered when the rendered message differs from the previous
//! frame's message, or when the silence interval has elapsed since the last
//! trigger.

/// Speech output seam
pub mod speech;

pub use speech::{SpeechSink, TracingSpeech};

use crate::profile::{MessageTemplates, ZoneHint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a feedback event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Neutral guidance
    Info,
    /// Positive reinforcement, e.g. a counted rep
    Success,
    /// Form correction
    Warning,
    /// Safety violation
    Danger,
}

/// Which safety edge, if any, this frame crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyEdge {
    /// First frame of a violation
    Entered,
    /// First frame after every violation cleared
    Cleared,
}

/// Immutable record emitted once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Severity
    pub kind: FeedbackKind,
    /// Rendered message
    pub message: String,
    /// Whether the speech collaborator should voice `message`
    pub should_speak: bool,
    /// 1 when this frame counted a rep, else 0
    pub rep_count_delta: u32,
    /// Reps counted so far
    pub rep_count: u32,
    /// Phase after this frame
    pub phase: String,
    /// Safety edge crossed on this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_edge: Option<SafetyEdge>,
    /// Some metric substituted its last valid value this frame
    pub low_confidence: bool,
    /// Capture time of the frame that produced the event
    pub captured_at: DateTime<Utc>,
}

/// Safety status of a frame as seen by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyStatus<'a> {
    /// No rule violated, none cleared
    Clear,
    /// A violation began; carries the first violated rule's message
    Entered(&'a str),
    /// A violation continues
    Sustained(&'a str),
    /// Every violation cleared this frame
    Cleared,
}

/// Current zone of one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneReading<'a> {
    /// Metric name
    pub metric: &'a str,
    /// Zone name
    pub zone: &'a str,
}

/// Everything the session decided about one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome<'a> {
    /// Capture time
    pub captured_at: DateTime<Utc>,
    /// Phase after the frame
    pub phase: &'a str,
    /// Guidance of that phase
    pub phase_guidance: Option<&'a str>,
    /// Reps counted so far
    pub rep_count: u32,
    /// Whether this frame counted a rep
    pub rep_counted: bool,
    /// Safety status
    pub safety: SafetyStatus<'a>,
    /// Message template of a hold that broke this frame
    pub hold_broken: Option<&'a str>,
    /// Hold duration relevant to `{hold_s}`
    pub hold_ms: Option<u64>,
    /// Zones of every metric
    pub zones: &'a [ZoneReading<'a>],
    /// Metrics are still warming up
    pub insufficient_data: bool,
    /// Some metric was substituted this frame
    pub low_confidence: bool,
}

/// Renders feedback events and rate-limits speech
#[derive(Debug, Clone)]
pub struct FeedbackDispatcher {
    exercise: String,
    templates: MessageTemplates,
    min_silence_ms: u64,
    last_message: Option<String>,
    last_spoken_at: Option<DateTime<Utc>>,
}

impl FeedbackDispatcher {
    /// Create a dispatcher for one session
    #[must_use]
    pub fn new(
        exercise: impl Into<String>,
        templates: MessageTemplates,
        min_silence_ms: u64,
    ) -> Self {
        Self {
            exercise: exercise.into(),
            templates,
            min_silence_ms,
            last_message: None,
            last_spoken_at: None,
        }
    }

    /// Render the event for one frame
    pub fn dispatch(&mut self, outcome: &FrameOutcome<'_>) -> FeedbackEvent {
        let (kind, template, safety_edge) = self.select(outcome);
        let message = self.render(template, outcome);
        let should_speak = self.should_speak(&message, outcome.captured_at);
        if should_speak {
            self.last_spoken_at = Some(outcome.captured_at);
        }
        self.last_message = Some(message.clone());

        FeedbackEvent {
            kind,
            message,
            should_speak,
            rep_count_delta: u32::from(outcome.rep_counted),
            rep_count: outcome.rep_count,
            phase: outcome.phase.to_owned(),
            safety_edge,
            low_confidence: outcome.low_confidence,
            captured_at: outcome.captured_at,
        }
    }

    /// Pick kind, template and safety edge by precedence
    fn select<'a>(
        &'a self,
        outcome: &FrameOutcome<'a>,
    ) -> (FeedbackKind, &'a str, Option<SafetyEdge>) {
        if outcome.insufficient_data {
            return (FeedbackKind::Info, &self.templates.insufficient_data, None);
        }
        match outcome.safety {
            SafetyStatus::Entered(message) => {
                return (FeedbackKind::Danger, message, Some(SafetyEdge::Entered));
            }
            SafetyStatus::Sustained(message) => return (FeedbackKind::Warning, message, None),
            SafetyStatus::Cleared => {
                return (
                    FeedbackKind::Info,
                    &self.templates.safety_cleared,
                    Some(SafetyEdge::Cleared),
                );
            }
            SafetyStatus::Clear => {}
        }
        if let Some(message) = outcome.hold_broken {
            return (FeedbackKind::Warning, message, None);
        }
        if outcome.rep_counted {
            return (FeedbackKind::Success, &self.templates.rep_completed, None);
        }
        if let Some(hint) = self.matching_hint(outcome) {
            return (hint.kind, &hint.message, None);
        }
        if let Some(guidance) = outcome.phase_guidance {
            return (FeedbackKind::Info, guidance, None);
        }
        (FeedbackKind::Info, &self.templates.idle, None)
    }

    fn matching_hint(&self, outcome: &FrameOutcome<'_>) -> Option<&ZoneHint> {
        let zone_matches = |hint: &&ZoneHint| {
            outcome
                .zones
                .iter()
                .any(|reading| reading.metric == hint.metric && reading.zone == hint.zone)
        };
        let hints = &self.templates.hints;
        hints
            .iter()
            .filter(|hint| hint.phase.as_deref() == Some(outcome.phase))
            .find(zone_matches)
            .or_else(|| {
                hints
                    .iter()
                    .filter(|hint| hint.phase.is_none())
                    .find(zone_matches)
            })
    }

    fn render(&self, template: &str, outcome: &FrameOutcome<'_>) -> String {
        render_template(
            template,
            &[
                ("{reps}", outcome.rep_count.to_string()),
                ("{phase}", outcome.phase.to_owned()),
                ("{exercise}", self.exercise.clone()),
                ("{hold_s}", format_seconds(outcome.hold_ms.unwrap_or(0))),
            ],
        )
    }

    fn should_speak(&self, message: &str, now: DateTime<Utc>) -> bool {
        if self.last_message.as_deref() != Some(message) {
            return true;
        }
        self.last_spoken_at.is_none_or(|spoken| {
            let silent_ms = (now - spoken).num_milliseconds().max(0);
            silent_ms.unsigned_abs() >= self.min_silence_ms
        })
    }
}

/// Replace each placeholder in `template` with its value
#[must_use]
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |text, (placeholder, value)| {
            if text.contains(placeholder) {
                text.replace(placeholder, value)
            } else {
                text
            }
        })
}

/// Milliseconds as seconds, without a fractional part when whole
fn format_seconds(ms: u64) -> String {
    if ms % 1_000 == 0 {
        (ms / 1_000).to_string()
    } else {
        format!("{:.1}", ms as f64 / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn templates() -> MessageTemplates {
        MessageTemplates {
            rep_completed: "{reps} done".to_owned(),
            hints: vec![
                ZoneHint {
                    phase: None,
                    metric: "knee".to_owned(),
                    zone: "shallow".to_owned(),
                    message: "Go lower".to_owned(),
                    kind: FeedbackKind::Warning,
                },
                ZoneHint {
                    phase: Some("up".to_owned()),
                    metric: "knee".to_owned(),
                    zone: "shallow".to_owned(),
                    message: "Start the descent".to_owned(),
                    kind: FeedbackKind::Info,
                },
            ],
            ..MessageTemplates::default()
        }
    }

    fn outcome<'a>(at: DateTime<Utc>, zones: &'a [ZoneReading<'a>]) -> FrameOutcome<'a> {
        FrameOutcome {
            captured_at: at,
            phase: "down",
            phase_guidance: Some("Push up through the heels"),
            rep_count: 0,
            rep_counted: false,
            safety: SafetyStatus::Clear,
            hold_broken: None,
            hold_ms: None,
            zones,
            insufficient_data: false,
            low_confidence: false,
        }
    }

    #[test]
    fn test_safety_outranks_rep_and_guidance() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let mut frame = outcome(Utc::now(), &[]);
        frame.rep_counted = true;
        frame.safety = SafetyStatus::Entered("Knees locked");
        let event = dispatcher.dispatch(&frame);
        assert_eq!(event.kind, FeedbackKind::Danger);
        assert_eq!(event.message, "Knees locked");
        assert_eq!(event.safety_edge, Some(SafetyEdge::Entered));
        assert_eq!(event.rep_count_delta, 1);
    }

    #[test]
    fn test_phase_specific_hint_before_generic() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let zones = [ZoneReading {
            metric: "knee",
            zone: "shallow",
        }];
        let mut frame = outcome(Utc::now(), &zones);
        assert_eq!(dispatcher.dispatch(&frame).message, "Go lower");
        frame.phase = "up";
        assert_eq!(dispatcher.dispatch(&frame).message, "Start the descent");
    }

    #[test]
    fn test_guidance_then_idle() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let mut frame = outcome(Utc::now(), &[]);
        assert_eq!(dispatcher.dispatch(&frame).message, "Push up through the heels");
        frame.phase_guidance = None;
        let event = dispatcher.dispatch(&frame);
        assert_eq!(event.message, "Keep going");
        assert_eq!(event.kind, FeedbackKind::Info);
    }

    #[test]
    fn test_placeholders_are_rendered() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let mut frame = outcome(Utc::now(), &[]);
        frame.rep_counted = true;
        frame.rep_count = 7;
        assert_eq!(dispatcher.dispatch(&frame).message, "7 done");
        assert_eq!(
            render_template(
                "{exercise}: hold {hold_s}s",
                &[
                    ("{exercise}", "Plank".to_owned()),
                    ("{hold_s}", format_seconds(2_500))
                ]
            ),
            "Plank: hold 2.5s"
        );
    }

    #[test]
    fn test_repeated_message_is_rate_limited() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let start = Utc::now();
        let first = dispatcher.dispatch(&outcome(start, &[]));
        let again = dispatcher.dispatch(&outcome(start + Duration::milliseconds(1_000), &[]));
        let later = dispatcher.dispatch(&outcome(start + Duration::milliseconds(3_100), &[]));
        assert!(first.should_speak);
        assert!(!again.should_speak);
        assert!(later.should_speak);
    }

    #[test]
    fn test_changed_message_speaks_immediately() {
        let mut dispatcher = FeedbackDispatcher::new("Squat", templates(), 3_000);
        let start = Utc::now();
        dispatcher.dispatch(&outcome(start, &[]));
        let mut frame = outcome(start + Duration::milliseconds(40), &[]);
        frame.insufficient_data = true;
        assert!(dispatcher.dispatch(&frame).should_speak);
    }
}
