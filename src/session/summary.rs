// ABOUTME: Counters reported when a session is stopped
// ABOUTME: Serializable so an external persistence collaborator can store finished attempts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final report of one exercise attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: Uuid,
    /// Exercise profile id
    pub exercise_id: String,
    /// Counted repetitions
    pub reps: u32,
    /// Frames processed, including warm-up and degenerate frames
    pub frames_processed: u64,
    /// Time between the first frame and the latest frame timestamp
    pub elapsed_ms: u64,
    /// Number of times a safety violation began
    pub safety_violations: u32,
    /// Rep-completing transitions not counted because of a safety violation
    pub reps_withheld: u32,
    /// Rep-completing transitions not counted because of debounce
    pub reps_debounced: u32,
    /// Holds released before they elapsed
    pub holds_broken: u32,
    /// Phase at stop time
    pub final_phase: String,
    /// Time spent in the final phase up to the latest frame
    pub final_phase_ms: u64,
    /// Capture time of the first frame
    pub started_at: Option<DateTime<Utc>>,
    /// Latest capture time seen
    pub ended_at: Option<DateTime<Utc>>,
}
