// ABOUTME: Main library entry point for the Pierre Motion exercise engine
// ABOUTME: Turns pose landmark frames into rep counts, safety verdicts and rate-limited coaching feedback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy.
#![deny(unsafe_code)]

//! # Pierre Motion
//!
//! A profile-driven engine for camera-based exercise coaching. Each camera
//! tick delivers a [`Frame`] of 33 body landmarks; a [`Session`] turns the
//! stream into repetition counts, form and safety verdicts, and feedback
//! messages with speech triggers.
//!
//! ## Pipeline
//!
//! Frame → geometry → smoothing → zone classification → phase state machine
//! → feedback dispatcher. Every stage is configured by an [`ExerciseProfile`],
//! so a new exercise is a new YAML document rather than new code.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_motion::config::EngineConfig;
//! use pierre_motion::profile::ProfileCatalog;
//! use pierre_motion::session::Session;
//! use pierre_motion::Frame;
//!
//! fn main() -> anyhow::Result<()> {
//!     let catalog = ProfileCatalog::builtin()?;
//!     let mut session = Session::new(catalog.get("squat")?, &EngineConfig::from_env())?;
//!
//!     let frame = Frame::now(Vec::new());
//!     let event = session.process_frame(&frame);
//!     println!("{}: {}", event.phase, event.message);
//!
//!     let summary = session.stop();
//!     println!("{} reps", summary.reps);
//!     Ok(())
//! }
//! ```

/// Engine tuning configuration
pub mod config;

/// Raw metric extraction from landmark frames
pub mod geometry;

/// Per-metric temporal smoothing
pub mod smoothing;

/// Threshold classification into zones
pub mod classifier;

/// Per-session metric runtime state
pub mod metric;

/// Exercise profile schema, validation and catalog
pub mod profile;

/// Phase state machine
pub mod session;

/// Feedback rendering and speech triggers
pub mod feedback;

/// Logging configuration and structured logging setup
pub mod logging;

pub use config::EngineConfig;
pub use feedback::{FeedbackEvent, FeedbackKind, SafetyEdge, SpeechSink};
pub use pierre_motion_core::{ConfigError, Frame, Landmark, ProfileError, Side, ValidationIssue};
pub use profile::{ExerciseProfile, ProfileCatalog};
pub use session::{Session, SessionSummary};
