// ABOUTME: Configuration module for engine-wide tuning parameters
// ABOUTME: Environment-driven defaults that exercise profiles may override per session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for Pierre Motion
//!
//! Tuning is resolved per session in three layers: the exercise profile's
//! own overrides, then [`EngineConfig`] loaded from the environment, then the
//! constants in `pierre_motion_core::constants::defaults`.

/// Engine tuning loaded from the environment
pub mod engine;

pub use engine::{EngineConfig, EngineTuning};
