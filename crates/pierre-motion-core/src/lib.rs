// ABOUTME: Core types and constants for the Pierre motion engine
// ABOUTME: Foundation crate with landmark models, joint indices, defaults, and error types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Motion Core
//!
//! Foundation crate providing shared types and constants for the Pierre motion
//! engine. This crate is designed to change infrequently, so the engine crate
//! and its binaries compile incrementally against a stable base.
//!
//! ## Modules
//!
//! - **models**: `Landmark`, `Frame` and `Side`, the input vocabulary of the engine
//! - **constants**: 33-point joint indices, engine defaults, and stock messages
//! - **errors**: `ProfileError`, `ValidationIssue` and `ConfigError`

/// Pose landmark and frame models
pub mod models;

/// Joint indices, engine defaults and stock messages organized by domain
pub mod constants;

/// Error taxonomy for profile loading, validation and configuration
pub mod errors;

pub use errors::{ConfigError, ProfileError, ValidationIssue};
pub use models::{Frame, Landmark, Side};
