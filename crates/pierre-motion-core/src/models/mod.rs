// ABOUTME: Core data models for the Pierre motion engine
// ABOUTME: Re-exports Landmark, Frame and Side, the input vocabulary of every pipeline stage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Frames are produced by the external pose-estimation collaborator and are
//! immutable once received. Every engine stage reads them by shared reference.

mod landmark;

pub use landmark::{Frame, Landmark, Side};
