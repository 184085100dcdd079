// ABOUTME: Error types for profile loading, profile validation and engine configuration
// ABOUTME: Configuration defects are rejected eagerly; frame processing itself never fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Types
//!
//! - `ProfileError` - a profile document could not be read, parsed or validated
//! - `ValidationIssue` - one concrete defect found while validating a profile
//! - `ConfigError` - an environment override could not be parsed
//!
//! Input defects (missing or low-confidence landmarks) and timing anomalies are
//! absorbed by the engine and never surface as errors.

mod validation;

pub use validation::ValidationIssue;

use std::env;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing an exercise profile or catalog
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The document parsed but describes an unusable exercise
    #[error("exercise profile `{profile}` failed validation: {}", join_issues(.issues))]
    Validation {
        /// Id of the rejected profile
        profile: String,
        /// Every defect found, in discovery order
        issues: Vec<ValidationIssue>,
    },

    /// The document is not well-formed YAML or JSON for the profile schema
    #[error("failed to parse {format} profile: {message}")]
    Parse {
        /// Document format (`yaml` or `json`)
        format: &'static str,
        /// Parser diagnostic
        message: String,
    },

    /// The profile file could not be read
    #[error("failed to read profile {}: {source}", .path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// File extension is neither YAML nor JSON
    #[error("unsupported profile format for {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Catalog lookup for an id that is not registered
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    /// Two catalog entries share an id
    #[error("duplicate exercise id in catalog: {0}")]
    DuplicateExercise(String),
}

impl ProfileError {
    /// Validation issues carried by this error, empty for other variants
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable access error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] env::VarError),

    /// Failed to parse configuration value
    #[error("Parse error: {variable}={value}")]
    Parse {
        /// Variable that failed to parse
        variable: &'static str,
        /// Raw value found in the environment
        value: String,
    },

    /// Numeric value outside valid range for parameter
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}
