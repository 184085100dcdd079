// ABOUTME: Engine tuning configuration loaded from environment variables
// ABOUTME: Visibility floor, default smoothing, rep debounce and speech silence interval
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::profile::TuningOverrides;
use crate::smoothing::SmoothingSpec;
use pierre_motion_core::constants::defaults;
use pierre_motion_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Environment variable for the landmark visibility floor
pub const ENV_MIN_VISIBILITY: &str = "PIERRE_MOTION_MIN_VISIBILITY";
/// Environment variable for the default moving-average window
pub const ENV_SMOOTHING_WINDOW: &str = "PIERRE_MOTION_SMOOTHING_WINDOW";
/// Environment variable for the rep debounce interval
pub const ENV_DEBOUNCE_MS: &str = "PIERRE_MOTION_DEBOUNCE_MS";
/// Environment variable for the speech silence interval
pub const ENV_MIN_SILENCE_MS: &str = "PIERRE_MOTION_MIN_SILENCE_MS";

/// Engine-wide tuning shared by every session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Landmarks below this visibility are degenerate
    pub min_visibility: f64,
    /// Smoothing for metrics that declare none
    pub smoothing: SmoothingSpec,
    /// Minimum time between counted reps
    pub debounce_ms: u64,
    /// Minimum time before identical feedback is spoken again
    pub min_silence_ms: u64,
}

/// Tuning in effect for one session after applying profile overrides
pub type EngineTuning = EngineConfig;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_visibility: defaults::MIN_VISIBILITY,
            smoothing: SmoothingSpec::MovingAverage {
                window: defaults::SMOOTHING_WINDOW,
            },
            debounce_ms: defaults::DEBOUNCE_MS,
            min_silence_ms: defaults::MIN_SILENCE_MS,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from environment, falling back to defaults
    /// for unset, unparsable or out-of-range values
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            min_visibility: env::var(ENV_MIN_VISIBILITY)
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v| valid_visibility(*v))
                .unwrap_or(defaults::MIN_VISIBILITY),
            smoothing: SmoothingSpec::MovingAverage {
                window: env::var(ENV_SMOOTHING_WINDOW)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|w| valid_window(*w))
                    .unwrap_or(defaults::SMOOTHING_WINDOW),
            },
            debounce_ms: env::var(ENV_DEBOUNCE_MS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::DEBOUNCE_MS),
            min_silence_ms: env::var(ENV_MIN_SILENCE_MS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::MIN_SILENCE_MS),
        }
    }

    /// Load engine configuration from environment, rejecting bad values
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but unparsable or out of range
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let min_visibility = parse_var(ENV_MIN_VISIBILITY)?.unwrap_or(defaults::MIN_VISIBILITY);
        if !valid_visibility(min_visibility) {
            return Err(ConfigError::ValueOutOfRange(ENV_MIN_VISIBILITY));
        }
        let window = parse_var(ENV_SMOOTHING_WINDOW)?.unwrap_or(defaults::SMOOTHING_WINDOW);
        if !valid_window(window) {
            return Err(ConfigError::ValueOutOfRange(ENV_SMOOTHING_WINDOW));
        }
        Ok(Self {
            min_visibility,
            smoothing: SmoothingSpec::MovingAverage { window },
            debounce_ms: parse_var(ENV_DEBOUNCE_MS)?.unwrap_or(defaults::DEBOUNCE_MS),
            min_silence_ms: parse_var(ENV_MIN_SILENCE_MS)?.unwrap_or(defaults::MIN_SILENCE_MS),
        })
    }

    /// Apply a profile's overrides on top of this configuration
    #[must_use]
    pub fn resolve(&self, overrides: &TuningOverrides) -> EngineTuning {
        Self {
            min_visibility: overrides.min_visibility.unwrap_or(self.min_visibility),
            smoothing: overrides.smoothing.unwrap_or(self.smoothing),
            debounce_ms: overrides.debounce_ms.unwrap_or(self.debounce_ms),
            min_silence_ms: overrides.min_silence_ms.unwrap_or(self.min_silence_ms),
        }
    }
}

fn parse_var<T: FromStr>(variable: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse { variable, value }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn valid_visibility(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

const fn valid_window(window: usize) -> bool {
    window >= 1 && window <= defaults::MAX_SMOOTHING_WINDOW
}
