// ABOUTME: Integration tests for engine configuration loaded from the environment
// ABOUTME: Covers defaults, overrides, lenient fallback and strict rejection of bad values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_motion::config::engine::{
    ENV_DEBOUNCE_MS, ENV_MIN_SILENCE_MS, ENV_MIN_VISIBILITY, ENV_SMOOTHING_WINDOW,
};
use pierre_motion::smoothing::SmoothingSpec;
use pierre_motion::EngineConfig;
use pierre_motion_core::ConfigError;
use serial_test::serial;
use std::env;

const ALL_VARS: [&str; 4] = [
    ENV_MIN_VISIBILITY,
    ENV_SMOOTHING_WINDOW,
    ENV_DEBOUNCE_MS,
    ENV_MIN_SILENCE_MS,
];

fn clear_env() {
    for variable in ALL_VARS {
        env::remove_var(variable);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    assert_eq!(EngineConfig::try_from_env().unwrap(), EngineConfig::default());

    let config = EngineConfig::default();
    assert!((config.min_visibility - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.smoothing, SmoothingSpec::MovingAverage { window: 5 });
    assert_eq!(config.debounce_ms, 800);
    assert_eq!(config.min_silence_ms, 3_000);
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var(ENV_MIN_VISIBILITY, "0.7");
    env::set_var(ENV_SMOOTHING_WINDOW, "3");
    env::set_var(ENV_DEBOUNCE_MS, "1200");
    env::set_var(ENV_MIN_SILENCE_MS, "5000");

    let config = EngineConfig::try_from_env().unwrap();
    assert!((config.min_visibility - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.smoothing, SmoothingSpec::MovingAverage { window: 3 });
    assert_eq!(config.debounce_ms, 1_200);
    assert_eq!(config.min_silence_ms, 5_000);
    assert_eq!(EngineConfig::from_env(), config);
    clear_env();
}

#[test]
#[serial]
fn test_lenient_loading_falls_back_on_bad_values() {
    clear_env();
    env::set_var(ENV_MIN_VISIBILITY, "2.0");
    env::set_var(ENV_SMOOTHING_WINDOW, "0");
    env::set_var(ENV_DEBOUNCE_MS, "soon");

    assert_eq!(EngineConfig::from_env(), EngineConfig::default());
    clear_env();
}

#[test]
#[serial]
fn test_strict_loading_rejects_unparsable_value() {
    clear_env();
    env::set_var(ENV_DEBOUNCE_MS, "soon");

    match EngineConfig::try_from_env() {
        Err(ConfigError::Parse { variable, value }) => {
            assert_eq!(variable, ENV_DEBOUNCE_MS);
            assert_eq!(value, "soon");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    clear_env();
}

#[test]
#[serial]
fn test_strict_loading_rejects_out_of_range_values() {
    clear_env();
    env::set_var(ENV_MIN_VISIBILITY, "1.5");
    assert!(matches!(
        EngineConfig::try_from_env(),
        Err(ConfigError::ValueOutOfRange(ENV_MIN_VISIBILITY))
    ));

    clear_env();
    env::set_var(ENV_SMOOTHING_WINDOW, "1000");
    assert!(matches!(
        EngineConfig::try_from_env(),
        Err(ConfigError::ValueOutOfRange(ENV_SMOOTHING_WINDOW))
    ));
    clear_env();
}
