// ABOUTME: Per-metric temporal smoothing of raw geometry values
// ABOUTME: Fixed-window moving average or exponential moving average, clamped to observed history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Signal Smoother
//!
//! A [`Smoother`] is owned by exactly one metric of one session. It never
//! blocks and has no failure mode: before the first sample it has no value,
//! and the first sample is returned unsmoothed.
//!
//! Output is clamped to the range of raw inputs it has seen, so smoothing
//! never extrapolates and a run of identical inputs converges to that input
//! exactly rather than to a rounding neighbour of it.

use pierre_motion_core::constants::defaults::SMOOTHING_WINDOW;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Smoothing method and its parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SmoothingSpec {
    /// Arithmetic mean of the last `window` raw values
    MovingAverage {
        /// Number of samples averaged
        window: usize,
    },
    /// `weight * raw + (1 - weight) * previous`
    Exponential {
        /// Weight of the newest sample, in (0, 1]
        weight: f64,
    },
    /// Pass raw values through unchanged
    Passthrough,
}

impl Default for SmoothingSpec {
    fn default() -> Self {
        Self::MovingAverage {
            window: SMOOTHING_WINDOW,
        }
    }
}

/// Updates between exact recomputations of the moving-average sum
const RESUM_INTERVAL: u32 = 1_024;

/// Smoothing state for one metric
#[derive(Debug, Clone)]
pub struct Smoother {
    spec: SmoothingSpec,
    window: VecDeque<f64>,
    sum: f64,
    since_resum: u32,
    // monotonic queues: front is the window minimum / maximum
    lows: VecDeque<f64>,
    highs: VecDeque<f64>,
    current: Option<f64>,
    seen_min: f64,
    seen_max: f64,
}

impl Smoother {
    /// Create an empty smoother
    #[must_use]
    pub fn new(spec: SmoothingSpec) -> Self {
        let capacity = match spec {
            SmoothingSpec::MovingAverage { window } => window.max(1),
            SmoothingSpec::Exponential { .. } | SmoothingSpec::Passthrough => 0,
        };
        Self {
            spec,
            window: VecDeque::with_capacity(capacity),
            sum: 0.0,
            since_resum: 0,
            lows: VecDeque::with_capacity(capacity),
            highs: VecDeque::with_capacity(capacity),
            current: None,
            seen_min: f64::INFINITY,
            seen_max: f64::NEG_INFINITY,
        }
    }

    /// Feed one raw value and return the smoothed output
    pub fn update(&mut self, raw: f64) -> f64 {
        let smoothed = match self.spec {
            SmoothingSpec::Passthrough => raw,
            SmoothingSpec::MovingAverage { window } => self.push_window(raw, window.max(1)),
            SmoothingSpec::Exponential { weight } => {
                self.seen_min = self.seen_min.min(raw);
                self.seen_max = self.seen_max.max(raw);
                self.current.map_or(raw, |previous| {
                    weight
                        .mul_add(raw - previous, previous)
                        .clamp(self.seen_min, self.seen_max)
                })
            }
        };
        self.current = Some(smoothed);
        smoothed
    }

    /// Latest smoothed value, `None` before the first sample
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.current
    }

    /// Running-sum mean of the window, clamped to the window's own range
    fn push_window(&mut self, raw: f64, capacity: usize) -> f64 {
        if self.window.len() == capacity {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
                if self.lows.front() == Some(&oldest) {
                    self.lows.pop_front();
                }
                if self.highs.front() == Some(&oldest) {
                    self.highs.pop_front();
                }
            }
        }
        self.window.push_back(raw);
        self.sum += raw;
        while self.lows.back().is_some_and(|&low| low > raw) {
            self.lows.pop_back();
        }
        self.lows.push_back(raw);
        while self.highs.back().is_some_and(|&high| high < raw) {
            self.highs.pop_back();
        }
        self.highs.push_back(raw);

        self.since_resum += 1;
        if self.since_resum >= RESUM_INTERVAL {
            self.sum = self.window.iter().sum();
            self.since_resum = 0;
        }

        let low = self.lows.front().copied().unwrap_or(raw);
        let high = self.highs.front().copied().unwrap_or(raw);
        (self.sum / self.window.len() as f64).clamp(low, high)
    }
}
