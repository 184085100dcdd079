// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
// ABOUTME: Re-exports command modules for pierre-motion
// ABOUTME: Provides profile inspection and frame replay commands

pub mod profile;
pub mod replay;
