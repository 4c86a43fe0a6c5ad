// ABOUTME: Re-exports helper modules for taoist-cli
// ABOUTME: Provides JSON output and date defaults shared by commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

pub mod output;
