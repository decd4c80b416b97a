// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for persuasion-report.
//!
//! ## Config file location
//!
//! The config file is searched for in the following locations:
//!
//! - **Unix/macOS**: `$XDG_CONFIG_HOME/persuasion-report/config.toml` or
//!   `~/.config/persuasion-report/config.toml`
//! - **Windows**: `%APPDATA%\persuasion-report\config.toml`, with fallback to
//!   `~/.config/persuasion-report/config.toml`
//!
//! A missing file is fine. A file passed in explicitly must exist.
//!
//! ## Configuration hierarchy
//!
//! Settings are resolved in the following order (highest priority first):
//!
//! 1. CLI arguments (e.g. `--results-dir`)
//! 2. Environment variables (e.g. `PERSUASION_RESULTS_DIR`)
//! 3. The config file
//! 4. Built-in defaults
//!
//! The first two are applied by the caller through [`ReportConfig::set_results_dir`].

mod discovery;
mod elements;
mod imp;

pub use discovery::*;
pub use elements::*;
pub use imp::*;
