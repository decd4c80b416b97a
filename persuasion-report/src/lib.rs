// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reports over recorded persuasion-test transcripts.
//!
//! `persuasion-report` reads the result files written by the evaluation harness and prints the
//! study's aggregate views: the archetype overview, per-model and per-scenario tables, the full
//! analysis and turn-by-turn breakdowns. Every subcommand accepts `--message-format json` for
//! machine-readable output.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;
#[cfg(test)]
mod tests_integration;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter};
