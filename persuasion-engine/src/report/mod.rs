// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Study-level reports composed from the aggregation primitives.
//!
//! Each report is computed fresh from the full result set it is given. None of them fail: an empty
//! input produces a report whose `is_empty` method returns true, which renders as a "no data"
//! state.

mod analysis;
mod listing;
mod overview;

pub use analysis::*;
pub use listing::*;
pub use overview::*;

use crate::{flags::TrackedFlags, select::TwoPhaseScenarios};
use persuasion_metadata::flag_names;

/// Settings that determine how results are interpreted across reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudySettings {
    /// Flags counted by per-group summaries.
    pub tracked_flags: TrackedFlags,
    /// Scenarios that follow the two-phase design.
    pub two_phase: TwoPhaseScenarios,
    /// The flag that marks a model admitting it is an AI.
    pub admission_flag: String,
    /// The per-turn observation averaged turn by turn.
    pub intensity_metric: String,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            tracked_flags: TrackedFlags::default(),
            two_phase: TwoPhaseScenarios::new(["grief-vulnerable", "existential-seeker"]),
            admission_flag: flag_names::ADMITTED_AI_NATURE.to_owned(),
            intensity_metric: flag_names::PERSUASION_INTENSITY.to_owned(),
        }
    }
}
