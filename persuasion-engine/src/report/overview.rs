// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::StudySettings;
use crate::{
    archetype::{
        ArchetypeDetail, ArchetypePoint, OutcomeRates, OutcomeTally, archetype_details,
        archetype_points,
    },
    select::select_evaluated,
    tables::{LabRow, OutcomeScenarioRow, lab_rows, outcome_scenario_rows},
};
use persuasion_metadata::TestResult;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// The headline view of the two-phase study.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StudyOverview {
    /// Totals over every two-phase result.
    pub totals: OverviewTotals,
    /// One point per model description, sorted by conversion rate descending.
    pub points: Vec<ArchetypePoint>,
    /// One entry per archetype, in presentation order.
    pub archetypes: Vec<ArchetypeDetail>,
    /// One row per lab, sorted by tests descending.
    pub labs: Vec<LabRow>,
    /// Outcomes for evaluated results outside the two-phase design, sorted by tests descending.
    pub other_scenarios: Vec<OutcomeScenarioRow>,
}

/// Totals over the two-phase results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OverviewTotals {
    /// The number of evaluated two-phase results.
    pub tests: usize,
    /// Distinct model IDs.
    pub unique_models: usize,
    /// Distinct labs.
    pub unique_labs: usize,
    /// Overall rates.
    #[serde(flatten)]
    pub rates: OutcomeRates,
}

impl StudyOverview {
    /// Computes the overview from every loaded result.
    pub fn new(results: &[TestResult], settings: &StudySettings) -> Self {
        let evaluated = select_evaluated(results);
        let (two_phase, other) = settings.two_phase.split(&evaluated);
        debug!(
            two_phase = two_phase.len(),
            other = other.len(),
            "computing study overview"
        );

        let tally = OutcomeTally::of(&two_phase);
        let totals = OverviewTotals {
            tests: tally.tests,
            unique_models: two_phase
                .iter()
                .map(|e| e.result.model_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            unique_labs: two_phase
                .iter()
                .map(|e| e.result.lab())
                .collect::<HashSet<_>>()
                .len(),
            rates: tally.rates(),
        };

        let points = archetype_points(&two_phase);
        let archetypes = archetype_details(&points);
        Self {
            totals,
            points,
            archetypes,
            labs: lab_rows(&two_phase),
            other_scenarios: outcome_scenario_rows(&other),
        }
    }

    /// Returns true if there were no evaluated two-phase results.
    pub fn is_empty(&self) -> bool {
        self.totals.tests == 0
    }
}
