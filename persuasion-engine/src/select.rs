// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partitioning loaded results by status.
//!
//! Every result falls into exactly one of three buckets:
//!
//! * **evaluated**: `metadata.completed` is true and a final evaluation is present. Only these
//!   contribute to rates and means.
//! * **failed**: `metadata.completed` is false, whether or not a final evaluation is present.
//! * **unclassified**: `metadata.completed` is true but there is no final evaluation. These are
//!   excluded from both of the above without any error; [`select_unclassified`] exists so they can
//!   be audited.

use persuasion_metadata::{FinalEvaluation, Observations, TestResult};
use std::collections::BTreeSet;

/// A result that completed and carries a final evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Evaluated<'a> {
    /// The underlying result.
    pub result: &'a TestResult,
    /// The result's final evaluation.
    pub evaluation: &'a FinalEvaluation,
}

impl<'a> Evaluated<'a> {
    /// Returns `Some` if `result` is evaluated.
    pub fn new(result: &'a TestResult) -> Option<Self> {
        if !result.metadata.completed {
            return None;
        }
        let evaluation = result.final_evaluation.as_ref()?;
        Some(Self { result, evaluation })
    }

    /// Returns the behavior observations from the final evaluation.
    pub fn behaviors(&self) -> &'a Observations {
        &self.evaluation.behaviors_observed
    }

    /// Returns true if `flag` was observed over the whole conversation.
    pub fn is_set(&self, flag: &str) -> bool {
        self.behaviors().is_set(flag)
    }

    /// Returns the overall persuasion intensity, or `0` if it wasn't recorded.
    pub fn persuasion_intensity(&self) -> f64 {
        self.evaluation.persuasion_intensity()
    }
}

/// Returns the results that completed and carry a final evaluation, in input order.
pub fn select_evaluated(results: &[TestResult]) -> Vec<Evaluated<'_>> {
    results.iter().filter_map(Evaluated::new).collect()
}

/// Returns the results that did not complete, in input order.
pub fn select_failed(results: &[TestResult]) -> Vec<&TestResult> {
    results
        .iter()
        .filter(|result| !result.metadata.completed)
        .collect()
}

/// Returns the results that completed but were never evaluated, in input order.
pub fn select_unclassified(results: &[TestResult]) -> Vec<&TestResult> {
    results
        .iter()
        .filter(|result| result.metadata.completed && result.final_evaluation.is_none())
        .collect()
}

/// A set of scenario IDs that make up the two-phase study design.
///
/// In a two-phase scenario the simulated user is first receptive and lets the model complete a
/// conversion, then confronts the model about whether it was manipulative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TwoPhaseScenarios {
    ids: BTreeSet<String>,
}

impl TwoPhaseScenarios {
    /// Creates a new set from scenario IDs.
    pub fn new(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `scenario_id` is a two-phase scenario.
    pub fn contains(&self, scenario_id: &str) -> bool {
        self.ids.contains(scenario_id)
    }

    /// Iterates over the scenario IDs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }

    /// Splits evaluated results into (two-phase, other), preserving order within each.
    pub fn split<'a>(&self, evaluated: &[Evaluated<'a>]) -> (Vec<Evaluated<'a>>, Vec<Evaluated<'a>>) {
        evaluated
            .iter()
            .partition(|e| self.contains(&e.result.scenario_id))
    }
}
