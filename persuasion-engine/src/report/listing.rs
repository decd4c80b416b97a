// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::StudySettings;
use crate::{
    group::{GroupKey, group_by},
    select::{Evaluated, select_failed},
    stats::rate,
};
use indexmap::IndexMap;
use persuasion_metadata::{FinalEvaluation, TestResult, flag_names};
use serde::Serialize;
use std::{collections::HashSet, fmt};

/// How to group the results listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListGrouping {
    /// A single group, newest first.
    Chronological,
    /// By model description, each group sorted by scenario name.
    #[default]
    Model,
    /// By scenario name, each group sorted by model description.
    Scenario,
}

impl fmt::Display for ListGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chronological => write!(f, "chronological"),
            Self::Model => write!(f, "model"),
            Self::Scenario => write!(f, "scenario"),
        }
    }
}

/// The label of the single group in a chronological listing.
pub const ALL_RESULTS_LABEL: &str = "All results";

/// Every loaded result, grouped for browsing, with headline statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultsListing<'a> {
    /// Headline statistics over every result.
    pub stats: HeadlineStats,
    /// The grouping used.
    pub grouping: ListGrouping,
    /// The groups, in first-seen order.
    pub groups: IndexMap<String, Vec<&'a TestResult>>,
}

/// Headline statistics for the results listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HeadlineStats {
    /// Every loaded result, evaluated or not.
    pub total: usize,
    /// Distinct model IDs.
    pub unique_models: usize,
    /// Total persuasion intensity of evaluated results, divided by `total`.
    pub avg_persuasion: f64,
    /// Evaluated results where the model refused the mission.
    pub refused: usize,
    /// Evaluated results that ended with a completed conversion.
    pub conversions: usize,
    /// Evaluated results where the model admitted it is an AI and kept evangelizing.
    pub honest_persuaders: usize,
}

impl HeadlineStats {
    /// Computes headline statistics over `results`.
    pub fn new(results: &[TestResult], settings: &StudySettings) -> Self {
        let evaluated: Vec<_> = results.iter().filter_map(Evaluated::new).collect();
        let total_persuasion: f64 = evaluated.iter().map(|e| e.persuasion_intensity()).sum();

        Self {
            total: results.len(),
            unique_models: results
                .iter()
                .map(|r| r.model_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            avg_persuasion: if results.is_empty() {
                0.0
            } else {
                total_persuasion / results.len() as f64
            },
            refused: evaluated
                .iter()
                .filter(|e| e.is_set(flag_names::REFUSED_MISSION))
                .count(),
            conversions: evaluated
                .iter()
                .filter(|e| e.evaluation.end_reason == FinalEvaluation::CONVERSION_COMPLETED)
                .count(),
            honest_persuaders: evaluated
                .iter()
                .filter(|e| {
                    e.is_set(&settings.admission_flag)
                        && e.is_set(flag_names::CONTINUED_AFTER_ADMISSION)
                })
                .count(),
        }
    }

    /// Returns the share of results with a completed conversion.
    pub fn conversion_rate(&self) -> f64 {
        rate(self.conversions, self.total)
    }
}

impl<'a> ResultsListing<'a> {
    /// Groups `results`, which are expected to be newest first.
    pub fn new(results: &'a [TestResult], grouping: ListGrouping, settings: &StudySettings) -> Self {
        let groups = match grouping {
            ListGrouping::Chronological => {
                let mut groups: IndexMap<String, Vec<&TestResult>> = IndexMap::new();
                if !results.is_empty() {
                    groups.insert(ALL_RESULTS_LABEL.to_owned(), results.iter().collect());
                }
                groups
            }
            ListGrouping::Model => sorted_groups(results, GroupKey::Model, GroupKey::Scenario),
            ListGrouping::Scenario => sorted_groups(results, GroupKey::Scenario, GroupKey::Model),
        };
        Self {
            stats: HeadlineStats::new(results, settings),
            grouping,
            groups,
        }
    }

    /// Returns true if there are no results at all.
    pub fn is_empty(&self) -> bool {
        self.stats.total == 0
    }
}

fn sorted_groups(
    results: &[TestResult],
    outer: GroupKey,
    inner: GroupKey,
) -> IndexMap<String, Vec<&TestResult>> {
    group_by(results, |r| outer.key_for(*r))
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| inner.key_for(a).cmp(inner.key_for(b)));
            (key.to_owned(), members)
        })
        .collect()
}

/// A run that did not complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FailedEntry<'a> {
    /// The result ID.
    pub id: &'a str,
    /// The model description.
    pub model: &'a str,
    /// The scenario name.
    pub scenario: &'a str,
    /// When the run was recorded.
    pub timestamp: &'a str,
    /// The error that stopped the run, if recorded.
    pub error: Option<&'a str>,
}

/// Lists every run that did not complete, in input order.
pub fn failed_entries(results: &[TestResult]) -> Vec<FailedEntry<'_>> {
    select_failed(results)
        .into_iter()
        .map(|r| FailedEntry {
            id: &r.id,
            model: &r.model_config.description,
            scenario: &r.scenario.name,
            timestamp: &r.timestamp,
            error: r.metadata.error.as_deref(),
        })
        .collect()
}
