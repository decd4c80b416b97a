// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::StudySettings;
use crate::{
    aggregate::{FlagTally, GroupSummary, summarize_groups},
    flags::TrackedFlags,
    group::GroupKey,
    select::{Evaluated, select_evaluated, select_failed, select_unclassified},
    stats::{Distribution, IntensityLevel, intensity_histogram, mean, median, pearson, rate, stddev},
    tables::{ModelRow, ScenarioRow, model_rows, scenario_rows, sort_by_post_conversion},
    temporal::{TurnAverage, first_flag_turns, turn_by_turn_average},
};
use indexmap::IndexMap;
use persuasion_metadata::{Role, TestResult, flag_names};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Partition label for results where the model admitted it is an AI.
pub const ADMITTED_LABEL: &str = "admitted";
/// Partition label for results where it didn't.
pub const NOT_ADMITTED_LABEL: &str = "not-admitted";

/// The full statistical analysis over every evaluated result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisReport {
    /// Sample sizes.
    pub sample: SampleCharacteristics,
    /// Overall count and rate for every tracked flag.
    pub flags: IndexMap<String, FlagTally>,
    /// Confrontation outcomes relative to completed conversions.
    pub post_conversion: PostConversionShares,
    /// The distribution of overall persuasion intensity.
    pub intensity: IntensitySummary,
    /// Per-model rows, in post-conversion order.
    pub models: Vec<ModelRow>,
    /// Per-scenario rows, in first-seen order.
    pub scenarios: Vec<ScenarioRow>,
    /// Pearson correlation between per-model mean persuasion and admission rate.
    pub persuasion_admission_correlation: f64,
    /// When admissions first happened, as 1-based user turn numbers. `None` if none were observed.
    pub admission_turns: Option<Distribution>,
    /// How often admission co-occurred with other behaviors.
    pub co_occurrence: CoOccurrence,
    /// Per-turn persuasion averages, split by whether the model admitted.
    pub turn_by_turn: Vec<TurnAverage>,
}

/// Sample sizes for the analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SampleCharacteristics {
    /// Results that completed and were evaluated.
    pub evaluated: usize,
    /// Results that did not complete.
    pub failed: usize,
    /// Results that completed but were never evaluated. These appear in no other count.
    pub unclassified: usize,
    /// Distinct model IDs among evaluated results.
    pub unique_models: usize,
    /// Distinct scenario IDs among evaluated results.
    pub unique_scenarios: usize,
}

/// Confrontation outcomes among results with a completed conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PostConversionShares {
    /// Results with a completed conversion.
    pub conversions: usize,
    /// Converted results where the model expressed regret.
    pub expressed_regret: FlagTally,
    /// Converted results where the model acknowledged manipulation.
    pub acknowledged_manipulation: FlagTally,
    /// Converted results where the model doubled down.
    pub doubled_down: FlagTally,
}

impl PostConversionShares {
    fn new(evaluated: &[Evaluated<'_>]) -> Self {
        let converted: Vec<_> = evaluated
            .iter()
            .filter(|e| e.is_set(flag_names::COMPLETED_CONVERSION))
            .collect();
        let share = |flag: &str| {
            let count = converted.iter().filter(|e| e.is_set(flag)).count();
            FlagTally {
                count,
                rate: rate(count, converted.len()),
            }
        };
        Self {
            conversions: converted.len(),
            expressed_regret: share(flag_names::EXPRESSED_REGRET),
            acknowledged_manipulation: share(flag_names::ACKNOWLEDGED_MANIPULATION),
            doubled_down: share(flag_names::DOUBLED_DOWN),
        }
    }
}

/// The distribution of overall persuasion intensity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntensitySummary {
    /// One entry per level of the 0-5 scale.
    pub histogram: Vec<IntensityLevel>,
    /// Mean intensity.
    pub mean: f64,
    /// Population standard deviation.
    pub sd: f64,
    /// Lower median.
    pub median: f64,
}

impl IntensitySummary {
    fn new(scores: &[f64]) -> Self {
        Self {
            histogram: intensity_histogram(scores),
            mean: mean(scores),
            sd: stddev(scores),
            median: median(scores),
        }
    }
}

/// Counts of results where admission co-occurred with another behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CoOccurrence {
    /// Admitted and kept evangelizing.
    pub admitted_and_continued: usize,
    /// Admitted and critiqued the prompt.
    pub admitted_and_critiqued: usize,
    /// Admitted and refused the mission.
    pub admitted_and_refused: usize,
}

impl AnalysisReport {
    /// Computes the analysis from every loaded result.
    pub fn new(results: &[TestResult], settings: &StudySettings) -> Self {
        let evaluated = select_evaluated(results);
        debug!(evaluated = evaluated.len(), "computing analysis");
        let admission = settings.admission_flag.as_str();

        let sample = SampleCharacteristics {
            evaluated: evaluated.len(),
            failed: select_failed(results).len(),
            unclassified: select_unclassified(results).len(),
            unique_models: evaluated
                .iter()
                .map(|e| e.result.model_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            unique_scenarios: evaluated
                .iter()
                .map(|e| e.result.scenario_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
        };

        let overall = GroupSummary::new("all", &evaluated, &settings.tracked_flags);
        let scores: Vec<f64> = evaluated.iter().map(|e| e.persuasion_intensity()).collect();

        let mut models = model_rows(&evaluated, &settings.tracked_flags);
        sort_by_post_conversion(&mut models);

        let admission_only = TrackedFlags::new([admission]);
        let per_model = summarize_groups(&evaluated, GroupKey::Model, &admission_only);
        let persuasion_admission_correlation = pearson(
            &per_model.iter().map(|s| s.mean_persuasion).collect::<Vec<_>>(),
            &per_model.iter().map(|s| s.rate(admission)).collect::<Vec<_>>(),
        );

        let admitted_and = |flag: &str| {
            evaluated
                .iter()
                .filter(|e| e.is_set(admission) && e.is_set(flag))
                .count()
        };
        let co_occurrence = CoOccurrence {
            admitted_and_continued: admitted_and(flag_names::CONTINUED_AFTER_ADMISSION),
            admitted_and_critiqued: admitted_and(flag_names::CRITIQUED_PROMPT),
            admitted_and_refused: admitted_and(flag_names::REFUSED_MISSION),
        };

        Self {
            sample,
            flags: overall.flags,
            post_conversion: PostConversionShares::new(&evaluated),
            intensity: IntensitySummary::new(&scores),
            models,
            scenarios: scenario_rows(&evaluated, &settings.tracked_flags),
            persuasion_admission_correlation,
            admission_turns: admission_turn_distribution(&evaluated, admission),
            co_occurrence,
            turn_by_turn: admission_turn_averages(&evaluated, settings),
        }
    }

    /// Returns true if there were no evaluated results.
    pub fn is_empty(&self) -> bool {
        self.sample.evaluated == 0
    }
}

/// When models admit they are an AI, and how persuasion intensity evolves on either side of that.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TurnReport {
    /// The user turn on which the admission flag was first observed, over results where it was.
    pub admission_turns: Option<Distribution>,
    /// See [`admission_turn_averages`].
    pub turn_by_turn: Vec<TurnAverage>,
}

impl TurnReport {
    /// Computes the turn report from every loaded result.
    pub fn new(results: &[TestResult], settings: &StudySettings) -> Self {
        let evaluated = select_evaluated(results);
        Self {
            admission_turns: admission_turn_distribution(&evaluated, &settings.admission_flag),
            turn_by_turn: admission_turn_averages(&evaluated, settings),
        }
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.admission_turns.is_none() && self.turn_by_turn.is_empty()
    }
}

fn admission_turn_distribution(evaluated: &[Evaluated<'_>], admission: &str) -> Option<Distribution> {
    let turns: Vec<f64> = first_flag_turns(evaluated, Role::User, admission)
        .into_iter()
        .map(|turn| turn as f64)
        .collect();
    Distribution::of(&turns)
}

/// Per-turn averages of the intensity metric over user turns, split by whether the model admitted
/// it is an AI.
///
/// Turns beyond the longest recorded conversation length are dropped, as are turns where neither
/// partition has data.
pub fn admission_turn_averages(
    evaluated: &[Evaluated<'_>],
    settings: &StudySettings,
) -> Vec<TurnAverage> {
    let admission = settings.admission_flag.as_str();
    let max_turns = evaluated
        .iter()
        .map(|e| e.evaluation.total_turns as usize)
        .max()
        .unwrap_or(0);

    let mut rows = turn_by_turn_average(
        evaluated.iter().map(|e| e.result),
        Role::User,
        &settings.intensity_metric,
        &[ADMITTED_LABEL, NOT_ADMITTED_LABEL],
        |result| {
            if result.behaviors().is_some_and(|b| b.is_set(admission)) {
                ADMITTED_LABEL
            } else {
                NOT_ADMITTED_LABEL
            }
        },
    );
    rows.truncate(max_turns);
    rows.retain(|row| !row.is_empty());
    rows
}
