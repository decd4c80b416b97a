// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row shapes for comparison tables.
//!
//! These are thin views over [`GroupSummary`] and [`OutcomeTally`]. Builders return rows in the
//! order groups were first seen; callers sort with [`sort_rows`] or the fixed orderings documented
//! on each report.

use crate::{
    aggregate::GroupSummary,
    archetype::{OutcomeRates, OutcomeTally, PostConversionResponse},
    errors::SortFieldParseError,
    flags::TrackedFlags,
    group::{GroupKey, group_by},
    select::{Evaluated, select_evaluated},
    stats::{mean, rate},
};
use indexmap::{IndexMap, IndexSet};
use persuasion_metadata::{TestResult, clean_model_name, flag_names};
use serde::Serialize;
use std::cmp::Ordering;

/// A per-model row, keyed by model description.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModelRow {
    /// The model description.
    pub name: String,
    /// The model ID of the first result seen for this description.
    pub model_id: String,
    /// The number of evaluated results.
    pub n: usize,
    /// Mean persuasion intensity.
    pub mean_persuasion: f64,
    /// Population standard deviation of persuasion intensity.
    pub sd_persuasion: f64,
    /// One rate per tracked flag.
    pub rates: IndexMap<String, f64>,
    /// How the model responded after converting.
    pub response: PostConversionResponse,
}

impl ModelRow {
    fn new(summary: GroupSummary, model_id: &str) -> Self {
        let response = PostConversionResponse::classify(
            summary.rate(flag_names::REFUSED_MISSION),
            summary.rate(flag_names::COMPLETED_CONVERSION),
            summary.rate(flag_names::EXPRESSED_REGRET),
            summary.rate(flag_names::ACKNOWLEDGED_MANIPULATION),
            summary.rate(flag_names::DOUBLED_DOWN),
        );
        Self {
            rates: rates_of(&summary),
            name: summary.key,
            model_id: model_id.to_owned(),
            n: summary.n,
            mean_persuasion: summary.mean_persuasion,
            sd_persuasion: summary.sd_persuasion,
            response,
        }
    }

    /// Returns the rate for `flag`, or `0` if it isn't tracked.
    pub fn rate(&self, flag: &str) -> f64 {
        self.rates.get(flag).copied().unwrap_or(0.0)
    }
}

/// Builds one row per model description.
///
/// The post-conversion response is judged from the refusal, conversion, regret, acknowledgment and
/// doubled-down rates; a flag that isn't tracked reads as `0` there.
pub fn model_rows(evaluated: &[Evaluated<'_>], flags: &TrackedFlags) -> Vec<ModelRow> {
    group_by(evaluated, |e| GroupKey::Model.key_for(e.result))
        .into_iter()
        .map(|(name, members)| {
            let model_id = members
                .first()
                .map_or("", |member| member.result.model_id.as_str());
            ModelRow::new(GroupSummary::new(name, members, flags), model_id)
        })
        .collect()
}

/// Sorts model rows for the post-conversion table: by refusal, then regret, then acknowledgment,
/// then doubling down, all descending. Ties keep their order.
pub fn sort_by_post_conversion(rows: &mut [ModelRow]) {
    const ORDER: [&str; 4] = [
        flag_names::REFUSED_MISSION,
        flag_names::EXPRESSED_REGRET,
        flag_names::ACKNOWLEDGED_MANIPULATION,
        flag_names::DOUBLED_DOWN,
    ];
    rows.sort_by(|a, b| {
        ORDER
            .iter()
            .map(|flag| b.rate(flag).total_cmp(&a.rate(flag)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// A per-scenario row, keyed by scenario name.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioRow {
    /// The scenario name.
    pub name: String,
    /// The number of evaluated results.
    pub n: usize,
    /// Mean persuasion intensity.
    pub mean_persuasion: f64,
    /// Population standard deviation of persuasion intensity.
    pub sd_persuasion: f64,
    /// One rate per tracked flag.
    pub rates: IndexMap<String, f64>,
}

/// Builds one row per scenario name.
pub fn scenario_rows(evaluated: &[Evaluated<'_>], flags: &TrackedFlags) -> Vec<ScenarioRow> {
    group_by(evaluated, |e| GroupKey::Scenario.key_for(e.result))
        .into_iter()
        .map(|(name, members)| {
            let summary = GroupSummary::new(name, members, flags);
            ScenarioRow {
                rates: rates_of(&summary),
                name: summary.key,
                n: summary.n,
                mean_persuasion: summary.mean_persuasion,
                sd_persuasion: summary.sd_persuasion,
            }
        })
        .collect()
}

fn rates_of(summary: &GroupSummary) -> IndexMap<String, f64> {
    summary
        .flags
        .iter()
        .map(|(flag, tally)| (flag.clone(), tally.rate))
        .collect()
}

/// A per-lab row over two-phase results.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabRow {
    /// The lab.
    pub lab: String,
    /// The number of evaluated results.
    pub tests: usize,
    /// Conversion, acknowledgment, refusal and regret rates.
    #[serde(flatten)]
    pub rates: OutcomeRates,
    /// Display names of the models tested from this lab, in first-seen order.
    pub models: IndexSet<String>,
}

/// Builds one row per lab, sorted by number of tests descending.
pub fn lab_rows(evaluated: &[Evaluated<'_>]) -> Vec<LabRow> {
    let mut rows: Vec<_> = group_by(evaluated, |e| GroupKey::Lab.key_for(e.result))
        .into_iter()
        .map(|(lab, members)| {
            let models = members
                .iter()
                .map(|m| clean_model_name(&m.result.model_config.description).to_owned())
                .collect();
            let tally = OutcomeTally::of(members);
            LabRow {
                lab: lab.to_owned(),
                tests: tally.tests,
                rates: tally.rates(),
                models,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.tests.cmp(&a.tests));
    rows
}

/// A per-scenario outcome row for scenarios outside the two-phase design.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutcomeScenarioRow {
    /// The scenario name.
    pub name: String,
    /// The ID of the first result seen with this name.
    pub scenario_id: String,
    /// The number of evaluated results.
    pub tests: usize,
    /// Conversion, acknowledgment, refusal and regret rates.
    #[serde(flatten)]
    pub rates: OutcomeRates,
}

/// Builds one outcome row per scenario name, sorted by number of tests descending.
pub fn outcome_scenario_rows(evaluated: &[Evaluated<'_>]) -> Vec<OutcomeScenarioRow> {
    let mut rows: Vec<_> = group_by(evaluated, |e| GroupKey::Scenario.key_for(e.result))
        .into_iter()
        .map(|(name, members)| {
            let scenario_id = members
                .first()
                .map_or_else(String::new, |m| m.result.scenario_id.clone());
            let tally = OutcomeTally::of(members);
            OutcomeScenarioRow {
                name: name.to_owned(),
                scenario_id,
                tests: tally.tests,
                rates: tally.rates(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.tests.cmp(&a.tests));
    rows
}

/// A per-model-ID row over every loaded result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComparisonRow {
    /// The model ID.
    pub model_id: String,
    /// The description of the first result seen for this model ID.
    pub description: String,
    /// The number of results, evaluated or not.
    pub test_count: usize,
    /// The number of evaluated results; every average and rate below is over these.
    pub evaluated_count: usize,
    /// Mean persuasion intensity.
    pub avg_persuasion: f64,
    /// Share that broke character.
    pub broke_character_rate: f64,
    /// Share that attempted a conversion.
    pub conversion_attempted_rate: f64,
    /// Share that used emotional manipulation.
    pub emotional_manipulation_rate: f64,
    /// Mean number of turns.
    pub avg_turns: f64,
}

/// Builds one comparison row per model ID, in first-seen order.
pub fn comparison_rows(results: &[TestResult]) -> Vec<ComparisonRow> {
    group_by(results, |r| GroupKey::ModelId.key_for(*r))
        .into_iter()
        .map(|(model_id, members)| {
            let description = members
                .first()
                .map_or_else(String::new, |r| r.model_config.description.clone());
            let evaluated: Vec<_> = members.iter().copied().filter_map(Evaluated::new).collect();
            let share = |flag: &str| {
                rate(evaluated.iter().filter(|e| e.is_set(flag)).count(), evaluated.len())
            };
            let scores: Vec<f64> = evaluated.iter().map(|e| e.persuasion_intensity()).collect();
            let turns: Vec<f64> = evaluated
                .iter()
                .map(|e| f64::from(e.evaluation.total_turns))
                .collect();

            ComparisonRow {
                model_id: model_id.to_owned(),
                description,
                test_count: members.len(),
                evaluated_count: evaluated.len(),
                avg_persuasion: mean(&scores),
                broke_character_rate: share(flag_names::BROKE_CHARACTER),
                conversion_attempted_rate: share(flag_names::CONVERSION_ATTEMPTED),
                emotional_manipulation_rate: share(flag_names::EMOTIONAL_MANIPULATION),
                avg_turns: mean(&turns),
            }
        })
        .collect()
}

/// A numeric column that summary rows can be sorted by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// The number of results in the row.
    Tests,
    /// Mean persuasion intensity.
    MeanPersuasion,
    /// Population standard deviation of persuasion intensity.
    SdPersuasion,
    /// The rate of a tracked flag.
    Rate(String),
}

impl SortKey {
    /// Parses a sort key from its kebab-case name.
    ///
    /// Flag names are accepted in either kebab-case (`admitted-ai-nature`) or their original
    /// snake_case form, and must be tracked.
    pub fn parse(input: &str, flags: &TrackedFlags) -> Result<Self, SortFieldParseError> {
        match input {
            "tests" | "n" => return Ok(Self::Tests),
            "mean-persuasion" => return Ok(Self::MeanPersuasion),
            "sd-persuasion" => return Ok(Self::SdPersuasion),
            _ => {}
        }
        let flag = input.replace('-', "_");
        if flags.contains(&flag) {
            Ok(Self::Rate(flag))
        } else {
            Err(SortFieldParseError::new(input, Self::known_values(flags)))
        }
    }

    /// Returns every accepted name, in kebab-case.
    pub fn known_values(flags: &TrackedFlags) -> Vec<String> {
        ["tests", "mean-persuasion", "sd-persuasion"]
            .into_iter()
            .map(str::to_owned)
            .chain(flags.iter().map(|flag| flag.replace('_', "-")))
            .collect()
    }
}

/// A row that can be sorted by a [`SortKey`].
pub trait SortableRow {
    /// Returns the value of `key` for this row.
    fn sort_value(&self, key: &SortKey) -> f64;
}

impl SortableRow for ModelRow {
    fn sort_value(&self, key: &SortKey) -> f64 {
        match key {
            SortKey::Tests => self.n as f64,
            SortKey::MeanPersuasion => self.mean_persuasion,
            SortKey::SdPersuasion => self.sd_persuasion,
            SortKey::Rate(flag) => self.rate(flag),
        }
    }
}

impl SortableRow for ScenarioRow {
    fn sort_value(&self, key: &SortKey) -> f64 {
        match key {
            SortKey::Tests => self.n as f64,
            SortKey::MeanPersuasion => self.mean_persuasion,
            SortKey::SdPersuasion => self.sd_persuasion,
            SortKey::Rate(flag) => self.rates.get(flag).copied().unwrap_or(0.0),
        }
    }
}

/// Sorts rows by `key`, descending. Ties keep their order.
pub fn sort_rows<T: SortableRow>(rows: &mut [T], key: &SortKey) {
    rows.sort_by(|a, b| b.sort_value(key).total_cmp(&a.sort_value(key)));
}

/// Convenience: evaluates `results` and builds model rows.
pub fn model_rows_for(results: &[TestResult], flags: &TrackedFlags) -> Vec<ModelRow> {
    model_rows(&select_evaluated(results), flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_data::RecordFixture;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn sample() -> Vec<TestResult> {
        vec![
            RecordFixture::new("1")
                .model("gpt-5", "openai/gpt-5", "GPT-5 - default")
                .scenario("grief-vulnerable", "Grief")
                .intensity(4)
                .flag(flag_names::COMPLETED_CONVERSION, true)
                .flag(flag_names::DOUBLED_DOWN, true)
                .build(),
            RecordFixture::new("2")
                .model("claude", "anthropic/claude", "Claude - thinking")
                .scenario("grief-vulnerable", "Grief")
                .intensity(1)
                .flag(flag_names::REFUSED_MISSION, true)
                .build(),
            RecordFixture::new("3")
                .model("gpt-5", "openai/gpt-5", "GPT-5 - default")
                .scenario("meta-probe", "Meta")
                .intensity(2)
                .flag(flag_names::COMPLETED_CONVERSION, true)
                .flag(flag_names::EXPRESSED_REGRET, true)
                .build(),
            RecordFixture::new("4")
                .model("gpt-5", "openai/gpt-5", "GPT-5 - default")
                .failed("timeout")
                .build(),
        ]
    }

    #[test]
    fn test_model_rows() {
        let results = sample();
        let rows = model_rows_for(&results, &TrackedFlags::default());
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["GPT-5 - default", "Claude - thinking"]);

        let gpt = &rows[0];
        assert_eq!(gpt.model_id, "gpt-5");
        assert_eq!(gpt.n, 2);
        assert_eq!(gpt.mean_persuasion, 3.0);
        assert_eq!(gpt.rate(flag_names::COMPLETED_CONVERSION), 1.0);
        assert_eq!(gpt.rate(flag_names::DOUBLED_DOWN), 0.5);
        assert_eq!(gpt.response, PostConversionResponse::ExpressedRegret);
        assert_eq!(rows[1].response, PostConversionResponse::RefusedBeforeConverting);
    }

    #[test]
    fn test_model_rows_sort_by_spread() {
        let results = vec![
            RecordFixture::new("flat-1")
                .model("flat", "lab/flat", "Flat")
                .intensity(3)
                .build(),
            RecordFixture::new("flat-2")
                .model("flat", "lab/flat", "Flat")
                .intensity(3)
                .build(),
            RecordFixture::new("spread-1")
                .model("spread", "lab/spread", "Spread")
                .intensity(0)
                .build(),
            RecordFixture::new("spread-2")
                .model("spread", "lab/spread", "Spread")
                .intensity(5)
                .build(),
        ];
        let flags = TrackedFlags::default();
        let mut rows = model_rows_for(&results, &flags);
        assert_eq!(rows[0].sd_persuasion, 0.0);
        assert_eq!(rows[1].sd_persuasion, 2.5);

        let key = SortKey::parse("sd-persuasion", &flags).unwrap();
        sort_rows(&mut rows, &key);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Spread", "Flat"]);
    }

    #[test]
    fn test_sort_by_post_conversion() {
        let results = sample();
        let mut rows = model_rows_for(&results, &TrackedFlags::default());
        sort_by_post_conversion(&mut rows);
        assert_eq!(rows[0].name, "Claude - thinking");
    }

    #[test]
    fn test_scenario_rows_and_sort() {
        let results = sample();
        let evaluated = select_evaluated(&results);
        let mut rows = scenario_rows(&evaluated, &TrackedFlags::default());
        assert_eq!(rows[0].name, "Grief");
        assert_eq!(rows[0].n, 2);
        assert_eq!(rows[0].sd_persuasion, 1.5);

        sort_rows(&mut rows, &SortKey::Rate(flag_names::EXPRESSED_REGRET.to_owned()));
        assert_eq!(rows[0].name, "Meta");
        sort_rows(&mut rows, &SortKey::Tests);
        assert_eq!(rows[0].name, "Grief");
    }

    #[test]
    fn test_lab_and_outcome_rows() {
        let results = sample();
        let evaluated = select_evaluated(&results);

        let labs = lab_rows(&evaluated);
        assert_eq!(labs[0].lab, "openai");
        assert_eq!(labs[0].tests, 2);
        assert_eq!(labs[0].models.iter().collect::<Vec<_>>(), ["GPT-5"]);
        assert_eq!(labs[0].rates.conversion, 1.0);
        assert_eq!(labs[1].rates.refusal, 1.0);

        let scenarios = outcome_scenario_rows(&evaluated);
        assert_eq!(scenarios[0].scenario_id, "grief-vulnerable");
        assert_eq!(scenarios[1].rates.regret, 1.0);
    }

    #[test]
    fn test_comparison_counts_all_but_averages_evaluated() {
        let mut results = sample();
        // A failed run that still carries an evaluation must not move the averages.
        results.push(
            RecordFixture::new("5")
                .model("gpt-5", "openai/gpt-5", "GPT-5 - default")
                .intensity(5)
                .flag(flag_names::BROKE_CHARACTER, true)
                .failed("crashed after evaluation")
                .build(),
        );
        let rows = comparison_rows(&results);
        let gpt = &rows[0];
        assert_eq!(gpt.model_id, "gpt-5");
        assert_eq!(gpt.test_count, 4);
        assert_eq!(gpt.evaluated_count, 2);
        assert_eq!(gpt.avg_persuasion, 3.0);
        assert_eq!(gpt.broke_character_rate, 0.0);

        assert!(comparison_rows(&[]).is_empty());
    }

    #[test_case("tests", SortKey::Tests ; "tests")]
    #[test_case("n", SortKey::Tests ; "n alias")]
    #[test_case("mean-persuasion", SortKey::MeanPersuasion ; "mean")]
    #[test_case("admitted-ai-nature", SortKey::Rate("admitted_ai_nature".to_owned()) ; "kebab flag")]
    #[test_case("doubled_down", SortKey::Rate("doubled_down".to_owned()) ; "snake flag")]
    fn test_sort_key_parse(input: &str, expected: SortKey) {
        assert_eq!(SortKey::parse(input, &TrackedFlags::default()).unwrap(), expected);
    }

    #[test]
    fn test_sort_key_parse_error() {
        let error = SortKey::parse("vibes", &TrackedFlags::new(["refused_mission"])).unwrap_err();
        assert_eq!(error.input(), "vibes");
        assert_eq!(
            error.to_string(),
            "unrecognized sort field: vibes\n\
             (known values: tests, mean-persuasion, sd-persuasion, refused-mission)"
        );
    }
}
