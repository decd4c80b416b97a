// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display of aggregate reports.

use super::{Decimal, Percent, Styles, Table, plural, write_no_data};
use crate::{
    archetype::{ArchetypeDetail, ArchetypePoint},
    config::ReportConfig,
    flags::TrackedFlags,
    report::{ADMITTED_LABEL, AnalysisReport, NOT_ADMITTED_LABEL, StudyOverview, TurnReport},
    stats::{Distribution, IntensityLevel},
    tables::{ComparisonRow, LabRow, ModelRow, OutcomeScenarioRow, ScenarioRow},
    temporal::TurnAverage,
};
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::fmt;

/// Displayed in table cells that have no data.
const MISSING: &str = "-";

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_owned(), |v| Decimal(v).to_string())
}

impl StudyOverview {
    /// Returns a display wrapper for the overview.
    pub fn display<'a>(&'a self, styles: &'a Styles) -> DisplayStudyOverview<'a> {
        DisplayStudyOverview {
            overview: self,
            styles,
        }
    }
}

/// A display wrapper for [`StudyOverview`].
#[derive(Clone, Debug)]
pub struct DisplayStudyOverview<'a> {
    overview: &'a StudyOverview,
    styles: &'a Styles,
}

impl fmt::Display for DisplayStudyOverview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let overview = self.overview;
        if overview.is_empty() {
            write_no_data(f, styles, "no evaluated two-phase results")?;
        } else {
            let totals = &overview.totals;
            writeln!(
                f,
                "{}: {} {} across {} {} from {} {}",
                "two-phase study".style(styles.section),
                totals.tests.style(styles.count),
                plural::tests_str(totals.tests),
                totals.unique_models.style(styles.count),
                plural::models_str(totals.unique_models),
                totals.unique_labs.style(styles.count),
                plural::labs_str(totals.unique_labs),
            )?;
            writeln!(
                f,
                "  conversion {}, acknowledgment {}, refusal {}, regret {}",
                Percent(totals.rates.conversion).style(styles.bad),
                Percent(totals.rates.acknowledgment),
                Percent(totals.rates.refusal).style(styles.good),
                Percent(totals.rates.regret),
            )?;

            writeln!(f)?;
            writeln!(f, "{}", "models".style(styles.section))?;
            write!(f, "{}", points_table(&overview.points, styles))?;

            writeln!(f)?;
            writeln!(f, "{}", "labs".style(styles.section))?;
            write!(f, "{}", lab_table(&overview.labs, styles))?;
        }

        if !overview.other_scenarios.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", "other scenarios".style(styles.section))?;
            write!(f, "{}", other_scenario_table(&overview.other_scenarios, styles))?;
        }
        Ok(())
    }
}

fn points_table<'a>(points: &[ArchetypePoint], styles: &'a Styles) -> Table<'a> {
    let mut table = Table::new(
        styles,
        ["model", "n", "conversion", "acknowledgment", "refusal", "archetype"],
    )
    .left_align(5)
    .with_indent(2);
    for point in points {
        table.push_row(vec![
            point.display_name.clone(),
            point.sample_size.to_string(),
            Percent(point.rates.conversion).to_string(),
            Percent(point.rates.acknowledgment).to_string(),
            Percent(point.rates.refusal).to_string(),
            point.archetype.to_string(),
        ]);
    }
    table
}

fn lab_table<'a>(labs: &[LabRow], styles: &'a Styles) -> Table<'a> {
    let mut table = Table::new(
        styles,
        ["lab", "tests", "conversion", "acknowledgment", "refusal", "models"],
    )
    .left_align(5)
    .with_indent(2);
    for lab in labs {
        table.push_row(vec![
            lab.lab.clone(),
            lab.tests.to_string(),
            Percent(lab.rates.conversion).to_string(),
            Percent(lab.rates.acknowledgment).to_string(),
            Percent(lab.rates.refusal).to_string(),
            lab.models.iter().join(", "),
        ]);
    }
    table
}

fn other_scenario_table<'a>(rows: &[OutcomeScenarioRow], styles: &'a Styles) -> Table<'a> {
    let mut table = Table::new(
        styles,
        ["scenario", "id", "tests", "conversion", "acknowledgment", "refusal"],
    )
    .left_align(1)
    .with_indent(2);
    for row in rows {
        table.push_row(vec![
            row.name.clone(),
            row.scenario_id.clone(),
            row.tests.to_string(),
            Percent(row.rates.conversion).to_string(),
            Percent(row.rates.acknowledgment).to_string(),
            Percent(row.rates.refusal).to_string(),
        ]);
    }
    table
}

/// Returns a display wrapper for archetype details.
pub fn display_archetypes<'a>(
    details: &'a [ArchetypeDetail],
    styles: &'a Styles,
) -> DisplayArchetypes<'a> {
    DisplayArchetypes { details, styles }
}

/// A display wrapper for a list of [`ArchetypeDetail`] values.
#[derive(Clone, Debug)]
pub struct DisplayArchetypes<'a> {
    details: &'a [ArchetypeDetail],
    styles: &'a Styles,
}

impl fmt::Display for DisplayArchetypes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        for (index, detail) in self.details.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(
                f,
                "{} ({} {})",
                detail.archetype.style(styles.heading),
                detail.members.len().style(styles.count),
                plural::models_str(detail.members.len()),
            )?;
            writeln!(f, "  {}", detail.archetype.description())?;
            if detail.members.is_empty() {
                continue;
            }
            writeln!(
                f,
                "  average conversion {}, acknowledgment {}, refusal {}",
                Percent(detail.average_conversion),
                Percent(detail.average_acknowledgment),
                Percent(detail.average_refusal),
            )?;
            for member in &detail.members {
                writeln!(
                    f,
                    "    - {} (n = {})",
                    member.display_name.style(styles.model),
                    member.sample_size,
                )?;
            }
        }
        Ok(())
    }
}

/// Returns a display wrapper for lab rows.
pub fn display_labs<'a>(labs: &'a [LabRow], styles: &'a Styles) -> DisplayLabs<'a> {
    DisplayLabs { labs, styles }
}

/// A display wrapper for a list of [`LabRow`] values.
#[derive(Clone, Debug)]
pub struct DisplayLabs<'a> {
    labs: &'a [LabRow],
    styles: &'a Styles,
}

impl fmt::Display for DisplayLabs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labs.is_empty() {
            return write_no_data(f, self.styles, "no evaluated two-phase results");
        }
        write!(f, "{}", lab_table(self.labs, self.styles).with_indent(0))
    }
}

/// Returns a display wrapper for per-model rows, with one rate column per tracked flag.
pub fn display_model_rows<'a>(
    rows: &'a [ModelRow],
    flags: &'a TrackedFlags,
    styles: &'a Styles,
) -> DisplayModelRows<'a> {
    DisplayModelRows {
        rows,
        flags,
        styles,
    }
}

/// A display wrapper for a list of [`ModelRow`] values.
#[derive(Clone, Debug)]
pub struct DisplayModelRows<'a> {
    rows: &'a [ModelRow],
    flags: &'a TrackedFlags,
    styles: &'a Styles,
}

impl fmt::Display for DisplayModelRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write_no_data(f, self.styles, "no evaluated results");
        }
        write!(f, "{}", model_table(self.rows, self.flags, self.styles, 0))
    }
}

fn model_table<'a>(
    rows: &[ModelRow],
    flags: &TrackedFlags,
    styles: &'a Styles,
    indent: usize,
) -> Table<'a> {
    let headers = ["model", "n", "persuasion"]
        .into_iter()
        .chain(flags.iter())
        .chain(["after conversion"]);
    let mut table = Table::new(styles, headers)
        .left_align(flags.len() + 3)
        .with_indent(indent);
    for row in rows {
        let mut cells = vec![
            row.name.clone(),
            row.n.to_string(),
            Decimal(row.mean_persuasion).to_string(),
        ];
        cells.extend(flags.iter().map(|flag| Percent(row.rate(flag)).to_string()));
        cells.push(row.response.to_string());
        table.push_row(cells);
    }
    table
}

/// Returns a display wrapper for per-scenario rows, with one rate column per tracked flag.
pub fn display_scenario_rows<'a>(
    rows: &'a [ScenarioRow],
    flags: &'a TrackedFlags,
    styles: &'a Styles,
) -> DisplayScenarioRows<'a> {
    DisplayScenarioRows {
        rows,
        flags,
        styles,
    }
}

/// A display wrapper for a list of [`ScenarioRow`] values.
#[derive(Clone, Debug)]
pub struct DisplayScenarioRows<'a> {
    rows: &'a [ScenarioRow],
    flags: &'a TrackedFlags,
    styles: &'a Styles,
}

impl fmt::Display for DisplayScenarioRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write_no_data(f, self.styles, "no evaluated results");
        }
        write!(f, "{}", scenario_table(self.rows, self.flags, self.styles, 0))
    }
}

fn scenario_table<'a>(
    rows: &[ScenarioRow],
    flags: &TrackedFlags,
    styles: &'a Styles,
    indent: usize,
) -> Table<'a> {
    let headers = ["scenario", "n", "persuasion", "sd"]
        .into_iter()
        .chain(flags.iter());
    let mut table = Table::new(styles, headers).with_indent(indent);
    for row in rows {
        let mut cells = vec![
            row.name.clone(),
            row.n.to_string(),
            Decimal(row.mean_persuasion).to_string(),
            Decimal(row.sd_persuasion).to_string(),
        ];
        cells.extend(
            flags
                .iter()
                .map(|flag| Percent(row.rates.get(flag).copied().unwrap_or(0.0)).to_string()),
        );
        table.push_row(cells);
    }
    table
}

impl AnalysisReport {
    /// Returns a display wrapper for the analysis.
    pub fn display<'a>(
        &'a self,
        flags: &'a TrackedFlags,
        styles: &'a Styles,
    ) -> DisplayAnalysisReport<'a> {
        DisplayAnalysisReport {
            report: self,
            flags,
            styles,
        }
    }
}

/// A display wrapper for [`AnalysisReport`].
#[derive(Clone, Debug)]
pub struct DisplayAnalysisReport<'a> {
    report: &'a AnalysisReport,
    flags: &'a TrackedFlags,
    styles: &'a Styles,
}

impl fmt::Display for DisplayAnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let report = self.report;
        let sample = &report.sample;
        writeln!(
            f,
            "{}: {} evaluated, {} failed, {} not evaluated",
            "sample".style(styles.section),
            sample.evaluated.style(styles.count),
            sample.failed.style(styles.warning),
            sample.unclassified,
        )?;
        if report.is_empty() {
            return write_no_data(f, styles, "no evaluated results");
        }
        writeln!(
            f,
            "  {} {}, {} {}",
            sample.unique_models,
            plural::models_str(sample.unique_models),
            sample.unique_scenarios,
            plural::scenarios_str(sample.unique_scenarios),
        )?;

        writeln!(f)?;
        writeln!(f, "{}", "behaviors".style(styles.section))?;
        let mut table = Table::new(styles, ["flag", "count", "rate"]).with_indent(2);
        for (flag, tally) in &report.flags {
            table.push_row(vec![
                flag.clone(),
                tally.count.to_string(),
                Percent(tally.rate).to_string(),
            ]);
        }
        write!(f, "{table}")?;

        let post = &report.post_conversion;
        writeln!(f)?;
        writeln!(
            f,
            "{} ({} completed)",
            "after conversion".style(styles.section),
            post.conversions.style(styles.count),
        )?;
        let mut table = Table::new(styles, ["response", "count", "share"]).with_indent(2);
        for (label, tally) in [
            ("expressed regret", post.expressed_regret),
            ("acknowledged manipulation", post.acknowledged_manipulation),
            ("doubled down", post.doubled_down),
        ] {
            table.push_row(vec![
                label.to_owned(),
                tally.count.to_string(),
                Percent(tally.rate).to_string(),
            ]);
        }
        write!(f, "{table}")?;

        let intensity = &report.intensity;
        writeln!(f)?;
        writeln!(
            f,
            "{}: mean {}, sd {}, median {}",
            "persuasion intensity".style(styles.section),
            Decimal(intensity.mean),
            Decimal(intensity.sd),
            Decimal(intensity.median),
        )?;
        write!(f, "{}", histogram_table(&intensity.histogram, styles))?;

        writeln!(f)?;
        writeln!(f, "{}", "models".style(styles.section))?;
        write!(f, "{}", model_table(&report.models, self.flags, styles, 2))?;

        writeln!(f)?;
        writeln!(f, "{}", "scenarios".style(styles.section))?;
        write!(f, "{}", scenario_table(&report.scenarios, self.flags, styles, 2))?;

        writeln!(f)?;
        writeln!(
            f,
            "{}: {}",
            "persuasion vs. admission correlation".style(styles.section),
            Decimal(report.persuasion_admission_correlation),
        )?;

        writeln!(f)?;
        let co = &report.co_occurrence;
        writeln!(f, "{}", "after admitting to being an AI".style(styles.section))?;
        writeln!(f, "  continued: {}", co.admitted_and_continued)?;
        writeln!(f, "  critiqued the prompt: {}", co.admitted_and_critiqued)?;
        writeln!(f, "  refused the mission: {}", co.admitted_and_refused)?;

        writeln!(f)?;
        write_turns(f, report.admission_turns.as_ref(), &report.turn_by_turn, styles)
    }
}

fn histogram_table<'a>(histogram: &[IntensityLevel], styles: &'a Styles) -> Table<'a> {
    let mut table = Table::new(styles, ["level", "count", "rate"]).with_indent(2);
    for level in histogram {
        table.push_row(vec![
            level.level.to_string(),
            level.count.to_string(),
            Percent(level.rate).to_string(),
        ]);
    }
    table
}

fn write_turns(
    f: &mut fmt::Formatter<'_>,
    admission_turns: Option<&Distribution>,
    turn_by_turn: &[TurnAverage],
    styles: &Styles,
) -> fmt::Result {
    match admission_turns {
        Some(turns) => writeln!(
            f,
            "{}: {} {}, mean {}, median {}, range {}-{}",
            "admission turn".style(styles.section),
            turns.count.style(styles.count),
            plural::results_str(turns.count),
            Decimal(turns.mean),
            turns.median,
            turns.min,
            turns.max,
        )?,
        None => writeln!(
            f,
            "{}: {}",
            "admission turn".style(styles.section),
            "no admissions".style(styles.dimmed),
        )?,
    }

    writeln!(f)?;
    writeln!(f, "{}", "persuasion by turn".style(styles.section))?;
    if turn_by_turn.is_empty() {
        return writeln!(f, "  {}", "no per-turn observations".style(styles.dimmed));
    }
    let mut table =
        Table::new(styles, ["turn", ADMITTED_LABEL, NOT_ADMITTED_LABEL]).with_indent(2);
    for row in turn_by_turn {
        table.push_row(vec![
            row.turn.to_string(),
            optional(row.averages.get(ADMITTED_LABEL).copied().flatten()),
            optional(row.averages.get(NOT_ADMITTED_LABEL).copied().flatten()),
        ]);
    }
    write!(f, "{table}")
}

impl TurnReport {
    /// Returns a display wrapper for the turn report.
    pub fn display<'a>(&'a self, styles: &'a Styles) -> DisplayTurnReport<'a> {
        DisplayTurnReport {
            report: self,
            styles,
        }
    }
}

/// A display wrapper for [`TurnReport`].
#[derive(Clone, Debug)]
pub struct DisplayTurnReport<'a> {
    report: &'a TurnReport,
    styles: &'a Styles,
}

impl fmt::Display for DisplayTurnReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.report.is_empty() {
            return write_no_data(f, self.styles, "no per-turn observations");
        }
        write_turns(
            f,
            self.report.admission_turns.as_ref(),
            &self.report.turn_by_turn,
            self.styles,
        )
    }
}

/// Returns a display wrapper for comparison rows.
pub fn display_comparison<'a>(
    rows: &'a [ComparisonRow],
    styles: &'a Styles,
) -> DisplayComparison<'a> {
    DisplayComparison { rows, styles }
}

/// A display wrapper for a list of [`ComparisonRow`] values.
#[derive(Clone, Debug)]
pub struct DisplayComparison<'a> {
    rows: &'a [ComparisonRow],
    styles: &'a Styles,
}

impl fmt::Display for DisplayComparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write_no_data(f, self.styles, "no results found");
        }
        let mut table = Table::new(
            self.styles,
            [
                "model",
                "description",
                "tests",
                "evaluated",
                "persuasion",
                "broke character",
                "attempted",
                "emotional",
                "turns",
            ],
        )
        .left_align(1);
        for row in self.rows {
            table.push_row(vec![
                row.model_id.clone(),
                row.description.clone(),
                row.test_count.to_string(),
                row.evaluated_count.to_string(),
                Decimal(row.avg_persuasion).to_string(),
                Percent(row.broke_character_rate).to_string(),
                Percent(row.conversion_attempted_rate).to_string(),
                Percent(row.emotional_manipulation_rate).to_string(),
                Decimal(row.avg_turns).to_string(),
            ]);
        }
        write!(f, "{table}")
    }
}

impl ReportConfig {
    /// Returns a display wrapper for the resolved configuration.
    pub fn display<'a>(&'a self, styles: &'a Styles) -> DisplayReportConfig<'a> {
        DisplayReportConfig {
            config: self,
            styles,
        }
    }
}

/// A display wrapper for [`ReportConfig`].
#[derive(Clone, Debug)]
pub struct DisplayReportConfig<'a> {
    config: &'a ReportConfig,
    styles: &'a Styles,
}

impl fmt::Display for DisplayReportConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let config = self.config;
        match &config.source {
            Some(path) => writeln!(f, "{} {path}", "config file:".style(styles.label))?,
            None => writeln!(
                f,
                "{} {}",
                "config file:".style(styles.label),
                "(built-in defaults)".style(styles.dimmed),
            )?,
        }

        writeln!(f)?;
        writeln!(f, "{}", "[store]".style(styles.heading))?;
        writeln!(f, "  dir: {}", config.store.dir)?;
        writeln!(f, "  partitions: {}", config.store.partitions.join(", "))?;

        let analysis = &config.analysis;
        writeln!(f)?;
        writeln!(f, "{}", "[analysis]".style(styles.heading))?;
        writeln!(
            f,
            "  two-phase-scenarios: {}",
            analysis.two_phase_scenarios.join(", ")
        )?;
        writeln!(f, "  tracked-flags:")?;
        for flag in analysis.tracked_flags.iter() {
            writeln!(f, "    - {flag}")?;
        }
        writeln!(f, "  admission-flag: {}", analysis.admission_flag)?;
        writeln!(f, "  intensity-metric: {}", analysis.intensity_metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        archetype::archetype_details,
        report::StudySettings,
        tables::{comparison_rows, lab_rows},
        select::select_evaluated,
    };
    use fixture_data::RecordFixture;
    use persuasion_metadata::{FinalEvaluation, TestResult, flag_names};

    fn sample() -> Vec<TestResult> {
        vec![
            RecordFixture::new("1")
                .model("gpt-5", "openai/gpt-5", "GPT-5")
                .scenario("grief-vulnerable", "Grief")
                .intensity(4)
                .flag(flag_names::COMPLETED_CONVERSION, true)
                .flag(flag_names::ACKNOWLEDGED_MANIPULATION, true)
                .build(),
            RecordFixture::new("2")
                .model("claude", "anthropic/claude", "Claude - thinking")
                .scenario("existential-seeker", "Seeker")
                .intensity(1)
                .flag(flag_names::REFUSED_MISSION, true)
                .build(),
            RecordFixture::new("3")
                .model("gpt-5", "openai/gpt-5", "GPT-5")
                .scenario("meta-probe", "Meta Probe")
                .intensity(2)
                .end_reason(FinalEvaluation::CONVERSION_COMPLETED)
                .build(),
        ]
    }

    #[test]
    fn overview() {
        let overview = StudyOverview::new(&sample(), &StudySettings::default());
        insta::assert_snapshot!(overview.display(&Styles::default()).to_string(), @r"
        two-phase study: 2 tests across 2 models from 2 labs
          conversion 50.0%, acknowledgment 100.0%, refusal 50.0%, regret 0.0%

        models
          model   n  conversion  acknowledgment  refusal  archetype
          GPT-5   1      100.0%          100.0%     0.0%  Conflicted Apologizer
          Claude  1        0.0%            0.0%   100.0%  Transparent Resister

        labs
          lab        tests  conversion  acknowledgment  refusal  models
          openai         1      100.0%          100.0%     0.0%  GPT-5
          anthropic      1        0.0%            0.0%   100.0%  Claude

        other scenarios
          scenario    id          tests  conversion  acknowledgment  refusal
          Meta Probe  meta-probe      1        0.0%            0.0%     0.0%
        ");
    }

    #[test]
    fn empty_overview() {
        let overview = StudyOverview::new(&[], &StudySettings::default());
        assert_eq!(
            overview.display(&Styles::default()).to_string(),
            "no data: no evaluated two-phase results\n"
        );
    }

    #[test]
    fn archetypes() {
        let results = sample();
        let overview = StudyOverview::new(&results, &StudySettings::default());
        let details = archetype_details(&overview.points);
        let output = display_archetypes(&details, &Styles::default()).to_string();
        assert!(
            output.starts_with(
                "Transparent Resister (1 model)\n  \
                 Low conversion pressure with frequent mid-conversation refusals.\n  \
                 average conversion 0.0%, acknowledgment 0.0%, refusal 100.0%\n    \
                 - Claude (n = 1)\n"
            ),
            "{output}"
        );
        assert!(
            output.contains("Honest Persuader (0 models)\n  Moderate"),
            "{output}"
        );
    }

    #[test]
    fn labs_and_models() {
        let results = sample();
        let evaluated = select_evaluated(&results);
        let labs = lab_rows(&evaluated);
        let output = display_labs(&labs, &Styles::default()).to_string();
        assert!(output.starts_with("lab  "), "{output}");
        assert_eq!(
            display_labs(&[], &Styles::default()).to_string(),
            "no data: no evaluated two-phase results\n"
        );

        let flags = TrackedFlags::new([flag_names::REFUSED_MISSION]);
        let rows = crate::tables::model_rows_for(&results, &flags);
        insta::assert_snapshot!(display_model_rows(&rows, &flags, &Styles::default()).to_string(), @r"
        model              n  persuasion  refused_mission  after conversion
        GPT-5              2        3.00             0.0%  No conversion
        Claude - thinking  1        1.00           100.0%  Refused before converting
        ");
    }

    #[test]
    fn comparison() {
        let mut results = sample();
        results.push(
            RecordFixture::new("4")
                .model("gpt-5", "openai/gpt-5", "GPT-5")
                .failed("timeout")
                .build(),
        );
        let rows = comparison_rows(&results);
        let output = display_comparison(&rows, &Styles::default()).to_string();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3, "{output}");
        assert!(lines[1].starts_with("gpt-5   GPT-5"), "{output}");
        assert!(lines[1].contains("  3          2  "), "{output}");
    }

    #[test]
    fn analysis() {
        let results = sample();
        let settings = StudySettings::default();
        let report = AnalysisReport::new(&results, &settings);
        let output = report
            .display(&settings.tracked_flags, &Styles::default())
            .to_string();
        assert!(
            output.starts_with(
                "sample: 3 evaluated, 0 failed, 0 not evaluated\n  2 models, 3 scenarios\n"
            ),
            "{output}"
        );
        assert!(output.contains("\nafter conversion (1 completed)\n"), "{output}");
        assert!(
            output.contains("\npersuasion intensity: mean 2.33, sd 1.25, median 2.00\n"),
            "{output}"
        );
        assert!(output.contains("\nadmission turn: no admissions\n"), "{output}");
        assert!(output.ends_with("  no per-turn observations\n"), "{output}");

        let empty = AnalysisReport::new(&[], &settings);
        assert_eq!(
            empty
                .display(&settings.tracked_flags, &Styles::default())
                .to_string(),
            "sample: 0 evaluated, 0 failed, 0 not evaluated\nno data: no evaluated results\n"
        );
    }

    #[test]
    fn turns() {
        let results = vec![
            RecordFixture::new("1")
                .total_turns(2)
                .flag(flag_names::ADMITTED_AI_NATURE, true)
                .user_turn([
                    (flag_names::PERSUASION_INTENSITY, 3),
                    (flag_names::ADMITTED_AI_NATURE, 1),
                ])
                .build(),
        ];
        let report = TurnReport::new(&results, &StudySettings::default());
        insta::assert_snapshot!(report.display(&Styles::default()).to_string(), @r"
        admission turn: 1 result, mean 1.00, median 1, range 1-1

        persuasion by turn
          turn  admitted  not-admitted
          1         3.00             -
        ");
        assert_eq!(
            TurnReport::new(&[], &StudySettings::default())
                .display(&Styles::default())
                .to_string(),
            "no data: no per-turn observations\n"
        );
    }

    #[test]
    fn config() {
        let config = ReportConfig::built_in();
        let output = config.display(&Styles::default()).to_string();
        assert!(
            output.starts_with("config file: (built-in defaults)\n\n[store]\n  dir: results\n"),
            "{output}"
        );
        assert!(output.contains("  partitions: raw, adaptive\n"), "{output}");
        assert!(output.contains("    - doubled_down\n"), "{output}");
        assert!(output.ends_with("  intensity-metric: persuasion_intensity\n"), "{output}");
    }
}
