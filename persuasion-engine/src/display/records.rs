// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display of individual results: the listing, a single result, and failed runs.

use super::{Decimal, Percent, Styles, plural, write_no_data};
use crate::report::{FailedEntry, ListGrouping, ResultsListing};
use owo_colors::OwoColorize;
use persuasion_metadata::{FinalEvaluation, ObservationValue, Observations, TestResult};
use std::fmt;

impl<'a> ResultsListing<'a> {
    /// Returns a display wrapper for the listing.
    pub fn display<'s>(&'s self, styles: &'s Styles) -> DisplayResultsListing<'s, 'a> {
        DisplayResultsListing {
            listing: self,
            styles,
        }
    }
}

/// A display wrapper for [`ResultsListing`].
#[derive(Clone, Debug)]
pub struct DisplayResultsListing<'s, 'a> {
    listing: &'s ResultsListing<'a>,
    styles: &'s Styles,
}

impl fmt::Display for DisplayResultsListing<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let listing = self.listing;
        if listing.is_empty() {
            return write_no_data(f, styles, "no results found");
        }

        let stats = &listing.stats;
        writeln!(
            f,
            "{} {} from {} {}, average persuasion {}",
            stats.total.style(styles.count),
            plural::results_str(stats.total),
            stats.unique_models.style(styles.count),
            plural::models_str(stats.unique_models),
            Decimal(stats.avg_persuasion).style(styles.count),
        )?;
        writeln!(
            f,
            "  {} refused, {} {} ({}), {} honest {}",
            stats.refused.style(styles.good),
            stats.conversions.style(styles.bad),
            if stats.conversions == 1 {
                "conversion"
            } else {
                "conversions"
            },
            Percent(stats.conversion_rate()),
            stats.honest_persuaders.style(styles.count),
            if stats.honest_persuaders == 1 {
                "persuader"
            } else {
                "persuaders"
            },
        )?;

        for (key, members) in &listing.groups {
            writeln!(f)?;
            writeln!(
                f,
                "{} ({} {}):",
                key.style(styles.heading),
                members.len(),
                plural::results_str(members.len()),
            )?;

            let labels: Vec<String> = members
                .iter()
                .map(|result| match listing.grouping {
                    ListGrouping::Chronological => format!(
                        "{} / {}",
                        result.model_config.description, result.scenario.name
                    ),
                    ListGrouping::Model => result.scenario.name.clone(),
                    ListGrouping::Scenario => result.model_config.description.clone(),
                })
                .collect();
            let id_width = members.iter().map(|r| r.id.chars().count()).max().unwrap_or(0);
            let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

            for (result, label) in members.iter().zip(&labels) {
                writeln!(
                    f,
                    "  {:<id_width$}  {:<label_width$}  {}",
                    result.id.style(styles.id),
                    label,
                    DisplayStatus {
                        result,
                        styles
                    },
                )?;
            }
        }
        Ok(())
    }
}

/// A one-line summary of how a run went.
struct DisplayStatus<'a> {
    result: &'a TestResult,
    styles: &'a Styles,
}

impl fmt::Display for DisplayStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let result = self.result;
        if !result.metadata.completed {
            return match &result.metadata.error {
                Some(error) => write!(f, "{}: {error}", "failed".style(styles.warning)),
                None => write!(f, "{}", "failed".style(styles.warning)),
            };
        }
        match &result.final_evaluation {
            None => write!(f, "{}", "not evaluated".style(styles.dimmed)),
            Some(evaluation) => {
                let end_reason = if evaluation.end_reason == FinalEvaluation::CONVERSION_COMPLETED
                {
                    styles.bad
                } else {
                    styles.dimmed
                };
                write!(
                    f,
                    "intensity {}, {}",
                    evaluation.persuasion_intensity(),
                    evaluation.end_reason.style(end_reason),
                )
            }
        }
    }
}

/// Returns a display wrapper for a single result, including its full conversation.
pub fn display_result<'a>(result: &'a TestResult, styles: &'a Styles) -> DisplayTestResult<'a> {
    DisplayTestResult { result, styles }
}

/// A display wrapper for a single [`TestResult`].
#[derive(Clone, Debug)]
pub struct DisplayTestResult<'a> {
    result: &'a TestResult,
    styles: &'a Styles,
}

impl fmt::Display for DisplayTestResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        let result = self.result;

        writeln!(f, "{}", result.id.style(styles.id))?;
        let field = |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
            writeln!(f, "  {:<10} {value}", format!("{label}:").style(styles.label))
        };
        field(
            f,
            "model",
            &format_args!(
                "{} ({})",
                result.model_config.description.style(styles.model),
                result.model_id
            ),
        )?;
        field(f, "lab", &result.lab())?;
        field(
            f,
            "scenario",
            &format_args!(
                "{} ({})",
                result.scenario.name.style(styles.scenario),
                result.scenario_id
            ),
        )?;
        if let Some(religion) = &result.religion {
            field(f, "religion", religion)?;
        }
        field(f, "recorded", &result.timestamp)?;
        field(
            f,
            "duration",
            &format_args!("{:.1}s", result.metadata.duration_ms / 1000.0),
        )?;
        field(f, "status", &DisplayStatus { result, styles })?;

        if let Some(evaluation) = &result.final_evaluation {
            writeln!(f)?;
            writeln!(f, "{}", "final evaluation".style(styles.section))?;
            writeln!(f, "  end reason:  {}", evaluation.end_reason)?;
            writeln!(f, "  total turns: {}", evaluation.total_turns)?;
            if !evaluation.behaviors_observed.is_empty() {
                writeln!(f, "  behaviors:")?;
                write_observations(f, &evaluation.behaviors_observed, 4)?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "{} ({} turns)",
            "conversation".style(styles.section),
            result.conversation.len()
        )?;
        for (index, turn) in result.conversation.iter().enumerate() {
            writeln!(
                f,
                "  [{}] {}",
                (index + 1).style(styles.count),
                turn.role.style(styles.heading)
            )?;
            if let Some(thinking) = &turn.thinking {
                writeln!(f, "      {}", "thinking:".style(styles.dimmed))?;
                write_indented(f, thinking, 8)?;
            }
            write_indented(f, &turn.content, 6)?;
            if let Some(observations) = &turn.agent_observations
                && !observations.is_empty()
            {
                writeln!(f, "      {}", "observations:".style(styles.label))?;
                write_observations(f, observations, 8)?;
            }
        }
        Ok(())
    }
}

fn write_indented(f: &mut fmt::Formatter<'_>, text: &str, indent: usize) -> fmt::Result {
    for line in text.lines() {
        if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{:indent$}{line}", "")?;
        }
    }
    Ok(())
}

fn write_observations(
    f: &mut fmt::Formatter<'_>,
    observations: &Observations,
    indent: usize,
) -> fmt::Result {
    for (name, value) in observations.iter() {
        write!(f, "{:indent$}{name}: ", "")?;
        match value {
            ObservationValue::Flag(flag) => writeln!(f, "{flag}")?,
            ObservationValue::Number(number) => writeln!(f, "{number}")?,
            ObservationValue::Other(other) => writeln!(f, "{other}")?,
        }
    }
    Ok(())
}

/// Returns a display wrapper for a list of failed runs.
pub fn display_failed<'a>(
    entries: &'a [FailedEntry<'a>],
    styles: &'a Styles,
) -> DisplayFailedEntries<'a> {
    DisplayFailedEntries { entries, styles }
}

/// A display wrapper for a list of [`FailedEntry`] values.
#[derive(Clone, Debug)]
pub struct DisplayFailedEntries<'a> {
    entries: &'a [FailedEntry<'a>],
    styles: &'a Styles,
}

impl fmt::Display for DisplayFailedEntries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styles = self.styles;
        if self.entries.is_empty() {
            return writeln!(f, "no failed runs");
        }

        writeln!(
            f,
            "{} failed {}:",
            self.entries.len().style(styles.count),
            if self.entries.len() == 1 { "run" } else { "runs" },
        )?;
        for entry in self.entries {
            writeln!(
                f,
                "  {} {} / {} ({})",
                entry.id.style(styles.id),
                entry.model.style(styles.model),
                entry.scenario.style(styles.scenario),
                entry.timestamp,
            )?;
            if let Some(error) = entry.error {
                writeln!(f, "      {} {error}", "error:".style(styles.warning))?;
            }
        }
        Ok(())
    }
}
