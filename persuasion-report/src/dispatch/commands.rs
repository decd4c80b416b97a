// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations.

use super::cli::MessageFormatOpts;
use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputWriter},
};
use persuasion_engine::{
    config::ReportConfig,
    display::{
        DisplayFailedEntries, DisplayResultsListing, OutputFormat, display_archetypes,
        display_comparison, display_failed, display_labs, display_model_rows, display_result,
        display_scenario_rows,
    },
    report::{
        AnalysisReport, ListGrouping, ResultsListing, StudyOverview, StudySettings, TurnReport,
        failed_entries,
    },
    select::select_evaluated,
    tables::{SortKey, comparison_rows, model_rows, scenario_rows, sort_rows},
};
use persuasion_metadata::TestResult;
use serde::Serialize;
use std::{fmt, io::Write};
use tracing::debug;

/// Which summary table to print.
#[derive(Copy, Clone, Debug)]
pub(super) enum TableKind {
    Models,
    Scenarios,
}

/// State shared by every command: resolved configuration and output settings.
pub(super) struct ReportBase {
    config: ReportConfig,
    settings: StudySettings,
    output: OutputContext,
}

impl ReportBase {
    pub(super) fn new(config: ReportConfig, output: OutputContext) -> Self {
        let settings = config.study_settings();
        Self {
            config,
            settings,
            output,
        }
    }

    fn load_results(&self) -> Result<Vec<TestResult>> {
        let store = self.config.result_store();
        let results = store.load_all()?;
        debug!(
            "loaded {} results from `{}` (partitions: {})",
            results.len(),
            store.root(),
            store.partitions().join(", "),
        );
        Ok(results)
    }

    pub(super) fn exec_list(
        &self,
        message_format: MessageFormatOpts,
        grouping: ListGrouping,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let listing = ResultsListing::new(&results, grouping, &self.settings);
        let styles = self.output.stdout_styles();

        // Failed runs are already in the listing; verbose mode repeats them with their errors.
        let entries = failed_entries(&results);
        let human = ListingWithFailures {
            listing: listing.display(&styles),
            failed: (self.output.verbose && !entries.is_empty())
                .then(|| display_failed(&entries, &styles)),
        };
        write_report(message_format, &results, human, output_writer)
    }

    pub(super) fn exec_show(
        &self,
        id: &str,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let store = self.config.result_store();
        let Some(result) = store.load_by_id(id)? else {
            return Err(ExpectedError::ResultNotFound {
                id: id.to_owned(),
                root: store.root().to_owned(),
            });
        };
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &result,
            display_result(&result, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_failed(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let entries = failed_entries(&results);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &entries,
            display_failed(&entries, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_overview(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let overview = StudyOverview::new(&results, &self.settings);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &overview,
            overview.display(&styles),
            output_writer,
        )
    }

    pub(super) fn exec_table(
        &self,
        kind: TableKind,
        message_format: MessageFormatOpts,
        sort_by: Option<&str>,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let flags = &self.settings.tracked_flags;
        // Parse the sort key before loading, so a typo fails fast.
        let sort_key = sort_by
            .map(|input| SortKey::parse(input, flags))
            .transpose()?;

        let results = self.load_results()?;
        let evaluated = select_evaluated(&results);
        let styles = self.output.stdout_styles();

        match kind {
            TableKind::Models => {
                let mut rows = model_rows(&evaluated, flags);
                if let Some(key) = &sort_key {
                    sort_rows(&mut rows, key);
                }
                write_report(
                    message_format,
                    &rows,
                    display_model_rows(&rows, flags, &styles),
                    output_writer,
                )
            }
            TableKind::Scenarios => {
                let mut rows = scenario_rows(&evaluated, flags);
                if let Some(key) = &sort_key {
                    sort_rows(&mut rows, key);
                }
                write_report(
                    message_format,
                    &rows,
                    display_scenario_rows(&rows, flags, &styles),
                    output_writer,
                )
            }
        }
    }

    pub(super) fn exec_labs(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let overview = StudyOverview::new(&results, &self.settings);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &overview.labs,
            display_labs(&overview.labs, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_archetypes(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let overview = StudyOverview::new(&results, &self.settings);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &overview.archetypes,
            display_archetypes(&overview.archetypes, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_analysis(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let report = AnalysisReport::new(&results, &self.settings);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &report,
            report.display(&self.settings.tracked_flags, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_comparison(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let rows = comparison_rows(&results);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &rows,
            display_comparison(&rows, &styles),
            output_writer,
        )
    }

    pub(super) fn exec_turns(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let results = self.load_results()?;
        let report = TurnReport::new(&results, &self.settings);
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &report,
            report.display(&styles),
            output_writer,
        )
    }

    pub(super) fn exec_show_config(
        &self,
        message_format: MessageFormatOpts,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let styles = self.output.stdout_styles();
        write_report(
            message_format,
            &self.config,
            self.config.display(&styles),
            output_writer,
        )
    }
}

/// Writes `human` or the serialized `value` to stdout, depending on the format.
fn write_report(
    message_format: MessageFormatOpts,
    value: &impl Serialize,
    human: impl fmt::Display,
    output_writer: &mut OutputWriter,
) -> Result<()> {
    let mut writer = output_writer.stdout_writer();
    match message_format.to_output_format() {
        OutputFormat::Human => {
            write!(writer, "{human}").map_err(ExpectedError::write_output)?;
        }
        OutputFormat::Serializable(format) => {
            format
                .to_writer(value, &mut writer)
                .map_err(ExpectedError::serialize_output)?;
            writeln!(writer).map_err(ExpectedError::write_output)?;
        }
    }
    writer.flush().map_err(ExpectedError::write_output)
}

/// The results listing, followed by failed runs in verbose mode.
struct ListingWithFailures<'a> {
    listing: DisplayResultsListing<'a, 'a>,
    failed: Option<DisplayFailedEntries<'a>>,
}

impl fmt::Display for ListingWithFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.listing)?;
        if let Some(failed) = &self.failed {
            writeln!(f)?;
            write!(f, "{failed}")?;
        }
        Ok(())
    }
}
