// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use super::{
    cli::{FormatOpts, ListOpts, ShowOpts, SortableOpts},
    commands::{ReportBase, TableKind},
    common::CommonOpts,
};
use crate::{
    Result,
    output::{OutputContext, OutputWriter},
};
use clap::Subcommand;

/// Reports over recorded persuasion-test transcripts.
///
/// Results are read from the partition directories (by default `raw` and `adaptive`) under the
/// results directory. Every subcommand prints a human-readable report, or JSON with
/// `--message-format json`.
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct ReportApp {
    #[clap(flatten)]
    common: CommonOpts,

    #[clap(subcommand)]
    command: Command,
}

impl ReportApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.common.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.common.config_opts.make_config()?;
        let base = ReportBase::new(config, output);

        match self.command {
            Command::List(opts) => base.exec_list(
                opts.format.message_format,
                opts.group_by.into(),
                output_writer,
            )?,
            Command::Show(opts) => {
                base.exec_show(&opts.id, opts.format.message_format, output_writer)?
            }
            Command::Failed(opts) => base.exec_failed(opts.message_format, output_writer)?,
            Command::Overview(opts) => base.exec_overview(opts.message_format, output_writer)?,
            Command::Models(opts) => base.exec_table(
                TableKind::Models,
                opts.format.message_format,
                opts.sort_by.as_deref(),
                output_writer,
            )?,
            Command::Scenarios(opts) => base.exec_table(
                TableKind::Scenarios,
                opts.format.message_format,
                opts.sort_by.as_deref(),
                output_writer,
            )?,
            Command::Labs(opts) => base.exec_labs(opts.message_format, output_writer)?,
            Command::Archetypes(opts) => {
                base.exec_archetypes(opts.message_format, output_writer)?
            }
            Command::Analysis(opts) => base.exec_analysis(opts.message_format, output_writer)?,
            Command::Comparison(opts) => {
                base.exec_comparison(opts.message_format, output_writer)?
            }
            Command::Turns(opts) => base.exec_turns(opts.message_format, output_writer)?,
            Command::ShowConfig(opts) => {
                base.exec_show_config(opts.message_format, output_writer)?
            }
        }
        Ok(0)
    }
}

/// All commands supported by persuasion-report.
#[derive(Debug, Subcommand)]
enum Command {
    /// List every result, grouped for browsing.
    ///
    /// Human-readable output starts with headline statistics, then lists results grouped by model
    /// (the default), by scenario, or in a single newest-first list. JSON output is the flat list
    /// of records, newest first.
    List(ListOpts),
    /// Show a single result, including its conversation.
    Show(ShowOpts),
    /// List runs that did not complete.
    Failed(FormatOpts),
    /// Show the study overview: archetypes, labs and other scenarios.
    ///
    /// The archetype analysis covers evaluated results from two-phase scenarios only.
    Overview(FormatOpts),
    /// Show per-model behavior rates.
    Models(SortableOpts),
    /// Show per-scenario behavior rates.
    Scenarios(SortableOpts),
    /// Show per-lab outcomes for two-phase scenarios.
    Labs(FormatOpts),
    /// Show which models fall in each archetype.
    Archetypes(FormatOpts),
    /// Show the full analysis of evaluated results.
    Analysis(FormatOpts),
    /// Compare models across every loaded result, evaluated or not.
    Comparison(FormatOpts),
    /// Show when models admit to being an AI, and persuasion turn by turn.
    Turns(FormatOpts),
    /// Show the resolved configuration.
    ShowConfig(FormatOpts),
}
