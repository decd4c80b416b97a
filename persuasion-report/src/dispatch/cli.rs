// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-command options.

use clap::{Args, ValueEnum};
use persuasion_engine::{
    display::{OutputFormat, SerializableFormat},
    report::ListGrouping,
};

#[derive(Debug, Args)]
pub(super) struct FormatOpts {
    /// Output format
    #[arg(
        short = 'T',
        long,
        value_enum,
        default_value_t,
        help_heading = "Output options",
        value_name = "FMT"
    )]
    pub(super) message_format: MessageFormatOpts,
}

#[derive(Debug, Args)]
pub(super) struct ListOpts {
    #[clap(flatten)]
    pub(super) format: FormatOpts,

    /// How to group results in human-readable output
    #[arg(
        long,
        value_enum,
        default_value_t,
        help_heading = "Output options",
        value_name = "GROUPING"
    )]
    pub(super) group_by: GroupByOpt,
}

#[derive(Debug, Args)]
pub(super) struct ShowOpts {
    /// The result ID: the file name without `.json`
    #[arg(value_name = "ID")]
    pub(super) id: String,

    #[clap(flatten)]
    pub(super) format: FormatOpts,
}

#[derive(Debug, Args)]
pub(super) struct SortableOpts {
    #[clap(flatten)]
    pub(super) format: FormatOpts,

    /// Sort rows by this column, descending
    ///
    /// One of `tests`, `mean-persuasion`, `sd-persuasion`, or a tracked flag such as
    /// `admitted-ai-nature`. Without this option, rows are in first-seen order.
    #[arg(long, help_heading = "Output options", value_name = "FIELD")]
    pub(super) sort_by: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum, Default)]
pub(super) enum MessageFormatOpts {
    /// A human-readable output format.
    #[default]
    Human,
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl MessageFormatOpts {
    pub(super) fn to_output_format(self) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human,
            Self::Json => OutputFormat::Serializable(SerializableFormat::Json),
            Self::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, Default)]
pub(super) enum GroupByOpt {
    /// A single list, newest first.
    Chronological,
    /// By model, then scenario.
    #[default]
    Model,
    /// By scenario, then model.
    Scenario,
}

impl From<GroupByOpt> for ListGrouping {
    fn from(opt: GroupByOpt) -> Self {
        match opt {
            GroupByOpt::Chronological => ListGrouping::Chronological,
            GroupByOpt::Model => ListGrouping::Model,
            GroupByOpt::Scenario => ListGrouping::Scenario,
        }
    }
}
