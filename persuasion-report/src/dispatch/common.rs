// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Options shared by every subcommand.

use crate::{Result, output::OutputOpts};
use camino::Utf8PathBuf;
use clap::Args;
use persuasion_engine::config::{ConfigLocation, ReportConfig};
use tracing::debug;

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub(super) struct CommonOpts {
    #[clap(flatten)]
    pub(super) output: OutputOpts,

    #[clap(flatten)]
    pub(super) config_opts: ConfigOpts,
}

/// Where configuration and results come from.
#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
pub(super) struct ConfigOpts {
    /// Directory holding the result partitions [default: from config]
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "PERSUASION_RESULTS_DIR"
    )]
    pub(super) results_dir: Option<Utf8PathBuf>,

    /// Config file, or `none` for built-in defaults only
    ///
    /// Without this option, the config file is looked up in the user configuration directory
    /// ($XDG_CONFIG_HOME/persuasion-report/config.toml), and a missing file is not an error.
    #[arg(long, global = true, value_name = "PATH", env = "PERSUASION_CONFIG")]
    pub(super) config: Option<String>,
}

impl ConfigOpts {
    /// Loads the configuration, with `--results-dir` applied on top.
    pub(super) fn make_config(&self) -> Result<ReportConfig> {
        let location = ConfigLocation::from_cli_or_env(self.config.as_deref());
        let mut config = ReportConfig::load(location)?;
        if let Some(dir) = &self.results_dir {
            debug!("using results directory `{dir}` from the command line");
            config.set_results_dir(dir.clone());
        }
        Ok(config)
    }
}
