// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use persuasion_engine::errors::{ConfigError, SortFieldParseError, StoreError};
use persuasion_metadata::ReportExitCode;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are short placeholders. Errors are meant to be printed with
// display_to_stderr, which colorizes them and prints the cause chain.

/// An error that persuasion-report knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config error")]
    ConfigError {
        #[from]
        err: ConfigError,
    },
    #[error("invalid sort field")]
    SortFieldParseError {
        #[from]
        err: SortFieldParseError,
    },
    #[error("results store unavailable")]
    StoreUnavailable {
        #[from]
        err: StoreError,
    },
    #[error("result not found")]
    ResultNotFound { id: String, root: Utf8PathBuf },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn write_output(err: std::io::Error) -> Self {
        Self::WriteOutputError { err }
    }

    pub(crate) fn serialize_output(err: serde_json::Error) -> Self {
        Self::WriteOutputError { err: err.into() }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. } | Self::SortFieldParseError { .. } => {
                ReportExitCode::SETUP_ERROR
            }
            Self::StoreUnavailable { .. } => ReportExitCode::STORE_UNAVAILABLE,
            Self::ResultNotFound { .. } => ReportExitCode::RESULT_NOT_FOUND,
            Self::WriteOutputError { .. } => ReportExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::SortFieldParseError { err } => {
                tracing::error!("{err}");
                None
            }
            Self::StoreUnavailable { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::ResultNotFound { id, root } => {
                tracing::error!(
                    "no result with ID `{}` under `{}`",
                    id.style(styles.bold),
                    root.style(styles.bold),
                );
                tracing::info!(
                    "(hint: run `{}` to see available IDs)",
                    "persuasion-report list".style(styles.bold),
                );
                None
            }
            Self::WriteOutputError { err } => {
                tracing::error!("error writing output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(
                target: NO_HEADING_TARGET,
                "\n{}\n  {}",
                "Caused by:".style(styles.warning_text),
                err,
            );
            next_error = err.source();
        }
    }
}
