// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the engine.
//!
//! Aggregation itself never fails: empty inputs and zero denominators resolve to defined defaults.
//! The errors here come from the edges, namely reading result files and loading configuration.

use camino::{FromPathBufError, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// An error that occurred while reading results from the store.
///
/// Most of these are not fatal. The store reports them as warnings and carries on with whatever it
/// could read; see [`StoreWarnings`](crate::store::StoreWarnings).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The results root exists but is not a directory.
    #[error("results root `{root}` is not a directory")]
    RootNotADirectory {
        /// The results root.
        root: Utf8PathBuf,
    },

    /// A partition directory could not be listed.
    #[error("failed to read results partition `{dir}`")]
    PartitionRead {
        /// The partition directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// An entry in a partition directory could not be read.
    ///
    /// This includes file names that aren't valid UTF-8.
    #[error("failed to read an entry in results partition `{dir}`")]
    DirEntryRead {
        /// The partition directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A result file could not be read.
    #[error("failed to read result file `{path}`")]
    FileRead {
        /// The file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A result file could not be parsed.
    #[error("failed to parse result file `{path}`")]
    FileParse {
        /// The file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurred while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An explicitly specified config file was not found.
    #[error("config file not found at `{path}`")]
    FileNotFound {
        /// The path that was looked up.
        path: Utf8PathBuf,
    },

    /// The config file could not be read.
    #[error("failed to read config file `{path}`")]
    Read {
        /// The config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file `{path}`")]
    Parse {
        /// The config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },

    /// The config directory path isn't valid UTF-8.
    #[error("config directory path is not valid UTF-8")]
    NonUtf8Path {
        /// The underlying error.
        #[source]
        error: FromPathBufError,
    },
}

/// An error returned while parsing a sort field from a string.
#[derive(Clone, Debug, Error)]
pub struct SortFieldParseError {
    input: String,
    known: Vec<String>,
}

impl SortFieldParseError {
    pub(crate) fn new(input: impl Into<String>, known: Vec<String>) -> Self {
        Self {
            input: input.into(),
            known,
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for SortFieldParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized sort field: {}\n(known values: {})",
            self.input,
            self.known.join(", ")
        )
    }
}
