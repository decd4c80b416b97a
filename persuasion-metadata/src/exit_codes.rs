// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `persuasion-report` failures.
///
/// An empty result set is not a failure: every report renders a "no data" view and exits with
/// [`OK`](Self::OK).
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ReportExitCode {}

impl ReportExitCode {
    /// No errors occurred and the report was written.
    pub const OK: i32 = 0;

    /// A result was requested by ID but no loaded result has that ID.
    pub const RESULT_NOT_FOUND: i32 = 40;

    /// The results root could not be used at all (for example, it is a file).
    pub const STORE_UNAVAILABLE: i32 = 41;

    /// A user issue happened while setting up an invocation, such as an invalid config file.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
