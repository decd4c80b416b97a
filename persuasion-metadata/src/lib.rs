// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to recorded persuasion-test transcripts.
//!
//! Each test run produced by the evaluation harness is stored as a single JSON file. The types in
//! this crate describe that format. They are deliberately lenient: fields that older harness
//! versions didn't write are defaulted, and behavior observations are kept as an open-ended map so
//! that new flags can be added without changing this crate.
//!
//! The exit codes produced by `persuasion-report` are documented in [`ReportExitCode`].

mod exit_codes;
mod observations;
mod test_result;

pub use exit_codes::*;
pub use observations::*;
pub use test_result::*;
