// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture data shared by persuasion-report tests.
//!
//! [`RecordFixture`] builds synthetic records for unit tests. [`study_results`] describes the
//! checked-in result tree under `fixtures/results`, which the CLI integration tests run against.

pub mod models;
pub mod study_results;

pub use models::RecordFixture;
