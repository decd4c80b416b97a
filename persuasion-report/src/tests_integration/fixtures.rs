// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{ExpectedError, ReportApp, output::OutputWriter};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fixture_data::{models::ResultFixtureStatus, study_results::get_expected_result};
use persuasion_metadata::TestResult;

/// The checked-in result tree.
pub(super) fn fixture_results_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/results")
}

/// Runs persuasion-report against `results_dir` with built-in config and no color, returning
/// captured stdout.
pub(super) fn run_in(results_dir: &Utf8Path, args: &[&str]) -> Result<String, ExpectedError> {
    run_with_config(results_dir, "none", args)
}

pub(super) fn run_with_config(
    results_dir: &Utf8Path,
    config: &str,
    args: &[&str],
) -> Result<String, ExpectedError> {
    let mut cli_args = vec![
        "persuasion-report",
        "--color",
        "never",
        "--config",
        config,
        "--results-dir",
        results_dir.as_str(),
    ];
    cli_args.extend_from_slice(args);

    let app = ReportApp::parse_from(cli_args);
    let output = app.init_output();
    let mut writer = OutputWriter::new_test();
    let code = app.exec(output, &mut writer)?;
    assert_eq!(code, 0, "successful runs exit with 0");

    let stdout = writer.stdout().expect("test writer captures stdout");
    Ok(String::from_utf8(stdout.to_vec()).expect("output is valid UTF-8"))
}

/// Runs against the fixture tree and parses JSON output.
pub(super) fn run_json(args: &[&str]) -> serde_json::Value {
    let stdout = run_in(&fixture_results_dir(), args).unwrap_or_else(|error| {
        panic!("{args:?} failed: {error:?}");
    });
    serde_json::from_str(&stdout).expect("output is valid JSON")
}

/// Checks a loaded record against its description in `fixture_data`.
pub(super) fn check_result(result: &TestResult) {
    let expected = get_expected_result(&result.id);
    assert_eq!(
        result.model_config.description, expected.model_description,
        "{}: model description matches",
        result.id
    );
    assert_eq!(
        result.scenario.name, expected.scenario_name,
        "{}: scenario name matches",
        result.id
    );
    match expected.status {
        ResultFixtureStatus::Evaluated {
            end_reason,
            intensity,
        } => {
            assert!(result.metadata.completed, "{}: completed", result.id);
            let evaluation = result
                .final_evaluation
                .as_ref()
                .unwrap_or_else(|| panic!("{}: evaluation present", result.id));
            assert_eq!(evaluation.end_reason, end_reason, "{}: end reason", result.id);
            assert_eq!(
                evaluation.persuasion_intensity(),
                f64::from(intensity),
                "{}: intensity",
                result.id
            );
        }
        ResultFixtureStatus::Failed => {
            assert!(!result.metadata.completed, "{}: not completed", result.id);
            assert!(result.metadata.error.is_some(), "{}: error recorded", result.id);
        }
        ResultFixtureStatus::Unevaluated => {
            assert!(result.metadata.completed, "{}: completed", result.id);
            assert!(
                result.final_evaluation.is_none(),
                "{}: no evaluation",
                result.id
            );
        }
    }
}
