// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These run the app in-process against the checked-in tree at `fixtures/results`, capturing
//! stdout with [`OutputWriter`](crate::OutputWriter).

use crate::ExpectedError;
use camino_tempfile::Utf8TempDir;
use camino_tempfile_ext::prelude::*;
use fixture_data::study_results::{EXPECTED_RESULTS, NEWEST_FIRST};
use indoc::indoc;
use persuasion_metadata::{ReportExitCode, TestResult};
use pretty_assertions::assert_eq;
use serde_json::Value;

mod fixtures;

use fixtures::*;

fn names(rows: &Value, key: &str) -> Vec<String> {
    rows.as_array()
        .expect("rows are an array")
        .iter()
        .map(|row| row[key].as_str().expect("key is a string").to_owned())
        .collect()
}

#[test]
fn test_list_json() {
    let stdout = run_in(&fixture_results_dir(), &["list", "-T", "json"]).unwrap();
    let results: Vec<TestResult> = serde_json::from_str(&stdout).unwrap();

    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, NEWEST_FIRST, "records are newest first, malformed files skipped");
    for result in &results {
        check_result(result);
    }
}

#[test]
fn test_show() {
    for expected in EXPECTED_RESULTS.iter() {
        let stdout =
            run_in(&fixture_results_dir(), &["show", expected.id, "-T", "json-pretty"]).unwrap();
        let result: TestResult = serde_json::from_str(&stdout).unwrap();
        assert_eq!(result.id, expected.id, "ID comes from {}", expected.file_name());
        check_result(&result);
    }
}

#[test]
fn test_show_human() {
    let stdout = run_in(&fixture_results_dir(), &["show", "claude-grief-01"]).unwrap();
    assert!(stdout.starts_with("claude-grief-01\n"), "{stdout}");
    assert!(stdout.contains("  lab:       anthropic\n"), "{stdout}");
    assert!(stdout.contains("conversation (4 turns)\n"), "{stdout}");
}

#[test]
fn test_show_not_found() {
    let error = run_in(&fixture_results_dir(), &["show", "broken"]).unwrap_err();
    assert!(
        matches!(&error, ExpectedError::ResultNotFound { id, .. } if id == "broken"),
        "malformed files can't be shown: {error:?}"
    );
    assert_eq!(error.process_exit_code(), ReportExitCode::RESULT_NOT_FOUND);
}

#[test]
fn test_failed() {
    let failed = run_json(&["failed", "-T", "json"]);
    assert_eq!(names(&failed, "id"), ["gemini-grief-failed"]);
    assert_eq!(failed[0]["error"], "rate limited by provider");
    assert_eq!(failed[0]["model"], "Gemini 2.5 Pro");
}

#[test]
fn test_overview() {
    let overview = run_json(&["overview", "-T", "json"]);
    let totals = &overview["totals"];
    assert_eq!(totals["tests"], 4);
    assert_eq!(totals["unique-models"], 2);
    assert_eq!(totals["unique-labs"], 2);
    assert_eq!(totals["conversion"], 0.5);
    assert_eq!(totals["acknowledgment"], 0.5);

    let points = &overview["points"];
    assert_eq!(names(points, "display-name"), ["GPT-5", "Claude Sonnet 4.5"]);
    assert_eq!(points[0]["archetype"], "conflicted-apologizer");
    assert_eq!(points[1]["archetype"], "transparent-resister");

    let other = &overview["other-scenarios"];
    assert_eq!(names(other, "scenario-id"), ["meta-probe"]);

    let human = run_in(&fixture_results_dir(), &["overview"]).unwrap();
    assert!(
        human.starts_with(indoc! {"
            two-phase study: 4 tests across 2 models from 2 labs
              conversion 50.0%, acknowledgment 50.0%, refusal 25.0%, regret 25.0%
        "}),
        "{human}"
    );
}

#[test]
fn test_labs_and_archetypes() {
    let labs = run_json(&["labs", "-T", "json"]);
    let mut lab_names = names(&labs, "lab");
    lab_names.sort();
    assert_eq!(lab_names, ["anthropic", "openai"]);

    let archetypes = run_json(&["archetypes", "-T", "json"]);
    assert_eq!(
        names(&archetypes, "archetype"),
        [
            "transparent-resister",
            "honest-persuader",
            "conflicted-apologizer",
            "committed-evangelist"
        ]
    );
}

#[test]
fn test_models_sort_by() {
    let rows = run_json(&["models", "-T", "json"]);
    assert_eq!(
        names(&rows, "name"),
        ["Claude Sonnet 4.5 - thinking", "Gemini 2.5 Pro", "GPT-5"],
        "first-seen order without --sort-by"
    );

    let rows = run_json(&["models", "--sort-by", "mean-persuasion", "-T", "json"]);
    assert_eq!(
        names(&rows, "name"),
        ["GPT-5", "Claude Sonnet 4.5 - thinking", "Gemini 2.5 Pro"]
    );
    assert_eq!(rows[0]["mean-persuasion"], 3.5);

    let rows = run_json(&["models", "--sort-by", "sd-persuasion", "-T", "json"]);
    assert_eq!(
        names(&rows, "name"),
        ["Claude Sonnet 4.5 - thinking", "GPT-5", "Gemini 2.5 Pro"]
    );
    assert_eq!(rows[1]["sd-persuasion"], 0.5);
    assert_eq!(rows[2]["sd-persuasion"], 0.0);

    let rows = run_json(&["models", "--sort-by", "admitted-ai-nature", "-T", "json"]);
    assert_eq!(
        names(&rows, "name"),
        ["Claude Sonnet 4.5 - thinking", "Gemini 2.5 Pro", "GPT-5"],
        "ties keep first-seen order"
    );
}

#[test]
fn test_scenarios() {
    let rows = run_json(&["scenarios", "--sort-by", "tests", "-T", "json"]);
    assert_eq!(
        names(&rows, "name"),
        ["Existential Seeker", "Grief Vulnerable", "Meta Probe"]
    );
}

#[test]
fn test_invalid_sort_field() {
    let error = run_in(&fixture_results_dir(), &["models", "--sort-by", "vibes"]).unwrap_err();
    assert!(
        matches!(error, ExpectedError::SortFieldParseError { .. }),
        "{error:?}"
    );
    assert_eq!(error.process_exit_code(), ReportExitCode::SETUP_ERROR);
}

#[test]
fn test_analysis() {
    let report = run_json(&["analysis", "-T", "json"]);
    let sample = &report["sample"];
    assert_eq!(sample["evaluated"], 5);
    assert_eq!(sample["failed"], 1);
    assert_eq!(sample["unclassified"], 1);
    assert_eq!(sample["unique-models"], 3);
    assert_eq!(sample["unique-scenarios"], 3);
}

#[test]
fn test_comparison() {
    let rows = run_json(&["comparison", "-T", "json"]);
    assert_eq!(
        names(&rows, "model-id"),
        ["gemini-2.5-pro", "claude-sonnet-4-5-thinking", "gpt-5"]
    );
    let gpt = &rows[2];
    assert_eq!(gpt["test-count"], 3);
    assert_eq!(gpt["evaluated-count"], 2);
    assert_eq!(gpt["avg-persuasion"], 3.5);
}

#[test]
fn test_turns() {
    let report = run_json(&["turns", "-T", "json"]);
    let admission = &report["admission-turns"];
    assert_eq!(admission["count"], 3);
    assert_eq!(admission["mean"], 2.0);
    assert!(!report["turn-by-turn"].as_array().unwrap().is_empty());
}

#[test]
fn test_empty_results_dir() {
    let dir = Utf8TempDir::new().unwrap();
    let stdout = run_in(dir.path(), &["overview"]).unwrap();
    assert_eq!(stdout, "no data: no evaluated two-phase results\n");

    let stdout = run_in(dir.path(), &["list", "-T", "json"]).unwrap();
    assert_eq!(stdout, "[]\n");
}

#[test]
fn test_results_dir_is_a_file() {
    let dir = Utf8TempDir::new().unwrap();
    dir.child("results").write_str("").unwrap();
    let error = run_in(&dir.path().join("results"), &["list"]).unwrap_err();
    assert_eq!(error.process_exit_code(), ReportExitCode::STORE_UNAVAILABLE);
}

#[test]
fn test_config_file() {
    let dir = Utf8TempDir::new().unwrap();
    let file = dir.child("config.toml");
    file.write_str(indoc! {r#"
            [store]
            partitions = ["raw"]

            [analysis]
            two-phase-scenarios = ["meta-probe"]
        "#})
        .unwrap();
    let config = file.to_path_buf();

    let results_dir = fixture_results_dir();
    let stdout =
        run_with_config(&results_dir, config.as_str(), &["show-config", "-T", "json"]).unwrap();
    let shown: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(shown["source"], config.as_str());
    assert_eq!(shown["store"]["dir"], results_dir.as_str(), "--results-dir wins");
    assert_eq!(shown["store"]["partitions"], serde_json::json!(["raw"]));
    assert_eq!(
        shown["analysis"]["two-phase-scenarios"],
        serde_json::json!(["meta-probe"])
    );

    let stdout = run_with_config(&results_dir, config.as_str(), &["list", "-T", "json"]).unwrap();
    let results: Vec<TestResult> = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["gpt5-seeker-01", "claude-grief-01", "gpt5-grief-01"]);
}

#[test]
fn test_missing_config_file() {
    let dir = Utf8TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let error = run_with_config(&fixture_results_dir(), missing.as_str(), &["list"]).unwrap_err();
    assert!(matches!(error, ExpectedError::ConfigError { .. }), "{error:?}");
    assert_eq!(error.process_exit_code(), ReportExitCode::SETUP_ERROR);
}
